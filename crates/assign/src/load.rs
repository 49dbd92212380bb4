//! Per-owner open ticket counts.

use relay_core::{OpenItem, Owner, Roster};
use std::collections::HashMap;

/// Open ticket count per roster owner, in roster order.
///
/// Keys are exactly the roster's owners, each starting at zero. Items owned
/// by someone outside the roster are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTable<'a> {
    entries: Vec<(&'a Owner, usize)>,
    ignored: usize,
}

impl<'a> LoadTable<'a> {
    /// Count each item's first owner against the roster.
    pub fn build(roster: &'a Roster, items: &[OpenItem]) -> Self {
        let mut entries: Vec<(&Owner, usize)> = roster.owners().iter().map(|o| (o, 0)).collect();
        let index: HashMap<&str, usize> = roster
            .owners()
            .iter()
            .enumerate()
            .map(|(i, o)| (o.id.as_str(), i))
            .collect();

        let mut ignored = 0;
        for item in items {
            match item.primary_owner().and_then(|id| index.get(id)) {
                Some(&i) => entries[i].1 += 1,
                None => ignored += 1,
            }
        }

        Self { entries, ignored }
    }

    /// Count for an owner id, `None` if not on the roster.
    pub fn count(&self, owner_id: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(o, _)| o.id == owner_id)
            .map(|(_, n)| *n)
    }

    /// `(owner, count)` pairs in roster order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a Owner, usize)> + '_ {
        self.entries.iter().copied()
    }

    /// Items that did not match any roster owner.
    pub fn ignored(&self) -> usize {
        self.ignored
    }

    /// First owner in roster order with a count strictly below `cap`.
    pub fn first_under(&self, cap: usize) -> Option<&'a Owner> {
        self.entries
            .iter()
            .find(|(_, n)| *n < cap)
            .map(|(o, _)| *o)
    }

    /// Owner with the smallest count; the earliest wins a tie.
    pub fn least_loaded(&self) -> Option<&'a Owner> {
        // min_by_key keeps the first of equal minima
        self.entries
            .iter()
            .min_by_key(|(_, n)| *n)
            .map(|(o, _)| *o)
    }

    /// Owned snapshot for logging and reporting.
    pub fn snapshot(&self) -> Vec<(String, usize)> {
        self.entries
            .iter()
            .map(|(o, n)| (o.id.clone(), *n))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(owners: &[&str]) -> Vec<OpenItem> {
        owners
            .iter()
            .enumerate()
            .map(|(i, o)| OpenItem::new(format!("p{i}"), vec![o.to_string()]))
            .collect()
    }

    #[test]
    fn test_keys_are_roster_in_order_starting_at_zero() {
        let roster = Roster::parse("c,a,b").unwrap();
        let table = LoadTable::build(&roster, &[]);
        assert_eq!(
            table.snapshot(),
            vec![("c".to_string(), 0), ("a".to_string(), 0), ("b".to_string(), 0)]
        );
    }

    #[test]
    fn test_counts_only_first_owner() {
        let roster = Roster::parse("a,b").unwrap();
        let items = vec![OpenItem::new("p1", vec!["a".into(), "b".into()])];
        let table = LoadTable::build(&roster, &items);
        assert_eq!(table.count("a"), Some(1));
        assert_eq!(table.count("b"), Some(0));
    }

    #[test]
    fn test_unknown_owners_ignored() {
        let roster = Roster::parse("a,b").unwrap();
        let table = LoadTable::build(&roster, &items(&["x", "a", "y"]));
        assert_eq!(table.count("a"), Some(1));
        assert_eq!(table.count("x"), None);
        assert_eq!(table.ignored(), 2);
        assert_eq!(table.iter().count(), 2);
    }

    #[test]
    fn test_unassigned_item_is_ignored() {
        let roster = Roster::parse("a").unwrap();
        let table = LoadTable::build(&roster, &[OpenItem::new("p1", vec![])]);
        assert_eq!(table.count("a"), Some(0));
        assert_eq!(table.ignored(), 1);
    }

    #[test]
    fn test_least_loaded_tie_goes_to_roster_order() {
        let roster = Roster::parse("a,b,c").unwrap();
        let table = LoadTable::build(&roster, &items(&["a", "a", "b", "c"]));
        assert_eq!(table.least_loaded().unwrap().id, "b");
    }

    #[test]
    fn test_first_under_cap() {
        let roster = Roster::parse("a,b").unwrap();
        let table = LoadTable::build(&roster, &items(&["a", "a", "b"]));
        assert_eq!(table.first_under(2).unwrap().id, "b");
        assert!(table.first_under(1).is_none());
    }
}
