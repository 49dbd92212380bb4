//! Owner selection.
//!
//! Selection is read-then-decide with no lock around it. Two overlapping
//! calls can read the same count and both pick the same owner, pushing them
//! past the cap; the store has no transactional read-modify-write to stop
//! that, so balancing is eventual rather than strict.

use relay_core::{OpenItem, Owner, Roster};
use relay_store::{StoreError, TicketStore};
use std::sync::Arc;
use tracing::{debug, info};

use crate::load::LoadTable;
use crate::policy::{AssignmentPolicy, FallbackPolicy};

/// Errors from owner selection.
#[derive(Debug, thiserror::Error)]
pub enum AssignError {
    /// No owners configured; a configuration problem, not worth retrying
    #[error("no owners configured for assignment")]
    EmptyRoster,

    /// The load query failed
    #[error("failed to query open tickets: {0}")]
    Upstream(#[from] StoreError),
}

/// Pick the owner for the next ticket.
///
/// Returns the first owner in roster order whose load is below the cap.
/// When everyone is at or above the cap, `policy.fallback` decides.
pub fn select_owner<'a>(
    roster: &'a Roster,
    items: &[OpenItem],
    policy: &AssignmentPolicy,
) -> Result<&'a Owner, AssignError> {
    if roster.is_empty() {
        return Err(AssignError::EmptyRoster);
    }
    let table = LoadTable::build(roster, items);
    decide(&table, policy)
        .map(|(owner, _)| owner)
        .ok_or(AssignError::EmptyRoster)
}

/// Returns the chosen owner and whether the fallback fired.
fn decide<'a>(table: &LoadTable<'a>, policy: &AssignmentPolicy) -> Option<(&'a Owner, bool)> {
    if let Some(owner) = table.first_under(policy.cap) {
        return Some((owner, false));
    }
    let owner = match policy.fallback {
        FallbackPolicy::First => table.iter().next().map(|(o, _)| o),
        FallbackPolicy::LeastLoaded => table.least_loaded(),
    }?;
    Some((owner, true))
}

/// Outcome of one assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Chosen owner
    pub owner: Owner,

    /// Load per roster owner at the time of the decision, in roster order
    pub loads: Vec<(String, usize)>,

    /// Whether every owner was at or above the cap
    pub fallback: bool,
}

/// Queries the store for current load and selects an owner.
///
/// Holds its roster and policy as explicit configuration; nothing is carried
/// between calls.
#[derive(Clone)]
pub struct Assigner {
    store: Arc<dyn TicketStore>,
    roster: Roster,
    policy: AssignmentPolicy,
}

impl Assigner {
    /// Create an assigner with the default policy.
    pub fn new(store: Arc<dyn TicketStore>, roster: Roster) -> Self {
        Self {
            store,
            roster,
            policy: AssignmentPolicy::default(),
        }
    }

    /// Set the policy.
    pub fn with_policy(mut self, policy: AssignmentPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Configured roster.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Configured policy.
    pub fn policy(&self) -> &AssignmentPolicy {
        &self.policy
    }

    /// Read current load and pick an owner.
    ///
    /// An empty roster fails before the store is queried. Store errors are
    /// returned unchanged; there is no retry and no guessed owner.
    pub async fn assign(&self) -> Result<Selection, AssignError> {
        if self.roster.is_empty() {
            return Err(AssignError::EmptyRoster);
        }

        let items = self.store.query_open_assigned().await?;
        let table = LoadTable::build(&self.roster, &items);
        if table.ignored() > 0 {
            debug!("Ignored {} open tickets not owned by the roster", table.ignored());
        }

        let (owner, fallback) = decide(&table, &self.policy).ok_or(AssignError::EmptyRoster)?;
        let loads = table.snapshot();
        debug!("Load table: {:?}", loads);

        if fallback {
            info!(
                "All owners at or above cap {}, falling back ({}) to {}",
                self.policy.cap, self.policy.fallback, owner
            );
        } else {
            info!("Selected {}", owner);
        }

        Ok(Selection {
            owner: owner.clone(),
            loads,
            fallback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::TicketStatus;
    use relay_store::MemoryStore;

    fn roster() -> Roster {
        Roster::parse("A:Alice,B:Bob,C:Carol,D:Dan").unwrap()
    }

    fn items(owners: &[&str]) -> Vec<OpenItem> {
        owners
            .iter()
            .enumerate()
            .map(|(i, o)| OpenItem::new(format!("p{i}"), vec![o.to_string()]))
            .collect()
    }

    fn pick(owners: &[&str]) -> String {
        let roster = roster();
        select_owner(&roster, &items(owners), &AssignmentPolicy::default())
            .unwrap()
            .id
            .clone()
    }

    #[test]
    fn test_no_open_items_picks_first() {
        assert_eq!(pick(&[]), "A");
    }

    #[test]
    fn test_first_at_cap_picks_next() {
        assert_eq!(pick(&["A", "A"]), "B");
    }

    #[test]
    fn test_all_at_cap_falls_back_to_first() {
        assert_eq!(pick(&["A", "A", "B", "B", "C", "C", "D", "D"]), "A");
    }

    #[test]
    fn test_unknown_owner_is_ignored() {
        assert_eq!(pick(&["X"]), "A");
        assert_eq!(pick(&["X", "X", "X", "A"]), "A");
    }

    #[test]
    fn test_empty_roster_is_an_error() {
        let roster = Roster::default();
        let result = select_owner(&roster, &[], &AssignmentPolicy::default());
        assert!(matches!(result, Err(AssignError::EmptyRoster)));
    }

    #[test]
    fn test_skips_over_several_capped_owners() {
        assert_eq!(pick(&["B", "A", "B", "A", "C", "C"]), "D");
    }

    #[test]
    fn test_over_cap_owner_is_still_skipped() {
        assert_eq!(pick(&["A", "A", "A", "A", "A"]), "B");
    }

    #[test]
    fn test_selection_is_idempotent() {
        let roster = roster();
        let items = items(&["A", "A", "C"]);
        let policy = AssignmentPolicy::default();
        let first = select_owner(&roster, &items, &policy).unwrap();
        let second = select_owner(&roster, &items, &policy).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_result_always_on_roster() {
        let roster = roster();
        let policy = AssignmentPolicy::default().with_cap(1);
        let mut owners = Vec::new();
        for next in ["A", "X", "B", "C", "Y", "D", "A"] {
            owners.push(next);
            let chosen = select_owner(&roster, &items(&owners), &policy).unwrap();
            assert!(roster.get(&chosen.id).is_some());
        }
    }

    #[test]
    fn test_custom_cap() {
        let roster = roster();
        let policy = AssignmentPolicy::default().with_cap(3);
        let chosen = select_owner(&roster, &items(&["A", "A"]), &policy).unwrap();
        assert_eq!(chosen.id, "A");
    }

    #[test]
    fn test_zero_cap_always_falls_back() {
        let roster = roster();
        let policy = AssignmentPolicy::default().with_cap(0);
        let chosen = select_owner(&roster, &[], &policy).unwrap();
        assert_eq!(chosen.id, "A");
    }

    #[test]
    fn test_least_loaded_fallback() {
        let roster = roster();
        let policy = AssignmentPolicy::default().with_fallback(FallbackPolicy::LeastLoaded);
        let owners = ["A", "A", "A", "B", "B", "C", "C", "C", "D", "D"];
        let chosen = select_owner(&roster, &items(&owners), &policy).unwrap();
        assert_eq!(chosen.id, "B");
    }

    #[test]
    fn test_least_loaded_only_applies_when_all_capped() {
        let roster = roster();
        let policy = AssignmentPolicy::default().with_fallback(FallbackPolicy::LeastLoaded);
        let chosen = select_owner(&roster, &items(&["A", "B", "B"]), &policy).unwrap();
        assert_eq!(chosen.id, "A");
    }

    #[tokio::test]
    async fn test_assigner_reads_live_load() {
        let store = Arc::new(MemoryStore::new());
        store.seed(TicketStatus::New, &["A"]).await;
        store.seed(TicketStatus::InProgress, &["A"]).await;
        store.seed(TicketStatus::Done, &["B"]).await;

        let assigner = Assigner::new(store.clone(), roster());
        let selection = assigner.assign().await.unwrap();
        assert_eq!(selection.owner.id, "B");
        assert!(!selection.fallback);
        assert_eq!(selection.loads[0], ("A".to_string(), 2));
        assert_eq!(selection.loads[1], ("B".to_string(), 0));

        // Load changes between calls are picked up; nothing is cached.
        store.seed(TicketStatus::New, &["B"]).await;
        store.seed(TicketStatus::New, &["B"]).await;
        let selection = assigner.assign().await.unwrap();
        assert_eq!(selection.owner.id, "C");
    }

    #[tokio::test]
    async fn test_assigner_reports_fallback() {
        let store = Arc::new(MemoryStore::new());
        for owner in ["A", "B", "C", "D"] {
            store.seed(TicketStatus::New, &[owner]).await;
            store.seed(TicketStatus::New, &[owner]).await;
        }

        let selection = Assigner::new(store, roster()).assign().await.unwrap();
        assert_eq!(selection.owner.id, "A");
        assert!(selection.fallback);
    }

    #[tokio::test]
    async fn test_assigner_propagates_store_error() {
        let store = Arc::new(MemoryStore::new());
        store.fail_with(502, "bad gateway").await;

        let result = Assigner::new(store, roster()).assign().await;
        assert!(matches!(
            result,
            Err(AssignError::Upstream(StoreError::Api { status: 502, .. }))
        ));
    }

    #[tokio::test]
    async fn test_assigner_empty_roster_skips_query() {
        let store = Arc::new(MemoryStore::new());
        // A failing store proves the query never happened.
        store.fail_with(500, "should not be called").await;

        let result = Assigner::new(store, Roster::default()).assign().await;
        assert!(matches!(result, Err(AssignError::EmptyRoster)));
    }
}
