//! Owners and the ordered roster they are drawn from.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A person eligible to be assigned a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Owner {
    /// Opaque identifier (the store's user id)
    pub id: String,

    /// Display name
    pub name: String,
}

impl Owner {
    /// Create a new owner.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for Owner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Errors raised while building a roster.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    /// An entry had no id before the separator
    #[error("roster entry {0:?} has an empty owner id")]
    EmptyId(String),

    /// The same id appeared twice
    #[error("owner id {0:?} appears more than once in the roster")]
    DuplicateOwner(String),
}

/// Ordered list of candidate owners.
///
/// Order is significant: it is both the cap-check order and the rotation
/// fallback order, so it is preserved exactly as configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Owner>", into = "Vec<Owner>")]
pub struct Roster {
    owners: Vec<Owner>,
}

impl Roster {
    /// Build a roster from owners, rejecting empty and duplicate ids.
    pub fn new(owners: Vec<Owner>) -> Result<Self, RosterError> {
        let mut seen = HashSet::with_capacity(owners.len());
        for owner in &owners {
            if owner.id.trim().is_empty() {
                return Err(RosterError::EmptyId(owner.name.clone()));
            }
            if !seen.insert(owner.id.as_str()) {
                return Err(RosterError::DuplicateOwner(owner.id.clone()));
            }
        }
        Ok(Self { owners })
    }

    /// Parse a comma separated `id:Name` list, e.g. `"u1:Ana,u2:Ben"`.
    ///
    /// A bare `id` uses the id as its display name. Blank segments are skipped,
    /// so an empty string yields an empty roster.
    pub fn parse(list: &str) -> Result<Self, RosterError> {
        let owners = list
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| match entry.split_once(':') {
                Some((id, name)) => {
                    let id = id.trim();
                    let name = name.trim();
                    if id.is_empty() {
                        return Err(RosterError::EmptyId(entry.to_string()));
                    }
                    let name = if name.is_empty() { id } else { name };
                    Ok(Owner::new(id, name))
                }
                None => Ok(Owner::new(entry, entry)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(owners)
    }

    /// Owners in rotation order.
    pub fn owners(&self) -> &[Owner] {
        &self.owners
    }

    /// Owner ids in rotation order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.owners.iter().map(|o| o.id.as_str())
    }

    /// Look up an owner by id.
    pub fn get(&self, id: &str) -> Option<&Owner> {
        self.owners.iter().find(|o| o.id == id)
    }

    /// First owner in rotation order.
    pub fn first(&self) -> Option<&Owner> {
        self.owners.first()
    }

    /// Number of owners.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Whether the roster has no owners.
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

impl TryFrom<Vec<Owner>> for Roster {
    type Error = RosterError;

    fn try_from(owners: Vec<Owner>) -> Result<Self, Self::Error> {
        Self::new(owners)
    }
}

impl From<Roster> for Vec<Owner> {
    fn from(roster: Roster) -> Self {
        roster.owners
    }
}

impl std::str::FromStr for Roster {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
