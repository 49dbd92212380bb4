//! Assignment policy knobs.

use serde::{Deserialize, Serialize};

/// Open tickets an owner may hold before being skipped.
pub const DEFAULT_CAP: usize = 2;

/// What to do when every owner is at or above the cap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackPolicy {
    /// Rotate back to the first roster entry
    #[default]
    First,
    /// Pick the owner with the fewest open tickets, roster order breaks ties
    LeastLoaded,
}

impl std::str::FromStr for FallbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "first" => Ok(FallbackPolicy::First),
            "least-loaded" => Ok(FallbackPolicy::LeastLoaded),
            other => Err(format!(
                "unknown fallback policy '{other}', expected first or least-loaded"
            )),
        }
    }
}

impl std::fmt::Display for FallbackPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackPolicy::First => f.write_str("first"),
            FallbackPolicy::LeastLoaded => f.write_str("least-loaded"),
        }
    }
}

/// Cap plus fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentPolicy {
    /// Owners holding this many open tickets or more are skipped
    pub cap: usize,

    /// Used when nobody is under the cap
    pub fallback: FallbackPolicy,
}

impl Default for AssignmentPolicy {
    fn default() -> Self {
        Self {
            cap: DEFAULT_CAP,
            fallback: FallbackPolicy::First,
        }
    }
}

impl AssignmentPolicy {
    /// Create the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-owner cap.
    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }

    /// Set the fallback.
    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = AssignmentPolicy::default();
        assert_eq!(policy.cap, 2);
        assert_eq!(policy.fallback, FallbackPolicy::First);
    }

    #[test]
    fn test_fallback_parse() {
        assert_eq!("first".parse(), Ok(FallbackPolicy::First));
        assert_eq!("Least_Loaded".parse(), Ok(FallbackPolicy::LeastLoaded));
        assert!("random".parse::<FallbackPolicy>().is_err());
    }

    #[test]
    fn test_fallback_display_round_trips_through_parse() {
        for policy in [FallbackPolicy::First, FallbackPolicy::LeastLoaded] {
            assert_eq!(policy.to_string().parse(), Ok(policy));
        }
    }
}
