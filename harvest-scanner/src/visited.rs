use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Whether seeds of one batch share their visited set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitedPolicy {
    /// A fresh set for every top-level crawl
    #[default]
    PerCall,
    /// One set for the whole batch; later seeds skip pages earlier seeds saw
    SharedAcrossSeeds,
}

/// Canonical identifiers already visited during a traversal.
///
/// Entries are only ever added.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    seen: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.seen.contains(identifier)
    }

    /// Returns `true` if `identifier` was not present before this call.
    pub fn check_and_mark(&mut self, identifier: &str) -> bool {
        if self.seen.contains(identifier) {
            return false;
        }
        self.seen.insert(identifier.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_and_mark_only_once() {
        let mut visited = VisitedSet::new();
        assert!(visited.is_empty());
        assert!(visited.check_and_mark("https://en.wikipedia.org/wiki/A"));
        assert!(!visited.check_and_mark("https://en.wikipedia.org/wiki/A"));
        assert!(visited.contains("https://en.wikipedia.org/wiki/A"));
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_policy_serializes_snake_case() {
        let json = serde_json::to_string(&VisitedPolicy::SharedAcrossSeeds).unwrap();
        assert_eq!(json, "\"shared_across_seeds\"");
        assert_eq!(VisitedPolicy::default(), VisitedPolicy::PerCall);
    }
}
