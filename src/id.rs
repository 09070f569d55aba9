//! Operation identifiers and version vectors.
//!
//! An [`Id`] is `(agent, seq)`: the pair is unique across every replica
//! that ever produces an operation. A [`Version`] tracks, per agent, the
//! highest `seq` that document has observed — the causal-readiness
//! predicate ([`Version::contains`]) and the convergence property both
//! rest on this single piece of bookkeeping.

use rustc_hash::FxHashMap;

/// Uniquely identifies one inserted item: the agent that created it and
/// that agent's local sequence number at creation time. Agents are
/// compared lexicographically (`String`'s default `Ord`), which is the
/// tiebreak every integration algorithm in this crate falls back on.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id {
    pub agent: String,
    pub seq: u64,
}

impl Id {
    pub fn new(agent: impl Into<String>, seq: u64) -> Id {
        return Id { agent: agent.into(), seq };
    }
}

/// Per-agent highest-seq map. The absence of an agent is equivalent to
/// that agent being at seq `-1` (i.e. nothing from it has been seen).
///
/// The null identifier (the list's left/right boundary, represented as
/// `Option<Id>::None` everywhere in this crate) is always considered "in"
/// every version — see [`is_in_version`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Version {
    entries: FxHashMap<String, u64>,
}

impl Version {
    pub fn new() -> Version {
        return Version { entries: FxHashMap::default() };
    }

    /// Highest seq seen from `agent`, or `None` if nothing has been seen.
    pub fn get(&self, agent: &str) -> Option<u64> {
        return self.entries.get(agent).copied();
    }

    /// Record that `(agent, seq)` has been integrated. Panics if this
    /// would move the agent's seq backwards — callers are expected to
    /// have already checked `seq == self.get(agent).map_or(0, |s| s + 1)`
    /// via the `OutOfOrder` check in each integrate routine.
    pub fn advance(&mut self, agent: &str, seq: u64) {
        let entry = self.entries.entry(agent.to_string()).or_insert(0);
        debug_assert!(seq == 0 || seq == *entry + 1 || !self.entries.contains_key(agent));
        *entry = seq;
    }

    /// Next expected seq for `agent` (0 if nothing has been seen yet).
    pub fn next_seq(&self, agent: &str) -> u64 {
        return match self.get(agent) {
            Some(s) => s + 1,
            None => 0,
        };
    }

    /// Whether `(agent, seq)` is contained in this version.
    pub fn contains(&self, agent: &str, seq: u64) -> bool {
        return match self.get(agent) {
            Some(s) => s >= seq,
            None => false,
        };
    }
}

/// Causal-readiness / membership predicate: is `id` already integrated
/// according to `version`? The null id (`None`) is always "in" every
/// version — it represents the document's left/right boundary, which
/// every operation trivially causally depends on.
pub fn is_in_version(id: Option<&Id>, version: &Version) -> bool {
    return match id {
        None => true,
        Some(id) => version.contains(&id.agent, id.seq),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_id_always_in_version() {
        let version = Version::new();
        assert!(is_in_version(None, &version));
    }

    #[test]
    fn advance_and_contains() {
        let mut version = Version::new();
        assert!(!version.contains("a", 0));
        version.advance("a", 0);
        assert!(version.contains("a", 0));
        assert!(!version.contains("a", 1));
        version.advance("a", 1);
        assert!(version.contains("a", 1));
    }

    #[test]
    fn next_seq_starts_at_zero() {
        let version = Version::new();
        assert_eq!(version.next_seq("a"), 0);
    }

    #[test]
    fn next_seq_after_advance() {
        let mut version = Version::new();
        version.advance("a", 0);
        version.advance("a", 1);
        assert_eq!(version.next_seq("a"), 2);
        assert_eq!(version.next_seq("b"), 0);
    }

    #[test]
    fn is_in_version_checks_specific_id() {
        let mut version = Version::new();
        version.advance("a", 3);
        assert!(is_in_version(Some(&Id::new("a", 2)), &version));
        assert!(is_in_version(Some(&Id::new("a", 3)), &version));
        assert!(!is_in_version(Some(&Id::new("a", 4)), &version));
        assert!(!is_in_version(Some(&Id::new("b", 0)), &version));
    }

    #[test]
    fn id_ordering_is_lexicographic_then_seq() {
        assert!(Id::new("a", 5) < Id::new("b", 0));
        assert!(Id::new("a", 0) < Id::new("a", 1));
    }
}
