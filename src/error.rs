//! Errors shared by every integration algorithm and operation generator.

use std::fmt;

use crate::id::Id;

/// Everything that can go wrong while integrating operations or walking
/// a document. All four kinds are fatal to the caller: there is no
/// partial-state recovery, callers either validate beforehand (via
/// [`crate::ops::can_insert_now`]) or treat the failure as a bug.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// `integrate` received an operation whose `seq` is not `last + 1`
    /// for its agent.
    OutOfOrder {
        agent: String,
        expected: u64,
        got: u64,
    },
    /// `findById` could not locate a referenced origin.
    NotFound(Id),
    /// `findByVisibleIndex` was passed a position beyond the document's
    /// visible length.
    OutOfRange { pos: usize, len: usize },
    /// `mergeInto` completed a pass without making progress.
    Stuck,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OutOfOrder { agent, expected, got } => {
                write!(f, "out of order: agent {agent:?} expected seq {expected}, got {got}")
            }
            Error::NotFound(id) => write!(f, "id not found: {id:?}"),
            Error::OutOfRange { pos, len } => {
                write!(f, "position {pos} out of range (visible length {len})")
            }
            Error::Stuck => write!(f, "merge stuck: remaining operations reference unsatisfied dependencies"),
        }
    }
}

impl std::error::Error for Error {}
