//! Simulation error types.

use thiserror::Error;

/// Errors raised by pool, sync and facade operations.
///
/// `PlayerOutOfRange` and `AppendMismatch` mean the node has drifted from
/// the master; callers report them loudly and drop the operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("{op}: player id {id} out of range (pool holds {len})")]
    PlayerOutOfRange {
        op: &'static str,
        id: u32,
        len: usize,
    },

    #[error("player id {id} is not the next id (expected {expected})")]
    AppendMismatch { id: u32, expected: u32 },

    #[error("player {id} is unknown locally and its record has no profile")]
    MissingProfile { id: u32 },

    #[error("player pool is full")]
    PlayerPoolFull,

    #[error("collectible pool is full")]
    CollectiblePoolFull,

    #[error("snapshot of {count} records exceeds limit of {limit}")]
    OversizedSnapshot { count: usize, limit: usize },

    #[error("snapshots cannot be applied on the authoritative node")]
    AuthoritativeReplay,
}

impl GameError {
    /// Whether this error indicates master/replica drift.
    pub fn is_desync(&self) -> bool {
        matches!(
            self,
            GameError::PlayerOutOfRange { .. }
                | GameError::AppendMismatch { .. }
                | GameError::MissingProfile { .. }
        )
    }
}
