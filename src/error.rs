//! Error taxonomy for the simulation core
//!
//! Every variant is local and recoverable; none terminates a session.
//! Game over is a normal outcome, not an error.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GameError {
    /// Tier rank outside the configured tier table. The operation is
    /// rejected with no state mutated.
    #[error("tier {0} is outside the tier table")]
    InvalidTier(u8),

    /// Tier score lookup came back undefined or non-positive. The table is
    /// validated at construction, so seeing this at runtime means the
    /// configuration is broken; the score increment is skipped, not fatal.
    #[error("tier {0} has no usable score entry")]
    InvalidScore(u8),

    /// Removal of a piece that is not in the registry. No-op.
    #[error("piece {0} is not in the registry")]
    DoubleRemoval(u32),
}
