//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by piece id)
//! - No rendering or platform dependencies

pub mod combo;
pub mod fusion;
pub mod piece;
pub mod session;
pub mod spawn;
pub mod stage;
pub mod tier;

pub use combo::Scoreboard;
pub use fusion::FusionBatch;
pub use piece::{Piece, PieceRegistry};
pub use session::{GameEvent, GameSession};
pub use spawn::{SpawnGate, SpawnGateState};
pub use stage::{ContainerBounds, Stage, StageController};
pub use tier::TierTable;
