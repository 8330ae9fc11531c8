//! Drop Forge - a falling-object merge game engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (pieces, fusion, combo scoring, stages)
//! - `physics`: Physics World collaborator contract + rapier2d backend
//! - `highscores`: Top-N leaderboard store
//! - `config`: Data-driven game tuning

pub mod config;
pub mod error;
pub mod highscores;
pub mod physics;
pub mod sim;

pub use config::GameConfig;
pub use error::GameError;
pub use highscores::HighScores;

/// Engine policy constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (60 Hz)
    pub const TICK_DT_MS: f64 = 1000.0 / 60.0;

    /// Rest thresholds: a piece counts as settled below these
    pub const LINEAR_REST_SPEED: f32 = 0.1;
    pub const ANGULAR_REST_SPEED: f32 = 0.01;

    /// Combo window: fusions closer together than this chain up
    pub const COMBO_WINDOW_MS: f64 = 4000.0;
    /// Multiplier gained per chain link past the first
    pub const COMBO_STEP: f32 = 0.3;
    /// Multiplier ceiling
    pub const MAX_MULTIPLIER: f32 = 3.0;

    /// Board-clear bonus per surviving piece on terminal-tier formation
    pub const PER_PIECE_BONUS: u64 = 1000;
    /// Spawn suspension after terminal-tier resolution
    pub const TERMINAL_PAUSE_MS: f64 = 1500.0;

    /// Spawn gating
    pub const SETTLE_DELAY_MS: f64 = 600.0;
    pub const MAX_STABILIZE_MS: f64 = 2500.0;
    pub const STABILITY_POLL_MS: f64 = 50.0;
    pub const DROP_COOLDOWN_MS: f64 = 300.0;
    /// Loss condition is not evaluated this soon after a drop
    pub const OVERFLOW_GRACE_MS: f64 = 1000.0;

    /// Anti-stall forcing
    pub const MIN_FALL_SPEED: f32 = 1.5;
    pub const HORIZONTAL_DAMPING: f32 = 0.95;
    pub const MAX_ANGULAR_SPEED: f32 = std::f32::consts::FRAC_PI_4;
    pub const FORCE_FALL_INTERVAL_MS: f64 = 300.0;

    /// Container geometry (interior width is fixed; height comes from the stage)
    pub const CONTAINER_WIDTH: f32 = 260.0;
    pub const FRAME_THICKNESS: f32 = 10.0;
    pub const SPAWN_MARGIN: f32 = 28.0;
    /// Pieces spawn this far above the container's top line
    pub const SPAWN_HEIGHT: f32 = 70.0;
    pub const BASE_PIECE_SIZE: f32 = 25.0;

    /// Gravity (units/s², y-up)
    pub const GRAVITY: f32 = -900.0;

    /// Next-piece queue depth (current / next / then)
    pub const PREVIEW_LEN: usize = 3;
    /// Highest tier the spawner will deal
    pub const MAX_SPAWN_TIER: u8 = 4;
}
