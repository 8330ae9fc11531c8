//! Game tuning configuration
//!
//! A single immutable [`GameConfig`] is handed to constructors at session
//! start. Stage changes derive fresh container bounds from it rather than
//! mutating shared state from multiple call sites.

use serde::{Deserialize, Serialize};

use crate::consts;
use crate::sim::stage::Stage;
use crate::sim::tier::TierTable;

/// Complete tuning set for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    // === Container geometry ===
    /// Outer box width; interior width is this minus two frame thicknesses
    pub container_width: f32,
    pub frame_thickness: f32,
    /// Safety margin kept between a spawn point and the side walls
    pub spawn_margin: f32,
    /// Pieces spawn this far above the container's interior top line
    pub spawn_height: f32,
    /// Tier size factors scale this base diameter
    pub base_piece_size: f32,
    /// Gravity (units/s², y-up)
    pub gravity: f32,
    /// Fixed simulation timestep in milliseconds
    pub tick_dt_ms: f64,

    // === Rest thresholds ===
    pub linear_rest_speed: f32,
    pub angular_rest_speed: f32,

    // === Anti-stall forcing ===
    pub min_fall_speed: f32,
    pub horizontal_damping: f32,
    pub max_angular_speed: f32,
    pub force_fall_interval_ms: f64,

    // === Spawn gating and drops ===
    pub settle_delay_ms: f64,
    pub max_stabilize_ms: f64,
    pub stability_poll_ms: f64,
    pub drop_cooldown_ms: f64,
    /// Loss condition is not evaluated this soon after a drop
    pub overflow_grace_ms: f64,

    // === Combo scoring ===
    pub combo_window_ms: f64,
    pub combo_step: f32,
    pub max_multiplier: f32,

    // === Terminal-tier resolution ===
    pub per_piece_bonus: u64,
    pub terminal_pause_ms: f64,

    // === Next-piece queue ===
    pub preview_len: usize,
    /// Highest tier the spawner will deal
    pub max_spawn_tier: u8,

    // === Tables ===
    pub tiers: TierTable,
    /// Ascending score thresholds with the interior height each one brings
    pub stages: Vec<Stage>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            container_width: consts::CONTAINER_WIDTH,
            frame_thickness: consts::FRAME_THICKNESS,
            spawn_margin: consts::SPAWN_MARGIN,
            spawn_height: consts::SPAWN_HEIGHT,
            base_piece_size: consts::BASE_PIECE_SIZE,
            gravity: consts::GRAVITY,
            tick_dt_ms: consts::TICK_DT_MS,

            linear_rest_speed: consts::LINEAR_REST_SPEED,
            angular_rest_speed: consts::ANGULAR_REST_SPEED,

            min_fall_speed: consts::MIN_FALL_SPEED,
            horizontal_damping: consts::HORIZONTAL_DAMPING,
            max_angular_speed: consts::MAX_ANGULAR_SPEED,
            force_fall_interval_ms: consts::FORCE_FALL_INTERVAL_MS,

            settle_delay_ms: consts::SETTLE_DELAY_MS,
            max_stabilize_ms: consts::MAX_STABILIZE_MS,
            stability_poll_ms: consts::STABILITY_POLL_MS,
            drop_cooldown_ms: consts::DROP_COOLDOWN_MS,
            overflow_grace_ms: consts::OVERFLOW_GRACE_MS,

            combo_window_ms: consts::COMBO_WINDOW_MS,
            combo_step: consts::COMBO_STEP,
            max_multiplier: consts::MAX_MULTIPLIER,

            per_piece_bonus: consts::PER_PIECE_BONUS,
            terminal_pause_ms: consts::TERMINAL_PAUSE_MS,

            preview_len: consts::PREVIEW_LEN,
            max_spawn_tier: consts::MAX_SPAWN_TIER,

            tiers: TierTable::standard(),
            stages: Stage::standard_progression(),
        }
    }
}

impl GameConfig {
    /// Interior container width between the side walls
    pub fn interior_width(&self) -> f32 {
        self.container_width - 2.0 * self.frame_thickness
    }
}
