//! Combo tracking and score accumulation
//!
//! Fusions that land within a rolling time window chain up: each link past
//! the first raises the payout multiplier by a fixed step, up to a cap.
//! Silence past the window deadline resets the chain. Terminal-tier
//! formation pays a board-clear bonus instead and resets the chain outright.
//!
//! All timing is expressed as timestamp comparisons evaluated from the tick
//! handler; there are no deferred callbacks.

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::GameError;

/// Rolling combo state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComboState {
    pub multiplier: f32,
    pub chain_count: u32,
    /// The chain survives until this moment; `None` while inactive
    pub window_deadline: Option<f64>,
}

impl Default for ComboState {
    fn default() -> Self {
        Self {
            multiplier: 1.0,
            chain_count: 0,
            window_deadline: None,
        }
    }
}

impl ComboState {
    fn active(&self, now_ms: f64) -> bool {
        self.window_deadline.is_some_and(|deadline| now_ms <= deadline)
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// What one ordinary fusion batch paid out
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComboPayout {
    pub chain_count: u32,
    pub multiplier: f32,
    pub delta: u64,
}

/// Accumulated score plus the combo state machine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scoreboard {
    total: u64,
    combo: ComboState,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn combo(&self) -> &ComboState {
        &self.combo
    }

    /// Combo decay. Call once per tick: a deadline left behind resets the
    /// chain to inactive.
    pub fn tick(&mut self, now_ms: f64) {
        if self.combo.window_deadline.is_some_and(|d| now_ms > d) {
            self.combo.reset();
        }
    }

    /// Apply one ordinary fusion batch: extend or restart the chain, re-arm
    /// the decay deadline, and bank `floor(tier_score * multiplier)`.
    ///
    /// `InvalidScore` leaves the scoreboard untouched. The table is
    /// validated at construction, so this is a configuration defect the
    /// caller logs and skips.
    pub fn on_fusion(
        &mut self,
        source_tier: u8,
        config: &GameConfig,
        now_ms: f64,
    ) -> Result<ComboPayout, GameError> {
        let base = config.tiers.score(source_tier)?;

        let chain = if self.combo.active(now_ms) {
            self.combo.chain_count + 1
        } else {
            1
        };
        // The first link pays 1.0x; each later link adds one step.
        let multiplier = (1.0 + (chain - 1) as f64 * f64::from(config.combo_step))
            .min(f64::from(config.max_multiplier));
        let delta = (f64::from(base) * multiplier).floor() as u64;

        self.combo.chain_count = chain;
        self.combo.multiplier = multiplier as f32;
        self.combo.window_deadline = Some(now_ms + config.combo_window_ms);
        self.total += delta;

        Ok(ComboPayout {
            chain_count: chain,
            multiplier: multiplier as f32,
            delta,
        })
    }

    /// Terminal-tier payout: the terminal score plus a bonus per surviving
    /// piece. `piece_count` is the registry size including the newly formed
    /// terminal piece; the `- 1` excludes it. Resets the combo.
    pub fn on_terminal(
        &mut self,
        piece_count: usize,
        config: &GameConfig,
    ) -> Result<u64, GameError> {
        let base = u64::from(config.tiers.score(config.tiers.terminal())?);
        let bonus = base + piece_count.saturating_sub(1) as u64 * config.per_piece_bonus;
        self.total += bonus;
        self.combo.reset();
        Ok(bonus)
    }
}
