//! Stage progression and container geometry
//!
//! Stages are score-gated configuration steps: crossing a threshold shrinks
//! the container's interior height and culls half the board. Advancement is
//! monotonic and takes at most one step per check; if the score leaps past
//! several thresholds in one tick, later ticks catch the rest.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;

/// One score-gated configuration step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub score_threshold: u64,
    /// Interior container height while this stage is active
    pub container_height: f32,
}

impl Stage {
    /// Reference progression: 40 units of headroom lost per threshold
    pub fn standard_progression() -> Vec<Stage> {
        [
            (0, 380.0),
            (1500, 340.0),
            (4000, 300.0),
            (9000, 260.0),
            (20000, 220.0),
        ]
        .into_iter()
        .map(|(score_threshold, container_height)| Stage {
            score_threshold,
            container_height,
        })
        .collect()
    }
}

/// Interior play region, y-up with the floor at `min_y`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerBounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl ContainerBounds {
    /// Derive interior bounds for a stage height; the container is centered
    /// on x = 0 with its floor at y = 0.
    pub fn for_height(config: &GameConfig, container_height: f32) -> Self {
        let half = config.interior_width() / 2.0;
        Self {
            min_x: -half,
            min_y: 0.0,
            max_x: half,
            max_y: container_height,
        }
    }

    /// Horizontal range spawn targets may occupy
    pub fn spawn_range(&self, margin: f32) -> (f32, f32) {
        (self.min_x + margin, self.max_x - margin)
    }

    /// Where a new piece appears for a given target x
    pub fn spawn_point(&self, x: f32, spawn_height: f32) -> Vec2 {
        Vec2::new(x, self.max_y + spawn_height)
    }
}

/// Tracks the active stage index against the ascending stage table
#[derive(Debug, Clone, Copy, Default)]
pub struct StageController {
    current: usize,
}

impl StageController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// The active stage's data
    pub fn stage<'a>(&self, stages: &'a [Stage]) -> &'a Stage {
        &stages[self.current.min(stages.len() - 1)]
    }

    /// Compare the score against the table and step forward at most one
    /// stage. Returns the new index when an advance happened.
    pub fn check_advance(&mut self, total_score: u64, stages: &[Stage]) -> Option<usize> {
        let target = stages
            .iter()
            .rposition(|s| s.score_threshold <= total_score)
            .unwrap_or(0);
        if target > self.current {
            self.current += 1;
            Some(self.current)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stages() -> Vec<Stage> {
        Stage::standard_progression()
    }

    #[test]
    fn test_no_advance_below_threshold() {
        let mut controller = StageController::new();
        assert_eq!(controller.check_advance(0, &stages()), None);
        assert_eq!(controller.check_advance(1499, &stages()), None);
        assert_eq!(controller.current(), 0);
    }

    #[test]
    fn test_advance_on_crossing() {
        let mut controller = StageController::new();
        assert_eq!(controller.check_advance(1500, &stages()), Some(1));
        assert_eq!(controller.current(), 1);
        // Same score again: no further advance.
        assert_eq!(controller.check_advance(1500, &stages()), None);
    }

    #[test]
    fn test_one_step_per_check_when_score_leaps() {
        let mut controller = StageController::new();
        // Score jumps straight past three thresholds; each check advances one.
        assert_eq!(controller.check_advance(10_000, &stages()), Some(1));
        assert_eq!(controller.check_advance(10_000, &stages()), Some(2));
        assert_eq!(controller.check_advance(10_000, &stages()), Some(3));
        assert_eq!(controller.check_advance(10_000, &stages()), None);
    }

    #[test]
    fn test_advancement_is_monotonic() {
        let mut controller = StageController::new();
        controller.check_advance(5000, &stages());
        let reached = controller.current();
        // A lower score never regresses the stage.
        assert_eq!(controller.check_advance(0, &stages()), None);
        assert_eq!(controller.current(), reached);
    }

    #[test]
    fn test_bounds_derivation() {
        let config = GameConfig::default();
        let bounds = ContainerBounds::for_height(&config, 380.0);
        assert!((bounds.max_x - 120.0).abs() < 1e-6);
        assert!((bounds.min_x + 120.0).abs() < 1e-6);
        assert!((bounds.max_y - 380.0).abs() < 1e-6);

        let shrunk = ContainerBounds::for_height(&config, 220.0);
        assert!(shrunk.max_y < bounds.max_y, "stage advance lowers the top line");
        assert_eq!(shrunk.min_x, bounds.min_x, "width is fixed across stages");
    }

    #[test]
    fn test_spawn_range_and_point() {
        let config = GameConfig::default();
        let bounds = ContainerBounds::for_height(&config, 380.0);
        let (lo, hi) = bounds.spawn_range(config.spawn_margin);
        assert!(lo < hi);
        assert!(lo > bounds.min_x && hi < bounds.max_x);

        let spawn = bounds.spawn_point(0.0, config.spawn_height);
        assert!(spawn.y > bounds.max_y, "pieces spawn above the top line");
    }
}
