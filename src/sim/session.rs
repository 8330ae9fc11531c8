//! Game session orchestration
//!
//! One play-through: the session owns the registry, scoreboard, stage
//! controller, spawn gate, and next-piece queue, and drives them from
//! [`GameSession::tick`] in a fixed order: physics advance, stability and
//! overflow reads, fusion, score/combo/stage updates, anti-stall forcing,
//! game-over check. All mutable state is single-writer: nothing outside the
//! tick handler and the two input entry points touches it, and every timer is
//! a timestamp comparison evaluated inside the tick.

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::config::GameConfig;
use crate::physics::PhysicsWorld;
use crate::sim::combo::{ComboState, Scoreboard};
use crate::sim::fusion::{self, FusionBatch};
use crate::sim::piece::{Piece, PieceRegistry};
use crate::sim::spawn::{SpawnGate, SpawnGateState};
use crate::sim::stage::{ContainerBounds, StageController};

/// Notifications for the presentation layer. Purely observational: nothing
/// feeds back into the core.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    PieceSpawned {
        id: u32,
        tier: u8,
        position: Vec2,
    },
    Fusion {
        count: usize,
        source_tier: u8,
        positions: Vec<Vec2>,
    },
    ComboShown {
        chain_count: u32,
        multiplier: f32,
        delta: u64,
    },
    TerminalBonus {
        bonus: u64,
        cleared: usize,
    },
    StageAdvanced {
        index: usize,
        container_height: f32,
        culled: Vec<u32>,
    },
    GameOver {
        score: u64,
    },
}

/// One play-through of the merge game
pub struct GameSession<P: PhysicsWorld> {
    config: GameConfig,
    physics: P,
    registry: PieceRegistry,
    scoreboard: Scoreboard,
    stage: StageController,
    bounds: ContainerBounds,
    gate: SpawnGate,
    /// Upcoming tiers: front is the piece currently offered
    queue: VecDeque<u8>,
    rng: Pcg32,
    target_x: f32,
    now_ms: f64,
    /// Terminal resolution suspends spawning until this moment
    spawn_paused_until_ms: f64,
    game_over: bool,
    events: Vec<GameEvent>,
}

impl<P: PhysicsWorld> GameSession<P> {
    pub fn new(config: GameConfig, seed: u64, mut physics: P) -> Self {
        let stage = StageController::new();
        let bounds =
            ContainerBounds::for_height(&config, stage.stage(&config.stages).container_height);
        physics.replace_boundary(&bounds);

        let mut rng = Pcg32::seed_from_u64(seed);
        let queue = (0..config.preview_len)
            .map(|_| rng.random_range(0..=config.max_spawn_tier))
            .collect();

        log::info!("session started with seed {seed}");

        Self {
            config,
            physics,
            registry: PieceRegistry::new(),
            scoreboard: Scoreboard::new(),
            stage,
            bounds,
            gate: SpawnGate::new(),
            queue,
            rng,
            target_x: 0.0,
            now_ms: 0.0,
            spawn_paused_until_ms: f64::NEG_INFINITY,
            game_over: false,
            events: Vec::new(),
        }
    }

    // === Input entry points ===

    /// Update the intended spawn x, clamped to the container minus margin.
    pub fn set_target_x(&mut self, x: f32) {
        let (lo, hi) = self.bounds.spawn_range(self.config.spawn_margin);
        self.target_x = x.clamp(lo, hi);
    }

    /// Ask to drop the offered piece. Refused while the gate is settling,
    /// during the terminal pause, inside the re-drop cooldown, or after game
    /// over, whatever cadence the input source runs at.
    pub fn try_drop(&mut self) -> bool {
        if self.game_over || !self.gate.is_ready() {
            return false;
        }
        if self.now_ms < self.spawn_paused_until_ms {
            return false;
        }
        if self.now_ms - self.gate.last_drop_ms() < self.config.drop_cooldown_ms {
            return false;
        }

        let tier = self.queue.pop_front().unwrap_or(0);
        self.queue
            .push_back(self.rng.random_range(0..=self.config.max_spawn_tier));

        let position = self.bounds.spawn_point(self.target_x, self.config.spawn_height);
        match self
            .registry
            .create(&mut self.physics, &self.config, tier, position, self.now_ms)
        {
            Ok(id) => {
                self.gate.on_drop(self.now_ms);
                self.events.push(GameEvent::PieceSpawned { id, tier, position });
                true
            }
            Err(err) => {
                log::error!("drop rejected: {err}");
                false
            }
        }
    }

    // === Tick ===

    /// Advance the simulation by one fixed timestep. Inert after game over;
    /// the driving loop simply stops re-arming.
    pub fn tick(&mut self) {
        if self.game_over {
            return;
        }
        self.now_ms += self.config.tick_dt_ms;
        let now = self.now_ms;

        // 1. Physics advance (external collaborator).
        self.physics.step(self.config.tick_dt_ms);

        // 2. Stability/overflow reads against the post-step kinematics.
        let overflowing = self
            .registry
            .is_overflowing(&self.physics, &self.bounds, &self.config);

        // 3. Fusion detection and resolution.
        let batch = fusion::resolve(&mut self.registry, &mut self.physics, &self.config, now);
        match batch {
            FusionBatch::Fused {
                count,
                source_tier,
                positions,
            } => {
                self.events.push(GameEvent::Fusion {
                    count,
                    source_tier,
                    positions,
                });
                match self.scoreboard.on_fusion(source_tier, &self.config, now) {
                    Ok(payout) => self.events.push(GameEvent::ComboShown {
                        chain_count: payout.chain_count,
                        multiplier: payout.multiplier,
                        delta: payout.delta,
                    }),
                    Err(err) => log::error!("score increment skipped: {err}"),
                }
                self.gate.on_fusion(now);
            }
            FusionBatch::Terminal { .. } => self.resolve_terminal(now),
            FusionBatch::None => {}
        }

        // 4. Combo decay, then stage progression on the updated score.
        self.scoreboard.tick(now);
        if let Some(index) = self
            .stage
            .check_advance(self.scoreboard.total(), &self.config.stages)
        {
            let container_height = self.config.stages[index].container_height;
            self.bounds = ContainerBounds::for_height(&self.config, container_height);
            let culled = self.registry.cull_lowest_half(&mut self.physics);
            self.physics.replace_boundary(&self.bounds);
            log::info!(
                "stage {index}: container height {container_height}, culled {} pieces",
                culled.len()
            );
            self.events.push(GameEvent::StageAdvanced {
                index,
                container_height,
                culled,
            });
        }

        // 5. Spawn gate re-check and anti-stall forcing.
        let stable_check = {
            let registry = &self.registry;
            let physics = &self.physics;
            let config = &self.config;
            move || registry.all_stable(physics, config)
        };
        self.gate.poll(now, &self.config, stable_check);
        self.registry
            .force_descent(&mut self.physics, &self.config, now);

        // 6. Game over: only a settled overflow past the grace period counts.
        if overflowing && now - self.gate.last_drop_ms() >= self.config.overflow_grace_ms {
            self.game_over = true;
            log::info!("game over at {} points", self.scoreboard.total());
            self.events.push(GameEvent::GameOver {
                score: self.scoreboard.total(),
            });
        }
    }

    /// Terminal-tier resolution: board-clear bonus, full registry reset, and
    /// a fixed spawn suspension for the presentation moment.
    fn resolve_terminal(&mut self, now: f64) {
        let piece_count = self.registry.len();
        let cleared = self.registry.clear(&mut self.physics);
        self.spawn_paused_until_ms = now + self.config.terminal_pause_ms;

        match self.scoreboard.on_terminal(piece_count, &self.config) {
            Ok(bonus) => {
                log::info!("terminal tier formed: +{bonus} ({cleared} pieces cleared)");
                self.events.push(GameEvent::TerminalBonus { bonus, cleared });
            }
            Err(err) => log::error!("terminal bonus skipped: {err}"),
        }
    }

    // === Read-side accessors ===

    pub fn score(&self) -> u64 {
        self.scoreboard.total()
    }

    pub fn combo(&self) -> &ComboState {
        self.scoreboard.combo()
    }

    pub fn stage_index(&self) -> usize {
        self.stage.current()
    }

    pub fn bounds(&self) -> &ContainerBounds {
        &self.bounds
    }

    pub fn pieces(&self) -> &[Piece] {
        self.registry.pieces()
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    /// Upcoming tiers, offered piece first
    pub fn upcoming(&self) -> impl Iterator<Item = u8> + '_ {
        self.queue.iter().copied()
    }

    pub fn spawn_state(&self) -> SpawnGateState {
        self.gate.state()
    }

    pub fn target_x(&self) -> f32 {
        self.target_x
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Hand the buffered notifications to the presentation layer.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
