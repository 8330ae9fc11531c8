//! Piece entities and the live-piece registry
//!
//! A piece exclusively owns its physics body: created together, destroyed
//! together, so there are never orphans in either direction. The registry is
//! a membership collection; it keeps pieces in ascending id order (ids are
//! never reused within a session) so no downstream pass can depend on
//! insertion accidents.

use glam::Vec2;

use crate::config::GameConfig;
use crate::error::GameError;
use crate::physics::{BodyHandle, BodyKind, Kinematics, PhysicsWorld};
use crate::sim::stage::ContainerBounds;
use crate::sim::tier::TierTable;

/// A single simulated object
#[derive(Debug, Clone)]
pub struct Piece {
    pub id: u32,
    pub tier: u8,
    pub body: BodyHandle,
    /// Diameter, derived from the base size and the tier's size factor
    pub size: f32,
    pub created_at_ms: f64,
    /// Anti-stall forcing is rate-limited per piece
    last_descent_check_ms: f64,
}

impl Piece {
    /// Equal non-terminal tiers fuse
    pub fn can_fuse(&self, other: &Piece, tiers: &TierTable) -> bool {
        self.tier == other.tier && !tiers.is_terminal(self.tier)
    }
}

fn at_rest(kin: &Kinematics, config: &GameConfig) -> bool {
    kin.velocity.x.abs() < config.linear_rest_speed
        && kin.velocity.y.abs() < config.linear_rest_speed
        && kin.angular_velocity.abs() < config.angular_rest_speed
}

/// Owns the live piece set and keeps it in lockstep with the physics world
#[derive(Debug, Default)]
pub struct PieceRegistry {
    pieces: Vec<Piece>,
    next_id: u32,
}

impl PieceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Live pieces in ascending id order
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn get(&self, id: u32) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    pub fn by_body(&self, body: BodyHandle) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.body == body)
    }

    /// Instantiate a piece and its physics body at `position`.
    /// `InvalidTier` rejects the operation with nothing mutated.
    pub fn create(
        &mut self,
        physics: &mut impl PhysicsWorld,
        config: &GameConfig,
        tier: u8,
        position: Vec2,
        now_ms: f64,
    ) -> Result<u32, GameError> {
        let size = config.base_piece_size * config.tiers.size_factor(tier)?;
        let body = physics.create_body(BodyKind::Piece, position, size);
        let id = self.next_id;
        self.next_id += 1;
        self.pieces.push(Piece {
            id,
            tier,
            body,
            size,
            created_at_ms: now_ms,
            last_descent_check_ms: now_ms,
        });
        Ok(id)
    }

    /// Destroy the piece's body and drop it from the collection. Removing a
    /// piece that is not present is a `DoubleRemoval` no-op error.
    pub fn remove(&mut self, physics: &mut impl PhysicsWorld, id: u32) -> Result<(), GameError> {
        match self.pieces.iter().position(|p| p.id == id) {
            Some(idx) => {
                let piece = self.pieces.remove(idx);
                physics.destroy_body(piece.body);
                Ok(())
            }
            None => Err(GameError::DoubleRemoval(id)),
        }
    }

    /// Remove every piece (terminal-tier board reset). Returns the count.
    pub fn clear(&mut self, physics: &mut impl PhysicsWorld) -> usize {
        let count = self.pieces.len();
        for piece in self.pieces.drain(..) {
            physics.destroy_body(piece.body);
        }
        count
    }

    /// True iff every piece is at rest. Vacuously true when empty.
    pub fn all_stable(&self, physics: &impl PhysicsWorld, config: &GameConfig) -> bool {
        self.pieces.iter().all(|p| {
            physics
                .kinematics(p.body)
                .map_or(true, |kin| at_rest(&kin, config))
        })
    }

    /// Loss condition: some piece is vertically settled with its top edge at
    /// or above the interior top line. A piece still falling fast through the
    /// line does not count. Vacuously false when empty.
    pub fn is_overflowing(
        &self,
        physics: &impl PhysicsWorld,
        bounds: &ContainerBounds,
        config: &GameConfig,
    ) -> bool {
        self.pieces.iter().any(|p| {
            physics.kinematics(p.body).is_some_and(|kin| {
                kin.velocity.y.abs() < config.linear_rest_speed
                    && kin.position.y + p.size / 2.0 >= bounds.max_y
            })
        })
    }

    /// Anti-stall safeguard, run every tick: pieces that are moving but not
    /// settling get their velocity clamped toward a minimum downward speed,
    /// horizontal drift damped, and spin capped. Rate-limited per piece.
    pub fn force_descent(
        &mut self,
        physics: &mut impl PhysicsWorld,
        config: &GameConfig,
        now_ms: f64,
    ) {
        for piece in &mut self.pieces {
            if now_ms - piece.last_descent_check_ms < config.force_fall_interval_ms {
                continue;
            }
            piece.last_descent_check_ms = now_ms;

            let Some(kin) = physics.kinematics(piece.body) else {
                continue;
            };
            if at_rest(&kin, config) {
                continue;
            }

            physics.set_velocity(
                piece.body,
                Vec2::new(
                    kin.velocity.x * config.horizontal_damping,
                    kin.velocity.y.min(-config.min_fall_speed),
                ),
            );
            if kin.angular_velocity.abs() > config.max_angular_speed {
                physics.set_angular_velocity(
                    piece.body,
                    config.max_angular_speed.copysign(kin.angular_velocity),
                );
            }
        }
    }

    /// Stage-advance cull: remove the lowest `floor(count / 2)` pieces in
    /// (tier, id) order, the fixed total order that makes culling
    /// deterministic. Returns the removed ids.
    pub fn cull_lowest_half(&mut self, physics: &mut impl PhysicsWorld) -> Vec<u32> {
        let mut order: Vec<(u8, u32)> = self.pieces.iter().map(|p| (p.tier, p.id)).collect();
        order.sort_unstable();

        let victims: Vec<u32> = order
            .into_iter()
            .take(self.pieces.len() / 2)
            .map(|(_, id)| id)
            .collect();
        for &id in &victims {
            // Ids were taken from the live set just above.
            let _ = self.remove(physics, id);
        }
        victims
    }
}
