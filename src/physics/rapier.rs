//! rapier2d-backed implementation of the [`PhysicsWorld`] contract
//!
//! rapier owns all body and collider storage; this adapter maps the engine's
//! opaque [`BodyHandle`]s onto rapier handles in both directions. Overlap
//! queries are answered from the narrow phase and sorted by handle id so the
//! pair sequence is reproducible across runs.

use std::collections::HashMap;

use glam::Vec2;
use rapier2d::prelude::*;

use super::{BodyHandle, BodyKind, Kinematics, PhysicsWorld};
use crate::sim::stage::ContainerBounds;

/// Side walls extend this far above the container's top line so pieces
/// spawned above it cannot drift out sideways.
const WALL_HEADROOM: f32 = 250.0;

// Piece bodies bounce a little and resist sliding; walls are duller.
const PIECE_RESTITUTION: f32 = 0.3;
const PIECE_FRICTION: f32 = 0.9;
const PIECE_LINEAR_DAMPING: f32 = 0.05;
const PIECE_ANGULAR_DAMPING: f32 = 0.3;
const WALL_RESTITUTION: f32 = 0.2;
const WALL_FRICTION: f32 = 0.3;

/// A rapier2d world configured for a box container under gravity
pub struct RapierWorld {
    pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    integration_params: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    /// Thickness used when building boundary walls
    frame_thickness: f32,
    next_id: u64,
    id_to_body: HashMap<u64, RigidBodyHandle>,
    collider_to_id: HashMap<ColliderHandle, u64>,
    kinds: HashMap<u64, BodyKind>,
    /// Current boundary bodies, replaced wholesale on stage change
    wall_handles: Vec<RigidBodyHandle>,
}

impl RapierWorld {
    pub fn new(gravity_y: f32, frame_thickness: f32) -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: vector![0.0, gravity_y],
            integration_params: IntegrationParameters::default(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            frame_thickness,
            next_id: 0,
            id_to_body: HashMap::new(),
            collider_to_id: HashMap::new(),
            kinds: HashMap::new(),
            wall_handles: Vec::new(),
        }
    }

    /// Number of live bodies, walls included
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn add_wall(&mut self, center: Vec2, half_x: f32, half_y: f32) {
        let rb = RigidBodyBuilder::fixed()
            .translation(vector![center.x, center.y])
            .build();
        let handle = self.bodies.insert(rb);
        let collider = ColliderBuilder::cuboid(half_x, half_y)
            .restitution(WALL_RESTITUTION)
            .friction(WALL_FRICTION)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        self.wall_handles.push(handle);
    }

    fn remove_body_handle(&mut self, handle: RigidBodyHandle) {
        self.bodies.remove(
            handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }
}

impl PhysicsWorld for RapierWorld {
    fn create_body(&mut self, kind: BodyKind, position: Vec2, size: f32) -> BodyHandle {
        let id = self.next_id;
        self.next_id += 1;

        let (rb, collider) = match kind {
            BodyKind::Piece => {
                let rb = RigidBodyBuilder::dynamic()
                    .translation(vector![position.x, position.y])
                    .linear_damping(PIECE_LINEAR_DAMPING)
                    .angular_damping(PIECE_ANGULAR_DAMPING)
                    .ccd_enabled(true)
                    .build();
                let collider = ColliderBuilder::ball(size / 2.0)
                    .restitution(PIECE_RESTITUTION)
                    .friction(PIECE_FRICTION)
                    .build();
                (rb, collider)
            }
            BodyKind::Wall => {
                let rb = RigidBodyBuilder::fixed()
                    .translation(vector![position.x, position.y])
                    .build();
                let collider = ColliderBuilder::cuboid(size / 2.0, size / 2.0)
                    .restitution(WALL_RESTITUTION)
                    .friction(WALL_FRICTION)
                    .build();
                (rb, collider)
            }
        };

        let body_handle = self.bodies.insert(rb);
        let collider_handle =
            self.colliders
                .insert_with_parent(collider, body_handle, &mut self.bodies);

        self.id_to_body.insert(id, body_handle);
        self.collider_to_id.insert(collider_handle, id);
        self.kinds.insert(id, kind);
        BodyHandle(id)
    }

    fn destroy_body(&mut self, handle: BodyHandle) {
        if let Some(body_handle) = self.id_to_body.remove(&handle.0) {
            self.kinds.remove(&handle.0);
            self.collider_to_id.retain(|_, id| *id != handle.0);
            self.remove_body_handle(body_handle);
        }
    }

    fn step(&mut self, dt_ms: f64) {
        self.integration_params.dt = (dt_ms / 1000.0) as Real;
        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }

    fn kinematics(&self, handle: BodyHandle) -> Option<Kinematics> {
        let body_handle = self.id_to_body.get(&handle.0)?;
        let rb = self.bodies.get(*body_handle)?;
        let trans = rb.translation();
        let vel = rb.linvel();
        Some(Kinematics {
            position: Vec2::new(trans.x, trans.y),
            velocity: Vec2::new(vel.x, vel.y),
            angular_velocity: rb.angvel(),
        })
    }

    fn overlapping_pairs(&self) -> Vec<(BodyHandle, BodyHandle)> {
        let mut pairs = Vec::new();
        for contact in self.narrow_phase.contact_pairs() {
            if !contact.has_any_active_contact {
                continue;
            }
            let a = self.collider_to_id.get(&contact.collider1).copied();
            let b = self.collider_to_id.get(&contact.collider2).copied();
            let (Some(a), Some(b)) = (a, b) else { continue };
            // Only piece/piece contacts are the core's business.
            if self.kinds.get(&a) != Some(&BodyKind::Piece)
                || self.kinds.get(&b) != Some(&BodyKind::Piece)
            {
                continue;
            }
            pairs.push((BodyHandle(a.min(b)), BodyHandle(a.max(b))));
        }
        pairs.sort();
        pairs.dedup();
        pairs
    }

    fn replace_boundary(&mut self, bounds: &ContainerBounds) {
        for handle in std::mem::take(&mut self.wall_handles) {
            self.remove_body_handle(handle);
        }

        let t = self.frame_thickness;
        let width = bounds.max_x - bounds.min_x;
        let cx = (bounds.min_x + bounds.max_x) / 2.0;
        let wall_top = bounds.max_y + WALL_HEADROOM;
        let wall_bottom = bounds.min_y - t;
        let wall_cy = (wall_top + wall_bottom) / 2.0;
        let wall_half_h = (wall_top - wall_bottom) / 2.0;

        // Floor, then left and right walls.
        self.add_wall(
            Vec2::new(cx, bounds.min_y - t / 2.0),
            width / 2.0 + t,
            t / 2.0,
        );
        self.add_wall(
            Vec2::new(bounds.min_x - t / 2.0, wall_cy),
            t / 2.0,
            wall_half_h,
        );
        self.add_wall(
            Vec2::new(bounds.max_x + t / 2.0, wall_cy),
            t / 2.0,
            wall_half_h,
        );
    }

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) {
        if let Some(body_handle) = self.id_to_body.get(&handle.0) {
            if let Some(rb) = self.bodies.get_mut(*body_handle) {
                rb.set_linvel(vector![velocity.x, velocity.y], true);
            }
        }
    }

    fn set_angular_velocity(&mut self, handle: BodyHandle, angular_velocity: f32) {
        if let Some(body_handle) = self.id_to_body.get(&handle.0) {
            if let Some(rb) = self.bodies.get_mut(*body_handle) {
                rb.set_angvel(angular_velocity, true);
            }
        }
    }
}
