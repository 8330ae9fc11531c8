//! Physics World collaborator contract
//!
//! The simulation core does not perform contact physics. It drives an
//! external rigid-body world through [`PhysicsWorld`]: bodies are created and
//! destroyed alongside pieces, advanced by a fixed timestep, then read back
//! as per-body kinematics plus overlapping-body pairs.
//!
//! The shipped backend is [`rapier::RapierWorld`]; tests drive the core
//! through a scripted in-memory implementation instead.

pub mod rapier;

use glam::Vec2;

use crate::sim::stage::ContainerBounds;

/// Opaque reference to a body owned by the physics backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyHandle(pub u64);

/// What a body is for; backends pick shape and material per kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Dynamic circular piece; `size` is its diameter
    Piece,
    /// Static square obstacle; `size` is its side length
    Wall,
}

/// Per-body state read back after stepping
#[derive(Debug, Clone, Copy, Default)]
pub struct Kinematics {
    pub position: Vec2,
    pub velocity: Vec2,
    pub angular_velocity: f32,
}

/// Contract the simulation core expects from a rigid-body backend
pub trait PhysicsWorld {
    fn create_body(&mut self, kind: BodyKind, position: Vec2, size: f32) -> BodyHandle;

    /// Remove a body. Unknown handles are a no-op.
    fn destroy_body(&mut self, handle: BodyHandle);

    /// Advance the world by one fixed timestep
    fn step(&mut self, dt_ms: f64);

    fn kinematics(&self, handle: BodyHandle) -> Option<Kinematics>;

    /// Piece-body pairs currently in contact. Order may be arbitrary; the
    /// fusion engine re-sorts by piece identity before claiming.
    fn overlapping_pairs(&self) -> Vec<(BodyHandle, BodyHandle)>;

    /// Swap the container walls for ones matching the new bounds
    fn replace_boundary(&mut self, bounds: &ContainerBounds);

    /// Overwrite a body's linear velocity (anti-stall forcing)
    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2);

    /// Overwrite a body's angular velocity (anti-stall forcing)
    fn set_angular_velocity(&mut self, handle: BodyHandle, angular_velocity: f32);
}

#[cfg(test)]
pub(crate) mod scripted {
    //! Hand-driven backend for unit tests: no dynamics at all. Kinematics and
    //! the overlap report are whatever the test sets them to.

    use std::collections::BTreeMap;

    use super::*;

    #[derive(Default)]
    pub struct ScriptedWorld {
        next_id: u64,
        pub bodies: BTreeMap<u64, Kinematics>,
        pub pairs: Vec<(BodyHandle, BodyHandle)>,
        pub boundary: Option<ContainerBounds>,
        pub steps: u32,
    }

    impl ScriptedWorld {
        pub fn new() -> Self {
            Self::default()
        }

        /// Overwrite a body's full kinematic state
        pub fn put(&mut self, handle: BodyHandle, kin: Kinematics) {
            self.bodies.insert(handle.0, kin);
        }

        pub fn mark_overlap(&mut self, a: BodyHandle, b: BodyHandle) {
            self.pairs.push((a, b));
        }

        pub fn clear_overlaps(&mut self) {
            self.pairs.clear();
        }
    }

    impl PhysicsWorld for ScriptedWorld {
        fn create_body(&mut self, _kind: BodyKind, position: Vec2, _size: f32) -> BodyHandle {
            let id = self.next_id;
            self.next_id += 1;
            self.bodies.insert(
                id,
                Kinematics {
                    position,
                    ..Default::default()
                },
            );
            BodyHandle(id)
        }

        fn destroy_body(&mut self, handle: BodyHandle) {
            self.bodies.remove(&handle.0);
            self.pairs.retain(|&(a, b)| a != handle && b != handle);
        }

        fn step(&mut self, _dt_ms: f64) {
            self.steps += 1;
        }

        fn kinematics(&self, handle: BodyHandle) -> Option<Kinematics> {
            self.bodies.get(&handle.0).copied()
        }

        fn overlapping_pairs(&self) -> Vec<(BodyHandle, BodyHandle)> {
            self.pairs.clone()
        }

        fn replace_boundary(&mut self, bounds: &ContainerBounds) {
            self.boundary = Some(*bounds);
        }

        fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) {
            if let Some(kin) = self.bodies.get_mut(&handle.0) {
                kin.velocity = velocity;
            }
        }

        fn set_angular_velocity(&mut self, handle: BodyHandle, angular_velocity: f32) {
            if let Some(kin) = self.bodies.get_mut(&handle.0) {
                kin.angular_velocity = angular_velocity;
            }
        }
    }
}
