//! Fusion detection and resolution
//!
//! Consumes the physics world's overlap report for one tick and turns it into
//! registry mutations: equal-tier, non-terminal pairs are claimed first-come
//! in a stable identity order, removed, and replaced by one successor piece
//! at their midpoint. The scan runs over a frozen snapshot of the report;
//! every mutation is applied only after the scan completes.

use std::collections::HashSet;

use glam::Vec2;

use crate::config::GameConfig;
use crate::physics::PhysicsWorld;
use crate::sim::piece::PieceRegistry;

/// Outcome of one fusion pass
#[derive(Debug, Clone, PartialEq)]
pub enum FusionBatch {
    /// No eligible contact this tick
    None,
    /// Ordinary fusions: `count` successors spawned from `source_tier` pairs
    Fused {
        count: usize,
        source_tier: u8,
        positions: Vec<Vec2>,
    },
    /// A successor reached the terminal tier. Supersedes ordinary scoring for
    /// the whole pass, however many ordinary fusions it also contained.
    Terminal { positions: Vec<Vec2> },
}

impl FusionBatch {
    pub fn is_none(&self) -> bool {
        matches!(self, FusionBatch::None)
    }
}

/// Run one fusion pass over the current overlap report.
///
/// Claim rule: once a piece joins a pair it cannot join another in the same
/// pass. Pairs are processed in ascending (min id, max id) order, so the
/// outcome does not depend on how the backend happens to order its report.
pub fn resolve(
    registry: &mut PieceRegistry,
    physics: &mut impl PhysicsWorld,
    config: &GameConfig,
    now_ms: f64,
) -> FusionBatch {
    if registry.len() < 2 {
        return FusionBatch::None;
    }

    let mut pairs: Vec<(u32, u32)> = physics
        .overlapping_pairs()
        .into_iter()
        .filter_map(|(a, b)| {
            let pa = registry.by_body(a)?.id;
            let pb = registry.by_body(b)?.id;
            Some((pa.min(pb), pa.max(pb)))
        })
        .collect();
    pairs.sort_unstable();
    pairs.dedup();

    let mut claimed: HashSet<u32> = HashSet::new();
    let mut to_remove: Vec<u32> = Vec::new();
    let mut to_spawn: Vec<(u8, Vec2)> = Vec::new();
    let mut source_tier = None;

    for (a, b) in pairs {
        if claimed.contains(&a) || claimed.contains(&b) {
            continue;
        }
        let (Some(pa), Some(pb)) = (registry.get(a), registry.get(b)) else {
            continue;
        };
        if !pa.can_fuse(pb, &config.tiers) {
            continue;
        }
        let (Some(ka), Some(kb)) = (physics.kinematics(pa.body), physics.kinematics(pb.body))
        else {
            continue;
        };

        claimed.insert(a);
        claimed.insert(b);
        to_remove.push(a);
        to_remove.push(b);
        source_tier = Some(pa.tier);
        if let Some(next) = config.tiers.next(pa.tier) {
            to_spawn.push((next, (ka.position + kb.position) / 2.0));
        }
    }

    let Some(source_tier) = source_tier else {
        return FusionBatch::None;
    };

    // Apply phase: all removals, then all spawns.
    for id in to_remove {
        if let Err(err) = registry.remove(physics, id) {
            log::warn!("fusion removal skipped: {err}");
        }
    }

    let mut positions = Vec::with_capacity(to_spawn.len());
    let mut terminal = false;
    for (tier, midpoint) in to_spawn {
        match registry.create(physics, config, tier, midpoint, now_ms) {
            Ok(_) => {
                positions.push(midpoint);
                terminal |= config.tiers.is_terminal(tier);
            }
            Err(err) => log::error!("fusion successor not spawned: {err}"),
        }
    }

    if terminal {
        FusionBatch::Terminal { positions }
    } else {
        FusionBatch::Fused {
            count: positions.len(),
            source_tier,
            positions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::scripted::ScriptedWorld;

    fn setup() -> (ScriptedWorld, PieceRegistry, GameConfig) {
        (ScriptedWorld::new(), PieceRegistry::new(), GameConfig::default())
    }

    fn add_piece(
        world: &mut ScriptedWorld,
        registry: &mut PieceRegistry,
        config: &GameConfig,
        tier: u8,
        x: f32,
        y: f32,
    ) -> u32 {
        registry
            .create(world, config, tier, Vec2::new(x, y), 0.0)
            .expect("test tier is valid")
    }

    fn bodies_of(registry: &PieceRegistry, a: u32, b: u32) -> (crate::physics::BodyHandle, crate::physics::BodyHandle) {
        (
            registry.get(a).unwrap().body,
            registry.get(b).unwrap().body,
        )
    }

    #[test]
    fn test_equal_tier_pair_fuses_to_successor_at_midpoint() {
        let (mut world, mut registry, config) = setup();
        let a = add_piece(&mut world, &mut registry, &config, 0, 10.0, 20.0);
        let b = add_piece(&mut world, &mut registry, &config, 0, 30.0, 40.0);
        let (ba, bb) = bodies_of(&registry, a, b);
        world.mark_overlap(ba, bb);

        let batch = resolve(&mut registry, &mut world, &config, 16.0);

        assert_eq!(
            batch,
            FusionBatch::Fused {
                count: 1,
                source_tier: 0,
                positions: vec![Vec2::new(20.0, 30.0)],
            }
        );
        assert!(registry.get(a).is_none() && registry.get(b).is_none(), "sources are gone");
        assert_eq!(registry.len(), 1);
        let successor = &registry.pieces()[0];
        assert_eq!(successor.tier, 1);
        let kin = world.kinematics(successor.body).unwrap();
        assert_eq!(kin.position, Vec2::new(20.0, 30.0), "successor sits at the midpoint");
    }

    #[test]
    fn test_mismatched_tiers_do_not_fuse() {
        let (mut world, mut registry, config) = setup();
        let a = add_piece(&mut world, &mut registry, &config, 0, 0.0, 0.0);
        let b = add_piece(&mut world, &mut registry, &config, 1, 5.0, 0.0);
        let (ba, bb) = bodies_of(&registry, a, b);
        world.mark_overlap(ba, bb);

        assert_eq!(resolve(&mut registry, &mut world, &config, 0.0), FusionBatch::None);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_terminal_pieces_never_fuse() {
        let (mut world, mut registry, config) = setup();
        let terminal = config.tiers.terminal();
        let a = add_piece(&mut world, &mut registry, &config, terminal, 0.0, 0.0);
        let b = add_piece(&mut world, &mut registry, &config, terminal, 5.0, 0.0);
        let (ba, bb) = bodies_of(&registry, a, b);
        world.mark_overlap(ba, bb);

        assert_eq!(resolve(&mut registry, &mut world, &config, 0.0), FusionBatch::None);
        assert_eq!(registry.len(), 2, "contact between terminal pieces is inert");
    }

    #[test]
    fn test_claimed_piece_cannot_join_a_second_pair() {
        let (mut world, mut registry, config) = setup();
        let a = add_piece(&mut world, &mut registry, &config, 0, 0.0, 0.0);
        let b = add_piece(&mut world, &mut registry, &config, 0, 10.0, 0.0);
        let c = add_piece(&mut world, &mut registry, &config, 0, 20.0, 0.0);
        let (ba, bb) = bodies_of(&registry, a, b);
        let bc = registry.get(c).unwrap().body;
        // b touches both neighbors; only one pair may claim it.
        world.mark_overlap(ba, bb);
        world.mark_overlap(bb, bc);

        let batch = resolve(&mut registry, &mut world, &config, 0.0);

        match batch {
            FusionBatch::Fused { count, .. } => assert_eq!(count, 1),
            other => panic!("expected one fusion, got {other:?}"),
        }
        assert!(registry.get(c).is_some(), "the unclaimed piece survives");
        assert_eq!(registry.len(), 2, "successor plus the leftover piece");
    }

    #[test]
    fn test_outcome_is_independent_of_report_order() {
        let run = |reversed: bool| {
            let (mut world, mut registry, config) = setup();
            let a = add_piece(&mut world, &mut registry, &config, 0, 0.0, 0.0);
            let b = add_piece(&mut world, &mut registry, &config, 0, 10.0, 0.0);
            let c = add_piece(&mut world, &mut registry, &config, 0, 20.0, 0.0);
            let (ba, bb) = bodies_of(&registry, a, b);
            let bc = registry.get(c).unwrap().body;
            if reversed {
                world.mark_overlap(bc, bb);
                world.mark_overlap(bb, ba);
            } else {
                world.mark_overlap(ba, bb);
                world.mark_overlap(bb, bc);
            }
            let batch = resolve(&mut registry, &mut world, &config, 0.0);
            let mut survivors: Vec<u8> = registry.pieces().iter().map(|p| p.tier).collect();
            survivors.sort_unstable();
            (batch, survivors)
        };

        assert_eq!(run(false), run(true), "claim order follows piece identity, not report order");
    }

    #[test]
    fn test_second_to_last_tier_fusion_signals_terminal() {
        let (mut world, mut registry, config) = setup();
        let pre_terminal = config.tiers.terminal() - 1;
        let a = add_piece(&mut world, &mut registry, &config, pre_terminal, 0.0, 0.0);
        let b = add_piece(&mut world, &mut registry, &config, pre_terminal, 10.0, 0.0);
        let (ba, bb) = bodies_of(&registry, a, b);
        world.mark_overlap(ba, bb);

        let batch = resolve(&mut registry, &mut world, &config, 0.0);

        assert_eq!(
            batch,
            FusionBatch::Terminal {
                positions: vec![Vec2::new(5.0, 0.0)]
            }
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.pieces()[0].tier,
            config.tiers.terminal(),
            "the queued successor is the terminal piece itself"
        );
    }

    #[test]
    fn test_terminal_supersedes_ordinary_fusions_in_same_pass() {
        let (mut world, mut registry, config) = setup();
        let pre_terminal = config.tiers.terminal() - 1;
        let a = add_piece(&mut world, &mut registry, &config, 0, 0.0, 0.0);
        let b = add_piece(&mut world, &mut registry, &config, 0, 10.0, 0.0);
        let c = add_piece(&mut world, &mut registry, &config, pre_terminal, 100.0, 0.0);
        let d = add_piece(&mut world, &mut registry, &config, pre_terminal, 110.0, 0.0);
        let (ba, bb) = bodies_of(&registry, a, b);
        let (bc, bd) = bodies_of(&registry, c, d);
        world.mark_overlap(ba, bb);
        world.mark_overlap(bc, bd);

        let batch = resolve(&mut registry, &mut world, &config, 0.0);

        assert!(
            matches!(batch, FusionBatch::Terminal { .. }),
            "terminal formation wins the tick, got {batch:?}"
        );
        assert_eq!(registry.len(), 2, "tier-1 successor and the terminal piece");
    }

    #[test]
    fn test_no_overlaps_means_no_batch() {
        let (mut world, mut registry, config) = setup();
        add_piece(&mut world, &mut registry, &config, 0, 0.0, 0.0);
        add_piece(&mut world, &mut registry, &config, 0, 200.0, 0.0);

        assert!(resolve(&mut registry, &mut world, &config, 0.0).is_none());
    }
}
