//! Drop Forge entry point
//!
//! Headless demo: runs a deterministic autoplay session against the rapier
//! backend and reports the final score plus the leaderboard.

use std::path::PathBuf;

use drop_forge::physics::rapier::RapierWorld;
use drop_forge::sim::{GameEvent, GameSession};
use drop_forge::{GameConfig, HighScores};

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(42u64);
    log::info!("Drop Forge (headless demo) starting with seed {seed}");

    let config = GameConfig::default();
    let physics = RapierWorld::new(config.gravity, config.frame_thickness);
    let mut session = GameSession::new(config, seed, physics);

    // Autopilot: sweep the drop point across the container and commit a drop
    // whenever the gate opens. Capped at ten simulated minutes.
    let max_ticks = 10 * 60 * 60;
    let mut drops = 0u32;
    for tick_index in 0..max_ticks {
        let sweep = (tick_index as f32 * 0.013).sin();
        session.set_target_x(sweep * session.bounds().max_x);
        if session.try_drop() {
            drops += 1;
        }
        session.tick();

        for event in session.drain_events() {
            match event {
                GameEvent::Fusion {
                    count, source_tier, ..
                } => log::debug!("{count} fusion(s) of tier {source_tier}"),
                GameEvent::ComboShown {
                    chain_count,
                    multiplier,
                    delta,
                } => log::info!("chain {chain_count}: x{multiplier:.1} for +{delta}"),
                GameEvent::TerminalBonus { bonus, cleared } => {
                    log::info!("terminal tier formed: +{bonus}, {cleared} pieces cleared");
                }
                GameEvent::StageAdvanced {
                    index,
                    container_height,
                    culled,
                } => log::info!(
                    "stage {index}: container height {container_height}, {} pieces culled",
                    culled.len()
                ),
                GameEvent::GameOver { score } => log::info!("game over at {score}"),
                GameEvent::PieceSpawned { .. } => {}
            }
        }

        if session.is_game_over() {
            break;
        }
    }

    let score = session.score();
    println!(
        "Final score: {score} ({drops} drops, {:.1}s simulated)",
        session.now_ms() / 1000.0
    );

    let path = PathBuf::from("highscores.json");
    let mut scores = HighScores::load(&path);
    if scores.add_score("autopilot", score).is_some() {
        scores.save(&path);
    }
    for (rank, entry) in scores.top_n(5).iter().enumerate() {
        println!("{}. {:>8}  {}", rank + 1, entry.score, entry.name);
    }
}
