//! Laser Arena Demo
//!
//! Runs a headless arena on the standard map with a few bots and logs the
//! change stream.
//!
//! Environment:
//! - `ARENA_BOTS`: number of bots (default 1)
//! - `ARENA_DEMO_SECS`: stop after this many seconds (default: run until Ctrl-C)
//! - `ARENA_SEED`: bot RNG seed (default 12345)
//! - `RUST_LOG`: log filter (default `info`)

use std::str::FromStr;
use std::time::Duration;
use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use laser_arena::{
    Action, Game, GameConfig, EngineConfig, EntityId, SeededRng, VERSION,
    LASER_THROTTLE, MOVE_THROTTLE,
    network::protocol::{RoundStatus, ServerMessage},
};

const BOT_ICONS: &[char] = &['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J'];

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let bots: usize = env_or("ARENA_BOTS", 1)?;
    let seed: u64 = env_or("ARENA_SEED", 12345)?;
    let demo_secs: Option<u64> = match std::env::var("ARENA_DEMO_SECS") {
        Ok(raw) => Some(raw.parse().with_context(|| format!("Invalid ARENA_DEMO_SECS: {raw}"))?),
        Err(_) => None,
    };

    info!("Laser Arena v{}", VERSION);
    info!("Bots: {}, seed: {}", bots, seed);

    let (game, mut changes) = Game::with_default_arena(GameConfig::default(), EngineConfig::default())?;

    let mut bot_tasks = Vec::with_capacity(bots);
    for i in 0..bots {
        let icon = BOT_ICONS[i % BOT_ICONS.len()];
        let id = game.spawn_player(format!("bot-{i}"), icon).await;
        let rng = SeededRng::new(seed.wrapping_add(i as u64));
        bot_tasks.push(tokio::spawn(run_bot(game.clone(), id, rng)));
    }

    let deadline = async {
        match demo_secs {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            change = changes.recv() => {
                let Some(change) = change else { break };
                let line = ServerMessage::from(change).to_json()?;
                info!("{}", line);
            }
            _ = &mut deadline => {
                info!("Stopping demo");
                break;
            }
        }
    }

    game.shutdown().await;
    for task in bot_tasks {
        task.abort();
    }

    let status = RoundStatus::from_state(&*game.read().await);
    info!("Final status: {}", ServerMessage::RoundStatus(status).to_json()?);

    Ok(())
}

/// Wander and shoot until the engine stops accepting actions.
async fn run_bot(game: Game, id: EntityId, mut rng: SeededRng) {
    let mut pause = tokio::time::interval(MOVE_THROTTLE);
    let fire_every = (LASER_THROTTLE.as_millis() / MOVE_THROTTLE.as_millis()).max(1) as u32;
    let mut heading = rng.direction();

    loop {
        pause.tick().await;

        // Keep a heading for a while so bots cross the arena
        if rng.chance(25) {
            heading = rng.direction();
        }
        let action = if rng.next_int(fire_every * 2) == 0 {
            Action::fire(id, rng.direction(), Utc::now())
        } else {
            Action::movement(id, heading, Utc::now())
        };

        if game.submit(action).await.is_err() {
            debug!(bot = ?id, "Engine stopped");
            break;
        }
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse().with_context(|| format!("Invalid {key}: {raw}")),
        Err(_) => Ok(default),
    }
}
