use std::error::Error;
use std::process::ExitCode;
use std::str::FromStr;

use serde::Serialize;
use tracing_subscriber::EnvFilter;

use tilerun_core::game_trait::{SessionOutcome, Simulation};
use tilerun_core::input::InputState;
use tilerun_core::time::format_elapsed;
use tilerun_platformer::config::PlatformerConfig;
use tilerun_platformer::error::PlatformerError;
use tilerun_platformer::events::GameEvent;
use tilerun_platformer::level::{Level, generate_level};
use tilerun_platformer::{Platformer, RenderFrame};

/// One display frame at 60 Hz.
const FRAME_MS: f64 = 1000.0 / 60.0;
const DEFAULT_TICKS: u64 = 3600;
const DEFAULT_SEED: u64 = 1;
/// Ticks between jump presses in the scripted run.
const JUMP_PERIOD: u64 = 60;
/// Up is held this many ticks so the press lands on a grounded tick.
const JUMP_HOLD: u64 = 4;

#[derive(Serialize)]
struct TraceLine<'a> {
    tick: u64,
    frame: &'a RenderFrame,
    events: &'a [GameEvent],
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        },
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = PlatformerConfig::load();
    let level = load_level()?;
    let ticks: u64 = env_or("TILERUN_TICKS", DEFAULT_TICKS);
    let trace = std::env::var_os("TILERUN_TRACE").is_some();

    let mut game = Platformer::new(config, level)?;
    let level = game.level();
    tracing::info!(
        floor = level.floor.len(),
        platforms = level.platforms.len(),
        width = level.width,
        height = level.height,
        max_time_ms = game.config().session.max_time_ms,
        ticks,
        "tilerun sim starting"
    );

    for tick in 0..ticks {
        let events = game.tick(FRAME_MS, &scripted_input(tick));
        for event in &events {
            tracing::debug!(tick, ?event, "event");
        }
        if trace {
            let frame = game.frame();
            let line = TraceLine {
                tick,
                frame: &frame,
                events: &events,
            };
            println!("{}", serde_json::to_string(&line)?);
        }
        if game.is_ended() {
            break;
        }
    }

    let player = game.player();
    tracing::info!(
        outcome = ?game.outcome(),
        won = game.outcome().is_some_and(SessionOutcome::is_success),
        x = player.position.x,
        y = player.position.y,
        "{}",
        format_elapsed(game.elapsed_ms())
    );
    Ok(())
}

/// `$TILERUN_LEVEL` if set, otherwise a generated level from `$TILERUN_SEED`.
fn load_level() -> Result<Level, PlatformerError> {
    match std::env::var("TILERUN_LEVEL") {
        Ok(path) => Level::load(&path),
        Err(_) => {
            let seed = env_or("TILERUN_SEED", DEFAULT_SEED);
            tracing::info!(seed, "Generating level");
            Ok(generate_level(seed))
        },
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring unparseable {name}={raw}");
            default
        }),
        Err(_) => default,
    }
}

/// Run right the whole time, pressing jump once per period.
fn scripted_input(tick: u64) -> InputState {
    InputState::new(false, true, tick % JUMP_PERIOD < JUMP_HOLD)
}
