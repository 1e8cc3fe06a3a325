#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Delve sessions in a terminal.

mod config;
mod input;
mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use delve_system_persistence::{SaveStore, DEFAULT_SAVE_FILE};
use delve_world::World;
use log::info;

/// Seed-driven dungeon crawl played one keystroke per tick.
#[derive(Debug, Parser)]
#[command(name = "delve", version, about)]
struct CliArgs {
    /// TOML file overriding the default generation and entity tuning.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Location of the save file.
    #[arg(long, global = true, value_name = "PATH", default_value = DEFAULT_SAVE_FILE)]
    save: PathBuf,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Starts a new session.
    New {
        /// Seed for the layout and every later random decision.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Resumes the saved session.
    Load,
    /// Replays scripted keystrokes without a terminal and prints the final frame.
    Replay {
        /// Seed of the session to replay.
        #[arg(long)]
        seed: u64,
        /// Keystrokes applied one per tick.
        #[arg(long, default_value = "")]
        inputs: String,
        /// Empty ticks appended after the keystrokes.
        #[arg(long, default_value_t = 0)]
        idle: u32,
    },
}

/// Entry point for the Delve command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let args = CliArgs::parse();
    let config = config::load(args.config.as_deref())?;
    let store = SaveStore::new(args.save);

    match args.command {
        CliCommand::New { seed } => {
            let seed = seed.unwrap_or_else(rand::random);
            info!("starting session {seed}");
            let mut world = World::new(&config, seed)
                .with_context(|| format!("failed to generate session {seed}"))?;
            let status = session::play(&mut world, &config, store)?;
            info!("session {seed} ended: {status:?}");
        }
        CliCommand::Load => {
            let state = store.load().context("failed to load saved game")?;
            let seed = state.seed;
            let mut world =
                World::restore(&config, &state).context("failed to restore saved game")?;
            let status = session::play(&mut world, &config, store)?;
            info!("session {seed} ended: {status:?}");
        }
        CliCommand::Replay { seed, inputs, idle } => {
            let mut world = World::new(&config, seed)
                .with_context(|| format!("failed to generate session {seed}"))?;
            let frame = session::replay(&mut world, &config, &inputs, idle)?;
            print!("{frame}");
        }
    }
    Ok(())
}
