//! Command-line interface for game_of_three.

use clap::{Parser, Subcommand};
use game_of_three::PlayerKind;

/// Game of Three - divide by three until someone reaches 1
#[derive(Parser, Debug)]
#[command(name = "game_of_three")]
#[command(about = "Play Game of Three in the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play one match in the terminal
    Play {
        /// Who sits in the second seat: ai or human
        #[arg(short, long, default_value = "ai")]
        opponent: PlayerKind,

        /// Display name of the first player
        #[arg(short, long, default_value = "Player 1")]
        name: String,

        /// Display name of the second player when it is human
        #[arg(long, default_value = "Player 2")]
        second_name: String,

        /// Fixed starting number instead of a random one
        #[arg(long)]
        seed: Option<i64>,

        /// Path to the engine config file (defaults to $GAME_OF_THREE_CONFIG or game_of_three.toml)
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,

        /// Print every state as a JSON line instead of prose
        #[arg(long)]
        json: bool,
    },
}
