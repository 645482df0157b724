//! Game of Three - terminal client
//!
//! Runs one match on the console. Humans type -1, 0 or +1 when prompted;
//! an AI opponent answers on its own after thinking for a while.

#![warn(missing_docs)]

mod cli;

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use cli::{Cli, Command};
use game_of_three::{
    Action, EngineConfig, IdGenerator, Lobby, MatchOptions, MatchService, MatchStateRecord,
    Player, PlayerDirectory, PlayerId, PlayerKind, TracingTap, UuidGenerator,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

type ConsoleInput = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    initialize_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            opponent,
            name,
            second_name,
            seed,
            config,
            json,
        } => {
            let path = config.unwrap_or_else(EngineConfig::default_path);
            let config = EngineConfig::load_or_default(&path)
                .with_context(|| format!("loading {}", path.display()))?;
            let settings = PlaySettings {
                opponent,
                name,
                second_name,
                seed,
                json,
            };
            run_play(config, settings).await
        }
    }
}

/// Logs go to stderr so stdout stays readable (or parseable with `--json`).
#[instrument]
fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,game_of_three=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    debug!("Tracing initialized");
}

#[derive(Debug)]
struct PlaySettings {
    opponent: PlayerKind,
    name: String,
    second_name: String,
    seed: Option<i64>,
    json: bool,
}

/// Run one match on the console
#[instrument(skip(config))]
async fn run_play(config: EngineConfig, settings: PlaySettings) -> Result<()> {
    let directory = PlayerDirectory::new();
    let lobby = Lobby::new();

    let first = Arc::new(Player::human("player-1", settings.name.as_str()));
    let second = Arc::new(match settings.opponent {
        PlayerKind::Ai => Player::ai("computer", config.ai_name().as_str()),
        PlayerKind::Human => Player::human("player-2", settings.second_name.as_str()),
    });

    for player in [first, second] {
        let player_id = player.id().clone();
        directory.insert(player);
        lobby.add(player_id);
    }

    let players = [take_from_lobby(&lobby, &directory)?, take_from_lobby(&lobby, &directory)?];
    info!(first = %players[0].id(), second = %players[1].id(), "Players matched");

    // Tap label and match id must agree from the Start state on.
    let match_id = UuidGenerator.generate();
    let tap = TracingTap::labeled(match_id.as_str());
    let (tx, mut rx) = mpsc::unbounded_channel::<MatchStateRecord>();
    let mut options = MatchOptions::new()
        .with_id_generator(move || match_id.clone())
        .with_thinking_delay(config.thinking_delay())
        .with_observer(Arc::new(tap))
        .with_observer(Arc::new(move |state: &MatchStateRecord| {
            // The receiver only goes away on shutdown.
            let _ = tx.send(state.clone());
        }));
    options = match settings.seed {
        Some(seed) => options.with_seed(seed),
        None => options.with_seed_generator(config.seed_generator()),
    };

    let service = MatchService::new(players, options)?;
    info!(match_id = %service.id(), "Match started");

    let mut input = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let state = tokio::select! {
            state = rx.recv() => state.ok_or_else(|| anyhow!("match closed unexpectedly"))?,
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted");
                return Ok(());
            }
        };

        print_state(&state, &directory, settings.json)?;

        if state.is_stopped() {
            break;
        }

        let Some(due) = state.next_turn().and_then(|id| directory.get(id)) else {
            continue;
        };
        if due.is_ai() {
            if !settings.json {
                println!("{} is thinking...", due.name());
            }
            continue;
        }

        if !play_human_turn(&service, &due, &mut input).await? {
            warn!("Input closed before the match ended");
            return Ok(());
        }
    }

    Ok(())
}

fn take_from_lobby(lobby: &Lobby, directory: &PlayerDirectory) -> Result<Arc<Player>> {
    let player_id = lobby.next().ok_or_else(|| anyhow!("not enough players in the lobby"))?;
    directory
        .get(&player_id)
        .ok_or_else(|| anyhow!("player {} left before the match started", player_id))
}

/// Prompts `player` until the service accepts a move.
///
/// Returns `false` if stdin closed.
#[instrument(skip(service, player, input), fields(player_id = %player.id()))]
async fn play_human_turn(
    service: &MatchService,
    player: &Player,
    input: &mut ConsoleInput,
) -> Result<bool> {
    loop {
        println!("{}, your move (-1, 0, +1):", player.name());
        let Some(line) = input.next_line().await.context("reading stdin")? else {
            return Ok(false);
        };

        let action: Action = match line.parse() {
            Ok(action) => action,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match service.make_move(player, action) {
            Ok(_) => return Ok(true),
            Err(e) => println!("{e}"),
        }
    }
}

fn print_state(state: &MatchStateRecord, directory: &PlayerDirectory, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(state)?);
        return Ok(());
    }

    let name = |id: &PlayerId| {
        directory
            .get(id)
            .map(|p| p.name())
            .unwrap_or_else(|| id.to_string())
    };

    match state {
        MatchStateRecord::Start { output_number, .. } => {
            println!("Starting number: {output_number}");
        }
        MatchStateRecord::Playing {
            action,
            current_turn,
            input_number,
            output_number,
            ..
        } => {
            println!(
                "{} played {action}: ({input_number} {action}) / 3 = {output_number}",
                name(current_turn)
            );
        }
        MatchStateRecord::Stop {
            action,
            current_turn,
            input_number,
            winning_player,
            ..
        } => {
            println!("{} played {action} on {input_number}", name(current_turn));
            println!("{} wins!", name(winning_player));
        }
    }
    Ok(())
}
