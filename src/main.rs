#![deny(
    clippy::all,
    clippy::cargo,
    clippy::nursery,
    clippy::must_use_candidate,
    // clippy::restriction,
    // clippy::pedantic
)]
// now allow a few rules which are denied by the above statement
// --> they are ridiculous and not necessary
#![allow(
    clippy::suboptimal_flops,
    clippy::redundant_pub_crate,
    clippy::fallible_impl_from,
    clippy::multiple_crate_versions
)]
#![deny(missing_debug_implementations)]
#![deny(rustdoc::all)]

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use four_in_a_row::config::AppConfig;
use four_in_a_row::{
    Game, GameError, Grid, GridError, HUMAN, HeuristicSelector, Outcome, Tokens,
};
use tracing_subscriber::EnvFilter;

/// Play four-in-a-row against the computer.
#[derive(Parser, Debug)]
#[command(name = "four-in-a-row")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "four-in-a-row.toml")]
    config: PathBuf,

    /// Override number of rows
    #[arg(long)]
    rows: Option<usize>,

    /// Override number of columns
    #[arg(long)]
    cols: Option<usize>,

    /// Seed for the computer's random moves
    #[arg(long)]
    seed: Option<u64>,

    /// Evaluate the computer's candidate moves in parallel
    #[arg(long)]
    parallel: bool,
}

fn print_board(game: &Game, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}\n", game.board())
}

/// Asks for a column until the human made a legal move.
///
/// Returns `false` if stdin is closed.
fn play_human(
    game: &mut Game,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<bool> {
    let cols = game.grid().cols();
    loop {
        write!(out, "Enter column to make a move in: ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(false);
        }

        let col = match line.trim().parse::<usize>() {
            Ok(col) if (1..=cols).contains(&col) => col,
            _ => {
                writeln!(out, "Invalid input.\n")?;
                continue;
            }
        };

        // adapt to index
        match game.play_human(col - 1) {
            Ok(_) => {
                writeln!(out)?;
                return Ok(true);
            }
            // columns are numbered from 1 for the human
            Err(GameError::Grid(GridError::ColumnFull(_))) => {
                writeln!(out, "Column {col} is full.\n")?;
            }
            Err(GameError::Grid(err)) => writeln!(out, "{err}\n")?,
            Err(err) => return Err(err.into()),
        }
    }
}

fn announce(game: &Game, out: &mut impl Write) -> Result<bool> {
    match game.outcome() {
        Outcome::InProgress => return Ok(false),
        Outcome::Won(player) if player == HUMAN => {
            writeln!(out, "Game was won by HUMAN player, final board:")?;
        }
        Outcome::Won(_) => writeln!(out, "Game was won by COMPUTER player, final board:")?,
        Outcome::Tie => writeln!(out, "The game is a TIE, final board:")?,
    }
    print_board(game, out)?;
    Ok(true)
}

fn run(mut game: Game) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    loop {
        writeln!(out, "Current state of the game:")?;
        print_board(&game, &mut out)?;

        if !play_human(&mut game, &mut input, &mut out)? {
            return Ok(());
        }
        if announce(&game, &mut out)? {
            return Ok(());
        }

        let col = game.play_computer()?;
        writeln!(out, "Computer chose column {}\n", col + 1)?;
        if announce(&game, &mut out)? {
            return Ok(());
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(rows) = cli.rows {
        config.rows = rows;
    }
    if let Some(cols) = cli.cols {
        config.cols = cols;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if cli.parallel {
        config.parallel_probing = true;
    }
    config.validate().context("invalid configuration")?;

    let grid = Grid::new(config.rows, config.cols)?;
    let selector = config
        .seed
        .map_or_else(HeuristicSelector::from_os_rng, HeuristicSelector::from_seed)
        .with_mode(config.probe_mode());
    let game = Game::new(grid, selector).with_tokens(Tokens::from(config.tokens));

    tracing::debug!(?config, "starting game");
    run(game)
}
