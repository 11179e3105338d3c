//! Match state: turn order and outcome on top of a [`Grid`].

use rand::Rng;
use rand::rngs::StdRng;
use thiserror::Error;

use crate::grid::{Grid, GridError, Mark, Player, Tokens};
use crate::selector::{HeuristicSelector, SelectorError};

/// The human always plays [`Player::PlayerA`].
pub const HUMAN: Player = Player::PlayerA;
/// The computer always plays [`Player::PlayerB`].
pub const COMPUTER: Player = Player::PlayerB;

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum GameError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Selector(#[from] SelectorError),
    #[error("it is not the {0:?} turn")]
    NotYourTurn(Turn),
    #[error("the game is already decided")]
    Decided,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Human,
    Automated,
}

impl Turn {
    const fn next(self) -> Self {
        match self {
            Self::Human => Self::Automated,
            Self::Automated => Self::Human,
        }
    }
}

/// The state of a match after the latest move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Game continues.
    InProgress,
    /// Player won with the latest move.
    Won(Player),
    /// The board is full without a winner.
    Tie,
}

/// Game with all its state.
#[derive(Debug)]
pub struct Game<R = StdRng> {
    grid: Grid,
    selector: HeuristicSelector<R>,
    tokens: Tokens,
    turn: Turn,
    outcome: Outcome,
    round: usize,
}

impl<R: Rng> Game<R> {
    /// Starts a match on `grid`; the human moves first.
    #[must_use]
    pub fn new(grid: Grid, selector: HeuristicSelector<R>) -> Self {
        let mut game = Self {
            grid,
            selector,
            tokens: Tokens::default(),
            turn: Turn::Human,
            outcome: Outcome::InProgress,
            round: 0,
        };
        game.update_outcome();
        game
    }

    #[must_use]
    pub fn with_tokens(mut self, tokens: Tokens) -> Self {
        self.tokens = tokens;
        self
    }

    /// Drops the human's mark into `col` and returns the row it landed in.
    ///
    /// A full column leaves the turn with the human.
    pub fn play_human(&mut self, col: usize) -> Result<usize, GameError> {
        self.check_turn(Turn::Human)?;
        let row = self.grid.apply_move(Mark::from(HUMAN), col)?;
        self.finish_move(HUMAN);
        Ok(row)
    }

    /// Lets the computer move and returns the column it played.
    pub fn play_computer(&mut self) -> Result<usize, GameError> {
        self.check_turn(Turn::Automated)?;
        let col = self
            .selector
            .choose_column(&mut self.grid, COMPUTER, HUMAN)?;
        self.finish_move(COMPUTER);
        Ok(col)
    }

    fn check_turn(&self, expected: Turn) -> Result<(), GameError> {
        if self.is_decided() {
            return Err(GameError::Decided);
        }
        if self.turn != expected {
            return Err(GameError::NotYourTurn(expected));
        }
        Ok(())
    }

    fn finish_move(&mut self, player: Player) {
        self.round += 1;
        self.turn = self.turn.next();
        self.update_outcome();
        match self.outcome {
            Outcome::Won(winner) => {
                tracing::info!(?winner, round = self.round, "game won");
                debug_assert_eq!(winner, player);
            }
            Outcome::Tie => tracing::info!(round = self.round, "game tied"),
            Outcome::InProgress => {}
        }
    }

    /// A win on the last free cell is a win, not a tie.
    fn update_outcome(&mut self) {
        self.outcome = if let Some(winner) = self.grid.winner() {
            Outcome::Won(winner)
        } else if self.grid.is_full() {
            Outcome::Tie
        } else {
            Outcome::InProgress
        };
    }

    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }

    #[must_use]
    pub const fn turn(&self) -> Turn {
        self.turn
    }

    #[must_use]
    pub fn is_decided(&self) -> bool {
        self.outcome != Outcome::InProgress
    }

    #[must_use]
    pub fn is_won(&self) -> bool {
        matches!(self.outcome, Outcome::Won(_))
    }

    #[must_use]
    pub fn is_tie(&self) -> bool {
        self.outcome == Outcome::Tie
    }

    /// Rendered board.
    #[must_use]
    pub fn board(&self) -> String {
        self.grid.render(&self.tokens)
    }

    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Number of moves made so far.
    #[must_use]
    pub const fn round(&self) -> usize {
        self.round
    }
}
