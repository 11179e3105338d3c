//! Four-in-a-row against a one-ply heuristic computer player.
//!
//! [`Grid`] holds the board and decides wins and ties, [`HeuristicSelector`]
//! picks the computer's column, and [`Game`] ties both together with turn
//! order for a front end.

pub mod config;
pub mod game;
pub mod grid;
pub mod selector;

pub use game::{COMPUTER, Game, GameError, HUMAN, Outcome, Turn};
pub use grid::{Grid, GridError, Mark, Player, Tokens};
pub use selector::{HeuristicSelector, ProbeMode, SelectorError};
