//! Game grid: cell storage, gravity placement and four-in-a-row detection.

use core::fmt;

use thiserror::Error;

/// Number of marks in a row to win the game.
const SERIES_LEN: usize = 4;

/// Default number of rows.
pub const DEFAULT_ROWS: usize = 6;
/// Default number of columns.
pub const DEFAULT_COLS: usize = 7;

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum GridError {
    #[error("position (row {row}, column {col}) is outside the board")]
    OutOfBounds { row: usize, col: usize },
    /// Column has no empty cell left.
    #[error("column {0} is full")]
    ColumnFull(usize),
    #[error("invalid board dimensions {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },
}

#[derive(Copy, Clone, PartialOrd, PartialEq, Eq, Hash, Debug)]
pub enum Player {
    /// The human player.
    PlayerA,
    /// The automated player.
    PlayerB,
}

impl Player {
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::PlayerA => Self::PlayerB,
            Self::PlayerB => Self::PlayerA,
        }
    }
}

/// Content of a single cell.
#[derive(Copy, Clone, PartialOrd, PartialEq, Eq, Hash, Debug, Default)]
pub enum Mark {
    #[default]
    Empty,
    PlayerA,
    PlayerB,
}

impl Mark {
    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }

    #[must_use]
    pub const fn owner(self) -> Option<Player> {
        match self {
            Self::Empty => None,
            Self::PlayerA => Some(Player::PlayerA),
            Self::PlayerB => Some(Player::PlayerB),
        }
    }
}

impl From<Player> for Mark {
    fn from(player: Player) -> Self {
        match player {
            Player::PlayerA => Self::PlayerA,
            Player::PlayerB => Self::PlayerB,
        }
    }
}

/// Characters used to render the marks of both players.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tokens {
    pub player_a: char,
    pub player_b: char,
}

impl Tokens {
    #[must_use]
    pub const fn token(&self, mark: Mark) -> char {
        match mark {
            Mark::Empty => ' ',
            Mark::PlayerA => self.player_a,
            Mark::PlayerB => self.player_b,
        }
    }
}

impl Default for Tokens {
    fn default() -> Self {
        Self {
            player_a: 'H',
            player_b: 'C',
        }
    }
}

/// Gameboard.
///
/// Row `0` is the top of the board, row `rows - 1` the bottom. Marks are
/// dropped into a column and settle in its lowest empty cell, so within a
/// column all empty cells are above all occupied ones.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Grid {
    rows: usize,
    cols: usize,
    /* row-major: index = row * cols + col */
    cells: Vec<Mark>,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            cells: vec![Mark::Empty; DEFAULT_ROWS * DEFAULT_COLS],
        }
    }
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Result<Self, GridError> {
        let len = rows
            .checked_mul(cols)
            .filter(|&len| len > 0)
            .ok_or(GridError::InvalidDimensions { rows, cols })?;
        Ok(Self {
            rows,
            cols,
            cells: vec![Mark::Empty; len],
        })
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    const fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    fn check_bounds(&self, row: usize, col: usize) -> Result<(), GridError> {
        if row >= self.rows || col >= self.cols {
            return Err(GridError::OutOfBounds { row, col });
        }
        Ok(())
    }

    /// Returns the mark at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Result<Mark, GridError> {
        self.check_bounds(row, col)?;
        Ok(self.at(row, col))
    }

    /// Unchecked read for the scans below, where indices are in range.
    fn at(&self, row: usize, col: usize) -> Mark {
        self.cells[self.index(row, col)]
    }

    /// Unconditional write of `mark` to `(row, col)`.
    ///
    /// Bypasses gravity and the occupied-cell check, so the caller has to
    /// restore a consistent column afterwards. Regular moves go through
    /// [`Grid::apply_move`].
    pub fn set_cell(&mut self, mark: Mark, row: usize, col: usize) -> Result<(), GridError> {
        self.check_bounds(row, col)?;
        self.put(mark, row, col);
        Ok(())
    }

    /// Unchecked write for coordinates known to be on the board.
    pub(crate) fn put(&mut self, mark: Mark, row: usize, col: usize) {
        let index = self.index(row, col);
        self.cells[index] = mark;
    }

    /// Returns the row of the lowest empty cell in the column.
    ///
    /// Returns `None` if the column is full.
    fn next_slot_in_column(&self, col: usize) -> Option<usize> {
        (0..self.rows).rev().find(|&row| self.at(row, col).is_empty())
    }

    /// Whether a mark can still be dropped into `col`.
    #[must_use]
    pub fn has_room(&self, col: usize) -> bool {
        col < self.cols && self.at(0, col).is_empty()
    }

    /// Emits the column indices where moves are legal.
    pub fn available_columns(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.cols).filter(|&col| self.has_room(col))
    }

    /// Returns the number of free slots in the given column.
    #[must_use]
    pub fn free_slots_in_column(&self, col: usize) -> usize {
        self.next_slot_in_column(col).map_or(0, |row| row + 1)
    }

    #[must_use]
    pub fn occupied_cells(&self) -> usize {
        self.cells.iter().filter(|mark| !mark.is_empty()).count()
    }

    /// Drops `mark` into `col` and returns the row it landed in.
    pub fn apply_move(&mut self, mark: Mark, col: usize) -> Result<usize, GridError> {
        if col >= self.cols {
            return Err(GridError::OutOfBounds { row: 0, col });
        }
        if !self.has_room(col) {
            return Err(GridError::ColumnFull(col));
        }

        let row = self
            .next_slot_in_column(col)
            .ok_or(GridError::ColumnFull(col))?;
        self.put(mark, row, col);
        Ok(row)
    }

    /// Compares the window of [`SERIES_LEN`] cells starting at `(row, col)`
    /// going in direction `(d_row, d_col)`. The window must lie on the board.
    fn window_owner(
        &self,
        row: usize,
        col: usize,
        d_row: isize,
        d_col: isize,
    ) -> Option<Player> {
        let first = self.at(row, col).owner()?;
        let same = (1..SERIES_LEN as isize).all(|step| {
            let r = (row as isize + step * d_row) as usize;
            let c = (col as isize + step * d_col) as usize;
            self.at(r, c) == Mark::from(first)
        });
        same.then_some(first)
    }

    fn find_winner_horizontally(&self) -> Option<Player> {
        let cols_to_check = (self.cols + 1).checked_sub(SERIES_LEN)?;
        (0..self.rows)
            .flat_map(|row| (0..cols_to_check).map(move |col| (row, col)))
            .find_map(|(row, col)| self.window_owner(row, col, 0, 1))
    }

    fn find_winner_vertically(&self) -> Option<Player> {
        let rows_to_check = (self.rows + 1).checked_sub(SERIES_LEN)?;
        (0..rows_to_check)
            .flat_map(|row| (0..self.cols).map(move |col| (row, col)))
            .find_map(|(row, col)| self.window_owner(row, col, 1, 0))
    }

    fn find_winner_diagonally(&self) -> Option<Player> {
        let rows_to_check = (self.rows + 1).checked_sub(SERIES_LEN)?;
        let cols_to_check = (self.cols + 1).checked_sub(SERIES_LEN)?;
        let starts = move || {
            (0..rows_to_check).flat_map(move |row| (0..cols_to_check).map(move |col| (row, col)))
        };

        // `\`: top-left to bottom-right
        starts()
            .find_map(|(row, col)| self.window_owner(row, col, 1, 1))
            // `/`: bottom-left to top-right, starting on the lowest cell
            .or_else(|| {
                starts().find_map(|(row, col)| {
                    self.window_owner(row + SERIES_LEN - 1, col, -1, 1)
                })
            })
    }

    /// Returns the owner of the first four-in-a-row found, if any.
    #[must_use]
    pub fn winner(&self) -> Option<Player> {
        self.find_winner_horizontally()
            .or_else(|| self.find_winner_vertically())
            .or_else(|| self.find_winner_diagonally())
    }

    /// Check if either player has four in a row.
    #[must_use]
    pub fn is_won(&self) -> bool {
        self.winner().is_some()
    }

    /// Returns whether no column has room left, i.e. the top row is occupied.
    #[must_use]
    pub fn is_full(&self) -> bool {
        (0..self.cols).all(|col| !self.at(0, col).is_empty())
    }

    /// Renders the board with a header of 1-based column numbers.
    #[must_use]
    pub fn render(&self, tokens: &Tokens) -> String {
        let header = (1..=self.cols)
            .map(|nr| nr.to_string())
            .collect::<Vec<_>>()
            .join(" ");

        let mut out = header;
        for row in 0..self.rows {
            out.push('\n');
            for col in 0..self.cols {
                out.push(tokens.token(self.at(row, col)));
                out.push(' ');
            }
        }
        out
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&Tokens::default()))
    }
}
