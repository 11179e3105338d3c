//! Move selection for the automated player.
//!
//! The selector looks exactly one move ahead: it takes an immediate win if
//! there is one, otherwise blocks an immediate win of the opponent, otherwise
//! plays a random legal column.

use core::ops::Deref;

use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use thiserror::Error;

use crate::grid::{Grid, GridError, Mark, Player};

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum SelectorError {
    /// Selector was asked to move on a full board.
    #[error("no legal move left on the board")]
    NoLegalMove,
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// How candidate columns are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbeMode {
    /// Place, check and undo on the real grid, one column after the other.
    #[default]
    Sequential,
    /// Check every candidate on its own copy of the grid in parallel.
    Parallel,
}

/// Trial placement on a grid.
///
/// The probed cell is reset to [`Mark::Empty`] when the probe is dropped,
/// unless it was committed.
#[derive(Debug)]
pub(crate) struct Probe<'a> {
    grid: &'a mut Grid,
    row: usize,
    col: usize,
    committed: bool,
}

impl<'a> Probe<'a> {
    pub(crate) fn place(
        grid: &'a mut Grid,
        mark: Mark,
        col: usize,
    ) -> Result<Self, GridError> {
        let row = grid.apply_move(mark, col)?;
        Ok(Self {
            grid,
            row,
            col,
            committed: false,
        })
    }

    /// Replaces the mark in the probed cell.
    pub(crate) fn overwrite(&mut self, mark: Mark) {
        self.grid.put(mark, self.row, self.col);
    }

    /// Keeps the probed cell and returns its column.
    pub(crate) fn commit(mut self) -> usize {
        self.committed = true;
        self.col
    }
}

impl Deref for Probe<'_> {
    type Target = Grid;

    fn deref(&self) -> &Grid {
        self.grid
    }
}

impl Drop for Probe<'_> {
    fn drop(&mut self) {
        if !self.committed {
            // the cell was written by `place`, so it is on the board
            self.grid.put(Mark::Empty, self.row, self.col);
        }
    }
}

/// One-ply heuristic opponent with an injected random source.
#[derive(Debug)]
pub struct HeuristicSelector<R = StdRng> {
    rng: R,
    mode: ProbeMode,
}

impl HeuristicSelector<StdRng> {
    /// Selector with a reproducible random fallback.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    #[must_use]
    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> HeuristicSelector<R> {
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            mode: ProbeMode::Sequential,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: ProbeMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub const fn mode(&self) -> ProbeMode {
        self.mode
    }

    /// Chooses a column for `own`, places its mark there and returns the
    /// column.
    ///
    /// Afterwards the grid differs from before in exactly that one cell.
    pub fn choose_column(
        &mut self,
        grid: &mut Grid,
        own: Player,
        opponent: Player,
    ) -> Result<usize, SelectorError> {
        if grid.is_full() {
            return Err(SelectorError::NoLegalMove);
        }

        let candidates = grid.available_columns().collect::<Vec<_>>();
        let col = match self.mode {
            ProbeMode::Sequential => {
                if let Some(col) = take_winning_column(grid, &candidates, own)? {
                    tracing::debug!(col, "taking winning column");
                    return Ok(col);
                }
                if let Some(col) = block_winning_column(grid, &candidates, own, opponent)? {
                    tracing::debug!(col, "blocking opponent");
                    return Ok(col);
                }
                None
            }
            ProbeMode::Parallel => find_winning_column(grid, &candidates, own)
                .inspect(|col| tracing::debug!(col, "taking winning column"))
                .or_else(|| {
                    find_winning_column(grid, &candidates, opponent)
                        .inspect(|col| tracing::debug!(col, "blocking opponent"))
                }),
        };

        let col = match col {
            Some(col) => col,
            None => {
                let col = candidates
                    .iter()
                    .copied()
                    .choose(&mut self.rng)
                    .ok_or(SelectorError::NoLegalMove)?;
                tracing::debug!(col, "random move");
                col
            }
        };

        grid.apply_move(Mark::from(own), col)?;
        Ok(col)
    }
}

/// Probes every candidate with `own` and keeps the first one that wins.
fn take_winning_column(
    grid: &mut Grid,
    candidates: &[usize],
    own: Player,
) -> Result<Option<usize>, GridError> {
    for &col in candidates {
        let probe = Probe::place(grid, Mark::from(own), col)?;
        if probe.is_won() {
            return Ok(Some(probe.commit()));
        }
    }
    Ok(None)
}

/// Probes every candidate with `opponent`; the first cell where the opponent
/// would win is taken over by `own`.
fn block_winning_column(
    grid: &mut Grid,
    candidates: &[usize],
    own: Player,
    opponent: Player,
) -> Result<Option<usize>, GridError> {
    for &col in candidates {
        let mut probe = Probe::place(grid, Mark::from(opponent), col)?;
        if probe.is_won() {
            probe.overwrite(Mark::from(own));
            return Ok(Some(probe.commit()));
        }
    }
    Ok(None)
}

/// Lowest candidate column where `player` would win, each checked on an
/// independent copy of the grid. Leaves `grid` untouched.
fn find_winning_column(grid: &Grid, candidates: &[usize], player: Player) -> Option<usize> {
    candidates
        .par_iter()
        .copied()
        .find_first(|&col| {
            let mut copy = grid.clone();
            copy.apply_move(Mark::from(player), col).is_ok() && copy.is_won()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWN: Player = Player::PlayerB;
    const OPP: Player = Player::PlayerA;

    #[test]
    fn test_mode() {
        assert_eq!(HeuristicSelector::from_seed(0).mode(), ProbeMode::Sequential);
        let [sequential, parallel] = selectors();
        assert_eq!(sequential.mode(), ProbeMode::Sequential);
        assert_eq!(parallel.mode(), ProbeMode::Parallel);
    }

    fn selectors() -> [HeuristicSelector; 2] {
        [
            HeuristicSelector::from_seed(7),
            HeuristicSelector::from_seed(7).with_mode(ProbeMode::Parallel),
        ]
    }

    fn drop_all(grid: &mut Grid, player: Player, cols: &[usize]) {
        for &col in cols {
            grid.apply_move(Mark::from(player), col).unwrap();
        }
    }

    #[test]
    fn test_probe_reverts_on_drop() {
        let mut grid = Grid::default();
        let before = grid.clone();
        {
            let probe = Probe::place(&mut grid, Mark::PlayerA, 3).unwrap();
            assert_eq!(probe.get(5, 3), Ok(Mark::PlayerA));
        }
        assert_eq!(grid, before);

        let col = Probe::place(&mut grid, Mark::PlayerB, 4).unwrap().commit();
        assert_eq!(col, 4);
        assert_eq!(grid.get(5, 4), Ok(Mark::PlayerB));
    }

    #[test]
    fn test_probe_overwrite_and_commit() {
        let mut grid = Grid::default();
        let mut probe = Probe::place(&mut grid, Mark::PlayerA, 1).unwrap();
        probe.overwrite(Mark::PlayerB);
        probe.commit();
        assert_eq!(grid.get(5, 1), Ok(Mark::PlayerB));
        assert_eq!(grid.occupied_cells(), 1);
    }

    #[test]
    fn test_takes_horizontal_win() {
        for mut selector in selectors() {
            let mut grid = Grid::default();
            drop_all(&mut grid, OWN, &[1, 2, 3]);
            drop_all(&mut grid, OPP, &[1, 2, 3]);

            let col = selector.choose_column(&mut grid, OWN, OPP).unwrap();
            assert_eq!(col, 0);
            assert!(grid.is_won());
            assert_eq!(grid.winner(), Some(OWN));
        }
    }

    #[test]
    fn test_prefers_win_over_block() {
        for mut selector in selectors() {
            let mut grid = Grid::default();
            // opponent threatens column 0, own player completes column 6
            drop_all(&mut grid, OPP, &[1, 2, 3]);
            drop_all(&mut grid, OWN, &[6, 6, 6]);

            let col = selector.choose_column(&mut grid, OWN, OPP).unwrap();
            assert_eq!(col, 6);
            assert_eq!(grid.winner(), Some(OWN));
        }
    }

    #[test]
    fn test_blocks_vertical_threat() {
        for mut selector in selectors() {
            let mut grid = Grid::default();
            drop_all(&mut grid, OPP, &[4, 4, 4]);
            drop_all(&mut grid, OWN, &[0, 6]);

            let col = selector.choose_column(&mut grid, OWN, OPP).unwrap();
            assert_eq!(col, 4);
            assert_eq!(grid.get(2, 4), Ok(Mark::from(OWN)));
            assert!(!grid.is_won());
        }
    }

    #[test]
    fn test_blocks_diagonal_threat() {
        for mut selector in selectors() {
            let mut grid = Grid::default();
            // `/` of the opponent from (5,0) to (2,3), missing (2,3)
            drop_all(&mut grid, OPP, &[0]);
            drop_all(&mut grid, OWN, &[1]);
            drop_all(&mut grid, OPP, &[1]);
            drop_all(&mut grid, OWN, &[2]);
            drop_all(&mut grid, OPP, &[2, 2, 3]);
            drop_all(&mut grid, OWN, &[3, 3]);
            assert_eq!(grid.get(3, 2), Ok(Mark::from(OPP)));
            assert_eq!(grid.get(2, 3), Ok(Mark::Empty));

            let col = selector.choose_column(&mut grid, OWN, OPP).unwrap();
            assert_eq!(col, 3);
            assert_eq!(grid.get(2, 3), Ok(Mark::from(OWN)));
        }
    }

    #[test]
    fn test_exactly_one_new_mark() {
        for mut selector in selectors() {
            let mut grid = Grid::default();
            for round in 0..10 {
                let before = grid.occupied_cells();
                let snapshot = grid.clone();
                let col = selector.choose_column(&mut grid, OWN, OPP).unwrap();
                assert_eq!(grid.occupied_cells(), before + 1);

                let changed = (0..grid.rows())
                    .flat_map(|row| (0..grid.cols()).map(move |col| (row, col)))
                    .filter(|&(row, col)| grid.get(row, col) != snapshot.get(row, col))
                    .collect::<Vec<_>>();
                assert_eq!(changed.len(), 1);
                assert_eq!(changed[0].1, col);
                assert_eq!(grid.get(changed[0].0, col), Ok(Mark::from(OWN)));

                if grid.is_won() {
                    break;
                }
                // opponent spreads over the first three open columns
                let opp_col = grid.available_columns().nth(round % 3).unwrap_or(0);
                let _ = grid.apply_move(Mark::from(OPP), opp_col);
            }
        }
    }

    #[test]
    fn test_random_fallback_is_seeded() {
        let play = |seed| {
            let mut selector = HeuristicSelector::from_seed(seed);
            let mut grid = Grid::default();
            (0..5)
                .map(|_| selector.choose_column(&mut grid, OWN, OPP).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(play(42), play(42));
    }

    #[test]
    fn test_only_open_column_is_chosen() {
        let mut grid = Grid::new(4, 4).unwrap();
        // fill columns 0, 1 and 3 without creating any series
        for col in [0, 1, 3] {
            drop_all(&mut grid, OPP, &[col, col]);
            drop_all(&mut grid, OWN, &[col, col]);
        }
        for seed in 0..20 {
            let mut copy = grid.clone();
            let col = HeuristicSelector::from_seed(seed)
                .choose_column(&mut copy, OWN, OPP)
                .unwrap();
            assert_eq!(col, 2);
        }
    }

    #[test]
    fn test_no_legal_move() {
        let mut grid = Grid::new(1, 2).unwrap();
        drop_all(&mut grid, OPP, &[0, 1]);
        let before = grid.clone();
        for mut selector in selectors() {
            assert_eq!(
                selector.choose_column(&mut grid, OWN, OPP),
                Err(SelectorError::NoLegalMove)
            );
            assert_eq!(grid, before);
        }
    }
}
