//! Scatter evaluation: grid-wide counts, independent of paylines

use serde::{Deserialize, Serialize};

use crate::paytable::{Cell, MIN_WIN_COUNT, PayoutRules};
use crate::symbols::Symbol;

/// Scatter win result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterWin {
    /// Scatter symbol ID
    pub symbol_id: String,
    /// Number of scatters on the grid
    pub count: usize,
    /// Count-based scatter multiplier
    pub multiplier: f64,
    /// value × multiplier × bet
    pub win: f64,
    /// Positions of the scatters
    pub positions: Vec<Cell>,
}

#[derive(Debug, Clone, Copy)]
pub struct ScatterEvaluator<'a> {
    rules: &'a PayoutRules,
}

impl<'a> ScatterEvaluator<'a> {
    pub fn new(rules: &'a PayoutRules) -> Self {
        Self { rules }
    }

    /// Every scatter symbol with 3+ occurrences pays on its own. Results follow
    /// the order of `symbols` so the outcome does not depend on grid layout.
    pub fn evaluate(&self, grid: &[Vec<Symbol>], symbols: &[Symbol], bet: f64) -> Vec<ScatterWin> {
        symbols
            .iter()
            .filter(|symbol| symbol.is_scatter())
            .filter_map(|scatter| self.evaluate_symbol(grid, scatter, bet))
            .collect()
    }

    fn evaluate_symbol(&self, grid: &[Vec<Symbol>], scatter: &Symbol, bet: f64) -> Option<ScatterWin> {
        let positions = positions_of(grid, |symbol| symbol.id == scatter.id);
        let count = positions.len();
        if count < MIN_WIN_COUNT {
            return None;
        }

        let multiplier = self.rules.scatter_multiplier(count);
        let win = scatter.value * multiplier * bet;
        if win <= 0.0 {
            return None;
        }

        Some(ScatterWin {
            symbol_id: scatter.id.clone(),
            count,
            multiplier,
            win,
            positions,
        })
    }
}

/// Cells whose symbol satisfies `predicate`, reel-major order
fn positions_of(grid: &[Vec<Symbol>], predicate: impl Fn(&Symbol) -> bool) -> Vec<Cell> {
    grid.iter()
        .enumerate()
        .flat_map(|(reel, column)| {
            column
                .iter()
                .enumerate()
                .filter(|(_, symbol)| predicate(*symbol))
                .map(move |(row, _)| Cell::new(reel, row))
                .collect::<Vec<_>>()
        })
        .collect()
}
