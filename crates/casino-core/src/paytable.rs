//! Paylines, payout tables and line win calculation

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::symbols::Symbol;

/// Shortest run (or scatter count) that pays
pub const MIN_WIN_COUNT: usize = 3;

/// One grid cell. Serialized as a `[reel, row]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct Cell {
    pub reel: usize,
    pub row: usize,
}

impl Cell {
    pub fn new(reel: usize, row: usize) -> Self {
        Self { reel, row }
    }
}

impl From<(usize, usize)> for Cell {
    fn from((reel, row): (usize, usize)) -> Self {
        Self { reel, row }
    }
}

impl From<Cell> for (usize, usize) {
    fn from(cell: Cell) -> Self {
        (cell.reel, cell.row)
    }
}

/// A payline definition. Cell order, not grid geometry, defines "consecutive".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payline {
    /// Payline ID
    pub id: u32,
    /// Ordered path through the grid
    pub cells: Vec<Cell>,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
}

impl Payline {
    pub fn new(id: u32, cells: Vec<Cell>, description: impl Into<String>) -> Self {
        Self {
            id,
            cells,
            description: description.into(),
        }
    }

    /// One row index per reel, left to right (e.g., `[1, 0, 0, 0, 1]`)
    pub fn from_rows(id: u32, rows: &[usize], description: impl Into<String>) -> Self {
        let cells = rows
            .iter()
            .enumerate()
            .map(|(reel, &row)| Cell::new(reel, row))
            .collect();
        Self::new(id, cells, description)
    }

    /// Same row across all reels
    pub fn straight(id: u32, row: usize, reel_count: usize) -> Self {
        Self::from_rows(id, &vec![row; reel_count], format!("Row {row}"))
    }
}

/// The five lines of the classic 3×3 cabinet
pub fn classic_5_paylines() -> Vec<Payline> {
    vec![
        Payline::from_rows(1, &[1, 1, 1], "Center Line"),
        Payline::from_rows(2, &[0, 0, 0], "Top Line"),
        Payline::from_rows(3, &[2, 2, 2], "Bottom Line"),
        Payline::from_rows(4, &[0, 1, 2], "Diagonal Down"),
        Payline::from_rows(5, &[2, 1, 0], "Diagonal Up"),
    ]
}

/// Standard payline patterns for a 5×3 grid
pub fn standard_20_paylines() -> Vec<Payline> {
    vec![
        // Straight lines
        Payline::from_rows(1, &[1, 1, 1, 1, 1], "Middle"),
        Payline::from_rows(2, &[0, 0, 0, 0, 0], "Top"),
        Payline::from_rows(3, &[2, 2, 2, 2, 2], "Bottom"),
        // V shapes
        Payline::from_rows(4, &[0, 1, 2, 1, 0], "V"),
        Payline::from_rows(5, &[2, 1, 0, 1, 2], "Inverted V"),
        // Zigzag
        Payline::from_rows(6, &[0, 0, 1, 2, 2], "Slide Down"),
        Payline::from_rows(7, &[2, 2, 1, 0, 0], "Slide Up"),
        Payline::from_rows(8, &[1, 0, 0, 0, 1], "Shallow U"),
        Payline::from_rows(9, &[1, 2, 2, 2, 1], "Shallow Cap"),
        // W shapes
        Payline::from_rows(10, &[0, 1, 0, 1, 0], "W Top"),
        Payline::from_rows(11, &[2, 1, 2, 1, 2], "W Bottom"),
        // Troughs
        Payline::from_rows(12, &[0, 1, 1, 1, 0], "Trough Top"),
        Payline::from_rows(13, &[2, 1, 1, 1, 2], "Trough Bottom"),
        // Steps
        Payline::from_rows(14, &[1, 1, 0, 1, 1], "Step Up"),
        Payline::from_rows(15, &[1, 1, 2, 1, 1], "Step Down"),
        // Complex
        Payline::from_rows(16, &[0, 2, 0, 2, 0], "Zigzag Top"),
        Payline::from_rows(17, &[2, 0, 2, 0, 2], "Zigzag Bottom"),
        Payline::from_rows(18, &[1, 0, 1, 0, 1], "Ripple Up"),
        Payline::from_rows(19, &[1, 2, 1, 2, 1], "Ripple Down"),
        Payline::from_rows(20, &[0, 0, 2, 0, 0], "Drop"),
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
// PAYOUT TABLES
// ═══════════════════════════════════════════════════════════════════════════

/// Count-based multiplier tables. Counts missing from a table pay nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutRules {
    /// Payline run length → multiplier of the symbol value
    pub line_multipliers: BTreeMap<u8, f64>,
    /// Scatter count → multiplier of the symbol value
    pub scatter_multipliers: BTreeMap<u8, f64>,
}

impl PayoutRules {
    pub fn line_multiplier(&self, count: usize) -> f64 {
        lookup(&self.line_multipliers, count)
    }

    pub fn scatter_multiplier(&self, count: usize) -> f64 {
        lookup(&self.scatter_multipliers, count)
    }
}

impl Default for PayoutRules {
    fn default() -> Self {
        Self {
            line_multipliers: BTreeMap::from([(3, 1.0), (4, 5.0), (5, 25.0)]),
            scatter_multipliers: BTreeMap::from([(3, 2.0), (4, 10.0), (5, 50.0)]),
        }
    }
}

fn lookup(table: &BTreeMap<u8, f64>, count: usize) -> f64 {
    u8::try_from(count)
        .ok()
        .and_then(|count| table.get(&count))
        .copied()
        .unwrap_or(0.0)
}

// ═══════════════════════════════════════════════════════════════════════════
// LINE EVALUATION
// ═══════════════════════════════════════════════════════════════════════════

/// A win on a single payline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineWin {
    /// Payline ID
    pub payline_id: u32,
    /// Paying symbol ID (a wild only when the whole run is wild)
    pub symbol_id: String,
    /// Run length from the start of the pattern
    pub count: usize,
    /// value × count multiplier × symbol multiplier (when a wild helped)
    pub base_payout: f64,
    /// base payout × bet
    pub win: f64,
    /// A wild was part of the run
    pub wild_used: bool,
    /// Cells covered by the run
    pub cells: Vec<Cell>,
}

/// Matches paylines against a visible grid (`grid[reel][row]`)
#[derive(Debug, Clone, Copy)]
pub struct PaylineEvaluator<'a> {
    rules: &'a PayoutRules,
}

impl<'a> PaylineEvaluator<'a> {
    pub fn new(rules: &'a PayoutRules) -> Self {
        Self { rules }
    }

    /// Evaluate every payline, keeping only paying ones, in payline order
    pub fn evaluate_all(&self, grid: &[Vec<Symbol>], paylines: &[Payline], bet: f64) -> Vec<LineWin> {
        paylines
            .iter()
            .filter_map(|payline| self.evaluate(grid, payline, bet))
            .collect()
    }

    /// Left-to-right run along the pattern. A symbol continues the run when it
    /// matches the running symbol or either is wild; a leading wild hands the
    /// run over to the first non-wild symbol that continues it.
    pub fn evaluate(&self, grid: &[Vec<Symbol>], payline: &Payline, bet: f64) -> Option<LineWin> {
        let line: Vec<(Cell, &Symbol)> = payline
            .cells
            .iter()
            .filter_map(|&cell| {
                grid.get(cell.reel)
                    .and_then(|column| column.get(cell.row))
                    .map(|symbol| (cell, symbol))
            })
            .collect();

        let (_, first) = line.first()?;
        let mut paying = *first;
        let mut wild_used = first.is_wild();
        let mut count = 1;

        for (_, symbol) in &line[1..] {
            if !symbol.matches(paying) {
                break;
            }
            if symbol.is_wild() {
                wild_used = true;
            } else if paying.is_wild() {
                paying = *symbol;
            }
            count += 1;
        }

        if count < MIN_WIN_COUNT {
            return None;
        }

        let mut base_payout = paying.value * self.rules.line_multiplier(count);
        if wild_used {
            if let Some(multiplier) = paying.multiplier {
                base_payout *= multiplier;
            }
        }
        if base_payout <= 0.0 {
            return None;
        }

        Some(LineWin {
            payline_id: payline.id,
            symbol_id: paying.id.clone(),
            count,
            base_payout,
            win: base_payout * bet,
            wild_used,
            cells: line[..count].iter().map(|(cell, _)| *cell).collect(),
        })
    }
}
