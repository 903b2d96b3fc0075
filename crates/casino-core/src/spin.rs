//! Spin result types

use serde::{Deserialize, Serialize};

use crate::bonus::BonusFeature;
use crate::config::WinTierThresholds;
use crate::paytable::LineWin;
use crate::scatter::ScatterWin;
use crate::symbols::Symbol;

/// Win magnitude relative to the bet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinCategory {
    #[default]
    None,
    Small,
    Medium,
    Big,
    Jackpot,
}

impl WinCategory {
    pub const ALL: [WinCategory; 5] = [
        WinCategory::None,
        WinCategory::Small,
        WinCategory::Medium,
        WinCategory::Big,
        WinCategory::Jackpot,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WinCategory::None => "none",
            WinCategory::Small => "small",
            WinCategory::Medium => "medium",
            WinCategory::Big => "big",
            WinCategory::Jackpot => "jackpot",
        }
    }
}

/// Engine state after a spin
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    #[default]
    Idle,
    Bonus,
    Autoplay,
}

/// Complete spin result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinResult {
    /// Bet amount
    pub bet: f64,
    /// Stop position per reel
    pub reel_positions: Vec<usize>,
    /// Visible grid (reels × rows)
    pub grid: Vec<Vec<Symbol>>,
    /// Paying lines, in payline order
    pub line_wins: Vec<LineWin>,
    /// Paying scatters, in symbol order
    pub scatter_wins: Vec<ScatterWin>,
    pub line_total: f64,
    pub scatter_total: f64,
    /// Line + scatter total
    pub total_win: f64,
    /// Win-to-bet ratio
    pub win_ratio: f64,
    pub category: WinCategory,
    /// Bonus feature triggered (at most one)
    pub bonus: Option<BonusFeature>,
    pub next_state: EngineState,
    /// Drawn from a stream seeded without OS entropy
    #[serde(default)]
    pub degraded_entropy: bool,
}

impl SpinResult {
    /// Create a result for a grid with no wins evaluated yet
    pub fn new(bet: f64, reel_positions: Vec<usize>, grid: Vec<Vec<Symbol>>) -> Self {
        Self {
            bet,
            reel_positions,
            grid,
            line_wins: Vec::new(),
            scatter_wins: Vec::new(),
            line_total: 0.0,
            scatter_total: 0.0,
            total_win: 0.0,
            win_ratio: 0.0,
            category: WinCategory::None,
            bonus: None,
            next_state: EngineState::Idle,
            degraded_entropy: false,
        }
    }

    /// Apply line and scatter wins and recompute totals
    pub fn with_wins(mut self, line_wins: Vec<LineWin>, scatter_wins: Vec<ScatterWin>) -> Self {
        self.line_total = line_wins.iter().map(|w| w.win).sum();
        self.scatter_total = scatter_wins.iter().map(|w| w.win).sum();
        self.total_win = self.line_total + self.scatter_total;
        self.win_ratio = if self.bet > 0.0 {
            self.total_win / self.bet
        } else {
            0.0
        };
        self.line_wins = line_wins;
        self.scatter_wins = scatter_wins;
        self
    }

    /// Set category from the instance's tier thresholds
    pub fn with_category(mut self, thresholds: &WinTierThresholds) -> Self {
        self.category = thresholds.classify(self.total_win, self.bet);
        self
    }

    /// Attach the triggered bonus; state becomes `bonus` when one fired
    pub fn with_bonus(mut self, bonus: Option<BonusFeature>, idle_state: EngineState) -> Self {
        self.next_state = if bonus.is_some() {
            EngineState::Bonus
        } else {
            idle_state
        };
        self.bonus = bonus;
        self
    }

    /// Check if this is a win
    pub fn is_win(&self) -> bool {
        self.total_win > 0.0
    }

    /// Grid as symbol IDs, the form collaborators persist
    pub fn symbol_ids(&self) -> Vec<Vec<String>> {
        self.grid
            .iter()
            .map(|column| column.iter().map(|s| s.id.clone()).collect())
            .collect()
    }
}
