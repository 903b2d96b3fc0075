//! Bonus features and trigger evaluation

use serde::{Deserialize, Serialize};

use crate::symbols::Symbol;

/// Bonus behavior type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusKind {
    FreeSpins,
    PickBonus,
    Wheel,
    Progressive,
}

/// A configured bonus feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusFeature {
    pub id: String,
    pub name: String,
    /// Symbol IDs that count toward the trigger
    pub trigger_symbols: Vec<String>,
    /// Minimum number of trigger symbols on the grid
    pub trigger_count: u32,
    pub kind: BonusKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_spins: Option<u32>,
}

impl BonusFeature {
    /// Free spins feature with a spin count and win multiplier
    pub fn free_spins(
        id: impl Into<String>,
        name: impl Into<String>,
        trigger_symbols: &[&str],
        trigger_count: u32,
        spins: u32,
        multiplier: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            trigger_symbols: trigger_symbols.iter().map(|s| s.to_string()).collect(),
            trigger_count,
            kind: BonusKind::FreeSpins,
            multiplier: Some(multiplier),
            free_spins: Some(spins),
        }
    }

    /// Grid symbols whose ID is in the trigger set
    pub fn count_triggers(&self, grid: &[Vec<Symbol>]) -> usize {
        grid.iter()
            .flatten()
            .filter(|symbol| self.trigger_symbols.contains(&symbol.id))
            .count()
    }

    pub fn is_triggered(&self, grid: &[Vec<Symbol>]) -> bool {
        self.count_triggers(grid) >= self.trigger_count as usize
    }
}

/// First configured feature whose trigger count is met; no stacking
pub struct BonusTrigger;

impl BonusTrigger {
    pub fn evaluate<'a>(grid: &[Vec<Symbol>], features: &'a [BonusFeature]) -> Option<&'a BonusFeature> {
        features.iter().find(|feature| feature.is_triggered(grid))
    }
}
