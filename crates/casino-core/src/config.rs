//! Slot game configuration, loading and validation

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bonus::{BonusFeature, BonusKind};
use crate::paytable::{PayoutRules, Payline, classic_5_paylines, standard_20_paylines};
use crate::spin::WinCategory;
use crate::symbols::Symbol;

/// Qualitative volatility class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Volatility {
    Low,
    #[default]
    Medium,
    High,
}

/// Upper bounds (bet multiples, exclusive) for each win category.
/// Wins at or above `big_below` are jackpots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WinTierThresholds {
    pub small_below: f64,
    pub medium_below: f64,
    pub big_below: f64,
}

impl WinTierThresholds {
    /// Categorize a total win against the bet that produced it
    pub fn classify(&self, total_win: f64, bet: f64) -> WinCategory {
        if total_win <= 0.0 {
            return WinCategory::None;
        }
        let ratio = if bet > 0.0 { total_win / bet } else { f64::INFINITY };
        if ratio < self.small_below {
            WinCategory::Small
        } else if ratio < self.medium_below {
            WinCategory::Medium
        } else if ratio < self.big_below {
            WinCategory::Big
        } else {
            WinCategory::Jackpot
        }
    }

    fn is_valid(&self) -> bool {
        let values = [self.small_below, self.medium_below, self.big_below];
        values.iter().all(|v| v.is_finite() && *v > 0.0)
            && self.small_below < self.medium_below
            && self.medium_below < self.big_below
    }
}

impl Default for WinTierThresholds {
    fn default() -> Self {
        Self {
            small_below: 5.0,
            medium_below: 20.0,
            big_below: 100.0,
        }
    }
}

/// Complete configuration of one slot game mode. Read-only once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotConfiguration {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub theme: String,
    /// Number of reels (columns)
    pub reels: usize,
    /// Visible rows per reel
    pub rows: usize,
    pub paylines: Vec<Payline>,
    pub symbols: Vec<Symbol>,
    pub bonus_features: Vec<BonusFeature>,
    /// Target return to player (e.g., 0.96)
    pub target_rtp: f64,
    pub volatility: Volatility,
    pub min_bet: f64,
    pub max_bet: f64,
    #[serde(default)]
    pub payouts: PayoutRules,
    #[serde(default)]
    pub win_tiers: WinTierThresholds,
}

impl SlotConfiguration {
    // ═══════════════════════════════════════════════════════════════════════
    // PRESETS
    // ═══════════════════════════════════════════════════════════════════════

    /// Classic 777: 3×3, five lines, scatter-triggered free spins
    pub fn classic_777() -> Self {
        Self {
            id: "classic_777".into(),
            name: "Classic 777".into(),
            theme: "classic".into(),
            reels: 3,
            rows: 3,
            paylines: classic_5_paylines(),
            symbols: vec![
                Symbol::regular("seven", "7", 12.0, 2),
                Symbol::regular("bar", "BAR", 6.0, 4),
                Symbol::regular("cherry", "Cherry", 2.4, 8),
                Symbol::regular("lemon", "Lemon", 1.6, 10),
                Symbol::regular("orange", "Orange", 1.1, 12),
                Symbol::wild("wild", "Wild", 0.0, 3).with_multiplier(2.0),
                Symbol::scatter("scatter", "Scatter", 0.6, 5),
            ],
            bonus_features: vec![BonusFeature::free_spins(
                "free_spins",
                "Free Spins",
                &["scatter"],
                3,
                10,
                2.0,
            )],
            target_rtp: 0.96,
            volatility: Volatility::Medium,
            min_bet: 1.0,
            max_bet: 100.0,
            payouts: PayoutRules::default(),
            win_tiers: WinTierThresholds::default(),
        }
    }

    /// Five-reel standard: 5×3, 20 lines, pick bonus ahead of free spins
    pub fn five_reel_standard() -> Self {
        Self {
            id: "five_reel_standard".into(),
            name: "Five Reel Standard".into(),
            theme: "royal".into(),
            reels: 5,
            rows: 3,
            paylines: standard_20_paylines(),
            symbols: vec![
                Symbol::regular("crown", "Crown", 1.25, 3),
                Symbol::regular("diamond", "Diamond", 0.8, 4),
                Symbol::regular("bell", "Bell", 0.5, 6),
                Symbol::regular("cherry", "Cherry", 0.3, 8),
                Symbol::regular("plum", "Plum", 0.2, 9),
                Symbol::regular("lemon", "Lemon", 0.12, 10),
                Symbol::wild("wild", "Wild", 2.0, 2).with_multiplier(2.0),
                Symbol::scatter("star", "Star", 0.5, 3),
            ],
            bonus_features: vec![
                BonusFeature {
                    id: "treasure_pick".into(),
                    name: "Treasure Pick".into(),
                    trigger_symbols: vec!["star".into()],
                    trigger_count: 4,
                    kind: BonusKind::PickBonus,
                    multiplier: Some(5.0),
                    free_spins: None,
                },
                BonusFeature::free_spins("free_spins", "Free Spins", &["star"], 3, 8, 2.0),
            ],
            target_rtp: 0.96,
            volatility: Volatility::High,
            min_bet: 1.0,
            max_bet: 500.0,
            payouts: PayoutRules::default(),
            win_tiers: WinTierThresholds::default(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // LOADING
    // ═══════════════════════════════════════════════════════════════════════

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML configuration
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load by extension: `.json`, `.yaml` / `.yml`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&text)?,
            Some("json") => Self::from_json_str(&text)?,
            other => {
                return Err(ConfigError::Io(format!(
                    "{}: unsupported extension {other:?}",
                    path.display()
                )));
            }
        };
        log::debug!(
            "Loaded slot configuration '{}' ({}x{}, {} lines) from {}",
            config.id,
            config.reels,
            config.rows,
            config.paylines.len(),
            path.display()
        );
        Ok(config)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // LOOKUP
    // ═══════════════════════════════════════════════════════════════════════

    pub fn symbol(&self, id: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.id == id)
    }

    /// Sum of symbol frequencies, the virtual reel length
    pub fn reel_length(&self) -> usize {
        self.symbols.iter().map(|s| s.frequency as usize).sum()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // VALIDATION
    // ═══════════════════════════════════════════════════════════════════════

    /// Check every load-time invariant
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reels == 0 || self.rows == 0 {
            return Err(ConfigError::InvalidGrid {
                reels: self.reels,
                rows: self.rows,
            });
        }

        self.validate_symbols()?;
        self.validate_paylines()?;
        self.validate_bonuses()?;

        if !(self.min_bet.is_finite() && self.max_bet.is_finite())
            || self.min_bet <= 0.0
            || self.max_bet < self.min_bet
        {
            return Err(ConfigError::InvalidBetRange {
                min: self.min_bet,
                max: self.max_bet,
            });
        }

        if !(self.target_rtp > 0.0 && self.target_rtp <= 1.0) {
            return Err(ConfigError::InvalidRtp(self.target_rtp));
        }

        let tables = [
            ("line", &self.payouts.line_multipliers),
            ("scatter", &self.payouts.scatter_multipliers),
        ];
        for (table, multipliers) in tables {
            if let Some((count, value)) = multipliers.iter().find(|(_, v)| !is_amount(**v)) {
                return Err(ConfigError::InvalidValue(format!(
                    "{table} multiplier for {count} is {value}"
                )));
            }
        }

        if !self.win_tiers.is_valid() {
            return Err(ConfigError::InvalidTiers);
        }

        Ok(())
    }

    fn validate_symbols(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::NoSymbols);
        }

        let mut seen = HashSet::new();
        for symbol in &self.symbols {
            if !seen.insert(symbol.id.as_str()) {
                return Err(ConfigError::DuplicateSymbol(symbol.id.clone()));
            }
            if !is_amount(symbol.value) {
                return Err(ConfigError::InvalidValue(format!(
                    "symbol '{}' value {}",
                    symbol.id, symbol.value
                )));
            }
            if let Some(multiplier) = symbol.multiplier {
                if !(multiplier.is_finite() && multiplier > 0.0) {
                    return Err(ConfigError::InvalidValue(format!(
                        "symbol '{}' multiplier {multiplier}",
                        symbol.id
                    )));
                }
            }
        }

        if self.reel_length() == 0 {
            return Err(ConfigError::EmptyReel);
        }
        Ok(())
    }

    fn validate_paylines(&self) -> Result<(), ConfigError> {
        for payline in &self.paylines {
            if payline.cells.is_empty() {
                return Err(ConfigError::EmptyPayline(payline.id));
            }
            if let Some(cell) = payline
                .cells
                .iter()
                .find(|c| c.reel >= self.reels || c.row >= self.rows)
            {
                return Err(ConfigError::PaylineOutOfBounds {
                    payline: payline.id,
                    reel: cell.reel,
                    row: cell.row,
                });
            }
        }
        Ok(())
    }

    fn validate_bonuses(&self) -> Result<(), ConfigError> {
        for feature in &self.bonus_features {
            if feature.trigger_count == 0 {
                return Err(ConfigError::InvalidValue(format!(
                    "bonus '{}' trigger count is 0",
                    feature.id
                )));
            }
            if let Some(unknown) = feature
                .trigger_symbols
                .iter()
                .find(|id| self.symbol(id).is_none())
            {
                return Err(ConfigError::UnknownTriggerSymbol {
                    feature: feature.id.clone(),
                    symbol: unknown.clone(),
                });
            }
        }
        Ok(())
    }
}

fn is_amount(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Configuration errors, all raised at load time
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration has no symbols")]
    NoSymbols,

    #[error("Duplicate symbol id: {0}")]
    DuplicateSymbol(String),

    #[error("Symbol frequencies sum to zero, reels would be empty")]
    EmptyReel,

    #[error("Invalid grid: {reels} reels x {rows} rows")]
    InvalidGrid { reels: usize, rows: usize },

    #[error("Payline {payline} cell ({reel}, {row}) is outside the grid")]
    PaylineOutOfBounds { payline: u32, reel: usize, row: usize },

    #[error("Payline {0} has no cells")]
    EmptyPayline(u32),

    #[error("Bonus '{feature}' references unknown symbol '{symbol}'")]
    UnknownTriggerSymbol { feature: String, symbol: String },

    #[error("Invalid bet range: min {min}, max {max}")]
    InvalidBetRange { min: f64, max: f64 },

    #[error("Target RTP must be in (0, 1], got {0}")]
    InvalidRtp(f64),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Win tier thresholds must be positive and strictly increasing")]
    InvalidTiers,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paytable::Cell;

    #[test]
    fn test_presets_are_valid() {
        assert!(SlotConfiguration::classic_777().validate().is_ok());
        assert!(SlotConfiguration::five_reel_standard().validate().is_ok());
        assert_eq!(SlotConfiguration::classic_777().reel_length(), 44);
    }

    #[test]
    fn test_classify_thresholds() {
        let tiers = WinTierThresholds::default();
        assert_eq!(tiers.classify(0.0, 10.0), WinCategory::None);
        assert_eq!(tiers.classify(49.0, 10.0), WinCategory::Small);
        assert_eq!(tiers.classify(50.0, 10.0), WinCategory::Medium);
        assert_eq!(tiers.classify(199.0, 10.0), WinCategory::Medium);
        assert_eq!(tiers.classify(200.0, 10.0), WinCategory::Big);
        assert_eq!(tiers.classify(1000.0, 10.0), WinCategory::Jackpot);
    }

    #[test]
    fn test_payline_out_of_bounds() {
        let mut config = SlotConfiguration::classic_777();
        config.paylines.push(Payline::new(9, vec![Cell::new(0, 0), Cell::new(3, 0)], "Off grid"));
        assert_eq!(
            config.validate(),
            Err(ConfigError::PaylineOutOfBounds { payline: 9, reel: 3, row: 0 })
        );

        let mut config = SlotConfiguration::classic_777();
        config.paylines[0].cells[1].row = 3;
        assert!(matches!(config.validate(), Err(ConfigError::PaylineOutOfBounds { .. })));
    }

    #[test]
    fn test_unknown_trigger_symbol() {
        let mut config = SlotConfiguration::classic_777();
        config.bonus_features[0].trigger_symbols.push("moon".into());
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnknownTriggerSymbol {
                feature: "free_spins".into(),
                symbol: "moon".into(),
            })
        );
    }

    #[test]
    fn test_symbol_errors() {
        let mut config = SlotConfiguration::classic_777();
        config.symbols.clear();
        config.bonus_features.clear();
        assert_eq!(config.validate(), Err(ConfigError::NoSymbols));

        let mut config = SlotConfiguration::classic_777();
        config.symbols.iter_mut().for_each(|s| s.frequency = 0);
        assert_eq!(config.validate(), Err(ConfigError::EmptyReel));

        let mut config = SlotConfiguration::classic_777();
        let duplicate = config.symbols[0].clone();
        config.symbols.push(duplicate);
        assert_eq!(config.validate(), Err(ConfigError::DuplicateSymbol("seven".into())));

        let mut config = SlotConfiguration::classic_777();
        config.symbols[1].value = -1.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_bet_rtp_and_tier_errors() {
        let mut config = SlotConfiguration::classic_777();
        config.min_bet = 200.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidBetRange { .. })));

        let mut config = SlotConfiguration::classic_777();
        config.target_rtp = 1.2;
        assert_eq!(config.validate(), Err(ConfigError::InvalidRtp(1.2)));

        let mut config = SlotConfiguration::classic_777();
        config.win_tiers.medium_below = 3.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidTiers));

        let mut config = SlotConfiguration::classic_777();
        config.reels = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidGrid { .. })));
    }

    #[test]
    fn test_json_round_trip_validates() {
        let json = serde_json::to_string(&SlotConfiguration::five_reel_standard()).unwrap();
        let parsed = SlotConfiguration::from_json_str(&json).unwrap();
        assert_eq!(parsed, SlotConfiguration::five_reel_standard());

        assert!(matches!(
            SlotConfiguration::from_json_str("{ \"id\": 1 }"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
id: mini
name: Mini
reels: 3
rows: 1
paylines:
  - id: 1
    cells: [[0, 0], [1, 0], [2, 0]]
    description: Only line
symbols:
  - { id: a, name: A, value: 2, frequency: 4 }
  - { id: w, name: Wild, value: 0, frequency: 1, kind: wild, multiplier: 2 }
bonus_features: []
target_rtp: 0.9
volatility: low
min_bet: 1
max_bet: 10
payouts:
  line_multipliers: { 3: 1.5 }
  scatter_multipliers: {}
"#;
        let config = SlotConfiguration::from_yaml_str(yaml).unwrap();
        assert_eq!(config.volatility, Volatility::Low);
        assert_eq!(config.payouts.line_multiplier(3), 1.5);
        assert_eq!(config.win_tiers, WinTierThresholds::default());
        assert!(config.symbol("w").unwrap().is_wild());
    }

    #[test]
    fn test_parse_rejects_invalid_config() {
        let mut config = SlotConfiguration::classic_777();
        config.paylines[0].cells.clear();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(SlotConfiguration::from_json_str(&json), Err(ConfigError::EmptyPayline(1)));
    }
}
