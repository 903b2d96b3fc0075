//! Spin Engine: one spin from bet to classified result
//!
//! The engine owns a validated, read-only configuration and nothing else.
//! All randomness comes from the injected source, so a spin is reproducible
//! from the seed that started the stream.

use crate::bonus::BonusTrigger;
use crate::config::{ConfigError, SlotConfiguration};
use crate::paytable::PaylineEvaluator;
use crate::random::{RandomSource, SecureRandomSource, SeedRecord};
use crate::reels::{VirtualReel, WeightedReelBuilder, build_from_strip};
use crate::scatter::ScatterEvaluator;
use crate::spin::{EngineState, SpinResult};
use crate::symbols::Symbol;
use crate::validation::{BetError, BetValidator};

/// Slot outcome engine for a single game mode
#[derive(Debug, Clone)]
pub struct SpinEngine {
    config: SlotConfiguration,
    validator: BetValidator,
    /// Weighted expansion of the symbol set, unshuffled
    strip: Vec<usize>,
}

impl SpinEngine {
    /// Validate the configuration once; spins never see a malformed one
    pub fn new(config: SlotConfiguration) -> Result<Self, ConfigError> {
        config.validate()?;
        let strip = WeightedReelBuilder::new(&config.symbols)?.expand();
        log::debug!(
            "SpinEngine ready for '{}': {}x{}, {} lines, reel length {}",
            config.id,
            config.reels,
            config.rows,
            config.paylines.len(),
            config.reel_length()
        );
        Ok(Self {
            config,
            validator: BetValidator::default(),
            strip,
        })
    }

    /// Replace the bet validator (e.g. a stricter bankroll fraction)
    pub fn with_validator(mut self, validator: BetValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn config(&self) -> &SlotConfiguration {
        &self.config
    }

    pub fn validator(&self) -> &BetValidator {
        &self.validator
    }

    // ═══════════════════════════════════════════════════════════════════════
    // SPIN
    // ═══════════════════════════════════════════════════════════════════════

    /// Execute a spin; next state is `idle` unless a bonus fires
    pub fn spin<R: RandomSource>(&self, rng: &mut R, bet: f64) -> SpinResult {
        self.spin_with_state(rng, bet, EngineState::Idle)
    }

    /// Execute an autoplay spin; next state is `autoplay` unless a bonus fires
    pub fn spin_autoplay<R: RandomSource>(&self, rng: &mut R, bet: f64) -> SpinResult {
        self.spin_with_state(rng, bet, EngineState::Autoplay)
    }

    /// Gate on the bet first, then spin. A refused bet draws nothing from `rng`.
    pub fn play<R: RandomSource>(&self, rng: &mut R, bet: f64, bankroll: f64) -> Result<SpinResult, BetError> {
        self.validator
            .validate(bet, bankroll, self.config.min_bet, self.config.max_bet)?;
        Ok(self.spin(rng, bet))
    }

    /// Re-run the first spin of a recorded stream
    pub fn replay(&self, seed: SeedRecord, bet: f64) -> SpinResult {
        let mut rng = SecureRandomSource::from_record(seed);
        self.spin(&mut rng, bet)
    }

    fn spin_with_state<R: RandomSource>(&self, rng: &mut R, bet: f64, idle_state: EngineState) -> SpinResult {
        let reels = build_from_strip(rng, &self.strip, self.config.reels);
        let reel_positions: Vec<usize> = reels
            .iter()
            .map(|reel| rng.next_int(0, reel.len() as i64 - 1) as usize)
            .collect();
        let grid = self.visible_grid(&reels, &reel_positions);

        let line_wins = PaylineEvaluator::new(&self.config.payouts).evaluate_all(&grid, &self.config.paylines, bet);
        let scatter_wins = ScatterEvaluator::new(&self.config.payouts).evaluate(&grid, &self.config.symbols, bet);
        let bonus = BonusTrigger::evaluate(&grid, &self.config.bonus_features).cloned();

        if let Some(feature) = &bonus {
            log::debug!(
                "Bonus '{}' triggered on '{}' at stops {:?}",
                feature.id,
                self.config.id,
                reel_positions
            );
        }

        let mut result = SpinResult::new(bet, reel_positions, grid)
            .with_wins(line_wins, scatter_wins)
            .with_category(&self.config.win_tiers)
            .with_bonus(bonus, idle_state);
        result.degraded_entropy = rng.is_degraded();

        log::trace!(
            "Spin '{}' bet {} stops {:?}: win {} ({}), next {:?}",
            self.config.id,
            bet,
            result.reel_positions,
            result.total_win,
            result.category.as_str(),
            result.next_state
        );
        result
    }

    /// Column-major grid, row 0 is the symbol at the stop
    fn visible_grid(&self, reels: &[VirtualReel], stops: &[usize]) -> Vec<Vec<Symbol>> {
        reels
            .iter()
            .zip(stops)
            .map(|(reel, &stop)| {
                reel.window(stop, self.config.rows)
                    .into_iter()
                    .map(|index| self.config.symbols[index].clone())
                    .collect()
            })
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// ONE-SHOT ENTRY POINT
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpinError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Bet refused ({code}): {0}", code = .0.code())]
    Bet(#[from] BetError),
}

/// Validate configuration and bet, then spin once
pub fn spin<R: RandomSource>(
    config: &SlotConfiguration,
    bet: f64,
    bankroll: f64,
    rng: &mut R,
) -> Result<SpinResult, SpinError> {
    config.validate()?;
    BetValidator::default().validate(bet, bankroll, config.min_bet, config.max_bet)?;
    let engine = SpinEngine::new(config.clone())?;
    Ok(engine.spin(rng, bet))
}
