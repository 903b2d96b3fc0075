//! Bet validation and responsible gaming limits
//!
//! Every check is a separate function so each refusal reason can be exercised
//! on its own. A refusal never changes state.

use serde::{Deserialize, Serialize};

/// Largest share of the bankroll a single spin may risk
pub const DEFAULT_MAX_BANKROLL_FRACTION: f64 = 0.25;

/// Bet refusal with a stable reason code
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BetError {
    #[error("Bet {bet} is below the minimum {min}")]
    BelowMinimum { bet: f64, min: f64 },

    #[error("Bet {bet} is above the maximum {max}")]
    AboveMaximum { bet: f64, max: f64 },

    #[error("Bet {bet} exceeds bankroll {bankroll}")]
    InsufficientFunds { bet: f64, bankroll: f64 },

    #[error("Bet {bet} exceeds {limit} ({fraction} of bankroll)")]
    ExceedsBankrollFraction { bet: f64, limit: f64, fraction: f64 },
}

impl BetError {
    /// Reason code surfaced to the caller
    pub fn code(&self) -> &'static str {
        match self {
            BetError::BelowMinimum { .. } => "below-minimum",
            BetError::AboveMaximum { .. } => "above-maximum",
            BetError::InsufficientFunds { .. } => "insufficient-funds",
            BetError::ExceedsBankrollFraction { .. } => "exceeds-bankroll-fraction",
        }
    }
}

/// Gates a spin on bet size and bankroll exposure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetValidator {
    /// Hard cap on `bet / bankroll`, independent of the configured max bet
    pub max_bankroll_fraction: f64,
}

impl BetValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run all four checks in order
    pub fn validate(&self, bet: f64, bankroll: f64, min_bet: f64, max_bet: f64) -> Result<(), BetError> {
        check_minimum(bet, min_bet)?;
        check_maximum(bet, max_bet)?;
        check_funds(bet, bankroll)?;
        self.check_bankroll_fraction(bet, bankroll)
    }

    pub fn is_valid(&self, bet: f64, bankroll: f64, min_bet: f64, max_bet: f64) -> bool {
        self.validate(bet, bankroll, min_bet, max_bet).is_ok()
    }

    pub fn check_bankroll_fraction(&self, bet: f64, bankroll: f64) -> Result<(), BetError> {
        let limit = bankroll * self.max_bankroll_fraction;
        if !limit.is_finite() || bet > limit {
            return Err(BetError::ExceedsBankrollFraction {
                bet,
                limit,
                fraction: self.max_bankroll_fraction,
            });
        }
        Ok(())
    }
}

impl Default for BetValidator {
    fn default() -> Self {
        Self {
            max_bankroll_fraction: DEFAULT_MAX_BANKROLL_FRACTION,
        }
    }
}

/// Non-finite bets are refused here as well
pub fn check_minimum(bet: f64, min_bet: f64) -> Result<(), BetError> {
    if !bet.is_finite() || bet < min_bet {
        return Err(BetError::BelowMinimum { bet, min: min_bet });
    }
    Ok(())
}

pub fn check_maximum(bet: f64, max_bet: f64) -> Result<(), BetError> {
    if bet > max_bet {
        return Err(BetError::AboveMaximum { bet, max: max_bet });
    }
    Ok(())
}

/// A non-finite or negative bankroll funds nothing
pub fn check_funds(bet: f64, bankroll: f64) -> Result<(), BetError> {
    if !bankroll.is_finite() || bankroll < 0.0 || bet > bankroll {
        return Err(BetError::InsufficientFunds { bet, bankroll });
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════
// RESPONSIBLE GAMING
// ═══════════════════════════════════════════════════════════════════════════

/// Player-configured spend limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResponsibleGamingLimits {
    pub daily_limit: f64,
    pub session_limit: f64,
    pub loss_limit: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LimitError {
    #[error("Daily spending limit exceeded ({spent} of {limit})")]
    DailyLimit { spent: f64, limit: f64 },

    #[error("Session spending limit exceeded ({spent} of {limit})")]
    SessionLimit { spent: f64, limit: f64 },

    #[error("Loss limit exceeded ({spent} of {limit})")]
    LossLimit { spent: f64, limit: f64 },
}

impl LimitError {
    pub fn code(&self) -> &'static str {
        match self {
            LimitError::DailyLimit { .. } => "daily-limit",
            LimitError::SessionLimit { .. } => "session-limit",
            LimitError::LossLimit { .. } => "loss-limit",
        }
    }
}

impl ResponsibleGamingLimits {
    /// Would `bet` on top of `current_spent` break a limit
    pub fn check_spend(&self, bet: f64, current_spent: f64) -> Result<(), LimitError> {
        let spent = current_spent + bet;
        if spent > self.daily_limit {
            return Err(LimitError::DailyLimit { spent, limit: self.daily_limit });
        }
        if spent > self.session_limit {
            return Err(LimitError::SessionLimit { spent, limit: self.session_limit });
        }
        if spent > self.loss_limit {
            return Err(LimitError::LossLimit { spent, limit: self.loss_limit });
        }
        Ok(())
    }
}
