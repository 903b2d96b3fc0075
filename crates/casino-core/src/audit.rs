//! Session integrity audit
//!
//! Pure checks over a window of recorded rounds. The auditor keeps no state
//! between calls and never blocks play: every finding is an advisory
//! [`IntegrityWarning`], escalation is up to the caller.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::WinTierThresholds;
use crate::spin::{SpinResult, WinCategory};

/// One recorded round, as the session layer persists it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRound {
    pub bet_amount: f64,
    pub win_amount: f64,
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: i64,
    #[serde(default)]
    pub category: WinCategory,
}

impl GameRound {
    /// Unclassified round. `category` stays `none` until
    /// [`GameRound::with_category`] classifies it; `from_spin` copies it.
    pub fn new(bet_amount: f64, win_amount: f64, timestamp_ms: i64) -> Self {
        Self {
            bet_amount,
            win_amount,
            timestamp_ms,
            category: WinCategory::None,
        }
    }

    pub fn from_spin(result: &SpinResult, timestamp_ms: i64) -> Self {
        Self {
            bet_amount: result.bet,
            win_amount: result.total_win,
            timestamp_ms,
            category: result.category,
        }
    }

    /// Classify the round's amounts against `tiers`
    pub fn with_category(mut self, tiers: &WinTierThresholds) -> Self {
        self.category = tiers.classify(self.win_amount, self.bet_amount);
        self
    }

    pub fn is_win(&self) -> bool {
        self.win_amount > 0.0
    }

    /// Win-to-bet ratio; zero for a zero bet
    pub fn multiplier(&self) -> f64 {
        if self.bet_amount > 0.0 {
            self.win_amount / self.bet_amount
        } else {
            0.0
        }
    }
}

/// Audit ceilings. Every field has a default so partial JSON works.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditThresholds {
    /// Inclusive acceptable RTP band
    pub rtp_band: (f64, f64),
    /// Below this many rounds the RTP check is skipped
    pub min_rounds_for_rtp: usize,
    pub max_consecutive_wins: usize,
    pub max_win_multiplier: f64,
    pub max_actions_per_window: usize,
    pub action_window_ms: i64,
    pub min_action_interval_ms: i64,
}

impl Default for AuditThresholds {
    fn default() -> Self {
        Self {
            rtp_band: (0.5, 1.5),
            min_rounds_for_rtp: 20,
            max_consecutive_wins: 15,
            max_win_multiplier: 1000.0,
            max_actions_per_window: 60,
            action_window_ms: 60_000,
            min_action_interval_ms: 100,
        }
    }
}

impl AuditThresholds {
    /// Reject ceilings the window checks cannot work with
    pub fn validate(&self) -> Result<(), ThresholdError> {
        if self.action_window_ms <= 0 {
            return Err(ThresholdError::ActionWindow(self.action_window_ms));
        }
        if self.min_action_interval_ms < 0 {
            return Err(ThresholdError::ActionInterval(self.min_action_interval_ms));
        }
        let (min, max) = self.rtp_band;
        if min.is_nan() || max.is_nan() || min > max {
            return Err(ThresholdError::RtpBand { min, max });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ThresholdError {
    #[error("Action window must be positive, got {0}ms")]
    ActionWindow(i64),

    #[error("Minimum action interval must not be negative, got {0}ms")]
    ActionInterval(i64),

    #[error("RTP band {min}..{max} is empty")]
    RtpBand { min: f64, max: f64 },
}

/// Advisory finding from an audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityWarning {
    RtpOutOfBand { rtp: f64, min: f64, max: f64, rounds: usize },
    WinStreak { streak: usize, ceiling: usize },
    WinMultiplier { multiplier: f64, ceiling: f64 },
    ActionRate { actions: usize, window_ms: i64, ceiling: usize },
    FastActions { count: usize, min_interval_ms: i64 },
}

impl fmt::Display for IntegrityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityWarning::RtpOutOfBand { rtp, min, max, rounds } => write!(
                f,
                "RTP {:.1}% over {rounds} rounds is outside {:.0}%..{:.0}%",
                rtp * 100.0,
                min * 100.0,
                max * 100.0
            ),
            IntegrityWarning::WinStreak { streak, ceiling } => {
                write!(f, "{streak} consecutive wins (ceiling {ceiling})")
            }
            IntegrityWarning::WinMultiplier { multiplier, ceiling } => {
                write!(f, "Win multiplier of {multiplier:.1}x (ceiling {ceiling}x)")
            }
            IntegrityWarning::ActionRate { actions, window_ms, ceiling } => {
                write!(f, "{actions} actions within {window_ms}ms (ceiling {ceiling})")
            }
            IntegrityWarning::FastActions { count, min_interval_ms } => {
                write!(f, "{count} actions faster than {min_interval_ms}ms")
            }
        }
    }
}

/// Session totals computed alongside an audit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub rounds: usize,
    pub wins: usize,
    pub total_bet: f64,
    pub total_won: f64,
    pub rtp: f64,
    pub biggest_win: f64,
}

impl SessionSummary {
    pub fn from_rounds(rounds: &[GameRound]) -> Self {
        let total_bet: f64 = rounds.iter().map(|r| r.bet_amount).sum();
        let total_won: f64 = rounds.iter().map(|r| r.win_amount).sum();
        Self {
            rounds: rounds.len(),
            wins: rounds.iter().filter(|r| r.is_win()).count(),
            total_bet,
            total_won,
            rtp: if total_bet > 0.0 { total_won / total_bet } else { 0.0 },
            biggest_win: rounds.iter().map(|r| r.win_amount).fold(0.0, f64::max),
        }
    }

    pub fn net(&self) -> f64 {
        self.total_won - self.total_bet
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionIntegrityAuditor {
    pub thresholds: AuditThresholds,
}

impl SessionIntegrityAuditor {
    pub fn new(thresholds: AuditThresholds) -> Result<Self, ThresholdError> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // MEASUREMENTS
    // ═══════════════════════════════════════════════════════════════════════

    /// Total won over total wagered; zero when nothing was wagered
    pub fn rtp(rounds: &[GameRound]) -> f64 {
        SessionSummary::from_rounds(rounds).rtp
    }

    /// Longest run of strictly positive wins
    pub fn longest_win_streak(rounds: &[GameRound]) -> usize {
        let mut longest = 0;
        let mut current = 0;
        for round in rounds {
            if round.is_win() {
                current += 1;
                longest = longest.max(current);
            } else {
                current = 0;
            }
        }
        longest
    }

    pub fn max_win_multiplier(rounds: &[GameRound]) -> f64 {
        rounds.iter().map(GameRound::multiplier).fold(0.0, f64::max)
    }

    /// Largest number of actions falling in any trailing window of `window_ms`
    pub fn actions_in_trailing_window(timestamps: &[i64], window_ms: i64) -> usize {
        let mut sorted = timestamps.to_vec();
        sorted.sort_unstable();

        let mut start = 0;
        let mut busiest = 0;
        for end in 0..sorted.len() {
            while start < end && sorted[end].saturating_sub(sorted[start]) >= window_ms {
                start += 1;
            }
            busiest = busiest.max(end - start + 1);
        }
        busiest
    }

    /// Consecutive pairs closer than `min_interval_ms`, in recorded order.
    /// An out-of-order pair counts as fast.
    pub fn fast_actions(timestamps: &[i64], min_interval_ms: i64) -> usize {
        timestamps
            .windows(2)
            .filter(|pair| pair[1].saturating_sub(pair[0]) < min_interval_ms)
            .count()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // AUDIT
    // ═══════════════════════════════════════════════════════════════════════

    /// Run every check over a session window
    pub fn audit_session(&self, rounds: &[GameRound]) -> Vec<IntegrityWarning> {
        let t = &self.thresholds;
        let mut warnings = Vec::new();

        if rounds.len() >= t.min_rounds_for_rtp {
            let rtp = Self::rtp(rounds);
            let (min, max) = t.rtp_band;
            if rtp < min || rtp > max {
                warnings.push(IntegrityWarning::RtpOutOfBand {
                    rtp,
                    min,
                    max,
                    rounds: rounds.len(),
                });
            }
        }

        let streak = Self::longest_win_streak(rounds);
        if streak > t.max_consecutive_wins {
            warnings.push(IntegrityWarning::WinStreak {
                streak,
                ceiling: t.max_consecutive_wins,
            });
        }

        let multiplier = Self::max_win_multiplier(rounds);
        if multiplier > t.max_win_multiplier {
            warnings.push(IntegrityWarning::WinMultiplier {
                multiplier,
                ceiling: t.max_win_multiplier,
            });
        }

        let timestamps: Vec<i64> = rounds.iter().map(|r| r.timestamp_ms).collect();
        warnings.extend(self.action_warnings(&timestamps));

        log_warnings(&warnings);
        warnings
    }

    /// Action-rate checks over a raw action log
    pub fn audit_actions(&self, timestamps: &[i64]) -> Vec<IntegrityWarning> {
        let warnings = self.action_warnings(timestamps);
        log_warnings(&warnings);
        warnings
    }

    /// True when the session raises no warnings
    pub fn verify_session(&self, rounds: &[GameRound]) -> bool {
        self.audit_session(rounds).is_empty()
    }

    /// Would one more action at `now_ms` stay under the rate ceiling
    pub fn validate_action_rate(&self, timestamps: &[i64], now_ms: i64) -> bool {
        let window_start = now_ms.saturating_sub(self.thresholds.action_window_ms);
        let recent = timestamps.iter().filter(|&&t| t > window_start).count();
        recent < self.thresholds.max_actions_per_window
    }

    fn action_warnings(&self, timestamps: &[i64]) -> Vec<IntegrityWarning> {
        let t = &self.thresholds;
        let mut warnings = Vec::new();

        let actions = Self::actions_in_trailing_window(timestamps, t.action_window_ms);
        if actions > t.max_actions_per_window {
            warnings.push(IntegrityWarning::ActionRate {
                actions,
                window_ms: t.action_window_ms,
                ceiling: t.max_actions_per_window,
            });
        }

        let fast = Self::fast_actions(timestamps, t.min_action_interval_ms);
        if fast > 0 {
            warnings.push(IntegrityWarning::FastActions {
                count: fast,
                min_interval_ms: t.min_action_interval_ms,
            });
        }
        warnings
    }
}

fn log_warnings(warnings: &[IntegrityWarning]) {
    for warning in warnings {
        log::warn!("Integrity: {warning}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Rounds one second apart
    fn rounds(wins: &[f64]) -> Vec<GameRound> {
        wins.iter()
            .enumerate()
            .map(|(i, &win)| GameRound::new(1.0, win, i as i64 * 1_000))
            .collect()
    }

    #[test]
    fn test_rtp_two_is_flagged() {
        let history = rounds(&[2.0; 20]);
        let warnings = SessionIntegrityAuditor::default().audit_session(&history);
        assert!(warnings
            .iter()
            .any(|w| matches!(w, IntegrityWarning::RtpOutOfBand { rtp, .. } if *rtp == 2.0)));
    }

    #[test]
    fn test_rtp_in_band_passes() {
        // 19 wins of 1.0 plus one of 0.0 across 20 rounds: RTP 0.95
        let mut wins = vec![1.0; 19];
        wins.insert(10, 0.0);
        let history = rounds(&wins);
        assert!(SessionIntegrityAuditor::default().verify_session(&history));
    }

    #[test]
    fn test_short_session_skips_rtp() {
        let history = rounds(&[5.0; 5]);
        assert!(SessionIntegrityAuditor::default().audit_session(&history).is_empty());
    }

    #[test]
    fn test_win_streak() {
        let mut wins = vec![1.0; 16];
        wins.push(0.0);
        assert_eq!(SessionIntegrityAuditor::longest_win_streak(&rounds(&wins)), 16);

        let auditor = SessionIntegrityAuditor::new(AuditThresholds {
            min_rounds_for_rtp: usize::MAX,
            ..Default::default()
        })
        .unwrap();
        let warnings = auditor.audit_session(&rounds(&wins));
        assert_eq!(warnings, vec![IntegrityWarning::WinStreak { streak: 16, ceiling: 15 }]);
    }

    #[test]
    fn test_win_multiplier() {
        let history = rounds(&[0.0, 1500.0, 0.0]);
        assert_eq!(SessionIntegrityAuditor::max_win_multiplier(&history), 1500.0);
        let warnings = SessionIntegrityAuditor::default().audit_session(&history);
        assert!(matches!(warnings[0], IntegrityWarning::WinMultiplier { .. }));
    }

    #[test]
    fn test_trailing_window_count() {
        let timestamps: Vec<i64> = (0..61).map(|i| i * 500).collect();
        assert_eq!(SessionIntegrityAuditor::actions_in_trailing_window(&timestamps, 60_000), 61);

        let spread: Vec<i64> = (0..100).map(|i| i * 1_000).collect();
        assert_eq!(SessionIntegrityAuditor::actions_in_trailing_window(&spread, 60_000), 60);
        assert!(SessionIntegrityAuditor::default().audit_actions(&spread).is_empty());
    }

    #[test]
    fn test_action_rate_flagged() {
        let timestamps: Vec<i64> = (0..61).map(|i| i * 500).collect();
        let warnings = SessionIntegrityAuditor::default().audit_actions(&timestamps);
        assert_eq!(
            warnings,
            vec![IntegrityWarning::ActionRate { actions: 61, window_ms: 60_000, ceiling: 60 }]
        );
    }

    #[test]
    fn test_fast_actions() {
        let timestamps = [0, 50, 1_000, 1_099, 2_000, 1_500];
        assert_eq!(SessionIntegrityAuditor::fast_actions(&timestamps, 100), 3);
        let warnings = SessionIntegrityAuditor::default().audit_actions(&timestamps);
        assert_eq!(warnings, vec![IntegrityWarning::FastActions { count: 3, min_interval_ms: 100 }]);
    }

    #[test]
    fn test_validate_action_rate() {
        let auditor = SessionIntegrityAuditor::default();
        let now = 100_000;
        let busy: Vec<i64> = (0..60).map(|i| now - i * 100).collect();
        assert!(!auditor.validate_action_rate(&busy, now));

        let stale: Vec<i64> = (0..60).map(|i| now - 60_000 - i).collect();
        assert!(auditor.validate_action_rate(&stale, now));
    }

    #[test]
    fn test_summary() {
        let summary = SessionSummary::from_rounds(&rounds(&[0.0, 3.0, 1.0]));
        assert_eq!(summary.rounds, 3);
        assert_eq!(summary.wins, 2);
        assert_eq!(summary.total_won, 4.0);
        assert_eq!(summary.biggest_win, 3.0);
        assert_eq!(summary.net(), 1.0);
    }

    #[test]
    fn test_thresholds_partial_json() {
        let thresholds: AuditThresholds = serde_json::from_str(r#"{"max_consecutive_wins": 10}"#).unwrap();
        assert_eq!(thresholds.max_consecutive_wins, 10);
        assert_eq!(thresholds.rtp_band, (0.5, 1.5));
    }

    #[test]
    fn test_thresholds_rejected() {
        let zero_window = AuditThresholds { action_window_ms: 0, ..Default::default() };
        assert_eq!(
            SessionIntegrityAuditor::new(zero_window).unwrap_err(),
            ThresholdError::ActionWindow(0)
        );

        let negative_interval = AuditThresholds { min_action_interval_ms: -1, ..Default::default() };
        assert!(matches!(negative_interval.validate(), Err(ThresholdError::ActionInterval(-1))));

        let inverted = AuditThresholds { rtp_band: (1.5, 0.5), ..Default::default() };
        assert!(matches!(inverted.validate(), Err(ThresholdError::RtpBand { .. })));

        let nan_band = AuditThresholds { rtp_band: (f64::NAN, 1.0), ..Default::default() };
        assert!(nan_band.validate().is_err());
        assert!(AuditThresholds::default().validate().is_ok());
    }

    #[test]
    fn test_non_positive_window_counts_single_actions() {
        let timestamps = [1_000, 5_000, 5_000, 9_000];
        assert_eq!(SessionIntegrityAuditor::actions_in_trailing_window(&timestamps, 0), 1);
        assert_eq!(SessionIntegrityAuditor::actions_in_trailing_window(&timestamps, -10), 1);
        assert_eq!(SessionIntegrityAuditor::actions_in_trailing_window(&[], 0), 0);

        // Unvalidated thresholds set directly on the field still audit without panicking
        let auditor = SessionIntegrityAuditor {
            thresholds: AuditThresholds { action_window_ms: 0, ..Default::default() },
        };
        let history = [GameRound::new(1.0, 0.0, 1_000), GameRound::new(1.0, 0.0, 5_000)];
        assert!(auditor.audit_session(&history).is_empty());
    }

    #[test]
    fn test_extreme_timestamps_do_not_overflow() {
        let timestamps = [i64::MIN, 0, i64::MAX];
        assert_eq!(SessionIntegrityAuditor::actions_in_trailing_window(&timestamps, 60_000), 1);
        assert_eq!(SessionIntegrityAuditor::fast_actions(&[i64::MAX, i64::MIN], 100), 1);
        assert!(SessionIntegrityAuditor::default().validate_action_rate(&timestamps, i64::MIN));
    }

    #[test]
    fn test_round_classified_from_tiers() {
        let tiers = WinTierThresholds::default();
        let round = GameRound::new(1.0, 12.0, 0);
        assert_eq!(round.category, WinCategory::None);
        assert_eq!(round.with_category(&tiers).category, WinCategory::Medium);
        assert_eq!(GameRound::new(1.0, 0.0, 0).with_category(&tiers).category, WinCategory::None);
    }

    #[test]
    fn test_warning_message() {
        let warning = IntegrityWarning::WinStreak { streak: 16, ceiling: 15 };
        assert_eq!(warning.to_string(), "16 consecutive wins (ceiling 15)");
    }
}
