//! Monte Carlo simulation of a game mode
//!
//! Measures RTP, hit rate and category distribution against the configured
//! target. Parallel runs derive one fixed seed per session from a master seed,
//! so a report is reproducible regardless of thread scheduling.

use std::collections::BTreeMap;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::SpinEngine;
use crate::random::{RandomSource, SecureRandomSource};
use crate::spin::{SpinResult, WinCategory};

/// Aggregated outcome statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub spins: u64,
    pub wagered: f64,
    pub won: f64,
    pub wins: u64,
    pub bonuses: u64,
    /// Spin count per win category
    pub categories: BTreeMap<WinCategory, u64>,
    pub max_win_ratio: f64,
}

impl SessionStats {
    pub fn record(&mut self, result: &SpinResult) {
        self.spins += 1;
        self.wagered += result.bet;
        self.won += result.total_win;
        if result.is_win() {
            self.wins += 1;
        }
        if result.bonus.is_some() {
            self.bonuses += 1;
        }
        *self.categories.entry(result.category).or_default() += 1;
        self.max_win_ratio = self.max_win_ratio.max(result.win_ratio);
    }

    /// Fold another session's totals into this one
    pub fn merge(&mut self, other: &SessionStats) {
        self.spins += other.spins;
        self.wagered += other.wagered;
        self.won += other.won;
        self.wins += other.wins;
        self.bonuses += other.bonuses;
        for (category, count) in &other.categories {
            *self.categories.entry(*category).or_default() += count;
        }
        self.max_win_ratio = self.max_win_ratio.max(other.max_win_ratio);
    }

    /// Won / wagered as a fraction (0.96 = 96%)
    pub fn rtp(&self) -> f64 {
        if self.wagered > 0.0 {
            self.won / self.wagered
        } else {
            0.0
        }
    }

    /// Fraction of spins with a positive win
    pub fn hit_rate(&self) -> f64 {
        if self.spins > 0 {
            self.wins as f64 / self.spins as f64
        } else {
            0.0
        }
    }

    pub fn category_count(&self, category: WinCategory) -> u64 {
        self.categories.get(&category).copied().unwrap_or(0)
    }
}

/// Simulation outcome for one configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub config_id: String,
    pub sessions: usize,
    pub bet: f64,
    pub target_rtp: f64,
    pub measured_rtp: f64,
    pub hit_rate: f64,
    pub stats: SessionStats,
}

impl SimulationReport {
    fn new(engine: &SpinEngine, sessions: usize, bet: f64, stats: SessionStats) -> Self {
        let config = engine.config();
        let report = Self {
            config_id: config.id.clone(),
            sessions,
            bet,
            target_rtp: config.target_rtp,
            measured_rtp: stats.rtp(),
            hit_rate: stats.hit_rate(),
            stats,
        };
        log::info!(
            "Simulated '{}': {} spins over {} session(s), RTP {:.2}% (target {:.2}%), hit rate {:.2}%",
            report.config_id,
            report.stats.spins,
            report.sessions,
            report.measured_rtp * 100.0,
            report.target_rtp * 100.0,
            report.hit_rate * 100.0
        );
        report
    }

    /// Measured minus target RTP
    pub fn rtp_deviation(&self) -> f64 {
        self.measured_rtp - self.target_rtp
    }
}

pub struct Simulator;

impl Simulator {
    /// Spin `spins` times on one stream
    pub fn run<R: RandomSource>(engine: &SpinEngine, rng: &mut R, bet: f64, spins: u64) -> SimulationReport {
        let stats = Self::run_stats(engine, rng, bet, spins);
        SimulationReport::new(engine, 1, bet, stats)
    }

    /// Independent sessions in parallel, each on its own fixed seed derived
    /// from `master_seed`
    pub fn run_sessions(
        engine: &SpinEngine,
        master_seed: u64,
        sessions: usize,
        spins: u64,
        bet: f64,
    ) -> SimulationReport {
        let seeds = session_seeds(master_seed, sessions);
        let per_session: Vec<SessionStats> = seeds
            .par_iter()
            .map(|&seed| {
                let mut rng = SecureRandomSource::from_seed(seed);
                Self::run_stats(engine, &mut rng, bet, spins)
            })
            .collect();

        let mut stats = SessionStats::default();
        for session in &per_session {
            stats.merge(session);
        }
        SimulationReport::new(engine, sessions, bet, stats)
    }

    fn run_stats<R: RandomSource>(engine: &SpinEngine, rng: &mut R, bet: f64, spins: u64) -> SessionStats {
        let mut stats = SessionStats::default();
        for _ in 0..spins {
            stats.record(&engine.spin(rng, bet));
        }
        stats
    }
}

/// Per-session LCG seeds drawn from a ChaCha8 stream
pub fn session_seeds(master_seed: u64, sessions: usize) -> Vec<u32> {
    let mut master = ChaCha8Rng::seed_from_u64(master_seed);
    (0..sessions).map(|_| master.next_u32()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SlotConfiguration;

    fn engine() -> SpinEngine {
        SpinEngine::new(SlotConfiguration::classic_777()).unwrap()
    }

    #[test]
    fn test_stats_accounting() {
        let engine = engine();
        let mut rng = SecureRandomSource::from_seed(17);
        let report = Simulator::run(&engine, &mut rng, 2.0, 500);
        let stats = &report.stats;
        assert_eq!(stats.spins, 500);
        assert_eq!(stats.wagered, 1_000.0);
        assert_eq!(stats.categories.values().sum::<u64>(), 500);
        assert_eq!(stats.spins - stats.category_count(WinCategory::None), stats.wins);
        assert!(report.hit_rate > 0.0 && report.hit_rate < 1.0);
    }

    #[test]
    fn test_sessions_are_deterministic() {
        let engine = engine();
        let a = Simulator::run_sessions(&engine, 99, 4, 200, 1.0);
        let b = Simulator::run_sessions(&engine, 99, 4, 200, 1.0);
        assert_eq!(a, b);
        assert_eq!(a.stats.spins, 800);
    }

    #[test]
    fn test_session_seeds_differ() {
        let seeds = session_seeds(1, 8);
        assert_eq!(seeds, session_seeds(1, 8));
        assert_ne!(seeds, session_seeds(2, 8));
        let mut unique = seeds.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), 8);
    }

    #[test]
    fn test_merge_adds_up() {
        let engine = engine();
        let mut rng = SecureRandomSource::from_seed(3);
        let first = Simulator::run(&engine, &mut rng, 1.0, 100).stats;
        let second = Simulator::run(&engine, &mut rng, 1.0, 100).stats;
        let mut merged = first.clone();
        merged.merge(&second);
        assert_eq!(merged.spins, 200);
        assert_eq!(merged.wins, first.wins + second.wins);
        assert_eq!(merged.max_win_ratio, first.max_win_ratio.max(second.max_win_ratio));
    }

    #[test]
    fn test_empty_stats() {
        let stats = SessionStats::default();
        assert_eq!(stats.rtp(), 0.0);
        assert_eq!(stats.hit_rate(), 0.0);
    }
}
