//! Seeded random source, an entropy-seeded LCG stream
//!
//! The seed comes from the OS entropy source so outcomes cannot be computed
//! ahead of time. Every draw after that is a 32-bit linear congruential step,
//! so a recorded seed replays the exact same stream.

use std::fmt::Display;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::{Mutex, MutexGuard};
use rand::TryRngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

const LCG_MULTIPLIER: u32 = 1_664_525;
const LCG_INCREMENT: u32 = 1_013_904_223;
/// 2^32, maps a 32-bit state onto [0, 1)
const STATE_SPAN: f64 = 4_294_967_296.0;

/// Where the current seed came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntropySource {
    /// OS cryptographic entropy
    Os,
    /// System clock fallback (degraded, must be surfaced)
    Fallback,
    /// Caller-supplied seed (replay / testing)
    Fixed,
}

impl EntropySource {
    /// Degraded streams are predictable and must be flagged in audit records
    pub fn is_degraded(self) -> bool {
        matches!(self, EntropySource::Fallback)
    }
}

/// Seed plus its provenance, stored by the collaborator for audit replay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedRecord {
    pub seed: u32,
    pub entropy: EntropySource,
}

/// Uniform random stream consumed by the engine.
///
/// Only `next_f64` and `reset_seed` are required; the derived draws are
/// defined on top of it so every implementation maps the stream to outcomes
/// identically.
pub trait RandomSource {
    /// Next value in [0, 1)
    fn next_f64(&mut self) -> f64;

    /// Start a fresh unpredictable stream
    fn reset_seed(&mut self);

    /// True when the stream was seeded without OS entropy
    fn is_degraded(&self) -> bool {
        false
    }

    /// Integer in [min, max] inclusive. Returns `min` when `max <= min`.
    fn next_int(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        let offset = (self.next_f64() * span as f64).floor() as i64;
        min + offset.clamp(0, span - 1)
    }

    /// Uniformly chosen element, `None` for an empty slice
    fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.next_int(0, items.len() as i64 - 1) as usize;
        items.get(index)
    }

    /// Cumulative-weight scan: draw `r = next * total`, subtract weights until
    /// `r <= 0`. The last positive-weight item absorbs floating-point leftovers.
    fn weighted_pick<'a, T>(&mut self, items: &'a [(T, f64)]) -> Option<&'a T> {
        let total: f64 = items
            .iter()
            .map(|(_, weight)| weight.max(0.0))
            .sum();
        if !total.is_finite() || total <= 0.0 {
            return None;
        }

        let mut remaining = self.next_f64() * total;
        for (item, weight) in items {
            if *weight <= 0.0 {
                continue;
            }
            remaining -= weight;
            if remaining <= 0.0 {
                return Some(item);
            }
        }

        items
            .iter()
            .rev()
            .find(|(_, weight)| *weight > 0.0)
            .map(|(item, _)| item)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SECURE RANDOM SOURCE
// ═══════════════════════════════════════════════════════════════════════════

/// Entropy-seeded LCG stream. One instance per session; not shared by default.
#[derive(Debug, Clone)]
pub struct SecureRandomSource {
    state: u32,
    seed: SeedRecord,
}

impl SecureRandomSource {
    /// Seed from OS entropy, falling back to the system clock
    pub fn new() -> Self {
        Self::from_record(seed_from(OsRng.try_next_u32()))
    }

    /// Fixed-seed stream for replay and tests
    pub fn from_seed(seed: u32) -> Self {
        Self::from_record(SeedRecord {
            seed,
            entropy: EntropySource::Fixed,
        })
    }

    /// Rebuild a stream from a persisted seed record
    pub fn from_record(seed: SeedRecord) -> Self {
        Self {
            state: seed.seed,
            seed,
        }
    }

    /// Seed the current stream started from
    pub fn seed_record(&self) -> SeedRecord {
        self.seed
    }

    pub fn entropy(&self) -> EntropySource {
        self.seed.entropy
    }

    /// Advance the LCG one step
    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        self.state
    }
}

impl Default for SecureRandomSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for SecureRandomSource {
    fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / STATE_SPAN
    }

    fn reset_seed(&mut self) {
        *self = Self::new();
    }

    fn is_degraded(&self) -> bool {
        self.seed.entropy.is_degraded()
    }
}

fn seed_from<E: Display>(draw: Result<u32, E>) -> SeedRecord {
    match draw {
        Ok(seed) => SeedRecord {
            seed,
            entropy: EntropySource::Os,
        },
        Err(err) => {
            log::warn!("OS entropy unavailable ({err}), seeding from system clock; stream is DEGRADED");
            SeedRecord {
                seed: clock_seed(),
                entropy: EntropySource::Fallback,
            }
        }
    }
}

fn clock_seed() -> u32 {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    (elapsed.as_secs() as u32) ^ elapsed.subsec_nanos().rotate_left(16) ^ std::process::id()
}

// ═══════════════════════════════════════════════════════════════════════════
// SHARED SOURCE
// ═══════════════════════════════════════════════════════════════════════════

/// A source shared between threads. Every draw takes the lock, so two
/// concurrent draws never advance the state non-atomically. Hold `lock()` for
/// a whole spin to keep that spin's draws contiguous.
#[derive(Debug, Clone, Default)]
pub struct SharedRandomSource {
    inner: Arc<Mutex<SecureRandomSource>>,
}

impl SharedRandomSource {
    pub fn new(source: SecureRandomSource) -> Self {
        Self {
            inner: Arc::new(Mutex::new(source)),
        }
    }

    /// Exclusive access for a sequence of draws
    pub fn lock(&self) -> MutexGuard<'_, SecureRandomSource> {
        self.inner.lock()
    }

    pub fn seed_record(&self) -> SeedRecord {
        self.inner.lock().seed_record()
    }
}

impl RandomSource for SharedRandomSource {
    fn next_f64(&mut self) -> f64 {
        self.inner.lock().next_f64()
    }

    fn reset_seed(&mut self) {
        self.inner.lock().reset_seed();
    }

    fn is_degraded(&self) -> bool {
        self.inner.lock().is_degraded()
    }
}
