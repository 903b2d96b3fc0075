//! # casino-core: Slot Outcome Engine for the virtual-currency casino
//!
//! Produces statistically-governed, reproducible slot outcomes and guards the
//! recorded session history against tampering and RTP drift.
//!
//! ## Features
//!
//! - **Seeded Randomness**: entropy-seeded LCG stream, replayable from a fixed seed
//! - **Weighted Reels**: symbol frequencies expanded and shuffled per physical reel
//! - **Payline Evaluation**: left-to-right runs with wild substitution on any pattern shape
//! - **Scatters & Bonuses**: grid-wide scatter pays, first-match bonus triggering
//! - **Bet Gating**: min/max, funds and bankroll-fraction checks before a spin
//! - **Integrity Audit**: RTP band, win streak, win multiplier and action-rate checks
//!
//! ## Architecture
//!
//! ```text
//! BetValidator ──gates──> SpinEngine <── SlotConfiguration (read-only)
//!                            │
//!                            ├── SecureRandomSource (injected per session)
//!                            ├── WeightedReelBuilder → VirtualReel × reels
//!                            ├── PaylineEvaluator / ScatterEvaluator
//!                            └── BonusTrigger
//!                                  │
//!                                  v
//!                            SpinResult → GameRound (collaborator-owned)
//!                                              │
//!                                              v
//!                                 SessionIntegrityAuditor → Vec<IntegrityWarning>
//! ```

pub mod audit;
pub mod bonus;
pub mod config;
pub mod engine;
pub mod paytable;
pub mod random;
pub mod reels;
pub mod scatter;
pub mod simulation;
pub mod spin;
pub mod symbols;
pub mod validation;

pub use audit::*;
pub use bonus::*;
pub use config::*;
pub use engine::*;
pub use paytable::*;
pub use random::*;
pub use reels::*;
pub use scatter::*;
pub use simulation::*;
pub use spin::*;
pub use symbols::*;
pub use validation::*;
