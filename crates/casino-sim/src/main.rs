//! Casino Slot Simulator
//!
//! Usage:
//!   casino-sim simulate --config classic --spins 100000   - Measure RTP and hit rate
//!   casino-sim check --config game.yaml                    - Validate a configuration
//!   casino-sim audit --rounds history.json                 - Audit a recorded session
//!   casino-sim replay --config classic --seed 42           - Replay a spin from its seed
//!
//! Logging follows `RUST_LOG` (e.g. `RUST_LOG=casino_core=debug`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use casino_core::{
    AuditThresholds, EntropySource, GameRound, SecureRandomSource, SeedRecord,
    SessionIntegrityAuditor, SessionSummary, Simulator, SlotConfiguration, SpinEngine,
    WinCategory,
};

#[derive(Parser)]
#[command(name = "casino-sim", about = "Slot outcome engine simulator and auditor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a Monte Carlo simulation
    Simulate {
        /// Config file (.json/.yaml) or preset: classic, five-reel
        #[arg(short, long, default_value = "classic")]
        config: String,
        /// Spins per session
        #[arg(short, long, default_value_t = 100_000)]
        spins: u64,
        /// Bet per spin
        #[arg(short, long, default_value_t = 1.0)]
        bet: f64,
        /// Master seed; drawn from OS entropy when omitted
        #[arg(long)]
        seed: Option<u64>,
        /// Independent sessions, run in parallel
        #[arg(long, default_value_t = 1)]
        sessions: usize,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate a configuration
    Check {
        /// Config file (.json/.yaml) or preset: classic, five-reel
        #[arg(short, long)]
        config: String,
    },
    /// Audit a recorded round history
    Audit {
        /// JSON array of rounds
        #[arg(short, long)]
        rounds: PathBuf,
        /// JSON audit thresholds; missing fields use defaults
        #[arg(short, long)]
        thresholds: Option<PathBuf>,
        /// Exit with an error when any warning is raised
        #[arg(long)]
        strict: bool,
    },
    /// Replay the first spin of a seeded stream
    Replay {
        /// Config file (.json/.yaml) or preset: classic, five-reel
        #[arg(short, long, default_value = "classic")]
        config: String,
        /// Recorded seed
        #[arg(short, long)]
        seed: u32,
        /// Bet of the recorded spin
        #[arg(short, long, default_value_t = 1.0)]
        bet: f64,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            config,
            spins,
            bet,
            seed,
            sessions,
            json,
        } => simulate(&config, spins, bet, seed, sessions, json),
        Commands::Check { config } => check(&config),
        Commands::Audit {
            rounds,
            thresholds,
            strict,
        } => audit(&rounds, thresholds.as_deref(), strict),
        Commands::Replay {
            config,
            seed,
            bet,
            json,
        } => replay(&config, seed, bet, json),
    }
}

/// Resolve a preset name or load a file
fn load_config(source: &str) -> Result<SlotConfiguration> {
    match source {
        "classic" | "classic_777" => Ok(SlotConfiguration::classic_777()),
        "five-reel" | "five_reel_standard" => Ok(SlotConfiguration::five_reel_standard()),
        path => SlotConfiguration::load(path)
            .with_context(|| format!("Failed to load configuration {path}")),
    }
}

fn build_engine(source: &str) -> Result<SpinEngine> {
    let config = load_config(source)?;
    SpinEngine::new(config).with_context(|| format!("Invalid configuration {source}"))
}

fn simulate(
    source: &str,
    spins: u64,
    bet: f64,
    seed: Option<u64>,
    sessions: usize,
    json: bool,
) -> Result<()> {
    if sessions == 0 {
        bail!("--sessions must be at least 1");
    }
    let engine = build_engine(source)?;
    let config = engine.config();
    if bet < config.min_bet || bet > config.max_bet {
        bail!("Bet {bet} outside {}..{} for '{}'", config.min_bet, config.max_bet, config.id);
    }

    let master_seed = match seed {
        Some(seed) => seed,
        None => {
            let mut rng = SecureRandomSource::new();
            if rng.entropy().is_degraded() {
                log::warn!("Master seed drawn from a degraded entropy source");
            }
            u64::from(rng.next_u32())
        }
    };

    let report = Simulator::run_sessions(&engine, master_seed, sessions, spins, bet);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("🎰 {} ({})", config.name, report.config_id);
    println!("   seed:        {master_seed}");
    println!("   spins:       {} x {} session(s)", spins, report.sessions);
    println!("   wagered:     {:.2}", report.stats.wagered);
    println!("   won:         {:.2}", report.stats.won);
    println!(
        "   RTP:         {:.2}% (target {:.2}%, {:+.2})",
        report.measured_rtp * 100.0,
        report.target_rtp * 100.0,
        report.rtp_deviation() * 100.0
    );
    println!("   hit rate:    {:.2}%", report.hit_rate * 100.0);
    println!("   bonuses:     {}", report.stats.bonuses);
    println!("   max win:     {:.1}x", report.stats.max_win_ratio);
    for category in WinCategory::ALL {
        println!(
            "   {:<12} {}",
            format!("{}:", category.as_str()),
            report.stats.category_count(category)
        );
    }
    Ok(())
}

fn check(source: &str) -> Result<()> {
    let config = load_config(source)?;
    config
        .validate()
        .with_context(|| format!("Configuration {source} is invalid"))?;

    println!("✅ {} ({})", config.name, config.id);
    println!("   grid:        {}x{}", config.reels, config.rows);
    println!("   paylines:    {}", config.paylines.len());
    println!("   symbols:     {} (reel length {})", config.symbols.len(), config.reel_length());
    println!("   bonuses:     {}", config.bonus_features.len());
    println!("   bet range:   {}..{}", config.min_bet, config.max_bet);
    println!("   target RTP:  {:.2}%", config.target_rtp * 100.0);
    Ok(())
}

fn audit(rounds_path: &Path, thresholds_path: Option<&Path>, strict: bool) -> Result<()> {
    let text = fs::read_to_string(rounds_path)
        .with_context(|| format!("Failed to read {}", rounds_path.display()))?;
    let rounds: Vec<GameRound> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse rounds from {}", rounds_path.display()))?;

    let thresholds = match thresholds_path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse thresholds from {}", path.display()))?
        }
        None => AuditThresholds::default(),
    };

    let auditor = SessionIntegrityAuditor::new(thresholds).context("Invalid audit thresholds")?;
    let warnings = auditor.audit_session(&rounds);
    let summary = SessionSummary::from_rounds(&rounds);

    println!("🔍 {} rounds, {} wins", summary.rounds, summary.wins);
    println!("   wagered:     {:.2}", summary.total_bet);
    println!("   won:         {:.2}", summary.total_won);
    println!("   RTP:         {:.2}%", summary.rtp * 100.0);
    println!("   biggest win: {:.2}", summary.biggest_win);

    if warnings.is_empty() {
        println!("✅ No integrity warnings");
        return Ok(());
    }

    println!("⚠️  {} warning(s):", warnings.len());
    for warning in &warnings {
        println!("   - {warning}");
    }
    if strict {
        bail!("Session failed integrity audit");
    }
    Ok(())
}

fn replay(source: &str, seed: u32, bet: f64, json: bool) -> Result<()> {
    let engine = build_engine(source)?;
    let result = engine.replay(
        SeedRecord {
            seed,
            entropy: EntropySource::Fixed,
        },
        bet,
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("🔁 Replay seed {seed} on '{}'", engine.config().id);
    println!("   stops:       {:?}", result.reel_positions);
    for row in 0..engine.config().rows {
        let cells: Vec<&str> = result
            .grid
            .iter()
            .map(|column| column[row].id.as_str())
            .collect();
        println!("   {}", cells.join(" | "));
    }
    for win in &result.line_wins {
        println!(
            "   line {:>2}: {} x{} pays {:.2}",
            win.payline_id, win.symbol_id, win.count, win.win
        );
    }
    for win in &result.scatter_wins {
        println!("   scatter: {} x{} pays {:.2}", win.symbol_id, win.count, win.win);
    }
    if let Some(bonus) = &result.bonus {
        println!("   bonus:   {}", bonus.name);
    }
    println!(
        "   total:   {:.2} ({}), next state {:?}",
        result.total_win,
        result.category.as_str(),
        result.next_state
    );
    Ok(())
}
