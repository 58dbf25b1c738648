//! Queuesim - Service Center Simulator CLI
//!
//! Thin boundary around the simulation library:
//! - Obtains the eight configuration integers (stdin or a JSON file)
//! - Renders events as text or JSON lines on stdout
//! - Optionally paces ticks in real time for demonstrations
//!
//! # Usage
//!
//! ```bash
//! # seed multiplier increment modulus clients servers arrivals/min service/min
//! echo "1 3 5 13 2 1 4 10" | queuesim run
//!
//! # Watch it unfold, one tick every 200ms
//! queuesim run --config bank.json --tick-delay-ms 200 --summary
//!
//! # Just validate
//! queuesim check --config bank.json
//!
//! # Inspect the generator
//! queuesim sequence --seed 3 --multiplier 7 --increment 7 --modulus 11 --count 5
//! ```

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use queuesim::{
    OutputFormat, RunSummary, SequenceGenerator, SimConfig, SimulationEngine,
    SEQUENCE_BATCH_COUNT_MAX, TICK_DELAY_MS_DEFAULT, TICK_DELAY_MS_MAX,
};
use std::io::{Read, Write};
use std::time::Duration;

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Application name
pub const APP_NAME: &str = "queuesim";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Values printed by `sequence` when --count is omitted
pub const SEQUENCE_COUNT_DEFAULT: usize = 10;

// =============================================================================
// CLI
// =============================================================================

/// Single-queue, multi-server service center simulator
#[derive(Parser, Debug)]
#[command(name = APP_NAME)]
#[command(about = "Deterministic single-queue, multi-server service center simulator")]
#[command(version)]
struct Cli {
    /// Enable verbose logging (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a simulation and print its event trace
    Run {
        #[command(flatten)]
        source: ConfigSource,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Real-time delay after each tick, for demonstrations
        #[arg(long, default_value_t = TICK_DELAY_MS_DEFAULT)]
        tick_delay_ms: u64,

        /// Print aggregate statistics after the trace
        #[arg(long)]
        summary: bool,
    },
    /// Validate a configuration without running it
    Check {
        #[command(flatten)]
        source: ConfigSource,
    },
    /// Print values from the sequence generator
    Sequence {
        /// Initial value
        #[arg(long, allow_negative_numbers = true)]
        seed: i64,
        /// Recurrence multiplier
        #[arg(long, allow_negative_numbers = true)]
        multiplier: i64,
        /// Recurrence increment
        #[arg(long, allow_negative_numbers = true)]
        increment: i64,
        /// Recurrence modulus
        #[arg(long, allow_negative_numbers = true)]
        modulus: i64,
        /// How many values to print, starting with the seed
        #[arg(long, default_value_t = SEQUENCE_COUNT_DEFAULT)]
        count: usize,
    },
}

#[derive(Args, Debug)]
struct ConfigSource {
    /// JSON configuration file (reads eight integers from stdin if omitted)
    #[arg(short, long)]
    config: Option<String>,
}

impl ConfigSource {
    fn load(&self) -> anyhow::Result<SimConfig> {
        match &self.config {
            Some(path) => Ok(SimConfig::from_json_file(path)?),
            None => {
                let mut input = String::new();
                std::io::stdin()
                    .read_to_string(&mut input)
                    .context("failed to read configuration from stdin")?;
                Ok(SimConfig::parse_whitespace(&input)?)
            }
        }
    }
}

// =============================================================================
// Commands
// =============================================================================

/// Run to completion, writing rendered events to `out`.
async fn run_simulation<W: Write>(
    config: &SimConfig,
    format: OutputFormat,
    tick_delay_ms: u64,
    summary: bool,
    out: &mut W,
) -> anyhow::Result<()> {
    anyhow::ensure!(
        tick_delay_ms <= TICK_DELAY_MS_MAX,
        "tick delay {tick_delay_ms}ms exceeds max ({TICK_DELAY_MS_MAX}ms)"
    );

    let mut engine = SimulationEngine::new(config)?;
    let renderer = format.renderer();
    let delay = Duration::from_millis(tick_delay_ms);
    let mut trace = Vec::new();

    while !engine.is_finished() {
        let events = engine.step();
        for event in &events {
            writeln!(out, "{}", renderer.render(event))?;
        }
        if summary {
            trace.extend(events);
        }

        if !delay.is_zero() {
            out.flush()?;
            tokio::time::sleep(delay).await;
        }
    }

    if summary {
        let stats = RunSummary::from_events(&trace, engine.servers().len())?;
        match format {
            OutputFormat::Text => write!(out, "{stats}")?,
            OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(&stats)?)?,
        }
    }

    out.flush()?;
    Ok(())
}

fn check_configuration<W: Write>(config: &SimConfig, out: &mut W) -> anyhow::Result<()> {
    let engine = SimulationEngine::new(config)?;

    writeln!(
        out,
        "OK: {} clients, {} servers, arrival gap ~{}s, service duration ~{}s",
        engine.clients_total(),
        engine.servers().len(),
        engine.arrival_gap_base_secs(),
        engine.service_duration_base_secs()
    )?;
    Ok(())
}

fn print_sequence<W: Write>(
    (seed, multiplier, increment, modulus): (i64, i64, i64, i64),
    count: usize,
    out: &mut W,
) -> anyhow::Result<()> {
    anyhow::ensure!(
        count <= SEQUENCE_BATCH_COUNT_MAX,
        "count {count} exceeds max ({SEQUENCE_BATCH_COUNT_MAX})"
    );

    let mut generator = SequenceGenerator::new(seed, multiplier, increment, modulus)?;
    for value in generator.generate_batch(count) {
        writeln!(out, "{value}")?;
    }
    Ok(())
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging (stderr, so traces on stdout stay clean)
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("{} v{}", APP_NAME, APP_VERSION);

    let mut stdout = std::io::stdout();

    match cli.command {
        Commands::Run {
            source,
            format,
            tick_delay_ms,
            summary,
        } => {
            let config = source.load()?;
            run_simulation(&config, format, tick_delay_ms, summary, &mut stdout).await?;
        }
        Commands::Check { source } => {
            let config = source.load()?;
            check_configuration(&config, &mut stdout)?;
        }
        Commands::Sequence {
            seed,
            multiplier,
            increment,
            modulus,
            count,
        } => {
            print_sequence((seed, multiplier, increment, modulus), count, &mut stdout)?;
        }
    }

    Ok(())
}
