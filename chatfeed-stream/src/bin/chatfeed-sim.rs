//! chatfeed-sim: run a simulated broadcast chat feed headless.
//!
//! Prints every emitted chat event (JSON lines or plain text) on stdout and
//! a statistics summary on stderr.
//!
//! ```text
//! chatfeed-sim --seed 7 --mood hype --duration 120 --donation 30:2500 --format jsonl
//! ```

use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chatfeed_stream::{BroadcastEvent, BroadcastSession, FeedMood, SessionConfig};

/// Simulated live-chat feed
#[derive(Parser)]
#[command(name = "chatfeed-sim")]
#[command(about = "Run a simulated live-chat feed and print its events", long_about = None)]
#[command(version)]
struct Cli {
    /// Session configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed; omit for a different feed every run
    #[arg(short, long)]
    seed: Option<u64>,

    /// Simulated broadcast length in seconds
    #[arg(short, long, default_value_t = 60.0)]
    duration: f64,

    /// Frame time in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,

    /// Mood preset (quiet, standard, hype)
    #[arg(short, long)]
    mood: Option<FeedMood>,

    /// Rule profile file (TOML), overrides the mood
    #[arg(short, long)]
    profile: Option<PathBuf>,

    /// Content table file (TOML)
    #[arg(long)]
    content: Option<PathBuf>,

    /// Scripted donation as SECONDS:AMOUNT (repeatable)
    #[arg(long = "donation", value_parser = parse_donation)]
    donations: Vec<ScriptedDonation>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One human-readable line per event
    Text,
    /// One JSON object per event
    Jsonl,
}

#[derive(Debug, Clone, Copy)]
struct ScriptedDonation {
    at: f64,
    amount: u64,
}

fn parse_donation(s: &str) -> std::result::Result<ScriptedDonation, String> {
    let (at, amount) = s
        .split_once(':')
        .ok_or_else(|| format!("expected SECONDS:AMOUNT, got {s:?}"))?;
    let at: f64 = at.trim().parse().map_err(|e| format!("bad time {at:?}: {e}"))?;
    let amount: u64 = amount
        .trim()
        .parse()
        .map_err(|e| format!("bad amount {amount:?}: {e}"))?;
    if !at.is_finite() || at < 0.0 {
        return Err(format!("donation time must be a non-negative number, got {at}"));
    }
    Ok(ScriptedDonation { at, amount })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .init();

    let mut config = match &cli.config {
        Some(path) => SessionConfig::from_file(path)
            .with_context(|| format!("loading session config {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if let Some(mood) = cli.mood {
        config.mood = mood;
        config.profile = None;
        config.profile_path = None;
    }
    if let Some(path) = &cli.profile {
        config.profile = None;
        config.profile_path = Some(path.clone());
    }
    if let Some(path) = &cli.content {
        config.content_path = Some(path.clone());
    }

    anyhow::ensure!(cli.dt.is_finite() && cli.dt > 0.0, "--dt must be positive");
    anyhow::ensure!(
        cli.duration.is_finite() && cli.duration >= 0.0,
        "--duration must be non-negative"
    );

    let mut session = BroadcastSession::from_config(&config).context("starting session")?;

    let mut donations = cli.donations.clone();
    donations.sort_by(|a, b| a.at.total_cmp(&b.at));
    let mut pending = donations.into_iter().peekable();

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut events = Vec::new();

    while session.now() < cli.duration {
        while let Some(donation) = pending.next_if(|d| d.at <= session.now()) {
            session.notify(&BroadcastEvent::DonationReceived {
                donor: "scripted".to_string(),
                amount: donation.amount,
            });
        }

        events.clear();
        session.tick_into(cli.dt, &mut events);
        for event in &events {
            match cli.format {
                OutputFormat::Text => writeln!(out, "{event}")?,
                OutputFormat::Jsonl => {
                    serde_json::to_writer(&mut out, event).context("encoding event")?;
                    writeln!(out)?;
                }
            }
        }
    }
    out.flush()?;

    let stats = session.stats();
    eprintln!("--- chatfeed-sim summary ---");
    eprintln!("simulated:        {:.1}s", session.now());
    eprintln!("ticks:            {}", stats.ticks);
    eprintln!("decision points:  {}", stats.decision_points);
    eprintln!("emitted:          {}", stats.emitted);
    for (kind, name) in session.profile().kinds.iter() {
        let count = stats.emitted_by_kind.get(kind.index()).copied().unwrap_or(0);
        eprintln!("  {name:<14}  {count}");
    }
    eprintln!("sampler misses:   {}", stats.sampler_misses);
    eprintln!("silent decisions: {}", stats.silent_decisions);
    eprintln!(
        "bursts:           {} started, {} completed",
        stats.bursts_started, stats.bursts_completed
    );
    eprintln!("ceiling hits:     {}", stats.ceiling_hits);
    eprintln!("signals pushed:   {}", stats.signals_pushed);
    eprintln!("emit ratio:       {:.2}", stats.emit_ratio());

    Ok(())
}
