//! # sr - seenring command line
//!
//! - `sr demo` - Walk a ring through insert / contains / most-recent / oldest / reset.
//! - `sr emit [WORDS...]` - Publish one payload on the configured bus.
//! - `sr consume` - Print fresh payloads from the configured bus, skipping duplicates.
//! - `sr relay [PAYLOADS...]` - Producers and a consumer in one process.
//! - `sr status` - Effective configuration as JSON.
//! - `sr verify` - Run Kani proofs.

use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sr_core::Mode;
use sr_relay::bus::{self, BusKind};
use sr_relay::config::{RelayConfig, DEFAULT_CONFIG_FILE};
use sr_relay::consumer::Consumer;
use sr_relay::identity;
use sr_relay::producer::Producer;
use sr_ring::RingBuffer;

/// How long `sr relay` waits for published payloads to come back.
const RELAY_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// seenring - bounded seen-before history for deduplicating messages.
#[derive(Parser)]
#[command(name = "sr", version, about, long_about = None)]
struct Cli {
    /// Path to the config file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Override `ring.capacity`.
    #[arg(long, global = true, allow_negative_numbers = true)]
    capacity: Option<i64>,

    /// Override `ring.mode` (recent | oldest).
    #[arg(long, global = true)]
    mode: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk a 100-slot ring through every operation.
    Demo,

    /// Publish the joined words (default "hello") on the configured bus.
    Emit { words: Vec<String> },

    /// Print fresh payloads from the configured bus, skipping duplicates.
    Consume {
        /// Stop after this many payloads.
        #[arg(long)]
        limit: Option<u64>,
    },

    /// Run producers and a deduplicating consumer over one bus.
    Relay {
        /// Payloads every producer emits, in order.
        payloads: Vec<String>,

        /// Number of independent producers.
        #[arg(long, default_value_t = 2)]
        producers: usize,
    },

    /// Report the effective configuration as JSON.
    Status,

    /// Run Kani formal verification proofs.
    Verify,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "sr=info,sr_relay=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = RelayConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(capacity) = cli.capacity {
        config.ring.capacity = capacity;
    }
    if let Some(mode) = cli.mode {
        config.ring.mode = mode;
    }

    match cli.command {
        Commands::Demo => demo(),
        Commands::Status => status(&config, &cli.config),
        Commands::Verify => verify(),
        Commands::Emit { words } => runtime(&config)?.block_on(emit(&config, words)),
        Commands::Consume { limit } => runtime(&config)?.block_on(consume(&config, limit)),
        Commands::Relay {
            payloads,
            producers,
        } => runtime(&config)?.block_on(relay(&config, payloads, producers)),
    }
}

/// Runtime for the bus commands. A bad ring fails here, before any
/// connection is attempted.
fn runtime(config: &RelayConfig) -> Result<tokio::runtime::Runtime> {
    config.ring.build().context("invalid [ring] settings")?;
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")
}

fn lossy(bytes: Option<Vec<u8>>) -> String {
    match bytes {
        Some(b) => String::from_utf8_lossy(&b).into_owned(),
        None => "<empty>".to_string(),
    }
}

fn demo() -> Result<()> {
    let ring = RingBuffer::new(100, Mode::ScanFromRecent)?;
    let data = b"hello";

    println!("hello in ring :: {}", ring.contains(data));

    ring.insert(b"Lorem Ipsum is simply dummy text of the printing and typesetting industry.");
    ring.insert(data);
    println!("hello in ring :: {}", ring.contains(data));

    ring.insert(b"hello2");
    ring.insert(b"hello3");
    println!("most recent :: {}", lossy(ring.most_recent()));
    println!("oldest :: {}", lossy(ring.oldest()));
    println!("held :: {} of {}", ring.len(), ring.capacity());

    ring.reset();
    println!("hello in ring :: {}", ring.contains(data));
    println!("most recent :: {}", lossy(ring.most_recent()));
    Ok(())
}

fn status(config: &RelayConfig, config_path: &std::path::Path) -> Result<()> {
    let ring = config.ring.build().context("invalid [ring] settings")?;
    let node = identity::node_name(config.producer.node.as_deref());
    let pid = std::process::id();

    let status = serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "config_file": config_path.display().to_string(),
        "config_file_found": config_path.exists(),
        "identity": identity::identity(&node, pid),
        "node": node,
        "pid": pid,
        "ring": {
            "capacity": ring.capacity(),
            "mode": ring.mode().name(),
            "mode_tag": ring.mode().tag(),
        },
        "bus": config.bus,
        "nats_compiled": cfg!(feature = "nats"),
    });

    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

async fn emit(config: &RelayConfig, words: Vec<String>) -> Result<()> {
    let body = if words.is_empty() || words[0].is_empty() {
        "hello".to_string()
    } else {
        words.join(" ")
    };

    if config.bus.kind == BusKind::Memory {
        tracing::warn!("memory bus has no subscribers outside this process");
    }

    let bus = bus::connect(&config.bus).await?;
    let producer = Producer::new(
        identity::local_identity(config.producer.node.as_deref()),
        bus.clone(),
        config.ring.build()?,
    );

    producer.emit(body.as_bytes()).await?;
    bus.flush().await?;

    tracing::info!(producer = producer.identity(), " [x] Sent {}", body);
    Ok(())
}

async fn consume(config: &RelayConfig, limit: Option<u64>) -> Result<()> {
    if config.bus.kind == BusKind::Memory {
        tracing::warn!("memory bus has no publishers outside this process");
    }

    let bus = bus::connect(&config.bus).await?;
    let rx = bus.subscribe().await?;
    let consumer = Consumer::new(config.ring.build()?);

    tracing::info!(bus = bus.id(), " [*] Waiting for payloads");
    let stats = consumer
        .run(rx, limit, |payload| {
            println!("{}", String::from_utf8_lossy(payload));
        })
        .await;

    tracing::info!(
        received = stats.received,
        handled = stats.handled,
        duplicates = stats.duplicates,
        lagged = stats.lagged,
        "consumer finished"
    );
    Ok(())
}

async fn relay(config: &RelayConfig, payloads: Vec<String>, producers: usize) -> Result<()> {
    if producers == 0 {
        bail!("--producers must be at least 1");
    }
    let payloads = if payloads.is_empty() {
        ["hello", "world", "hello", "again"]
            .map(String::from)
            .to_vec()
    } else {
        payloads
    };

    let bus = bus::connect(&config.bus).await?;
    let rx = bus.subscribe().await?;

    let node = identity::node_name(config.producer.node.as_deref());
    let pid = std::process::id();
    let mut senders = Vec::with_capacity(producers);
    for i in 0..producers {
        let id = identity::identity(&format!("{node}/{i}"), pid);
        senders.push(Producer::new(id, Arc::clone(&bus), config.ring.build()?));
    }

    for payload in &payloads {
        for producer in &senders {
            producer.emit(payload.as_bytes()).await?;
        }
    }
    bus.flush().await?;

    let sent: u64 = senders.iter().map(|p| p.stats().sent).sum();
    let consumer = Consumer::new(config.ring.build()?);
    let drained = tokio::time::timeout(
        RELAY_DRAIN_TIMEOUT,
        consumer.run(rx, Some(sent), |payload| {
            tracing::info!("handled {}", String::from_utf8_lossy(payload));
        }),
    )
    .await;
    if drained.is_err() {
        tracing::warn!(
            "gave up waiting for payloads after {:?}",
            RELAY_DRAIN_TIMEOUT
        );
    }

    let report = serde_json::json!({
        "bus": bus.id(),
        "producers": senders.iter().map(Producer::stats).collect::<Vec<_>>(),
        "consumer": consumer.stats(),
        "last_handled": lossy(consumer.last_handled()),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn verify() -> Result<()> {
    eprintln!("seenring: running formal verification...");
    eprintln!("   Tool: Kani Model Checker");
    eprintln!("   Targets: sr-verify (scan orders, mode invariance), sr-ring (cursor)");
    eprintln!();

    let results: Vec<bool> = ["sr-verify", "sr-ring"]
        .into_iter()
        .map(run_kani)
        .collect();

    eprintln!();
    if results.iter().all(|&passed| passed) {
        eprintln!("seenring: all proofs passed");
        Ok(())
    } else {
        bail!("one or more proofs failed")
    }
}

fn run_kani(package: &str) -> bool {
    let status = Command::new("cargo")
        .args(["kani", "--package", package])
        .status();

    match status {
        Ok(status) if status.success() => {
            eprintln!("   ok    {}", package);
            true
        }
        Ok(_) => {
            eprintln!("   FAIL  {}", package);
            false
        }
        Err(e) => {
            eprintln!("   Kani not found: {}", e);
            eprintln!("   Install with: cargo install kani-verifier && cargo kani setup");
            false
        }
    }
}
