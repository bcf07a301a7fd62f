use clap::Parser;
use escrow_engine::application::engine::EscrowEngine;
use escrow_engine::config::EngineConfig;
use escrow_engine::domain::call::CallContext;
use escrow_engine::domain::payment::Principal;
use escrow_engine::domain::ports::LedgerStoreBox;
use escrow_engine::infrastructure::in_memory::InMemoryLedger;
use escrow_engine::infrastructure::settlement::RecordingSettlement;
use escrow_engine::interfaces::csv::call_reader::CallReader;
use escrow_engine::interfaces::csv::payment_writer::PaymentWriter;
use miette::{IntoDiagnostic, Result, miette};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input call log CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// JSON engine configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Identity allowed to resolve disputes; overrides the config file
    #[arg(long, env = "ESCROW_ARBITER")]
    arbiter: Option<String>,

    /// Emit structured logs on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "escrow_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let config = match &cli.config {
        Some(path) => Some(EngineConfig::from_json_file(path).into_diagnostic()?),
        None => None,
    };
    match (config, &cli.arbiter) {
        (Some(mut config), Some(arbiter)) => {
            config.arbiter = Principal::new(arbiter.as_str());
            Ok(config)
        }
        (Some(config), None) => Ok(config),
        (None, Some(arbiter)) => Ok(EngineConfig::new(arbiter.as_str())),
        (None, None) => Err(miette!(
            "no arbiter configured: pass --arbiter, set ESCROW_ARBITER, or use --config"
        )),
    }
}

#[cfg(feature = "storage-rocksdb")]
fn open_store(db_path: Option<PathBuf>) -> Result<LedgerStoreBox> {
    use escrow_engine::infrastructure::rocksdb::RocksDBLedger;

    match db_path {
        Some(path) => Ok(Box::new(RocksDBLedger::open(path).into_diagnostic()?)),
        None => Ok(Box::new(InMemoryLedger::new())),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(db_path: Option<PathBuf>) -> Result<LedgerStoreBox> {
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(Box::new(InMemoryLedger::new()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        init_logging();
    }

    let config = load_config(&cli)?;
    let store = open_store(cli.db_path)?;
    let engine = EscrowEngine::new(config, store, Box::new(RecordingSettlement::new()));

    // Replay calls; the 1-based row number is the call's height.
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = CallReader::new(file);
    for (index, call) in reader.calls().enumerate() {
        let height = index as u64 + 1;
        match call {
            Ok(invocation) => {
                let ctx = CallContext::new(invocation.caller, height);
                if let Err(e) = engine.execute(&ctx, invocation.call).await {
                    eprintln!(
                        "Error processing call {}: [{} {}] {}",
                        height,
                        e.code(),
                        e.name(),
                        e
                    );
                }
            }
            Err(e) => {
                eprintln!("Error reading call {}: {}", height, e);
            }
        }
    }

    // Entries left pending by a rejected dispatch or an earlier run.
    if let Err(e) = engine.flush_settlements().await {
        eprintln!("Error flushing settlements: [{} {}] {}", e.code(), e.name(), e);
    }

    let payments = engine.payments().await.into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = PaymentWriter::new(stdout.lock());
    writer.write_payments(payments).into_diagnostic()?;

    Ok(())
}
