// main.rs - Entry point for the multi-venue arbitrage detection engine

use env_logger::Env;
use log::{info, LevelFilter};
use std::io::Write;

use arbifury::config::{get_config, init_config, Config};
use arbifury::core::{AppError, AppState, CYCLE_SIGNAL_CSV, SPREAD_SIGNAL_CSV};
use arbifury::feed::{run_quote_ingest, run_sim_feed, QuoteEvent};
use arbifury::{run_detection_loop, run_metrics_display, run_signal_flush};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Load configuration from file
    match init_config("config.toml") {
        Ok(_) => info!("Configuration loaded successfully"),
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            eprintln!("Falling back to default configuration");
            let _ = Config::global().set(Config::default());
        }
    }

    // Configure logging based on configuration
    env_logger::Builder::from_env(Env::default().default_filter_or(&get_config().general.log_level))
        // Keep the hot detection path quiet unless asked for
        .filter_module("arbifury::feed", LevelFilter::Warn)
        .format(|buf, record| {
            if record.level() <= log::Level::Info {
                writeln!(buf, "[{}] {}", record.level(), record.args())
            } else {
                writeln!(
                    buf,
                    "[{} {}:{}] {}",
                    record.level(),
                    record.file().unwrap_or("unknown"),
                    record.line().unwrap_or(0),
                    record.args()
                )
            }
        })
        .format_timestamp_millis()
        .format_module_path(false)
        .init();

    info!("Starting ArbiFury Arbitrage Detection Engine");

    let config = get_config();
    let state = AppState::new(&config.detection.pairs);
    info!(
        "Tracking {} pairs against {} on a {}ms tick",
        config.detection.pairs.len(),
        config.detection.base_currency,
        config.detection.tick_interval_ms
    );

    // Feed collaborators push normalized quote events into this channel.
    let (quote_tx, quote_rx) = tokio::sync::mpsc::unbounded_channel::<QuoteEvent>();

    tokio::spawn(run_quote_ingest(state.clone(), quote_rx));

    if config.features.enable_sim_feed {
        info!("Simulated feed enabled; attach real venue clients to disable");
        tokio::spawn(run_sim_feed(quote_tx.clone()));
    }

    tokio::spawn(run_detection_loop(state.clone()));
    tokio::spawn(run_signal_flush(
        SPREAD_SIGNAL_CSV.to_string(),
        CYCLE_SIGNAL_CSV.to_string(),
    ));
    tokio::spawn(run_metrics_display(state.clone()));

    // Detection work is side-effect free beyond logging; in-flight passes
    // are simply abandoned on shutdown.
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting");

    Ok(())
}
