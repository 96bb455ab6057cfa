// core.rs - Shared state, signal types and constants for the arbitrage engine

use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::store::QuoteStore;

//
// CONSTANTS
//

// Fee and filter defaults (spot taker fee 0.1%)
pub const DEFAULT_FEE_RATE: f64 = 0.001;
pub const DEFAULT_MIN_LIQUIDITY: f64 = 1.0;
pub const DEFAULT_PROFIT_THRESHOLD: f64 = 0.002; // 0.2% net spread

// Detection loop cadence
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(4);

// Default pair universe when no config file is provided
pub const DEFAULT_PAIRS: [&str; 10] = [
    "BTCUSDT", "ETHUSDT", "SOLUSDT", "XRPUSDT", "DOGEUSDT",
    "SUIUSDT", "LTCUSDT", "ADAUSDT", "TONUSDT", "PNUTUSDT",
];

pub const DEFAULT_BASE_CURRENCY: &str = "USDT";

// CSV output files for detected opportunities
pub const SPREAD_SIGNAL_CSV: &str = "venue_spread_signals.csv";
pub const CYCLE_SIGNAL_CSV: &str = "cycle_signals.csv";

/// A validated multi-hop conversion cycle with its compounded return.
#[derive(Debug, Clone, Serialize)]
pub struct CycleArb {
    pub id: String,
    pub cycle: Vec<String>,
    pub compounded_return: f64,
    pub timestamp: i64,
}

impl CycleArb {
    pub fn new(cycle: Vec<String>, compounded_return: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            cycle,
            compounded_return,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Human-readable path, e.g. "USDT -> BTC -> ETH -> USDT".
    pub fn path(&self) -> String {
        self.cycle.join(" -> ")
    }
}

/// A same-pair spread between two venues.
#[derive(Debug, Clone, Serialize)]
pub struct VenueSpreadArb {
    pub id: String,
    pub pair: String,
    pub buy_venue: String,
    pub sell_venue: String,
    pub buy_price: f64,
    pub sell_price: f64,
    pub net_profit_pct: f64,
    pub timestamp: i64,
}

/// Application state shared between feed tasks and the detection loop.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<QuoteStore>,

    // Performance tracking counters
    pub quote_updates: Arc<AtomicU64>,      // Quote upserts applied to the store
    pub detection_passes: Arc<AtomicU64>,   // Detection ticks completed
    pub cycles_found: Arc<AtomicU64>,       // Cycles that survived validation
    pub spread_signals: Arc<AtomicU64>,     // Cross-venue signals emitted
    pub unknown_pair_drops: Arc<AtomicU64>, // Updates dropped for unconfigured pairs

    // Per-symbol counts of dropped updates, for diagnosing feed/config drift
    pub dropped_symbols: Arc<DashMap<String, u64>>,
}

impl AppState {
    pub fn new(pairs: &[String]) -> Self {
        Self {
            store: Arc::new(QuoteStore::new(pairs)),
            quote_updates: Arc::new(AtomicU64::new(0)),
            detection_passes: Arc::new(AtomicU64::new(0)),
            cycles_found: Arc::new(AtomicU64::new(0)),
            spread_signals: Arc::new(AtomicU64::new(0)),
            unknown_pair_drops: Arc::new(AtomicU64::new(0)),
            dropped_symbols: Arc::new(DashMap::new()),
        }
    }

    // Increment the quote update counter
    #[inline(always)]
    pub fn increment_quote_updates(&self, count: u64) {
        self.quote_updates.fetch_add(count, Ordering::Relaxed);
    }

    // Increment the detection pass counter
    #[inline(always)]
    pub fn increment_detection_passes(&self) {
        self.detection_passes.fetch_add(1, Ordering::Relaxed);
    }

    // Increment the validated cycle counter
    #[inline(always)]
    pub fn increment_cycles_found(&self) {
        self.cycles_found.fetch_add(1, Ordering::Relaxed);
    }

    // Increment the spread signal counter
    #[inline(always)]
    pub fn increment_spread_signals(&self, count: u64) {
        self.spread_signals.fetch_add(count, Ordering::Relaxed);
    }

    /// Record an update that arrived for a pair outside the configured set.
    pub fn record_unknown_pair(&self, pair: &str) {
        self.unknown_pair_drops.fetch_add(1, Ordering::Relaxed);
        *self.dropped_symbols.entry(pair.to_string()).or_insert(0) += 1;
    }
}

/// Error types that can occur in our application
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Missing quote data for pair: {0}")]
    MissingQuoteData(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Other error: {0}")]
    Other(String),
}
