// Define modules
pub mod core;
pub mod store;         // Shared quote table
pub mod graph;         // Conversion graph builder
pub mod bellman_ford;  // Negative-cycle finder
pub mod validator;     // Liquidity-aware profit validation
pub mod cross_venue;   // Same-pair spread scanning across venues
pub mod detector;      // Periodic detection loop
pub mod feed;          // Quote ingestion from feed collaborators
pub mod config;        // Centralized configuration
pub mod terminal_log;  // Terminal metrics display

// Re-export key components for easier usage
pub use self::core::*;

pub use store::{Quote, QuoteBook, QuoteStore};

pub use graph::{build_conversion_graph, ConversionGraph};

pub use bellman_ford::find_negative_cycle;

pub use validator::validate_cycle_profit;

pub use cross_venue::{buffer_spread_signal, flush_spread_buffer, scan_venue_spreads};

pub use detector::{
    flush_cycle_buffer,
    run_detection_loop,
    run_detection_pass,
    run_signal_flush,
};

pub use feed::{run_quote_ingest, run_sim_feed, QuoteEvent};

pub use config::{get_config, init_config, Config};

pub use terminal_log::run_metrics_display;
