// terminal_log.rs - Periodic terminal metrics display for the detection engine

use colored::*;
use std::io::{self, Write};
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};
use tokio::time::interval;

use crate::config::get_config;
use crate::core::AppState;

/// Structure to track and display metrics
pub struct MetricsTracker {
    last_quote_updates: u64,
    last_detection_passes: u64,
    last_cycles_found: u64,
    last_spread_signals: u64,
    start_time: Instant,
    last_report_time: Instant,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self {
            last_quote_updates: 0,
            last_detection_passes: 0,
            last_cycles_found: 0,
            last_spread_signals: 0,
            start_time: Instant::now(),
            last_report_time: Instant::now(),
        }
    }

    fn format_rate(count: u64, elapsed_secs: f64) -> String {
        let rate = count as f64 / elapsed_secs;
        if rate >= 1000.0 {
            format!("{:.1}k/sec", rate / 1000.0)
        } else {
            format!("{:.1}/sec", rate)
        }
    }
}

impl Default for MetricsTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a periodic metrics display on the configured interval.
pub async fn run_metrics_display(state: AppState) {
    let secs = get_config().general.metrics_interval_secs;
    let mut ticker = interval(Duration::from_secs(secs));
    let mut tracker = MetricsTracker::new();

    println!("{}", "ArbiFury Arbitrage Detection Engine - Metrics".bold().green());
    println!("{}", "=============================================".green());
    let _ = io::stdout().flush();

    loop {
        ticker.tick().await;

        let quote_updates = state.quote_updates.load(Ordering::Relaxed);
        let detection_passes = state.detection_passes.load(Ordering::Relaxed);
        let cycles_found = state.cycles_found.load(Ordering::Relaxed);
        let spread_signals = state.spread_signals.load(Ordering::Relaxed);
        let dropped = state.unknown_pair_drops.load(Ordering::Relaxed);

        let updates_diff = quote_updates.saturating_sub(tracker.last_quote_updates);
        let passes_diff = detection_passes.saturating_sub(tracker.last_detection_passes);
        let cycles_diff = cycles_found.saturating_sub(tracker.last_cycles_found);
        let signals_diff = spread_signals.saturating_sub(tracker.last_spread_signals);
        tracker.last_quote_updates = quote_updates;
        tracker.last_detection_passes = detection_passes;
        tracker.last_cycles_found = cycles_found;
        tracker.last_spread_signals = spread_signals;

        let elapsed_secs = tracker.last_report_time.elapsed().as_secs_f64();
        tracker.last_report_time = Instant::now();

        let runtime = tracker.start_time.elapsed().as_secs();
        let (hours, minutes, seconds) = (runtime / 3600, (runtime % 3600) / 60, runtime % 60);

        println!();
        println!(
            "{} {:02}:{:02}:{:02}",
            "Runtime".bold(),
            hours,
            minutes,
            seconds
        );
        println!(
            "Quote updates:    {:>10}  ({})",
            quote_updates,
            MetricsTracker::format_rate(updates_diff, elapsed_secs)
        );
        println!(
            "Detection passes: {:>10}  ({})",
            detection_passes,
            MetricsTracker::format_rate(passes_diff, elapsed_secs)
        );
        println!(
            "Validated cycles: {}  (+{} this interval)",
            format!("{:>10}", cycles_found).as_str().bold().yellow(),
            cycles_diff
        );
        println!(
            "Spread signals:   {}  (+{} this interval)",
            format!("{:>10}", spread_signals).as_str().bold().yellow(),
            signals_diff
        );
        if dropped > 0 {
            println!(
                "{}",
                format!("Dropped unknown-pair updates: {}", dropped).as_str().red()
            );
        }
        let _ = io::stdout().flush();
    }
}
