// detector.rs - Periodic detection pass: snapshot, graph, cycle, validation, spreads

use csv::Writer;
use lazy_static::lazy_static;
use log::{debug, info, warn};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::interval;

use crate::bellman_ford::find_negative_cycle;
use crate::config::get_config;
use crate::core::{AppError, AppState, CycleArb};
use crate::cross_venue::{buffer_spread_signal, scan_venue_spreads};
use crate::graph::build_conversion_graph;
use crate::validator::validate_cycle_profit;

lazy_static! {
    // Validated cycles awaiting the periodic CSV flush
    static ref CYCLE_BUFFER: Mutex<Vec<CycleArb>> = Mutex::new(Vec::new());
}

/// One detection pass against a single snapshot.
///
/// Both scan families consume the same copy: the graph/cycle path and the
/// cross-venue spread scan. Everything here is CPU-bound and holds no lock,
/// so a slow pass never blocks the feed tasks beyond the snapshot copy.
pub fn run_detection_pass(state: &AppState) {
    let config = get_config();
    let detection = &config.detection;

    let book = state.store.snapshot();
    state.increment_detection_passes();

    // Graph -> Bellman-Ford -> validation. The log-space candidate is only
    // a lead; the validator re-prices it against live liquidity.
    let graph = build_conversion_graph(
        &book,
        &detection.base_currency,
        detection.fee_rate,
        detection.min_liquidity,
    );

    match find_negative_cycle(&graph, &detection.base_currency) {
        Some(cycle) => {
            let profit = validate_cycle_profit(&cycle, &book, detection.fee_rate, detection.min_liquidity);
            if profit > 1.0 {
                let arb = CycleArb::new(cycle, profit);
                info!(
                    "Arbitrage cycle found: {} (compounded return {:.6})",
                    arb.path(),
                    arb.compounded_return
                );
                state.increment_cycles_found();
                buffer_cycle_signal(arb);
            } else if profit == 0.0 {
                debug!("Candidate cycle rejected: stale or illiquid edge");
            } else {
                debug!("Candidate cycle not profitable after validation: {:.6}", profit);
            }
        }
        None => debug!("No conversion cycle found this tick"),
    }

    // Independent of the cycle machinery: same-pair spreads across venues.
    let signals = scan_venue_spreads(&book, detection.fee_rate, detection.profit_threshold);
    for signal in signals {
        info!(
            "Venue spread on {}: buy {} @ {:.8}, sell {} @ {:.8}, net {:.4}%",
            signal.pair,
            signal.buy_venue,
            signal.buy_price,
            signal.sell_venue,
            signal.sell_price,
            signal.net_profit_pct * 100.0
        );
        if buffer_spread_signal(signal) {
            state.increment_spread_signals(1);
        }
    }
}

/// Free-running detection loop. A bad tick is logged and the next tick
/// proceeds; the loop runs until process shutdown.
pub async fn run_detection_loop(state: AppState) {
    let tick = Duration::from_millis(get_config().detection.tick_interval_ms);
    let mut ticker = interval(tick);
    info!("Detection loop started, tick interval {:?}", tick);

    loop {
        ticker.tick().await;
        run_detection_pass(&state);
    }
}

/// Buffer a validated cycle for the next CSV flush.
pub fn buffer_cycle_signal(arb: CycleArb) {
    CYCLE_BUFFER.lock().unwrap().push(arb);
}

/// Flush buffered cycle signals to a CSV file, best first.
pub async fn flush_cycle_buffer(filename: &str) -> Result<(), AppError> {
    let mut buf = CYCLE_BUFFER.lock().unwrap();
    if buf.is_empty() {
        return Ok(());
    }

    buf.sort_by(|a, b| {
        b.compounded_return
            .partial_cmp(&a.compounded_return)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(filename)?;

    let mut writer = Writer::from_writer(file);

    // If the file is empty, write a header.
    let metadata = std::fs::metadata(filename)?;
    if metadata.len() == 0 {
        writer.write_record(["timestamp", "id", "cycle", "compounded_return"])?;
    }

    for record in buf.iter() {
        writer.write_record([
            &format!("{}", record.timestamp),
            &record.id,
            &record.cycle.join(":"),
            &format!("{:.8}", record.compounded_return),
        ])?;
    }

    writer.flush()?;
    info!("Flushed {} cycle signals to {}", buf.len(), filename);
    buf.clear();

    Ok(())
}

/// Periodic CSV flush of both signal buffers.
pub async fn run_signal_flush(spread_csv: String, cycle_csv: String) {
    let secs = get_config().general.csv_flush_interval_secs;
    let mut ticker = interval(Duration::from_secs(secs));

    loop {
        ticker.tick().await;
        if let Err(e) = crate::cross_venue::flush_spread_buffer(&spread_csv).await {
            warn!("Failed to flush spread signals: {}", e);
        }
        if let Err(e) = flush_cycle_buffer(&cycle_csv).await {
            warn!("Failed to flush cycle signals: {}", e);
        }
    }
}
