// cross_venue.rs - Same-pair spread scanning across venues

use csv::Writer;
use lazy_static::lazy_static;
use log::info;
use std::collections::HashSet;
use std::sync::Mutex;

use crate::core::{AppError, VenueSpreadArb};
use crate::store::QuoteBook;

lazy_static! {
    // Buffer of detected spread signals awaiting the periodic CSV flush
    static ref SPREAD_BUFFER: Mutex<Vec<VenueSpreadArb>> = Mutex::new(Vec::new());

    // Recently reported (pair, buy venue, sell venue) keys to avoid
    // re-emitting the same opportunity every tick while it persists
    static ref RECENT_SIGNALS: Mutex<HashSet<String>> = Mutex::new(HashSet::with_capacity(1000));
}

/// Scan every pair in the snapshot for a same-pair spread between venues.
///
/// For each pair the highest bid and the lowest ask across venues are
/// tracked (a venue missing one side is skipped for that side only). When
/// the best bid exceeds the best ask, the net spread is the gross
/// percentage minus a flat `2 * fee` — one fee on the buy leg, one on the
/// sell leg. A signal is emitted when the net spread strictly exceeds
/// `threshold`.
///
/// Note the fee model here deliberately differs from the per-hop
/// `(1 - fee)` multiplier used by the cycle validator; the two scanners
/// price fees independently.
pub fn scan_venue_spreads(book: &QuoteBook, fee_rate: f64, threshold: f64) -> Vec<VenueSpreadArb> {
    let mut signals = Vec::new();

    for (pair, venues) in book {
        let mut max_bid: Option<(&str, f64)> = None;
        let mut min_ask: Option<(&str, f64)> = None;

        for (venue, quote) in venues {
            if let Some((bid, _)) = quote.bid_side() {
                match max_bid {
                    Some((_, best)) if best >= bid => {}
                    _ => max_bid = Some((venue.as_str(), bid)),
                }
            }
            if let Some((ask, _)) = quote.ask_side() {
                match min_ask {
                    Some((_, best)) if best <= ask => {}
                    _ => min_ask = Some((venue.as_str(), ask)),
                }
            }
        }

        let ((sell_venue, bid), (buy_venue, ask)) = match (max_bid, min_ask) {
            (Some(bid), Some(ask)) => (bid, ask),
            _ => continue,
        };

        if bid <= ask {
            continue;
        }

        let gross_spread_pct = (bid - ask) / ask;
        let net_spread_pct = gross_spread_pct - 2.0 * fee_rate;

        if net_spread_pct > threshold {
            signals.push(VenueSpreadArb {
                id: uuid::Uuid::new_v4().to_string(),
                pair: pair.clone(),
                buy_venue: buy_venue.to_string(),
                sell_venue: sell_venue.to_string(),
                buy_price: ask,
                sell_price: bid,
                net_profit_pct: net_spread_pct,
                timestamp: chrono::Utc::now().timestamp_millis(),
            });
        }
    }

    signals
}

/// Buffer a spread signal for the next CSV flush. Returns false when the
/// same (pair, venues) combination was already reported recently.
pub fn buffer_spread_signal(arb: VenueSpreadArb) -> bool {
    let key = format!("{}:{}:{}", arb.pair, arb.buy_venue, arb.sell_venue);
    {
        let mut recent = RECENT_SIGNALS.lock().unwrap();
        if !recent.insert(key) {
            return false;
        }
    }
    SPREAD_BUFFER.lock().unwrap().push(arb);
    true
}

/// Flush buffered spread signals to a CSV file, best first.
pub async fn flush_spread_buffer(filename: &str) -> Result<(), AppError> {
    let mut buf = SPREAD_BUFFER.lock().unwrap();
    if buf.is_empty() {
        return Ok(());
    }

    buf.sort_by(|a, b| {
        b.net_profit_pct
            .partial_cmp(&a.net_profit_pct)
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
        writer.write_record([
            "timestamp", "id", "pair", "buy_venue", "sell_venue",
            "buy_price", "sell_price", "net_profit_pct",
        ])?;
    }

    for record in buf.iter() {
        writer.write_record([
            &format!("{}", record.timestamp),
            &record.id,
            &record.pair,
            &record.buy_venue,
            &record.sell_venue,
            &format!("{:.8}", record.buy_price),
            &format!("{:.8}", record.sell_price),
            &format!("{:.6}", record.net_profit_pct),
        ])?;
    }

    writer.flush()?;
    info!("Flushed {} venue spread signals to {}", buf.len(), filename);
    buf.clear();

    // Let persistent opportunities resurface after a flush cycle.
    let mut recent = RECENT_SIGNALS.lock().unwrap();
    if recent.len() > 2000 {
        info!("Clearing signal dedup cache of {} entries", recent.len());
        recent.clear();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::QuoteStore;

    fn two_venue_store(bid_a: f64, ask_a: f64, bid_b: f64, ask_b: f64) -> QuoteStore {
        let store = QuoteStore::new(&["BTCUSDT".to_string()]);
        store.update("BTCUSDT", "venue_a", Some(bid_a), Some(ask_a), Some(1.0), Some(1.0));
        store.update("BTCUSDT", "venue_b", Some(bid_b), Some(ask_b), Some(1.0), Some(1.0));
        store
    }

    #[test]
    fn boundary_spread_below_threshold_is_silent() {
        // bid 50000 on A, ask 49900 on B: gross ~0.002004, net ~0.000004
        // after 2*fee — far under the 0.002 threshold, so no signal.
        let store = two_venue_store(50_000.0, 50_100.0, 49_850.0, 49_900.0);
        let signals = scan_venue_spreads(&store.snapshot(), 0.001, 0.002);
        assert!(signals.is_empty());
    }

    #[test]
    fn wide_spread_produces_a_signal_with_venues_oriented() {
        let store = two_venue_store(50_000.0, 50_100.0, 49_000.0, 49_100.0);
        let signals = scan_venue_spreads(&store.snapshot(), 0.001, 0.002);
        assert_eq!(signals.len(), 1);

        let signal = &signals[0];
        assert_eq!(signal.pair, "BTCUSDT");
        assert_eq!(signal.buy_venue, "venue_b"); // lowest ask
        assert_eq!(signal.sell_venue, "venue_a"); // highest bid
        assert_eq!(signal.buy_price, 49_100.0);
        assert_eq!(signal.sell_price, 50_000.0);

        let expected = (50_000.0 - 49_100.0) / 49_100.0 - 0.002;
        assert!((signal.net_profit_pct - expected).abs() < 1e-12);
    }

    #[test]
    fn net_spread_just_below_threshold_is_not_a_signal() {
        // gross = 0.0039 => net = 0.0019, under the 0.002 threshold.
        let store = two_venue_store(50_195.0, 50_300.0, 49_900.0, 50_000.0);
        let signals = scan_venue_spreads(&store.snapshot(), 0.001, 0.002);
        assert!(signals.is_empty());

        // Widening the spread past the threshold flips the outcome.
        let store = two_venue_store(50_300.0, 50_400.0, 49_900.0, 50_000.0);
        let signals = scan_venue_spreads(&store.snapshot(), 0.001, 0.002);
        assert_eq!(signals.len(), 1);
    }

    #[test]
    fn venue_missing_one_side_still_counts_for_the_other() {
        let store = QuoteStore::new(&["BTCUSDT".to_string()]);
        store.update("BTCUSDT", "venue_a", Some(50_000.0), None, Some(1.0), None);
        store.update("BTCUSDT", "venue_b", Some(48_000.0), Some(49_000.0), Some(1.0), Some(1.0));

        let signals = scan_venue_spreads(&store.snapshot(), 0.001, 0.002);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].sell_venue, "venue_a");
        assert_eq!(signals[0].buy_venue, "venue_b");
    }

    #[test]
    fn no_signal_when_books_do_not_cross() {
        let store = two_venue_store(49_900.0, 50_000.0, 49_850.0, 49_950.0);
        let signals = scan_venue_spreads(&store.snapshot(), 0.001, 0.002);
        assert!(signals.is_empty());
    }
}
