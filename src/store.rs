// store.rs - Concurrency-safe quote table shared by feed tasks and the scanners

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// Best bid/ask quote for one (pair, venue).
///
/// Fields stay `None` until the first update carrying them arrives. A side
/// with a missing price or size is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub bid_size: Option<f64>,
    pub ask_size: Option<f64>,
}

impl Quote {
    pub fn new(bid: Option<f64>, ask: Option<f64>, bid_size: Option<f64>, ask_size: Option<f64>) -> Self {
        Self { bid, ask, bid_size, ask_size }
    }

    /// Bid price and size, if both are present.
    pub fn bid_side(&self) -> Option<(f64, f64)> {
        match (self.bid, self.bid_size) {
            (Some(price), Some(size)) => Some((price, size)),
            _ => None,
        }
    }

    /// Ask price and size, if both are present.
    pub fn ask_side(&self) -> Option<(f64, f64)> {
        match (self.ask, self.ask_size) {
            (Some(price), Some(size)) => Some((price, size)),
            _ => None,
        }
    }
}

/// Immutable copy of the full quote table: pair symbol -> venue id -> Quote.
pub type QuoteBook = HashMap<String, HashMap<String, Quote>>;

/// The single point of truth for live prices.
///
/// Feed tasks call `update`/`clear` as quotes and disconnects arrive; the
/// detection loop takes a full copy with `snapshot`. One mutex guards the
/// nested map and is held only for a single upsert or a single full copy,
/// never across I/O or graph work.
#[derive(Debug)]
pub struct QuoteStore {
    table: Mutex<QuoteBook>,
}

impl QuoteStore {
    /// Create a store for a fixed set of pair symbols. Updates for any other
    /// pair are rejected for the lifetime of the store.
    pub fn new(pairs: &[String]) -> Self {
        let mut table = HashMap::with_capacity(pairs.len());
        for pair in pairs {
            table.insert(pair.clone(), HashMap::new());
        }
        Self { table: Mutex::new(table) }
    }

    /// Replace the quote for (pair, venue). The whole quote is swapped, not
    /// merged: callers pass `None` for fields absent from the source message
    /// and any previous value for that field is cleared.
    ///
    /// Returns false when the pair is not in the configured set; the update
    /// is dropped and the caller decides how to count/log it.
    pub fn update(
        &self,
        pair: &str,
        venue: &str,
        bid: Option<f64>,
        ask: Option<f64>,
        bid_size: Option<f64>,
        ask_size: Option<f64>,
    ) -> bool {
        let mut table = self.table.lock().unwrap();
        match table.get_mut(pair) {
            Some(venues) => {
                venues.insert(venue.to_string(), Quote::new(bid, ask, bid_size, ask_size));
                true
            }
            None => false,
        }
    }

    /// Drop a venue's quote for a pair. Used on feed disconnect so stale
    /// prices do not outlive the connection.
    pub fn clear(&self, pair: &str, venue: &str) {
        let mut table = self.table.lock().unwrap();
        if let Some(venues) = table.get_mut(pair) {
            if venues.remove(venue).is_some() {
                debug!("Cleared quote for {} on venue {}", pair, venue);
            }
        }
    }

    /// Full immutable copy of the table for one scan pass. The detection
    /// work runs entirely against this copy so a slow pass never observes
    /// the table mid-write.
    pub fn snapshot(&self) -> QuoteBook {
        self.table.lock().unwrap().clone()
    }
}

/// Highest bid across venues for a pair: (venue, price, size).
pub fn best_bid(book: &QuoteBook, pair: &str) -> Option<(String, f64, f64)> {
    let venues = book.get(pair)?;
    let mut best: Option<(String, f64, f64)> = None;
    for (venue, quote) in venues {
        if let Some((price, size)) = quote.bid_side() {
            match &best {
                Some((_, best_price, _)) if *best_price >= price => {}
                _ => best = Some((venue.clone(), price, size)),
            }
        }
    }
    best
}

/// Lowest ask across venues for a pair: (venue, price, size).
pub fn best_ask(book: &QuoteBook, pair: &str) -> Option<(String, f64, f64)> {
    let venues = book.get(pair)?;
    let mut best: Option<(String, f64, f64)> = None;
    for (venue, quote) in venues {
        if let Some((price, size)) = quote.ask_side() {
            match &best {
                Some((_, best_price, _)) if *best_price <= price => {}
                _ => best = Some((venue.clone(), price, size)),
            }
        }
    }
    best
}
