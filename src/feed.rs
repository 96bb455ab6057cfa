// feed.rs - Normalized quote ingestion from feed collaborators

use log::{info, warn};
use rand::Rng;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

use crate::config::get_config;
use crate::core::AppState;

/// Normalized message a feed collaborator produces. Venue clients own their
/// transport, decoding and reconnect logic; the engine only sees these.
#[derive(Debug, Clone)]
pub enum QuoteEvent {
    /// Whole-quote replacement for (pair, venue). Fields the source message
    /// did not carry must be `None` so stale values are cleared.
    Update {
        pair: String,
        venue: String,
        bid: Option<f64>,
        ask: Option<f64>,
        bid_size: Option<f64>,
        ask_size: Option<f64>,
    },
    /// Venue disconnected: its quote for the pair must not linger.
    Clear { pair: String, venue: String },
}

/// Drain the feed channel into the quote store. One long-running task; any
/// number of feed collaborators may clone the sender.
pub async fn run_quote_ingest(state: AppState, mut rx: mpsc::UnboundedReceiver<QuoteEvent>) {
    info!("Quote ingest task started");

    while let Some(event) = rx.recv().await {
        match event {
            QuoteEvent::Update { pair, venue, bid, ask, bid_size, ask_size } => {
                if state.store.update(&pair, &venue, bid, ask, bid_size, ask_size) {
                    state.increment_quote_updates(1);
                } else {
                    state.record_unknown_pair(&pair);
                    warn!("Dropped quote for unconfigured pair {} from venue {}", pair, venue);
                }
            }
            QuoteEvent::Clear { pair, venue } => {
                state.store.clear(&pair, &venue);
            }
        }
    }

    info!("Quote ingest channel closed, task ending");
}

/// Random-walk quote generator standing in for real venue collaborators.
/// Two synthetic venues quote every configured pair around a drifting mid
/// price with a small spread, and occasionally one venue drops a pair to
/// exercise the clear path.
pub async fn run_sim_feed(tx: mpsc::UnboundedSender<QuoteEvent>) {
    const VENUES: [&str; 2] = ["simx", "simy"];

    let pairs = get_config().detection.pairs.clone();
    let mut mids: Vec<f64> = {
        let mut rng = rand::thread_rng();
        pairs.iter().map(|_| rng.gen_range(10.0..1000.0)).collect()
    };

    let mut ticker = interval(Duration::from_millis(250));
    info!("Simulated feed started for {} pairs on {:?}", pairs.len(), VENUES);

    loop {
        ticker.tick().await;
        let mut rng = rand::thread_rng();

        for (pair, mid) in pairs.iter().zip(mids.iter_mut()) {
            *mid *= 1.0 + rng.gen_range(-0.002..0.002);

            for venue in VENUES {
                // Rare synthetic disconnect for one venue/pair
                if rng.gen_bool(0.002) {
                    if tx.send(QuoteEvent::Clear { pair: pair.clone(), venue: venue.to_string() }).is_err() {
                        return;
                    }
                    continue;
                }

                let skew = 1.0 + rng.gen_range(-0.0005..0.0005);
                let half_spread = *mid * rng.gen_range(0.0001..0.001);
                let event = QuoteEvent::Update {
                    pair: pair.clone(),
                    venue: venue.to_string(),
                    bid: Some(*mid * skew - half_spread),
                    ask: Some(*mid * skew + half_spread),
                    bid_size: Some(rng.gen_range(0.5..50.0)),
                    ask_size: Some(rng.gen_range(0.5..50.0)),
                };
                if tx.send(event).is_err() {
                    return; // engine shut down
                }
            }
        }
    }
}
