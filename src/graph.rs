// graph.rs - Builds the log-weighted currency conversion graph from a snapshot

use std::collections::HashMap;

use crate::store::{best_ask, best_bid, QuoteBook};

/// Directed conversion graph: currency code -> (target currency, weight).
///
/// Weights are log-space so a multi-hop conversion chain sums instead of
/// multiplies: a closed walk with negative total weight is a compounded
/// return above 1 before fees are re-checked against live liquidity.
pub type ConversionGraph = HashMap<String, Vec<(String, f64)>>;

/// Build a fresh conversion graph from a point-in-time snapshot.
///
/// Only pairs quoted against `base_currency` participate; the pair symbol is
/// `coin` + `base_currency` and the base suffix is stripped to obtain the
/// coin node. For every pair with a full two-sided quote:
///
/// - `base -> coin` with weight `-ln(ask * (1 - fee))` when the ask side
///   carries at least `min_liquidity` (buying the coin at the ask),
/// - `coin -> base` with weight `ln(bid * (1 - fee))` when the bid side
///   carries at least `min_liquidity` (selling the coin at the bid).
///
/// Both nodes are inserted even if neither side is liquid enough, keeping
/// the node universe stable across passes.
pub fn build_conversion_graph(
    book: &QuoteBook,
    base_currency: &str,
    fee_rate: f64,
    min_liquidity: f64,
) -> ConversionGraph {
    let mut graph: ConversionGraph = HashMap::new();

    for pair in book.keys() {
        let coin = match pair.strip_suffix(base_currency) {
            Some(coin) if !coin.is_empty() => coin,
            _ => continue,
        };

        // Best quote across venues; pairs without a full two-sided quote
        // are skipped entirely.
        let (_, bid, bid_size) = match best_bid(book, pair) {
            Some(side) => side,
            None => continue,
        };
        let (_, ask, ask_size) = match best_ask(book, pair) {
            Some(side) => side,
            None => continue,
        };

        graph.entry(base_currency.to_string()).or_default();
        graph.entry(coin.to_string()).or_default();

        if ask * ask_size >= min_liquidity {
            let weight = -(ask * (1.0 - fee_rate)).ln();
            graph
                .entry(base_currency.to_string())
                .or_default()
                .push((coin.to_string(), weight));
        }

        if bid * bid_size >= min_liquidity {
            let weight = (bid * (1.0 - fee_rate)).ln();
            graph
                .entry(coin.to_string())
                .or_default()
                .push((base_currency.to_string(), weight));
        }
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::QuoteStore;

    const TOL: f64 = 1e-12;

    fn store_with(pair: &str, bid: f64, ask: f64, bid_size: f64, ask_size: f64) -> QuoteStore {
        let store = QuoteStore::new(&[pair.to_string()]);
        store.update(pair, "bybit", Some(bid), Some(ask), Some(bid_size), Some(ask_size));
        store
    }

    fn edge_weight(graph: &ConversionGraph, from: &str, to: &str) -> Option<f64> {
        graph
            .get(from)?
            .iter()
            .find(|(target, _)| target == to)
            .map(|(_, weight)| *weight)
    }

    #[test]
    fn two_sided_quote_produces_both_edges() {
        let store = store_with("COINBASE", 99.0, 100.0, 10.0, 10.0);
        let graph = build_conversion_graph(&store.snapshot(), "BASE", 0.001, 5.0);

        let forward = edge_weight(&graph, "BASE", "COIN").unwrap();
        assert!((forward - (-(100.0f64 * 0.999).ln())).abs() < TOL);

        let back = edge_weight(&graph, "COIN", "BASE").unwrap();
        assert!((back - (99.0f64 * 0.999).ln()).abs() < TOL);
    }

    #[test]
    fn illiquid_ask_drops_only_the_buy_edge() {
        // ask * ask_size = 100 * 0.01 = 1.0 < 5.0, bid side stays liquid
        let store = store_with("COINBASE", 99.0, 100.0, 10.0, 0.01);
        let graph = build_conversion_graph(&store.snapshot(), "BASE", 0.001, 5.0);

        assert!(edge_weight(&graph, "BASE", "COIN").is_none());
        assert!(edge_weight(&graph, "COIN", "BASE").is_some());
    }

    #[test]
    fn nodes_exist_even_when_no_side_is_liquid() {
        let store = store_with("COINBASE", 99.0, 100.0, 0.001, 0.001);
        let graph = build_conversion_graph(&store.snapshot(), "BASE", 0.001, 5.0);

        assert!(graph.contains_key("BASE"));
        assert!(graph.contains_key("COIN"));
        assert!(graph["BASE"].is_empty());
        assert!(graph["COIN"].is_empty());
    }

    #[test]
    fn one_sided_quote_is_skipped() {
        let store = QuoteStore::new(&["COINBASE".to_string()]);
        store.update("COINBASE", "bybit", Some(99.0), None, Some(10.0), None);
        let graph = build_conversion_graph(&store.snapshot(), "BASE", 0.001, 5.0);
        assert!(graph.is_empty());
    }

    #[test]
    fn pair_not_quoted_against_base_is_ignored() {
        let store = store_with("ETHBTC", 0.05, 0.051, 100.0, 100.0);
        let graph = build_conversion_graph(&store.snapshot(), "USDT", 0.001, 1.0);
        assert!(graph.is_empty());
    }

    #[test]
    fn best_venue_feeds_the_edge_weights() {
        let store = QuoteStore::new(&["COINBASE".to_string()]);
        store.update("COINBASE", "bybit", Some(99.0), Some(101.0), Some(10.0), Some(10.0));
        store.update("COINBASE", "bingx", Some(99.5), Some(100.0), Some(10.0), Some(10.0));
        let graph = build_conversion_graph(&store.snapshot(), "BASE", 0.0, 1.0);

        let forward = edge_weight(&graph, "BASE", "COIN").unwrap();
        assert!((forward - (-(100.0f64).ln())).abs() < TOL); // bingx ask
        let back = edge_weight(&graph, "COIN", "BASE").unwrap();
        assert!((back - (99.5f64).ln()).abs() < TOL); // bingx bid
    }
}
