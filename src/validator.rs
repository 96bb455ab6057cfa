// validator.rs - Re-walks a candidate cycle against live quotes

use log::{debug, warn};

use crate::store::{best_ask, best_bid, QuoteBook};

/// Re-price a candidate cycle edge-by-edge against the snapshot.
///
/// For each hop (from, to) the underlying market pair is resolved by trying
/// `from+to` and then `to+from`:
///
/// - quoted as `from+to`: the hop consumes the ask, rate = ask,
///   liquidity = ask * ask_size;
/// - quoted as `to+from`: the hop sells into the bid, rate = 1 / bid,
///   liquidity = bid * bid_size.
///
/// Any missing pair, missing side or under-liquid edge invalidates the
/// whole cycle (returns 0.0); an illiquid leg must not be averaged away.
/// Otherwise the running amount starts at 1.0 and is multiplied by
/// `rate * (1 - fee)` per hop; a result above 1.0 is a genuine opportunity
/// at current liquidity. The log-space cycle finder only proposes
/// candidates; this result is authoritative.
pub fn validate_cycle_profit(
    cycle: &[String],
    book: &QuoteBook,
    fee_rate: f64,
    min_liquidity: f64,
) -> f64 {
    let mut amount = 1.0_f64;

    for hop in cycle.windows(2) {
        let (from, to) = (&hop[0], &hop[1]);

        let forward = format!("{}{}", from, to);
        let reverse = format!("{}{}", to, from);

        let (rate, liquidity) = if book.contains_key(&forward) {
            match best_ask(book, &forward) {
                Some((_, ask, ask_size)) => (ask, ask * ask_size),
                None => {
                    warn!("Cycle rejected: no ask for {} while validating {} -> {}", forward, from, to);
                    return 0.0;
                }
            }
        } else if book.contains_key(&reverse) {
            match best_bid(book, &reverse) {
                Some((_, bid, bid_size)) if bid > 0.0 => (1.0 / bid, bid * bid_size),
                _ => {
                    warn!("Cycle rejected: no bid for {} while validating {} -> {}", reverse, from, to);
                    return 0.0;
                }
            }
        } else {
            warn!("Cycle rejected: no market pair for {} -> {}", from, to);
            return 0.0;
        };

        if liquidity < min_liquidity {
            debug!(
                "Cycle rejected: {} -> {} liquidity {:.4} below minimum {:.4}",
                from, to, liquidity, min_liquidity
            );
            return 0.0;
        }

        amount *= rate * (1.0 - fee_rate);
    }

    amount
}
