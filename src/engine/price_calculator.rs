// ============================================================================
// Opening Price Calculation
// ============================================================================

use std::collections::BTreeSet;

use crate::domain::order::{Price, Quantity, Side};
use crate::domain::order_book::OrderBook;

/// The single price an auction uncross would trade at, together with the
/// quantity that would change hands there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpeningPrice {
    pub price: Price,
    pub tradable_quantity: Quantity,
}

/// Compute the opening price of a crossed book.
///
/// Candidates are the distinct limit prices of active orders at or above the
/// best ask, plus the last-traded price when it lies in that range. Among
/// them the winner maximizes the tradable quantity, breaking ties by
/// closeness to the last-traded price and then by the lower price.
///
/// Returns `None` when either side is empty or the best bid is below the
/// best ask, in which case no quantity can trade.
pub fn opening_price(book: &OrderBook, last_trade_price: Price) -> Option<OpeningPrice> {
    let best_bid = book.best_price(Side::Buy)?;
    let best_ask = book.best_price(Side::Sell)?;
    if best_bid < best_ask {
        return None;
    }

    let mut candidates: BTreeSet<Price> = book
        .buy_orders()
        .iter()
        .chain(book.sell_orders().iter())
        .map(|order| order.price)
        .filter(|price| *price >= best_ask)
        .collect();
    if last_trade_price >= best_ask {
        candidates.insert(last_trade_price);
    }

    let mut best: Option<OpeningPrice> = None;
    for &price in &candidates {
        let quantity = tradable_quantity_at(book, price);
        let better = match best {
            None => true,
            Some(current) => {
                let delta = price.abs_diff(last_trade_price);
                let current_delta = current.price.abs_diff(last_trade_price);
                quantity > current.tradable_quantity
                    || (quantity == current.tradable_quantity && delta < current_delta)
                    || (quantity == current.tradable_quantity
                        && delta == current_delta
                        && price < current.price)
            }
        };
        if better {
            best = Some(OpeningPrice {
                price,
                tradable_quantity: quantity,
            });
        }
    }
    best
}

/// Quantity that would trade if every crossing order matched at `price`:
/// the lesser of buy demand at or above it and sell supply at or below it.
/// Iceberg orders count with their displayed slice only, so the indicative
/// volume never reveals hidden quantity.
pub fn tradable_quantity_at(book: &OrderBook, price: Price) -> Quantity {
    let demand: Quantity = book
        .buy_orders()
        .iter()
        .filter(|order| order.price >= price)
        .map(|order| order.quantity())
        .sum();
    let supply: Quantity = book
        .sell_orders()
        .iter()
        .filter(|order| order.price <= price)
        .map(|order| order.quantity())
        .sum();
    demand.min(supply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{BrokerId, Order, OrderId, ShareholderId};
    use std::sync::Arc;

    fn instrument() -> Arc<String> {
        Arc::new("IRO1TEST0001".to_string())
    }

    fn enqueue(book: &mut OrderBook, id: u64, side: Side, quantity: Quantity, price: Price) {
        book.enqueue(Order::limit(
            OrderId::new(id),
            instrument(),
            side,
            quantity,
            price,
            BrokerId::new(1),
            ShareholderId::new(1),
        ));
    }

    #[test]
    fn empty_or_uncrossed_book_has_no_opening_price() {
        let book = OrderBook::new();
        assert_eq!(opening_price(&book, 15_000), None);

        let mut book = OrderBook::new();
        enqueue(&mut book, 1, Side::Sell, 200, 15_500);
        assert_eq!(opening_price(&book, 15_000), None);

        enqueue(&mut book, 2, Side::Buy, 200, 15_400);
        assert_eq!(opening_price(&book, 15_000), None);
    }

    #[test]
    fn picks_price_closest_to_last_trade_among_max_quantity() {
        let mut book = OrderBook::new();
        enqueue(&mut book, 1, Side::Buy, 100, 15_900);
        enqueue(&mut book, 2, Side::Sell, 100, 15_800);

        // Both 15_800 and 15_900 trade 100 shares; 15_850 (the last price)
        // also qualifies and is closest to itself.
        let opening = opening_price(&book, 15_850).unwrap();
        assert_eq!(opening.price, 15_850);
        assert_eq!(opening.tradable_quantity, 100);

        let opening = opening_price(&book, 15_900).unwrap();
        assert_eq!(opening.price, 15_900);

        let opening = opening_price(&book, 15_810).unwrap();
        assert_eq!(opening.price, 15_810);
    }

    #[test]
    fn maximizing_quantity_beats_closeness() {
        let mut book = OrderBook::new();
        enqueue(&mut book, 1, Side::Buy, 100, 15_900);
        enqueue(&mut book, 2, Side::Buy, 300, 15_800);
        enqueue(&mut book, 3, Side::Sell, 400, 15_800);

        // 15_900 would trade only 100; 15_800 trades 400 despite being
        // further from the last trade.
        let opening = opening_price(&book, 15_900).unwrap();
        assert_eq!(opening.price, 15_800);
        assert_eq!(opening.tradable_quantity, 400);
    }

    #[test]
    fn multi_level_book_maximizes_across_levels() {
        let mut book = OrderBook::new();
        enqueue(&mut book, 1, Side::Buy, 200, 15_700);
        enqueue(&mut book, 2, Side::Buy, 300, 15_600);
        enqueue(&mut book, 3, Side::Sell, 350, 15_600);
        enqueue(&mut book, 4, Side::Sell, 100, 15_700);

        // At 15_600: min(500, 350) = 350. At 15_700: min(200, 450) = 200.
        // Quantity wins over closeness to the last trade of 15_800.
        let opening = opening_price(&book, 15_800).unwrap();
        assert_eq!(opening.price, 15_600);
        assert_eq!(opening.tradable_quantity, 350);
    }

    #[test]
    fn two_level_crossed_book_tracks_the_last_trade() {
        let mut book = OrderBook::new();
        enqueue(&mut book, 1, Side::Sell, 200, 15_800);
        enqueue(&mut book, 2, Side::Sell, 200, 15_810);
        enqueue(&mut book, 3, Side::Buy, 200, 15_900);
        enqueue(&mut book, 4, Side::Buy, 200, 15_910);

        // All 400 shares trade anywhere in 15_810..=15_900. A last price
        // inside that band wins outright as the closest candidate.
        let opening = opening_price(&book, 15_850).unwrap();
        assert_eq!(opening.price, 15_850);
        assert_eq!(opening.tradable_quantity, 400);

        // A last price above the band snaps to its upper edge.
        let opening = opening_price(&book, 15_950).unwrap();
        assert_eq!(opening.price, 15_900);
        assert_eq!(opening.tradable_quantity, 400);

        // A last price below the best ask is no candidate at all and the
        // band's lower edge is the nearest maximal-quantity price.
        let opening = opening_price(&book, 15_750).unwrap();
        assert_eq!(opening.price, 15_810);
        assert_eq!(opening.tradable_quantity, 400);
    }

    #[test]
    fn last_trade_price_admitted_as_candidate() {
        let mut book = OrderBook::new();
        enqueue(&mut book, 1, Side::Buy, 100, 15_820);
        enqueue(&mut book, 2, Side::Sell, 100, 15_780);

        // 15_780 and 15_820 both trade 100 and sit 20 away from 15_800,
        // which trades the same quantity at distance zero.
        let opening = opening_price(&book, 15_800).unwrap();
        assert_eq!(opening.price, 15_800);
        assert_eq!(opening.tradable_quantity, 100);

        // A last price below the best ask is not admitted.
        let opening = opening_price(&book, 15_000).unwrap();
        assert_eq!(opening.price, 15_780);
    }

    #[test]
    fn tradable_quantity_counts_only_visible_iceberg_slice() {
        let mut book = OrderBook::new();
        book.enqueue(Order::iceberg(
            OrderId::new(1),
            instrument(),
            Side::Sell,
            1_000,
            15_800,
            BrokerId::new(1),
            ShareholderId::new(1),
            100,
        ));
        enqueue(&mut book, 2, Side::Buy, 600, 15_800);

        // The hidden 900 shares stay out of the indicative volume.
        assert_eq!(tradable_quantity_at(&book, 15_800), 100);
        let opening = opening_price(&book, 15_800).unwrap();
        assert_eq!(opening.tradable_quantity, 100);
    }

    #[test]
    fn hidden_quantity_does_not_shift_the_opening_price() {
        let mut book = OrderBook::new();
        book.enqueue(Order::iceberg(
            OrderId::new(1),
            instrument(),
            Side::Sell,
            1_000,
            15_700,
            BrokerId::new(1),
            ShareholderId::new(1),
            50,
        ));
        enqueue(&mut book, 2, Side::Sell, 200, 15_800);
        enqueue(&mut book, 3, Side::Buy, 200, 15_800);

        // Visible supply is 50 at 15_700 and 250 at 15_800; with the full
        // remainder counted, 15_700 would win on quantity instead.
        let opening = opening_price(&book, 15_600).unwrap();
        assert_eq!(opening.price, 15_800);
        assert_eq!(opening.tradable_quantity, 200);
    }
}
