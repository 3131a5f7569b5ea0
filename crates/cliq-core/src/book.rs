//! Bid-side order book snapshot and the depth-walking price estimate.

use crate::error::{CoreError, Result};
use crate::{Price, Size};
use serde::{Deserialize, Serialize};

/// One bid level: outstanding buy interest at a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: Price,
    pub qty: Size,
}

impl BookLevel {
    pub fn new(price: Price, qty: Size) -> Self {
        Self { price, qty }
    }
}

/// Result of walking the book for a target quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthQuote {
    /// Price of the last level needed to cover the quantity; the worst
    /// price an aggressive sell of that size would touch.
    pub price: Price,
    /// Depth accumulated up to and including that level. Less than the
    /// requested quantity when the book is too thin.
    pub available: Size,
}

impl DepthQuote {
    /// Whether visible depth covered the requested quantity.
    pub fn covers(&self, qty: Size) -> bool {
        self.available >= qty
    }
}

/// Bid side of an order book, best bid first.
///
/// Construction enforces the snapshot invariants: non-empty, positive
/// prices and quantities, strictly decreasing prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBook {
    bids: Vec<BookLevel>,
}

impl OrderBook {
    /// Build a snapshot from bid levels, best bid first.
    pub fn from_bids(bids: Vec<BookLevel>) -> Result<Self> {
        if bids.is_empty() {
            return Err(CoreError::InvalidMarketData(
                "order book has no bid levels".to_string(),
            ));
        }

        for window in bids.windows(2) {
            if window[1].price >= window[0].price {
                return Err(CoreError::InvalidMarketData(format!(
                    "bid prices not strictly decreasing: {} then {}",
                    window[0].price, window[1].price
                )));
            }
        }

        for level in &bids {
            if !level.price.is_positive() || !level.qty.is_positive() {
                return Err(CoreError::InvalidMarketData(format!(
                    "non-positive bid level: {} x {}",
                    level.price, level.qty
                )));
            }
        }

        Ok(Self { bids })
    }

    /// Best (highest) bid level.
    pub fn best_bid(&self) -> &BookLevel {
        // Invariant: bids is non-empty after construction.
        &self.bids[0]
    }

    pub fn bids(&self) -> &[BookLevel] {
        &self.bids
    }

    /// Depth-walking execution price estimate for an aggressive sell of
    /// size `qty`.
    ///
    /// Accumulates quantity from the best bid downward and returns the
    /// price of the first level at which the prefix sum reaches `qty` —
    /// the worst price such an order would touch, not a volume-weighted
    /// average. When visible depth never reaches `qty`, the worst (last)
    /// level's price is returned with `available < qty`; the caller
    /// decides whether that shortfall is acceptable.
    pub fn execution_price(&self, qty: Size) -> DepthQuote {
        let mut accumulated = Size::ZERO;
        let mut last = self.best_bid();

        for level in &self.bids {
            accumulated = accumulated + level.qty;
            last = level;
            if accumulated >= qty {
                break;
            }
        }

        DepthQuote {
            price: last.price,
            available: accumulated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn level(price: rust_decimal::Decimal, qty: rust_decimal::Decimal) -> BookLevel {
        BookLevel::new(Price::new(price), Size::new(qty))
    }

    fn deep_book() -> OrderBook {
        OrderBook::from_bids(vec![
            level(dec!(5.00), dec!(3)),
            level(dec!(4.99), dec!(2)),
            level(dec!(4.95), dec!(10)),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_book_rejected() {
        let err = OrderBook::from_bids(vec![]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidMarketData(_)));
    }

    #[test]
    fn test_non_decreasing_bids_rejected() {
        let err = OrderBook::from_bids(vec![
            level(dec!(4.99), dec!(1)),
            level(dec!(5.00), dec!(1)),
        ])
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidMarketData(_)));
    }

    #[test]
    fn test_non_positive_level_rejected() {
        let err = OrderBook::from_bids(vec![level(dec!(5), dec!(0))]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidMarketData(_)));
    }

    #[test]
    fn test_walk_covered_by_best_level() {
        let quote = deep_book().execution_price(Size::new(dec!(2)));
        assert_eq!(quote.price, Price::new(dec!(5.00)));
        assert_eq!(quote.available, Size::new(dec!(3)));
        assert!(quote.covers(Size::new(dec!(2))));
    }

    #[test]
    fn test_walk_stops_at_first_covering_level() {
        // 3 + 2 = 5 covers 4, so the second level's price is the answer.
        let quote = deep_book().execution_price(Size::new(dec!(4)));
        assert_eq!(quote.price, Price::new(dec!(4.99)));
        assert_eq!(quote.available, Size::new(dec!(5)));
    }

    #[test]
    fn test_walk_exact_boundary() {
        let quote = deep_book().execution_price(Size::new(dec!(3)));
        assert_eq!(quote.price, Price::new(dec!(5.00)));
    }

    #[test]
    fn test_thin_book_returns_worst_price_with_shortfall() {
        let quote = deep_book().execution_price(Size::new(dec!(100)));
        assert_eq!(quote.price, Price::new(dec!(4.95)));
        assert_eq!(quote.available, Size::new(dec!(15)));
        assert!(!quote.covers(Size::new(dec!(100))));
    }

    #[test]
    fn test_zero_quantity_quotes_best_bid() {
        let quote = deep_book().execution_price(Size::ZERO);
        assert_eq!(quote.price, Price::new(dec!(5.00)));
    }
}
