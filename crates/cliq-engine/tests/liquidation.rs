//! End-to-end runs of the liquidator against a scripted exchange.

use cliq_core::{
    BookLevel, ClientOrderId, Order, OrderBook, OrderSide, OrderStatus, OrderType, Price, Size,
    TimeInForce,
};
use cliq_engine::{
    ClipResult, EngineError, FixedDelay, Liquidator, LiquidatorConfig, RetryPolicy, RunOutcome,
};
use cliq_exchange::{
    BoxFuture, DepositAddress, Exchange, ExchangeError, ExchangeResult, MaintenanceStatus,
};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Default)]
struct CallCounts {
    maintenance: usize,
    deposit_address: usize,
    balance: usize,
    order_book: usize,
    submit: usize,
    status: usize,
}

/// Scripted exchange: fixed balances and book, configurable maintenance
/// state, optional submission failures, and full call recording.
struct MockExchange {
    under_maintenance: bool,
    balances: HashMap<String, Size>,
    book: OrderBook,
    /// Number of submissions to reject before accepting.
    failing_submits: Mutex<u32>,
    /// Status reported when an accepted order is polled.
    fill_status: OrderStatus,
    submissions: Mutex<Vec<(Size, Price)>>,
    calls: Mutex<CallCounts>,
}

impl MockExchange {
    fn new(book: OrderBook) -> Self {
        Self {
            under_maintenance: false,
            balances: HashMap::new(),
            book,
            failing_submits: Mutex::new(0),
            fill_status: OrderStatus::Filled,
            submissions: Mutex::new(Vec::new()),
            calls: Mutex::new(CallCounts::default()),
        }
    }

    fn with_balance(mut self, asset: &str, free: Decimal) -> Self {
        self.balances.insert(asset.to_string(), Size::new(free));
        self
    }

    fn order(&self, order_id: u64, quantity: Size, price: Price, status: OrderStatus) -> Order {
        let executed_qty = match status {
            OrderStatus::Filled => quantity,
            _ => Size::ZERO,
        };
        Order {
            order_id,
            symbol: "ICPUSDT".to_string(),
            client_order_id: ClientOrderId::new(),
            side: OrderSide::Sell,
            order_type: OrderType::Limit,
            time_in_force: TimeInForce::ImmediateOrCancel,
            quantity,
            price,
            executed_qty,
            status,
        }
    }
}

impl Exchange for MockExchange {
    fn maintenance_status<'a>(
        &'a self,
        _asset: &'a str,
    ) -> BoxFuture<'a, ExchangeResult<MaintenanceStatus>> {
        Box::pin(async move {
            self.calls.lock().maintenance += 1;
            Ok(MaintenanceStatus {
                is_under_maintenance: self.under_maintenance,
                details: if self.under_maintenance {
                    "Deposit: Disabled, Withdraw: Disabled".to_string()
                } else {
                    "Deposit: Enabled, Withdraw: Enabled".to_string()
                },
            })
        })
    }

    fn deposit_address<'a>(
        &'a self,
        _asset: &'a str,
    ) -> BoxFuture<'a, ExchangeResult<DepositAddress>> {
        Box::pin(async move {
            self.calls.lock().deposit_address += 1;
            Ok(DepositAddress {
                address: "mock-address".to_string(),
                tag: None,
            })
        })
    }

    fn free_balance<'a>(&'a self, asset: &'a str) -> BoxFuture<'a, ExchangeResult<Size>> {
        Box::pin(async move {
            self.calls.lock().balance += 1;
            self.balances
                .get(asset)
                .copied()
                .ok_or_else(|| ExchangeError::BalanceNotFound(asset.to_string()))
        })
    }

    fn order_book<'a>(&'a self, _symbol: &'a str) -> BoxFuture<'a, ExchangeResult<OrderBook>> {
        Box::pin(async move {
            self.calls.lock().order_book += 1;
            Ok(self.book.clone())
        })
    }

    fn submit_ioc_sell<'a>(
        &'a self,
        _symbol: &'a str,
        quantity: Size,
        price: Price,
    ) -> BoxFuture<'a, ExchangeResult<Order>> {
        Box::pin(async move {
            self.calls.lock().submit += 1;
            let mut failing = self.failing_submits.lock();
            if *failing > 0 {
                *failing -= 1;
                return Err(ExchangeError::Api {
                    code: -1013,
                    message: "Filter failure".to_string(),
                    url: "/api/v3/order".to_string(),
                });
            }
            drop(failing);

            let mut submissions = self.submissions.lock();
            submissions.push((quantity, price));
            let order_id = submissions.len() as u64;
            Ok(self.order(order_id, quantity, price, OrderStatus::New))
        })
    }

    fn order_status<'a>(
        &'a self,
        _symbol: &'a str,
        order_id: u64,
    ) -> BoxFuture<'a, ExchangeResult<Order>> {
        Box::pin(async move {
            self.calls.lock().status += 1;
            let submissions = self.submissions.lock();
            let (quantity, price) = submissions[order_id as usize - 1];
            Ok(self.order(order_id, quantity, price, self.fill_status))
        })
    }
}

fn level(price: Decimal, qty: Decimal) -> BookLevel {
    BookLevel::new(Price::new(price), Size::new(qty))
}

fn deep_book() -> OrderBook {
    OrderBook::from_bids(vec![
        level(dec!(5.00), dec!(6)),
        level(dec!(4.99), dec!(6)),
        level(dec!(4.95), dec!(50)),
    ])
    .unwrap()
}

fn config() -> LiquidatorConfig {
    LiquidatorConfig {
        base_asset: "ICP".to_string(),
        quote_asset: "USDT".to_string(),
        symbol: "ICPUSDT".to_string(),
        clip_notional: dec!(20),
        min_clip_qty: Size::new(dec!(0.1)),
        retry: RetryPolicy {
            max_attempts: 2,
            initial_delay: Duration::from_millis(10),
        },
    }
}

fn liquidator(exchange: MockExchange) -> Liquidator<MockExchange> {
    Liquidator::new(
        exchange,
        Box::new(FixedDelay(Duration::from_millis(500))),
        config(),
    )
}

#[tokio::test(start_paused = true)]
async fn test_maintenance_aborts_before_any_other_call() {
    let mut exchange = MockExchange::new(deep_book()).with_balance("ICP", dec!(10));
    exchange.under_maintenance = true;

    let mut liq = liquidator(exchange);
    let report = liq.run().await.unwrap();

    assert!(matches!(
        report.outcome,
        RunOutcome::AbortedMaintenance { .. }
    ));
    assert!(report.clips.is_empty());
    assert!(report.opening.is_none());
    assert!(report.closing.is_none());
    assert_eq!(report.total_delay, Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_maintenance_abort_skips_balance_and_submission() {
    let mut exchange = MockExchange::new(deep_book()).with_balance("ICP", dec!(10));
    exchange.under_maintenance = true;

    let mut liq = liquidator(exchange);
    liq.run().await.unwrap();

    let calls = liq.exchange().calls.lock();
    assert_eq!(calls.maintenance, 1);
    assert_eq!(calls.deposit_address, 0);
    assert_eq!(calls.balance, 0);
    assert_eq!(calls.order_book, 0);
    assert_eq!(calls.submit, 0);
}

#[tokio::test(start_paused = true)]
async fn test_full_run_clips_then_sweeps_remainder() {
    // 10 ICP at reference 5.00 with 20 USDT clips: two clips of 4, then
    // a 2 ICP sweep.
    let exchange = MockExchange::new(deep_book())
        .with_balance("ICP", dec!(10))
        .with_balance("USDT", dec!(100));

    let mut liq = liquidator(exchange);
    let report = liq.run().await.unwrap();

    assert_eq!(report.outcome, RunOutcome::Completed);
    assert_eq!(report.clips.len(), 3);
    assert_eq!(report.clips[0].quantity, Size::new(dec!(4)));
    assert_eq!(report.clips[1].quantity, Size::new(dec!(4)));
    assert_eq!(report.clips[2].quantity, Size::new(dec!(2)));
    assert!(!report.clips[0].sweep);
    assert!(!report.clips[1].sweep);
    assert!(report.clips[2].sweep);
    assert!(report.clips.iter().all(|c| c.is_filled()));

    let opening = report.opening.unwrap();
    assert_eq!(opening.base, Size::new(dec!(10)));
    assert_eq!(opening.quote, Size::new(dec!(100)));
}

#[tokio::test(start_paused = true)]
async fn test_delay_precedes_every_following_clip() {
    // 4 + 4 + sweep of 2: a pause after each clip that leaves a tradable
    // remainder, including the one before the sweep. No pause after the
    // sweep itself.
    let exchange = MockExchange::new(deep_book())
        .with_balance("ICP", dec!(10))
        .with_balance("USDT", dec!(100));

    let mut liq = liquidator(exchange);
    let report = liq.run().await.unwrap();

    assert_eq!(report.clips.len(), 3);
    assert_eq!(report.total_delay, Duration::from_millis(1000));
}

#[tokio::test(start_paused = true)]
async fn test_no_delay_when_plan_ends_without_remainder() {
    // 8 ICP at 5.00 with 20 USDT clips: exactly two clips of 4, nothing
    // left to sweep, so only the pause between the two clips is slept.
    let exchange = MockExchange::new(deep_book())
        .with_balance("ICP", dec!(8))
        .with_balance("USDT", dec!(100));

    let mut liq = liquidator(exchange);
    let report = liq.run().await.unwrap();

    assert_eq!(report.clips.len(), 2);
    assert!(report.clips.iter().all(|c| !c.sweep));
    assert_eq!(report.total_delay, Duration::from_millis(500));
}

#[tokio::test(start_paused = true)]
async fn test_clip_price_walks_the_book() {
    // A 4 ICP clip needs no more than the 6 at the best bid, so every
    // clip prices at 5.00.
    let exchange = MockExchange::new(deep_book())
        .with_balance("ICP", dec!(10))
        .with_balance("USDT", dec!(100));

    let mut liq = liquidator(exchange);
    liq.run().await.unwrap();

    let submissions = liq.exchange().submissions.lock();
    assert_eq!(submissions.len(), 3);
    for (_, price) in submissions.iter() {
        assert_eq!(*price, Price::new(dec!(5.00)));
    }
}

#[tokio::test(start_paused = true)]
async fn test_thin_book_sells_at_worst_available_price() {
    // Total visible depth 1.5 < per-clip 4: proceed anyway at the last
    // level's price.
    let thin = OrderBook::from_bids(vec![
        level(dec!(5.00), dec!(1)),
        level(dec!(4.90), dec!(0.5)),
    ])
    .unwrap();
    let exchange = MockExchange::new(thin)
        .with_balance("ICP", dec!(10))
        .with_balance("USDT", dec!(100));

    let mut liq = liquidator(exchange);
    let report = liq.run().await.unwrap();

    assert_eq!(report.outcome, RunOutcome::Completed);
    let submissions = liq.exchange().submissions.lock();
    assert!(!submissions.is_empty());
    for (_, price) in submissions.iter() {
        assert_eq!(*price, Price::new(dec!(4.90)));
    }
}

#[tokio::test(start_paused = true)]
async fn test_dust_balance_produces_no_clips() {
    // Balance at the minimum clip size is left alone entirely.
    let exchange = MockExchange::new(deep_book())
        .with_balance("ICP", dec!(0.1))
        .with_balance("USDT", dec!(100));

    let mut liq = liquidator(exchange);
    let report = liq.run().await.unwrap();

    assert_eq!(report.outcome, RunOutcome::Completed);
    assert!(report.clips.is_empty());
    assert_eq!(liq.exchange().submissions.lock().len(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_clip_notional_fails_before_submission() {
    let exchange = MockExchange::new(deep_book())
        .with_balance("ICP", dec!(10))
        .with_balance("USDT", dec!(100));

    let mut cfg = config();
    cfg.clip_notional = Decimal::ZERO;
    let mut liq = Liquidator::new(
        exchange,
        Box::new(FixedDelay(Duration::from_millis(500))),
        cfg,
    );

    let err = liq.run().await.unwrap_err();
    assert!(matches!(err, EngineError::Market(_)));
    assert_eq!(liq.exchange().calls.lock().submit, 0);
}

#[tokio::test(start_paused = true)]
async fn test_failed_clip_is_recorded_and_run_continues() {
    // The first clip's submission fails past the retry budget (2
    // attempts); the run records it and moves on.
    let exchange = MockExchange::new(deep_book())
        .with_balance("ICP", dec!(10))
        .with_balance("USDT", dec!(100));
    *exchange.failing_submits.lock() = 2;

    let mut liq = liquidator(exchange);
    let report = liq.run().await.unwrap();

    assert_eq!(report.outcome, RunOutcome::Completed);
    assert_eq!(report.clips.len(), 3);
    match &report.clips[0].result {
        ClipResult::Failed { error } => assert!(error.contains("-1013")),
        other => panic!("expected failed clip, got {other:?}"),
    }
    assert!(report.clips[1].is_filled());
    assert!(report.clips[2].is_filled());
    // 2 rejected attempts for clip 0, then one accepted submission for
    // each remaining clip.
    assert_eq!(liq.exchange().submissions.lock().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_partial_fill_is_reported_not_retried() {
    let mut exchange = MockExchange::new(deep_book())
        .with_balance("ICP", dec!(10))
        .with_balance("USDT", dec!(100));
    exchange.fill_status = OrderStatus::Expired;

    let mut liq = liquidator(exchange);
    let report = liq.run().await.unwrap();

    assert_eq!(report.outcome, RunOutcome::Completed);
    assert_eq!(report.clips.len(), 3);
    for clip in &report.clips {
        match &clip.result {
            ClipResult::Executed {
                status,
                executed_qty,
                ..
            } => {
                assert_eq!(*status, OrderStatus::Expired);
                assert_eq!(*executed_qty, Size::ZERO);
            }
            other => panic!("expected executed clip, got {other:?}"),
        }
    }
    // Exactly one submission per clip; shortfalls never re-queue.
    assert_eq!(liq.exchange().submissions.lock().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_transient_submit_failure_retried_within_clip() {
    // One rejection, then success inside the same clip's retry budget.
    let exchange = MockExchange::new(deep_book())
        .with_balance("ICP", dec!(10))
        .with_balance("USDT", dec!(100));
    *exchange.failing_submits.lock() = 1;

    let mut liq = liquidator(exchange);
    let report = liq.run().await.unwrap();

    assert!(report.clips.iter().all(|c| c.is_filled()));
    assert_eq!(liq.exchange().calls.lock().submit, 4);
}
