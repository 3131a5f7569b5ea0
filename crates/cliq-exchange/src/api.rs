//! The collaborator contract the engine is driven through.
//!
//! Trait-based abstraction over the six remote operations so the
//! orchestrator can be exercised against a scripted implementation in
//! tests without touching the network.

use crate::error::ExchangeResult;
use cliq_core::{Order, OrderBook, Price, Size};
use std::pin::Pin;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Deposit/withdrawal availability for an asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceStatus {
    /// True when deposits or withdrawals are disabled.
    pub is_under_maintenance: bool,
    /// Human-readable summary, e.g. "Deposit: Enabled, Withdraw: Disabled".
    pub details: String,
}

/// Deposit address for an asset, reported for operator information only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositAddress {
    pub address: String,
    /// Memo/tag, when the network requires one.
    pub tag: Option<String>,
}

/// Async exchange operations consumed by the liquidation engine.
///
/// Every method is a single remote call with no retry of its own; the
/// engine wraps each call site in its resilient retry wrapper.
pub trait Exchange: Send + Sync {
    /// Deposit/withdrawal status for an asset. Fails with
    /// `AssetNotFound` when the exchange does not list the asset.
    fn maintenance_status<'a>(
        &'a self,
        asset: &'a str,
    ) -> BoxFuture<'a, ExchangeResult<MaintenanceStatus>>;

    /// Deposit address for an asset.
    fn deposit_address<'a>(
        &'a self,
        asset: &'a str,
    ) -> BoxFuture<'a, ExchangeResult<DepositAddress>>;

    /// Free (unlocked) balance of an asset. Fails with
    /// `BalanceNotFound` when the account has no entry for it.
    fn free_balance<'a>(&'a self, asset: &'a str) -> BoxFuture<'a, ExchangeResult<Size>>;

    /// Current bid-side depth snapshot for a trading pair.
    fn order_book<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, ExchangeResult<OrderBook>>;

    /// Submit a limit sell with immediate-or-cancel semantics: the order
    /// fills against currently visible liquidity or is canceled, never
    /// resting on the book.
    fn submit_ioc_sell<'a>(
        &'a self,
        symbol: &'a str,
        quantity: Size,
        price: Price,
    ) -> BoxFuture<'a, ExchangeResult<Order>>;

    /// Current snapshot of a previously submitted order.
    fn order_status<'a>(
        &'a self,
        symbol: &'a str,
        order_id: u64,
    ) -> BoxFuture<'a, ExchangeResult<Order>>;
}
