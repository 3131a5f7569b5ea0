//! Binance API response types.

use cliq_core::{OrderSide, OrderStatus, OrderType, TimeInForce};
use rust_decimal::Decimal;
use serde::Deserialize;

/// One entry from GET /sapi/v1/capital/config/getall.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinConfig {
    pub coin: String,
    pub deposit_all_enable: bool,
    pub withdraw_all_enable: bool,
}

/// Response from GET /sapi/v1/capital/deposit/address.
#[derive(Debug, Clone, Deserialize)]
pub struct DepositAddressResponse {
    pub address: String,
    /// Empty string when the network has no memo/tag.
    #[serde(default)]
    pub tag: String,
}

/// One balance entry from GET /api/v3/account.
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceEntry {
    pub asset: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub free: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub locked: Decimal,
}

/// Response from GET /api/v3/account.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountResponse {
    pub balances: Vec<BalanceEntry>,
}

/// Response from GET /api/v3/depth.
///
/// Levels arrive as `["price", "qty"]` string pairs; parsing into
/// decimals happens when the domain `OrderBook` is built so that a
/// malformed level surfaces as a market-data error, not a panic.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthResponse {
    pub last_update_id: u64,
    pub bids: Vec<(String, String)>,
    #[serde(default)]
    pub asks: Vec<(String, String)>,
}

/// Response from POST /api/v3/order and GET /api/v3/order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub symbol: String,
    pub order_id: u64,
    pub client_order_id: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub orig_qty: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub executed_qty: Decimal,
    pub status: OrderStatus,
    pub time_in_force: TimeInForce,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub side: OrderSide,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_coin_config_decoding() {
        let json = r#"{"coin":"ICP","depositAllEnable":true,"withdrawAllEnable":false,"name":"Internet Computer"}"#;
        let cfg: CoinConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.coin, "ICP");
        assert!(cfg.deposit_all_enable);
        assert!(!cfg.withdraw_all_enable);
    }

    #[test]
    fn test_depth_decoding() {
        let json = r#"{"lastUpdateId":42,"bids":[["5.00","3.0"],["4.99","2.0"]],"asks":[["5.01","1.0"]]}"#;
        let depth: DepthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(depth.last_update_id, 42);
        assert_eq!(depth.bids.len(), 2);
        assert_eq!(depth.bids[0].0, "5.00");
    }

    #[test]
    fn test_order_response_decoding() {
        let json = r#"{
            "symbol":"ICPUSDT","orderId":12345,"orderListId":-1,
            "clientOrderId":"cliq_1_abc","transactTime":1700000000000,
            "price":"4.98000000","origQty":"4.00000000","executedQty":"4.00000000",
            "cummulativeQuoteQty":"19.92000000","status":"FILLED",
            "timeInForce":"IOC","type":"LIMIT","side":"SELL"
        }"#;
        let order: OrderResponse = serde_json::from_str(json).unwrap();
        assert_eq!(order.order_id, 12345);
        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(order.time_in_force, TimeInForce::ImmediateOrCancel);
        assert_eq!(order.side, OrderSide::Sell);
        assert_eq!(order.executed_qty, dec!(4));
        assert_eq!(order.orig_qty, dec!(4));
    }

    #[test]
    fn test_account_balance_decoding() {
        let json = r#"{"balances":[{"asset":"ICP","free":"10.50000000","locked":"0.00000000"}]}"#;
        let account: AccountResponse = serde_json::from_str(json).unwrap();
        assert_eq!(account.balances[0].asset, "ICP");
        assert_eq!(account.balances[0].free, dec!(10.5));
    }
}
