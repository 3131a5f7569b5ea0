//! Authenticated Binance REST client.

use crate::api::{BoxFuture, DepositAddress, Exchange, MaintenanceStatus};
use crate::credentials::ApiCredentials;
use crate::error::{ExchangeError, ExchangeResult};
use crate::responses::{
    AccountResponse, CoinConfig, DepositAddressResponse, DepthResponse, OrderResponse,
};
use crate::signer::RequestSigner;
use cliq_core::{BookLevel, ClientOrderId, CoreError, Order, OrderBook, Price, Size};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Depth levels requested per snapshot.
const DEPTH_LIMIT: u32 = 100;

const CAPITAL_CONFIG_ENDPOINT: &str = "/sapi/v1/capital/config/getall";
const DEPOSIT_ADDRESS_ENDPOINT: &str = "/sapi/v1/capital/deposit/address";
const ACCOUNT_ENDPOINT: &str = "/api/v3/account";
const DEPTH_ENDPOINT: &str = "/api/v3/depth";
const ORDER_ENDPOINT: &str = "/api/v3/order";

/// Binance REST client with HMAC request signing.
pub struct BinanceClient {
    client: Client,
    base_url: String,
    credentials: ApiCredentials,
    recv_window_ms: u64,
}

impl BinanceClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` - REST base URL (e.g. "https://api.binance.com")
    /// * `credentials` - API key and secret for signed endpoints
    /// * `recv_window_ms` - Binance `recvWindow` tolerance for signed calls
    pub fn new(
        base_url: impl Into<String>,
        credentials: ApiCredentials,
        recv_window_ms: u64,
    ) -> ExchangeResult<Self> {
        Self::with_timeout(base_url, credentials, recv_window_ms, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit per-request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        credentials: ApiCredentials,
        recv_window_ms: u64,
        timeout: Duration,
    ) -> ExchangeResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExchangeError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            credentials,
            recv_window_ms,
        })
    }

    fn timestamp_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    /// Diagnostic URL carried on errors: endpoint without the query, so
    /// signatures never end up in logs.
    fn display_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> ExchangeResult<T> {
        let response = request.send().await.map_err(|e| ExchangeError::Transport {
            url: url.to_string(),
            source: e,
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ExchangeError::Transport {
            url: url.to_string(),
            source: e,
        })?;

        if !status.is_success() {
            return Err(decode_api_error(&body, status.as_u16(), url));
        }

        serde_json::from_str(&body).map_err(|e| ExchangeError::Parse {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn signed_get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> ExchangeResult<T> {
        let signer = RequestSigner::new(&self.credentials);
        let query = signer.signed_query(params, Self::timestamp_ms(), self.recv_window_ms);
        let url = format!("{}{}?{}", self.base_url, endpoint, query);

        let request = self
            .client
            .get(&url)
            .header("X-MBX-APIKEY", self.credentials.api_key());

        self.send_json(request, &self.display_url(endpoint)).await
    }

    async fn signed_post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> ExchangeResult<T> {
        let signer = RequestSigner::new(&self.credentials);
        let query = signer.signed_query(params, Self::timestamp_ms(), self.recv_window_ms);
        let url = format!("{}{}?{}", self.base_url, endpoint, query);

        let request = self
            .client
            .post(&url)
            .header("X-MBX-APIKEY", self.credentials.api_key());

        self.send_json(request, &self.display_url(endpoint)).await
    }

    async fn public_get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> ExchangeResult<T> {
        let query = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        let url = format!("{}{}?{}", self.base_url, endpoint, query);

        let request = self.client.get(&url);
        self.send_json(request, &self.display_url(endpoint)).await
    }

    async fn fetch_maintenance_status(&self, asset: &str) -> ExchangeResult<MaintenanceStatus> {
        let coins: Vec<CoinConfig> = self.signed_get(CAPITAL_CONFIG_ENDPOINT, &[]).await?;

        let coin = coins
            .iter()
            .find(|c| c.coin == asset)
            .ok_or_else(|| ExchangeError::AssetNotFound(asset.to_string()))?;

        debug!(asset, deposit = coin.deposit_all_enable, withdraw = coin.withdraw_all_enable, "Fetched coin configuration");
        Ok(maintenance_from(coin))
    }

    async fn fetch_deposit_address(&self, asset: &str) -> ExchangeResult<DepositAddress> {
        let response: DepositAddressResponse = self
            .signed_get(DEPOSIT_ADDRESS_ENDPOINT, &[("coin", asset)])
            .await?;

        let tag = if response.tag.is_empty() {
            None
        } else {
            Some(response.tag)
        };

        Ok(DepositAddress {
            address: response.address,
            tag,
        })
    }

    async fn fetch_free_balance(&self, asset: &str) -> ExchangeResult<Size> {
        let account: AccountResponse = self.signed_get(ACCOUNT_ENDPOINT, &[]).await?;

        let entry = account
            .balances
            .iter()
            .find(|b| b.asset == asset)
            .ok_or_else(|| ExchangeError::BalanceNotFound(asset.to_string()))?;

        Ok(Size::new(entry.free))
    }

    async fn fetch_order_book(&self, symbol: &str) -> ExchangeResult<OrderBook> {
        let limit = DEPTH_LIMIT.to_string();
        let depth: DepthResponse = self
            .public_get(DEPTH_ENDPOINT, &[("symbol", symbol), ("limit", &limit)])
            .await?;

        let mut bids = Vec::with_capacity(depth.bids.len());
        for (price, qty) in &depth.bids {
            let price: Price = price.parse().map_err(CoreError::from)?;
            let qty: Size = qty.parse().map_err(CoreError::from)?;
            bids.push(BookLevel::new(price, qty));
        }

        Ok(OrderBook::from_bids(bids)?)
    }

    async fn place_ioc_sell(
        &self,
        symbol: &str,
        quantity: Size,
        price: Price,
    ) -> ExchangeResult<Order> {
        let client_order_id = ClientOrderId::new();
        let qty_str = quantity.to_wire();
        let price_str = price.to_wire();

        let params = [
            ("symbol", symbol),
            ("side", "SELL"),
            ("type", "LIMIT"),
            ("timeInForce", "IOC"),
            ("quantity", &qty_str),
            ("price", &price_str),
            ("newClientOrderId", client_order_id.as_str()),
            ("newOrderRespType", "RESULT"),
        ];

        let response: OrderResponse = self.signed_post(ORDER_ENDPOINT, &params).await?;
        Ok(order_from_response(response))
    }

    async fn fetch_order_status(&self, symbol: &str, order_id: u64) -> ExchangeResult<Order> {
        let id = order_id.to_string();
        let response: OrderResponse = self
            .signed_get(ORDER_ENDPOINT, &[("symbol", symbol), ("orderId", &id)])
            .await?;

        Ok(order_from_response(response))
    }
}

impl Exchange for BinanceClient {
    fn maintenance_status<'a>(
        &'a self,
        asset: &'a str,
    ) -> BoxFuture<'a, ExchangeResult<MaintenanceStatus>> {
        Box::pin(self.fetch_maintenance_status(asset))
    }

    fn deposit_address<'a>(
        &'a self,
        asset: &'a str,
    ) -> BoxFuture<'a, ExchangeResult<DepositAddress>> {
        Box::pin(self.fetch_deposit_address(asset))
    }

    fn free_balance<'a>(&'a self, asset: &'a str) -> BoxFuture<'a, ExchangeResult<Size>> {
        Box::pin(self.fetch_free_balance(asset))
    }

    fn order_book<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, ExchangeResult<OrderBook>> {
        Box::pin(self.fetch_order_book(symbol))
    }

    fn submit_ioc_sell<'a>(
        &'a self,
        symbol: &'a str,
        quantity: Size,
        price: Price,
    ) -> BoxFuture<'a, ExchangeResult<Order>> {
        Box::pin(self.place_ioc_sell(symbol, quantity, price))
    }

    fn order_status<'a>(
        &'a self,
        symbol: &'a str,
        order_id: u64,
    ) -> BoxFuture<'a, ExchangeResult<Order>> {
        Box::pin(self.fetch_order_status(symbol, order_id))
    }
}

/// Decode a Binance error body (`{"code": -1000, "msg": "..."}`).
fn decode_api_error(body: &str, http_status: u16, url: &str) -> ExchangeError {
    #[derive(serde::Deserialize)]
    struct ApiErrorBody {
        code: i64,
        msg: String,
    }

    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(err) => ExchangeError::Api {
            code: err.code,
            message: err.msg,
            url: url.to_string(),
        },
        Err(_) => ExchangeError::Parse {
            url: url.to_string(),
            message: format!("HTTP {http_status}: {body}"),
        },
    }
}

/// Maintenance judgment: under maintenance when deposits or withdrawals
/// are disabled.
fn maintenance_from(coin: &CoinConfig) -> MaintenanceStatus {
    let enabled = |flag: bool| if flag { "Enabled" } else { "Disabled" };
    MaintenanceStatus {
        is_under_maintenance: !coin.deposit_all_enable || !coin.withdraw_all_enable,
        details: format!(
            "Deposit: {}, Withdraw: {}",
            enabled(coin.deposit_all_enable),
            enabled(coin.withdraw_all_enable)
        ),
    }
}

fn order_from_response(response: OrderResponse) -> Order {
    Order {
        order_id: response.order_id,
        symbol: response.symbol,
        client_order_id: ClientOrderId::from_string(response.client_order_id),
        side: response.side,
        order_type: response.order_type,
        time_in_force: response.time_in_force,
        quantity: Size::new(response.orig_qty),
        price: Price::new(response.price),
        executed_qty: Size::new(response.executed_qty),
        status: response.status,
    }
}
