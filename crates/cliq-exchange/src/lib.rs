//! Binance REST collaborator for the clip liquidation engine.
//!
//! Provides authenticated request signing, typed response decoding, and
//! the `Exchange` trait the engine is driven through. The engine never
//! talks to the wire directly; it sees the six operations of the
//! collaborator contract and a structured error carrying the exchange
//! error code and request URL for diagnostics.

pub mod api;
pub mod client;
pub mod credentials;
pub mod error;
pub mod responses;
pub mod signer;

pub use api::{BoxFuture, DepositAddress, Exchange, MaintenanceStatus};
pub use client::BinanceClient;
pub use credentials::ApiCredentials;
pub use error::{ExchangeError, ExchangeResult};
pub use signer::RequestSigner;
