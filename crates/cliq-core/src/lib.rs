//! Core domain types for the clip liquidation engine.
//!
//! This crate provides the pure parts of the system:
//! - `Price`, `Size`: precision-safe numeric types
//! - `OrderBook`: bid-side depth snapshot with the depth-walking price estimate
//! - `ClipPlan`: partitioning of a balance into clip-sized orders
//! - Order enums and the exchange order snapshot
//!
//! Nothing in this crate performs I/O.

pub mod book;
pub mod decimal;
pub mod error;
pub mod order;
pub mod plan;

pub use book::{BookLevel, DepthQuote, OrderBook};
pub use decimal::{Price, Size};
pub use error::{CoreError, Result};
pub use order::{ClientOrderId, Order, OrderSide, OrderStatus, OrderType, TimeInForce};
pub use plan::ClipPlan;
