//! The clip liquidation control loop.
//!
//! Sequences account and market queries, plans clips, submits them as
//! IOC limit sells with randomized inter-clip delays, and wraps every
//! remote call in a shared retry/backoff policy. Single logical thread
//! of control: no two orders are ever in flight simultaneously.

pub mod delay;
pub mod error;
pub mod liquidator;
pub mod retry;

pub use delay::{DelaySource, FixedDelay, UniformDelay};
pub use error::{EngineError, EngineResult};
pub use liquidator::{
    BalanceSnapshot, ClipOutcome, ClipResult, LiquidationReport, Liquidator, LiquidatorConfig,
    RunOutcome,
};
pub use retry::{with_retries, RetryPolicy};
