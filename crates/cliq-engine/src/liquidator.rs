//! Liquidation orchestration.
//!
//! Drives a run through its stages: maintenance check, deposit-address
//! lookup, balance reads, market snapshot, clip planning, the clip loop
//! with randomized pauses, a remainder sweep, and the final balance
//! report. Every network-facing step goes through the retry wrapper.

use crate::delay::DelaySource;
use crate::error::EngineResult;
use crate::retry::{with_retries, RetryPolicy};
use cliq_core::{ClipPlan, OrderStatus, Price, Size};
use cliq_exchange::Exchange;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{error, info, warn};

/// Immutable configuration for one liquidation run.
///
/// Constructed once at startup and passed in; no component reads
/// ambient environment state.
#[derive(Debug, Clone)]
pub struct LiquidatorConfig {
    /// Asset being liquidated, e.g. "ICP".
    pub base_asset: String,
    /// Quote currency received, e.g. "USDT".
    pub quote_asset: String,
    /// Trading pair symbol, e.g. "ICPUSDT".
    pub symbol: String,
    /// Target value of each clip, in quote currency.
    pub clip_notional: Decimal,
    /// Minimum tradable unit; balances at or below this are left alone.
    pub min_clip_qty: Size,
    /// Retry budget for every remote call.
    pub retry: RetryPolicy,
}

/// Balances of the base and quote assets at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceSnapshot {
    pub base: Size,
    pub quote: Size,
}

/// How one clip ended.
#[derive(Debug, Clone)]
pub enum ClipResult {
    /// The order was submitted; its last observed exchange state.
    Executed {
        order_id: u64,
        price: Price,
        status: OrderStatus,
        executed_qty: Size,
    },
    /// The clip never produced an order: a pre-submission snapshot or
    /// the submission itself failed past the retry budget.
    Failed { error: String },
}

/// Record of one executed (or attempted) clip.
#[derive(Debug, Clone)]
pub struct ClipOutcome {
    pub index: u32,
    /// Submitted quantity.
    pub quantity: Size,
    /// True for the final remainder sweep.
    pub sweep: bool,
    pub result: ClipResult,
}

impl ClipOutcome {
    /// Whether the clip's order fully filled.
    pub fn is_filled(&self) -> bool {
        matches!(
            self.result,
            ClipResult::Executed {
                status: OrderStatus::Filled,
                ..
            }
        )
    }
}

/// Terminal state of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Aborted at the maintenance check; nothing else was queried.
    AbortedMaintenance { details: String },
    /// The clip loop ran to completion.
    Completed,
}

/// Final report of a liquidation run.
#[derive(Debug, Clone)]
pub struct LiquidationReport {
    pub outcome: RunOutcome,
    pub clips: Vec<ClipOutcome>,
    pub opening: Option<BalanceSnapshot>,
    pub closing: Option<BalanceSnapshot>,
    /// Total time slept between clips.
    pub total_delay: Duration,
}

impl LiquidationReport {
    fn aborted(details: String) -> Self {
        Self {
            outcome: RunOutcome::AbortedMaintenance { details },
            clips: Vec::new(),
            opening: None,
            closing: None,
            total_delay: Duration::ZERO,
        }
    }
}

/// In-memory state of the clip loop. Never persisted; a process exit
/// loses it by design.
struct RunState {
    remaining: Size,
    clip_index: u32,
    total_delay: Duration,
}

/// The stateful control loop converting a balance into quote currency
/// clip by clip. Strictly sequential: at most one order in flight.
pub struct Liquidator<E: Exchange> {
    exchange: E,
    delays: Box<dyn DelaySource>,
    config: LiquidatorConfig,
}

impl<E: Exchange> Liquidator<E> {
    pub fn new(exchange: E, delays: Box<dyn DelaySource>, config: LiquidatorConfig) -> Self {
        Self {
            exchange,
            delays,
            config,
        }
    }

    /// The underlying exchange. Exposed so tests can inspect recorded
    /// calls after a run.
    pub fn exchange(&self) -> &E {
        &self.exchange
    }

    /// Execute a full liquidation run.
    ///
    /// Returns `Ok` with an aborted report when the asset is under
    /// maintenance. Fails fast on an invalid reference price, before
    /// any order is submitted. A single clip failing past the retry
    /// budget is recorded in the report and the run continues; errors
    /// in the surrounding stages are fatal.
    pub async fn run(&mut self) -> EngineResult<LiquidationReport> {
        let retry = self.config.retry;
        let exchange = &self.exchange;
        let base = self.config.base_asset.as_str();
        let quote = self.config.quote_asset.as_str();
        let symbol = self.config.symbol.as_str();

        info!(base, quote, symbol, "Starting liquidation run");

        // Stage 1: maintenance check. Abort before touching anything else.
        let maintenance = with_retries(retry, "maintenance_status", || {
            exchange.maintenance_status(base)
        })
        .await?;

        if maintenance.is_under_maintenance {
            info!(details = %maintenance.details, "Asset under maintenance, aborting run");
            return Ok(LiquidationReport::aborted(maintenance.details));
        }

        // Stage 2: deposit address, informational only.
        let address =
            with_retries(retry, "deposit_address", || exchange.deposit_address(base)).await?;
        info!(address = %address.address, "Deposit address");
        if let Some(tag) = &address.tag {
            info!(tag = %tag, "Deposit tag");
        }

        // Stage 3: opening balances.
        let opening_base =
            with_retries(retry, "base_balance", || exchange.free_balance(base)).await?;
        let opening_quote =
            with_retries(retry, "quote_balance", || exchange.free_balance(quote)).await?;
        info!(base_balance = %opening_base, quote_balance = %opening_quote, "Opening balances");

        // Stage 4: reference price from the best bid.
        let book = with_retries(retry, "order_book", || exchange.order_book(symbol)).await?;
        let reference_price = book.best_bid().price;

        // Stage 5: plan. A non-positive reference price fails here,
        // before any submission.
        let plan = ClipPlan::build(
            opening_base,
            reference_price,
            self.config.clip_notional,
            self.config.min_clip_qty,
        )?;
        info!(
            clip_count = plan.clip_count,
            per_clip = %plan.per_clip_qty,
            reference_price = %reference_price,
            min_clamped = plan.min_clamped,
            "Clip plan ready"
        );

        // Stages 6-8: the clip loop and remainder sweep.
        let mut state = RunState {
            remaining: opening_base,
            clip_index: 0,
            total_delay: Duration::ZERO,
        };
        let mut clips = Vec::new();

        while state.clip_index < plan.clip_count && state.remaining > self.config.min_clip_qty {
            // Size against the remaining balance, never the static plan.
            let quantity = plan.per_clip_qty.min(state.remaining);
            let outcome = self.execute_clip(state.clip_index, quantity, false).await;
            clips.push(outcome);

            // Decremented by the submitted quantity regardless of fill;
            // shortfalls are reported in the outcome, never re-queued.
            state.remaining = state.remaining - quantity;
            state.clip_index += 1;

            // Another clip follows whenever a tradable remainder is left,
            // whether it runs as a planned clip or as the sweep.
            let more_clips = state.remaining > self.config.min_clip_qty;
            if more_clips {
                let delay = self.delays.next_delay();
                info!(delay_ms = delay.as_millis() as u64, "Waiting before next clip");
                state.total_delay += delay;
                tokio::time::sleep(delay).await;
            }
        }

        if state.remaining > self.config.min_clip_qty {
            let quantity = state.remaining;
            info!(quantity = %quantity, "Sweeping remainder");
            let outcome = self.execute_clip(state.clip_index, quantity, true).await;
            clips.push(outcome);
        }

        // Stage 9: final balances and report.
        let closing_base =
            with_retries(retry, "base_balance", || exchange.free_balance(base)).await?;
        let closing_quote =
            with_retries(retry, "quote_balance", || exchange.free_balance(quote)).await?;

        let filled = clips.iter().filter(|c| c.is_filled()).count();
        info!(
            clips = clips.len(),
            filled,
            base_before = %opening_base,
            base_after = %closing_base,
            quote_before = %opening_quote,
            quote_after = %closing_quote,
            "Liquidation run complete"
        );

        Ok(LiquidationReport {
            outcome: RunOutcome::Completed,
            clips,
            opening: Some(BalanceSnapshot {
                base: opening_base,
                quote: opening_quote,
            }),
            closing: Some(BalanceSnapshot {
                base: closing_base,
                quote: closing_quote,
            }),
            total_delay: state.total_delay,
        })
    }

    /// Execute one clip: fresh snapshot, depth-walked price, IOC limit
    /// sell, one status poll.
    ///
    /// A failure past the retry budget is absorbed at the clip boundary
    /// and recorded in the outcome; the run continues with the next
    /// clip.
    async fn execute_clip(&self, index: u32, quantity: Size, sweep: bool) -> ClipOutcome {
        let retry = self.config.retry;
        let exchange = &self.exchange;
        let symbol = self.config.symbol.as_str();

        // The book can move between clips; always re-fetch.
        let book = match with_retries(retry, "clip_order_book", || exchange.order_book(symbol))
            .await
        {
            Ok(book) => book,
            Err(e) => {
                error!(clip = index, error = %e, "Clip order book fetch failed");
                return ClipOutcome {
                    index,
                    quantity,
                    sweep,
                    result: ClipResult::Failed {
                        error: e.to_string(),
                    },
                };
            }
        };

        let depth_quote = book.execution_price(quantity);
        if !depth_quote.covers(quantity) {
            // Documented fallback, not a failure: sell into what is there.
            warn!(
                clip = index,
                requested = %quantity,
                available = %depth_quote.available,
                "Visible depth does not cover clip, using worst available price"
            );
        }

        info!(
            clip = index,
            quantity = %quantity,
            price = %depth_quote.price,
            sweep,
            "Submitting clip"
        );

        let submitted = match with_retries(retry, "submit_ioc_sell", || {
            exchange.submit_ioc_sell(symbol, quantity, depth_quote.price)
        })
        .await
        {
            Ok(order) => order,
            Err(e) => {
                error!(clip = index, error = %e, "Clip submission failed");
                return ClipOutcome {
                    index,
                    quantity,
                    sweep,
                    result: ClipResult::Failed {
                        error: e.to_string(),
                    },
                };
            }
        };

        info!(clip = index, order_id = submitted.order_id, "Clip order placed");

        // One poll; fill shortfalls are reported, never re-queued. Only
        // the status check itself is retried, not the submission.
        let observed = match with_retries(retry, "order_status", || {
            exchange.order_status(symbol, submitted.order_id)
        })
        .await
        {
            Ok(order) => order,
            Err(e) => {
                warn!(
                    clip = index,
                    order_id = submitted.order_id,
                    error = %e,
                    "Status poll failed, reporting submission snapshot"
                );
                submitted
            }
        };

        if observed.status == OrderStatus::Filled {
            info!(
                clip = index,
                order_id = observed.order_id,
                quantity = %quantity,
                price = %depth_quote.price,
                "Clip filled"
            );
        } else {
            info!(
                clip = index,
                order_id = observed.order_id,
                status = %observed.status,
                executed_qty = %observed.executed_qty,
                "Clip not fully filled"
            );
        }

        ClipOutcome {
            index,
            quantity,
            sweep,
            result: ClipResult::Executed {
                order_id: observed.order_id,
                price: depth_quote.price,
                status: observed.status,
                executed_qty: observed.executed_qty,
            },
        }
    }
}
