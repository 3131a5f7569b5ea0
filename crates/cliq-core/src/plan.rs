//! Clip planning: partitioning a balance into clip-sized orders.

use crate::error::{CoreError, Result};
use crate::{Price, Size};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fractional digits a clip quantity is rounded to.
const QTY_SCALE: u32 = 8;

/// Plan for liquidating a balance as a bounded sequence of clips.
///
/// The plan is nominal: the orchestrator re-sizes every clip against the
/// *remaining* balance (`min(per_clip_qty, remaining)`), so min-unit
/// clamping can change the number of clips actually executed without
/// ever overshooting the balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipPlan {
    /// Total quantity being liquidated.
    pub total_quantity: Size,
    /// Target value of one clip, in quote currency.
    pub clip_notional: Decimal,
    /// Number of full clips: floor(total * price / notional).
    pub clip_count: u32,
    /// Nominal quantity per clip: round(notional / price), clamped up to
    /// the minimum tradable unit.
    pub per_clip_qty: Size,
    /// True when per_clip_qty was raised to the minimum tradable unit.
    pub min_clamped: bool,
}

impl ClipPlan {
    /// Build a plan from a balance, a reference price and the configured
    /// clip notional.
    ///
    /// # Errors
    /// - `InvalidPrice` when `reference_price` is not strictly positive;
    ///   liquidation must abort rather than divide by zero.
    /// - `InvalidConfig` when the clip notional or minimum unit is not
    ///   strictly positive.
    pub fn build(
        total_quantity: Size,
        reference_price: Price,
        clip_notional: Decimal,
        min_clip_qty: Size,
    ) -> Result<Self> {
        if !reference_price.is_positive() {
            return Err(CoreError::InvalidPrice(format!(
                "reference price must be positive, got {reference_price}"
            )));
        }
        if clip_notional <= Decimal::ZERO {
            return Err(CoreError::InvalidConfig(format!(
                "clip notional must be positive, got {clip_notional}"
            )));
        }
        if !min_clip_qty.is_positive() {
            return Err(CoreError::InvalidConfig(format!(
                "minimum clip quantity must be positive, got {min_clip_qty}"
            )));
        }

        let clip_count = (total_quantity.notional(reference_price) / clip_notional)
            .floor()
            .to_u32()
            .unwrap_or(u32::MAX);

        let nominal = Size::new((clip_notional / reference_price.inner()).round_dp(QTY_SCALE));
        let min_clamped = nominal < min_clip_qty;
        let per_clip_qty = if min_clamped { min_clip_qty } else { nominal };

        Ok(Self {
            total_quantity,
            clip_notional,
            clip_count,
            per_clip_qty,
            min_clamped,
        })
    }
}
