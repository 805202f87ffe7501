//! Whole-unit rounding for presentation. Calculations keep full precision.

use serde::Serialize;

use crate::{CommissionBreakdown, RecipientRole};

/// -2^63 and 2^63, both exactly representable as f64.
const I64_MIN_F64: f64 = -9_223_372_036_854_775_808.0;
const I64_END_F64: f64 = 9_223_372_036_854_775_808.0;

/// Round to the nearest whole currency unit, half away from zero.
///
/// `None` when the rounded amount does not fit in an `i64`; a cast would
/// silently saturate.
pub fn display_amount(amount: f64) -> Option<i64> {
    let rounded = amount.round();
    (rounded.is_finite() && (I64_MIN_F64..I64_END_F64).contains(&rounded))
        .then_some(rounded as i64)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayBreakdown {
    pub base_amount: i64,
    pub platform: i64,
    pub master_franchise: i64,
    pub area_franchise: i64,
    pub final_recipient: i64,
    pub total_pool_amount: i64,
    pub platform_residual: i64,
}

impl CommissionBreakdown {
    /// Whole-unit view, or `None` if any amount is too large to display.
    pub fn to_display(&self) -> Option<DisplayBreakdown> {
        let role = |r| display_amount(self.share(r).amount);
        Some(DisplayBreakdown {
            base_amount: display_amount(self.base_amount())?,
            platform: role(RecipientRole::Platform)?,
            master_franchise: role(RecipientRole::MasterFranchise)?,
            area_franchise: role(RecipientRole::AreaFranchise)?,
            final_recipient: role(RecipientRole::FinalRecipient)?,
            total_pool_amount: display_amount(self.total_pool_amount())?,
            platform_residual: display_amount(self.platform_residual())?,
        })
    }
}
