//! Commission distribution engine for the BizCivitas membership franchise.
//! Pure logic only: no I/O, no clock, no global state.
//!
//! A membership payment's pre-tax base amount is split across four recipient
//! roles (platform, master franchise, area franchise, final recipient)
//! according to a [`DistributionPolicy`] fetched by the caller.

mod breakdown;
mod catalog;
mod commission;
mod display;
mod error;
mod policy;

pub use breakdown::{
    Calculation, CommissionBreakdown, RoleAmount, calculate_breakdown, calculate_with_warning,
};
pub use catalog::{MembershipPlan, PaymentComponent, PlanKind, final_recipient_label};
pub use commission::{
    Commission, PayoutStatus, RecipientEntry, RoleEarning, Viewer, ViewerRole, earnings_for_role,
};
pub use display::{DisplayBreakdown, display_amount};
pub use error::CommissionError;
pub use policy::{
    DistributionPolicy, RecipientRole, RoleShares, ShareMismatch, select_policy_for_plan,
};
