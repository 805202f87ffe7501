//! Response types for the commission API.

use crate::policy_source::SnapshotOrigin;
use bizcivitas_commission::{
    CommissionBreakdown, DistributionPolicy, DisplayBreakdown, MembershipPlan, PaymentComponent,
    PlanKind, RoleEarning, ShareMismatch,
};
use serde::Serialize;

/// Shown by the dashboard when no active policy matches the plan.
pub const NO_CONFIG_MESSAGE: &str = "No Commission Config Found";

/// Response from the breakdown endpoint.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownResponse {
    pub success: bool,
    /// `available` or `unavailable`.
    pub status: &'static str,
    pub membership_plan: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_recipient_label: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<CommissionBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<DisplayBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_mismatch: Option<ShareMismatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl BreakdownResponse {
    pub fn available(
        membership_plan: String,
        final_recipient_label: Option<&'static str>,
        breakdown: CommissionBreakdown,
        share_mismatch: Option<ShareMismatch>,
    ) -> Self {
        Self {
            success: true,
            status: "available",
            membership_plan,
            final_recipient_label,
            display: breakdown.to_display(),
            breakdown: Some(breakdown),
            share_mismatch,
            message: None,
        }
    }

    pub fn unavailable(membership_plan: String) -> Self {
        Self {
            success: true,
            status: "unavailable",
            membership_plan,
            final_recipient_label: None,
            breakdown: None,
            display: None,
            share_mismatch: None,
            message: Some(NO_CONFIG_MESSAGE),
        }
    }
}

/// Response from the earnings endpoint. `earning` is `null` when the viewer
/// has no line in the record.
#[derive(Serialize)]
pub struct EarningsResponse {
    pub success: bool,
    pub earning: Option<RoleEarning>,
}

#[derive(Serialize)]
pub struct PoliciesResponse {
    pub success: bool,
    pub origin: SnapshotOrigin,
    pub policies: Vec<DistributionPolicy>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanView {
    pub name: String,
    pub kind: PlanKind,
    pub final_recipient_label: &'static str,
    pub components: Vec<PaymentComponent>,
}

impl From<&MembershipPlan> for PlanView {
    fn from(plan: &MembershipPlan) -> Self {
        Self {
            name: plan.name.clone(),
            kind: plan.kind,
            final_recipient_label: plan.final_recipient_label(),
            components: plan.components.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct PlansResponse {
    pub success: bool,
    pub plans: Vec<PlanView>,
}

/// Response from the health endpoint.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_secs: u64,
    pub requests: u64,
    pub policies: PolicyStats,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyStats {
    pub total: usize,
    pub active: usize,
    pub source: SnapshotOrigin,
    pub last_refresh_secs_ago: u64,
    pub refresh_failures: u64,
}
