//! Commission breakdown calculation.

use serde::Serialize;

use crate::{CommissionError, DistributionPolicy, RecipientRole, ShareMismatch};

/// One role's share of a breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoleAmount {
    pub percentage: f64,
    pub amount: f64,
}

impl RoleAmount {
    fn of(base_amount: f64, percentage: f64) -> Self {
        Self {
            percentage,
            amount: base_amount * percentage / 100.0,
        }
    }
}

/// Absolute amounts owed per role for one base amount.
///
/// Each role amount is derived from its own percentage. The pool is derived
/// from `total_pool_percentage`, so it need not equal the sum of the roles.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionBreakdown {
    base_amount: f64,
    platform: RoleAmount,
    master_franchise: RoleAmount,
    area_franchise: RoleAmount,
    final_recipient: RoleAmount,
    total_pool_percentage: f64,
    total_pool_amount: f64,
    platform_residual: f64,
}

impl CommissionBreakdown {
    fn compute(base_amount: f64, policy: &DistributionPolicy) -> Self {
        let shares = &policy.shares;
        let total_pool_amount = base_amount * policy.total_pool_percentage / 100.0;
        Self {
            base_amount,
            platform: RoleAmount::of(base_amount, shares.platform),
            master_franchise: RoleAmount::of(base_amount, shares.master_franchise),
            area_franchise: RoleAmount::of(base_amount, shares.area_franchise),
            final_recipient: RoleAmount::of(base_amount, shares.final_recipient),
            total_pool_percentage: policy.total_pool_percentage,
            total_pool_amount,
            platform_residual: base_amount - total_pool_amount,
        }
    }

    /// Every derived amount is finite. Fails when `base * pct` overflows.
    fn is_finite(&self) -> bool {
        RecipientRole::ALL
            .iter()
            .all(|role| self.share(*role).amount.is_finite())
            && self.total_pool_amount.is_finite()
            && self.platform_residual.is_finite()
    }

    pub fn base_amount(&self) -> f64 {
        self.base_amount
    }

    pub fn share(&self, role: RecipientRole) -> RoleAmount {
        match role {
            RecipientRole::Platform => self.platform,
            RecipientRole::MasterFranchise => self.master_franchise,
            RecipientRole::AreaFranchise => self.area_franchise,
            RecipientRole::FinalRecipient => self.final_recipient,
        }
    }

    pub fn total_pool_percentage(&self) -> f64 {
        self.total_pool_percentage
    }

    pub fn total_pool_amount(&self) -> f64 {
        self.total_pool_amount
    }

    pub fn platform_residual(&self) -> f64 {
        self.platform_residual
    }
}

/// Result of a calculation request.
#[derive(Debug, Clone, PartialEq)]
pub enum Calculation {
    Breakdown(CommissionBreakdown),
    /// No active policy for the selected plan. An expected state, e.g. no
    /// plan picked yet; callers show "No Commission Config Found".
    PolicyUnavailable,
}

impl Calculation {
    pub fn breakdown(&self) -> Option<&CommissionBreakdown> {
        match self {
            Self::Breakdown(b) => Some(b),
            Self::PolicyUnavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Breakdown(_))
    }
}

/// Split `base_amount` across the policy's roles.
///
/// An invalid amount is rejected even when no policy is selected, as is an
/// amount large enough that a derived amount overflows.
pub fn calculate_breakdown(
    base_amount: f64,
    policy: Option<&DistributionPolicy>,
) -> Result<Calculation, CommissionError> {
    if !base_amount.is_finite() || base_amount < 0.0 {
        return Err(CommissionError::InvalidAmount(base_amount));
    }
    match policy {
        Some(policy) if policy.is_active => {
            let breakdown = CommissionBreakdown::compute(base_amount, policy);
            if !breakdown.is_finite() {
                return Err(CommissionError::InvalidAmount(base_amount));
            }
            Ok(Calculation::Breakdown(breakdown))
        }
        _ => Ok(Calculation::PolicyUnavailable),
    }
}

/// Breakdown plus the optional share-sum warning for its policy.
pub fn calculate_with_warning(
    base_amount: f64,
    policy: Option<&DistributionPolicy>,
) -> Result<(Calculation, Option<ShareMismatch>), CommissionError> {
    let calculation = calculate_breakdown(base_amount, policy)?;
    let warning = match &calculation {
        Calculation::Breakdown(_) => policy.and_then(DistributionPolicy::share_mismatch),
        Calculation::PolicyUnavailable => None,
    };
    Ok((calculation, warning))
}
