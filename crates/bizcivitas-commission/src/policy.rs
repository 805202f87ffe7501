//! Distribution policies and plan-to-policy selection.

use serde::{Deserialize, Serialize};

use crate::CommissionError;

/// Tolerance for comparing summed shares against the pool percentage.
const SHARE_SUM_EPSILON: f64 = 1e-9;

/// The four fixed recipient roles of a commission split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecipientRole {
    /// Super Admin.
    Platform,
    MasterFranchise,
    AreaFranchise,
    /// Core Member (offline plans) or DCP (digital plan).
    FinalRecipient,
}

impl RecipientRole {
    pub const ALL: [RecipientRole; 4] = [
        RecipientRole::Platform,
        RecipientRole::MasterFranchise,
        RecipientRole::AreaFranchise,
        RecipientRole::FinalRecipient,
    ];
}

/// Percentage of the base amount owed to each role (`12.0` means 12%).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleShares {
    pub platform: f64,
    #[serde(alias = "master_franchise")]
    pub master_franchise: f64,
    #[serde(alias = "area_franchise")]
    pub area_franchise: f64,
    #[serde(alias = "final_recipient")]
    pub final_recipient: f64,
}

impl RoleShares {
    pub fn get(&self, role: RecipientRole) -> f64 {
        match role {
            RecipientRole::Platform => self.platform,
            RecipientRole::MasterFranchise => self.master_franchise,
            RecipientRole::AreaFranchise => self.area_franchise,
            RecipientRole::FinalRecipient => self.final_recipient,
        }
    }

    pub fn total(&self) -> f64 {
        self.platform + self.master_franchise + self.area_franchise + self.final_recipient
    }
}

/// Commission distribution policy for one membership plan.
/// Owned by the backend; this crate only reads it.
///
/// Backend records are camelCase; snake_case is accepted for config files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionPolicy {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(alias = "membership_plan_id")]
    pub membership_plan_id: String,
    #[serde(alias = "total_pool_percentage")]
    pub total_pool_percentage: f64,
    pub shares: RoleShares,
    #[serde(default, alias = "is_active")]
    pub is_active: bool,
}

/// Role shares that do not add up to the pool percentage.
///
/// Reported, never corrected: the gap may be an intentional
/// "platform keeps the difference" configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareMismatch {
    pub shares_total: f64,
    pub total_pool_percentage: f64,
    /// `shares_total - total_pool_percentage`.
    pub difference: f64,
}

impl DistributionPolicy {
    /// Check every percentage is finite and within 0–100.
    pub fn validate(&self) -> Result<(), CommissionError> {
        let fields = [
            ("totalPoolPercentage", self.total_pool_percentage),
            ("shares.platform", self.shares.platform),
            ("shares.masterFranchise", self.shares.master_franchise),
            ("shares.areaFranchise", self.shares.area_franchise),
            ("shares.finalRecipient", self.shares.final_recipient),
        ];
        for (field, value) in fields {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(CommissionError::InvalidPercentage { field, value });
            }
        }
        Ok(())
    }

    pub fn share_mismatch(&self) -> Option<ShareMismatch> {
        let shares_total = self.shares.total();
        let difference = shares_total - self.total_pool_percentage;
        (difference.abs() > SHARE_SUM_EPSILON).then_some(ShareMismatch {
            shares_total,
            total_pool_percentage: self.total_pool_percentage,
            difference,
        })
    }
}

/// First active policy whose plan id equals `plan_name`, in list order.
pub fn select_policy_for_plan<'a>(
    policies: &'a [DistributionPolicy],
    plan_name: &str,
) -> Option<&'a DistributionPolicy> {
    policies
        .iter()
        .find(|p| p.is_active && p.membership_plan_id == plan_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(plan: &str, active: bool, platform: f64) -> DistributionPolicy {
        DistributionPolicy {
            id: None,
            membership_plan_id: plan.into(),
            total_pool_percentage: 27.0,
            shares: RoleShares {
                platform,
                master_franchise: 12.0,
                area_franchise: 5.0,
                final_recipient: 10.0,
            },
            is_active: active,
        }
    }

    #[test]
    fn test_select_skips_inactive() {
        let policies = vec![policy("Flagship Membership", false, 12.0)];
        assert!(select_policy_for_plan(&policies, "Flagship Membership").is_none());
    }

    #[test]
    fn test_select_first_active_wins() {
        let policies = vec![
            policy("Flagship Membership", false, 1.0),
            policy("Flagship Membership", true, 2.0),
            policy("Flagship Membership", true, 3.0),
        ];
        let selected = select_policy_for_plan(&policies, "Flagship Membership").unwrap();
        assert_eq!(selected.shares.platform, 2.0);
    }

    #[test]
    fn test_select_unknown_plan() {
        let policies = vec![policy("Flagship Membership", true, 12.0)];
        assert!(select_policy_for_plan(&policies, "Unknown Plan").is_none());
        assert!(select_policy_for_plan(&[], "Flagship Membership").is_none());
    }

    #[test]
    fn test_select_is_exact_match() {
        let policies = vec![policy("Digital Membership", true, 12.0)];
        assert!(select_policy_for_plan(&policies, "digital membership").is_none());
        assert!(select_policy_for_plan(&policies, "Digital Membership ").is_none());
    }

    #[test]
    fn test_share_mismatch_reported() {
        // 12 + 12 + 5 + 10 = 39 vs pool 27
        let mismatch = policy("Flagship Membership", true, 12.0)
            .share_mismatch()
            .unwrap();
        assert_eq!(mismatch.shares_total, 39.0);
        assert_eq!(mismatch.total_pool_percentage, 27.0);
        assert_eq!(mismatch.difference, 12.0);
    }

    #[test]
    fn test_share_mismatch_none_when_consistent() {
        let mut p = policy("Core Membership", true, 0.0);
        p.total_pool_percentage = 27.0;
        assert!(p.share_mismatch().is_none());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut p = policy("Core Membership", true, 12.0);
        assert!(p.validate().is_ok());

        p.shares.area_franchise = -1.0;
        assert_eq!(
            p.validate(),
            Err(CommissionError::InvalidPercentage {
                field: "shares.areaFranchise",
                value: -1.0
            })
        );

        p.shares.area_franchise = 5.0;
        p.total_pool_percentage = f64::NAN;
        assert!(matches!(
            p.validate(),
            Err(CommissionError::InvalidPercentage { field: "totalPoolPercentage", .. })
        ));
    }

    #[test]
    fn test_deserialize_backend_record() {
        let json = r#"{
            "_id": "65f0c1",
            "membershipPlanId": "Flagship Membership",
            "totalPoolPercentage": 27,
            "shares": {
                "platform": 12,
                "masterFranchise": 12,
                "areaFranchise": 5,
                "finalRecipient": 10
            },
            "isActive": true
        }"#;
        let p: DistributionPolicy = serde_json::from_str(json).unwrap();
        assert_eq!(p.id.as_deref(), Some("65f0c1"));
        assert_eq!(p.membership_plan_id, "Flagship Membership");
        assert_eq!(p.shares.get(RecipientRole::AreaFranchise), 5.0);
        assert!(p.is_active);
    }

    #[test]
    fn test_missing_is_active_defaults_to_inactive() {
        let json = r#"{
            "membershipPlanId": "Digital Membership",
            "totalPoolPercentage": 20,
            "shares": {"platform": 5, "masterFranchise": 5, "areaFranchise": 5, "finalRecipient": 5}
        }"#;
        let p: DistributionPolicy = serde_json::from_str(json).unwrap();
        assert!(!p.is_active);
    }

    #[test]
    fn test_deserialize_snake_case_config() {
        let json = r#"{
            "membership_plan_id": "Core Membership",
            "total_pool_percentage": 27,
            "is_active": true,
            "shares": {"platform": 0, "master_franchise": 12, "area_franchise": 5, "final_recipient": 10}
        }"#;
        let p: DistributionPolicy = serde_json::from_str(json).unwrap();
        assert_eq!(p.shares.final_recipient, 10.0);
        assert!(p.is_active);
        assert!(p.share_mismatch().is_none());
    }
}
