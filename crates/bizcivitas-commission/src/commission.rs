//! Persisted commission records and per-viewer earnings lookup.

use serde::{Deserialize, Serialize};

use crate::{CommissionBreakdown, RecipientRole};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutStatus {
    #[default]
    Pending,
    Done,
}

/// One recipient's line of a commission record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    pub percentage: f64,
    pub amount: f64,
    #[serde(default)]
    pub status: PayoutStatus,
}

/// A commission as stored by the backend.
///
/// `overall_status` is owned by payment tracking and passed through as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commission {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membership_plan: Option<String>,
    pub base_amount: f64,
    pub platform: RecipientEntry,
    pub master_franchise: RecipientEntry,
    pub area_franchise: RecipientEntry,
    pub final_recipient: RecipientEntry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_status: Option<String>,
}

impl Commission {
    /// New record from a fresh breakdown; every entry starts `Pending`.
    /// `recipients` is indexed like [`RecipientRole::ALL`].
    pub fn draft(
        breakdown: &CommissionBreakdown,
        membership_plan: Option<String>,
        recipients: [Option<String>; 4],
    ) -> Self {
        let [platform, master_franchise, area_franchise, final_recipient] = recipients;
        let entry = |role: RecipientRole, recipient_id: Option<String>| {
            let share = breakdown.share(role);
            RecipientEntry {
                recipient_id,
                percentage: share.percentage,
                amount: share.amount,
                status: PayoutStatus::Pending,
            }
        };
        Self {
            id: None,
            membership_plan,
            base_amount: breakdown.base_amount(),
            platform: entry(RecipientRole::Platform, platform),
            master_franchise: entry(RecipientRole::MasterFranchise, master_franchise),
            area_franchise: entry(RecipientRole::AreaFranchise, area_franchise),
            final_recipient: entry(RecipientRole::FinalRecipient, final_recipient),
            overall_status: None,
        }
    }

    pub fn entry(&self, role: RecipientRole) -> &RecipientEntry {
        match role {
            RecipientRole::Platform => &self.platform,
            RecipientRole::MasterFranchise => &self.master_franchise,
            RecipientRole::AreaFranchise => &self.area_franchise,
            RecipientRole::FinalRecipient => &self.final_recipient,
        }
    }
}

/// Dashboard roles that can view commission records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewerRole {
    Admin,
    MasterFranchise,
    AreaFranchise,
    CoreMember,
    Dcp,
}

impl ViewerRole {
    pub fn recipient_role(self) -> RecipientRole {
        match self {
            Self::Admin => RecipientRole::Platform,
            Self::MasterFranchise => RecipientRole::MasterFranchise,
            Self::AreaFranchise => RecipientRole::AreaFranchise,
            Self::CoreMember | Self::Dcp => RecipientRole::FinalRecipient,
        }
    }
}

/// The user looking at a record. Passed explicitly by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewer {
    pub role: ViewerRole,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleEarning {
    pub role: RecipientRole,
    pub percentage: f64,
    pub amount: f64,
    pub status: PayoutStatus,
}

/// The viewer's own line of `commission`, if any.
///
/// Admins always see the platform line. Every other role must match the
/// line's recipient id.
pub fn earnings_for_role(commission: &Commission, viewer: &Viewer) -> Option<RoleEarning> {
    let role = viewer.role.recipient_role();
    let entry = commission.entry(role);

    let owns_entry = match viewer.role {
        ViewerRole::Admin => true,
        _ => match (&entry.recipient_id, &viewer.user_id) {
            (Some(recipient), Some(user)) => recipient == user,
            _ => false,
        },
    };

    owns_entry.then(|| RoleEarning {
        role,
        percentage: entry.percentage,
        amount: entry.amount,
        status: entry.status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DistributionPolicy, RoleShares, calculate_breakdown};

    fn sample_commission() -> Commission {
        let policy = DistributionPolicy {
            id: None,
            membership_plan_id: "Flagship Membership".into(),
            total_pool_percentage: 27.0,
            shares: RoleShares {
                platform: 12.0,
                master_franchise: 12.0,
                area_franchise: 5.0,
                final_recipient: 10.0,
            },
            is_active: true,
        };
        let calc = calculate_breakdown(300_000.0, Some(&policy)).unwrap();
        Commission::draft(
            calc.breakdown().unwrap(),
            Some("Flagship Membership".into()),
            [
                None,
                Some("mf-1".into()),
                Some("af-1".into()),
                Some("cm-1".into()),
            ],
        )
    }

    fn viewer(role: ViewerRole, user_id: Option<&str>) -> Viewer {
        Viewer {
            role,
            user_id: user_id.map(String::from),
        }
    }

    #[test]
    fn test_draft_entries_pending() {
        let c = sample_commission();
        assert_eq!(c.base_amount, 300_000.0);
        for role in RecipientRole::ALL {
            assert_eq!(c.entry(role).status, PayoutStatus::Pending);
        }
        assert_eq!(c.master_franchise.amount, 36_000.0);
        assert_eq!(c.final_recipient.recipient_id.as_deref(), Some("cm-1"));
        assert!(c.overall_status.is_none());
    }

    #[test]
    fn test_admin_sees_platform_line() {
        let c = sample_commission();
        let earning = earnings_for_role(&c, &viewer(ViewerRole::Admin, None)).unwrap();
        assert_eq!(earning.role, RecipientRole::Platform);
        assert_eq!(earning.amount, 36_000.0);
    }

    #[test]
    fn test_franchise_sees_own_line() {
        let c = sample_commission();
        let earning =
            earnings_for_role(&c, &viewer(ViewerRole::AreaFranchise, Some("af-1"))).unwrap();
        assert_eq!(earning.role, RecipientRole::AreaFranchise);
        assert_eq!(earning.percentage, 5.0);
        assert_eq!(earning.amount, 15_000.0);
    }

    #[test]
    fn test_other_users_line_hidden() {
        let c = sample_commission();
        assert!(earnings_for_role(&c, &viewer(ViewerRole::MasterFranchise, Some("mf-2"))).is_none());
        assert!(earnings_for_role(&c, &viewer(ViewerRole::MasterFranchise, None)).is_none());
    }

    #[test]
    fn test_core_member_and_dcp_share_final_line() {
        let c = sample_commission();
        let cm = earnings_for_role(&c, &viewer(ViewerRole::CoreMember, Some("cm-1"))).unwrap();
        let dcp = earnings_for_role(&c, &viewer(ViewerRole::Dcp, Some("cm-1"))).unwrap();
        assert_eq!(cm, dcp);
        assert_eq!(cm.role, RecipientRole::FinalRecipient);
        assert_eq!(cm.amount, 30_000.0);
    }

    #[test]
    fn test_status_passed_through() {
        let json = r#"{
            "_id": "c-9",
            "baseAmount": 1000,
            "platform": {"percentage": 10, "amount": 100, "status": "done"},
            "masterFranchise": {"recipientId": "mf-1", "percentage": 5, "amount": 50, "status": "done"},
            "areaFranchise": {"recipientId": "af-1", "percentage": 2, "amount": 20},
            "finalRecipient": {"recipientId": "cm-1", "percentage": 3, "amount": 30, "status": "pending"},
            "overallStatus": "partial"
        }"#;
        let c: Commission = serde_json::from_str(json).unwrap();
        assert_eq!(c.overall_status.as_deref(), Some("partial"));
        assert_eq!(c.area_franchise.status, PayoutStatus::Pending);

        let earning =
            earnings_for_role(&c, &viewer(ViewerRole::MasterFranchise, Some("mf-1"))).unwrap();
        assert_eq!(earning.status, PayoutStatus::Done);
    }

    #[test]
    fn test_viewer_role_wire_names() {
        let v: Viewer = serde_json::from_str(r#"{"role": "master-franchise", "userId": "u1"}"#).unwrap();
        assert_eq!(v.role, ViewerRole::MasterFranchise);
        let v: Viewer = serde_json::from_str(r#"{"role": "dcp"}"#).unwrap();
        assert_eq!(v.role.recipient_role(), RecipientRole::FinalRecipient);
        assert!(v.user_id.is_none());
    }
}
