//! Membership catalog: plan classification and per-component base amounts.

use serde::{Deserialize, Serialize};

/// Offline plans are chapter-based; the digital plan is online-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanKind {
    Offline,
    Digital,
}

/// Display label for the final-recipient role of a plan kind.
pub fn final_recipient_label(kind: PlanKind) -> &'static str {
    match kind {
        PlanKind::Offline => "Core Member",
        PlanKind::Digital => "DCP",
    }
}

/// One payable component of a plan (registration, annual fee, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentComponent {
    pub name: String,
    /// Pre-tax price.
    #[serde(alias = "base_amount")]
    pub base_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipPlan {
    pub name: String,
    pub kind: PlanKind,
    #[serde(default)]
    pub components: Vec<PaymentComponent>,
}

impl MembershipPlan {
    pub fn new(name: impl Into<String>, kind: PlanKind) -> Self {
        Self {
            name: name.into(),
            kind,
            components: Vec::new(),
        }
    }

    /// The four plans sold today, without prices.
    pub fn known_plans() -> Vec<Self> {
        vec![
            Self::new("Core Membership", PlanKind::Offline),
            Self::new("Flagship Membership", PlanKind::Offline),
            Self::new("Industria Membership", PlanKind::Offline),
            Self::new("Digital Membership", PlanKind::Digital),
        ]
    }

    pub fn final_recipient_label(&self) -> &'static str {
        final_recipient_label(self.kind)
    }

    pub fn component(&self, name: &str) -> Option<&PaymentComponent> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Look up a plan by exact name.
    pub fn find<'a>(plans: &'a [Self], name: &str) -> Option<&'a Self> {
        plans.iter().find(|p| p.name == name)
    }
}
