use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const STANDARD_RATIONALE: &str = "Standard rules applied";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStage {
    TierBase,
    HighValueBonus,
    NewCustomerWelcome,
    CategoryOverride,
    ManualReview,
    RegionalCompliance,
    ShippingEligibility,
}

impl RuleStage {
    pub const PIPELINE: [RuleStage; 7] = [
        Self::TierBase,
        Self::HighValueBonus,
        Self::NewCustomerWelcome,
        Self::CategoryOverride,
        Self::ManualReview,
        Self::RegionalCompliance,
        Self::ShippingEligibility,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TierBase => "tier_base",
            Self::HighValueBonus => "high_value_bonus",
            Self::NewCustomerWelcome => "new_customer_welcome",
            Self::CategoryOverride => "category_override",
            Self::ManualReview => "manual_review",
            Self::RegionalCompliance => "regional_compliance",
            Self::ShippingEligibility => "shipping_eligibility",
        }
    }

    pub fn position(self) -> usize {
        Self::PIPELINE.iter().position(|stage| *stage == self).unwrap_or(Self::PIPELINE.len())
    }
}

/// Wire shape of a decision. Field order is the canonical serialization order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderDecision {
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_percent: Decimal,
    pub free_shipping: bool,
    pub require_manual_review: bool,
    pub notes: Vec<String>,
    pub rationale: String,
}

impl OrderDecision {
    pub fn rationale_for(notes: &[String]) -> String {
        if notes.is_empty() {
            STANDARD_RATIONALE.to_string()
        } else {
            notes.join("; ")
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceStep {
    pub stage: RuleStage,
    pub detail: String,
    pub discount_after: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionTrace {
    pub steps: Vec<TraceStep>,
}

impl DecisionTrace {
    pub fn notes(&self) -> Vec<String> {
        self.steps.iter().map(|step| step.detail.clone()).collect()
    }

    pub fn stages(&self) -> Vec<RuleStage> {
        self.steps.iter().map(|step| step.stage).collect()
    }

    pub fn contains(&self, stage: RuleStage) -> bool {
        self.steps.iter().any(|step| step.stage == stage)
    }
}
