use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::decision::{DecisionTrace, OrderDecision, RuleStage, TraceStep};
use crate::domain::order::{CustomerTier, OrderInput};

pub const GOLD_BASE_DISCOUNT: Decimal = Decimal::from_parts(10, 0, 0, false, 0);
pub const SILVER_BASE_DISCOUNT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);
pub const HIGH_VALUE_THRESHOLD: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);
pub const HIGH_VALUE_BONUS: Decimal = Decimal::from_parts(3, 0, 0, false, 0);
pub const WELCOME_MINIMUM_TOTAL: Decimal = Decimal::from_parts(100, 0, 0, false, 0);
pub const WELCOME_BONUS: Decimal = Decimal::from_parts(2, 0, 0, false, 0);
pub const ELECTRONICS_DISCOUNT_CAP: Decimal = Decimal::from_parts(10, 0, 0, false, 0);
pub const REVIEW_TOTAL_THRESHOLD: Decimal = Decimal::from_parts(500, 0, 0, false, 0);
pub const REVIEW_STOCK_THRESHOLD: u64 = 5;
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(200, 0, 0, false, 0);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEvaluation {
    pub decision: OrderDecision,
    pub trace: DecisionTrace,
}

pub trait RuleEvaluator: Send + Sync {
    fn evaluate(&self, order: &OrderInput) -> RuleEvaluation;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicRuleEvaluator;

impl RuleEvaluator for DeterministicRuleEvaluator {
    fn evaluate(&self, order: &OrderInput) -> RuleEvaluation {
        evaluate_order(order)
    }
}

pub fn decide(order: &OrderInput) -> OrderDecision {
    evaluate_order(order).decision
}

/// Runs every stage in pipeline order. Stages may only append to the trace.
pub fn evaluate_order(order: &OrderInput) -> RuleEvaluation {
    let mut state = EvaluationState::default();

    apply_tier_base(order, &mut state);
    apply_high_value_bonus(order, &mut state);
    apply_new_customer_welcome(order, &mut state);
    apply_category_override(order, &mut state);
    let require_manual_review = apply_manual_review(order, &mut state);
    apply_regional_compliance(order, &mut state);
    let free_shipping = apply_shipping_eligibility(order, &mut state);

    let discount_percent = state.discount.max(Decimal::ZERO).round_dp(2);
    let notes = state.trace.notes();
    let rationale = OrderDecision::rationale_for(&notes);

    RuleEvaluation {
        decision: OrderDecision {
            discount_percent,
            free_shipping,
            require_manual_review,
            notes,
            rationale,
        },
        trace: state.trace,
    }
}

#[derive(Default)]
struct EvaluationState {
    discount: Decimal,
    trace: DecisionTrace,
}

impl EvaluationState {
    fn note(&mut self, stage: RuleStage, detail: impl Into<String>) {
        let detail = detail.into();
        tracing::debug!(
            event_name = "rules.stage_applied",
            stage = stage.as_str(),
            discount = %self.discount,
            detail = %detail,
            "rule stage produced a note"
        );
        self.trace.steps.push(TraceStep { stage, detail, discount_after: self.discount });
    }
}

fn apply_tier_base(order: &OrderInput, state: &mut EvaluationState) {
    match order.customer_tier() {
        CustomerTier::Gold => {
            state.discount += GOLD_BASE_DISCOUNT;
            state.note(RuleStage::TierBase, "Gold base discount 10%");
        }
        CustomerTier::Silver => {
            state.discount += SILVER_BASE_DISCOUNT;
            state.note(RuleStage::TierBase, "Silver base discount 5%");
        }
        CustomerTier::Bronze => {
            state.note(RuleStage::TierBase, "Bronze/no tier base discount 0%");
        }
    }
}

fn apply_high_value_bonus(order: &OrderInput, state: &mut EvaluationState) {
    if order.order_total() > HIGH_VALUE_THRESHOLD {
        state.discount += HIGH_VALUE_BONUS;
        state.note(RuleStage::HighValueBonus, "High-value order bonus +3% (> $1000)");
    }
}

fn apply_new_customer_welcome(order: &OrderInput, state: &mut EvaluationState) {
    if order.new_customer() && order.order_total() >= WELCOME_MINIMUM_TOTAL {
        state.discount += WELCOME_BONUS;
        state.note(RuleStage::NewCustomerWelcome, "New customer welcome +2% (>= $100)");
    }
}

fn apply_category_override(order: &OrderInput, state: &mut EvaluationState) {
    match order.item_category() {
        "electronics" => {
            if state.discount > ELECTRONICS_DISCOUNT_CAP {
                state.discount = ELECTRONICS_DISCOUNT_CAP;
                state.note(RuleStage::CategoryOverride, "Electronics discount capped at 10%");
            }
        }
        "groceries" => {
            let previous = state.discount;
            state.discount = Decimal::ZERO;
            if !previous.is_zero() {
                state.note(
                    RuleStage::CategoryOverride,
                    "Groceries not discount-eligible, reset to 0%",
                );
            }
        }
        _ => {}
    }
}

fn apply_manual_review(order: &OrderInput, state: &mut EvaluationState) -> bool {
    let required = order.stock_level() < REVIEW_STOCK_THRESHOLD
        && order.order_total() > REVIEW_TOTAL_THRESHOLD;
    if required {
        state.note(
            RuleStage::ManualReview,
            "Low stock (<5) and high order value (> $500), manual review required",
        );
    }
    required
}

fn apply_regional_compliance(order: &OrderInput, state: &mut EvaluationState) {
    if order.region() == "EU" {
        state.note(
            RuleStage::RegionalCompliance,
            "EU region, ensure VAT invoice details are present",
        );
    }
}

fn apply_shipping_eligibility(order: &OrderInput, state: &mut EvaluationState) -> bool {
    let eligible = order.order_total() >= FREE_SHIPPING_THRESHOLD
        || order.customer_tier() == CustomerTier::Gold;
    if eligible {
        state.note(RuleStage::ShippingEligibility, "Eligible for free shipping (tier or threshold)");
    }
    eligible
}
