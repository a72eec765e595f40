pub mod pipeline;

use serde_json::Value;

use crate::errors::ApplicationError;
use crate::normalize::{normalize_order, normalize_value};
use crate::serializer::to_canonical_json;

pub use self::pipeline::{
    decide, evaluate_order, DeterministicRuleEvaluator, RuleEvaluation, RuleEvaluator,
};

/// Normalizes raw order JSON and runs it through an evaluator.
pub struct OrderRuntime<E> {
    evaluator: E,
}

impl<E> OrderRuntime<E> {
    pub fn new(evaluator: E) -> Self {
        Self { evaluator }
    }
}

impl Default for OrderRuntime<DeterministicRuleEvaluator> {
    fn default() -> Self {
        Self::new(DeterministicRuleEvaluator)
    }
}

impl<E: RuleEvaluator> OrderRuntime<E> {
    pub fn evaluate_str(&self, raw: &str) -> Result<RuleEvaluation, ApplicationError> {
        let order = normalize_order(raw)?;
        Ok(self.evaluator.evaluate(&order))
    }

    pub fn evaluate_value(&self, value: &Value) -> Result<RuleEvaluation, ApplicationError> {
        let order = normalize_value(value)?;
        Ok(self.evaluator.evaluate(&order))
    }

    /// Always answers with JSON: the canonical decision, or `{"error": ...}`.
    pub fn respond(&self, raw: &str) -> String {
        match self.evaluate_str(raw).and_then(|evaluation| to_canonical_json(&evaluation.decision))
        {
            Ok(json) => json,
            Err(error) => {
                tracing::warn!(
                    event_name = "rules.evaluation_rejected",
                    error_kind = ?error.kind(),
                    error = %error,
                    "order evaluation failed"
                );
                error.to_error_payload()
            }
        }
    }
}
