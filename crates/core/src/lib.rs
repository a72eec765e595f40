pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod normalize;
pub mod rules;
pub mod serializer;
pub mod tools;

pub use audit::{AuditEntry, AuditLog, AuditReceipt, FileAuditLog, InMemoryAuditLog};
pub use domain::decision::{DecisionTrace, OrderDecision, RuleStage, TraceStep};
pub use domain::order::{CustomerTier, OrderInput};
pub use errors::{ApplicationError, DomainError, ErrorKind};
pub use normalize::{normalize_order, normalize_value};
pub use rules::{
    decide, evaluate_order, DeterministicRuleEvaluator, OrderRuntime, RuleEvaluation,
    RuleEvaluator,
};
pub use serializer::{canonicalize_payload, from_canonical_json, to_canonical_json};
pub use tools::{ToolDispatcher, ToolKind, ToolRequest};
