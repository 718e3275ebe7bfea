//! Opportunity Engine
//!
//! Pure, single-threaded candidate scoring, filtering, and sizing over
//! frozen in-memory inputs. Per symbol it blends four component scores
//! (risk, value, momentum, catalyst), applies hard and soft risk rules, and
//! distributes a cash budget across the operable subset under per-symbol
//! exposure caps. Fetching, persistence, and execution belong to callers.

pub mod allocator;
pub mod builder;
pub mod evidence;
pub mod report;
pub mod risk;
pub mod scoring;

pub use allocator::allocate_with_caps;
pub use builder::{top_operable, EngineInputs, OpportunityEngine};
pub use evidence::{evidence_stats, EvidenceStats};
pub use report::report_markdown;
pub use risk::RiskAssessment;
pub use scoring::{drawdown_pct, momentum_score, value_score};
