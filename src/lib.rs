//! CFO Copilot
//!
//! Answers plain-English finance questions about monthly ledgers:
//! - Classifies the question into one of five fixed intents
//! - Plans a single deterministic metric call (no model in the loop)
//! - Normalizes every amount to USD before aggregating
//! - Formats a board-ready answer with a chart hint
//! - Applies a configurable fallback when data is missing
//!
//! PIPELINE:
//! QUERY → PLAN → EXECUTE → FALLBACK? → FORMAT

pub mod agent;
pub mod analyzer;
pub mod api;
pub mod classifier;
pub mod config;
pub mod data;
pub mod error;
pub mod execution;
pub mod fallback;
pub mod formatter;
pub mod models;
pub mod normalizer;
pub mod planner;
pub mod tools;

pub use error::Result;

// Re-export common types
pub use agent::Copilot;
pub use classifier::IntentClassifier;
pub use fallback::FallbackPolicy;
pub use models::*;
