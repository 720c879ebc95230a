//! Copilot request handler
//!
//! QUERY → PLAN → EXECUTE → OBSERVE → FALLBACK? → FORMAT
//!
//! This is the only place where failed metric computations are turned into
//! something presentable, according to the configured fallback policy.

use crate::analyzer::FinancialAnalyzer;
use crate::config::CopilotConfig;
use crate::data::{CsvSource, DataLoader};
use crate::execution::ExecutionEngine;
use crate::fallback::{self, FallbackPolicy};
use crate::formatter::format_response;
use crate::models::{CopilotResponse, ExecutionStatus};
use crate::planner::{Planner, QueryPlanner};
use crate::tools::create_default_registry;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Answers finance questions end to end
pub struct Copilot {
    planner: Box<dyn Planner>,
    engine: ExecutionEngine,
    fallback: FallbackPolicy,
}

impl Copilot {
    pub fn new(planner: Box<dyn Planner>, engine: ExecutionEngine, fallback: FallbackPolicy) -> Self {
        Self {
            planner,
            engine,
            fallback,
        }
    }

    /// Rule-based planner and all five metric tools over `loader`
    pub fn with_loader(loader: DataLoader, fallback: FallbackPolicy) -> Self {
        let engine = ExecutionEngine::new(FinancialAnalyzer::new(loader), create_default_registry());
        Self::new(Box::new(QueryPlanner::new()), engine, fallback)
    }

    pub fn from_config(config: &CopilotConfig) -> Self {
        let source = CsvSource::new(config.fixtures_dir.clone());
        Self::with_loader(DataLoader::new(Box::new(source)), config.fallback_policy())
    }

    pub fn fallback_policy(&self) -> FallbackPolicy {
        self.fallback
    }

    pub fn data_source(&self) -> &str {
        self.engine.analyzer().loader().source_name()
    }

    /// Answer one question. Never fails: metric errors are either replaced
    /// by sample results or reported in `errors`, depending on the policy.
    pub fn answer(&self, query: &str) -> CopilotResponse {
        let start_time = Instant::now();
        let mut reasoning_trace = vec!["INPUT: Query received".to_string()];

        info!(query = %query, source = self.data_source(), "Copilot: answering query");

        // === PLAN ===
        let plan = self.planner.create_plan(query);
        reasoning_trace.push(format!(
            "PLAN: intent {} with {} call(s)",
            plan.intent,
            plan.function_calls.len()
        ));

        // === EXECUTE ===
        reasoning_trace.push("EXECUTE: Running metric tools".to_string());
        let outcomes = self.engine.execute_plan(&plan);

        let mut results = Vec::with_capacity(outcomes.len());
        let mut errors = Vec::new();
        let mut fallback_used = false;

        for (i, step) in outcomes.into_iter().enumerate() {
            reasoning_trace.push(format!(
                "OBSERVE: Step {} ({}) - {:?} - {} ms",
                i + 1,
                step.function.name(),
                step.status,
                step.execution_time_ms
            ));

            let error = match step.outcome {
                Ok(result) => {
                    results.push(result);
                    continue;
                }
                Err(e) => e,
            };

            errors.push(format!("{}: {}", step.function.name(), error));

            // Nothing ran for a skipped step, so there is nothing to stand in for.
            if step.status == ExecutionStatus::Skipped {
                warn!(function = step.function.name(), "Step skipped, no result");
                reasoning_trace.push(format!("SKIP: {} not registered", step.function.name()));
                continue;
            }

            match self.fallback {
                FallbackPolicy::Plausible => {
                    warn!(
                        function = step.function.name(),
                        error = %error,
                        "Substituting sample result"
                    );
                    reasoning_trace.push(format!(
                        "FALLBACK: Sample result for {}",
                        step.function.name()
                    ));
                    results.push(fallback::substitute(step.function, &step.params, error));
                    fallback_used = true;
                }
                FallbackPolicy::Strict => {
                    warn!(
                        function = step.function.name(),
                        error = %error,
                        status = ?step.status,
                        "Dropping failed result"
                    );
                    reasoning_trace.push(format!(
                        "FALLBACK: Disabled, {} omitted",
                        step.function.name()
                    ));
                }
            }
        }

        // === FORMAT ===
        let text = format_response(&plan, &results);
        let chart_type = (plan.requires_chart && !results.is_empty()).then_some(plan.chart_type);
        reasoning_trace.push("COMPLETE: Response formatted".to_string());

        debug!(
            intent = %plan.intent,
            results = results.len(),
            errors = errors.len(),
            fallback_used,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Copilot: query answered"
        );

        CopilotResponse {
            text,
            intent: plan.intent,
            chart_type,
            plan,
            results,
            fallback_used,
            errors,
            reasoning_trace,
        }
    }
}
