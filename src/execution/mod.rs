//! Execution engine for deterministic plan execution
//!
//! Runs each function call of a plan through the tool registry and records
//! one step outcome per call. No fallback happens here.

use crate::analyzer::FinancialAnalyzer;
use crate::error::AnalysisError;
use crate::models::{ExecutionStatus, Plan, StepOutcome};
use crate::tools::ToolRegistry;
use std::time::Instant;
use tracing::{debug, warn};

/// Executes a plan step-by-step
pub struct ExecutionEngine {
    analyzer: FinancialAnalyzer,
    tool_registry: ToolRegistry,
}

impl ExecutionEngine {
    pub fn new(analyzer: FinancialAnalyzer, tool_registry: ToolRegistry) -> Self {
        Self {
            analyzer,
            tool_registry,
        }
    }

    pub fn analyzer(&self) -> &FinancialAnalyzer {
        &self.analyzer
    }

    /// Execute all calls in order, stopping after the first failure
    pub fn execute_plan(&self, plan: &Plan) -> Vec<StepOutcome> {
        let mut outcomes = Vec::with_capacity(plan.function_calls.len());

        debug!(intent = %plan.intent, steps = plan.function_calls.len(), "Starting plan execution");

        for call in &plan.function_calls {
            let start = Instant::now();

            let (status, outcome) = match self.tool_registry.get(call.function) {
                Some(tool) => {
                    debug!(
                        function = call.function.name(),
                        description = tool.description(),
                        "Executing step"
                    );
                    match tool.execute(&self.analyzer, &call.params) {
                        Ok(result) => (ExecutionStatus::Success, Ok(result)),
                        Err(e) => {
                            warn!(
                                function = call.function.name(),
                                error = %e,
                                "Metric computation failed"
                            );
                            (ExecutionStatus::Failed, Err(e))
                        }
                    }
                }
                None => {
                    warn!(function = call.function.name(), "Tool not registered");
                    (
                        ExecutionStatus::Skipped,
                        Err(AnalysisError::FunctionNotRegistered(
                            call.function.name().to_string(),
                        )),
                    )
                }
            };

            let execution_time_ms = start.elapsed().as_millis() as u64;
            let failed = status == ExecutionStatus::Failed;

            outcomes.push(StepOutcome {
                function: call.function,
                params: call.params.clone(),
                status,
                outcome,
                execution_time_ms,
            });

            if failed {
                warn!(
                    function = call.function.name(),
                    "Halting execution due to step failure"
                );
                break;
            }
        }

        debug!(outcome_count = outcomes.len(), "Plan execution completed");

        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataLoader;
    use crate::models::{AnalysisFunction, CallParams, FunctionCall, MetricResult};
    use crate::planner::{Planner, QueryPlanner};
    use crate::tools::{create_default_registry, EbitdaTool};
    use std::sync::Arc;

    fn engine(registry: ToolRegistry) -> ExecutionEngine {
        ExecutionEngine::new(FinancialAnalyzer::new(DataLoader::sample()), registry)
    }

    #[test]
    fn test_execution_engine() {
        let engine = engine(create_default_registry());
        let plan = QueryPlanner::new().create_plan("What is our EBITDA for June?");

        let outcomes = engine.execute_plan(&plan);

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].status, ExecutionStatus::Success);
        assert!(matches!(outcomes[0].outcome, Ok(MetricResult::Ebitda(_))));
    }

    #[test]
    fn test_unregistered_function_is_skipped() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EbitdaTool));
        let engine = engine(registry);

        let plan = QueryPlanner::new().create_plan("cash runway");
        let outcomes = engine.execute_plan(&plan);

        assert_eq!(outcomes[0].status, ExecutionStatus::Skipped);
        assert!(matches!(
            outcomes[0].outcome,
            Err(AnalysisError::FunctionNotRegistered(_))
        ));
    }

    #[test]
    fn test_halts_after_failed_step() {
        let engine = engine(create_default_registry());
        let mut plan = QueryPlanner::new().create_plan("revenue vs budget for may");

        // Sample budget has no May column, so the first step fails.
        plan.function_calls.push(FunctionCall {
            function: AnalysisFunction::CalculateCashRunway,
            params: CallParams::default(),
        });

        let outcomes = engine.execute_plan(&plan);

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].status, ExecutionStatus::Failed);
    }
}
