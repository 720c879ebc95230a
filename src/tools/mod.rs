//! Metric tools and registry
//!
//! Each analyzer function is exposed as a tool keyed by its plan function
//! name. Tools validate their parameters and run one analyzer operation.

use crate::analyzer::FinancialAnalyzer;
use crate::error::AnalysisError;
use crate::models::{AnalysisFunction, CallParams, MetricResult};
use std::collections::HashMap;
use std::sync::Arc;

type ToolResult = std::result::Result<MetricResult, AnalysisError>;

/// Trait for a single metric tool (deterministic execution)
pub trait MetricTool: Send + Sync {
    fn function(&self) -> AnalysisFunction;
    fn description(&self) -> &'static str;
    fn execute(&self, analyzer: &FinancialAnalyzer, params: &CallParams) -> ToolResult;
}

/// Tool registry for looking up and executing tools
pub struct ToolRegistry {
    tools: HashMap<AnalysisFunction, Arc<dyn MetricTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register(&mut self, tool: Arc<dyn MetricTool>) {
        self.tools.insert(tool.function(), tool);
    }

    pub fn get(&self, function: AnalysisFunction) -> Option<Arc<dyn MetricTool>> {
        self.tools.get(&function).cloned()
    }

    pub fn list(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.tools.keys().map(|f| f.name()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn require_month(function: AnalysisFunction, params: &CallParams) -> Result<&str, AnalysisError> {
    params
        .month
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| AnalysisError::InvalidParams {
            function: function.name(),
            reason: "expected 'month'".to_string(),
        })
}

pub struct RevenueVsBudgetTool;

impl MetricTool for RevenueVsBudgetTool {
    fn function(&self) -> AnalysisFunction {
        AnalysisFunction::GetRevenueVsBudget
    }

    fn description(&self) -> &'static str {
        "Actual vs budgeted revenue for one month, in USD"
    }

    fn execute(&self, analyzer: &FinancialAnalyzer, params: &CallParams) -> ToolResult {
        let month = require_month(self.function(), params)?;
        analyzer
            .revenue_vs_budget(month)
            .map(MetricResult::RevenueVsBudget)
    }
}

pub struct GrossMarginTrendTool;

impl MetricTool for GrossMarginTrendTool {
    fn function(&self) -> AnalysisFunction {
        AnalysisFunction::GetGrossMarginTrend
    }

    fn description(&self) -> &'static str {
        "Gross margin per month over a range of months"
    }

    /// Fails with `IncompleteTrend` carrying every month's outcome when any
    /// month could not be computed.
    fn execute(&self, analyzer: &FinancialAnalyzer, params: &CallParams) -> ToolResult {
        let months = params
            .months
            .as_ref()
            .ok_or_else(|| AnalysisError::InvalidParams {
                function: self.function().name(),
                reason: "expected 'months'".to_string(),
            })?;

        let trend = analyzer.gross_margin_trend(months);

        if trend.iter().any(|m| m.outcome.is_err()) {
            return Err(AnalysisError::IncompleteTrend(trend));
        }

        let points = trend.into_iter().filter_map(|m| m.outcome.ok()).collect();
        Ok(MetricResult::GrossMarginTrend(points))
    }
}

pub struct OpexBreakdownTool;

impl MetricTool for OpexBreakdownTool {
    fn function(&self) -> AnalysisFunction {
        AnalysisFunction::GetOpexBreakdown
    }

    fn description(&self) -> &'static str {
        "Operating expenses grouped by category for one month"
    }

    fn execute(&self, analyzer: &FinancialAnalyzer, params: &CallParams) -> ToolResult {
        let month = require_month(self.function(), params)?;
        analyzer.opex_breakdown(month).map(MetricResult::OpexBreakdown)
    }
}

pub struct EbitdaTool;

impl MetricTool for EbitdaTool {
    fn function(&self) -> AnalysisFunction {
        AnalysisFunction::CalculateEbitda
    }

    fn description(&self) -> &'static str {
        "EBITDA and EBITDA margin for one month"
    }

    fn execute(&self, analyzer: &FinancialAnalyzer, params: &CallParams) -> ToolResult {
        let month = require_month(self.function(), params)?;
        analyzer.ebitda(month).map(MetricResult::Ebitda)
    }
}

pub struct CashRunwayTool;

impl MetricTool for CashRunwayTool {
    fn function(&self) -> AnalysisFunction {
        AnalysisFunction::CalculateCashRunway
    }

    fn description(&self) -> &'static str {
        "Months of cash left at the average monthly burn"
    }

    fn execute(&self, analyzer: &FinancialAnalyzer, _params: &CallParams) -> ToolResult {
        analyzer.cash_runway().map(MetricResult::CashRunway)
    }
}

/// Create a registry holding all five metric tools.
pub fn create_default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(Arc::new(RevenueVsBudgetTool));
    registry.register(Arc::new(GrossMarginTrendTool));
    registry.register(Arc::new(OpexBreakdownTool));
    registry.register(Arc::new(EbitdaTool));
    registry.register(Arc::new(CashRunwayTool));

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataLoader;

    fn analyzer() -> FinancialAnalyzer {
        FinancialAnalyzer::new(DataLoader::sample())
    }

    #[test]
    fn test_default_registry_has_all_functions() {
        let registry = create_default_registry();

        assert_eq!(
            registry.list(),
            vec![
                "calculate_cash_runway",
                "calculate_ebitda",
                "get_gross_margin_trend",
                "get_opex_breakdown",
                "get_revenue_vs_budget",
            ]
        );
        assert!(registry.get(AnalysisFunction::CalculateEbitda).is_some());
    }

    #[test]
    fn test_missing_month_is_invalid_params() {
        let err = EbitdaTool
            .execute(&analyzer(), &CallParams::default())
            .unwrap_err();

        assert!(matches!(
            err,
            AnalysisError::InvalidParams { function: "calculate_ebitda", .. }
        ));
    }

    #[test]
    fn test_trend_tool_reports_failed_months() {
        let params = CallParams {
            month: None,
            months: Some(vec!["Mar 2025".into(), "Jun 2025".into()]),
        };

        match GrossMarginTrendTool.execute(&analyzer(), &params) {
            Err(AnalysisError::IncompleteTrend(months)) => {
                assert_eq!(months.len(), 2);
                assert!(months[0].outcome.is_err());
                assert!(months[1].outcome.is_ok());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_trend_tool_success() {
        let params = CallParams {
            month: None,
            months: Some(vec!["Apr 2025".into(), "May 2025".into(), "Jun 2025".into()]),
        };

        let result = GrossMarginTrendTool.execute(&analyzer(), &params).unwrap();
        match result {
            MetricResult::GrossMarginTrend(points) => assert_eq!(points.len(), 3),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
