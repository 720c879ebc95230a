//! Planner trait and the rule-based query planner
//!
//! The planner turns a raw question into a declarative plan: which intent,
//! which month(s), which analyzer function to call and which chart to ask
//! for. It holds no state between calls.

use crate::classifier::IntentClassifier;
use crate::models::{AnalysisFunction, CallParams, ChartType, FunctionCall, Intent, Plan};
use tracing::debug;

pub mod months;

pub use months::{extract_month, extract_months_range};

/// Trait for plan generation
pub trait Planner: Send + Sync {
    fn create_plan(&self, query: &str) -> Plan;
}

/// Static intent → (function, chart) mapping; one call per intent
fn route(intent: Intent) -> (AnalysisFunction, ChartType) {
    match intent {
        Intent::RevenueVsBudget => (AnalysisFunction::GetRevenueVsBudget, ChartType::Bar),
        Intent::GrossMarginTrend => (AnalysisFunction::GetGrossMarginTrend, ChartType::Line),
        Intent::OpexBreakdown => (AnalysisFunction::GetOpexBreakdown, ChartType::Pie),
        Intent::Ebitda => (AnalysisFunction::CalculateEbitda, ChartType::Metric),
        Intent::CashRunway => (AnalysisFunction::CalculateCashRunway, ChartType::Runway),
    }
}

/// Regex/keyword planner over fixed lookup tables
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryPlanner;

impl QueryPlanner {
    pub fn new() -> Self {
        Self
    }

    pub fn classify_intent(&self, query: &str) -> Intent {
        IntentClassifier::classify(query)
    }

    pub fn extract_month(&self, query: &str) -> String {
        extract_month(query)
    }

    pub fn extract_months_range(&self, query: &str) -> Vec<String> {
        extract_months_range(query)
    }
}

impl Planner for QueryPlanner {
    fn create_plan(&self, query: &str) -> Plan {
        let intent = self.classify_intent(query);
        let month = self.extract_month(query);
        let months_range = self.extract_months_range(query);

        let (function, chart_type) = route(intent);

        let params = match function {
            AnalysisFunction::GetGrossMarginTrend => CallParams {
                month: None,
                months: Some(months_range.clone()),
            },
            AnalysisFunction::CalculateCashRunway => CallParams::default(),
            _ => CallParams {
                month: Some(month.clone()),
                months: None,
            },
        };

        debug!(
            %intent,
            month = %month,
            months = months_range.len(),
            function = function.name(),
            "Plan created"
        );

        Plan {
            query: query.to_string(),
            intent,
            month,
            months_range,
            function_calls: vec![FunctionCall { function, params }],
            chart_type,
            requires_chart: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revenue_plan() {
        let plan = QueryPlanner::new().create_plan("What was June 2025 revenue vs budget?");

        assert_eq!(plan.intent, Intent::RevenueVsBudget);
        assert_eq!(plan.month, "Jun 2025");
        assert_eq!(plan.chart_type, ChartType::Bar);
        assert_eq!(plan.function_calls.len(), 1);
        assert_eq!(
            plan.function_calls[0].function,
            AnalysisFunction::GetRevenueVsBudget
        );
        assert_eq!(plan.function_calls[0].params.month.as_deref(), Some("Jun 2025"));
    }

    #[test]
    fn test_margin_trend_plan_uses_range() {
        let plan = QueryPlanner::new().create_plan("Show gross margin trend last 3 months");

        assert_eq!(plan.intent, Intent::GrossMarginTrend);
        assert_eq!(plan.chart_type, ChartType::Line);
        assert_eq!(plan.months_range.len(), 3);
        assert_eq!(
            plan.function_calls[0].params.months.as_ref(),
            Some(&plan.months_range)
        );
        assert!(plan.function_calls[0].params.month.is_none());
    }

    #[test]
    fn test_margin_wording_resolves_to_march() {
        // Known looseness: "margin" contains "mar", so the range is March only.
        let plan = QueryPlanner::new().create_plan("Show gross margin trend");

        assert_eq!(plan.intent, Intent::GrossMarginTrend);
        assert_eq!(plan.month, "Mar 2025");
        assert_eq!(plan.months_range, vec!["Mar 2025"]);
        assert_eq!(
            plan.function_calls[0].params.months.as_deref(),
            Some(&["Mar 2025".to_string()][..])
        );
    }

    #[test]
    fn test_every_intent_routes_to_one_call() {
        let planner = QueryPlanner::new();
        let cases = [
            ("opex breakdown for may", AnalysisFunction::GetOpexBreakdown, ChartType::Pie),
            ("ebitda for april", AnalysisFunction::CalculateEbitda, ChartType::Metric),
            ("cash runway", AnalysisFunction::CalculateCashRunway, ChartType::Runway),
        ];

        for (query, function, chart) in cases {
            let plan = planner.create_plan(query);
            assert_eq!(plan.function_calls.len(), 1, "{}", query);
            assert_eq!(plan.function_calls[0].function, function);
            assert_eq!(plan.chart_type, chart);
            assert!(plan.requires_chart);
        }

        let runway = planner.create_plan("cash runway");
        assert_eq!(runway.function_calls[0].params, CallParams::default());

        let opex = planner.create_plan("opex breakdown for may");
        assert_eq!(opex.function_calls[0].params.month.as_deref(), Some("May 2025"));
    }

    #[test]
    fn test_plan_round_trips_through_json() {
        let plan = QueryPlanner::new().create_plan("What is our EBITDA?");
        let json = serde_json::to_value(&plan).unwrap();

        assert_eq!(json["intent"], "ebitda");
        assert_eq!(json["chart_type"], "metric");
        assert_eq!(json["function_calls"][0]["function"], "calculate_ebitda");
    }
}
