//! Core data models for the CFO copilot

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

//
// ================= Constants =================
//

pub const REPORTING_CURRENCY: &str = "USD";

/// The one non-reporting currency the FX table carries rates for
pub const SECONDARY_CURRENCY: &str = "EUR";

/// Accounts starting with this prefix are operating-expense categories
pub const OPEX_PREFIX: &str = "Opex:";

pub const REVENUE_ACCOUNT: &str = "Revenue";
pub const COGS_ACCOUNT: &str = "COGS";

pub const CALENDAR_MONTHS: [&str; 12] = [
    "Jan 2025", "Feb 2025", "Mar 2025", "Apr 2025", "May 2025", "Jun 2025",
    "Jul 2025", "Aug 2025", "Sep 2025", "Oct 2025", "Nov 2025", "Dec 2025",
];

pub const DEFAULT_MONTH: &str = "Jun 2025";

pub const DEFAULT_TREND_MONTHS: [&str; 3] = ["Apr 2025", "May 2025", "Jun 2025"];

pub const DEFAULT_MONTHLY_BURN_USD: f64 = 85_000.0;
pub const DEFAULT_CURRENT_CASH_USD: f64 = 3_954_000.0;

//
// ================= Tables =================
//

/// A row holding one sparse value per month, tagged with a single currency.
pub trait MonthlyRow: Clone {
    fn currency(&self) -> &str;

    fn value(&self, month: &str) -> Option<f64>;

    /// Multiply the value in `month` by `rate` and relabel the row.
    fn rebase(&mut self, month: &str, rate: f64, currency: &str);
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerRow {
    pub entity: String,
    pub account: String,
    pub currency: String,
    pub values: BTreeMap<String, f64>,
}

impl LedgerRow {
    pub fn new(entity: &str, account: &str, currency: &str, values: &[(&str, f64)]) -> Self {
        Self {
            entity: entity.to_string(),
            account: account.to_string(),
            currency: currency.to_string(),
            values: values.iter().map(|(m, v)| (m.to_string(), *v)).collect(),
        }
    }

    /// Category label for `Opex:`-prefixed accounts
    pub fn opex_category(&self) -> Option<&str> {
        self.account.strip_prefix(OPEX_PREFIX)
    }
}

impl MonthlyRow for LedgerRow {
    fn currency(&self) -> &str {
        &self.currency
    }

    fn value(&self, month: &str) -> Option<f64> {
        self.values.get(month).copied()
    }

    fn rebase(&mut self, month: &str, rate: f64, currency: &str) {
        if let Some(v) = self.values.get_mut(month) {
            *v *= rate;
        }
        self.currency = currency.to_string();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CashRow {
    pub entity: String,
    pub currency: String,
    pub values: BTreeMap<String, f64>,
}

impl CashRow {
    pub fn new(entity: &str, currency: &str, values: &[(&str, f64)]) -> Self {
        Self {
            entity: entity.to_string(),
            currency: currency.to_string(),
            values: values.iter().map(|(m, v)| (m.to_string(), *v)).collect(),
        }
    }
}

impl MonthlyRow for CashRow {
    fn currency(&self) -> &str {
        &self.currency
    }

    fn value(&self, month: &str) -> Option<f64> {
        self.values.get(month).copied()
    }

    fn rebase(&mut self, month: &str, rate: f64, currency: &str) {
        if let Some(v) = self.values.get_mut(month) {
            *v *= rate;
        }
        self.currency = currency.to_string();
    }
}

/// Month columns declared by the source, in source order, plus the rows.
///
/// A month is present when it is a declared column; individual cells under
/// it may still be empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Table<R> {
    pub months: Vec<String>,
    pub rows: Vec<R>,
}

pub type LedgerTable = Table<LedgerRow>;
pub type CashTable = Table<CashRow>;

impl<R: MonthlyRow> Table<R> {
    pub fn new(months: &[&str], rows: Vec<R>) -> Self {
        Self {
            months: months.iter().map(|m| m.to_string()).collect(),
            rows,
        }
    }

    pub fn has_month(&self, month: &str) -> bool {
        self.months.iter().any(|m| m == month)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of every present cell in `month`
    pub fn sum_month(&self, month: &str) -> f64 {
        self.rows.iter().filter_map(|r| r.value(month)).sum()
    }
}

impl LedgerTable {
    /// Copy of the table keeping only rows whose account satisfies `keep`.
    pub fn filter_accounts(&self, keep: impl Fn(&str) -> bool) -> Self {
        Self {
            months: self.months.clone(),
            rows: self
                .rows
                .iter()
                .filter(|r| keep(&r.account))
                .cloned()
                .collect(),
        }
    }

    pub fn sum_account(&self, month: &str, account: &str) -> f64 {
        self.rows
            .iter()
            .filter(|r| r.account == account)
            .filter_map(|r| r.value(month))
            .sum()
    }

    pub fn sum_opex(&self, month: &str) -> f64 {
        self.rows
            .iter()
            .filter(|r| r.opex_category().is_some())
            .filter_map(|r| r.value(month))
            .sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FxRate {
    pub month: String,
    /// Secondary → reporting currency
    pub eur_usd: f64,
    /// Reporting → secondary currency
    pub usd_eur: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FxTable {
    pub rows: Vec<FxRate>,
}

impl FxTable {
    pub fn new(rows: Vec<FxRate>) -> Self {
        Self { rows }
    }

    /// First FX row whose month label contains the month's abbreviation.
    ///
    /// Matching is case-sensitive substring containment on the first word of
    /// `month` ("Jun" for "Jun 2025"), so "Jun 2024" and "Jun 2025" are not
    /// told apart: whichever row comes first wins.
    pub fn rate_for(&self, month: &str) -> Option<&FxRate> {
        let abbrev = month.split_whitespace().next()?;
        self.rows.iter().find(|r| r.month.contains(abbrev))
    }
}

//
// ================= Planning =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    RevenueVsBudget,
    GrossMarginTrend,
    OpexBreakdown,
    Ebitda,
    CashRunway,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisFunction {
    GetRevenueVsBudget,
    GetGrossMarginTrend,
    GetOpexBreakdown,
    CalculateEbitda,
    CalculateCashRunway,
}

impl AnalysisFunction {
    pub fn name(&self) -> &'static str {
        match self {
            AnalysisFunction::GetRevenueVsBudget => "get_revenue_vs_budget",
            AnalysisFunction::GetGrossMarginTrend => "get_gross_margin_trend",
            AnalysisFunction::GetOpexBreakdown => "get_opex_breakdown",
            AnalysisFunction::CalculateEbitda => "calculate_ebitda",
            AnalysisFunction::CalculateCashRunway => "calculate_cash_runway",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Line,
    Pie,
    Metric,
    Runway,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CallParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub months: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub function: AnalysisFunction,
    pub params: CallParams,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    pub query: String,
    pub intent: Intent,
    pub month: String,
    pub months_range: Vec<String>,
    pub function_calls: Vec<FunctionCall>,
    pub chart_type: ChartType,
    pub requires_chart: bool,
}

//
// ================= Metric Results =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RevenueVsBudget {
    pub month: String,
    pub actual: f64,
    pub budget: f64,
    pub variance: f64,
    pub variance_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GrossMarginPoint {
    pub month: String,
    pub revenue: f64,
    pub cogs: f64,
    pub gross_profit: f64,
    pub gross_margin_pct: f64,
}

/// Outcome of one requested month in a gross margin trend
#[derive(Debug)]
pub struct TrendMonth {
    pub month: String,
    pub outcome: std::result::Result<GrossMarginPoint, AnalysisError>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpexBreakdown {
    pub month: String,
    pub breakdown: BTreeMap<String, f64>,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ebitda {
    pub month: String,
    pub revenue: f64,
    pub cogs: f64,
    pub opex: f64,
    pub ebitda: f64,
    pub ebitda_margin: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthBalance {
    pub month: String,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CashRunway {
    pub current_cash_usd: f64,
    pub avg_monthly_burn_usd: f64,
    /// `f64::INFINITY` when cash is not being burned (serialized as null)
    pub runway_months: f64,
    pub cash_balances: Vec<MonthBalance>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum MetricResult {
    RevenueVsBudget(RevenueVsBudget),
    GrossMarginTrend(Vec<GrossMarginPoint>),
    OpexBreakdown(OpexBreakdown),
    Ebitda(Ebitda),
    CashRunway(CashRunway),
}

//
// ================= Execution =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Failed,
    Skipped,
}

#[derive(Debug)]
pub struct StepOutcome {
    pub function: AnalysisFunction,
    pub params: CallParams,
    pub status: ExecutionStatus,
    pub outcome: std::result::Result<MetricResult, AnalysisError>,
    pub execution_time_ms: u64,
}

//
// ================= Final Response =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopilotResponse {
    pub text: String,
    pub intent: Intent,
    pub chart_type: Option<ChartType>,
    pub plan: Plan,
    pub results: Vec<MetricResult>,
    pub fallback_used: bool,
    pub errors: Vec<String>,
    pub reasoning_trace: Vec<String>,
}

impl CopilotResponse {
    /// True when every step produced a computed result
    pub fn is_clean(&self) -> bool {
        !self.fallback_used && self.errors.is_empty()
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Intent::RevenueVsBudget => "revenue_vs_budget",
            Intent::GrossMarginTrend => "gross_margin_trend",
            Intent::OpexBreakdown => "opex_breakdown",
            Intent::Ebitda => "ebitda",
            Intent::CashRunway => "cash_runway",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Pie => "pie",
            ChartType::Metric => "metric",
            ChartType::Runway => "runway",
        };
        write!(f, "{}", s)
    }
}
