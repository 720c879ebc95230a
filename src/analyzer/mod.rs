//! Financial analyzer
//!
//! Five independent metrics over normalized tables. Every operation
//! returns a typed error instead of substituting sample numbers; fallback
//! is decided by the caller.

use crate::data::DataLoader;
use crate::error::AnalysisError;
use crate::models::{
    CashRunway, Ebitda, GrossMarginPoint, LedgerTable, MonthBalance, MonthlyRow, OpexBreakdown,
    RevenueVsBudget, TrendMonth, CALENDAR_MONTHS, COGS_ACCOUNT, DEFAULT_CURRENT_CASH_USD,
    DEFAULT_MONTHLY_BURN_USD, OPEX_PREFIX, REVENUE_ACCOUNT,
};
use crate::normalizer::convert_to_usd;
use std::collections::BTreeMap;
use tracing::debug;

type AnalysisResult<T> = std::result::Result<T, AnalysisError>;

/// `part / whole * 100`, or 0 when `whole` is 0
fn percent_of(part: f64, whole: f64) -> f64 {
    if whole != 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

fn require_month(table: &LedgerTable, name: &'static str, month: &str) -> AnalysisResult<()> {
    if table.has_month(month) {
        Ok(())
    } else {
        Err(AnalysisError::MonthNotFound {
            table: name,
            month: month.to_string(),
        })
    }
}

pub struct FinancialAnalyzer {
    loader: DataLoader,
}

impl FinancialAnalyzer {
    pub fn new(loader: DataLoader) -> Self {
        Self { loader }
    }

    pub fn loader(&self) -> &DataLoader {
        &self.loader
    }

    /// Actuals for `month`, normalized to the reporting currency
    fn actuals_usd(&self, month: &str) -> AnalysisResult<LedgerTable> {
        let actuals = self.loader.load_actuals()?;
        require_month(actuals, "actuals", month)?;
        let fx = self.loader.load_fx()?;
        Ok(convert_to_usd(actuals, fx, month))
    }

    pub fn revenue_vs_budget(&self, month: &str) -> AnalysisResult<RevenueVsBudget> {
        let fx = self.loader.load_fx()?;
        let budget = self.loader.load_budget()?;
        require_month(budget, "budget", month)?;

        let revenue_actual = self.actuals_usd(month)?;
        let revenue_budget = convert_to_usd(
            &budget.filter_accounts(|a| a == REVENUE_ACCOUNT),
            fx,
            month,
        );

        let actual = revenue_actual.sum_account(month, REVENUE_ACCOUNT);
        let budget = revenue_budget.sum_account(month, REVENUE_ACCOUNT);
        let variance = actual - budget;

        debug!(month, actual, budget, variance, "Revenue vs budget computed");

        Ok(RevenueVsBudget {
            month: month.to_string(),
            actual,
            budget,
            variance,
            variance_pct: percent_of(variance, budget),
        })
    }

    /// One outcome per requested month, in request order.
    pub fn gross_margin_trend(&self, months: &[String]) -> Vec<TrendMonth> {
        months
            .iter()
            .map(|month| TrendMonth {
                month: month.clone(),
                outcome: self.gross_margin_point(month),
            })
            .collect()
    }

    fn gross_margin_point(&self, month: &str) -> AnalysisResult<GrossMarginPoint> {
        let actuals = self.actuals_usd(month)?;

        let revenue = actuals.sum_account(month, REVENUE_ACCOUNT);
        let cogs = actuals.sum_account(month, COGS_ACCOUNT);
        let gross_profit = revenue - cogs;

        Ok(GrossMarginPoint {
            month: month.to_string(),
            revenue,
            cogs,
            gross_profit,
            gross_margin_pct: percent_of(gross_profit, revenue),
        })
    }

    pub fn opex_breakdown(&self, month: &str) -> AnalysisResult<OpexBreakdown> {
        let actuals = self.loader.load_actuals()?;
        require_month(actuals, "actuals", month)?;
        let fx = self.loader.load_fx()?;

        let opex = convert_to_usd(
            &actuals.filter_accounts(|a| a.starts_with(OPEX_PREFIX)),
            fx,
            month,
        );

        let mut breakdown: BTreeMap<String, f64> = BTreeMap::new();
        let mut total = 0.0;

        for row in &opex.rows {
            let (Some(category), Some(amount)) = (row.opex_category(), row.value(month)) else {
                continue;
            };
            *breakdown.entry(category.to_string()).or_insert(0.0) += amount;
            total += amount;
        }

        Ok(OpexBreakdown {
            month: month.to_string(),
            breakdown,
            total,
        })
    }

    pub fn ebitda(&self, month: &str) -> AnalysisResult<Ebitda> {
        let actuals = self.actuals_usd(month)?;

        let revenue = actuals.sum_account(month, REVENUE_ACCOUNT);
        let cogs = actuals.sum_account(month, COGS_ACCOUNT);
        let opex = actuals.sum_opex(month);
        let ebitda = revenue - cogs - opex;

        Ok(Ebitda {
            month: month.to_string(),
            revenue,
            cogs,
            opex,
            ebitda,
            ebitda_margin: percent_of(ebitda, revenue),
        })
    }

    /// Runway from month-over-month cash burn across the calendar year.
    ///
    /// Months without an FX rate or with a non-positive total are skipped.
    pub fn cash_runway(&self) -> AnalysisResult<CashRunway> {
        let cash = self.loader.load_cash()?;
        let fx = self.loader.load_fx()?;

        let mut balances: Vec<MonthBalance> = Vec::new();

        for month in CALENDAR_MONTHS {
            if fx.rate_for(month).is_none() {
                continue;
            }

            let total = convert_to_usd(cash, fx, month).sum_month(month);
            if total > 0.0 {
                balances.push(MonthBalance {
                    month: month.to_string(),
                    balance: total,
                });
            }
        }

        let burns: Vec<f64> = balances
            .windows(2)
            .map(|pair| pair[0].balance - pair[1].balance)
            .collect();

        let avg_monthly_burn_usd = if burns.is_empty() {
            DEFAULT_MONTHLY_BURN_USD
        } else {
            burns.iter().sum::<f64>() / burns.len() as f64
        };

        let current_cash_usd = balances
            .last()
            .map(|b| b.balance)
            .unwrap_or(DEFAULT_CURRENT_CASH_USD);

        let runway_months = if avg_monthly_burn_usd > 0.0 {
            current_cash_usd / avg_monthly_burn_usd
        } else {
            f64::INFINITY
        };

        debug!(
            months = balances.len(),
            current_cash_usd, avg_monthly_burn_usd, runway_months, "Cash runway computed"
        );

        Ok(CashRunway {
            current_cash_usd,
            avg_monthly_burn_usd,
            runway_months,
            cash_balances: balances,
        })
    }
}
