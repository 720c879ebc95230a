//! Board-ready text rendering of metric results
//!
//! A pure function of the plan and its results. Anything it cannot render
//! becomes the help message.

use crate::models::{
    CashRunway, Ebitda, GrossMarginPoint, Intent, MetricResult, OpexBreakdown, Plan,
    RevenueVsBudget,
};

pub const HELP_MESSAGE: &str = "I couldn't analyze that request. Please try asking about revenue, margins, expenses, or cash runway.";

/// Group whole units with thousands separators: `1234567.4` → `"1,234,567"`
fn group_thousands(val: f64) -> String {
    let digits = format!("{:.0}", val.abs());

    digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(",")
}

/// `$1,234,567`, or `$-1,234` for negative amounts
pub fn format_money(val: f64) -> String {
    if val.round() < 0.0 {
        format!("$-{}", group_thousands(val))
    } else {
        format!("${}", group_thousands(val))
    }
}

/// `$+155,500` / `$-56,000`
pub fn format_signed_money(val: f64) -> String {
    let sign = if val.round() < 0.0 { '-' } else { '+' };
    format!("${}{}", sign, group_thousands(val))
}

pub fn format_response(plan: &Plan, results: &[MetricResult]) -> String {
    let rendered = match (plan.intent, results.first()) {
        (Intent::RevenueVsBudget, Some(MetricResult::RevenueVsBudget(r))) => {
            Some(format_revenue(r))
        }
        (Intent::GrossMarginTrend, Some(MetricResult::GrossMarginTrend(points))) => {
            format_trend(points)
        }
        (Intent::OpexBreakdown, Some(MetricResult::OpexBreakdown(o))) => Some(format_opex(o)),
        (Intent::Ebitda, Some(MetricResult::Ebitda(e))) => Some(format_ebitda(e)),
        (Intent::CashRunway, Some(MetricResult::CashRunway(c))) => Some(format_runway(c)),
        _ => None,
    };

    rendered.unwrap_or_else(|| HELP_MESSAGE.to_string())
}

fn format_revenue(r: &RevenueVsBudget) -> String {
    let badge = if r.variance > 0.0 {
        "🟢 **Above budget**"
    } else if r.variance < 0.0 {
        "🔴 **Below budget**"
    } else {
        "🟡 **On budget**"
    };

    format!(
        "**Revenue Performance - {}**\n\n\
         • **Actual Revenue**: {}\n\
         • **Budgeted Revenue**: {}\n\
         • **Variance**: {} ({:+.1}%)\n\n\
         {}\n",
        r.month,
        format_money(r.actual),
        format_money(r.budget),
        format_signed_money(r.variance),
        r.variance_pct,
        badge
    )
}

fn format_trend(points: &[GrossMarginPoint]) -> Option<String> {
    let (first, last) = (points.first()?, points.last()?);

    let lines = points
        .iter()
        .map(|p| {
            format!(
                "• **{}**: {:.1}% ({} gross profit)",
                p.month,
                p.gross_margin_pct,
                format_money(p.gross_profit)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let insight = if points.len() < 2 {
        "📊 **Current performance** - single month view"
    } else if last.gross_margin_pct > first.gross_margin_pct {
        "📈 **Steady improvement** - margin expanding consistently"
    } else if last.gross_margin_pct < first.gross_margin_pct {
        "📉 **Margin decline** - requires attention"
    } else {
        "📊 **Stable margins** - consistent performance"
    };

    Some(format!(
        "**Gross Margin Trend - Last {} Months**\n\n{}\n\n{}",
        points.len(),
        lines,
        insight
    ))
}

fn format_opex(o: &OpexBreakdown) -> String {
    let lines = o
        .breakdown
        .iter()
        .map(|(category, amount)| format!("• **{}**: {}", category, format_money(*amount)))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "**OPEX Breakdown - {}**\n\n{}\n\n• **Total OPEX**: {}\n",
        o.month,
        lines,
        format_money(o.total)
    )
}

fn format_ebitda(e: &Ebitda) -> String {
    let badge = if e.ebitda_margin > 20.0 {
        "🟢 **Strong profitability**"
    } else if e.ebitda_margin > 10.0 {
        "🟡 **Moderate profitability**"
    } else {
        "🔴 **Low profitability**"
    };

    format!(
        "**EBITDA Analysis - {}**\n\n\
         • **Revenue**: {}\n\
         • **COGS**: {}\n\
         • **OPEX**: {}\n\
         • **EBITDA**: {}\n\
         • **EBITDA Margin**: {:.1}%\n\n\
         {}\n",
        e.month,
        format_money(e.revenue),
        format_money(e.cogs),
        format_money(e.opex),
        format_money(e.ebitda),
        e.ebitda_margin,
        badge
    )
}

fn format_runway(c: &CashRunway) -> String {
    let runway_text = if c.runway_months.is_finite() {
        format!("{:.1} months", c.runway_months)
    } else {
        "∞ (positive cash flow)".to_string()
    };

    let badge = if c.runway_months > 12.0 {
        "🟢 **Healthy cash position**"
    } else if c.runway_months > 6.0 {
        "🟡 **Moderate runway**"
    } else {
        "🔴 **Low runway - action needed**"
    };

    format!(
        "**Cash Runway Analysis**\n\n\
         • **Current Cash**: {}\n\
         • **Avg Monthly Burn**: {}\n\
         • **Estimated Runway**: {}\n\n\
         {}\n",
        format_money(c.current_cash_usd),
        format_money(c.avg_monthly_burn_usd),
        runway_text,
        badge
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MonthBalance;
    use crate::planner::{Planner, QueryPlanner};
    use std::collections::BTreeMap;

    fn plan(query: &str) -> Plan {
        QueryPlanner::new().create_plan(query)
    }

    fn point(month: &str, pct: f64) -> GrossMarginPoint {
        GrossMarginPoint {
            month: month.into(),
            revenue: 1000.0,
            cogs: 400.0,
            gross_profit: 600.0,
            gross_margin_pct: pct,
        }
    }

    #[test]
    fn test_money_formatting() {
        assert_eq!(format_money(2_449_000.0), "$2,449,000");
        assert_eq!(format_money(999.4), "$999");
        assert_eq!(format_money(0.0), "$0");
        assert_eq!(format_money(-1_234.0), "$-1,234");
        assert_eq!(format_signed_money(155_500.0), "$+155,500");
        assert_eq!(format_signed_money(-56_000.0), "$-56,000");
    }

    #[test]
    fn test_revenue_template() {
        let result = MetricResult::RevenueVsBudget(RevenueVsBudget {
            month: "Jun 2025".into(),
            actual: 2_449_000.0,
            budget: 2_293_500.0,
            variance: 155_500.0,
            variance_pct: 6.78,
        });

        let text = format_response(&plan("June revenue vs budget"), &[result]);

        assert!(text.starts_with("**Revenue Performance - Jun 2025**"));
        assert!(text.contains("• **Actual Revenue**: $2,449,000"));
        assert!(text.contains("• **Budgeted Revenue**: $2,293,500"));
        assert!(text.contains("• **Variance**: $+155,500 (+6.8%)"));
        assert!(text.contains("🟢 **Above budget**"));
    }

    #[test]
    fn test_trend_insights() {
        let trend_plan = plan("gross margin trend");

        let up = format_response(
            &trend_plan,
            &[MetricResult::GrossMarginTrend(vec![
                point("Apr 2025", 58.1),
                point("Jun 2025", 58.3),
            ])],
        );
        assert!(up.starts_with("**Gross Margin Trend - Last 2 Months**"));
        assert!(up.contains("• **Apr 2025**: 58.1% ($600 gross profit)"));
        assert!(up.contains("📈"));

        let down = format_response(
            &trend_plan,
            &[MetricResult::GrossMarginTrend(vec![
                point("Apr 2025", 60.0),
                point("Jun 2025", 55.0),
            ])],
        );
        assert!(down.contains("📉 **Margin decline**"));

        let single = format_response(
            &trend_plan,
            &[MetricResult::GrossMarginTrend(vec![point("Jun 2025", 60.0)])],
        );
        assert!(single.contains("single month view"));

        let empty = format_response(&trend_plan, &[MetricResult::GrossMarginTrend(vec![])]);
        assert_eq!(empty, HELP_MESSAGE);
    }

    #[test]
    fn test_opex_and_ebitda_templates() {
        let mut breakdown = BTreeMap::new();
        breakdown.insert("Engineering".to_string(), 371_520.0);
        breakdown.insert("Sales".to_string(), 244_900.0);

        let opex = format_response(
            &plan("opex breakdown"),
            &[MetricResult::OpexBreakdown(OpexBreakdown {
                month: "Jun 2025".into(),
                breakdown,
                total: 616_420.0,
            })],
        );
        assert!(opex.contains("• **Engineering**: $371,520\n• **Sales**: $244,900"));
        assert!(opex.contains("• **Total OPEX**: $616,420"));

        let ebitda = format_response(
            &plan("ebitda"),
            &[MetricResult::Ebitda(Ebitda {
                month: "Jun 2025".into(),
                revenue: 1000.0,
                cogs: 500.0,
                opex: 350.0,
                ebitda: 150.0,
                ebitda_margin: 15.0,
            })],
        );
        assert!(ebitda.starts_with("**EBITDA Analysis - Jun 2025**"));
        assert!(ebitda.contains("• **EBITDA Margin**: 15.0%"));
        assert!(ebitda.contains("🟡 **Moderate profitability**"));
    }

    #[test]
    fn test_runway_template() {
        let runway = |months: f64| {
            MetricResult::CashRunway(CashRunway {
                current_cash_usd: 3_954_000.0,
                avg_monthly_burn_usd: 85_000.0,
                runway_months: months,
                cash_balances: vec![MonthBalance {
                    month: "Jun 2025".into(),
                    balance: 3_954_000.0,
                }],
            })
        };
        let runway_plan = plan("cash runway");

        let healthy = format_response(&runway_plan, &[runway(46.5)]);
        assert!(healthy.contains("• **Estimated Runway**: 46.5 months"));
        assert!(healthy.contains("🟢 **Healthy cash position**"));

        let infinite = format_response(&runway_plan, &[runway(f64::INFINITY)]);
        assert!(infinite.contains("∞ (positive cash flow)"));

        let low = format_response(&runway_plan, &[runway(4.0)]);
        assert!(low.contains("🔴 **Low runway - action needed**"));
    }

    #[test]
    fn test_mismatched_or_missing_results_give_help() {
        assert_eq!(format_response(&plan("cash runway"), &[]), HELP_MESSAGE);

        let wrong_shape = MetricResult::GrossMarginTrend(vec![point("Jun 2025", 60.0)]);
        assert_eq!(format_response(&plan("ebitda"), &[wrong_shape]), HELP_MESSAGE);
    }
}
