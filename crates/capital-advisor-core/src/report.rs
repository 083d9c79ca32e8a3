//! Markdown export of valuation and scenario results.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt::Write;

use crate::company::FinancialSnapshot;
use crate::scenarios::simulator::ScenarioResult;
use crate::types::Percent;
use crate::valuation::dcf::{DcfOutput, TerminalMethod};
use crate::valuation::estimates::ValuationOutput;

const DISCLAIMER: &str = "_These figures are simplified estimates for discussion only. \
They are not an audit-grade valuation; consult a qualified advisor before acting on them._";

/// Render a valuation result as a dated markdown report.
pub fn render_valuation_report(
    snapshot: &FinancialSnapshot,
    valuation: &ValuationOutput,
    generated_on: NaiveDate,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Company Valuation Report");
    let _ = writeln!(out);
    let _ = writeln!(out, "Generated on {}", generated_on.format("%Y-%m-%d"));
    let _ = writeln!(out);

    let _ = writeln!(out, "## Company");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Item | Value |");
    let _ = writeln!(out, "|---|---|");
    let _ = writeln!(out, "| Industry | {} |", snapshot.industry);
    let _ = writeln!(out, "| Revenue | {} |", money(snapshot.revenue));
    let _ = writeln!(out, "| Operating profit | {} |", money(snapshot.operating_profit));
    let _ = writeln!(out, "| Total assets | {} |", money(snapshot.total_assets));
    let _ = writeln!(out, "| Total liabilities | {} |", money(snapshot.total_liabilities));
    let _ = writeln!(out, "| Net assets | {} |", money(snapshot.net_assets()));
    let _ = writeln!(out, "| EBITDA | {} |", money(snapshot.ebitda()));
    let _ = writeln!(out, "| Growth rate | {} |", pct(snapshot.growth_rate));
    let _ = writeln!(out);

    let s = &valuation.summary;
    let _ = writeln!(out, "## Summary");
    let _ = writeln!(out);
    if s.count == 0 {
        let _ = writeln!(out, "No valuation method met its precondition.");
    } else {
        let _ = writeln!(out, "- Methods included: {}", s.count);
        let _ = writeln!(out, "- Median: **{}**", money(s.median));
        let _ = writeln!(out, "- Low: {} ({})", money(s.min), s.min_method);
        let _ = writeln!(out, "- High: {} ({})", money(s.max), s.max_method);
        let _ = writeln!(out, "- Mean: {}", money(s.mean));
        let _ = writeln!(
            out,
            "- Negotiation range: {} to {}",
            money(s.negotiation_low),
            money(s.negotiation_high)
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Methods");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Method | Value | Included | Suitability |");
    let _ = writeln!(out, "|---|---|---|---|");
    for e in &valuation.estimates {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {:?} |",
            e.method,
            money(e.value),
            if e.precondition_met { "yes" } else { "no" },
            e.suitability
        );
    }
    let _ = writeln!(out);

    if let Some(dcf) = &valuation.dcf {
        write_dcf_section(&mut out, dcf);
    }

    let _ = writeln!(out, "{DISCLAIMER}");
    out
}

/// Render a scenario simulation as a dated markdown report.
pub fn render_scenario_report(result: &ScenarioResult, generated_on: NaiveDate) -> String {
    let p = &result.parameters;
    let mut out = String::new();
    let _ = writeln!(out, "# Funding Scenario Report: {}", p.kind);
    let _ = writeln!(out);
    let _ = writeln!(out, "Generated on {}", generated_on.format("%Y-%m-%d"));
    let _ = writeln!(out);

    let _ = writeln!(out, "## Assumptions");
    let _ = writeln!(out);
    let _ = writeln!(out, "- Funding amount: {}", money(p.funding_amount));
    let _ = writeln!(out, "- Dilution at year 1: {}", pct(p.dilution_percent));
    if !result.annual_interest.is_zero() {
        let _ = writeln!(
            out,
            "- Interest: {} per year ({})",
            money(result.annual_interest),
            pct(p.interest_rate)
        );
    }
    let growth: Vec<String> = p.yearly_growth_rates.iter().map(|g| pct(*g)).collect();
    let _ = writeln!(out, "- Growth by year: {}", growth.join(", "));
    let _ = writeln!(
        out,
        "- Margin improvement: {} points per year",
        p.margin_improvement_per_year.round_dp(1)
    );
    let _ = writeln!(out, "- Earnings multiple: {}x", p.pe_multiple.round_dp(1));
    if !result.upfront_cost.is_zero() {
        let _ = writeln!(out, "- Upfront cost: {}", money(result.upfront_cost));
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Projection");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "| Year | Revenue | Profit | Margin | Company value | Owner stake | Owner value |"
    );
    let _ = writeln!(out, "|---|---|---|---|---|---|---|");
    for y in &result.projections {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} | {} |",
            y.year,
            money(y.revenue),
            money(y.profit),
            pct(y.profit_margin * Decimal::ONE_HUNDRED),
            money(y.company_value),
            pct(y.owner_equity_percent),
            money(y.owner_value)
        );
    }
    let _ = writeln!(out);

    let s = &result.summary;
    let _ = writeln!(out, "## Change vs. today");
    let _ = writeln!(out);
    let _ = writeln!(out, "- Revenue: {}", change(s.revenue_change_pct));
    let _ = writeln!(out, "- Company value: {}", change(s.company_value_change_pct));
    let _ = writeln!(
        out,
        "- Owner stake: {} points",
        s.owner_equity_change.round_dp(1)
    );
    let _ = writeln!(out, "- Owner value: {}", change(s.owner_value_change_pct));
    let _ = writeln!(out);

    let _ = writeln!(out, "{DISCLAIMER}");
    out
}

fn write_dcf_section(out: &mut String, dcf: &DcfOutput) {
    let w = &dcf.wacc_breakdown;
    let _ = writeln!(out, "## DCF breakdown");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "WACC {} (beta {}, cost of equity {}, after-tax cost of debt {}, debt ratio {})",
        pct(dcf.wacc),
        w.beta.round_dp(2),
        pct(w.cost_of_equity),
        pct(w.after_tax_cost_of_debt),
        pct(w.debt_ratio * Decimal::ONE_HUNDRED)
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "| Year | Growth | Revenue | FCF | PV |");
    let _ = writeln!(out, "|---|---|---|---|---|");
    for y in &dcf.projections {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            y.year,
            pct(y.growth_rate),
            money(y.projected_revenue),
            money(y.free_cash_flow),
            money(y.present_value)
        );
    }
    let _ = writeln!(out);
    let method = match dcf.terminal_method {
        TerminalMethod::GordonGrowth => "Gordon growth",
        TerminalMethod::ExitMultiple => "exit multiple",
    };
    let _ = writeln!(
        out,
        "- Terminal value ({method}, perpetual growth {}): {} (PV {})",
        pct(dcf.perpetual_growth_rate),
        money(dcf.terminal_value),
        money(dcf.terminal_present_value)
    );
    let _ = writeln!(out, "- Enterprise value: {}", money(dcf.enterprise_value));
    let _ = writeln!(out, "- Net debt: {}", money(dcf.net_debt));
    let _ = writeln!(out, "- Equity value: **{}**", money(dcf.equity_value));
    let _ = writeln!(out);
}

fn money(value: Decimal) -> String {
    value.round_dp(1).to_string()
}

fn pct(value: Percent) -> String {
    format!("{}%", value.round_dp(2))
}

fn change(value: Option<Percent>) -> String {
    match value {
        Some(v) if v >= Decimal::ZERO => format!("+{}%", v.round_dp(1)),
        Some(v) => format!("{}%", v.round_dp(1)),
        None => "n/a".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::industry::Industry;
    use crate::scenarios::simulator::{simulate, ScenarioBaseline, ScenarioKind, ScenarioParameters};
    use crate::valuation::dcf::DcfParameters;
    use crate::valuation::estimates::compute_estimates;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn snapshot() -> FinancialSnapshot {
        FinancialSnapshot {
            revenue: dec!(500),
            operating_profit: dec!(50),
            total_assets: dec!(600),
            total_liabilities: dec!(250),
            depreciation: dec!(25),
            growth_rate: dec!(15),
            industry: Industry::ItSoftware,
        }
    }

    #[test]
    fn test_valuation_report_sections() {
        let snap = snapshot();
        let valuation = compute_estimates(&snap, &snap.industry.profile(), &DcfParameters::default())
            .unwrap()
            .result;
        let md = render_valuation_report(&snap, &valuation, date());
        assert!(md.starts_with("# Company Valuation Report"));
        assert!(md.contains("Generated on 2025-06-15"));
        assert!(md.contains("| Net assets | 350 |"));
        assert!(md.contains("Negotiation range: 840.0 to 1260.0"));
        assert!(md.contains("## DCF breakdown"));
        assert!(md.contains("| PER | 1250 | yes |"));
        assert!(md.trim_end().ends_with(DISCLAIMER));
    }

    #[test]
    fn test_scenario_report_rows() {
        let params = ScenarioParameters::for_kind(
            ScenarioKind::DebtFunded,
            dec!(100),
            [dec!(12), dec!(9.6), dec!(8)],
            dec!(15),
        );
        let baseline = ScenarioBaseline {
            revenue: dec!(500),
            profit: dec!(50),
        };
        let result = simulate(&baseline, &params).unwrap().result;
        let md = render_scenario_report(&result, date());
        assert!(md.starts_with("# Funding Scenario Report: Debt funded"));
        assert!(md.contains("Interest: 2.0 per year (2.0%)"));
        assert!(md.contains("| 0 | 500 | 50 |"));
        assert_eq!(md.matches("\n| ").count(), 1 + 4);
    }
}
