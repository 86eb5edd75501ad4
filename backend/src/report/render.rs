//! Plain-text rendering of a [`CampaignReport`] for the terminal.

use super::{CampaignReport, EngagementRow, PayoutRow, PlatformPayout, RoasRow};

/// Whole currency units with thousands separators: `₹12,345`.
pub fn format_currency(amount: f64, symbol: &str) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}{}{}", sign, symbol, group_thousands(rounded.abs() as u64))
}

/// Integer with thousands separators: `1,234,567`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// ROAS as a multiplier: `2.06x`.
pub fn format_roas(roas: f64) -> String {
    format!("{:.2}x", roas)
}

/// Engagement rate with 3 decimals, `n/a` without reach.
pub fn format_engagement(engagement: Option<f64>) -> String {
    match engagement {
        Some(rate) => format!("{:.3}", rate),
        None => "n/a".to_string(),
    }
}

/// Left-aligned text table.
#[derive(Debug, Clone, Default)]
pub struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }

        let line = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| {
                    let pad = width.saturating_sub(cell.chars().count());
                    format!("{}{}", cell, " ".repeat(pad))
                })
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut out = line(self.headers.as_slice());
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&line(rule.as_slice()));
        for row in &self.rows {
            out.push('\n');
            out.push_str(&line(row.as_slice()));
        }
        out
    }
}

/// The four headline metrics.
pub fn summary(report: &CampaignReport, currency: &str) -> String {
    let totals = &report.totals;
    let mut table = TextTable::new(["Metric", "Value"]);
    table.push(vec!["Total Revenue".into(), format_currency(totals.total_revenue, currency)]);
    table.push(vec!["Total Orders".into(), group_thousands(totals.total_orders)]);
    table.push(vec!["Total Payout".into(), format_currency(totals.total_payout, currency)]);
    table.push(vec!["ROAS".into(), format_roas(totals.return_on_ad_spend)]);
    table.render()
}

pub fn roas_table(rows: &[RoasRow]) -> String {
    let mut table = TextTable::new(["name", "platform", "category", "Revenue", "Payout", "ROAS"]);
    for row in rows {
        table.push(vec![
            row.name.clone(),
            row.platform.clone(),
            row.category.clone(),
            format!("{:.2}", row.revenue),
            format!("{:.2}", row.payout),
            format!("{:.2}", row.roas),
        ]);
    }
    table.render()
}

/// Ranked name/ROAS list, the data behind the ROAS bar chart.
pub fn top_table(rows: &[RoasRow]) -> String {
    let mut table = TextTable::new(["#", "name", "ROAS"]);
    for (rank, row) in rows.iter().enumerate() {
        table.push(vec![(rank + 1).to_string(), row.name.clone(), format_roas(row.roas)]);
    }
    table.render()
}

pub fn engagement_table(rows: &[EngagementRow]) -> String {
    let mut table = TextTable::new(["name", "platform", "reach", "likes", "comments", "engagement"]);
    for row in rows {
        table.push(vec![
            row.name.clone(),
            row.platform.clone(),
            row.reach.to_string(),
            row.likes.to_string(),
            row.comments.to_string(),
            format_engagement(row.engagement),
        ]);
    }
    table.render()
}

pub fn payout_table(rows: &[PayoutRow]) -> String {
    let mut table = TextTable::new(["name", "platform", "basis", "rate", "orders", "total_payout"]);
    for row in rows {
        table.push(vec![
            row.name.clone(),
            row.platform.clone(),
            row.basis.to_string(),
            format!("{:.2}", row.rate),
            row.orders.to_string(),
            format!("{:.2}", row.total_payout),
        ]);
    }
    table.render()
}

pub fn platform_table(rows: &[PlatformPayout], currency: &str) -> String {
    let mut table = TextTable::new(["platform", "total_payout", "share"]);
    for row in rows {
        table.push(vec![
            row.platform.clone(),
            format_currency(row.total_payout, currency),
            format!("{:.1}%", row.share * 100.0),
        ]);
    }
    table.render()
}

/// Full report: summary, ROAS per influencer, top `top_n`, engagement and
/// payouts.
pub fn full_report(report: &CampaignReport, currency: &str, top_n: usize) -> String {
    let top = report.top(top_n);
    let sections = [
        ("Overall Campaign Performance".to_string(), summary(report, currency)),
        ("Influencer ROAS".to_string(), roas_table(&report.roas)),
        (format!("Top {} Influencers by ROAS", top.len()), top_table(top)),
        ("Post Engagement".to_string(), engagement_table(&report.engagement)),
        ("Payout Overview".to_string(), payout_table(&report.payouts)),
        (
            "Payout Distribution by Platform".to_string(),
            platform_table(&report.platform_payouts, currency),
        ),
    ];

    sections
        .iter()
        .map(|(title, body)| format!("### {}\n\n{}\n", title, body))
        .collect::<Vec<_>>()
        .join("\n")
}
