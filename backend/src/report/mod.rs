//! Campaign metrics: joins the tracking, payout and post datasets against the
//! filtered roster and aggregates them.
//!
//! # Tables
//!
//! | Table              | Rows                                            |
//! |--------------------|-------------------------------------------------|
//! | [`CampaignTotals`] | one: revenue, orders, payout, ROAS              |
//! | [`RoasRow`]        | one per filtered influencer with tracking data  |
//! | [`EngagementRow`]  | one per post of a filtered influencer           |
//! | [`PayoutRow`]      | one per payout row of a filtered influencer     |
//! | [`PlatformPayout`] | one per influencer platform with payouts        |
//!
//! Rows whose `influencer_id` is not in the filtered roster are left out of
//! every table. They are counted in [`JoinDiagnostics`].
//!
//! Building a report is pure: the same data and selection always give the
//! same report.

pub mod render;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::dataset::CampaignData;
use crate::filter::{filter_influencers, FilterOptions, FilterSelection};
use crate::models::{Influencer, PayoutBasis};

/// `numerator / denominator`, or 0 when the denominator is not positive.
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

// =============================================================================
// Report rows
// =============================================================================

/// Campaign-wide sums over the filtered influencers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignTotals {
    pub total_revenue: f64,
    pub total_orders: u64,
    pub total_payout: f64,
    /// `total_revenue / total_payout`, 0 when nothing was paid.
    pub return_on_ad_spend: f64,
}

/// Revenue, payout and ROAS of one influencer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoasRow {
    pub influencer_id: String,
    pub name: String,
    pub platform: String,
    pub category: String,
    pub revenue: f64,
    /// 0 when the influencer has no payout row.
    pub payout: f64,
    /// 0 when payout is 0.
    pub roas: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementRow {
    pub influencer_id: String,
    pub name: String,
    /// Platform of the post.
    pub platform: String,
    pub reach: u64,
    pub likes: u64,
    pub comments: u64,
    /// `None` when the post has no reach.
    pub engagement: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutRow {
    pub influencer_id: String,
    pub name: String,
    /// Roster platform of the influencer.
    pub platform: String,
    pub basis: PayoutBasis,
    pub rate: f64,
    pub orders: u64,
    pub total_payout: f64,
}

/// Payout distribution per influencer platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformPayout {
    pub platform: String,
    pub total_payout: f64,
    /// Fraction of the campaign payout, 0 when the campaign payout is 0.
    pub share: f64,
}

/// Rows left out by the joins.
///
/// `unmatched_*` rows reference an id missing from the roster; `excluded_*`
/// rows belong to an influencer removed by the filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinDiagnostics {
    pub unmatched_posts: usize,
    pub unmatched_tracking: usize,
    pub unmatched_payouts: usize,
    pub excluded_posts: usize,
    pub excluded_tracking: usize,
    pub excluded_payouts: usize,
    /// Filtered influencers with more than one payout row. Only the last
    /// row is used for their ROAS.
    pub duplicate_payout_ids: Vec<String>,
}

impl JoinDiagnostics {
    pub fn unmatched_total(&self) -> usize {
        self.unmatched_posts + self.unmatched_tracking + self.unmatched_payouts
    }
}

// =============================================================================
// Report
// =============================================================================

/// Everything computed for one dataset + selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignReport {
    /// Values available for filtering.
    pub options: FilterOptions,
    /// Values the report was filtered on.
    pub selection: FilterSelection,
    /// Number of influencers kept by the filter.
    pub influencer_count: usize,
    pub totals: CampaignTotals,
    /// Sorted by ROAS, highest first.
    pub roas: Vec<RoasRow>,
    pub engagement: Vec<EngagementRow>,
    pub payouts: Vec<PayoutRow>,
    pub platform_payouts: Vec<PlatformPayout>,
    pub diagnostics: JoinDiagnostics,
}

/// Which side of the join a foreign key fell on.
enum Join<'a> {
    Kept(&'a Influencer),
    Excluded,
    Unmatched,
}

struct Roster<'a> {
    filtered: HashMap<&'a str, &'a Influencer>,
    known: HashSet<&'a str>,
}

impl<'a> Roster<'a> {
    fn new(all: &'a [Influencer], filtered: &'a [Influencer]) -> Self {
        Self {
            filtered: filtered.iter().map(|i| (i.id.as_str(), i)).collect(),
            known: all.iter().map(|i| i.id.as_str()).collect(),
        }
    }

    fn join(&self, id: &str) -> Join<'a> {
        match self.filtered.get(id) {
            Some(&influencer) => Join::Kept(influencer),
            None if self.known.contains(id) => Join::Excluded,
            None => Join::Unmatched,
        }
    }
}

impl CampaignReport {
    /// Build the report for `selection`.
    pub fn build(data: &CampaignData, selection: &FilterSelection) -> Self {
        let options = FilterOptions::from_influencers(&data.influencers);
        let filtered = filter_influencers(&data.influencers, selection);
        let roster = Roster::new(&data.influencers, &filtered);
        let mut diagnostics = JoinDiagnostics::default();

        // Tracking: campaign sums + per-influencer revenue
        let mut totals = CampaignTotals::default();
        let mut revenue_by_id: HashMap<&str, f64> = HashMap::new();
        for record in &data.tracking {
            match roster.join(&record.influencer_id) {
                Join::Kept(influencer) => {
                    totals.total_revenue += record.revenue;
                    totals.total_orders = totals.total_orders.saturating_add(record.orders);
                    *revenue_by_id.entry(influencer.id.as_str()).or_insert(0.0) += record.revenue;
                }
                Join::Excluded => diagnostics.excluded_tracking += 1,
                Join::Unmatched => diagnostics.unmatched_tracking += 1,
            }
        }

        // Payouts: every joined row counts towards totals, the last one per
        // influencer is the ROAS denominator
        let mut payouts = Vec::new();
        let mut payout_by_id: HashMap<&str, f64> = HashMap::new();
        let mut duplicates: HashSet<&str> = HashSet::new();
        for record in &data.payouts {
            match roster.join(&record.influencer_id) {
                Join::Kept(influencer) => {
                    totals.total_payout += record.total_payout;
                    if payout_by_id
                        .insert(influencer.id.as_str(), record.total_payout)
                        .is_some()
                    {
                        duplicates.insert(influencer.id.as_str());
                    }
                    payouts.push(PayoutRow {
                        influencer_id: influencer.id.clone(),
                        name: influencer.name.clone(),
                        platform: influencer.platform.clone(),
                        basis: record.basis.clone(),
                        rate: record.rate,
                        orders: record.orders,
                        total_payout: record.total_payout,
                    });
                }
                Join::Excluded => diagnostics.excluded_payouts += 1,
                Join::Unmatched => diagnostics.unmatched_payouts += 1,
            }
        }
        totals.return_on_ad_spend = ratio_or_zero(totals.total_revenue, totals.total_payout);

        // Roster order, then a stable sort: ties keep roster order
        let mut roas: Vec<RoasRow> = filtered
            .iter()
            .filter_map(|influencer| {
                let revenue = *revenue_by_id.get(influencer.id.as_str())?;
                let payout = payout_by_id
                    .get(influencer.id.as_str())
                    .copied()
                    .unwrap_or(0.0);
                Some(RoasRow {
                    influencer_id: influencer.id.clone(),
                    name: influencer.name.clone(),
                    platform: influencer.platform.clone(),
                    category: influencer.category.clone(),
                    revenue,
                    payout,
                    roas: ratio_or_zero(revenue, payout),
                })
            })
            .collect();
        roas.sort_by(|a, b| b.roas.total_cmp(&a.roas));

        let mut engagement = Vec::new();
        for post in &data.posts {
            match roster.join(&post.influencer_id) {
                Join::Kept(influencer) => engagement.push(EngagementRow {
                    influencer_id: influencer.id.clone(),
                    name: influencer.name.clone(),
                    platform: post.platform.clone(),
                    reach: post.reach,
                    likes: post.likes,
                    comments: post.comments,
                    engagement: post.engagement(),
                }),
                Join::Excluded => diagnostics.excluded_posts += 1,
                Join::Unmatched => diagnostics.unmatched_posts += 1,
            }
        }

        let platform_payouts = platform_distribution(&payouts, totals.total_payout);

        diagnostics.duplicate_payout_ids = filtered
            .iter()
            .filter(|i| duplicates.contains(i.id.as_str()))
            .map(|i| i.id.clone())
            .collect();

        Self {
            options,
            selection: selection.clone(),
            influencer_count: filtered.len(),
            totals,
            roas,
            engagement,
            payouts,
            platform_payouts,
            diagnostics,
        }
    }

    /// The `n` best influencers by ROAS.
    pub fn top(&self, n: usize) -> &[RoasRow] {
        &self.roas[..n.min(self.roas.len())]
    }
}

/// Sum payouts per platform, in first-seen order.
fn platform_distribution(payouts: &[PayoutRow], campaign_payout: f64) -> Vec<PlatformPayout> {
    let mut distribution: Vec<PlatformPayout> = Vec::new();
    for row in payouts {
        match distribution.iter_mut().find(|p| p.platform == row.platform) {
            Some(entry) => entry.total_payout += row.total_payout,
            None => distribution.push(PlatformPayout {
                platform: row.platform.clone(),
                total_payout: row.total_payout,
                share: 0.0,
            }),
        }
    }
    for entry in &mut distribution {
        entry.share = ratio_or_zero(entry.total_payout, campaign_payout);
    }
    distribution
}
