//! End-to-end report pipeline: inputs → typed datasets → filter → report.
//!
//! # Example
//!
//! ```rust,ignore
//! use influence::{build_report, CampaignInputs, FilterRequest, ReportOutcome};
//!
//! let inputs = CampaignInputs::from_paths(Some(i), Some(p), Some(t), Some(o))?;
//! match build_report(&inputs, &FilterRequest::default())? {
//!     ReportOutcome::Ready(report) => println!("ROAS {:.2}", report.totals.return_on_ad_spend),
//!     ReportOutcome::Waiting { missing } => eprintln!("missing {:?}", missing),
//! }
//! ```

use serde::Serialize;

use crate::api::logs::{log_info, log_success, log_warning};
use crate::dataset::{CampaignData, CampaignInputs, Dataset};
use crate::error::PipelineResult;
use crate::filter::{FilterOptions, FilterRequest};
use crate::report::CampaignReport;

/// Result of a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ReportOutcome {
    /// Not every dataset was supplied; nothing was computed.
    Waiting { missing: Vec<Dataset> },
    /// All datasets loaded and the report was built.
    Ready(Box<CampaignReport>),
}

impl ReportOutcome {
    pub fn report(&self) -> Option<&CampaignReport> {
        match self {
            ReportOutcome::Ready(report) => Some(report.as_ref()),
            ReportOutcome::Waiting { .. } => None,
        }
    }

    pub fn into_report(self) -> Option<CampaignReport> {
        match self {
            ReportOutcome::Ready(report) => Some(*report),
            ReportOutcome::Waiting { .. } => None,
        }
    }
}

/// Message shown while inputs are missing.
pub fn waiting_message(missing: &[Dataset]) -> String {
    let files: Vec<&str> = missing.iter().map(|d| d.file_name()).collect();
    format!(
        "Please provide all four CSV files to view the report (missing: {})",
        files.join(", ")
    )
}

/// Load the inputs and build the report for `request`.
///
/// Missing inputs give [`ReportOutcome::Waiting`]; malformed inputs are
/// errors. Either way no partial report is produced.
pub fn build_report(
    inputs: &CampaignInputs,
    request: &FilterRequest,
) -> PipelineResult<ReportOutcome> {
    let Some(data) = CampaignData::load(inputs)? else {
        let missing = inputs.missing();
        log_warning(waiting_message(&missing));
        return Ok(ReportOutcome::Waiting { missing });
    };
    log_info("📖 Datasets loaded");
    log_success(format!("{} influencers", data.influencers.len()));
    log_success(format!("{} posts", data.posts.len()));
    log_success(format!("{} tracking rows", data.tracking.len()));
    log_success(format!("{} payout rows", data.payouts.len()));

    let options = FilterOptions::from_influencers(&data.influencers);
    let selection = request.resolve(&options);

    log_info("📊 Computing campaign metrics...");
    let report = CampaignReport::build(&data, &selection);
    log_success(format!(
        "{} of {} influencers selected",
        report.influencer_count,
        data.influencers.len()
    ));
    warn_dropped_rows(&report);

    Ok(ReportOutcome::Ready(Box::new(report)))
}

fn warn_dropped_rows(report: &CampaignReport) {
    let d = &report.diagnostics;
    let unmatched = [
        (Dataset::Posts, d.unmatched_posts),
        (Dataset::Tracking, d.unmatched_tracking),
        (Dataset::Payouts, d.unmatched_payouts),
    ];
    for (dataset, count) in unmatched {
        if count > 0 {
            log_warning(format!(
                "{} row(s) in {} reference an unknown influencer_id and were skipped",
                count,
                dataset.file_name()
            ));
        }
    }
    if !d.duplicate_payout_ids.is_empty() {
        log_warning(format!(
            "Several payout rows for influencer(s) {}; ROAS uses the last one",
            d.duplicate_payout_ids.join(", ")
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LoadError, PipelineError};

    const INFLUENCERS: &str = "influencer_id,name,platform,category,gender\n\
        1,Asha,Instagram,Beauty,Female\n\
        2,Ravi,YouTube,Tech,Male\n";
    const POSTS: &str = "influencer_id,platform,reach,likes,comments\n\
        1,Instagram,100,10,5\n\
        2,YouTube,0,4,1\n";
    const TRACKING: &str = "influencer_id,revenue,orders\n1,1000,8\n2,0,0\n";
    const PAYOUTS: &str = "influencer_id,basis,rate,orders,total_payout\n\
        1,per_order,62.5,8,500\n\
        2,per_post,200,0,200\n";

    fn complete_inputs() -> CampaignInputs {
        CampaignInputs::new()
            .with(Dataset::Influencers, INFLUENCERS)
            .with(Dataset::Posts, POSTS)
            .with(Dataset::Tracking, TRACKING)
            .with(Dataset::Payouts, PAYOUTS)
    }

    #[test]
    fn test_missing_inputs_wait() {
        let inputs = CampaignInputs::new()
            .with(Dataset::Influencers, INFLUENCERS)
            .with(Dataset::Tracking, TRACKING);

        let outcome = build_report(&inputs, &FilterRequest::default()).unwrap();
        assert_eq!(
            outcome,
            ReportOutcome::Waiting {
                missing: vec![Dataset::Posts, Dataset::Payouts]
            }
        );
        assert!(outcome.report().is_none());
    }

    #[test]
    fn test_waiting_message_lists_files() {
        let msg = waiting_message(&[Dataset::Posts, Dataset::Payouts]);
        assert!(msg.contains("posts.csv, payouts.csv"));
    }

    #[test]
    fn test_full_run() {
        let outcome = build_report(&complete_inputs(), &FilterRequest::default()).unwrap();
        let report = outcome.into_report().unwrap();

        assert_eq!(report.influencer_count, 2);
        assert_eq!(report.totals.total_revenue, 1000.0);
        assert_eq!(report.totals.total_orders, 8);
        assert_eq!(report.totals.total_payout, 700.0);
        assert_eq!(format!("{:.2}", report.totals.return_on_ad_spend), "1.43");
        assert_eq!(report.roas[0].roas, 2.0);
        assert_eq!(report.roas[1].roas, 0.0);
        assert_eq!(report.engagement[1].engagement, None);
    }

    #[test]
    fn test_request_filters() {
        let request = FilterRequest {
            genders: Some(vec!["Male".into()]),
            ..Default::default()
        };
        let report = build_report(&complete_inputs(), &request)
            .unwrap()
            .into_report()
            .unwrap();

        assert_eq!(report.influencer_count, 1);
        assert_eq!(report.selection.genders, vec!["Male"]);
        assert_eq!(report.selection.platforms, vec!["Instagram", "YouTube"]);
        assert_eq!(report.totals.total_payout, 200.0);
    }

    #[test]
    fn test_malformed_input_is_an_error() {
        let inputs = complete_inputs().with(
            Dataset::Tracking,
            "influencer_id,revenue,orders\n1,lots,8\n",
        );

        let err = build_report(&inputs, &FilterRequest::default()).unwrap_err();
        match err {
            PipelineError::Load(LoadError::InvalidValue { dataset, column, .. }) => {
                assert_eq!(dataset, Dataset::Tracking);
                assert_eq!(column, "revenue");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_runs_are_identical() {
        let inputs = complete_inputs();
        let request = FilterRequest::default();
        assert_eq!(
            build_report(&inputs, &request).unwrap(),
            build_report(&inputs, &request).unwrap()
        );
    }

    #[test]
    fn test_outcome_serializes_status() {
        let outcome = ReportOutcome::Waiting {
            missing: vec![Dataset::Posts],
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "waiting");
        assert_eq!(json["missing"][0], "posts");
    }
}
