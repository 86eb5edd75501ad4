//! REST API types.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::dataset::Dataset;
use crate::pipeline::{waiting_message, ReportOutcome};
use crate::report::CampaignReport;

/// Response to `POST /api/report`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    /// Unique job identifier
    pub job_id: String,

    /// Status: "ready" or "waiting"
    pub status: String,

    /// RFC 3339 generation time
    pub generated_at: String,

    /// Human-readable hint while waiting for inputs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Datasets still missing
    #[serde(default)]
    pub missing: Vec<Dataset>,

    /// The report, once every dataset was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<CampaignReport>,
}

impl From<ReportOutcome> for ReportResponse {
    fn from(outcome: ReportOutcome) -> Self {
        let job_id = Uuid::new_v4().to_string();
        let generated_at = chrono::Utc::now().to_rfc3339();

        match outcome {
            ReportOutcome::Ready(report) => ReportResponse {
                job_id,
                status: "ready".to_string(),
                generated_at,
                message: None,
                missing: Vec::new(),
                report: Some(*report),
            },
            ReportOutcome::Waiting { missing } => ReportResponse {
                job_id,
                status: "waiting".to_string(),
                generated_at,
                message: Some(waiting_message(&missing)),
                missing,
                report: None,
            },
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "missing": [],
    })
}
