//! # Influence - Influencer campaign ROI tracker
//!
//! Influence joins four CSV exports of an influencer campaign (roster, posts,
//! tracking, payouts) and computes revenue, orders, payout, return on ad
//! spend and engagement for the selected influencers.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  4 CSV files│────▶│   Loader    │────▶│   Filter    │────▶│   Report    │
//! │  (ISO/UTF8) │     │ (typed rows)│     │ (plat/cat/g)│     │ (joins+sums)│
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!                                                              │ text / CSV / JSON
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use influence::{build_report, CampaignInputs, FilterRequest};
//! use std::path::Path;
//!
//! let inputs = CampaignInputs::from_paths(
//!     Some(Path::new("influencers.csv")),
//!     Some(Path::new("posts.csv")),
//!     Some(Path::new("tracking_data.csv")),
//!     Some(Path::new("payouts.csv")),
//! )?;
//! if let Some(report) = build_report(&inputs, &FilterRequest::default())?.into_report() {
//!     println!("ROAS {:.2}x", report.totals.return_on_ad_spend);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`config`] - Environment configuration
//! - [`models`] - Domain models (Influencer, Post, TrackingRecord, PayoutRecord)
//! - [`parser`] - CSV parsing with auto-detection
//! - [`dataset`] - Schemas and typed loading
//! - [`filter`] - Platform/category/gender selection
//! - [`report`] - Joins, aggregation and text rendering
//! - [`export`] - ROAS CSV export
//! - [`pipeline`] - End-to-end orchestration
//! - [`api`] - HTTP API server and log streaming

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Loading
pub mod dataset;
pub mod parser;

// Computation
pub mod filter;
pub mod pipeline;
pub mod report;

// Output
pub mod export;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Errors and config
// =============================================================================

pub use config::AppConfig;
pub use error::{ExportError, LoadError, PipelineError, ServerError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Influencer, PayoutBasis, PayoutRecord, Post, TrackingRecord};

// =============================================================================
// Re-exports - Loading
// =============================================================================

pub use dataset::{check_file, CampaignData, CampaignInputs, Dataset};
pub use parser::{parse_bytes_auto, parse_csv_file_auto, CsvError, ParseResult};

// =============================================================================
// Re-exports - Filter and report
// =============================================================================

pub use filter::{filter_influencers, FilterOptions, FilterRequest, FilterSelection};
pub use report::{
    CampaignReport, CampaignTotals, EngagementRow, JoinDiagnostics, PayoutRow, PlatformPayout,
    RoasRow,
};

// =============================================================================
// Re-exports - Pipeline and export
// =============================================================================

pub use export::{roas_csv, write_roas_csv, ROAS_EXPORT_FILE};
pub use pipeline::{build_report, ReportOutcome};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
