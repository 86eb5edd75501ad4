//! Typed loading of the four campaign datasets.
//!
//! Each dataset has a fixed set of required columns. Loading checks the
//! header row first and fails fast with the expected schema, then converts
//! every row, reporting the exact line, column and value of anything that
//! does not parse. Extra columns are ignored.
//!
//! ```text
//! bytes ──▶ parser (encoding, delimiter) ──▶ header check ──▶ typed rows
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::api::logs::log_warning;
use crate::error::{LoadError, LoadResult};
use crate::models::{Influencer, PayoutBasis, PayoutRecord, Post, TrackingRecord};
use crate::parser::{parse_bytes_auto, CsvRecord, ParseResult};

// =============================================================================
// Dataset kinds
// =============================================================================

/// The four inputs of a campaign report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    Influencers,
    Posts,
    Tracking,
    Payouts,
}

impl Dataset {
    /// All datasets, in the order they are loaded.
    pub const ALL: [Dataset; 4] = [
        Dataset::Influencers,
        Dataset::Posts,
        Dataset::Tracking,
        Dataset::Payouts,
    ];

    /// Short name used on the command line and in multipart field names.
    pub fn name(&self) -> &'static str {
        match self {
            Dataset::Influencers => "influencers",
            Dataset::Posts => "posts",
            Dataset::Tracking => "tracking",
            Dataset::Payouts => "payouts",
        }
    }

    /// Conventional file name for the dataset.
    pub fn file_name(&self) -> &'static str {
        match self {
            Dataset::Influencers => "influencers.csv",
            Dataset::Posts => "posts.csv",
            Dataset::Tracking => "tracking_data.csv",
            Dataset::Payouts => "payouts.csv",
        }
    }

    /// Required header columns.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Dataset::Influencers => &["influencer_id", "name", "platform", "category", "gender"],
            Dataset::Posts => &["influencer_id", "platform", "reach", "likes", "comments"],
            Dataset::Tracking => &["influencer_id", "revenue", "orders"],
            Dataset::Payouts => &["influencer_id", "basis", "rate", "orders", "total_payout"],
        }
    }

    /// Check that every required column is present in `headers`.
    pub fn check_headers(&self, headers: &[String]) -> LoadResult<()> {
        let present: HashSet<&str> = headers.iter().map(String::as_str).collect();
        let missing: Vec<String> = self
            .columns()
            .iter()
            .filter(|c| !present.contains(*c))
            .map(|c| c.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(LoadError::MissingColumns {
                dataset: *self,
                missing,
            })
        }
    }

    /// Parse raw bytes and check the header row.
    pub fn parse(&self, bytes: &[u8]) -> LoadResult<ParseResult> {
        let parsed = parse_bytes_auto(bytes).map_err(|source| LoadError::Csv {
            dataset: *self,
            source,
        })?;
        self.check_headers(&parsed.headers)?;
        Ok(parsed)
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dataset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Dataset::ALL
            .into_iter()
            .find(|d| d.name() == normalized || d.file_name() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown dataset '{}' (expected one of: influencers, posts, tracking, payouts)",
                    s
                )
            })
    }
}

// =============================================================================
// Cell conversion
// =============================================================================

fn invalid(
    dataset: Dataset,
    record: &CsvRecord,
    column: &str,
    message: impl Into<String>,
) -> LoadError {
    LoadError::InvalidValue {
        dataset,
        line: record.line,
        column: column.to_string(),
        value: record.get(column).to_string(),
        message: message.into(),
    }
}

fn text(dataset: Dataset, record: &CsvRecord, column: &str) -> LoadResult<String> {
    let value = record.get(column);
    if value.is_empty() {
        return Err(invalid(dataset, record, column, "value is required"));
    }
    Ok(value.to_string())
}

/// Non-negative whole number. Integral floats ("12.0") are accepted.
fn count(dataset: Dataset, record: &CsvRecord, column: &str) -> LoadResult<u64> {
    let raw = record.get(column);
    if let Ok(n) = raw.parse::<u64>() {
        return Ok(n);
    }
    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => {
            Ok(f as u64)
        }
        _ => Err(invalid(dataset, record, column, "expected a non-negative integer")),
    }
}

/// Non-negative finite amount.
fn amount(dataset: Dataset, record: &CsvRecord, column: &str) -> LoadResult<f64> {
    match record.get(column).parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 => Ok(f),
        _ => Err(invalid(dataset, record, column, "expected a non-negative number")),
    }
}

fn load_rows<T>(
    dataset: Dataset,
    parsed: &ParseResult,
    convert: impl Fn(&CsvRecord) -> LoadResult<T>,
) -> LoadResult<Vec<T>> {
    dataset.check_headers(&parsed.headers)?;
    parsed.records.iter().map(convert).collect()
}

// =============================================================================
// Typed loaders
// =============================================================================

/// Load the influencer roster.
///
/// Ids are unique: when an id appears twice the first row is kept.
pub fn load_influencers(parsed: &ParseResult) -> LoadResult<Vec<Influencer>> {
    const D: Dataset = Dataset::Influencers;
    let rows = load_rows(D, parsed, |r| {
        Ok(Influencer {
            id: text(D, r, "influencer_id")?,
            name: r.get("name").to_string(),
            platform: r.get("platform").to_string(),
            category: r.get("category").to_string(),
            gender: r.get("gender").to_string(),
        })
    })?;

    let mut seen = HashSet::new();
    let mut influencers = Vec::with_capacity(rows.len());
    for influencer in rows {
        if seen.insert(influencer.id.clone()) {
            influencers.push(influencer);
        } else {
            log_warning(format!(
                "Duplicate influencer_id '{}' in {}, keeping the first row",
                influencer.id,
                D.file_name()
            ));
        }
    }
    Ok(influencers)
}

/// Load the posts file.
pub fn load_posts(parsed: &ParseResult) -> LoadResult<Vec<Post>> {
    const D: Dataset = Dataset::Posts;
    load_rows(D, parsed, |r| {
        Ok(Post {
            influencer_id: text(D, r, "influencer_id")?,
            platform: r.get("platform").to_string(),
            reach: count(D, r, "reach")?,
            likes: count(D, r, "likes")?,
            comments: count(D, r, "comments")?,
        })
    })
}

/// Load the tracking file.
pub fn load_tracking(parsed: &ParseResult) -> LoadResult<Vec<TrackingRecord>> {
    const D: Dataset = Dataset::Tracking;
    load_rows(D, parsed, |r| {
        Ok(TrackingRecord {
            influencer_id: text(D, r, "influencer_id")?,
            revenue: amount(D, r, "revenue")?,
            orders: count(D, r, "orders")?,
        })
    })
}

/// Load the payouts file.
pub fn load_payouts(parsed: &ParseResult) -> LoadResult<Vec<PayoutRecord>> {
    const D: Dataset = Dataset::Payouts;
    load_rows(D, parsed, |r| {
        Ok(PayoutRecord {
            influencer_id: text(D, r, "influencer_id")?,
            basis: PayoutBasis::from_label(r.get("basis")),
            rate: amount(D, r, "rate")?,
            orders: count(D, r, "orders")?,
            total_payout: amount(D, r, "total_payout")?,
        })
    })
}

// =============================================================================
// Inputs and loaded data
// =============================================================================

/// Raw uploads, one optional buffer per dataset.
#[derive(Debug, Clone, Default)]
pub struct CampaignInputs {
    pub influencers: Option<Vec<u8>>,
    pub posts: Option<Vec<u8>>,
    pub tracking: Option<Vec<u8>>,
    pub payouts: Option<Vec<u8>>,
}

impl CampaignInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read whichever files were given. Absent paths stay absent.
    pub fn from_paths(
        influencers: Option<&Path>,
        posts: Option<&Path>,
        tracking: Option<&Path>,
        payouts: Option<&Path>,
    ) -> LoadResult<Self> {
        let mut inputs = Self::new();
        let paths = [influencers, posts, tracking, payouts];
        for (dataset, path) in Dataset::ALL.into_iter().zip(paths) {
            if let Some(path) = path {
                let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
                    dataset,
                    path: path.to_path_buf(),
                    source,
                })?;
                inputs.set(dataset, bytes);
            }
        }
        Ok(inputs)
    }

    pub fn set(&mut self, dataset: Dataset, bytes: Vec<u8>) {
        *self.slot_mut(dataset) = Some(bytes);
    }

    pub fn with(mut self, dataset: Dataset, bytes: impl Into<Vec<u8>>) -> Self {
        self.set(dataset, bytes.into());
        self
    }

    pub fn get(&self, dataset: Dataset) -> Option<&[u8]> {
        match dataset {
            Dataset::Influencers => self.influencers.as_deref(),
            Dataset::Posts => self.posts.as_deref(),
            Dataset::Tracking => self.tracking.as_deref(),
            Dataset::Payouts => self.payouts.as_deref(),
        }
    }

    fn slot_mut(&mut self, dataset: Dataset) -> &mut Option<Vec<u8>> {
        match dataset {
            Dataset::Influencers => &mut self.influencers,
            Dataset::Posts => &mut self.posts,
            Dataset::Tracking => &mut self.tracking,
            Dataset::Payouts => &mut self.payouts,
        }
    }

    /// Datasets that have not been supplied yet.
    pub fn missing(&self) -> Vec<Dataset> {
        Dataset::ALL
            .into_iter()
            .filter(|d| self.get(*d).is_none())
            .collect()
    }
}

/// The four datasets, parsed and typed.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignData {
    pub influencers: Vec<Influencer>,
    pub posts: Vec<Post>,
    pub tracking: Vec<TrackingRecord>,
    pub payouts: Vec<PayoutRecord>,
}

impl CampaignData {
    /// Load all four datasets from raw bytes.
    ///
    /// Returns `Ok(None)` when any input is missing; nothing is parsed then.
    pub fn load(inputs: &CampaignInputs) -> LoadResult<Option<Self>> {
        let (Some(influencers), Some(posts), Some(tracking), Some(payouts)) = (
            inputs.get(Dataset::Influencers),
            inputs.get(Dataset::Posts),
            inputs.get(Dataset::Tracking),
            inputs.get(Dataset::Payouts),
        ) else {
            return Ok(None);
        };

        Ok(Some(Self {
            influencers: load_influencers(&Dataset::Influencers.parse(influencers)?)?,
            posts: load_posts(&Dataset::Posts.parse(posts)?)?,
            tracking: load_tracking(&Dataset::Tracking.parse(tracking)?)?,
            payouts: load_payouts(&Dataset::Payouts.parse(payouts)?)?,
        }))
    }
}

/// Parse and type-check a single file, returning the number of data rows.
pub fn check_file(dataset: Dataset, bytes: &[u8]) -> LoadResult<usize> {
    let parsed = dataset.parse(bytes)?;
    let rows = match dataset {
        Dataset::Influencers => load_influencers(&parsed)?.len(),
        Dataset::Posts => load_posts(&parsed)?.len(),
        Dataset::Tracking => load_tracking(&parsed)?.len(),
        Dataset::Payouts => load_payouts(&parsed)?.len(),
    };
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;
    use std::io::Write;

    const INFLUENCERS: &str = "influencer_id,name,platform,category,gender\n\
        1,Asha,Instagram,Beauty,Female\n\
        2,Ravi,YouTube,Tech,Male\n";

    #[test]
    fn test_load_influencers() {
        let parsed = parse_str(INFLUENCERS, ',').unwrap();
        let influencers = load_influencers(&parsed).unwrap();

        assert_eq!(influencers.len(), 2);
        assert_eq!(influencers[0].id, "1");
        assert_eq!(influencers[1].platform, "YouTube");
    }

    #[test]
    fn test_duplicate_influencer_keeps_first() {
        let csv = format!("{}1,Other,TikTok,Food,Male\n", INFLUENCERS);
        let parsed = parse_str(&csv, ',').unwrap();
        let influencers = load_influencers(&parsed).unwrap();

        assert_eq!(influencers.len(), 2);
        assert_eq!(influencers[0].name, "Asha");
    }

    #[test]
    fn test_missing_columns_fail_fast() {
        let parsed = parse_str("influencer_id,orders\n1,3", ',').unwrap();
        let err = load_tracking(&parsed).unwrap_err();

        match err {
            LoadError::MissingColumns { dataset, missing } => {
                assert_eq!(dataset, Dataset::Tracking);
                assert_eq!(missing, vec!["revenue".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_numeric_value_reports_position() {
        let csv = "influencer_id,platform,reach,likes,comments\n1,Instagram,100,10,5\n2,YouTube,lots,1,1\n";
        let parsed = parse_str(csv, ',').unwrap();
        let err = load_posts(&parsed).unwrap_err();

        match err {
            LoadError::InvalidValue { line, column, value, .. } => {
                assert_eq!(line, 3);
                assert_eq!(column, "reach");
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_error_line_counts_blank_lines() {
        let err = check_file(
            Dataset::Tracking,
            b"influencer_id,revenue,orders\n1,10,1\n\n\n2,bad,1\n",
        )
        .unwrap_err();

        match err {
            LoadError::InvalidValue { line, column, .. } => {
                assert_eq!(line, 5);
                assert_eq!(column, "revenue");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_negative_revenue_rejected() {
        let parsed = parse_str("influencer_id,revenue,orders\n1,-5,1", ',').unwrap();
        assert!(matches!(
            load_tracking(&parsed),
            Err(LoadError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_empty_id_rejected() {
        let parsed = parse_str("influencer_id,revenue,orders\n,5,1", ',').unwrap();
        let err = load_tracking(&parsed).unwrap_err();
        assert!(err.to_string().contains("value is required"));
    }

    #[test]
    fn test_integral_float_counts_accepted() {
        let parsed = parse_str("influencer_id,revenue,orders\n1,99.5,3.0", ',').unwrap();
        let tracking = load_tracking(&parsed).unwrap();
        assert_eq!(tracking[0].orders, 3);
        assert!((tracking[0].revenue - 99.5).abs() < 1e-12);
    }

    #[test]
    fn test_load_payouts_with_extra_columns() {
        let csv = "influencer_id,basis,rate,orders,total_payout,notes\n1,per order,50,10,500,q1\n";
        let parsed = parse_str(csv, ',').unwrap();
        let payouts = load_payouts(&parsed).unwrap();

        assert_eq!(payouts[0].basis, PayoutBasis::PerOrder);
        assert_eq!(payouts[0].orders, 10);
        assert!((payouts[0].total_payout - 500.0).abs() < 1e-12);
    }

    #[test]
    fn test_dataset_from_str() {
        assert_eq!("Tracking".parse::<Dataset>().unwrap(), Dataset::Tracking);
        assert_eq!("payouts.csv".parse::<Dataset>().unwrap(), Dataset::Payouts);
        assert!("orders".parse::<Dataset>().is_err());
    }

    #[test]
    fn test_inputs_missing() {
        let inputs = CampaignInputs::new()
            .with(Dataset::Influencers, INFLUENCERS)
            .with(Dataset::Payouts, "influencer_id,basis,rate,orders,total_payout\n");

        assert_eq!(inputs.missing(), vec![Dataset::Posts, Dataset::Tracking]);
        assert!(CampaignData::load(&inputs).unwrap().is_none());
    }

    #[test]
    fn test_from_paths_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("influencers.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(INFLUENCERS.as_bytes()).unwrap();

        let inputs = CampaignInputs::from_paths(Some(&path), None, None, None).unwrap();
        assert!(inputs.get(Dataset::Influencers).is_some());
        assert_eq!(inputs.missing().len(), 3);
    }

    #[test]
    fn test_from_paths_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.csv");
        let err = CampaignInputs::from_paths(None, Some(&path), None, None).unwrap_err();
        assert_eq!(err.dataset(), Dataset::Posts);
    }

    #[test]
    fn test_check_file() {
        assert_eq!(check_file(Dataset::Influencers, INFLUENCERS.as_bytes()).unwrap(), 2);
        assert!(check_file(Dataset::Posts, INFLUENCERS.as_bytes()).is_err());
    }
}
