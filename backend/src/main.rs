//! Influence CLI - Influencer campaign ROI reports from CSV exports
//!
//! # Main Commands
//!
//! ```bash
//! influence report --influencers influencers.csv --posts posts.csv \
//!     --tracking tracking_data.csv --payouts payouts.csv
//! influence serve                      # Start HTTP server (port 3000)
//! ```
//!
//! # Helper Commands
//!
//! ```bash
//! influence options influencers.csv    # List platform/category/gender values
//! influence check posts posts.csv      # Validate one file against its schema
//! ```

use clap::{Parser, Subcommand};
use influence::report::render;
use influence::{
    build_report, check_file, parse_bytes_auto, write_roas_csv, AppConfig, CampaignInputs,
    Dataset, FilterOptions, FilterRequest, ReportOutcome,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "influence")]
#[command(about = "Influencer campaign ROI tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Join the four CSV files and print the campaign report
    Report {
        /// Influencer roster (influencers.csv)
        #[arg(long)]
        influencers: Option<PathBuf>,

        /// Posts (posts.csv)
        #[arg(long)]
        posts: Option<PathBuf>,

        /// Click/order tracking (tracking_data.csv)
        #[arg(long)]
        tracking: Option<PathBuf>,

        /// Payouts (payouts.csv)
        #[arg(long)]
        payouts: Option<PathBuf>,

        /// Keep only these platforms (repeatable, default: all)
        #[arg(long = "platform")]
        platforms: Vec<String>,

        /// Keep only these categories (repeatable, default: all)
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Keep only these genders (repeatable, default: all)
        #[arg(long = "gender")]
        genders: Vec<String>,

        /// Write the ROAS table as CSV
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// Write the full report as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Rows in the top influencers table
        #[arg(long)]
        top: Option<usize>,

        /// Currency symbol for amounts
        #[arg(long)]
        currency: Option<String>,
    },

    /// List the filter values found in an influencer roster
    Options {
        /// Influencer roster CSV
        input: PathBuf,
    },

    /// Validate a CSV file against a dataset schema
    Check {
        /// Dataset kind: influencers, posts, tracking or payouts
        dataset: Dataset,

        /// Input CSV file
        input: PathBuf,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Report {
            influencers,
            posts,
            tracking,
            payouts,
            platforms,
            categories,
            genders,
            export,
            json,
            top,
            currency,
        } => {
            let request = FilterRequest {
                platforms: non_empty(platforms),
                categories: non_empty(categories),
                genders: non_empty(genders),
            };
            let config = AppConfig {
                top_n: top.unwrap_or(config.top_n),
                currency: currency.unwrap_or(config.currency),
                ..config
            };
            cmd_report(
                [
                    influencers.as_deref(),
                    posts.as_deref(),
                    tracking.as_deref(),
                    payouts.as_deref(),
                ],
                &request,
                export.as_deref(),
                json.as_deref(),
                &config,
            )
        }

        Commands::Options { input } => cmd_options(&input),

        Commands::Check { dataset, input } => cmd_check(dataset, &input),

        Commands::Serve { port } => cmd_serve(port.unwrap_or(config.port)).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

fn cmd_report(
    paths: [Option<&Path>; 4],
    request: &FilterRequest,
    export: Option<&Path>,
    json: Option<&Path>,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let [influencers, posts, tracking, payouts] = paths;
    let inputs = CampaignInputs::from_paths(influencers, posts, tracking, payouts)?;

    let report = match build_report(&inputs, request)? {
        ReportOutcome::Ready(report) => report,
        ReportOutcome::Waiting { missing } => {
            let flags: Vec<String> = missing.iter().map(|d| format!("--{}", d.name())).collect();
            eprintln!("⏳ Waiting for input files: {}", flags.join(", "));
            return Ok(());
        }
    };

    println!("{}", render::full_report(&report, &config.currency, config.top_n));

    if let Some(path) = export {
        write_roas_csv(&report.roas, path)?;
        eprintln!("💾 ROAS table written to: {}", path.display());
    }

    if let Some(path) = json {
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
        eprintln!("💾 Report written to: {}", path.display());
    }

    Ok(())
}

fn cmd_options(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = fs::read(input)?;
    let parsed = Dataset::Influencers.parse(&bytes)?;
    let influencers = influence::dataset::load_influencers(&parsed)?;
    let options = FilterOptions::from_influencers(&influencers);

    println!("Platforms:  {}", options.platforms.join(", "));
    println!("Categories: {}", options.categories.join(", "));
    println!("Genders:    {}", options.genders.join(", "));
    Ok(())
}

fn cmd_check(dataset: Dataset, input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Checking {} as {}", input.display(), dataset.file_name());

    let bytes = fs::read(input)?;
    let parsed = parse_bytes_auto(&bytes)?;
    eprintln!("   Encoding: {}", parsed.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(parsed.delimiter));
    eprintln!("   Columns: {}", parsed.headers.join(", "));

    let rows = check_file(dataset, &bytes)?;
    eprintln!("✅ {} valid rows", rows);
    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

async fn cmd_serve(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    influence::server::start_server(port).await
}
