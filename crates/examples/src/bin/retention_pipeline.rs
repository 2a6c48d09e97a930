use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info};

use cr_core::CustomerFeatures;
use cr_runtime::{init_tracing, MetricsRegistry, PipelineConfig, RetentionPipeline, StageTimer};
use cr_views::report::{ACTION_LIST_FILE, FEATURES_FILE, SUMMARY_FILE};
use cr_views::{load_customer_profiles, read_feature_table, write_action_list, write_csv, write_summary, FeatureRow};

/// Score, segment and simulate retention interventions for a customer base.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Raw transaction CSV (Online Retail style export)
    #[arg(short, long, conflicts_with = "features")]
    input: Option<PathBuf>,

    /// Prebuilt customer feature CSV; skips cleaning and aggregation
    #[arg(short, long)]
    features: Option<PathBuf>,

    /// Output directory for reports
    #[arg(short, long, default_value = "reports")]
    outdir: PathBuf,

    /// JSON file overriding scoring and simulation knobs
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let timer = StageTimer::start();

    let cfg = PipelineConfig::load(args.config.as_deref())?;
    let metrics = MetricsRegistry::default();
    fs::create_dir_all(&args.outdir)
        .with_context(|| format!("creating {}", args.outdir.display()))?;

    let features = load_features(&args, &metrics)?;

    info!("scoring, segmenting and simulating scenarios");
    let pipeline = RetentionPipeline::new(cfg, metrics.clone())?;
    let output = pipeline.run(&features)?;

    let action_list_path = args.outdir.join(ACTION_LIST_FILE);
    let summary_path = args.outdir.join(SUMMARY_FILE);
    write_action_list(&action_list_path, &output.action_list)?;
    write_summary(&summary_path, &output.summary)?;
    info!(path = %action_list_path.display(), "saved action list");
    info!(path = %summary_path.display(), "saved simulation summary");

    for s in &output.summary {
        info!(
            scenario = %s.scenario_name,
            customers = s.customers_targeted,
            total_cost = %format!("{:.2}", s.total_cost),
            net_profit = %format!("{:.2}", s.net_profit),
            roi = %format!("{:.3}", s.roi),
            "summary"
        );
    }

    info!(
        metrics = %metrics.snapshot().to_json_line("retention_pipeline", Some(timer.elapsed())),
        "pipeline complete"
    );
    Ok(())
}

fn load_features(args: &Args, metrics: &MetricsRegistry) -> Result<Vec<CustomerFeatures>> {
    if let Some(path) = &args.features {
        info!(path = %path.display(), "loading customer features");
        return read_feature_table(path);
    }

    let Some(input) = &args.input else {
        bail!("either --input or --features is required");
    };
    if !input.exists() {
        error!(path = %input.display(), "input file not found");
        bail!("input file not found: {}", input.display());
    }

    info!(path = %input.display(), "loading and cleaning transactions");
    let (profiles, report) = load_customer_profiles(input)?;
    metrics.inc_transactions_read(report.rows_in as u64);
    metrics.inc_transactions_kept(report.rows_kept as u64);

    let features_path = args.outdir.join(FEATURES_FILE);
    let rows: Vec<FeatureRow> = profiles.iter().map(FeatureRow::from).collect();
    write_csv(&features_path, &rows)?;
    info!(path = %features_path.display(), customers = rows.len(), "saved features");

    Ok(profiles.into_iter().map(|p| p.features).collect())
}
