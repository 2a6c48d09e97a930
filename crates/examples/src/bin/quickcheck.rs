use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::info;

use cr_runtime::init_tracing;
use cr_views::report::{ACTION_LIST_FILE, ACTION_LIST_REQUIRED_COLUMNS, SUMMARY_FILE};
use cr_views::Table;

/// Sanity checks for pipeline outputs
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output directory for reports
    #[arg(short, long, default_value = "reports")]
    outdir: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let action_list_path = args.outdir.join(ACTION_LIST_FILE);
    let summary_path = args.outdir.join(SUMMARY_FILE);
    for path in [&action_list_path, &summary_path] {
        if !path.exists() {
            bail!("missing {}", path.display());
        }
    }

    let action_list = Table::read_csv(&action_list_path)?;
    let summary = Table::read_csv(&summary_path)?;

    action_list.require_columns(&ACTION_LIST_REQUIRED_COLUMNS)?;
    if summary.is_empty() {
        bail!("simulation summary is empty");
    }

    info!(
        customers = action_list.len(),
        scenarios = summary.len(),
        "quickcheck passed"
    );
    Ok(())
}
