//! Tabular boundary: raw transaction tables in, feature tables and reports out.

pub mod cleaning;
pub mod features;
pub mod report;
pub mod table;

pub use cleaning::{clean_transactions, CleanedTransactions, CleaningReport};
pub use features::{build_customer_features, features_from_table, CustomerProfile, FeatureRow};
pub use report::{write_action_list, write_csv, write_summary, ActionListRow, CsvRecord};
pub use table::Table;

use std::path::Path;

use anyhow::Result;

use cr_core::CustomerFeatures;

/// Read a feature table CSV, checking the full column contract.
pub fn read_feature_table<P: AsRef<Path>>(path: P) -> Result<Vec<CustomerFeatures>> {
    let table = Table::read_csv(path)?;
    Ok(features_from_table(&table)?)
}

/// Read, clean and aggregate a raw transaction CSV.
pub fn load_customer_profiles<P: AsRef<Path>>(path: P) -> Result<(Vec<CustomerProfile>, CleaningReport)> {
    let raw = Table::read_csv(path)?;
    let cleaned = clean_transactions(raw)?;
    Ok((build_customer_features(&cleaned.lines), cleaned.report))
}
