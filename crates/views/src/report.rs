//! Flat CSV contracts handed to downstream reporting.

use std::fs::{self, File};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use cr_core::{Action, CustomerId, ScenarioSummary, Segment, SimulatedCustomer};

pub const ACTION_LIST_FILE: &str = "customer_action_list.csv";
pub const SUMMARY_FILE: &str = "simulation_summary.csv";
pub const FEATURES_FILE: &str = "customer_features.csv";

/// Columns downstream consumers rely on in the action list.
pub const ACTION_LIST_REQUIRED_COLUMNS: [&str; 12] = [
    "customer_id",
    "recency_days",
    "frequency_orders",
    "monetary_total",
    "avg_order_value",
    "churn_risk_score",
    "value_score",
    "segment",
    "recommended_action",
    "expected_incremental_profit",
    "action_cost",
    "expected_roi",
];

/// A flat record with a fixed header, written even when a table has no rows.
pub trait CsvRecord: Serialize {
    const HEADER: &'static [&'static str];
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionListRow {
    pub customer_id: CustomerId,
    pub recency_days: i64,
    pub frequency_orders: u64,
    pub monetary_total: f64,
    pub avg_order_value: f64,
    pub purchase_span_months: f64,
    pub churn_risk_score: f64,
    pub value_score: f64,
    pub segment: Segment,
    pub recommended_action: Action,
    pub expected_next_period_revenue: f64,
    pub action_cost: f64,
    pub lift_factor: f64,
    pub expected_profit_saved: f64,
    pub expected_incremental_profit: f64,
    pub expected_roi: f64,
    pub selected_under_budget: Option<bool>,
}

impl From<&SimulatedCustomer> for ActionListRow {
    fn from(c: &SimulatedCustomer) -> Self {
        let scored = &c.segmented.scored;
        let f = &scored.features;
        Self {
            customer_id: f.customer_id,
            recency_days: f.recency_days,
            frequency_orders: f.frequency_orders,
            monetary_total: f.monetary_total,
            avg_order_value: f.avg_order_value,
            purchase_span_months: f.purchase_span_months,
            churn_risk_score: scored.churn_risk_score,
            value_score: scored.value_score,
            segment: c.segment(),
            recommended_action: c.recommended_action(),
            expected_next_period_revenue: c.expected_next_period_revenue,
            action_cost: c.action_cost,
            lift_factor: c.lift_factor,
            expected_profit_saved: c.expected_profit_saved,
            expected_incremental_profit: c.expected_incremental_profit,
            expected_roi: c.expected_roi,
            selected_under_budget: c.selected_under_budget,
        }
    }
}

impl CsvRecord for ActionListRow {
    const HEADER: &'static [&'static str] = &[
        "customer_id",
        "recency_days",
        "frequency_orders",
        "monetary_total",
        "avg_order_value",
        "purchase_span_months",
        "churn_risk_score",
        "value_score",
        "segment",
        "recommended_action",
        "expected_next_period_revenue",
        "action_cost",
        "lift_factor",
        "expected_profit_saved",
        "expected_incremental_profit",
        "expected_roi",
        "selected_under_budget",
    ];
}

impl CsvRecord for ScenarioSummary {
    const HEADER: &'static [&'static str] = &[
        "scenario_name",
        "budget",
        "customers_targeted",
        "total_cost",
        "expected_profit_saved",
        "net_profit",
        "roi",
    ];
}

/// Serialize rows with a header line, creating parent directories.
///
/// An empty table still gets its header so readers can check columns.
pub fn write_csv<T, P>(path: P, rows: &[T]) -> Result<()>
where
    T: CsvRecord,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);
    if rows.is_empty() {
        writer.write_record(T::HEADER)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_action_list<P: AsRef<Path>>(path: P, customers: &[SimulatedCustomer]) -> Result<()> {
    let rows: Vec<ActionListRow> = customers.iter().map(ActionListRow::from).collect();
    write_csv(path, &rows)
}

pub fn write_summary<P: AsRef<Path>>(path: P, summary: &[ScenarioSummary]) -> Result<()> {
    write_csv(path, summary)
}
