//! Core types and errors for the customer retention pipeline.

pub type CustomerId = u64;

/// Required fields of a customer feature table, in contract order.
pub const FEATURE_COLUMNS: [&str; 6] = [
    "customer_id",
    "recency_days",
    "frequency_orders",
    "monetary_total",
    "avg_order_value",
    "purchase_span_months",
];

#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("missing required columns: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("invalid value {value:?} for field '{field}' at row {row}")]
    InvalidField {
        row: usize,
        field: String,
        value: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;

pub mod retail;
pub mod retention;

pub use retention::{
    Action, CustomerFeatures, ScenarioName, ScenarioSummary, ScoredCustomer, Segment,
    SegmentedCustomer, SimulatedCustomer,
};
