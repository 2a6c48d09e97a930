use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::CustomerId;

/// A cleaned transaction line: one product on one invoice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionLine {
    pub invoice: String,
    pub stock_code: Option<String>,
    pub description: Option<String>,
    pub quantity: f64,
    pub invoice_date: NaiveDateTime,
    pub price: f64,
    pub customer_id: CustomerId,
    pub country: Option<String>,
}

impl TransactionLine {
    pub fn line_total(&self) -> f64 {
        self.quantity * self.price
    }

    /// Invoices prefixed with `C` are cancellations in the retail export.
    pub fn is_cancellation(&self) -> bool {
        self.invoice.starts_with('C')
    }
}
