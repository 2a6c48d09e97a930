//! Transaction cleaning: column aliasing, validity filters, line totals.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::info;

use cr_core::retail::TransactionLine;
use cr_core::CoreResult;

use crate::table::{parse_customer_id, parse_f64, Table};

pub const REQUIRED_TRANSACTION_COLUMNS: [&str; 5] =
    ["invoice", "quantity", "price", "invoice_date", "customer_id"];

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Snake-case a header and fold known export aliases onto canonical names.
pub fn normalize_column_name(raw: &str) -> String {
    let snake = raw.trim().to_lowercase().replace([' ', '-'], "_");
    let canonical = match snake.as_str() {
        "invoice_no" | "invoiceno" | "invoice_number" => "invoice",
        "stockcode" => "stock_code",
        "invoicedate" => "invoice_date",
        "unitprice" => "price",
        "customerid" => "customer_id",
        other => other,
    };
    canonical.to_string()
}

pub fn normalize_columns(table: Table) -> Table {
    table.map_headers(normalize_column_name)
}

/// Row counts dropped by each filter, in the order filters apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleaningReport {
    pub rows_in: usize,
    pub missing_customer: usize,
    pub unparsable_date: usize,
    pub cancelled: usize,
    pub non_positive_quantity: usize,
    pub non_positive_price: usize,
    pub non_positive_total: usize,
    pub rows_kept: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CleanedTransactions {
    pub lines: Vec<TransactionLine>,
    pub report: CleaningReport,
}

/// Parse an invoice timestamp. Slash dates are read month-first only.
pub fn parse_invoice_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn optional(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

/// Clean a raw transaction table.
///
/// Empty customer ids and unparsable dates drop the row. Empty quantity or
/// price cells drop the row too; any other non-numeric value is an error.
pub fn clean_transactions(raw: Table) -> CoreResult<CleanedTransactions> {
    let table = normalize_columns(raw);
    let idx = table.require_columns(&REQUIRED_TRANSACTION_COLUMNS)?;
    let (invoice_col, quantity_col, price_col, date_col, customer_col) =
        (idx[0], idx[1], idx[2], idx[3], idx[4]);
    let stock_col = table.column_index("stock_code");
    let description_col = table.column_index("description");
    let country_col = table.column_index("country");

    let mut report = CleaningReport {
        rows_in: table.len(),
        ..CleaningReport::default()
    };
    let mut lines = Vec::new();

    for row in 0..table.len() {
        let customer_raw = table.cell(row, customer_col);
        if customer_raw.is_empty() {
            report.missing_customer += 1;
            continue;
        }
        let customer_id = parse_customer_id(row, customer_raw)?;

        let Some(invoice_date) = parse_invoice_date(table.cell(row, date_col)) else {
            report.unparsable_date += 1;
            continue;
        };

        let invoice = table.cell(row, invoice_col).to_string();
        if invoice.starts_with('C') {
            report.cancelled += 1;
            continue;
        }

        let quantity_raw = table.cell(row, quantity_col);
        let quantity = if quantity_raw.is_empty() {
            None
        } else {
            Some(parse_f64(row, "quantity", quantity_raw)?)
        };
        let Some(quantity) = quantity.filter(|q| *q > 0.0) else {
            report.non_positive_quantity += 1;
            continue;
        };

        let price_raw = table.cell(row, price_col);
        let price = if price_raw.is_empty() {
            None
        } else {
            Some(parse_f64(row, "price", price_raw)?)
        };
        let Some(price) = price.filter(|p| *p > 0.0) else {
            report.non_positive_price += 1;
            continue;
        };

        let line = TransactionLine {
            invoice,
            stock_code: stock_col.and_then(|c| optional(table.cell(row, c))),
            description: description_col.and_then(|c| optional(table.cell(row, c))),
            quantity,
            invoice_date,
            price,
            customer_id,
            country: country_col.and_then(|c| optional(table.cell(row, c))),
        };
        if line.line_total() <= 0.0 {
            report.non_positive_total += 1;
            continue;
        }
        lines.push(line);
    }

    report.rows_kept = lines.len();
    info!(
        rows_in = report.rows_in,
        rows_kept = report.rows_kept,
        cancelled = report.cancelled,
        missing_customer = report.missing_customer,
        "cleaned transactions"
    );
    Ok(CleanedTransactions { lines, report })
}
