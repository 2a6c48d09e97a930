//! Per-customer feature aggregation over cleaned transactions.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::debug;

use cr_core::retail::TransactionLine;
use cr_core::{CoreResult, CustomerFeatures, CustomerId, FEATURE_COLUMNS};

use crate::report::CsvRecord;
use crate::table::{invalid, parse_customer_id, parse_f64, parse_whole, Table};

/// Days per month when converting purchase span.
pub const DAYS_PER_MONTH: f64 = 30.0;

/// Scoring features plus descriptive columns kept for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerProfile {
    pub features: CustomerFeatures,
    pub first_purchase: NaiveDateTime,
    pub last_purchase: NaiveDateTime,
    pub purchase_span_days: i64,
    pub country_mode: Option<String>,
}

#[derive(Default)]
struct Accumulator<'a> {
    first: Option<NaiveDateTime>,
    last: Option<NaiveDateTime>,
    invoices: BTreeSet<&'a str>,
    monetary: f64,
    countries: HashMap<&'a str, usize>,
}

/// Aggregate cleaned lines to one profile per customer, ordered by id.
///
/// Recency is measured against the latest invoice date in the whole batch.
pub fn build_customer_features(lines: &[TransactionLine]) -> Vec<CustomerProfile> {
    let Some(snapshot) = lines.iter().map(|l| l.invoice_date).max() else {
        return Vec::new();
    };

    let mut by_customer: BTreeMap<CustomerId, Accumulator<'_>> = BTreeMap::new();
    for line in lines {
        let acc = by_customer.entry(line.customer_id).or_default();
        acc.first = Some(acc.first.map_or(line.invoice_date, |d| d.min(line.invoice_date)));
        acc.last = Some(acc.last.map_or(line.invoice_date, |d| d.max(line.invoice_date)));
        acc.invoices.insert(line.invoice.as_str());
        acc.monetary += line.line_total();
        if let Some(country) = line.country.as_deref() {
            *acc.countries.entry(country).or_insert(0) += 1;
        }
    }

    let profiles: Vec<CustomerProfile> = by_customer
        .into_iter()
        .filter_map(|(customer_id, acc)| {
            let (first, last) = (acc.first?, acc.last?);
            let frequency = acc.invoices.len() as u64;
            let span_days = (last - first).num_days();
            Some(CustomerProfile {
                features: CustomerFeatures {
                    customer_id,
                    recency_days: (snapshot - last).num_days(),
                    frequency_orders: frequency,
                    monetary_total: acc.monetary,
                    avg_order_value: acc.monetary / frequency as f64,
                    purchase_span_months: (span_days as f64 / DAYS_PER_MONTH).max(1.0),
                },
                first_purchase: first,
                last_purchase: last,
                purchase_span_days: span_days,
                country_mode: mode(&acc.countries),
            })
        })
        .collect();

    debug!(customers = profiles.len(), %snapshot, "built customer features");
    profiles
}

// Most frequent value; ties resolve to the lexicographically smallest.
fn mode(counts: &HashMap<&str, usize>) -> Option<String> {
    counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(k, _)| k.to_string())
}

/// Flat row written to `customer_features.csv`.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureRow {
    pub customer_id: CustomerId,
    pub first_purchase: NaiveDateTime,
    pub last_purchase: NaiveDateTime,
    pub frequency_orders: u64,
    pub monetary_total: f64,
    pub avg_order_value: f64,
    pub country_mode: Option<String>,
    pub recency_days: i64,
    pub purchase_span_days: i64,
    pub purchase_span_months: f64,
}

impl CsvRecord for FeatureRow {
    const HEADER: &'static [&'static str] = &[
        "customer_id",
        "first_purchase",
        "last_purchase",
        "frequency_orders",
        "monetary_total",
        "avg_order_value",
        "country_mode",
        "recency_days",
        "purchase_span_days",
        "purchase_span_months",
    ];
}

impl From<&CustomerProfile> for FeatureRow {
    fn from(p: &CustomerProfile) -> Self {
        Self {
            customer_id: p.features.customer_id,
            first_purchase: p.first_purchase,
            last_purchase: p.last_purchase,
            frequency_orders: p.features.frequency_orders,
            monetary_total: p.features.monetary_total,
            avg_order_value: p.features.avg_order_value,
            country_mode: p.country_mode.clone(),
            recency_days: p.features.recency_days,
            purchase_span_days: p.purchase_span_days,
            purchase_span_months: p.features.purchase_span_months,
        }
    }
}

/// Convert an untyped feature table, rejecting absent columns and duplicates.
pub fn features_from_table(table: &Table) -> CoreResult<Vec<CustomerFeatures>> {
    let idx = table.require_columns(&FEATURE_COLUMNS)?;
    let mut seen = BTreeSet::new();
    let mut out = Vec::with_capacity(table.len());

    for row in 0..table.len() {
        let cell = |i: usize| table.cell(row, idx[i]);
        let customer_id = parse_customer_id(row, cell(0))?;
        if !seen.insert(customer_id) {
            return Err(invalid(row, "customer_id", cell(0)));
        }
        let frequency = parse_whole(row, "frequency_orders", cell(2))?;
        let frequency_orders =
            u64::try_from(frequency).map_err(|_| invalid(row, "frequency_orders", cell(2)))?;
        out.push(CustomerFeatures {
            customer_id,
            recency_days: parse_whole(row, "recency_days", cell(1))?,
            frequency_orders,
            monetary_total: parse_f64(row, "monetary_total", cell(3))?,
            avg_order_value: parse_f64(row, "avg_order_value", cell(4))?,
            purchase_span_months: parse_f64(row, "purchase_span_months", cell(5))?,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use cr_core::CoreError;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    fn line(customer_id: u64, invoice: &str, date: NaiveDateTime, total: f64, country: &str) -> TransactionLine {
        TransactionLine {
            invoice: invoice.to_string(),
            stock_code: None,
            description: None,
            quantity: 1.0,
            invoice_date: date,
            price: total,
            customer_id,
            country: Some(country.to_string()),
        }
    }

    #[test]
    fn aggregates_orders_per_customer() {
        let lines = vec![
            line(1, "A", at(2010, 1, 1), 10.0, "UK"),
            line(1, "B", at(2010, 1, 5), 20.0, "UK"),
            line(2, "C", at(2010, 1, 3), 5.0, "FR"),
        ];
        let profiles = build_customer_features(&lines);
        assert_eq!(profiles.len(), 2);

        let first = &profiles[0].features;
        assert_eq!(first.customer_id, 1);
        assert_eq!(first.frequency_orders, 2);
        assert_eq!(first.monetary_total, 30.0);
        assert_eq!(first.avg_order_value, 15.0);
        assert_eq!(first.recency_days, 0);
        assert_eq!(profiles[0].purchase_span_days, 4);
        assert_eq!(first.purchase_span_months, 1.0);

        let second = &profiles[1].features;
        assert_eq!(second.monetary_total, 5.0);
        assert_eq!(second.recency_days, 2);
        assert_eq!(profiles[1].country_mode.as_deref(), Some("FR"));
    }

    #[test]
    fn lines_on_one_invoice_count_as_one_order() {
        let lines = vec![
            line(9, "X1", at(2011, 2, 1), 4.0, "UK"),
            line(9, "X1", at(2011, 2, 1), 6.0, "UK"),
            line(9, "X2", at(2011, 5, 2), 10.0, "UK"),
        ];
        let profile = &build_customer_features(&lines)[0];
        assert_eq!(profile.features.frequency_orders, 2);
        assert_eq!(profile.features.avg_order_value, 10.0);
        assert_eq!(profile.purchase_span_days, 90);
        assert_eq!(profile.features.purchase_span_months, 3.0);
    }

    #[test]
    fn country_ties_pick_smallest_name() {
        let lines = vec![
            line(3, "A", at(2011, 1, 1), 1.0, "Spain"),
            line(3, "B", at(2011, 1, 2), 1.0, "France"),
        ];
        assert_eq!(build_customer_features(&lines)[0].country_mode.as_deref(), Some("France"));
    }

    #[test]
    fn no_lines_no_customers() {
        assert!(build_customer_features(&[]).is_empty());
    }

    #[test]
    fn feature_table_requires_every_column() {
        let table = Table::from_csv_reader(
            "customer_id,recency_days,frequency_orders,monetary_total,avg_order_value\n1,10,5,100,20\n"
                .as_bytes(),
        )
        .unwrap();
        match features_from_table(&table).unwrap_err() {
            CoreError::MissingColumns { columns } => assert_eq!(columns, vec!["purchase_span_months"]),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn feature_table_rejects_duplicate_customers() {
        let table = Table::from_csv_reader(
            "customer_id,recency_days,frequency_orders,monetary_total,avg_order_value,purchase_span_months\n\
             1,10,5,100,20,2\n\
             1,3,1,10,10,1\n"
                .as_bytes(),
        )
        .unwrap();
        assert!(features_from_table(&table).is_err());
    }

    #[test]
    fn feature_table_parses_rows() {
        let table = Table::from_csv_reader(
            "purchase_span_months,customer_id,recency_days,frequency_orders,monetary_total,avg_order_value\n\
             2.5,17850.0,10,5,100.5,20.1\n"
                .as_bytes(),
        )
        .unwrap();
        let rows = features_from_table(&table).unwrap();
        assert_eq!(
            rows,
            vec![CustomerFeatures {
                customer_id: 17850,
                recency_days: 10,
                frequency_orders: 5,
                monetary_total: 100.5,
                avg_order_value: 20.1,
                purchase_span_months: 2.5,
            }]
        );
    }
}
