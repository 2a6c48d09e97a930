//! Risk/value scoring and segmentation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use cr_core::{CoreError, CoreResult, CustomerFeatures, ScoredCustomer};

pub mod segmentation;
pub mod stats;

pub use segmentation::segment_customers;

use stats::{minmax_scale, percentile_clip, sigmoid};

/// Lower and upper quantile of the outlier band applied before scaling.
pub const CLIP_LOW: f64 = 0.05;
pub const CLIP_HIGH: f64 = 0.95;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskValueConfig {
    pub recency_weight: f64,
    pub frequency_weight: f64,
    pub value_weight_monetary: f64,
    pub value_weight_aov: f64,
    /// Quantile level of the churn-risk distribution that marks "high risk".
    pub risk_threshold: f64,
    /// Quantile level of the value distribution that marks "high value".
    pub value_threshold: f64,
}

impl Default for RiskValueConfig {
    fn default() -> Self {
        Self {
            recency_weight: 2.0,
            frequency_weight: 2.0,
            value_weight_monetary: 0.7,
            value_weight_aov: 0.3,
            risk_threshold: 0.7,
            value_threshold: 0.7,
        }
    }
}

impl RiskValueConfig {
    pub fn validate(&self) -> CoreResult<()> {
        let weights = [
            ("recency_weight", self.recency_weight),
            ("frequency_weight", self.frequency_weight),
            ("value_weight_monetary", self.value_weight_monetary),
            ("value_weight_aov", self.value_weight_aov),
        ];
        for (name, w) in weights {
            if !w.is_finite() || w < 0.0 {
                return Err(CoreError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {w}"
                )));
            }
        }
        for (name, q) in [
            ("risk_threshold", self.risk_threshold),
            ("value_threshold", self.value_threshold),
        ] {
            if !(0.0..=1.0).contains(&q) {
                return Err(CoreError::InvalidConfig(format!(
                    "{name} is a quantile level and must lie in [0, 1], got {q}"
                )));
            }
        }
        Ok(())
    }

    /// Upper bound of `value_score`.
    pub fn max_value_score(&self) -> f64 {
        self.value_weight_monetary + self.value_weight_aov
    }
}

/// A scorer turns a whole feature table into risk and value scores.
///
/// Scores are population-relative, so implementations receive the full batch.
pub trait RiskValueScorer {
    fn score(&self, features: &[CustomerFeatures]) -> CoreResult<Vec<ScoredCustomer>>;
}

/// Fixed-weight scorer: clipped min-max inputs, logistic risk, linear value.
#[derive(Debug, Clone, Default)]
pub struct WeightedRiskValueScorer {
    cfg: RiskValueConfig,
}

impl WeightedRiskValueScorer {
    pub fn new(cfg: RiskValueConfig) -> Self {
        Self { cfg }
    }
}

impl RiskValueScorer for WeightedRiskValueScorer {
    fn score(&self, features: &[CustomerFeatures]) -> CoreResult<Vec<ScoredCustomer>> {
        check_inputs(features)?;

        let recency = scaled_column(features, |f| f.recency_days as f64);
        let frequency = scaled_column(features, |f| f.frequency_orders as f64);
        let monetary = scaled_column(features, |f| f.monetary_total);
        let aov = scaled_column(features, |f| f.avg_order_value);

        let cfg = &self.cfg;
        let scored: Vec<ScoredCustomer> = features
            .iter()
            .enumerate()
            .map(|(i, f)| {
                let risk_raw = cfg.recency_weight * recency[i]
                    + cfg.frequency_weight * (1.0 - frequency[i]);
                ScoredCustomer {
                    features: f.clone(),
                    churn_risk_score: sigmoid(risk_raw),
                    value_score: cfg.value_weight_monetary * monetary[i]
                        + cfg.value_weight_aov * aov[i],
                }
            })
            .collect();

        debug!(customers = scored.len(), "scored risk and value");
        Ok(scored)
    }
}

/// Convenience wrapper around [`WeightedRiskValueScorer`].
pub fn score_risk_value(
    features: &[CustomerFeatures],
    cfg: &RiskValueConfig,
) -> CoreResult<Vec<ScoredCustomer>> {
    WeightedRiskValueScorer::new(cfg.clone()).score(features)
}

fn scaled_column<F>(features: &[CustomerFeatures], get: F) -> Vec<f64>
where
    F: Fn(&CustomerFeatures) -> f64,
{
    let raw: Vec<f64> = features.iter().map(get).collect();
    minmax_scale(&percentile_clip(&raw, CLIP_LOW, CLIP_HIGH))
}

fn check_inputs(features: &[CustomerFeatures]) -> CoreResult<()> {
    for (row, f) in features.iter().enumerate() {
        if f.frequency_orders == 0 {
            return Err(invalid(row, "frequency_orders", f.frequency_orders));
        }
        if f.recency_days < 0 {
            return Err(invalid(row, "recency_days", f.recency_days));
        }
        if !(f.monetary_total.is_finite() && f.monetary_total > 0.0) {
            return Err(invalid(row, "monetary_total", f.monetary_total));
        }
        if !(f.avg_order_value.is_finite() && f.avg_order_value > 0.0) {
            return Err(invalid(row, "avg_order_value", f.avg_order_value));
        }
        // Spans are floored at one month during aggregation.
        if !(f.purchase_span_months.is_finite() && f.purchase_span_months >= 1.0) {
            return Err(invalid(row, "purchase_span_months", f.purchase_span_months));
        }
    }
    Ok(())
}

fn invalid(row: usize, field: &str, value: impl ToString) -> CoreError {
    CoreError::InvalidField {
        row,
        field: field.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(
        id: u64,
        recency: i64,
        frequency: u64,
        monetary: f64,
        aov: f64,
    ) -> CustomerFeatures {
        CustomerFeatures {
            customer_id: id,
            recency_days: recency,
            frequency_orders: frequency,
            monetary_total: monetary,
            avg_order_value: aov,
            purchase_span_months: 1.0,
        }
    }

    fn four_customers() -> Vec<CustomerFeatures> {
        vec![
            features(1, 10, 5, 100.0, 20.0),
            features(2, 100, 1, 50.0, 50.0),
            features(3, 5, 10, 200.0, 20.0),
            features(4, 200, 2, 30.0, 15.0),
        ]
    }

    #[test]
    fn scores_stay_in_bounds() {
        let cfg = RiskValueConfig::default();
        let scored = score_risk_value(&four_customers(), &cfg).unwrap();
        assert_eq!(scored.len(), 4);
        for s in &scored {
            assert!((0.0..=1.0).contains(&s.churn_risk_score));
            assert!(s.value_score >= 0.0 && s.value_score <= cfg.max_value_score());
        }
    }

    #[test]
    fn stale_infrequent_customer_is_riskiest() {
        let scored = score_risk_value(&four_customers(), &RiskValueConfig::default()).unwrap();
        let risk: Vec<f64> = scored.iter().map(|s| s.churn_risk_score).collect();
        assert!(risk[3] > risk[1]);
        assert!(risk[1] > risk[0]);
        assert!(risk[0] > risk[2]);
        // newest, most frequent customer: both risk terms vanish
        assert_eq!(risk[2], 0.5);
    }

    #[test]
    fn value_score_follows_clipped_inputs() {
        let scored = score_risk_value(&four_customers(), &RiskValueConfig::default()).unwrap();
        // monetary clips to [33, 185]; aov clips to [15.75, 45.5]
        let expected_c3 = 0.7 * 1.0 + 0.3 * (4.25 / 29.75);
        assert!((scored[2].value_score - expected_c3).abs() < 1e-12);
        assert_eq!(scored[3].value_score, 0.0);
    }

    #[test]
    fn zero_variance_inputs_degrade_to_zero() {
        let flat = vec![features(1, 7, 3, 90.0, 30.0), features(2, 7, 3, 90.0, 30.0)];
        let scored = score_risk_value(&flat, &RiskValueConfig::default()).unwrap();
        for s in &scored {
            // recency and frequency both scale to zero: sigmoid(2 * 0 + 2 * 1)
            assert!((s.churn_risk_score - sigmoid(2.0)).abs() < 1e-15);
            assert_eq!(s.value_score, 0.0);
        }
    }

    #[test]
    fn empty_table_scores_to_empty() {
        let scored = score_risk_value(&[], &RiskValueConfig::default()).unwrap();
        assert!(scored.is_empty());
    }

    #[test]
    fn zero_frequency_is_rejected() {
        let rows = vec![features(9, 1, 0, 10.0, 10.0)];
        let err = score_risk_value(&rows, &RiskValueConfig::default()).unwrap_err();
        assert!(err.to_string().contains("frequency_orders"));
    }

    #[test]
    fn non_positive_spend_is_rejected() {
        let rows = vec![features(1, 10, 2, 100.0, -500.0)];
        let err = score_risk_value(&rows, &RiskValueConfig::default()).unwrap_err();
        assert!(err.to_string().contains("avg_order_value"));

        let rows = vec![features(1, 10, 2, 0.0, 50.0)];
        let err = score_risk_value(&rows, &RiskValueConfig::default()).unwrap_err();
        assert!(err.to_string().contains("monetary_total"));
    }

    #[test]
    fn sub_month_span_is_rejected() {
        for span in [0.5, -3.0, f64::NAN] {
            let mut row = features(1, 10, 2, 100.0, 50.0);
            row.purchase_span_months = span;
            let err = score_risk_value(&[row], &RiskValueConfig::default()).unwrap_err();
            assert!(matches!(
                err,
                CoreError::InvalidField { ref field, .. } if field == "purchase_span_months"
            ));
        }
    }

    #[test]
    fn scoring_is_deterministic() {
        let cfg = RiskValueConfig::default();
        let a = score_risk_value(&four_customers(), &cfg).unwrap();
        let b = score_risk_value(&four_customers(), &cfg).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn config_rejects_out_of_range_quantile() {
        let cfg = RiskValueConfig {
            risk_threshold: 1.5,
            ..RiskValueConfig::default()
        };
        assert!(cfg.validate().is_err());
        assert!(RiskValueConfig::default().validate().is_ok());
    }
}
