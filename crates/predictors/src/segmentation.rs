//! 2x2 risk/value segmentation with population-relative thresholds.

use tracing::debug;

use cr_core::{ScoredCustomer, Segment, SegmentedCustomer};

use crate::stats::quantile;
use crate::RiskValueConfig;

/// Score cut-offs resolved from the current population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub risk: f64,
    pub value: f64,
}

impl Thresholds {
    /// `None` when there is nobody to rank.
    pub fn from_population(scored: &[ScoredCustomer], cfg: &RiskValueConfig) -> Option<Self> {
        let risk: Vec<f64> = scored.iter().map(|s| s.churn_risk_score).collect();
        let value: Vec<f64> = scored.iter().map(|s| s.value_score).collect();
        Some(Self {
            risk: quantile(&risk, cfg.risk_threshold)?,
            value: quantile(&value, cfg.value_threshold)?,
        })
    }

    pub fn classify(&self, s: &ScoredCustomer) -> Segment {
        let high_risk = s.churn_risk_score >= self.risk;
        let high_value = s.value_score >= self.value;
        Segment::from_flags(high_risk, high_value)
    }
}

pub fn segment_customers(scored: &[ScoredCustomer], cfg: &RiskValueConfig) -> Vec<SegmentedCustomer> {
    let Some(thresholds) = Thresholds::from_population(scored, cfg) else {
        return Vec::new();
    };
    debug!(risk = thresholds.risk, value = thresholds.value, "segment thresholds");

    scored
        .iter()
        .map(|s| {
            let segment = thresholds.classify(s);
            SegmentedCustomer {
                scored: s.clone(),
                segment,
                recommended_action: segment.recommended_action(),
            }
        })
        .collect()
}
