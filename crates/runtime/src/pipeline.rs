//! Scorer → Segmenter → Scenario Runner over one full customer batch.

use tracing::{debug, info};

use cr_core::{CoreResult, CustomerFeatures, ScenarioSummary, SimulatedCustomer};
use cr_predictors::{segment_customers, RiskValueScorer, WeightedRiskValueScorer};
use cr_scenarios::ScenarioRunner;

use crate::config::PipelineConfig;
use crate::metrics::{MetricsRegistry, StageTimer};

#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub summary: Vec<ScenarioSummary>,
    pub action_list: Vec<SimulatedCustomer>,
}

pub struct RetentionPipeline {
    cfg: PipelineConfig,
    metrics: MetricsRegistry,
}

impl RetentionPipeline {
    pub fn new(cfg: PipelineConfig, metrics: MetricsRegistry) -> CoreResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg, metrics })
    }

    pub fn run(&self, features: &[CustomerFeatures]) -> CoreResult<PipelineOutput> {
        let timer = StageTimer::start();

        let scorer = WeightedRiskValueScorer::new(self.cfg.scoring.clone());
        let scored = scorer.score(features)?;
        self.metrics.inc_customers_scored(scored.len() as u64);
        debug!(customers = scored.len(), elapsed_ms = timer.elapsed().as_millis() as u64, "scoring done");

        let segmented = segment_customers(&scored, &self.cfg.scoring);
        for c in &segmented {
            self.metrics.inc_segment(c.segment);
        }

        let outcome = ScenarioRunner::new(self.cfg.simulation.clone()).run(&segmented);
        let selected = outcome
            .enriched
            .iter()
            .filter(|c| c.selected_under_budget == Some(true))
            .count();
        self.metrics.inc_customers_selected(selected as u64);
        self.metrics.inc_scenarios_run(outcome.summary.len() as u64);

        info!(
            customers = outcome.enriched.len(),
            selected,
            elapsed_ms = timer.elapsed().as_millis() as u64,
            "retention pipeline finished"
        );
        Ok(PipelineOutput {
            summary: outcome.summary,
            action_list: outcome.enriched,
        })
    }
}
