//! Intervention simulation, budget optimization and policy comparison.

use std::collections::HashSet;

use tracing::info;

use cr_core::{Action, ScenarioName, ScenarioSummary, Segment, SegmentedCustomer, SimulatedCustomer};

pub mod optimizer;
pub mod simulation;

pub use optimizer::{optimize_under_budget, BudgetSelection};
pub use simulation::{enrich_with_simulation_fields, safe_roi, SimulationConfig};

/// Summary rows in fixed scenario order plus the stamped per-customer table.
#[derive(Debug, Clone, Default)]
pub struct ScenarioOutcome {
    pub summary: Vec<ScenarioSummary>,
    pub enriched: Vec<SimulatedCustomer>,
}

pub struct ScenarioRunner {
    cfg: SimulationConfig,
}

impl ScenarioRunner {
    pub fn new(cfg: SimulationConfig) -> Self {
        Self { cfg }
    }

    pub fn run(&self, customers: &[SegmentedCustomer]) -> ScenarioOutcome {
        let mut enriched = enrich_with_simulation_fields(customers, &self.cfg);
        let selection = optimize_under_budget(&enriched, self.cfg.budget, self.cfg.allow_zero_cost);
        for (row, selected) in enriched.iter_mut().zip(selection.mask.iter()) {
            row.selected_under_budget = Some(*selected);
        }

        let summary: Vec<ScenarioSummary> = ScenarioName::ALL
            .iter()
            .map(|&name| {
                let rows = enriched
                    .iter()
                    .zip(selection.mask.iter())
                    .filter(|&(row, &selected)| match name {
                        ScenarioName::OptimizedBudget => selected,
                        _ => policy_targets(name, row),
                    })
                    .map(|(row, _)| row);
                summarize_scenario(name, rows, self.cfg.budget)
            })
            .collect();

        for s in &summary {
            info!(
                scenario = %s.scenario_name,
                customers = s.customers_targeted,
                total_cost = s.total_cost,
                net_profit = s.net_profit,
                roi = s.roi,
                "scenario summarized"
            );
        }

        ScenarioOutcome { summary, enriched }
    }
}

/// Membership for the rule-based policies. The optimized policy is decided by
/// the budget walk, not by a per-row rule, so it never matches here.
pub fn policy_targets(name: ScenarioName, customer: &SimulatedCustomer) -> bool {
    match name {
        ScenarioName::BasePolicy => customer.recommended_action() != Action::NoAction,
        ScenarioName::SaveOnly => customer.segment() == Segment::Save,
        ScenarioName::SaveNurture => matches!(customer.segment(), Segment::Save | Segment::Nurture),
        ScenarioName::OptimizedBudget => false,
    }
}

pub fn summarize_scenario<'a, I>(name: ScenarioName, rows: I, budget: f64) -> ScenarioSummary
where
    I: IntoIterator<Item = &'a SimulatedCustomer>,
{
    let mut customers = HashSet::new();
    let mut total_cost = 0.0;
    let mut expected_profit_saved = 0.0;
    for row in rows {
        customers.insert(row.customer_id());
        total_cost += row.action_cost;
        expected_profit_saved += row.expected_profit_saved;
    }
    let net_profit = expected_profit_saved - total_cost;

    ScenarioSummary {
        scenario_name: name,
        budget,
        customers_targeted: customers.len(),
        total_cost,
        expected_profit_saved,
        net_profit,
        roi: safe_roi(net_profit, total_cost),
    }
}

pub fn run_simulation_scenarios(customers: &[SegmentedCustomer], cfg: &SimulationConfig) -> ScenarioOutcome {
    ScenarioRunner::new(cfg.clone()).run(customers)
}
