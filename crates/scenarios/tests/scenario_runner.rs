//! End-to-end checks over scoring, segmentation and the scenario runner.

use cr_core::{
    Action, CustomerFeatures, ScenarioName, ScoredCustomer, Segment, SegmentedCustomer,
};
use cr_predictors::{score_risk_value, segment_customers, RiskValueConfig};
use cr_scenarios::{run_simulation_scenarios, ScenarioRunner, SimulationConfig};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn segmented(id: u64, segment: Segment, frequency: u64, span: f64, aov: f64) -> SegmentedCustomer {
    SegmentedCustomer {
        scored: ScoredCustomer {
            features: CustomerFeatures {
                customer_id: id,
                recency_days: 10,
                frequency_orders: frequency,
                monetary_total: aov * frequency as f64,
                avg_order_value: aov,
                purchase_span_months: span,
            },
            churn_risk_score: 0.5,
            value_score: 0.5,
        },
        segment,
        recommended_action: segment.recommended_action(),
    }
}

/// Deterministic synthetic population with a spread of recency and spend.
fn population(n: u64) -> Vec<CustomerFeatures> {
    (0..n)
        .map(|i| {
            let frequency = 1 + (i * 7) % 13;
            let monetary = 25.0 + ((i * 37) % 101) as f64 * 9.5;
            CustomerFeatures {
                customer_id: 10_000 + i,
                recency_days: ((i * 53) % 365) as i64,
                frequency_orders: frequency,
                monetary_total: monetary,
                avg_order_value: monetary / frequency as f64,
                purchase_span_months: 1.0 + (i % 12) as f64,
            }
        })
        .collect()
}

fn run_full(features: &[CustomerFeatures], sim: &SimulationConfig) -> cr_scenarios::ScenarioOutcome {
    let cfg = RiskValueConfig::default();
    let scored = score_risk_value(features, &cfg).unwrap();
    let segmented = segment_customers(&scored, &cfg);
    run_simulation_scenarios(&segmented, sim)
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn two_customer_example_summaries() {
    let rows = vec![
        segmented(1, Segment::Save, 5, 2.0, 20.0),
        segmented(2, Segment::LetGo, 2, 1.0, 30.0),
    ];
    let outcome = run_simulation_scenarios(&rows, &SimulationConfig::default());

    let first = &outcome.enriched[0];
    assert!(close(first.expected_incremental_profit, -1.0));
    assert!(close(first.expected_roi, -0.25));

    let base = &outcome.summary[0];
    assert_eq!(base.scenario_name, ScenarioName::BasePolicy);
    assert_eq!(base.customers_targeted, 1);
    assert!(close(base.total_cost, 4.0));
    assert!(close(base.expected_profit_saved, 3.0));
    assert!(close(base.net_profit, -1.0));
    assert!(close(base.roi, -0.25));

    // nothing has positive incremental profit, so the optimizer targets nobody
    let optimized = &outcome.summary[3];
    assert_eq!(optimized.scenario_name, ScenarioName::OptimizedBudget);
    assert_eq!(optimized.customers_targeted, 0);
    assert_eq!(optimized.roi, 0.0);
    assert!(outcome.enriched.iter().all(|c| c.selected_under_budget == Some(false)));
}

#[test]
fn summary_has_four_rows_in_fixed_order_for_any_population() {
    for n in [0, 1, 4, 250] {
        let outcome = run_full(&population(n), &SimulationConfig::default());
        let names: Vec<ScenarioName> = outcome.summary.iter().map(|s| s.scenario_name).collect();
        assert_eq!(names, ScenarioName::ALL.to_vec(), "population of {n}");
        assert_eq!(outcome.enriched.len(), n as usize);
    }
}

#[test]
fn optimized_policy_respects_tight_budget() {
    let sim = SimulationConfig {
        budget: 40.0,
        ..SimulationConfig::default()
    };
    let outcome = run_full(&population(400), &sim);

    let spent: f64 = outcome
        .enriched
        .iter()
        .filter(|c| c.selected_under_budget == Some(true) && c.action_cost > 0.0)
        .map(|c| c.action_cost)
        .sum();
    assert!(spent <= 40.0 + 1e-9, "spent {spent}");

    let selected = outcome
        .enriched
        .iter()
        .filter(|c| c.selected_under_budget == Some(true))
        .count();
    assert_eq!(outcome.summary[3].customers_targeted, selected);
    for c in outcome.enriched.iter().filter(|c| c.selected_under_budget == Some(true)) {
        assert!(c.expected_incremental_profit > 0.0);
    }
}

#[test]
fn rule_based_policies_nest() {
    let outcome = run_full(&population(300), &SimulationConfig::default());
    let [base, save, save_nurture, _] = [
        &outcome.summary[0],
        &outcome.summary[1],
        &outcome.summary[2],
        &outcome.summary[3],
    ];
    assert!(save.customers_targeted <= save_nurture.customers_targeted);
    assert!(save_nurture.customers_targeted <= base.customers_targeted);

    let acting = outcome
        .enriched
        .iter()
        .filter(|c| c.recommended_action() != Action::NoAction)
        .count();
    assert_eq!(base.customers_targeted, acting);
}

#[test]
fn every_row_carries_a_valid_segment_and_action() {
    let outcome = run_full(&population(120), &SimulationConfig::default());
    for c in &outcome.enriched {
        assert!(Segment::ALL.contains(&c.segment()));
        assert_eq!(c.recommended_action(), c.segment().recommended_action());
        assert!(c.expected_roi.is_finite());
        if c.action_cost == 0.0 {
            assert_eq!(c.expected_roi, 0.0);
        }
    }
}

#[test]
fn runner_is_deterministic() {
    let features = population(150);
    let runner = ScenarioRunner::new(SimulationConfig::default());
    let cfg = RiskValueConfig::default();
    let segmented = segment_customers(&score_risk_value(&features, &cfg).unwrap(), &cfg);

    let a = runner.run(&segmented);
    let b = runner.run(&segmented);
    assert_eq!(a.summary, b.summary);
    assert_eq!(a.enriched, b.enriched);
}
