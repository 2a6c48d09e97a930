//! Greedy budget-constrained selection of customers to target.

use std::cmp::Ordering;

use tracing::debug;

use cr_core::SimulatedCustomer;

#[derive(Debug, Clone, Default)]
pub struct BudgetSelection {
    /// Selected rows, in the order the greedy walk picked them.
    pub selected: Vec<SimulatedCustomer>,
    /// Membership aligned to the input table.
    pub mask: Vec<bool>,
    /// Sum of positive action costs spent.
    pub total_cost: f64,
}

impl BudgetSelection {
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

/// First-fit greedy over candidates ranked by expected incremental profit.
///
/// Only rows with positive incremental profit are considered. Ties keep input
/// order. A candidate that does not fit is skipped for good; there is no
/// backtracking, so this approximates rather than solves the 0/1 knapsack.
pub fn optimize_under_budget(
    customers: &[SimulatedCustomer],
    budget: f64,
    allow_zero_cost: bool,
) -> BudgetSelection {
    let mut candidates: Vec<usize> = (0..customers.len())
        .filter(|&i| customers[i].expected_incremental_profit > 0.0)
        .collect();
    // sort_by is stable
    candidates.sort_by(|&a, &b| {
        customers[b]
            .expected_incremental_profit
            .partial_cmp(&customers[a].expected_incremental_profit)
            .unwrap_or(Ordering::Equal)
    });

    let mut mask = vec![false; customers.len()];
    let mut selected = Vec::new();
    let mut total_cost = 0.0;

    for idx in candidates {
        let cost = customers[idx].action_cost;
        if cost == 0.0 && allow_zero_cost {
            mask[idx] = true;
            selected.push(customers[idx].clone());
            continue;
        }
        if total_cost + cost <= budget {
            mask[idx] = true;
            selected.push(customers[idx].clone());
            total_cost += cost;
        }
    }

    debug!(selected = selected.len(), total_cost, budget, "budget selection");
    BudgetSelection {
        selected,
        mask,
        total_cost,
    }
}
