//! Next-period revenue, cost and lift estimates per customer.

use serde::{Deserialize, Serialize};

use cr_core::{Action, CoreError, CoreResult, SegmentedCustomer, SimulatedCustomer};

/// Monthly order rate is clamped to this band before projecting revenue.
pub const MIN_ORDERS_PER_MONTH: f64 = 0.5;
pub const MAX_ORDERS_PER_MONTH: f64 = 2.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub baseline_margin_rate: f64,
    pub discount_rate: f64,
    pub free_shipping_cost: f64,
    pub loyalty_perk_cost: f64,
    pub lift_discount: f64,
    pub lift_free_shipping: f64,
    pub lift_loyalty: f64,
    pub budget: f64,
    /// Zero-cost candidates skip the budget check entirely.
    pub allow_zero_cost: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            baseline_margin_rate: 0.30,
            discount_rate: 0.10,
            free_shipping_cost: 5.0,
            loyalty_perk_cost: 3.0,
            lift_discount: 0.25,
            lift_free_shipping: 0.12,
            lift_loyalty: 0.08,
            budget: 5000.0,
            allow_zero_cost: true,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> CoreResult<()> {
        let knobs = [
            ("baseline_margin_rate", self.baseline_margin_rate),
            ("discount_rate", self.discount_rate),
            ("free_shipping_cost", self.free_shipping_cost),
            ("loyalty_perk_cost", self.loyalty_perk_cost),
            ("lift_discount", self.lift_discount),
            ("lift_free_shipping", self.lift_free_shipping),
            ("lift_loyalty", self.lift_loyalty),
            ("budget", self.budget),
        ];
        for (name, v) in knobs {
            if !v.is_finite() || v < 0.0 {
                return Err(CoreError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {v}"
                )));
            }
        }
        Ok(())
    }

    pub fn action_cost(&self, action: Action, expected_revenue: f64) -> f64 {
        match action {
            Action::Discount10 => self.discount_rate * expected_revenue,
            Action::FreeShipping => self.free_shipping_cost,
            Action::LoyaltyPerk => self.loyalty_perk_cost,
            Action::NoAction => 0.0,
        }
    }

    pub fn lift_factor(&self, action: Action) -> f64 {
        match action {
            Action::Discount10 => self.lift_discount,
            Action::FreeShipping => self.lift_free_shipping,
            Action::LoyaltyPerk => self.lift_loyalty,
            Action::NoAction => 0.0,
        }
    }
}

pub fn expected_next_period_revenue(avg_order_value: f64, frequency_orders: u64, span_months: f64) -> f64 {
    let orders_per_month = (frequency_orders as f64 / span_months)
        .clamp(MIN_ORDERS_PER_MONTH, MAX_ORDERS_PER_MONTH);
    avg_order_value * orders_per_month
}

/// Ratio guarded against a zero (or negative) denominator.
pub fn safe_roi(profit: f64, cost: f64) -> f64 {
    if cost > 0.0 {
        profit / cost
    } else {
        0.0
    }
}

pub fn simulate_customer(customer: &SegmentedCustomer, cfg: &SimulationConfig) -> SimulatedCustomer {
    let f = customer.features();
    let action = customer.recommended_action;

    let revenue = expected_next_period_revenue(f.avg_order_value, f.frequency_orders, f.purchase_span_months);
    let action_cost = cfg.action_cost(action, revenue);
    let lift_factor = cfg.lift_factor(action);
    let expected_profit_saved = revenue * cfg.baseline_margin_rate * lift_factor;
    let expected_incremental_profit = expected_profit_saved - action_cost;

    SimulatedCustomer {
        segmented: customer.clone(),
        expected_next_period_revenue: revenue,
        action_cost,
        lift_factor,
        expected_profit_saved,
        expected_incremental_profit,
        expected_roi: safe_roi(expected_incremental_profit, action_cost),
        selected_under_budget: None,
    }
}

pub fn enrich_with_simulation_fields(
    customers: &[SegmentedCustomer],
    cfg: &SimulationConfig,
) -> Vec<SimulatedCustomer> {
    customers.iter().map(|c| simulate_customer(c, cfg)).collect()
}
