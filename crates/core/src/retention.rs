use std::fmt;

use serde::{Deserialize, Serialize};

use crate::CustomerId;

/// One row of the customer feature table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerFeatures {
    pub customer_id: CustomerId,
    pub recency_days: i64,
    pub frequency_orders: u64,
    pub monetary_total: f64,
    pub avg_order_value: f64,
    pub purchase_span_months: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Segment {
    Save,
    Protect,
    Nurture,
    LetGo,
}

impl Segment {
    pub const ALL: [Segment; 4] = [Segment::Save, Segment::Protect, Segment::Nurture, Segment::LetGo];

    /// Place a customer on the 2x2 risk/value grid.
    pub fn from_flags(high_risk: bool, high_value: bool) -> Self {
        match (high_risk, high_value) {
            (true, true) => Segment::Save,
            (false, true) => Segment::Protect,
            (true, false) => Segment::Nurture,
            (false, false) => Segment::LetGo,
        }
    }

    pub fn recommended_action(self) -> Action {
        match self {
            Segment::Save => Action::Discount10,
            Segment::Protect => Action::LoyaltyPerk,
            Segment::Nurture => Action::FreeShipping,
            Segment::LetGo => Action::NoAction,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Segment::Save => "Save",
            Segment::Protect => "Protect",
            Segment::Nurture => "Nurture",
            Segment::LetGo => "LetGo",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Action {
    Discount10,
    LoyaltyPerk,
    FreeShipping,
    NoAction,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Discount10 => "Discount10",
            Action::LoyaltyPerk => "LoyaltyPerk",
            Action::FreeShipping => "FreeShipping",
            Action::NoAction => "NoAction",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Features plus churn-risk and value scores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredCustomer {
    pub features: CustomerFeatures,
    /// Logistic transform of the weighted risk inputs, in [0, 1].
    pub churn_risk_score: f64,
    /// Weighted sum of scaled monetary and AOV, bounded by the weight sum.
    pub value_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SegmentedCustomer {
    pub scored: ScoredCustomer,
    pub segment: Segment,
    pub recommended_action: Action,
}

impl SegmentedCustomer {
    pub fn customer_id(&self) -> CustomerId {
        self.scored.features.customer_id
    }

    pub fn features(&self) -> &CustomerFeatures {
        &self.scored.features
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulatedCustomer {
    pub segmented: SegmentedCustomer,
    pub expected_next_period_revenue: f64,
    pub action_cost: f64,
    pub lift_factor: f64,
    pub expected_profit_saved: f64,
    pub expected_incremental_profit: f64,
    pub expected_roi: f64,
    /// Only stamped once the budget optimizer has run.
    pub selected_under_budget: Option<bool>,
}

impl SimulatedCustomer {
    pub fn customer_id(&self) -> CustomerId {
        self.segmented.customer_id()
    }

    pub fn segment(&self) -> Segment {
        self.segmented.segment
    }

    pub fn recommended_action(&self) -> Action {
        self.segmented.recommended_action
    }
}

/// The four fixed policies, in reporting order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ScenarioName {
    BasePolicy,
    SaveOnly,
    SaveNurture,
    OptimizedBudget,
}

impl ScenarioName {
    pub const ALL: [ScenarioName; 4] = [
        ScenarioName::BasePolicy,
        ScenarioName::SaveOnly,
        ScenarioName::SaveNurture,
        ScenarioName::OptimizedBudget,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ScenarioName::BasePolicy => "BasePolicy",
            ScenarioName::SaveOnly => "SaveOnly",
            ScenarioName::SaveNurture => "SaveNurture",
            ScenarioName::OptimizedBudget => "OptimizedBudget",
        }
    }
}

impl fmt::Display for ScenarioName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioSummary {
    pub scenario_name: ScenarioName,
    pub budget: f64,
    pub customers_targeted: usize,
    pub total_cost: f64,
    pub expected_profit_saved: f64,
    pub net_profit: f64,
    pub roi: f64,
}
