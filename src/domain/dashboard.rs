use crate::domain::decimal::{format_money, lenient_f64};
use crate::domain::project::Project;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct CategoryBalance {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub budgeted: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub spent: f64,
}

impl CategoryBalance {
    pub fn remaining(&self) -> f64 {
        self.budgeted - self.spent
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BudgetByCategory {
    #[serde(default)]
    pub construction: CategoryBalance,
    #[serde(default)]
    pub lighting: CategoryBalance,
    #[serde(default)]
    pub others: CategoryBalance,
}

impl BudgetByCategory {
    /// `(category code, balance)` in display order.
    pub fn entries(&self) -> [(&'static str, CategoryBalance); 3] {
        [
            ("construction", self.construction),
            ("lighting", self.lighting),
            ("others", self.others),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FinancialSummary {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_budget: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_expenses: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub balance: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub budget_utilization_percentage: f64,
    #[serde(default)]
    pub is_over_budget: bool,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub remaining_budget: f64,
    #[serde(default)]
    pub budget_by_category: BudgetByCategory,
}

impl FinancialSummary {
    /// Trusts the backend flag, but also catches a summary that was not
    /// refreshed after the last expense.
    pub fn over_budget(&self) -> bool {
        self.is_over_budget || (self.total_budget > 0.0 && self.total_expenses > self.total_budget)
    }

    pub fn formatted_balance(&self) -> String {
        format_money(self.balance)
    }

    pub fn utilization_text(&self) -> String {
        format!("{:.1}%", self.budget_utilization_percentage)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecentExpense {
    pub description: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_price: f64,
    #[serde(default)]
    pub purchase_date: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DashboardStatistics {
    #[serde(default)]
    pub budget_items_count: u64,
    #[serde(default)]
    pub expenses_count: u64,
    #[serde(default)]
    pub calculations_count: u64,
    #[serde(default)]
    pub recent_expenses: Vec<RecentExpense>,
}

/// `projects/projects/{id}/dashboard/`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Dashboard {
    pub project: Project,
    #[serde(default)]
    pub financial_summary: Option<FinancialSummary>,
    #[serde(default)]
    pub statistics: DashboardStatistics,
}
