use crate::core::pricing;
use crate::domain::decimal::{format_money, lenient_f64, lenient_opt_f64};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Deserialize)]
#[serde(untagged)]
enum IdOrObject {
    Id(i64),
    Object { id: i64 },
}

/// Foreign keys come back as a bare id on list/create responses and as a
/// nested object on detail responses; only the id is kept.
fn related_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<IdOrObject>::deserialize(deserializer)?.map(|value| match value {
            IdOrObject::Id(id) | IdOrObject::Object { id } => id,
        }),
    )
}

/// A planned line of a project's initial budget.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BudgetItem {
    #[serde(default)]
    pub id: i64,
    #[serde(default, deserialize_with = "related_id")]
    pub project: Option<i64>,
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub category_display: Option<String>,
    #[serde(default)]
    pub spaces: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub unit_price: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_price: f64,
    #[serde(default, deserialize_with = "related_id")]
    pub material: Option<i64>,
    #[serde(default)]
    pub material_name: Option<String>,
    #[serde(default, deserialize_with = "related_id")]
    pub supplier: Option<i64>,
    #[serde(default)]
    pub supplier_name: Option<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default, deserialize_with = "related_id")]
    pub created_from_calculation: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl BudgetItem {
    pub fn formatted_total(&self) -> String {
        format_money(self.total_price)
    }

    pub fn category_label(&self) -> String {
        match self.category_display.as_deref() {
            Some(display) if !display.is_empty() => display.to_string(),
            _ => crate::core::translations::category_to_spanish(&self.category),
        }
    }

    /// Draft prefilled from this item, for editing.
    pub fn to_draft(&self) -> BudgetItemDraft {
        BudgetItemDraft {
            id: Some(self.id),
            project: self.project.unwrap_or_default(),
            description: self.description.clone(),
            category: self.category.clone(),
            spaces: self.spaces.clone(),
            quantity: Some(self.quantity),
            unit: self.unit.clone(),
            unit_price: Some(self.unit_price),
            material: self.material,
            supplier: self.supplier,
            notes: self.notes.clone(),
            discount: None,
        }
    }
}

/// A recorded purchase against a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RealExpense {
    #[serde(default)]
    pub id: i64,
    #[serde(default, deserialize_with = "related_id")]
    pub project: Option<i64>,
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub category_display: Option<String>,
    #[serde(default)]
    pub spaces: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub unit_price: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub discount_percentage: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub discount_amount: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_price: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_discount: f64,
    #[serde(default)]
    pub purchase_date: Option<String>,
    #[serde(default)]
    pub invoice_number: String,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default, deserialize_with = "related_id")]
    pub material: Option<i64>,
    #[serde(default)]
    pub material_name: Option<String>,
    #[serde(default, deserialize_with = "related_id")]
    pub supplier: Option<i64>,
    #[serde(default)]
    pub supplier_name: Option<String>,
    #[serde(default, deserialize_with = "related_id")]
    pub budget_item: Option<i64>,
    #[serde(default)]
    pub budget_item_description: Option<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl RealExpense {
    pub fn formatted_total(&self) -> String {
        format_money(self.total_price)
    }

    pub fn category_label(&self) -> String {
        match self.category_display.as_deref() {
            Some(display) if !display.is_empty() => display.to_string(),
            _ => crate::core::translations::category_to_spanish(&self.category),
        }
    }

    pub fn to_draft(&self) -> RealExpenseDraft {
        RealExpenseDraft {
            id: Some(self.id),
            project: self.project.unwrap_or_default(),
            budget_item: self.budget_item,
            description: self.description.clone(),
            category: self.category.clone(),
            spaces: self.spaces.clone(),
            quantity: Some(self.quantity),
            unit: self.unit.clone(),
            unit_price: Some(self.unit_price),
            discount_percentage: Some(self.discount_percentage),
            discount_amount: Some(self.discount_amount),
            purchase_date: self.purchase_date.clone(),
            invoice_number: self.invoice_number.clone(),
            payment_method: self.payment_method.clone(),
            material: self.material,
            supplier: self.supplier,
            notes: self.notes.clone(),
        }
    }
}

/// Create/update payload for an initial-budget line. `id` decides between
/// `POST` and `PUT` and is never sent in the body.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct BudgetItemDraft {
    #[serde(skip)]
    pub id: Option<i64>,
    pub project: i64,
    pub description: String,
    pub category: String,
    pub spaces: String,
    pub quantity: Option<f64>,
    pub unit: String,
    pub unit_price: Option<f64>,
    pub material: Option<i64>,
    pub supplier: Option<i64>,
    pub notes: String,
    /// Client-side only: a fraction (0..=1) or a fixed amount (>1).
    #[serde(skip)]
    pub discount: Option<f64>,
}

impl BudgetItemDraft {
    pub fn is_update(&self) -> bool {
        self.id.is_some()
    }

    pub fn total_price(&self) -> f64 {
        pricing::budget_total(self.quantity, self.unit_price, self.discount)
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct RealExpenseDraft {
    #[serde(skip)]
    pub id: Option<i64>,
    pub project: i64,
    pub budget_item: Option<i64>,
    pub description: String,
    pub category: String,
    pub spaces: String,
    pub quantity: Option<f64>,
    pub unit: String,
    pub unit_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<String>,
    pub invoice_number: String,
    pub payment_method: String,
    pub material: Option<i64>,
    pub supplier: Option<i64>,
    pub notes: String,
}

impl RealExpenseDraft {
    pub fn is_update(&self) -> bool {
        self.id.is_some()
    }

    pub fn total_price(&self) -> f64 {
        pricing::expense_total(
            self.quantity,
            self.unit_price,
            self.discount_percentage,
            self.discount_amount,
        )
    }
}

/// Query filters shared by the budget-item and real-expense listings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetFilters {
    pub project: Option<i64>,
    pub category: Option<String>,
    pub supplier: Option<i64>,
    pub search: Option<String>,
    pub selected_project_only: bool,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl BudgetFilters {
    pub fn for_project(project: i64) -> Self {
        Self {
            project: Some(project),
            ..Default::default()
        }
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(project) = self.project {
            query.push(("project", project.to_string()));
        }
        if let Some(category) = &self.category {
            query.push(("category", category.clone()));
        }
        if let Some(supplier) = self.supplier {
            query.push(("supplier", supplier.to_string()));
        }
        if let Some(search) = &self.search {
            query.push(("search", search.clone()));
        }
        if self.selected_project_only {
            query.push(("selected_project_only", "true".to_string()));
        }
        if let Some(date_from) = &self.date_from {
            query.push(("date_from", date_from.clone()));
        }
        if let Some(date_to) = &self.date_to {
            query.push(("date_to", date_to.clone()));
        }
        query
    }
}

/// Overrides for `copy_to_expense`. Unset fields fall back to the item.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CopyToExpenseRequest {
    pub purchase_date: String,
    #[serde(rename = "supplier_id", skip_serializing_if = "Option::is_none")]
    pub supplier: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CopyMultipleRequest {
    pub budget_item_ids: Vec<i64>,
    pub purchase_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_supplier: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CopyMultipleResponse {
    #[serde(default)]
    pub created_expenses_count: usize,
    #[serde(default)]
    pub created_expense_ids: Vec<i64>,
    #[serde(default)]
    pub errors_count: usize,
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BudgetCategoryRollup {
    pub category: String,
    #[serde(default)]
    pub category_display: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_amount: f64,
    #[serde(default)]
    pub items_count: u64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub average_item_cost: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BudgetCategorySummary {
    #[serde(default)]
    pub project_id: serde_json::Value,
    #[serde(default)]
    pub by_category: Vec<BudgetCategoryRollup>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_budget: f64,
    #[serde(default)]
    pub total_items: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExpenseCategoryRollup {
    pub category: String,
    #[serde(default)]
    pub category_display: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_spent: f64,
    #[serde(default)]
    pub expenses_count: u64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_discount: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub average_expense: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExpenseCategorySummary {
    #[serde(default)]
    pub project_id: serde_json::Value,
    #[serde(default)]
    pub by_category: Vec<ExpenseCategoryRollup>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_expenses: f64,
    #[serde(default)]
    pub total_expense_items: u64,
}

/// Row of `budgets/financial-summary/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FinancialSummaryRecord {
    pub id: i64,
    #[serde(default, deserialize_with = "related_id")]
    pub project: Option<i64>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_budget: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub budget_construction: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub budget_lighting: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub budget_others: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_expenses: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub expenses_construction: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub expenses_lighting: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub expenses_others: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub balance: f64,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub budget_utilization_percentage: Option<f64>,
    #[serde(default)]
    pub is_over_budget: bool,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub remaining_budget: Option<f64>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RefreshSummaryResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub summary: Option<FinancialSummaryRecord>,
}
