use crate::core::api::ApiClient;
use crate::domain::budget::{
    BudgetCategorySummary, BudgetFilters, BudgetItem, BudgetItemDraft, CopyMultipleRequest,
    CopyMultipleResponse, CopyToExpenseRequest, ExpenseCategorySummary, FinancialSummaryRecord,
    RealExpense, RealExpenseDraft,
};
use crate::domain::dashboard::FinancialSummary;
use crate::domain::project::Project;
use crate::utils::error::{AppError, Result};
use crate::utils::validation::{
    validate_greater_than, validate_iso_date, validate_non_empty_string, validate_range,
    validate_required_field, Validate,
};

/// Everything the budget screen shows for one project.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetView {
    pub project: Project,
    pub items: Vec<BudgetItem>,
    pub expenses: Vec<RealExpense>,
    pub summary: FinancialSummary,
}

impl BudgetView {
    pub fn items_total(&self) -> f64 {
        self.items.iter().map(|item| item.total_price).sum()
    }

    pub fn expenses_total(&self) -> f64 {
        self.expenses.iter().map(|expense| expense.total_price).sum()
    }
}

// Checks shared by budget items and real expenses.
fn validate_line(
    project: i64,
    description: &str,
    category: &str,
    quantity: Option<f64>,
    unit_price: Option<f64>,
) -> Result<()> {
    if project <= 0 {
        return Err(AppError::form("project", "proyecto inválido"));
    }
    validate_non_empty_string("description", description)?;
    validate_non_empty_string("category", category)?;
    validate_greater_than("quantity", *validate_required_field("quantity", &quantity)?, 0.0)?;
    validate_greater_than("unit_price", *validate_required_field("unit_price", &unit_price)?, 0.0)?;
    Ok(())
}

impl Validate for BudgetItemDraft {
    fn validate(&self) -> Result<()> {
        validate_line(
            self.project,
            &self.description,
            &self.category,
            self.quantity,
            self.unit_price,
        )
    }
}

impl Validate for RealExpenseDraft {
    fn validate(&self) -> Result<()> {
        validate_line(
            self.project,
            &self.description,
            &self.category,
            self.quantity,
            self.unit_price,
        )?;
        if let Some(pct) = self.discount_percentage {
            validate_range("discount_percentage", pct, 0.0, 100.0)?;
        }
        validate_iso_date(
            "purchase_date",
            validate_required_field("purchase_date", &self.purchase_date)?,
        )
    }
}

/// Initial budget and real expenses of a project.
///
/// Mutations that succeed are followed by a financial summary refresh; a
/// failed refresh is logged and does not fail the mutation.
#[derive(Debug, Clone)]
pub struct BudgetService {
    api: ApiClient,
}

impl BudgetService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn load(&self, project_id: i64) -> Result<BudgetView> {
        let filters = BudgetFilters::for_project(project_id);
        let (items, expenses, dashboard) = tokio::try_join!(
            self.api.list_budget_items(&filters),
            self.api.list_real_expenses(&filters),
            self.api.project_dashboard(project_id),
        )?;

        let summary = dashboard.financial_summary.ok_or_else(|| AppError::ResponseError {
            message: "resumen financiero no disponible".to_string(),
        })?;

        tracing::info!(
            project_id,
            items = items.len(),
            expenses = expenses.len(),
            "budget loaded"
        );
        Ok(BudgetView {
            project: dashboard.project,
            items: items.into_results(),
            expenses: expenses.into_results(),
            summary,
        })
    }

    pub async fn items(&self, filters: &BudgetFilters) -> Result<Vec<BudgetItem>> {
        Ok(self.api.list_budget_items(filters).await?.into_results())
    }

    pub async fn expenses(&self, filters: &BudgetFilters) -> Result<Vec<RealExpense>> {
        Ok(self.api.list_real_expenses(filters).await?.into_results())
    }

    pub async fn save_item(&self, draft: &BudgetItemDraft) -> Result<BudgetItem> {
        draft.validate()?;
        let item = match draft.id {
            Some(id) => self.api.update_budget_item(id, draft).await?,
            None => self.api.create_budget_item(draft).await?,
        };
        tracing::info!(update = draft.is_update(), description = %draft.description, "budget item saved");
        self.refresh_summary().await;
        Ok(item)
    }

    pub async fn delete_item(&self, id: i64) -> Result<()> {
        self.api.delete_budget_item(id).await?;
        tracing::info!(id, "budget item deleted");
        self.refresh_summary().await;
        Ok(())
    }

    pub async fn save_expense(&self, draft: &RealExpenseDraft) -> Result<RealExpense> {
        draft.validate()?;
        let expense = match draft.id {
            Some(id) => self.api.update_real_expense(id, draft).await?,
            None => self.api.create_real_expense(draft).await?,
        };
        tracing::info!(update = draft.is_update(), description = %draft.description, "expense saved");
        self.refresh_summary().await;
        Ok(expense)
    }

    pub async fn delete_expense(&self, id: i64) -> Result<()> {
        self.api.delete_real_expense(id).await?;
        tracing::info!(id, "expense deleted");
        self.refresh_summary().await;
        Ok(())
    }

    pub async fn copy_to_expense(&self, item_id: i64, request: &CopyToExpenseRequest) -> Result<RealExpense> {
        validate_iso_date("purchase_date", &request.purchase_date)?;
        let expense = self.api.copy_to_expense(item_id, request).await?;
        tracing::info!(item_id, expense_id = expense.id, "budget item copied to expenses");
        self.refresh_summary().await;
        Ok(expense)
    }

    pub async fn copy_many_to_expenses(&self, request: &CopyMultipleRequest) -> Result<CopyMultipleResponse> {
        if request.budget_item_ids.is_empty() {
            return Err(AppError::form("budget_item_ids", "seleccione al menos un ítem"));
        }
        validate_iso_date("purchase_date", &request.purchase_date)?;
        let response = self.api.copy_multiple_to_expenses(request).await?;
        if response.errors_count > 0 {
            tracing::warn!(errors = response.errors_count, "some budget items were not copied");
        }
        self.refresh_summary().await;
        Ok(response)
    }

    pub async fn budget_rollup(&self, project_id: i64) -> Result<BudgetCategorySummary> {
        self.api.budget_summary_by_category(project_id).await
    }

    pub async fn expense_rollup(&self, project_id: i64) -> Result<ExpenseCategorySummary> {
        self.api.expense_summary_by_category(project_id).await
    }

    /// Looks up the selected project's summary id, then asks the backend to
    /// recompute it. Returns the refreshed record, or `None` on any failure.
    pub async fn refresh_summary(&self) -> Option<FinancialSummaryRecord> {
        let current = match self.api.financial_summary_for_selected_project().await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(error = %e, "could not fetch financial summary id");
                return None;
            }
        };

        match self.api.refresh_financial_summary(current.id).await {
            Ok(response) => {
                tracing::debug!(summary_id = current.id, "financial summary refreshed");
                Some(response.summary.unwrap_or(current))
            }
            Err(e) => {
                tracing::warn!(summary_id = current.id, error = %e, "financial summary refresh failed");
                None
            }
        }
    }
}
