//! Typed client for the RegenerApp REST backend.
//!
//! One shared `reqwest::Client` per `ApiClient`; cloning is cheap and reuses
//! the connection pool. Pointing at a different backend means building a
//! new `ApiClient` from a new config.

use crate::core::form::CalculatorKind;
use crate::domain::budget::{
    BudgetCategorySummary, BudgetFilters, BudgetItem, BudgetItemDraft, CopyMultipleRequest,
    CopyMultipleResponse, CopyToExpenseRequest, ExpenseCategorySummary, FinancialSummaryRecord,
    RealExpense, RealExpenseDraft, RefreshSummaryResponse,
};
use crate::domain::calculation::{
    AddToBudgetRequest, AddToBudgetResponse, CalculationFilters, CalculationRecord,
    CalculationResponse, CalculationType, MaterialSuggestion,
};
use crate::domain::catalog::{
    Material, MaterialCategory, MaterialFilters, Supplier, SupplierFilters, SupplierListing,
    SupplierPrice,
};
use crate::domain::dashboard::Dashboard;
use crate::domain::page::Page;
use crate::domain::ports::ConfigProvider;
use crate::domain::project::{Project, ProjectFilters, ProjectSelectionResponse};
use crate::utils::error::{AppError, Result};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

type Query = [(&'static str, String)];

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        let base_url = Url::parse(config.base_url())?;
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()?;
        tracing::debug!(base_url = %base_url, "API client created");
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.url(path)?;
        tracing::debug!(%method, %url, "API request");
        Ok(self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json"))
    }

    /// Sends the request and decodes a 2xx body. An empty body decodes as
    /// JSON `null`, which is what `()` and `Option<T>` expect.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().clone();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), %url, "API request failed");
            return Err(AppError::Http {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(status = status.as_u16(), %url, bytes = body.len(), "API response");
        let body = if body.trim().is_empty() { "null" } else { body.as_str() };
        serde_json::from_str(body).map_err(|e| AppError::ResponseError {
            message: format!("{} ({})", e, url.path()),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &Query) -> Result<T> {
        self.send(self.request(Method::GET, path)?.query(query)).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.send(self.request(Method::POST, path)?.json(body)).await
    }

    async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.send(self.request(Method::PUT, path)?.json(body)).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let _: Option<Value> = self.send(self.request(Method::DELETE, path)?).await?;
        Ok(())
    }

    // Projects

    pub async fn list_projects(&self, filters: &ProjectFilters) -> Result<Page<Project>> {
        self.get("projects/projects/", &filters.to_query()).await
    }

    pub async fn get_project(&self, id: i64) -> Result<Project> {
        self.get(&format!("projects/projects/{}/", id), &[]).await
    }

    pub async fn create_project(&self, project: &Project) -> Result<Project> {
        self.post("projects/projects/", project).await
    }

    pub async fn update_project(&self, id: i64, project: &Project) -> Result<Project> {
        self.put(&format!("projects/projects/{}/", id), project).await
    }

    /// `PUT` when the project has an id, `POST` otherwise.
    pub async fn save_project(&self, project: &Project) -> Result<Project> {
        match project.id {
            Some(id) => self.update_project(id, project).await,
            None => self.create_project(project).await,
        }
    }

    pub async fn select_project(&self, id: i64) -> Result<ProjectSelectionResponse> {
        self.post(&format!("projects/projects/{}/select_project/", id), &Map::new())
            .await
    }

    pub async fn selected_project(&self) -> Result<Project> {
        self.get("projects/projects/selected/", &[]).await
    }

    pub async fn project_dashboard(&self, id: i64) -> Result<Dashboard> {
        self.get(&format!("projects/projects/{}/dashboard/", id), &[])
            .await
    }

    pub async fn advance_phase(&self, id: i64) -> Result<ProjectSelectionResponse> {
        self.post(&format!("projects/projects/{}/advance_phase/", id), &Map::new())
            .await
    }

    // Materials

    pub async fn material_categories(&self, category_type: Option<&str>) -> Result<Page<MaterialCategory>> {
        let query: Vec<_> = category_type
            .map(|t| ("category_type", t.to_string()))
            .into_iter()
            .collect();
        self.get("materials/categories/", &query).await
    }

    pub async fn list_materials(&self, filters: &MaterialFilters) -> Result<Page<Material>> {
        self.get("materials/materials/", &filters.to_query()).await
    }

    pub async fn get_material(&self, id: i64) -> Result<Material> {
        self.get(&format!("materials/materials/{}/", id), &[]).await
    }

    pub async fn materials_for_calculator(&self, kind: CalculatorKind) -> Result<Page<MaterialSuggestion>> {
        let query = [
            ("calculator_type", kind.code().to_string()),
            ("category_type", kind.material_category_type().to_string()),
        ];
        self.get("materials/materials/for_calculator/", &query).await
    }

    pub async fn search_materials(&self, text: &str, limit: Option<u32>) -> Result<Page<Material>> {
        let mut query = vec![("q", text.to_string())];
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        self.get("materials/materials/search/", &query).await
    }

    // Suppliers

    pub async fn list_suppliers(&self, filters: &SupplierFilters) -> Result<Page<Supplier>> {
        self.get("suppliers/suppliers/", &filters.to_query()).await
    }

    pub async fn get_supplier(&self, id: i64) -> Result<Supplier> {
        self.get(&format!("suppliers/suppliers/{}/", id), &[]).await
    }

    pub async fn suppliers_by_category(&self, category_type: Option<&str>) -> Result<Vec<Supplier>> {
        let query: Vec<_> = category_type
            .map(|t| ("category_type", t.to_string()))
            .into_iter()
            .collect();
        let listing: SupplierListing = self.get("suppliers/suppliers/by_category/", &query).await?;
        Ok(listing.into_suppliers())
    }

    pub async fn supplier_prices(&self, supplier: Option<i64>, material: Option<i64>) -> Result<Page<SupplierPrice>> {
        let mut query = Vec::new();
        if let Some(supplier) = supplier {
            query.push(("supplier", supplier.to_string()));
        }
        if let Some(material) = material {
            query.push(("material", material.to_string()));
        }
        self.get("suppliers/prices/", &query).await
    }

    // Initial budget

    pub async fn list_budget_items(&self, filters: &BudgetFilters) -> Result<Page<BudgetItem>> {
        self.get("budgets/budget-items/", &filters.to_query()).await
    }

    pub async fn create_budget_item(&self, draft: &BudgetItemDraft) -> Result<BudgetItem> {
        self.post("budgets/budget-items/", draft).await
    }

    pub async fn update_budget_item(&self, id: i64, draft: &BudgetItemDraft) -> Result<BudgetItem> {
        self.put(&format!("budgets/budget-items/{}/", id), draft).await
    }

    pub async fn delete_budget_item(&self, id: i64) -> Result<()> {
        self.delete(&format!("budgets/budget-items/{}/", id)).await
    }

    pub async fn copy_to_expense(&self, id: i64, request: &CopyToExpenseRequest) -> Result<RealExpense> {
        self.post(&format!("budgets/budget-items/{}/copy_to_expense/", id), request)
            .await
    }

    pub async fn copy_multiple_to_expenses(&self, request: &CopyMultipleRequest) -> Result<CopyMultipleResponse> {
        self.post("budgets/budget-items/copy-multiple-to-expenses/", request)
            .await
    }

    pub async fn budget_summary_by_category(&self, project_id: i64) -> Result<BudgetCategorySummary> {
        self.get(
            "budgets/budget-items/summary_by_category/",
            &[("project_id", project_id.to_string())],
        )
        .await
    }

    // Real expenses

    pub async fn list_real_expenses(&self, filters: &BudgetFilters) -> Result<Page<RealExpense>> {
        self.get("budgets/real-expenses/", &filters.to_query()).await
    }

    pub async fn create_real_expense(&self, draft: &RealExpenseDraft) -> Result<RealExpense> {
        self.post("budgets/real-expenses/", draft).await
    }

    pub async fn update_real_expense(&self, id: i64, draft: &RealExpenseDraft) -> Result<RealExpense> {
        self.put(&format!("budgets/real-expenses/{}/", id), draft).await
    }

    pub async fn delete_real_expense(&self, id: i64) -> Result<()> {
        self.delete(&format!("budgets/real-expenses/{}/", id)).await
    }

    pub async fn expense_summary_by_category(&self, project_id: i64) -> Result<ExpenseCategorySummary> {
        self.get(
            "budgets/real-expenses/summary_by_category/",
            &[("project_id", project_id.to_string())],
        )
        .await
    }

    // Financial summary

    pub async fn financial_summaries(&self, project: Option<i64>) -> Result<Page<FinancialSummaryRecord>> {
        let query: Vec<_> = project
            .map(|p| ("project", p.to_string()))
            .into_iter()
            .collect();
        self.get("budgets/financial-summary/", &query).await
    }

    pub async fn financial_summary_for_selected_project(&self) -> Result<FinancialSummaryRecord> {
        self.get("budgets/financial-summary/for_selected_project/", &[])
            .await
    }

    pub async fn refresh_financial_summary(&self, id: i64) -> Result<RefreshSummaryResponse> {
        self.post(&format!("budgets/financial-summary/{}/refresh/", id), &Map::new())
            .await
    }

    // Calculations

    pub async fn calculation_types(&self) -> Result<Page<CalculationType>> {
        self.get("calculations/types/", &[]).await
    }

    pub async fn calculate(&self, kind: CalculatorKind, payload: &Map<String, Value>) -> Result<CalculationResponse> {
        tracing::info!(calculator = kind.code(), "running calculation");
        self.post(kind.endpoint(), payload).await
    }

    pub async fn calculation_history(&self, filters: &CalculationFilters) -> Result<Page<CalculationRecord>> {
        self.get("calculations/calculations/", &filters.to_query()).await
    }

    pub async fn add_calculation_to_budget(&self, calculation_id: i64, request: &AddToBudgetRequest) -> Result<AddToBudgetResponse> {
        self.post(
            &format!("calculations/calculations/{}/add_to_budget/", calculation_id),
            request,
        )
        .await
    }

    // Utility

    pub async fn health(&self) -> Result<Value> {
        self.get("health/", &[]).await
    }

    pub async fn app_config(&self) -> Result<Value> {
        self.get("config/", &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> ApiClient {
        let config = ClientConfig::default().with_base_url(&server.url("/api/"));
        ApiClient::new(&config).unwrap()
    }

    #[test]
    fn test_paths_join_under_base() {
        let config = ClientConfig::default().with_base_url("http://localhost:8000/api");
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(
            client.url("projects/projects/3/").unwrap().as_str(),
            "http://localhost:8000/api/projects/projects/3/"
        );
    }

    #[tokio::test]
    async fn test_list_projects_sends_filters() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/projects/projects/")
                .query_param("search", "casa")
                .query_param("status", "in_progress");
            then.status(200).json_body(json!({
                "count": 1, "next": null, "previous": null,
                "results": [{"id": 1, "name": "Casa Surco", "initial_budget": "1500.50"}]
            }));
        });

        let filters = ProjectFilters {
            search: Some("casa".to_string()),
            status: Some("in_progress".to_string()),
            ..Default::default()
        };
        let page = client_for(&server).list_projects(&filters).await.unwrap();

        mock.assert();
        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].initial_budget, Some(1500.5));
    }

    #[tokio::test]
    async fn test_non_success_becomes_http_error() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/api/projects/projects/selected/");
            then.status(404)
                .json_body(json!({"message": "No hay ningún proyecto seleccionado"}));
        });

        let err = client_for(&server).selected_project().await.unwrap_err();

        mock.assert();
        match &err {
            AppError::Http { status, body } => {
                assert_eq!(*status, 404);
                assert!(body.contains("No hay"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.user_friendly_message(), "Recurso no encontrado");
    }

    #[tokio::test]
    async fn test_delete_accepts_empty_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(DELETE).path("/api/budgets/budget-items/7/");
            then.status(204);
        });

        client_for(&server).delete_budget_item(7).await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_unexpected_body_is_response_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/projects/projects/1/");
            then.status(200).body("<html>oops</html>");
        });

        let err = client_for(&server).get_project(1).await.unwrap_err();
        assert!(matches!(err, AppError::ResponseError { .. }));
    }

    #[tokio::test]
    async fn test_calculate_posts_payload_to_kind_endpoint() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/calculations/calculate/led/")
                .json_body_partial(json!({"project_id": 2, "total_length": 12.0}).to_string());
            then.status(200).json_body(json!({
                "calculation_id": 5,
                "calculation_type": "led_strip",
                "calculated_quantity": 12.0,
                "unit": "metros",
                "estimated_cost": null,
                "detailed_results": {},
                "specific_details": {"drivers_needed": 2},
                "material_suggestions": []
            }));
        });

        let mut payload = Map::new();
        payload.insert("project_id".to_string(), json!(2));
        payload.insert("total_length".to_string(), json!(12.0));
        let response = client_for(&server)
            .calculate(CalculatorKind::LedStrip, &payload)
            .await
            .unwrap();

        mock.assert();
        assert_eq!(response.calculation_id, 5);
        assert_eq!(response.specific_details["drivers_needed"], json!(2));
    }
}
