use crate::core::api::ApiClient;
use crate::domain::budget::{BudgetFilters, BudgetItem, RealExpense};
use crate::domain::ports::{Exporter, Storage};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const BUDGET_CSV: &str = "budget_initial.csv";
pub const EXPENSES_CSV: &str = "real_expenses.csv";
pub const SUMMARY_JSON: &str = "financial_summary.json";

pub fn archive_name(project_id: i64) -> String {
    format!("project_{}_budget.zip", project_id)
}

/// Bundles a project's budget tables into one zip archive.
pub struct BudgetExporter<S: Storage> {
    api: ApiClient,
    storage: S,
    output_path: String,
}

impl<S: Storage> BudgetExporter<S> {
    pub fn new(api: ApiClient, storage: S, output_path: impl Into<String>) -> Self {
        Self {
            api,
            storage,
            output_path: output_path.into(),
        }
    }
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn budget_csv(items: &[BudgetItem]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "id",
        "description",
        "category",
        "spaces",
        "quantity",
        "unit",
        "unit_price",
        "total_price",
        "material",
        "supplier",
        "notes",
    ])?;
    for item in items {
        writer.write_record([
            item.id.to_string(),
            item.description.clone(),
            item.category.clone(),
            item.spaces.clone(),
            format!("{:.2}", item.quantity),
            item.unit.clone(),
            format!("{:.2}", item.unit_price),
            format!("{:.2}", item.total_price),
            item.material_name.clone().unwrap_or_else(|| opt(item.material)),
            item.supplier_name.clone().unwrap_or_else(|| opt(item.supplier)),
            item.notes.clone(),
        ])?;
    }
    into_bytes(writer)
}

pub fn expenses_csv(expenses: &[RealExpense]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "id",
        "description",
        "category",
        "purchase_date",
        "quantity",
        "unit",
        "unit_price",
        "discount_percentage",
        "discount_amount",
        "total_price",
        "supplier",
        "invoice_number",
        "payment_method",
        "budget_item",
    ])?;
    for expense in expenses {
        writer.write_record([
            expense.id.to_string(),
            expense.description.clone(),
            expense.category.clone(),
            expense.purchase_date.clone().unwrap_or_default(),
            format!("{:.2}", expense.quantity),
            expense.unit.clone(),
            format!("{:.2}", expense.unit_price),
            format!("{:.2}", expense.discount_percentage),
            format!("{:.2}", expense.discount_amount),
            format!("{:.2}", expense.total_price),
            expense.supplier_name.clone().unwrap_or_else(|| opt(expense.supplier)),
            expense.invoice_number.clone(),
            expense.payment_method.clone(),
            opt(expense.budget_item),
        ])?;
    }
    into_bytes(writer)
}

fn into_bytes(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| crate::utils::error::AppError::IoError(e.into_error()))
}

#[async_trait]
impl<S: Storage> Exporter for BudgetExporter<S> {
    async fn export_project(&self, project_id: i64) -> Result<String> {
        let filters = BudgetFilters::for_project(project_id);
        let items = self.api.list_budget_items(&filters).await?.into_results();
        let expenses = self.api.list_real_expenses(&filters).await?.into_results();
        let dashboard = self.api.project_dashboard(project_id).await?;

        let budget = budget_csv(&items)?;
        let spent = expenses_csv(&expenses)?;
        let summary = serde_json::to_string_pretty(&dashboard.financial_summary)?;

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            zip.start_file::<_, ()>(BUDGET_CSV, FileOptions::default())?;
            zip.write_all(&budget)?;

            zip.start_file::<_, ()>(EXPENSES_CSV, FileOptions::default())?;
            zip.write_all(&spent)?;

            zip.start_file::<_, ()>(SUMMARY_JSON, FileOptions::default())?;
            zip.write_all(summary.as_bytes())?;

            zip.finish()?.into_inner()
        };

        let name = archive_name(project_id);
        tracing::debug!(bytes = zip_data.len(), file = %name, "writing export archive");
        self.storage.write_file(&name, &zip_data).await?;

        let path = format!("{}/{}", self.output_path.trim_end_matches('/'), name);
        tracing::info!(
            project_id,
            items = items.len(),
            expenses = expenses.len(),
            path = %path,
            "budget exported"
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::utils::error::AppError;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::io::Read;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            self.files.lock().await.get(path).cloned().ok_or_else(|| {
                AppError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files
                .lock()
                .await
                .insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    #[test]
    fn test_budget_csv_quotes_commas() {
        let items = vec![BudgetItem {
            id: 1,
            description: "Pintura, látex".to_string(),
            category: "construction".to_string(),
            quantity: 4.0,
            unit_price: 35.5,
            total_price: 142.0,
            material: Some(3),
            ..Default::default()
        }];
        let csv = String::from_utf8(budget_csv(&items).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("id,description,category"));
        assert_eq!(lines[1], "1,\"Pintura, látex\",construction,,4.00,,35.50,142.00,3,,");
    }

    #[tokio::test]
    async fn test_export_writes_archive() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/budgets/budget-items/")
                .query_param("project", "2");
            then.status(200).json_body(json!([
                {"id": 1, "description": "Gypsum", "total_price": "300.00"}
            ]));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/budgets/real-expenses/")
                .query_param("project", "2");
            then.status(200).json_body(json!({"count": 0, "results": []}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/projects/projects/2/dashboard/");
            then.status(200).json_body(json!({
                "project": {"id": 2, "name": "Casa"},
                "financial_summary": {"total_budget": "300.00", "total_expenses": "0.00"}
            }));
        });

        let config = ClientConfig::default().with_base_url(&server.url("/api/"));
        let storage = MockStorage::default();
        let exporter = BudgetExporter::new(ApiClient::new(&config).unwrap(), storage.clone(), "out/");

        let path = exporter.export_project(2).await.unwrap();
        assert_eq!(path, "out/project_2_budget.zip");

        let zip_bytes = storage.get_file("project_2_budget.zip").await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec![BUDGET_CSV, SUMMARY_JSON, EXPENSES_CSV]);

        let mut summary = String::new();
        archive
            .by_name(SUMMARY_JSON)
            .unwrap()
            .read_to_string(&mut summary)
            .unwrap();
        let summary: serde_json::Value = serde_json::from_str(&summary).unwrap();
        assert_eq!(summary["total_budget"], 300.0);
    }
}
