use crate::core::api::ApiClient;
use crate::domain::catalog::{Material, MaterialCategory, MaterialFilters, Supplier, SupplierFilters};
use crate::utils::error::Result;

/// Supplier directory and material catalogue lookups.
#[derive(Debug, Clone)]
pub struct CatalogService {
    api: ApiClient,
}

impl CatalogService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn suppliers(&self, filters: &SupplierFilters) -> Result<Vec<Supplier>> {
        let page = self.api.list_suppliers(filters).await?;
        tracing::debug!(count = page.count, "suppliers loaded");
        Ok(page.into_results())
    }

    /// Preferred suppliers first, then by name.
    pub async fn suppliers_sorted(&self, filters: &SupplierFilters) -> Result<Vec<Supplier>> {
        let mut suppliers = self.suppliers(filters).await?;
        suppliers.sort_by(|a, b| {
            b.preferred()
                .cmp(&a.preferred())
                .then_with(|| a.display_name().to_lowercase().cmp(&b.display_name().to_lowercase()))
        });
        Ok(suppliers)
    }

    pub async fn supplier(&self, id: i64) -> Result<Supplier> {
        self.api.get_supplier(id).await
    }

    pub async fn suppliers_by_category(&self, category_type: Option<&str>) -> Result<Vec<Supplier>> {
        self.api.suppliers_by_category(category_type).await
    }

    pub async fn categories(&self, category_type: Option<&str>) -> Result<Vec<MaterialCategory>> {
        Ok(self.api.material_categories(category_type).await?.into_results())
    }

    pub async fn materials(&self, filters: &MaterialFilters) -> Result<Vec<Material>> {
        Ok(self.api.list_materials(filters).await?.into_results())
    }

    pub async fn material(&self, id: i64) -> Result<Material> {
        self.api.get_material(id).await
    }

    /// Blank queries return nothing without calling the backend.
    pub async fn search_materials(&self, text: &str, limit: Option<u32>) -> Result<Vec<Material>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.api.search_materials(text, limit).await?.into_results())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use httpmock::prelude::*;
    use serde_json::json;

    fn service_for(server: &MockServer) -> CatalogService {
        let config = ClientConfig::default().with_base_url(&server.url("/api/"));
        CatalogService::new(ApiClient::new(&config).unwrap())
    }

    #[tokio::test]
    async fn test_preferred_suppliers_first() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/suppliers/suppliers/")
                .query_param("city", "Lima");
            then.status(200).json_body(json!({"count": 3, "results": [
                {"id": 1, "name": "Zeta"},
                {"id": 2, "name": "Beta", "is_preferred": true},
                {"id": 3, "name": "Alfa"}
            ]}));
        });

        let filters = SupplierFilters {
            city: Some("Lima".to_string()),
            ..Default::default()
        };
        let suppliers = service_for(&server).suppliers_sorted(&filters).await.unwrap();

        mock.assert();
        let names: Vec<&str> = suppliers.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Beta", "Alfa", "Zeta"]);
    }

    #[tokio::test]
    async fn test_material_search() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/materials/materials/search/")
                .query_param("q", "látex")
                .query_param("limit", "5");
            then.status(200)
                .json_body(json!([{"id": 4, "name": "Pintura látex", "reference_price": "45.90"}]));
        });

        let service = service_for(&server);
        assert!(service.search_materials("   ", Some(5)).await.unwrap().is_empty());
        let found = service.search_materials("látex", Some(5)).await.unwrap();

        mock.assert_hits(1);
        assert_eq!(found[0].reference_price, Some(45.9));
    }
}
