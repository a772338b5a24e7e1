use crate::app::budgets::BudgetService;
use crate::core::api::ApiClient;
use crate::core::form::{self, CalculatorKind, FieldSpec, ResultView};
use crate::domain::calculation::{
    AddToBudgetRequest, AddToBudgetResponse, CalculationFilters, CalculationRecord,
    CalculationResponse, MaterialSuggestion,
};
use crate::domain::catalog::{SupplierRef, SupplierWithPrice};
use crate::utils::error::{AppError, Result};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct CalculationOutcome {
    pub response: CalculationResponse,
    pub view: ResultView,
}

/// Runs the backend calculators and turns their results into budget items.
#[derive(Debug, Clone)]
pub struct CalculatorService {
    api: ApiClient,
    budgets: BudgetService,
}

impl CalculatorService {
    pub fn new(api: ApiClient) -> Self {
        Self {
            budgets: BudgetService::new(api.clone()),
            api,
        }
    }

    /// Field configuration registered on the backend for `kind`, merged over
    /// the built-in one, or the built-in one alone when the backend has none.
    ///
    /// Fetches the whole `calculations/types/` listing on every call; callers
    /// that show several forms should keep the result.
    pub async fn form(&self, kind: CalculatorKind) -> Result<Vec<FieldSpec>> {
        let types = self.api.calculation_types().await?;
        let remote = types
            .results
            .into_iter()
            .find(|t| t.code == kind.code() && !t.input_parameters.is_empty());
        match remote {
            Some(calculation_type) => {
                let remote = form::from_input_parameters(&calculation_type.input_parameters)?;
                Ok(form::merge_fields(kind.fields(), remote))
            }
            None => {
                tracing::debug!(calculator = kind.code(), "using built-in form");
                Ok(kind.fields())
            }
        }
    }

    pub async fn run(
        &self,
        kind: CalculatorKind,
        fields: &[FieldSpec],
        input: &BTreeMap<String, String>,
        project_id: i64,
        material_id: Option<i64>,
    ) -> Result<CalculationOutcome> {
        let payload = form::assemble_payload(fields, input, project_id, material_id)?;
        let response = self.api.calculate(kind, &payload).await?;
        tracing::info!(
            calculator = kind.code(),
            calculation_id = response.calculation_id,
            quantity = response.calculated_quantity,
            "calculation finished"
        );
        let view = ResultView::new(kind, &response);
        Ok(CalculationOutcome { response, view })
    }

    pub async fn add_to_budget(&self, calculation_id: i64, request: &AddToBudgetRequest) -> Result<AddToBudgetResponse> {
        if let Some(price) = request.unit_price_override {
            if !price.is_finite() || price < 0.0 {
                return Err(AppError::form("unit_price_override", "precio inválido"));
            }
        }
        let response = self.api.add_calculation_to_budget(calculation_id, request).await?;
        tracing::info!(
            calculation_id,
            budget_item_id = response.budget_item_id,
            "calculation added to budget"
        );
        self.budgets.refresh_summary().await;
        Ok(response)
    }

    pub async fn suggested_materials(&self, kind: CalculatorKind) -> Result<Vec<MaterialSuggestion>> {
        Ok(self.api.materials_for_calculator(kind).await?.into_results())
    }

    pub async fn history(&self, filters: &CalculationFilters) -> Result<Vec<CalculationRecord>> {
        Ok(self.api.calculation_history(filters).await?.into_results())
    }

    /// Current offers for a material, cheapest final price first.
    pub async fn providers_for_material(&self, material_id: i64) -> Result<Vec<SupplierWithPrice>> {
        let rows = self.api.supplier_prices(None, Some(material_id)).await?;
        let mut offers = Vec::with_capacity(rows.len());
        for row in rows.into_results() {
            if row.is_current == Some(false) {
                continue;
            }
            let offer = match &row.supplier {
                SupplierRef::Nested(_) => SupplierWithPrice::from_price_row(&row),
                SupplierRef::Id(id) => {
                    let supplier = self.api.get_supplier(*id).await?;
                    Some(SupplierWithPrice::from_supplier(
                        &supplier,
                        row.price,
                        row.currency.as_deref().unwrap_or("USD"),
                        row.discount_percentage.unwrap_or(0.0),
                    ))
                }
            };
            offers.extend(offer);
        }
        sort_by_final_price(&mut offers);
        Ok(offers)
    }

    /// Suppliers of a category without a quoted price.
    pub async fn providers_for_category(&self, category_type: &str) -> Result<Vec<SupplierWithPrice>> {
        let suppliers = self.api.suppliers_by_category(Some(category_type)).await?;
        Ok(suppliers
            .iter()
            .map(|supplier| SupplierWithPrice::from_supplier(supplier, 0.0, "USD", 0.0))
            .collect())
    }
}

pub fn sort_by_final_price(offers: &mut [SupplierWithPrice]) {
    offers.sort_by(|a, b| a.final_price().total_cmp(&b.final_price()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::domain::catalog::Supplier;
    use httpmock::prelude::*;
    use serde_json::json;

    fn service_for(server: &MockServer) -> CalculatorService {
        let config = ClientConfig::default().with_base_url(&server.url("/api/"));
        CalculatorService::new(ApiClient::new(&config).unwrap())
    }

    #[test]
    fn test_sort_by_final_price() {
        let supplier = Supplier {
            id: 1,
            name: "A".to_string(),
            ..Default::default()
        };
        let mut offers = vec![
            SupplierWithPrice::from_supplier(&supplier, 100.0, "USD", 20.0),
            SupplierWithPrice::from_supplier(&supplier, 90.0, "USD", 0.0),
            SupplierWithPrice::from_supplier(&supplier, 50.0, "USD", 0.0),
        ];
        sort_by_final_price(&mut offers);
        let prices: Vec<f64> = offers.iter().map(|o| o.final_price()).collect();
        assert_eq!(prices, vec![50.0, 80.0, 90.0]);
    }

    #[tokio::test]
    async fn test_form_falls_back_to_built_in() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/calculations/types/");
            then.status(200)
                .json_body(json!([{"id": 1, "name": "Pintura", "code": "paint", "input_parameters": {}}]));
        });

        let fields = service_for(&server).form(CalculatorKind::Paint).await.unwrap();
        assert_eq!(fields, CalculatorKind::Paint.fields());
    }

    #[tokio::test]
    async fn test_form_from_backend_configuration() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/calculations/types/");
            then.status(200).json_body(json!({"count": 1, "results": [{
                "id": 4, "name": "Cintas LED", "code": "led_strip",
                "input_parameters": {
                    "total_length": {"type": "decimal", "label": "Longitud total (m)", "required": true},
                    "voltage": {"type": "integer", "choices": [12, 24], "default": 12}
                }
            }]}));
        });

        let fields = service_for(&server).form(CalculatorKind::LedStrip).await.unwrap();
        let keys: Vec<&str> = fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["total_length", "voltage", "power_per_meter", "strip_type", "meters_per_roll"]
        );
        assert!(fields[0].required);
        assert!(fields[1].required);
        assert_eq!(fields[1].default, Some(json!(12)));
    }

    #[tokio::test]
    async fn test_seeded_backend_form_still_validates_input() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/calculations/types/");
            then.status(200).json_body(json!([{
                "id": 1, "name": "Calculadora de Pintura", "code": "paint",
                "input_parameters": {
                    "area_to_paint": {"type": "decimal", "label": "Área a pintar (m²)", "required": true},
                    "number_of_coats": {"type": "integer", "label": "Número de capas", "default": 2},
                    "paint_type": {"type": "choice", "label": "Tipo de pintura", "choices": ["Látex", "Esmalte"]},
                    "coverage_per_liter": {"type": "decimal", "label": "Rendimiento (m²/L)", "default": 10}
                }
            }]));
        });
        let calculate = server.mock(|when, then| {
            when.method(POST).path("/api/calculations/calculate/paint/");
            then.status(200).json_body(json!({}));
        });

        let service = service_for(&server);
        let fields = service.form(CalculatorKind::Paint).await.unwrap();
        let input = |pairs: &[(&str, &str)]| -> BTreeMap<String, String> {
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
        };

        for bad in [
            input(&[("area_to_paint", "-5"), ("paint_type", "Látex")]),
            input(&[("area_to_paint", "5"), ("number_of_coats", "50"), ("paint_type", "Látex")]),
            input(&[("area_to_paint", "5"), ("number_of_coats", "2")]),
        ] {
            let err = service
                .run(CalculatorKind::Paint, &fields, &bad, 1, None)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::FormError { .. }));
        }
        calculate.assert_hits(0);
    }

    #[tokio::test]
    async fn test_providers_for_category_have_no_price() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/suppliers/suppliers/by_category/")
                .query_param("category_type", "lighting");
            then.status(200).json_body(json!({
                "distributor": {"type_name": "Distribuidor", "count": 1,
                    "suppliers": [{"id": 3, "name": "LuzPerú", "city": "Lima"}]}
            }));
        });

        let offers = service_for(&server)
            .providers_for_category("lighting")
            .await
            .unwrap();
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].price, 0.0);
        assert_eq!(offers[0].currency, "USD");
        assert_eq!(offers[0].location, "Lima");
    }

    #[tokio::test]
    async fn test_add_to_budget_rejects_negative_override() {
        let server = MockServer::start();
        let request = AddToBudgetRequest {
            unit_price_override: Some(-1.0),
            ..Default::default()
        };
        let err = service_for(&server)
            .add_to_budget(1, &request)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::FormError { .. }));
    }
}
