use crate::domain::decimal::{format_money, lenient_f64, lenient_opt_f64};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Calculator registered on the backend (`calculations/types/`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CalculationType {
    pub id: i64,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub category_display: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    /// Field configuration: `{key: {type, label, required, default, choices}}`.
    #[serde(default)]
    pub input_parameters: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MaterialSuggestion {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub category_type: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub unit_display: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub reference_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub yield_per_unit: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub waste_factor: Option<f64>,
    #[serde(default)]
    pub has_price: Option<bool>,
    #[serde(default)]
    pub price_display: Option<String>,
}

impl MaterialSuggestion {
    pub fn has_price(&self) -> bool {
        self.reference_price.is_some_and(|p| p > 0.0)
    }

    pub fn formatted_price(&self) -> String {
        match self.reference_price {
            Some(price) => format_money(price),
            None => "Sin precio".to_string(),
        }
    }
}

/// Result of a `calculations/calculate/<kind>/` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CalculationResponse {
    pub calculation_id: i64,
    pub calculation_type: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub calculated_quantity: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub estimated_cost: Option<f64>,
    #[serde(default)]
    pub detailed_results: Map<String, Value>,
    #[serde(default)]
    pub specific_details: Map<String, Value>,
    #[serde(default, deserialize_with = "suggestions")]
    pub material_suggestions: Vec<MaterialSuggestion>,
}

// The backend sends `null` when the suggestion lookup fails.
fn suggestions<'de, D>(deserializer: D) -> Result<Vec<MaterialSuggestion>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<MaterialSuggestion>>::deserialize(deserializer)?.unwrap_or_default())
}

impl CalculationResponse {
    pub fn formatted_quantity(&self) -> String {
        format!("{:.2} {}", self.calculated_quantity, self.unit)
    }

    pub fn formatted_cost(&self) -> String {
        match self.estimated_cost {
            Some(cost) if cost > 0.0 => format_money(cost),
            _ => "Seleccione proveedor".to_string(),
        }
    }
}

/// Body of `calculations/calculations/{id}/add_to_budget/`. Blank strings
/// are left out so the backend applies its own defaults.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct AddToBudgetRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price_override: Option<f64>,
    #[serde(skip_serializing_if = "blank")]
    pub spaces: Option<String>,
    #[serde(skip_serializing_if = "blank")]
    pub notes: Option<String>,
}

fn blank(value: &Option<String>) -> bool {
    !matches!(value.as_deref(), Some(v) if !v.trim().is_empty())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AddToBudgetResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub budget_item_id: Option<i64>,
    #[serde(default)]
    pub calculation: Option<Value>,
}

/// History row from `calculations/calculations/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CalculationRecord {
    pub id: i64,
    #[serde(default)]
    pub project: Option<i64>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub calculation_type: Value,
    #[serde(default)]
    pub calculation_type_name: Option<String>,
    #[serde(default)]
    pub material: Value,
    #[serde(default)]
    pub material_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub calculated_quantity: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub estimated_cost: Option<f64>,
    #[serde(default)]
    pub added_to_budget: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculationFilters {
    pub project: Option<i64>,
    pub calculation_type: Option<i64>,
    pub added_to_budget: Option<bool>,
}

impl CalculationFilters {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(project) = self.project {
            query.push(("project", project.to_string()));
        }
        if let Some(calculation_type) = self.calculation_type {
            query.push(("calculation_type", calculation_type.to_string()));
        }
        if let Some(added) = self.added_to_budget {
            query.push(("added_to_budget", added.to_string()));
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decodes_paint_response() {
        let body = json!({
            "calculation_id": 41,
            "calculation_type": "paint",
            "calculated_quantity": "27.50",
            "unit": "litros",
            "estimated_cost": null,
            "detailed_results": {"total_area": 100.0, "waste_factor_applied": 0.1},
            "specific_details": {"paint_type": "Látex", "number_of_coats": 2},
            "material_suggestions": [
                {"id": 1, "name": "Pintura Látex Blanco", "code": "PL-01", "reference_price": "45.00"}
            ]
        });
        let response: CalculationResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.formatted_quantity(), "27.50 litros");
        assert_eq!(response.formatted_cost(), "Seleccione proveedor");
        assert_eq!(response.material_suggestions[0].formatted_price(), "$45.00");
        assert!(response.material_suggestions[0].has_price());
    }

    #[test]
    fn test_null_suggestions_are_empty() {
        let response: CalculationResponse = serde_json::from_value(json!({
            "calculation_id": 1,
            "calculation_type": "cable",
            "calculated_quantity": 110.0,
            "unit": "metros",
            "estimated_cost": 250.0,
            "material_suggestions": null
        }))
        .unwrap();
        assert!(response.material_suggestions.is_empty());
        assert_eq!(response.formatted_cost(), "$250.00");
    }

    #[test]
    fn test_add_to_budget_omits_blank_strings() {
        let request = AddToBudgetRequest {
            supplier_id: Some(3),
            unit_price_override: None,
            spaces: Some("  ".to_string()),
            notes: Some("Sala".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"supplier_id": 3, "notes": "Sala"})
        );
    }
}
