use anyhow::Result;
use httpmock::prelude::*;
use regenerapp_client::app::calculator::CalculatorService;
use regenerapp_client::core::form::CalculatorKind;
use regenerapp_client::domain::calculation::AddToBudgetRequest;
use regenerapp_client::{ApiClient, AppError, ClientConfig};
use serde_json::json;
use std::collections::BTreeMap;

fn calculator(server: &MockServer) -> CalculatorService {
    let config = ClientConfig::default().with_base_url(&server.url("/api/"));
    CalculatorService::new(ApiClient::new(&config).expect("client"))
}

fn inputs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn test_calculate_then_add_to_budget() -> Result<()> {
    let server = MockServer::start();
    let calculate = server.mock(|when, then| {
        when.method(POST)
            .path("/api/calculations/calculate/paint/")
            .json_body_partial(
                r#"{"project_id": 3, "area_to_paint": 25.5, "paint_type": "Látex", "number_of_coats": 2, "material_id": 8}"#,
            );
        then.status(200).json_body(json!({
            "calculation_id": 41,
            "calculation_type": "paint",
            "calculated_quantity": "2.81",
            "unit": "galones",
            "estimated_cost": "126.45",
            "detailed_results": {"area_to_paint": 25.5, "number_of_coats": 2, "waste_factor_applied": 0.1},
            "specific_details": {"paint_type": "Látex", "gallons_needed": 3},
            "material_suggestions": null
        }));
    });
    let add = server.mock(|when, then| {
        when.method(POST)
            .path("/api/calculations/calculations/41/add_to_budget/")
            .json_body(json!({"supplier_id": 5, "spaces": "Sala"}));
        then.status(201).json_body(json!({
            "message": "Cálculo agregado al presupuesto exitosamente",
            "budget_item_id": 77,
            "calculation": {"id": 41, "added_to_budget": true}
        }));
    });
    let lookup = server.mock(|when, then| {
        when.method(GET)
            .path("/api/budgets/financial-summary/for_selected_project/");
        then.status(200).json_body(json!({"id": 2}));
    });
    let refresh = server.mock(|when, then| {
        when.method(POST).path("/api/budgets/financial-summary/2/refresh/");
        then.status(200).json_body(json!({"message": "ok", "summary": {"id": 2, "total_budget": "126.45"}}));
    });

    let service = calculator(&server);
    let kind: CalculatorKind = "Pintura".parse()?;
    let fields = kind.fields();
    let outcome = service
        .run(
            kind,
            &fields,
            &inputs(&[("area_to_paint", "25,5"), ("paint_type", "látex")]),
            3,
            Some(8),
        )
        .await?;

    assert_eq!(outcome.response.calculated_quantity, 2.81);
    assert!(outcome.response.material_suggestions.is_empty());
    assert_eq!(outcome.view.quantity, "2.81 galones");
    assert_eq!(outcome.view.cost, "$126.45");
    assert!(outcome
        .view
        .details
        .contains(&("Factor de Desperdicio".to_string(), "10.0%".to_string())));
    assert!(outcome
        .view
        .specifics
        .contains(&("Galones Necesarios".to_string(), "3".to_string())));

    let request = AddToBudgetRequest {
        supplier_id: Some(5),
        spaces: Some("Sala".to_string()),
        notes: Some("   ".to_string()),
        ..Default::default()
    };
    let response = service
        .add_to_budget(outcome.response.calculation_id, &request)
        .await?;
    assert_eq!(response.budget_item_id, Some(77));

    calculate.assert();
    add.assert();
    lookup.assert();
    refresh.assert();
    Ok(())
}

#[tokio::test]
async fn test_invalid_input_never_reaches_backend() -> Result<()> {
    let server = MockServer::start();
    let calculate = server.mock(|when, then| {
        when.method(POST).path("/api/calculations/calculate/led/");
        then.status(200).json_body(json!({}));
    });

    let service = calculator(&server);
    let kind = CalculatorKind::LedStrip;
    let fields = kind.fields();

    let err = service
        .run(kind, &fields, &inputs(&[("total_length", "doce")]), 1, None)
        .await
        .unwrap_err();
    assert!(matches!(&err, AppError::FormError { field, .. } if field == "total_length"));

    let err = service
        .run(kind, &fields, &inputs(&[("color", "rojo")]), 1, None)
        .await
        .unwrap_err();
    assert!(matches!(&err, AppError::FormError { field, .. } if field == "color"));

    calculate.assert_hits(0);
    Ok(())
}

#[tokio::test]
async fn test_providers_for_material_sorted_by_final_price() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/suppliers/prices/")
            .query_param("material", "8");
        then.status(200).json_body(json!([
            {"supplier": {"id": 1, "name": "Sodimac"}, "price": "60.00", "discount_percentage": "0"},
            {"supplier": {"id": 2, "name": "Maestro"}, "price": "70.00", "discount_percentage": "20.00"},
            {"supplier": 3, "price": "58.00", "currency": "PEN"},
            {"supplier": {"id": 4, "name": "Viejo"}, "price": "10.00", "is_current": false}
        ]));
    });
    let supplier = server.mock(|when, then| {
        when.method(GET).path("/api/suppliers/suppliers/3/");
        then.status(200)
            .json_body(json!({"id": 3, "name": "Promart", "delivery_time": "48h"}));
    });

    let offers = calculator(&server).providers_for_material(8).await?;

    supplier.assert();
    let names: Vec<&str> = offers.iter().map(|o| o.display_name()).collect();
    assert_eq!(names, vec!["Maestro", "Promart", "Sodimac"]);
    assert_eq!(offers[0].formatted_price(), "$56.00");
    assert_eq!(offers[1].currency, "PEN");
    Ok(())
}
