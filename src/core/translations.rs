//! Spanish labels for calculation detail keys and budget categories.

use crate::domain::decimal::format_money;
use serde_json::Value;

const DETAIL_LABELS: &[(&str, &str)] = &[
    ("total_length", "Longitud Total"),
    ("base_length", "Longitud Base"),
    ("area_to_paint", "Área a Pintar"),
    ("area_to_cover", "Área a Cubrir"),
    ("number_of_coats", "Número de Capas"),
    ("paint_type", "Tipo de Pintura"),
    ("coverage_per_liter", "Rendimiento por Litro"),
    ("total_liters_needed", "Litros Totales Necesarios"),
    ("gallons_needed", "Galones Necesarios"),
    ("profile_type", "Tipo de Perfil"),
    ("profile_size", "Tamaño del Perfil"),
    ("finish_type", "Tipo de Acabado"),
    ("profiles_needed", "Perfiles Necesarios"),
    ("accessories_count", "Cantidad de Accesorios"),
    ("standard_length", "Longitud Estándar"),
    ("waste_factor_applied", "Factor de Desperdicio"),
    ("thickness", "Espesor"),
    ("gypsum_type", "Tipo de Gypsum"),
    ("sheets_needed", "Planchas Necesarias"),
    ("linear_meters_profile", "Metros Lineales de Perfil"),
    ("sheet_area", "Área por Plancha"),
    ("sheets_base", "Planchas Base"),
    ("empaste_type", "Tipo de Empaste"),
    ("coverage_per_kg", "Rendimiento por Kg"),
    ("kg_base", "Kilogramos Base"),
    ("kg_per_sack", "Kg por Saco"),
    ("sacks_needed", "Sacos Necesarios"),
    ("power_per_meter", "Potencia por Metro"),
    ("voltage", "Voltaje"),
    ("strip_type", "Tipo de Cinta"),
    ("total_power", "Potencia Total"),
    ("drivers_needed", "Drivers Necesarios"),
    ("meters_per_roll", "Metros por Rollo"),
    ("rolls_needed", "Rollos Necesarios"),
    ("wire_gauge", "Calibre del Cable"),
    ("cable_type", "Tipo de Cable"),
    ("installation_type", "Tipo de Instalación"),
    ("estimated_cost", "Costo Estimado"),
    ("total_cost", "Costo Total"),
    ("unit_cost", "Costo Unitario"),
    ("total_area", "Área Total"),
    ("calculated_quantity", "Cantidad Calculada"),
    ("base_liters_needed", "Litros Base Necesarios"),
    ("gallons_equivalent", "Equivalente en Galones"),
];

const CATEGORIES: &[(&str, &str)] = &[
    ("construction", "Construcción"),
    ("lighting", "Iluminación"),
    ("electrical", "Eléctrico"),
    ("materials", "Materiales"),
    ("labor", "Mano de Obra"),
    ("services", "Servicios"),
    ("others", "Otros"),
];

pub fn detail_label(key: &str) -> String {
    DETAIL_LABELS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| sentence_case(&key.replace('_', " ")))
}

fn sentence_case(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Formats a detail value with the unit its key implies.
pub fn format_detail_value(key: &str, value: &Value) -> String {
    let number = match value {
        Value::Null => return "No disponible".to_string(),
        Value::String(text) => return text.clone(),
        Value::Number(number) => number,
        other => return other.to_string(),
    };
    let Some(n) = number.as_f64() else {
        return number.to_string();
    };
    let has = |needle: &str| key.contains(needle);

    if has("area") {
        format!("{:.2} m²", n)
    } else if has("length") || has("meters") || has("linear") {
        format!("{:.2} m", n)
    } else if has("cost") || has("price") {
        format_money(n)
    } else if has("percentage") || has("factor") {
        format!("{:.1}%", n * 100.0)
    } else if has("power") {
        format!("{:.2} W", n)
    } else if has("voltage") {
        format!("{}V", number)
    } else if has("thickness") {
        format!("{:.1} mm", n)
    } else if has("coverage") {
        if has("liter") {
            format!("{:.1} m²/L", n)
        } else if has("kg") {
            format!("{:.1} m²/kg", n)
        } else {
            number.to_string()
        }
    } else if has("needed") || has("count") || has("coats") || key == "sheets_base" {
        format!("{:.0}", n)
    } else {
        format!("{:.2}", n)
    }
}

/// Label/value rows for a detail map, in the map's order.
pub fn detail_rows(details: &serde_json::Map<String, Value>) -> Vec<(String, String)> {
    details
        .iter()
        .map(|(key, value)| (detail_label(key), format_detail_value(key, value)))
        .collect()
}

pub fn is_cost_field(key: &str) -> bool {
    key.contains("cost") || key.contains("price")
}

pub fn is_quantity_field(key: &str) -> bool {
    key.contains("needed") || key.contains("quantity")
}

/// Backend category code to its Spanish label.
pub fn category_to_spanish(category: &str) -> String {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        return "Sin Categoría".to_string();
    }
    let lower = trimmed.to_lowercase();
    CATEGORIES
        .iter()
        .find(|(code, _)| *code == lower)
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| sentence_case(trimmed))
}

/// Spanish label back to the backend code; unknown labels are lowercased.
pub fn category_to_english(label: &str) -> String {
    let trimmed = label.trim();
    CATEGORIES
        .iter()
        .find(|(_, spanish)| *spanish == trimmed)
        .map(|(code, _)| code.to_string())
        .unwrap_or_else(|| trimmed.to_lowercase())
}

pub fn is_known_category(category: &str) -> bool {
    let lower = category.trim().to_lowercase();
    CATEGORIES.iter().any(|(code, _)| *code == lower)
}

pub fn all_categories() -> impl Iterator<Item = (&'static str, &'static str)> {
    CATEGORIES.iter().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detail_labels() {
        assert_eq!(detail_label("sheets_needed"), "Planchas Necesarias");
        assert_eq!(detail_label("waste_factor_applied"), "Factor de Desperdicio");
        assert_eq!(detail_label("drivers_with_safety"), "Drivers with safety");
        assert_eq!(detail_label(""), "");
    }

    #[test]
    fn test_format_detail_value_by_key() {
        assert_eq!(format_detail_value("area_to_paint", &json!(25)), "25.00 m²");
        assert_eq!(format_detail_value("linear_meters_profile", &json!(12.345)), "12.35 m");
        assert_eq!(format_detail_value("unit_cost", &json!(3.5)), "$3.50");
        assert_eq!(format_detail_value("waste_factor_applied", &json!(0.1)), "10.0%");
        assert_eq!(format_detail_value("total_power", &json!(96)), "96.00 W");
        assert_eq!(format_detail_value("voltage", &json!(24)), "24V");
        assert_eq!(format_detail_value("thickness", &json!(12.7)), "12.7 mm");
        assert_eq!(format_detail_value("coverage_per_liter", &json!(10)), "10.0 m²/L");
        assert_eq!(format_detail_value("coverage_per_kg", &json!(4)), "4.0 m²/kg");
        assert_eq!(format_detail_value("rolls_needed", &json!(3.0)), "3");
        assert_eq!(format_detail_value("kg_base", &json!(7.5)), "7.50");
    }

    #[test]
    fn test_format_detail_value_non_numbers() {
        assert_eq!(format_detail_value("paint_type", &json!("Látex")), "Látex");
        assert_eq!(format_detail_value("voltage", &json!("12V")), "12V");
        assert_eq!(format_detail_value("estimated_cost", &Value::Null), "No disponible");
        assert_eq!(format_detail_value("has_price", &json!(true)), "true");
    }

    #[test]
    fn test_categories_both_ways() {
        assert_eq!(category_to_spanish("lighting"), "Iluminación");
        assert_eq!(category_to_spanish("Labor"), "Mano de Obra");
        assert_eq!(category_to_spanish("  "), "Sin Categoría");
        assert_eq!(category_to_spanish("plumbing"), "Plumbing");
        assert_eq!(category_to_english("Mano de Obra"), "labor");
        assert_eq!(category_to_english("Jardinería"), "jardinería");
        assert!(is_known_category("Electrical"));
        assert_eq!(all_categories().count(), 7);
    }
}
