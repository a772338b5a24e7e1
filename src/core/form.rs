//! Data-driven calculator forms: field configuration, raw input to request
//! payload, and calculation result rows.

use crate::core::translations;
use crate::domain::calculation::CalculationResponse;
use crate::utils::error::{AppError, Result};
use serde_json::{json, Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalculatorKind {
    Paint,
    Gypsum,
    Empaste,
    LedStrip,
    Profiles,
    Cables,
}

pub const CONSTRUCTION: &str = "Construcción";
pub const LIGHTING: &str = "Iluminación";

impl CalculatorKind {
    pub const ALL: [CalculatorKind; 6] = [
        CalculatorKind::Paint,
        CalculatorKind::Gypsum,
        CalculatorKind::Empaste,
        CalculatorKind::LedStrip,
        CalculatorKind::Profiles,
        CalculatorKind::Cables,
    ];

    /// Code used by `calculations/types/`.
    pub fn code(&self) -> &'static str {
        match self {
            CalculatorKind::Paint => "paint",
            CalculatorKind::Gypsum => "gypsum",
            CalculatorKind::Empaste => "empaste",
            CalculatorKind::LedStrip => "led_strip",
            CalculatorKind::Profiles => "profiles",
            CalculatorKind::Cables => "cable",
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            CalculatorKind::Paint => "calculations/calculate/paint/",
            CalculatorKind::Gypsum => "calculations/calculate/gypsum/",
            CalculatorKind::Empaste => "calculations/calculate/empaste/",
            CalculatorKind::LedStrip => "calculations/calculate/led/",
            CalculatorKind::Profiles => "calculations/calculate/profiles/",
            CalculatorKind::Cables => "calculations/calculate/cables/",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CalculatorKind::Paint => "Pintura",
            CalculatorKind::Gypsum => "Gypsum",
            CalculatorKind::Empaste => "Empaste",
            CalculatorKind::LedStrip => "Cintas LED",
            CalculatorKind::Profiles => "Perfiles",
            CalculatorKind::Cables => "Cables",
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            CalculatorKind::Paint | CalculatorKind::Gypsum | CalculatorKind::Empaste => {
                CONSTRUCTION
            }
            CalculatorKind::LedStrip | CalculatorKind::Profiles | CalculatorKind::Cables => {
                LIGHTING
            }
        }
    }

    /// Backend category code used to look up suggested materials.
    pub fn material_category_type(&self) -> &'static str {
        match self {
            CalculatorKind::Paint | CalculatorKind::Gypsum | CalculatorKind::Empaste => {
                "construction"
            }
            _ => "lighting",
        }
    }

    pub fn in_category(category: &str) -> Vec<CalculatorKind> {
        let category = category.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .filter(|kind| kind.category().to_lowercase() == category)
            .collect()
    }

    /// Built-in field configuration, matching the seeded backend types.
    pub fn fields(&self) -> Vec<FieldSpec> {
        match self {
            CalculatorKind::Paint => vec![
                FieldSpec::decimal("area_to_paint", "Área a pintar (m²)")
                    .hint("Área total a pintar")
                    .min(0.01)
                    .required(),
                FieldSpec::integer("number_of_coats", "Número de capas")
                    .hint("Cantidad de capas de pintura")
                    .range(1, 10)
                    .default_value(json!(2)),
                FieldSpec::choice("paint_type", "Tipo de pintura", &["Látex", "Esmalte"]).required(),
                FieldSpec::decimal("coverage_per_liter", "Rendimiento (m²/L)")
                    .hint("Metros cuadrados por litro")
                    .min(0.1)
                    .default_value(json!(10)),
            ],
            CalculatorKind::Gypsum => vec![
                FieldSpec::decimal("area_to_cover", "Área a cubrir (m²)")
                    .min(0.01)
                    .required(),
                FieldSpec::decimal("thickness", "Espesor (mm)")
                    .min(1.0)
                    .default_value(json!(12.7)),
                FieldSpec::choice("gypsum_type", "Tipo", &["Standard", "Húmedo"]).required(),
            ],
            CalculatorKind::Empaste => vec![
                FieldSpec::decimal("area_to_cover", "Área a empastar (m²)")
                    .min(0.01)
                    .required(),
                FieldSpec::choice(
                    "empaste_type",
                    "Tipo de empaste",
                    &["Interior", "Exterior", "Sellador"],
                )
                .required(),
                FieldSpec::integer("number_of_coats", "Número de capas")
                    .range(1, 10)
                    .default_value(json!(1)),
                FieldSpec::decimal("coverage_per_kg", "Rendimiento (m²/kg)")
                    .min(0.1)
                    .default_value(json!(4.0)),
            ],
            CalculatorKind::LedStrip => vec![
                FieldSpec::decimal("total_length", "Longitud total (m)")
                    .min(0.01)
                    .required(),
                FieldSpec::numeric_choice("power_per_meter", "Potencia (W/m)", &["4.8", "9.6", "14.4"])
                    .required(),
                FieldSpec::choice("voltage", "Voltaje", &["12V", "24V"]).required(),
                FieldSpec::choice("strip_type", "Tipo", &["SMD5050", "SMD2835"]).required(),
                FieldSpec::decimal("meters_per_roll", "Metros por rollo")
                    .min(0.1)
                    .default_value(json!(5.0)),
            ],
            CalculatorKind::Profiles => vec![
                FieldSpec::decimal("total_length", "Longitud total (m)")
                    .min(0.01)
                    .required(),
                FieldSpec::choice(
                    "profile_type",
                    "Tipo de perfil",
                    &["Superficie", "Empotrado", "Suspendido", "Esquina"],
                )
                .required(),
                FieldSpec::choice("profile_size", "Tamaño", &["16mm", "20mm", "25mm", "30mm"])
                    .required(),
                FieldSpec::choice(
                    "finish_type",
                    "Acabado",
                    &["Anodizado", "Blanco", "Negro", "Plateado"],
                )
                .required(),
                FieldSpec::choice("accessories_needed", "Accesorios", &["Básicos", "Completos"])
                    .default_value(json!("Básicos")),
            ],
            CalculatorKind::Cables => vec![
                FieldSpec::decimal("total_length", "Longitud (m)")
                    .min(0.01)
                    .required(),
                FieldSpec::choice("wire_gauge", "Calibre", &["12 AWG", "14 AWG"]).required(),
                FieldSpec::choice("cable_type", "Tipo", &["THHN", "Flexible"]).required(),
                FieldSpec::choice("installation_type", "Instalación", &["Conduit", "Directo"])
                    .required(),
                FieldSpec::decimal("meters_per_roll", "Metros por rollo")
                    .min(0.1)
                    .default_value(json!(100)),
            ],
        }
    }
}

impl fmt::Display for CalculatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for CalculatorKind {
    type Err = AppError;

    /// Accepts backend codes, endpoint slugs and Spanish names, ignoring case.
    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_lowercase();
        let kind = match needle.as_str() {
            "paint" | "pintura" => CalculatorKind::Paint,
            "gypsum" => CalculatorKind::Gypsum,
            "empaste" => CalculatorKind::Empaste,
            "led" | "led_strip" | "cintas led" | "cinta led" => CalculatorKind::LedStrip,
            "profiles" | "perfiles" => CalculatorKind::Profiles,
            "cable" | "cables" => CalculatorKind::Cables,
            _ => return Err(AppError::UnsupportedCalculator(s.to_string())),
        };
        Ok(kind)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Decimal { min: Option<f64> },
    Integer { min: Option<i64>, max: Option<i64> },
    /// `numeric` choices are sent as JSON numbers.
    Choice { options: Vec<String>, numeric: bool },
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    DecimalInput,
    IntegerInput,
    Dropdown,
    TextInput,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub key: String,
    pub label: String,
    pub hint: String,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<Value>,
}

impl FieldSpec {
    fn new(key: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            hint: String::new(),
            kind,
            required: false,
            default: None,
        }
    }

    pub fn decimal(key: &str, label: &str) -> Self {
        Self::new(key, label, FieldKind::Decimal { min: None })
    }

    pub fn integer(key: &str, label: &str) -> Self {
        Self::new(key, label, FieldKind::Integer { min: None, max: None })
    }

    pub fn choice(key: &str, label: &str, options: &[&str]) -> Self {
        let options = options.iter().map(|o| o.to_string()).collect();
        Self::new(key, label, FieldKind::Choice { options, numeric: false })
    }

    pub fn numeric_choice(key: &str, label: &str, options: &[&str]) -> Self {
        let options = options.iter().map(|o| o.to_string()).collect();
        Self::new(key, label, FieldKind::Choice { options, numeric: true })
    }

    pub fn text(key: &str, label: &str) -> Self {
        Self::new(key, label, FieldKind::Text)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn hint(mut self, hint: &str) -> Self {
        self.hint = hint.to_string();
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn min(mut self, value: f64) -> Self {
        if let FieldKind::Decimal { min } = &mut self.kind {
            *min = Some(value);
        }
        self
    }

    pub fn range(mut self, low: i64, high: i64) -> Self {
        if let FieldKind::Integer { min, max } = &mut self.kind {
            *min = Some(low);
            *max = Some(high);
        }
        self
    }

    pub fn widget(&self) -> Widget {
        match self.kind {
            FieldKind::Decimal { .. } => Widget::DecimalInput,
            FieldKind::Integer { .. } => Widget::IntegerInput,
            FieldKind::Choice { .. } => Widget::Dropdown,
            FieldKind::Text => Widget::TextInput,
        }
    }

    /// Helper text shown under the input; derived from the kind when unset.
    pub fn help_text(&self) -> String {
        if !self.hint.is_empty() {
            return self.hint.clone();
        }
        match &self.kind {
            FieldKind::Choice { options, .. } => options.join("/"),
            FieldKind::Integer { min: Some(min), max: Some(max) } => {
                format!("Número entero entre {} y {}", min, max)
            }
            FieldKind::Integer { .. } => "Número entero".to_string(),
            FieldKind::Decimal { .. } => "Valor numérico".to_string(),
            FieldKind::Text => String::new(),
        }
    }

    /// Parses one raw user value into its JSON form.
    pub fn parse(&self, raw: &str) -> Result<Value> {
        let raw = raw.trim();
        match &self.kind {
            FieldKind::Decimal { min } => {
                let value = parse_decimal(raw).ok_or_else(|| {
                    AppError::form(&self.key, format!("'{}' no es un número válido", raw))
                })?;
                if let Some(min) = min {
                    if value < *min {
                        return Err(AppError::form(
                            &self.key,
                            format!("debe ser mayor o igual a {}", min),
                        ));
                    }
                }
                Number::from_f64(value)
                    .map(Value::Number)
                    .ok_or_else(|| AppError::form(&self.key, "número fuera de rango"))
            }
            FieldKind::Integer { min, max } => {
                let value: i64 = raw.parse().map_err(|_| {
                    AppError::form(&self.key, format!("'{}' no es un número entero", raw))
                })?;
                if min.is_some_and(|min| value < min) || max.is_some_and(|max| value > max) {
                    let bounds = match (min, max) {
                        (Some(min), Some(max)) => format!("entre {} y {}", min, max),
                        (Some(min), None) => format!("mayor o igual a {}", min),
                        (None, Some(max)) => format!("menor o igual a {}", max),
                        (None, None) => String::new(),
                    };
                    return Err(AppError::form(&self.key, format!("debe estar {}", bounds)));
                }
                Ok(json!(value))
            }
            FieldKind::Choice { options, numeric } => {
                let needle = raw.to_lowercase();
                let option = options
                    .iter()
                    .find(|option| option.to_lowercase() == needle)
                    .ok_or_else(|| {
                        AppError::form(
                            &self.key,
                            format!("'{}' no es una opción válida ({})", raw, options.join(", ")),
                        )
                    })?;
                if *numeric {
                    parse_decimal(option)
                        .and_then(Number::from_f64)
                        .map(Value::Number)
                        .ok_or_else(|| AppError::form(&self.key, "opción numérica inválida"))
                } else {
                    Ok(Value::String(option.clone()))
                }
            }
            FieldKind::Text => Ok(Value::String(raw.to_string())),
        }
    }
}

// Accepts the decimal comma as well.
fn parse_decimal(raw: &str) -> Option<f64> {
    raw.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Builds a field configuration from a backend `input_parameters` object.
pub fn from_input_parameters(parameters: &Map<String, Value>) -> Result<Vec<FieldSpec>> {
    let mut fields = Vec::with_capacity(parameters.len());
    for (key, spec) in parameters {
        let spec = spec.as_object().ok_or_else(|| AppError::ResponseError {
            message: format!("field configuration for '{}' is not an object", key),
        })?;
        let label = spec
            .get("label")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| translations::detail_label(key));
        let choices: Option<Vec<String>> = spec.get("choices").and_then(Value::as_array).map(|items| {
            items
                .iter()
                .map(|item| match item {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                })
                .collect()
        });
        let field_type = spec.get("type").and_then(Value::as_str).unwrap_or("text");

        let kind = match (field_type, choices) {
            ("decimal", Some(options)) | ("integer", Some(options)) => FieldKind::Choice {
                options,
                numeric: true,
            },
            ("choice", Some(options)) => FieldKind::Choice {
                options,
                numeric: false,
            },
            ("decimal", None) => FieldKind::Decimal {
                min: spec.get("min").and_then(Value::as_f64),
            },
            ("integer", None) => FieldKind::Integer {
                min: spec.get("min").and_then(Value::as_i64),
                max: spec.get("max").and_then(Value::as_i64),
            },
            _ => FieldKind::Text,
        };

        fields.push(FieldSpec {
            key: key.clone(),
            label,
            hint: spec
                .get("hint")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            kind,
            required: spec.get("required").and_then(Value::as_bool).unwrap_or(false),
            default: spec.get("default").filter(|v| !v.is_null()).cloned(),
        });
    }
    Ok(fields)
}

/// Lays a backend field configuration over the built-in one for the same
/// calculator.
///
/// The backend decides order, labels, defaults and choice options. Bounds and
/// required flags come from `built_in` as well, since the seeded backend types
/// carry neither. Built-in fields the backend does not list are kept at the end.
pub fn merge_fields(built_in: Vec<FieldSpec>, remote: Vec<FieldSpec>) -> Vec<FieldSpec> {
    let mut local: Vec<Option<FieldSpec>> = built_in.into_iter().map(Some).collect();
    let mut merged = Vec::with_capacity(local.len().max(remote.len()));

    for field in remote {
        let known = local
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|f| f.key == field.key))
            .and_then(Option::take);
        let Some(known) = known else {
            merged.push(field);
            continue;
        };

        let kind = match (known.kind, field.kind) {
            (FieldKind::Decimal { min }, FieldKind::Decimal { min: remote_min }) => {
                FieldKind::Decimal { min: min.or(remote_min) }
            }
            (
                FieldKind::Integer { min, max },
                FieldKind::Integer {
                    min: remote_min,
                    max: remote_max,
                },
            ) => FieldKind::Integer {
                min: min.or(remote_min),
                max: max.or(remote_max),
            },
            (_, choice @ FieldKind::Choice { .. }) => choice,
            (kind, _) => kind,
        };

        merged.push(FieldSpec {
            key: field.key,
            label: field.label,
            hint: if field.hint.is_empty() { known.hint } else { field.hint },
            kind,
            required: known.required || field.required,
            default: field.default.or(known.default),
        });
    }

    merged.extend(local.into_iter().flatten());
    merged
}

/// Turns raw user strings into the request body of a calculation.
///
/// Keys not in `fields` are rejected. Empty optional fields take their
/// default or are left out.
pub fn assemble_payload(
    fields: &[FieldSpec],
    input: &BTreeMap<String, String>,
    project_id: i64,
    material_id: Option<i64>,
) -> Result<Map<String, Value>> {
    if let Some(unknown) = input.keys().find(|key| !fields.iter().any(|f| &f.key == *key)) {
        return Err(AppError::form(unknown, "campo desconocido para esta calculadora"));
    }

    let mut payload = Map::new();
    payload.insert("project_id".to_string(), json!(project_id));

    for field in fields {
        let raw = input.get(&field.key).map(|v| v.trim()).unwrap_or_default();
        if raw.is_empty() {
            if field.required {
                return Err(AppError::form(&field.key, "campo requerido"));
            }
            if let Some(default) = &field.default {
                payload.insert(field.key.clone(), default.clone());
            }
            continue;
        }
        payload.insert(field.key.clone(), field.parse(raw)?);
    }

    if let Some(material_id) = material_id {
        payload.insert("material_id".to_string(), json!(material_id));
    }
    Ok(payload)
}

/// Printable rows for a calculation result.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub title: String,
    pub quantity: String,
    pub cost: String,
    pub details: Vec<(String, String)>,
    pub specifics: Vec<(String, String)>,
    pub suggestions: Vec<String>,
}

impl ResultView {
    pub fn new(kind: CalculatorKind, response: &CalculationResponse) -> Self {
        Self {
            title: format!("Calculadora de {}", kind.display_name()),
            quantity: response.formatted_quantity(),
            cost: response.formatted_cost(),
            details: translations::detail_rows(&response.detailed_results),
            specifics: translations::detail_rows(&response.specific_details),
            suggestions: response
                .material_suggestions
                .iter()
                .map(|s| format!("#{} {} - {}", s.id, s.name, s.formatted_price()))
                .collect(),
        }
    }
}

impl fmt::Display for ResultView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "  Cantidad: {}", self.quantity)?;
        writeln!(f, "  Costo estimado: {}", self.cost)?;
        for (label, value) in self.details.iter().chain(&self.specifics) {
            writeln!(f, "  {}: {}", label, value)?;
        }
        if !self.suggestions.is_empty() {
            writeln!(f, "  Materiales sugeridos:")?;
            for suggestion in &self.suggestions {
                writeln!(f, "    {}", suggestion)?;
            }
        }
        Ok(())
    }
}
