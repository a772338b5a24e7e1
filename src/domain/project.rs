use crate::domain::decimal::{format_money, lenient_opt_f64};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Project {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub project_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_end_date: Option<String>,
    #[serde(default)]
    pub current_phase: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub drive_folder_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub initial_budget: Option<f64>,
    #[serde(default, skip_serializing)]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing)]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing)]
    pub is_selected: Option<bool>,
}

impl Project {
    /// Saving a project with an id updates it; without one it is created.
    pub fn is_update(&self) -> bool {
        self.id.is_some()
    }

    pub fn selected(&self) -> bool {
        self.is_selected.unwrap_or(false)
    }

    pub fn display_type(&self) -> String {
        match self.project_type.as_deref() {
            None => "Sin tipo".to_string(),
            Some(t) => match t.to_lowercase().as_str() {
                "residential" => "Residencial".to_string(),
                "commercial" => "Comercial".to_string(),
                "institutional" => "Institucional".to_string(),
                "industrial" => "Industrial".to_string(),
                _ => t.to_string(),
            },
        }
    }

    pub fn display_status(&self) -> String {
        match self.status.as_deref() {
            None => "Sin estado".to_string(),
            Some(s) => match s.to_lowercase().as_str() {
                "planning" => "PLANIFICACIÓN".to_string(),
                "in_progress" => "EN PROGRESO".to_string(),
                "on_hold" => "EN PAUSA".to_string(),
                "completed" => "TERMINADO".to_string(),
                "budget" => "PRESUPUESTO".to_string(),
                _ => s.to_uppercase(),
            },
        }
    }

    pub fn display_phase(&self) -> String {
        match self.current_phase.as_deref() {
            None => "Sin fase".to_string(),
            Some(p) => phase_label(p).unwrap_or(p).to_string(),
        }
    }

    pub fn phase_progress(&self) -> u8 {
        match self.current_phase.as_deref().map(str::to_lowercase).as_deref() {
            Some("design") => 25,
            Some("purchase") => 50,
            Some("installation") => 75,
            Some("completed") => 100,
            _ => 0,
        }
    }

    pub fn formatted_budget(&self) -> String {
        match self.initial_budget {
            Some(budget) => format_money(budget),
            None => "Sin presupuesto".to_string(),
        }
    }

    pub fn date_range(&self) -> String {
        match (self.start_date.as_deref(), self.end_date.as_deref()) {
            (Some(start), Some(end)) => format!("{} - {}", format_date(start), format_date(end)),
            (Some(start), None) => format!("Desde {}", format_date(start)),
            (None, Some(end)) => format!("Hasta {}", format_date(end)),
            (None, None) => "Fechas no definidas".to_string(),
        }
    }

    pub fn short_description(&self) -> String {
        match self.description.as_deref() {
            None | Some("") => "Sin descripción".to_string(),
            Some(d) if d.chars().count() <= 100 => d.to_string(),
            Some(d) => format!("{}...", d.chars().take(97).collect::<String>()),
        }
    }

    pub fn has_drive_link(&self) -> bool {
        self.drive_folder_url
            .as_deref()
            .is_some_and(|url| url.starts_with("http"))
    }

    pub fn is_in_progress(&self) -> bool {
        self.status.as_deref() == Some("in_progress")
    }

    pub fn is_completed(&self) -> bool {
        self.status.as_deref() == Some("completed")
    }

    /// Case-insensitive match against name, client and location.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [Some(&self.name), self.client.as_ref(), self.location.as_ref()]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

pub fn phase_label(phase: &str) -> Option<&'static str> {
    match phase.to_lowercase().as_str() {
        "design" => Some("Diseño"),
        "purchase" => Some("Compra"),
        "installation" => Some("Instalación"),
        "completed" => Some("Completado"),
        _ => None,
    }
}

/// `yyyy-mm-dd` to `dd/mm/yyyy`; anything unparseable is returned as is.
pub fn format_date(date: &str) -> String {
    if date.is_empty() {
        return String::new();
    }
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) => parsed.format("%d/%m/%Y").to_string(),
        Err(_) => date.to_string(),
    }
}

/// Query filters accepted by `GET projects/projects/`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectFilters {
    pub search: Option<String>,
    pub project_type: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub only_selected: Option<bool>,
}

impl ProjectFilters {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        let text = [
            ("search", &self.search),
            ("project_type", &self.project_type),
            ("status", &self.status),
            ("start_date", &self.start_date),
            ("end_date", &self.end_date),
        ];
        for (key, value) in text {
            if let Some(value) = value {
                query.push((key, value.clone()));
            }
        }
        if let Some(only_selected) = self.only_selected {
            query.push(("only_selected", only_selected.to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectSelectionResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub project: Option<Project>,
    #[serde(default, rename = "previous_selected")]
    pub previous_selected_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Project {
        Project {
            id: Some(7),
            name: "Casa Miraflores".to_string(),
            client: Some("Familia Rojas".to_string()),
            location: Some("Lima".to_string()),
            project_type: Some("residential".to_string()),
            status: Some("in_progress".to_string()),
            current_phase: Some("purchase".to_string()),
            start_date: Some("2024-01-15".to_string()),
            end_date: Some("2024-06-30".to_string()),
            initial_budget: Some(15000.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_display_labels() {
        let project = sample();
        assert_eq!(project.display_type(), "Residencial");
        assert_eq!(project.display_status(), "EN PROGRESO");
        assert_eq!(project.display_phase(), "Compra");
        assert_eq!(project.phase_progress(), 50);
        assert_eq!(project.formatted_budget(), "$15000.00");
        assert_eq!(project.date_range(), "15/01/2024 - 30/06/2024");
    }

    #[test]
    fn test_missing_values() {
        let project = Project {
            name: "Sin datos".to_string(),
            status: Some("archived".to_string()),
            ..Default::default()
        };
        assert_eq!(project.display_type(), "Sin tipo");
        assert_eq!(project.display_status(), "ARCHIVED");
        assert_eq!(project.display_phase(), "Sin fase");
        assert_eq!(project.formatted_budget(), "Sin presupuesto");
        assert_eq!(project.date_range(), "Fechas no definidas");
        assert_eq!(project.short_description(), "Sin descripción");
        assert!(!project.is_update());
    }

    #[test]
    fn test_short_description_truncates() {
        let project = Project {
            description: Some("x".repeat(150)),
            ..Default::default()
        };
        let short = project.short_description();
        assert_eq!(short.chars().count(), 100);
        assert!(short.ends_with("..."));
    }

    #[test]
    fn test_matches_search_is_case_insensitive() {
        let project = sample();
        assert!(project.matches_search("miraflores"));
        assert!(project.matches_search("ROJAS"));
        assert!(project.matches_search("lim"));
        assert!(!project.matches_search("arequipa"));
    }

    #[test]
    fn test_decodes_backend_shape() {
        let json = r#"{
            "id": 3, "name": "Oficina", "client": "ACME", "location": "Cusco",
            "project_type": "commercial", "status": "planning", "current_phase": "design",
            "initial_budget": "25000.00", "is_selected": true, "drive_folder_url": "https://drive.google.com/x"
        }"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.initial_budget, Some(25000.0));
        assert!(project.selected());
        assert!(project.has_drive_link());
        assert_eq!(project.display_status(), "PLANIFICACIÓN");
    }

    #[test]
    fn test_filters_query_skips_unset() {
        let filters = ProjectFilters {
            search: Some("casa".to_string()),
            only_selected: Some(true),
            ..Default::default()
        };
        assert_eq!(
            filters.to_query(),
            vec![("search", "casa".to_string()), ("only_selected", "true".to_string())]
        );
    }
}
