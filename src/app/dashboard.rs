use crate::core::api::ApiClient;
use crate::core::translations::category_to_spanish;
use crate::domain::dashboard::Dashboard;
use crate::utils::error::Result;

#[derive(Debug, Clone)]
pub struct DashboardService {
    api: ApiClient,
}

impl DashboardService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn load(&self, project_id: i64) -> Result<Dashboard> {
        let dashboard = self.api.project_dashboard(project_id).await?;
        if let Some(summary) = &dashboard.financial_summary {
            if summary.over_budget() {
                tracing::warn!(
                    project_id,
                    budget = summary.total_budget,
                    expenses = summary.total_expenses,
                    "project is over budget"
                );
            }
        }
        Ok(dashboard)
    }
}

/// Plain text lines for a dashboard.
pub fn summary_lines(dashboard: &Dashboard) -> Vec<String> {
    let project = &dashboard.project;
    let mut lines = vec![
        format!("{} ({})", project.name, project.display_status()),
        format!("Fase: {} ({}%)", project.display_phase(), project.phase_progress()),
        format!("Fechas: {}", project.date_range()),
    ];

    match &dashboard.financial_summary {
        Some(summary) => {
            lines.push(format!(
                "Presupuesto: ${:.2}  Gastado: ${:.2}  Balance: {}",
                summary.total_budget,
                summary.total_expenses,
                summary.formatted_balance()
            ));
            lines.push(format!("Utilización: {}", summary.utilization_text()));
            if summary.over_budget() {
                lines.push("¡Presupuesto excedido!".to_string());
            }
            for (category, balance) in summary.budget_by_category.entries() {
                lines.push(format!(
                    "  {}: ${:.2} / ${:.2}",
                    category_to_spanish(category),
                    balance.spent,
                    balance.budgeted
                ));
            }
        }
        None => lines.push("Resumen financiero no disponible".to_string()),
    }

    let stats = &dashboard.statistics;
    lines.push(format!(
        "Ítems: {}  Gastos: {}  Cálculos: {}",
        stats.budget_items_count, stats.expenses_count, stats.calculations_count
    ));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dashboard::FinancialSummary;
    use crate::domain::project::Project;

    #[test]
    fn test_summary_lines_flag_over_budget() {
        let dashboard = Dashboard {
            project: Project {
                name: "Casa".to_string(),
                ..Default::default()
            },
            financial_summary: Some(FinancialSummary {
                total_budget: 100.0,
                total_expenses: 150.0,
                balance: -50.0,
                ..Default::default()
            }),
            ..Default::default()
        };
        let lines = summary_lines(&dashboard);
        assert!(lines.contains(&"¡Presupuesto excedido!".to_string()));
        assert!(lines.iter().any(|l| l.starts_with("  Construcción:")));
    }

    #[test]
    fn test_summary_lines_without_summary() {
        let lines = summary_lines(&Dashboard::default());
        assert!(lines.contains(&"Resumen financiero no disponible".to_string()));
    }
}
