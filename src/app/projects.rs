use crate::core::api::ApiClient;
use crate::domain::project::{phase_label, Project, ProjectFilters};
use crate::utils::error::{AppError, Result};

/// Local filter over the loaded project list. Values match either the
/// backend code or the Spanish label, case-insensitively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectQuery {
    pub search: Option<String>,
    pub project_type: Option<String>,
    pub phase: Option<String>,
}

impl ProjectQuery {
    pub fn matches(&self, project: &Project) -> bool {
        if let Some(search) = &self.search {
            if !project.matches_search(search.trim()) {
                return false;
            }
        }
        if let Some(wanted) = non_blank(&self.project_type) {
            let code = project.project_type.as_deref().unwrap_or_default();
            if !same(code, wanted) && !same(&project.display_type(), wanted) {
                return false;
            }
        }
        if let Some(wanted) = non_blank(&self.phase) {
            let code = project.current_phase.as_deref().unwrap_or_default();
            let label = phase_label(code).unwrap_or_default();
            if !same(code, wanted) && !same(label, wanted) {
                return false;
            }
        }
        true
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn same(a: &str, b: &str) -> bool {
    !a.is_empty() && a.to_lowercase() == b.to_lowercase()
}

/// Project list with a locally tracked selection.
#[derive(Debug, Clone)]
pub struct ProjectService {
    api: ApiClient,
    projects: Vec<Project>,
}

impl ProjectService {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            projects: Vec::new(),
        }
    }

    pub async fn load(&mut self) -> Result<&[Project]> {
        let page = self.api.list_projects(&ProjectFilters::default()).await?;
        tracing::info!(count = page.count, "projects loaded");
        self.projects = page.into_results();
        Ok(&self.projects)
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn filter(&self, query: &ProjectQuery) -> Vec<&Project> {
        self.projects.iter().filter(|p| query.matches(p)).collect()
    }

    /// Selects on the backend, then mirrors the selection locally.
    pub async fn select(&mut self, id: i64) -> Result<Project> {
        let response = self.api.select_project(id).await?;
        if response.success == Some(false) {
            return Err(AppError::ResponseError {
                message: response
                    .message
                    .unwrap_or_else(|| "no se pudo seleccionar el proyecto".to_string()),
            });
        }

        for project in &mut self.projects {
            project.is_selected = Some(project.id == Some(id));
        }

        let project = match response.project {
            Some(project) => project,
            None => match self.projects.iter().find(|p| p.id == Some(id)) {
                Some(project) => project.clone(),
                None => self.api.get_project(id).await?,
            },
        };
        tracing::info!(id, name = %project.name, "project selected");
        Ok(project)
    }

    /// Selected project in the loaded list.
    pub fn selected(&self) -> Option<&Project> {
        self.projects.iter().find(|p| p.selected())
    }

    /// Asks the backend; a 404 means nothing is selected.
    pub async fn fetch_selected(&self) -> Result<Option<Project>> {
        match self.api.selected_project().await {
            Ok(project) => Ok(Some(project)),
            Err(AppError::Http { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn save(&mut self, project: &Project) -> Result<Project> {
        if project.name.trim().is_empty() {
            return Err(AppError::form("name", "campo requerido"));
        }
        let saved = self.api.save_project(project).await?;
        match self.projects.iter_mut().find(|p| p.id.is_some() && p.id == saved.id) {
            Some(existing) => *existing = saved.clone(),
            None => self.projects.push(saved.clone()),
        }
        Ok(saved)
    }

    pub async fn advance_phase(&mut self, id: i64) -> Result<Project> {
        let response = self.api.advance_phase(id).await?;
        let project = match response.project {
            Some(project) => project,
            None => self.api.get_project(id).await?,
        };
        if let Some(existing) = self.projects.iter_mut().find(|p| p.id == Some(id)) {
            *existing = project.clone();
        }
        tracing::info!(id, phase = %project.display_phase(), "project phase advanced");
        Ok(project)
    }
}
