use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::shared::{
    double_option, validate_link, validate_optional_position, validate_reorder_ids, validate_text,
};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateProjectRequest {
    pub title: String,
    pub description: String,
    pub tech_stack: String,
    pub repo_link: Option<String>,
    pub live_link: Option<String>,
    /// Lower numbers appear first; auto-assigned after the last project
    /// when omitted.
    pub position: Option<i32>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tech_stack: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub repo_link: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub live_link: Option<Option<String>>,
    pub position: Option<i32>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct ProjectListQuery {
    /// `position` (default) or `newest` (creation date, descending).
    pub sort: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ReorderProjectsRequest {
    /// Ordered list of project ids. Positions assigned 0, 1, 2, ... by
    /// array index.
    pub project_ids: Vec<i32>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProjectResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub tech_stack: String,
    pub repo_link: Option<String>,
    pub live_link: Option<String>,
    pub has_image: bool,
    pub created_on: NaiveDate,
    pub position: i32,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProjectListResponse {
    pub data: Vec<ProjectResponse>,
    pub total: u64,
}

impl From<crate::entity::project::Model> for ProjectResponse {
    fn from(m: crate::entity::project::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            tech_stack: m.tech_stack,
            repo_link: m.repo_link,
            live_link: m.live_link,
            has_image: m.image_path.is_some(),
            created_on: m.created_on,
            position: m.position,
        }
    }
}

pub fn validate_create_project(req: &CreateProjectRequest) -> Result<(), AppError> {
    validate_text(&req.title, "Title", 200)?;
    validate_text(&req.description, "Description", 20_000)?;
    validate_text(&req.tech_stack, "Tech stack", 200)?;
    if let Some(ref link) = req.repo_link {
        validate_link(link, "Repository link")?;
    }
    if let Some(ref link) = req.live_link {
        validate_link(link, "Live link")?;
    }
    validate_optional_position(req.position)
}

pub fn validate_update_project(req: &UpdateProjectRequest) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_text(title, "Title", 200)?;
    }
    if let Some(ref description) = req.description {
        validate_text(description, "Description", 20_000)?;
    }
    if let Some(ref tech_stack) = req.tech_stack {
        validate_text(tech_stack, "Tech stack", 200)?;
    }
    if let Some(Some(ref link)) = req.repo_link {
        validate_link(link, "Repository link")?;
    }
    if let Some(Some(ref link)) = req.live_link {
        validate_link(link, "Live link")?;
    }
    validate_optional_position(req.position)
}

pub fn validate_reorder_projects(req: &ReorderProjectsRequest) -> Result<(), AppError> {
    validate_reorder_ids(&req.project_ids, "project_id")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request() -> CreateProjectRequest {
        CreateProjectRequest {
            title: "Portfolio".into(),
            description: "A portfolio site".into(),
            tech_stack: "Rust, Axum".into(),
            repo_link: Some("https://github.com/example/portfolio".into()),
            live_link: None,
            position: Some(0),
        }
    }

    #[test]
    fn a_complete_request_validates() {
        assert!(validate_create_project(&create_request()).is_ok());
    }

    #[test]
    fn bad_links_are_rejected() {
        let req = CreateProjectRequest {
            repo_link: Some("git@github.com:example/portfolio.git".into()),
            ..create_request()
        };
        assert!(validate_create_project(&req).is_err());
    }

    #[test]
    fn update_can_clear_a_link_without_validating_it() {
        let req = UpdateProjectRequest {
            repo_link: Some(None),
            ..Default::default()
        };
        assert!(validate_update_project(&req).is_ok());
    }
}
