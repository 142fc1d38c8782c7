use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::shared::{
    double_option, validate_link, validate_optional_position, validate_reorder_ids, validate_text,
};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateExperienceRequest {
    pub organization: String,
    pub role: String,
    pub duration: String,
    pub description: String,
    pub partner_label: Option<String>,
    pub external_link: Option<String>,
    pub position: Option<i32>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateExperienceRequest {
    pub organization: Option<String>,
    pub role: Option<String>,
    pub duration: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub partner_label: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub external_link: Option<Option<String>>,
    pub position: Option<i32>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ReorderExperienceRequest {
    /// Ordered list of experience ids. Positions assigned 0, 1, 2, ... by
    /// array index.
    pub experience_ids: Vec<i32>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ExperienceResponse {
    pub id: i32,
    pub organization: String,
    pub role: String,
    pub duration: String,
    pub description: String,
    pub partner_label: Option<String>,
    pub external_link: Option<String>,
    pub position: i32,
}

impl From<crate::entity::experience::Model> for ExperienceResponse {
    fn from(m: crate::entity::experience::Model) -> Self {
        Self {
            id: m.id,
            organization: m.organization,
            role: m.role,
            duration: m.duration,
            description: m.description,
            partner_label: m.partner_label,
            external_link: m.external_link,
            position: m.position,
        }
    }
}

pub fn validate_create_experience(req: &CreateExperienceRequest) -> Result<(), AppError> {
    validate_text(&req.organization, "Organization", 200)?;
    validate_text(&req.role, "Role", 200)?;
    validate_text(&req.duration, "Duration", 100)?;
    validate_text(&req.description, "Description", 20_000)?;
    if let Some(ref label) = req.partner_label {
        validate_text(label, "Partner label", 200)?;
    }
    if let Some(ref link) = req.external_link {
        validate_link(link, "External link")?;
    }
    validate_optional_position(req.position)
}

pub fn validate_update_experience(req: &UpdateExperienceRequest) -> Result<(), AppError> {
    if let Some(ref organization) = req.organization {
        validate_text(organization, "Organization", 200)?;
    }
    if let Some(ref role) = req.role {
        validate_text(role, "Role", 200)?;
    }
    if let Some(ref duration) = req.duration {
        validate_text(duration, "Duration", 100)?;
    }
    if let Some(ref description) = req.description {
        validate_text(description, "Description", 20_000)?;
    }
    if let Some(Some(ref label)) = req.partner_label {
        validate_text(label, "Partner label", 200)?;
    }
    if let Some(Some(ref link)) = req.external_link {
        validate_link(link, "External link")?;
    }
    validate_optional_position(req.position)
}

pub fn validate_reorder_experience(req: &ReorderExperienceRequest) -> Result<(), AppError> {
    validate_reorder_ids(&req.experience_ids, "experience_id")
}
