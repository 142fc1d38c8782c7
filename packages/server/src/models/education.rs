use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::shared::{validate_optional_position, validate_reorder_ids, validate_text};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateEducationRequest {
    pub institution: String,
    pub degree: String,
    pub duration: String,
    pub description: String,
    pub position: Option<i32>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateEducationRequest {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub duration: Option<String>,
    pub description: Option<String>,
    pub position: Option<i32>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ReorderEducationRequest {
    /// Ordered list of education ids. Positions assigned 0, 1, 2, ... by
    /// array index.
    pub education_ids: Vec<i32>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct EducationResponse {
    pub id: i32,
    pub institution: String,
    pub degree: String,
    pub duration: String,
    pub description: String,
    pub position: i32,
}

impl From<crate::entity::education::Model> for EducationResponse {
    fn from(m: crate::entity::education::Model) -> Self {
        Self {
            id: m.id,
            institution: m.institution,
            degree: m.degree,
            duration: m.duration,
            description: m.description,
            position: m.position,
        }
    }
}

pub fn validate_create_education(req: &CreateEducationRequest) -> Result<(), AppError> {
    validate_text(&req.institution, "Institution", 200)?;
    validate_text(&req.degree, "Degree", 200)?;
    validate_text(&req.duration, "Duration", 100)?;
    validate_text(&req.description, "Description", 20_000)?;
    validate_optional_position(req.position)
}

pub fn validate_update_education(req: &UpdateEducationRequest) -> Result<(), AppError> {
    if let Some(ref institution) = req.institution {
        validate_text(institution, "Institution", 200)?;
    }
    if let Some(ref degree) = req.degree {
        validate_text(degree, "Degree", 200)?;
    }
    if let Some(ref duration) = req.duration {
        validate_text(duration, "Duration", 100)?;
    }
    if let Some(ref description) = req.description {
        validate_text(description, "Description", 20_000)?;
    }
    validate_optional_position(req.position)
}

pub fn validate_reorder_education(req: &ReorderEducationRequest) -> Result<(), AppError> {
    validate_reorder_ids(&req.education_ids, "education_id")
}
