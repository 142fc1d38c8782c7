use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::experience;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::extractors::json::AppJson;
use crate::models::experience::*;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/experience",
    tag = "Experience",
    operation_id = "listExperience",
    summary = "List experience entries",
    description = "Returns all experience entries in the administrator's ordering (position ascending, ties by insertion).",
    responses(
        (status = 200, description = "Experience entries", body = Vec<ExperienceResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_experience(
    State(state): State<AppState>,
) -> Result<Json<Vec<ExperienceResponse>>, AppError> {
    let rows = experience::Entity::find()
        .order_by_asc(experience::Column::Position)
        .order_by_asc(experience::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(
        rows.into_iter().map(ExperienceResponse::from).collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/experience",
    tag = "Experience",
    operation_id = "createExperience",
    summary = "Create an experience entry",
    request_body = CreateExperienceRequest,
    responses(
        (status = 201, description = "Entry created", body = ExperienceResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin, payload), fields(organization = %payload.organization))]
pub async fn create_experience(
    _admin: AdminUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateExperienceRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_experience(&payload)?;

    let position = match payload.position {
        Some(p) => p,
        None => next_position(&state.db).await?,
    };

    let model = experience::ActiveModel {
        organization: Set(payload.organization.trim().to_string()),
        role: Set(payload.role.trim().to_string()),
        duration: Set(payload.duration.trim().to_string()),
        description: Set(payload.description),
        partner_label: Set(payload.partner_label.map(|l| l.trim().to_string())),
        external_link: Set(payload.external_link),
        position: Set(position),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(ExperienceResponse::from(model))))
}

#[utoipa::path(
    patch,
    path = "/api/v1/experience/{id}",
    tag = "Experience",
    operation_id = "updateExperience",
    summary = "Update an experience entry",
    description = "Partially updates an entry using PATCH semantics. `partner_label` and `external_link` support three-state updates: omit to \
        leave unchanged, null to clear, or a value to set.",
    params(("id" = i32, Path, description = "Experience entry ID")),
    request_body = UpdateExperienceRequest,
    responses(
        (status = 200, description = "Entry updated", body = ExperienceResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin, payload), fields(id))]
pub async fn update_experience(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateExperienceRequest>,
) -> Result<Json<ExperienceResponse>, AppError> {
    validate_update_experience(&payload)?;

    let existing = find_experience(&state.db, id).await?;
    if payload == UpdateExperienceRequest::default() {
        return Ok(Json(existing.into()));
    }

    let mut active: experience::ActiveModel = existing.into();
    if let Some(ref organization) = payload.organization {
        active.organization = Set(organization.trim().to_string());
    }
    if let Some(ref role) = payload.role {
        active.role = Set(role.trim().to_string());
    }
    if let Some(ref duration) = payload.duration {
        active.duration = Set(duration.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    match payload.partner_label {
        Some(Some(label)) => active.partner_label = Set(Some(label.trim().to_string())),
        Some(None) => active.partner_label = Set(None),
        None => {}
    }
    match payload.external_link {
        Some(Some(link)) => active.external_link = Set(Some(link)),
        Some(None) => active.external_link = Set(None),
        None => {}
    }
    if let Some(position) = payload.position {
        active.position = Set(position);
    }

    let model = active.update(&state.db).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/experience/{id}",
    tag = "Experience",
    operation_id = "deleteExperience",
    summary = "Delete an experience entry",
    params(("id" = i32, Path, description = "Experience entry ID")),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin), fields(id))]
pub async fn delete_experience(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let result = experience::Entity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Experience entry not found".into()));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/v1/experience/reorder",
    tag = "Experience",
    operation_id = "reorderExperience",
    summary = "Reorder experience entries",
    description = "Replaces the ordering of all experience entries. The ID array must contain exactly the current entries; positions are \
        assigned by array index starting at 0.",
    request_body = ReorderExperienceRequest,
    responses(
        (status = 204, description = "Entries reordered"),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin, payload))]
pub async fn reorder_experience(
    _admin: AdminUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ReorderExperienceRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_reorder_experience(&payload)?;

    let txn = state.db.begin().await?;

    let existing: Vec<i32> = experience::Entity::find()
        .select_only()
        .column(experience::Column::Id)
        .into_tuple::<i32>()
        .all(&txn)
        .await?;

    let existing_set: std::collections::HashSet<i32> = existing.into_iter().collect();
    let payload_set: std::collections::HashSet<i32> =
        payload.experience_ids.iter().copied().collect();
    if existing_set != payload_set {
        return Err(AppError::Validation(
            "experience_ids must contain exactly the current entries".into(),
        ));
    }

    for (i, &id) in payload.experience_ids.iter().enumerate() {
        experience::Entity::update_many()
            .filter(experience::Column::Id.eq(id))
            .col_expr(
                experience::Column::Position,
                Expr::value(i32::try_from(i).map_err(|_| {
                    AppError::Validation("Too many experience entries to reorder".into())
                })?),
            )
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn find_experience<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<experience::Model, AppError> {
    experience::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Experience entry not found".into()))
}

/// Compute the next position for a new experience entry.
async fn next_position<C: ConnectionTrait>(db: &C) -> Result<i32, AppError> {
    let max_pos: Option<i32> = experience::Entity::find()
        .select_only()
        .column_as(experience::Column::Position.max(), "max_pos")
        .into_tuple::<Option<i32>>()
        .one(db)
        .await?
        .flatten();
    max_pos
        .unwrap_or(-1)
        .checked_add(1)
        .ok_or_else(|| AppError::Validation("Position overflow".into()))
}
