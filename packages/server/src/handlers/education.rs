use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::education;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::extractors::json::AppJson;
use crate::models::education::*;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/education",
    tag = "Education",
    operation_id = "listEducation",
    summary = "List education entries",
    description = "Returns all education entries in the administrator's ordering (position ascending, ties by insertion).",
    responses(
        (status = 200, description = "Education entries", body = Vec<EducationResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_education(
    State(state): State<AppState>,
) -> Result<Json<Vec<EducationResponse>>, AppError> {
    let rows = education::Entity::find()
        .order_by_asc(education::Column::Position)
        .order_by_asc(education::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(rows.into_iter().map(EducationResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/education",
    tag = "Education",
    operation_id = "createEducation",
    summary = "Create an education entry",
    request_body = CreateEducationRequest,
    responses(
        (status = 201, description = "Entry created", body = EducationResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin, payload), fields(institution = %payload.institution))]
pub async fn create_education(
    _admin: AdminUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateEducationRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_education(&payload)?;

    let position = match payload.position {
        Some(p) => p,
        None => next_position(&state.db).await?,
    };

    let model = education::ActiveModel {
        institution: Set(payload.institution.trim().to_string()),
        degree: Set(payload.degree.trim().to_string()),
        duration: Set(payload.duration.trim().to_string()),
        description: Set(payload.description),
        position: Set(position),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(EducationResponse::from(model))))
}

#[utoipa::path(
    patch,
    path = "/api/v1/education/{id}",
    tag = "Education",
    operation_id = "updateEducation",
    summary = "Update an education entry",
    params(("id" = i32, Path, description = "Education entry ID")),
    request_body = UpdateEducationRequest,
    responses(
        (status = 200, description = "Entry updated", body = EducationResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin, payload), fields(id))]
pub async fn update_education(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateEducationRequest>,
) -> Result<Json<EducationResponse>, AppError> {
    validate_update_education(&payload)?;

    let existing = find_education(&state.db, id).await?;
    if payload == UpdateEducationRequest::default() {
        return Ok(Json(existing.into()));
    }

    let mut active: education::ActiveModel = existing.into();
    if let Some(ref institution) = payload.institution {
        active.institution = Set(institution.trim().to_string());
    }
    if let Some(ref degree) = payload.degree {
        active.degree = Set(degree.trim().to_string());
    }
    if let Some(ref duration) = payload.duration {
        active.duration = Set(duration.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(position) = payload.position {
        active.position = Set(position);
    }

    let model = active.update(&state.db).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/education/{id}",
    tag = "Education",
    operation_id = "deleteEducation",
    summary = "Delete an education entry",
    params(("id" = i32, Path, description = "Education entry ID")),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin), fields(id))]
pub async fn delete_education(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let result = education::Entity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Education entry not found".into()));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/v1/education/reorder",
    tag = "Education",
    operation_id = "reorderEducation",
    summary = "Reorder education entries",
    description = "Replaces the ordering of all education entries. The ID array must contain exactly the current entries; positions are \
        assigned by array index starting at 0.",
    request_body = ReorderEducationRequest,
    responses(
        (status = 204, description = "Entries reordered"),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin, payload))]
pub async fn reorder_education(
    _admin: AdminUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ReorderEducationRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_reorder_education(&payload)?;

    let txn = state.db.begin().await?;

    let existing: Vec<i32> = education::Entity::find()
        .select_only()
        .column(education::Column::Id)
        .into_tuple::<i32>()
        .all(&txn)
        .await?;

    let existing_set: std::collections::HashSet<i32> = existing.into_iter().collect();
    let payload_set: std::collections::HashSet<i32> =
        payload.education_ids.iter().copied().collect();
    if existing_set != payload_set {
        return Err(AppError::Validation(
            "education_ids must contain exactly the current entries".into(),
        ));
    }

    for (i, &id) in payload.education_ids.iter().enumerate() {
        education::Entity::update_many()
            .filter(education::Column::Id.eq(id))
            .col_expr(
                education::Column::Position,
                Expr::value(i32::try_from(i).map_err(|_| {
                    AppError::Validation("Too many education entries to reorder".into())
                })?),
            )
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn find_education<C: ConnectionTrait>(db: &C, id: i32) -> Result<education::Model, AppError> {
    education::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Education entry not found".into()))
}

/// Compute the next position for a new education entry.
async fn next_position<C: ConnectionTrait>(db: &C) -> Result<i32, AppError> {
    let max_pos: Option<i32> = education::Entity::find()
        .select_only()
        .column_as(education::Column::Position.max(), "max_pos")
        .into_tuple::<Option<i32>>()
        .one(db)
        .await?
        .flatten();
    max_pos
        .unwrap_or(-1)
        .checked_add(1)
        .ok_or_else(|| AppError::Validation("Position overflow".into()))
}
