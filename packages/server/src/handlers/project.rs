use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::project;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::extractors::json::AppJson;
use crate::models::project::*;
use crate::state::AppState;
use crate::utils::respond::media_response;

/// Body limit for project image uploads.
pub fn project_image_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(16 * 1024 * 1024)
}

#[utoipa::path(
    get,
    path = "/api/v1/projects",
    tag = "Projects",
    operation_id = "listProjects",
    summary = "List projects",
    description = "Returns all projects. `sort=position` (default, the administrator's ordering, used on the home page) or `sort=newest` \
        (creation date descending, used on the projects page).",
    params(ProjectListQuery),
    responses(
        (status = 200, description = "Project list", body = ProjectListResponse),
        (status = 400, description = "Unknown sort key (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<ProjectListQuery>,
) -> Result<Json<ProjectListResponse>, AppError> {
    let select = match query.sort.as_deref() {
        None | Some("position") => project::Entity::find()
            .order_by_asc(project::Column::Position)
            .order_by_asc(project::Column::Id),
        Some("newest") => project::Entity::find()
            .order_by_desc(project::Column::CreatedOn)
            .order_by_desc(project::Column::Id),
        Some(_) => {
            return Err(AppError::Validation(
                "sort must be one of: position, newest".into(),
            ));
        }
    };

    let rows = select.all(&state.db).await?;
    let total = rows.len() as u64;
    let data = rows.into_iter().map(ProjectResponse::from).collect();

    Ok(Json(ProjectListResponse { data, total }))
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}",
    tag = "Projects",
    operation_id = "getProject",
    summary = "Get a project by ID",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project details", body = ProjectResponse),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProjectResponse>, AppError> {
    let model = find_project(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/projects",
    tag = "Projects",
    operation_id = "createProject",
    summary = "Create a project",
    description = "Creates a project. The creation date is set by the server and never changes; the position defaults to the end of the list.",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin, payload), fields(title = %payload.title))]
pub async fn create_project(
    _admin: AdminUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateProjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_project(&payload)?;

    let position = match payload.position {
        Some(p) => p,
        None => next_position(&state.db).await?,
    };

    let model = project::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        tech_stack: Set(payload.tech_stack.trim().to_string()),
        repo_link: Set(payload.repo_link),
        live_link: Set(payload.live_link),
        created_on: Set(Utc::now().date_naive()),
        position: Set(position),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(ProjectResponse::from(model))))
}

#[utoipa::path(
    patch,
    path = "/api/v1/projects/{id}",
    tag = "Projects",
    operation_id = "updateProject",
    summary = "Update a project",
    description = "Partially updates a project using PATCH semantics. `repo_link` and `live_link` support three-state updates: omit to leave \
        unchanged, null to clear, or a value to set. The creation date cannot be changed.",
    params(("id" = i32, Path, description = "Project ID")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = ProjectResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin, payload), fields(id))]
pub async fn update_project(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateProjectRequest>,
) -> Result<Json<ProjectResponse>, AppError> {
    validate_update_project(&payload)?;

    if payload == UpdateProjectRequest::default() {
        let existing = find_project(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    let existing = find_project(&state.db, id).await?;
    let mut active: project::ActiveModel = existing.into();

    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(ref tech_stack) = payload.tech_stack {
        active.tech_stack = Set(tech_stack.trim().to_string());
    }
    if let Some(repo_link) = payload.repo_link {
        active.repo_link = Set(repo_link);
    }
    if let Some(live_link) = payload.live_link {
        active.live_link = Set(live_link);
    }
    if let Some(position) = payload.position {
        active.position = Set(position);
    }

    let model = active.update(&state.db).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}",
    tag = "Projects",
    operation_id = "deleteProject",
    summary = "Delete a project",
    description = "Permanently deletes a project and discards its stored image, if any.",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin), fields(id))]
pub async fn delete_project(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let existing = find_project(&state.db, id).await?;

    project::Entity::delete_by_id(id).exec(&state.db).await?;

    if let Some(image) = existing.image_path
        && let Err(e) = state.media.delete(&image).await
    {
        tracing::warn!("failed to discard image of deleted project {id}: {e}");
    }

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/v1/projects/reorder",
    tag = "Projects",
    operation_id = "reorderProjects",
    summary = "Reorder projects",
    description = "Replaces the administrator ordering. The ID array must contain exactly the current projects; positions are assigned by array \
        index starting at 0.",
    request_body = ReorderProjectsRequest,
    responses(
        (status = 204, description = "Projects reordered"),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin, payload))]
pub async fn reorder_projects(
    _admin: AdminUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ReorderProjectsRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_reorder_projects(&payload)?;

    let txn = state.db.begin().await?;

    let existing: Vec<i32> = project::Entity::find()
        .select_only()
        .column(project::Column::Id)
        .into_tuple::<i32>()
        .all(&txn)
        .await?;

    let existing_set: std::collections::HashSet<i32> = existing.into_iter().collect();
    let payload_set: std::collections::HashSet<i32> = payload.project_ids.iter().copied().collect();
    if existing_set != payload_set {
        return Err(AppError::Validation(
            "project_ids must contain exactly the current projects".into(),
        ));
    }

    for (i, &id) in payload.project_ids.iter().enumerate() {
        project::Entity::update_many()
            .filter(project::Column::Id.eq(id))
            .col_expr(
                project::Column::Position,
                Expr::value(
                    i32::try_from(i)
                        .map_err(|_| AppError::Validation("Too many projects to reorder".into()))?,
                ),
            )
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/image",
    tag = "Projects",
    operation_id = "getProjectImage",
    summary = "Download a project's image",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Image content"),
        (status = 304, description = "Not Modified (ETag match)"),
        (status = 404, description = "Project or image not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers), fields(id))]
pub async fn get_project_image(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let model = find_project(&state.db, id).await?;
    let object_name = model
        .image_path
        .ok_or_else(|| AppError::NotFound("Project has no image".into()))?;

    media_response(&*state.media, &object_name, &object_name, &headers).await
}

#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/image",
    tag = "Projects",
    operation_id = "uploadProjectImage",
    summary = "Upload a project image",
    description = "Stores an illustration for the project from the `image` multipart field. Re-uploading replaces the previous image and \
        discards its blob.",
    params(("id" = i32, Path, description = "Project ID")),
    request_body(content_type = "multipart/form-data", description = "`image` file field"),
    responses(
        (status = 200, description = "Image stored", body = ProjectResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin, multipart), fields(id))]
pub async fn upload_project_image(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<ProjectResponse>, AppError> {
    let existing = find_project(&state.db, id).await?;

    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        if field.name() == Some("image") {
            let filename = field
                .file_name()
                .map(|s| s.to_string())
                .ok_or_else(|| AppError::Validation("Image field must have a filename".into()))?;
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read image: {e}")))?;
            upload = Some((filename, data.to_vec()));
        }
    }

    let (filename, bytes) =
        upload.ok_or_else(|| AppError::Validation("Missing 'image' field".into()))?;

    let stored = state.media.put(&filename, &bytes).await?;
    let previous = existing.image_path.clone();

    let mut active: project::ActiveModel = existing.into();
    active.image_path = Set(Some(stored.name.clone()));
    let model = active.update(&state.db).await?;

    if let Some(prev) = previous
        && prev != stored.name
        && let Err(e) = state.media.delete(&prev).await
    {
        tracing::warn!("failed to discard replaced project image '{prev}': {e}");
    }

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}/image",
    tag = "Projects",
    operation_id = "deleteProjectImage",
    summary = "Remove a project's image",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Image removed", body = ProjectResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project or image not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin), fields(id))]
pub async fn delete_project_image(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProjectResponse>, AppError> {
    let existing = find_project(&state.db, id).await?;
    let object_name = existing
        .image_path
        .clone()
        .ok_or_else(|| AppError::NotFound("Project has no image".into()))?;

    let mut active: project::ActiveModel = existing.into();
    active.image_path = Set(None);
    let model = active.update(&state.db).await?;

    if let Err(e) = state.media.delete(&object_name).await {
        tracing::warn!("failed to discard removed project image '{object_name}': {e}");
    }

    Ok(Json(model.into()))
}

async fn find_project<C: ConnectionTrait>(db: &C, id: i32) -> Result<project::Model, AppError> {
    project::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))
}

/// Compute the next position for a new project.
async fn next_position<C: ConnectionTrait>(db: &C) -> Result<i32, AppError> {
    let max_pos: Option<i32> = project::Entity::find()
        .select_only()
        .column_as(project::Column::Position.max(), "max_pos")
        .into_tuple::<Option<i32>>()
        .one(db)
        .await?
        .flatten();
    max_pos
        .unwrap_or(-1)
        .checked_add(1)
        .ok_or_else(|| AppError::Validation("Position overflow".into()))
}
