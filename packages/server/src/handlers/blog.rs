use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;

use crate::entity::blog;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::extractors::json::AppJson;
use crate::models::blog::*;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/blog",
    tag = "Blog",
    operation_id = "listPosts",
    summary = "List published posts",
    description = "Returns published posts only, newest first. Drafts never appear here.",
    responses(
        (status = 200, description = "Published posts", body = PostListResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<PostListResponse>, AppError> {
    let rows = blog::Entity::find()
        .filter(blog::Column::IsPublished.eq(true))
        .order_by_desc(blog::Column::CreatedAt)
        .order_by_desc(blog::Column::Id)
        .all(&state.db)
        .await?;

    let total = rows.len() as u64;
    let data = rows.into_iter().map(PostResponse::from).collect();

    Ok(Json(PostListResponse { data, total }))
}

#[utoipa::path(
    get,
    path = "/api/v1/blog/all",
    tag = "Blog",
    operation_id = "listAllPosts",
    summary = "List all posts including drafts",
    responses(
        (status = 200, description = "All posts", body = PostListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn list_all_posts(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<PostListResponse>, AppError> {
    let rows = blog::Entity::find()
        .order_by_desc(blog::Column::CreatedAt)
        .order_by_desc(blog::Column::Id)
        .all(&state.db)
        .await?;

    let total = rows.len() as u64;
    let data = rows.into_iter().map(PostResponse::from).collect();

    Ok(Json(PostListResponse { data, total }))
}

#[utoipa::path(
    get,
    path = "/api/v1/blog/{id}",
    tag = "Blog",
    operation_id = "getPost",
    summary = "Get a published post",
    description = "Returns a single published post. Drafts answer 404 on the public surface.",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post details", body = PostResponse),
        (status = 404, description = "Post not found or unpublished (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PostResponse>, AppError> {
    let model = find_post(&state.db, id).await?;
    if !model.is_published {
        return Err(AppError::NotFound("Post not found".into()));
    }

    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/blog",
    tag = "Blog",
    operation_id = "createPost",
    summary = "Create a post",
    description = "Creates a post, published by default; pass `is_published: false` to save a draft.",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin, payload), fields(title = %payload.title))]
pub async fn create_post(
    _admin: AdminUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_post(&payload)?;

    let model = blog::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        content: Set(payload.content),
        created_at: Set(Utc::now()),
        is_published: Set(payload.is_published.unwrap_or(true)),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(PostResponse::from(model))))
}

#[utoipa::path(
    patch,
    path = "/api/v1/blog/{id}",
    tag = "Blog",
    operation_id = "updatePost",
    summary = "Update a post",
    description = "Partially updates a post, including toggling `is_published` to move it between draft and published.",
    params(("id" = i32, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Post updated", body = PostResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin, payload), fields(id))]
pub async fn update_post(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdatePostRequest>,
) -> Result<Json<PostResponse>, AppError> {
    validate_update_post(&payload)?;

    let existing = find_post(&state.db, id).await?;
    if payload == UpdatePostRequest::default() {
        return Ok(Json(existing.into()));
    }

    let mut active: blog::ActiveModel = existing.into();
    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(content) = payload.content {
        active.content = Set(content);
    }
    if let Some(is_published) = payload.is_published {
        active.is_published = Set(is_published);
    }

    let model = active.update(&state.db).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/blog/{id}",
    tag = "Blog",
    operation_id = "deletePost",
    summary = "Delete a post",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin), fields(id))]
pub async fn delete_post(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let result = blog::Entity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Post not found".into()));
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn find_post<C: ConnectionTrait>(db: &C, id: i32) -> Result<blog::Model, AppError> {
    blog::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))
}
