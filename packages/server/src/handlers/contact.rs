use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;

use crate::entity::contact_message;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::extractors::json::AppJson;
use crate::mailer::DeliveryReport;
use crate::models::contact::*;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/contact",
    tag = "Contact",
    operation_id = "submitContact",
    summary = "Submit a contact message",
    description = "Validates the name/email/message triple, persists the message, then sends the configured acknowledgement and owner-notification \
        emails. Email is best-effort: a failed send is reported in the `delivery` field but the message stays saved. Validation failures \
        return per-field errors and persist nothing.",
    request_body = ContactSubmission,
    responses(
        (status = 201, description = "Message stored", body = ContactResponse),
        (status = 400, description = "Field validation failed (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn submit_contact(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ContactSubmission>,
) -> Result<impl IntoResponse, AppError> {
    let validated = validate_submission(&payload).map_err(AppError::FieldValidation)?;

    let model = contact_message::ActiveModel {
        name: Set(validated.name.clone()),
        email: Set(validated.email.to_string()),
        message: Set(validated.message.clone()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    // Persistence is authoritative; email is a best-effort side effect and
    // runs only after the row exists.
    let delivery = match &state.mailer {
        Some(mailer) => {
            mailer
                .send_contact_emails(&validated.name, &validated.email, &validated.message)
                .await
        }
        None => DeliveryReport::none(),
    };

    Ok((
        StatusCode::CREATED,
        Json(ContactResponse::from_model(model, delivery)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/messages",
    tag = "Messages",
    operation_id = "listMessages",
    summary = "List contact messages",
    description = "Returns all received contact messages, newest first.",
    responses(
        (status = 200, description = "Message list", body = MessageListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn list_messages(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<MessageListResponse>, AppError> {
    let rows = contact_message::Entity::find()
        .order_by_desc(contact_message::Column::CreatedAt)
        .order_by_desc(contact_message::Column::Id)
        .all(&state.db)
        .await?;

    let total = rows.len() as u64;
    let data = rows.into_iter().map(MessageResponse::from).collect();

    Ok(Json(MessageListResponse { data, total }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/messages/{id}",
    tag = "Messages",
    operation_id = "deleteMessage",
    summary = "Delete a contact message",
    description = "Permanently deletes a received message. Messages are never editable, only removable.",
    params(("id" = i32, Path, description = "Message ID")),
    responses(
        (status = 204, description = "Message deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Message not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin), fields(id))]
pub async fn delete_message(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let result = contact_message::Entity::delete_by_id(id)
        .exec(&state.db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Message not found".into()));
    }

    Ok(StatusCode::NO_CONTENT)
}
