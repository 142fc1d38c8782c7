use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::HeaderMap;
use axum::response::Response;
use chrono::{DateTime, Utc};
use common::media::MediaStore;
use sea_orm::*;
use tracing::instrument;

use crate::entity::profile;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::image::{self, PreparedPicture};
use crate::models::profile::ProfileResponse;
use crate::state::AppState;
use crate::utils::respond::media_response;

/// Body limit for profile saves: the 5 MiB picture cap plus multipart
/// framing overhead.
pub fn profile_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(8 * 1024 * 1024)
}

/// A picture already written to the media store, pending the row update.
struct StoredPicture {
    object_name: String,
    filename: String,
    size: i64,
    width: i32,
    height: i32,
}

#[utoipa::path(
    get,
    path = "/api/v1/profile",
    tag = "Profile",
    operation_id = "getProfile",
    summary = "Get profile metadata",
    description = "Returns the profile picture metadata. 404 until the administrator has saved the profile for the first time.",
    responses(
        (status = 200, description = "Profile metadata", body = ProfileResponse),
        (status = 404, description = "Profile not created yet (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_profile(State(state): State<AppState>) -> Result<Json<ProfileResponse>, AppError> {
    let model = profile::Entity::find()
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile has not been created yet".into()))?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/profile/picture",
    tag = "Profile",
    operation_id = "getProfilePicture",
    summary = "Download the profile picture",
    description = "Streams the stored profile picture. The object name doubles as the ETag, so clients revalidate cheaply with If-None-Match.",
    responses(
        (status = 200, description = "Picture content"),
        (status = 304, description = "Not Modified (ETag match)"),
        (status = 404, description = "No picture stored (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers))]
pub async fn get_profile_picture(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let model = profile::Entity::find()
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile has not been created yet".into()))?;

    let (Some(object_name), Some(filename)) = (model.picture_path, model.picture_filename) else {
        return Err(AppError::NotFound(
            "No profile picture has been uploaded".into(),
        ));
    };

    media_response(&*state.media, &object_name, &filename, &headers).await
}

#[utoipa::path(
    put,
    path = "/api/v1/profile",
    tag = "Profile",
    operation_id = "saveProfile",
    summary = "Save the profile",
    description = "Saves the singleton profile row, creating it on first use. An optional `picture` multipart field runs the upload through validation \
        (size, format, dimensions) and, for uploads over 500 KiB, through re-encoding; smaller pictures are stored byte-for-byte. \
        Replacing a picture discards the previous blob. There is no delete route: the profile row, once created, stays.",
    request_body(content_type = "multipart/form-data", description = "Optional `picture` file field"),
    responses(
        (status = 200, description = "Profile saved", body = ProfileResponse),
        (status = 400, description = "Picture rejected (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin, multipart))]
pub async fn save_profile(
    _admin: AdminUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ProfileResponse>, AppError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        if field.name() == Some("picture") {
            let filename = field
                .file_name()
                .map(|s| s.to_string())
                .ok_or_else(|| AppError::Validation("Picture field must have a filename".into()))?;
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read picture: {e}")))?;
            upload = Some((filename, data.to_vec()));
        }
    }

    let stored = match upload {
        Some((filename, bytes)) => {
            let prepared = image::prepare_picture(bytes, &filename)?;
            Some(store_picture(&*state.media, prepared).await?)
        }
        None => None,
    };

    let (model, replaced) = save_profile_record(&state.db, stored, Utc::now()).await?;

    // The replaced blob is discarded only after the row points at the new
    // one; a failed delete leaves an orphan object, not a broken profile.
    if let Some(previous) = replaced
        && let Err(e) = state.media.delete(&previous).await
    {
        tracing::warn!("failed to discard replaced profile picture '{previous}': {e}");
    }

    Ok(Json(model.into()))
}

async fn store_picture(
    media: &dyn MediaStore,
    prepared: PreparedPicture,
) -> Result<StoredPicture, AppError> {
    let object = media.put(&prepared.filename, &prepared.bytes).await?;
    Ok(StoredPicture {
        object_name: object.name,
        filename: prepared.filename,
        size: object.size as i64,
        width: prepared.width as i32,
        height: prepared.height as i32,
    })
}

/// Apply a save onto the singleton profile row.
///
/// An existing row captures the save regardless of what identity the
/// caller had in mind; otherwise the one row is created. Returns the saved
/// row plus the object name of a replaced picture for the caller to
/// discard.
async fn save_profile_record<C: ConnectionTrait>(
    db: &C,
    picture: Option<StoredPicture>,
    now: DateTime<Utc>,
) -> Result<(profile::Model, Option<String>), AppError> {
    match profile::Entity::find().one(db).await? {
        Some(current) => {
            let previous = current.picture_path.clone();
            let mut active: profile::ActiveModel = current.into();
            if let Some(ref picture) = picture {
                active.picture_path = Set(Some(picture.object_name.clone()));
                active.picture_filename = Set(Some(picture.filename.clone()));
                active.file_size = Set(Some(picture.size));
                active.image_width = Set(Some(picture.width));
                active.image_height = Set(Some(picture.height));
            }
            active.updated_at = Set(now);
            let model = active.update(db).await?;

            // Identical content re-uploads map to the same object name;
            // never discard the object that was just stored.
            let replaced = match (previous, picture) {
                (Some(prev), Some(picture)) if prev != picture.object_name => Some(prev),
                _ => None,
            };
            Ok((model, replaced))
        }
        None => {
            let mut active = profile::ActiveModel {
                updated_at: Set(now),
                ..Default::default()
            };
            if let Some(picture) = picture {
                active.picture_path = Set(Some(picture.object_name));
                active.picture_filename = Set(Some(picture.filename));
                active.file_size = Set(Some(picture.size));
                active.image_width = Set(Some(picture.width));
                active.image_height = Set(Some(picture.height));
            }
            let model = active.insert(db).await?;
            Ok((model, None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn existing_row() -> profile::Model {
        profile::Model {
            id: 1,
            picture_path: Some("old-11111111.png".into()),
            picture_filename: Some("old.png".into()),
            file_size: Some(1000),
            image_width: Some(300),
            image_height: Some(300),
            updated_at: Utc::now(),
        }
    }

    fn new_picture() -> StoredPicture {
        StoredPicture {
            object_name: "new-22222222.jpg".into(),
            filename: "new.jpg".into(),
            size: 2048,
            width: 640,
            height: 480,
        }
    }

    #[tokio::test]
    async fn save_redirects_onto_the_existing_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing_row()]])
            .append_query_results([vec![existing_row()]])
            .into_connection();

        let (model, replaced) = save_profile_record(&db, None, Utc::now()).await.unwrap();
        assert_eq!(model.id, 1);
        assert!(replaced.is_none());

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("UPDATE"), "{log}");
        assert!(!log.contains("INSERT"), "{log}");
    }

    #[tokio::test]
    async fn first_save_creates_the_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<profile::Model>::new()])
            .append_query_results([vec![existing_row()]])
            .into_connection();

        let (_, replaced) = save_profile_record(&db, Some(new_picture()), Utc::now())
            .await
            .unwrap();
        assert!(replaced.is_none());

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("INSERT"), "{log}");
    }

    #[tokio::test]
    async fn replacing_a_picture_reports_the_old_object() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing_row()]])
            .append_query_results([vec![existing_row()]])
            .into_connection();

        let (_, replaced) = save_profile_record(&db, Some(new_picture()), Utc::now())
            .await
            .unwrap();
        assert_eq!(replaced.as_deref(), Some("old-11111111.png"));
    }

    #[tokio::test]
    async fn reuploading_identical_content_discards_nothing() {
        let same_name = StoredPicture {
            object_name: "old-11111111.png".into(),
            ..new_picture()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing_row()]])
            .append_query_results([vec![existing_row()]])
            .into_connection();

        let (_, replaced) = save_profile_record(&db, Some(same_name), Utc::now())
            .await
            .unwrap();
        assert!(replaced.is_none());
    }
}
