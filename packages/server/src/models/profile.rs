use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProfileResponse {
    /// Whether a picture has been stored yet.
    pub has_picture: bool,
    /// Filename the picture is served under.
    pub picture_filename: Option<String>,
    /// Byte size of the stored picture.
    pub file_size: Option<i64>,
    pub image_width: Option<i32>,
    pub image_height: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::profile::Model> for ProfileResponse {
    fn from(m: crate::entity::profile::Model) -> Self {
        Self {
            has_picture: m.picture_path.is_some(),
            picture_filename: m.picture_filename,
            file_size: m.file_size,
            image_width: m.image_width,
            image_height: m.image_height,
            updated_at: m.updated_at,
        }
    }
}
