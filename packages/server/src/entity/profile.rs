use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Site owner profile. At most one row ever exists; saves are redirected
/// onto the existing row's id (see `handlers::profile`).
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profile")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Media object name of the stored picture.
    pub picture_path: Option<String>,

    /// Filename the picture is served under (original name, or the derived
    /// `_optimized.jpg` name after re-encoding).
    pub picture_filename: Option<String>,

    /// Byte size of the stored picture.
    pub file_size: Option<i64>,

    pub image_width: Option<i32>,
    pub image_height: Option<i32>,

    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
