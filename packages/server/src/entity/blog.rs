use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "blog")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub content: String, // in Markdown

    pub created_at: DateTimeUtc,

    /// Unpublished posts are drafts, hidden from the public listing.
    #[sea_orm(default_value = true)]
    pub is_published: bool,
}

impl ActiveModelBehavior for ActiveModel {}
