use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Comma-separated technology labels shown on the project card.
    pub tech_stack: String,

    pub repo_link: Option<String>,
    pub live_link: Option<String>,

    /// Media object name of an optional illustration.
    pub image_path: Option<String>,

    /// Set once at insert; never updated.
    pub created_on: Date,

    /// Lower numbers appear first.
    pub position: i32,
}

impl ActiveModelBehavior for ActiveModel {}
