use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "education")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub institution: String,
    pub degree: String,

    /// Human-readable duration label, e.g. "2017 - 2021".
    pub duration: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Lower numbers appear first.
    pub position: i32,
}

impl ActiveModelBehavior for ActiveModel {}
