use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "experience")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub organization: String,
    pub role: String,

    /// Human-readable duration label, e.g. "2021 - 2023".
    pub duration: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Optional label shown next to the organization, e.g. "Partnered with IBM".
    pub partner_label: Option<String>,

    pub external_link: Option<String>,

    /// Lower numbers appear first.
    pub position: i32,
}

impl ActiveModelBehavior for ActiveModel {}
