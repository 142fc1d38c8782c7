use std::sync::Arc;

use common::media::MediaStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::mailer::Mailer;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub media: Arc<dyn MediaStore>,
    /// `None` when outbound email is disabled in configuration.
    pub mailer: Option<Arc<Mailer>>,
    pub config: AppConfig,
}
