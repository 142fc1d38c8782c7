use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::state::AppState;

/// Administrator identity extracted from `Authorization: Bearer <token>`.
///
/// The management console authenticates with the single pre-shared token
/// from `admin.api_token`; add this parameter to a handler to restrict it
/// to the administrator.
pub struct AdminUser;

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::TokenInvalid)?;

        // An unset token locks the console out entirely rather than
        // accepting an empty bearer value.
        if state.config.admin.api_token.is_empty() || token != state.config.admin.api_token {
            return Err(AppError::TokenInvalid);
        }

        Ok(AdminUser)
    }
}
