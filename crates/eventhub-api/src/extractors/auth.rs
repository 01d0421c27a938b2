//! `AuthUser` extractor: reads the user id forwarded by the authenticating gateway.
//!
//! Credentials are verified upstream. The header named by
//! `auth.user_header` carries the already-validated user id; this
//! extractor only parses it.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use eventhub_core::error::AppError;
use eventhub_core::types::UserId;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub UserId);

impl AuthUser {
    /// Returns the caller's user id.
    pub fn user_id(&self) -> UserId {
        self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = state.config.auth.user_header.as_str();

        let raw = parts
            .headers
            .get(header)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::unauthorized(format!("Missing {header} header")))?;

        let user_id = raw
            .parse::<UserId>()
            .map_err(|_| AppError::unauthorized(format!("Invalid {header} header")))?;

        Ok(AuthUser(user_id))
    }
}
