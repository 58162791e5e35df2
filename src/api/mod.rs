//! API handlers for LendHub REST endpoints

pub mod bookings;
pub mod health;
pub mod items;
pub mod openapi;
pub mod users;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::{error::AppError, AppState};

/// Header carrying the caller identity
pub const USER_ID_HEADER: &str = "X-Sharer-User-Id";

/// Extractor for the calling user's id from the X-Sharer-User-Id header
pub struct CallerId(pub i64);

#[async_trait]
impl FromRequestParts<AppState> for CallerId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                AppError::Validation(format!("{} header is required", USER_ID_HEADER))
            })?;

        let id = raw.parse().map_err(|_| {
            AppError::Validation(format!("{} header must be a user id", USER_ID_HEADER))
        })?;

        Ok(CallerId(id))
    }
}
