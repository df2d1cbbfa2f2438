use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

pub const API_KEY_HEADER: &str = "x-api-key";

/// The raw company API key sent with a request.
///
/// Only presence is checked here; the card service validates the key itself.
#[derive(Debug, Clone)]
pub struct CompanyApiKey(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CompanyApiKey
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| CompanyApiKey(value.to_string()))
            .ok_or_else(|| AppError::unauthorized("Missing x-api-key header"))
    }
}
