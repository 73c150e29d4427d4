//! Request extractors that reject malformed input with `400` instead of axum's defaults.

use axum::extract::{FromRequest, Path, Request};
use axum::{Json, extract::FromRequestParts, http::request::Parts};
use serde::de::DeserializeOwned;
use tracing::warn;
use validator::Validate;

use crate::domain::{AppError, ProductId};

/// JSON body that has been decoded and passed its `validator` constraints.
///
/// Syntax errors, missing fields and constraint violations all become
/// `AppError` values classified as invalid input, so the handler body never
/// runs for a malformed request.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                warn!(error = %rejection.body_text(), "Failed to bind request body");
                AppError::Deserialization(rejection.body_text())
            })?;

        value.validate().map_err(|e| {
            warn!(error = %e, "Request body failed validation");
            AppError::from(e)
        })?;

        Ok(Self(value))
    }
}

/// Product id taken from the `{id}` path segment, parsed as a base-10 integer.
///
/// Positivity is left to the use case; only the syntax is checked here.
pub struct ProductIdPath(pub ProductId);

impl<S> FromRequestParts<S> for ProductIdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::InvalidId(rejection.body_text()))?;

        raw.parse::<ProductId>()
            .map(Self)
            .map_err(|_| AppError::InvalidId(raw))
    }
}
