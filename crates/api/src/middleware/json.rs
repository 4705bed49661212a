//! JSON body extractor that validates before the handler runs.

use authgate_core::error::CoreError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;

/// `Json<T>` followed by `T::validate()`.
///
/// Malformed bodies (bad syntax, missing fields, wrong types, wrong content
/// type) become the same 400 `VALIDATION_ERROR` as failed field rules.
#[derive(Debug, Clone)]
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
            .map_err(|rejection: JsonRejection| {
                AppError::Core(CoreError::Validation(rejection.body_text()))
            })?;
        value.validate()?;
        Ok(Self(value))
    }
}
