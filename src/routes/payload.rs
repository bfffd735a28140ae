//! JSON body extractor that validates the payload and reports both parse and
//! validation failures through [`AppError`].

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use axum_valid::{Valid, ValidRejection};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;

/// Deserialised and validated request body.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Valid::<Json<T>>::from_request(req, state).await {
            Ok(Valid(Json(value))) => Ok(Self(value)),
            Err(ValidRejection::Valid(errors)) => Err(errors.into()),
            Err(ValidRejection::Inner(rejection)) => {
                Err(AppError::BadRequest(rejection.body_text()))
            }
        }
    }
}
