//! Request extractors.

use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

use crate::error::Error;

/// Header carrying the acting tenant's id.
pub const USER_HEADER: &str = "x-user-id";

/// The tenant every query of the request is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub i32);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(Error::Unauthenticated)?;

        match value.trim().parse::<i32>() {
            Ok(id) if id > 0 => Ok(CurrentUser(id)),
            _ => Err(Error::Unauthenticated),
        }
    }
}

/// JSON body whose rejections render in the API's error shape.
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| Error::InvalidInput(rejection.body_text()))?;
        Ok(Payload(value))
    }
}
