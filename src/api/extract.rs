//! Request extractors: the bearer principal and JSON bodies.

use crate::{
    api::AppState,
    auth::{Principal, bearer_token, resolve_principal},
    errors::Error,
};
use async_trait::async_trait;
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Request, rejection::JsonRejection},
    http::{header, request::Parts},
};
use tracing::debug;

/// The principal behind the request's `Authorization: Bearer` header.
///
/// Rejects with `401` when the header is missing or the token does not resolve.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token);

        resolve_principal(&state.db, &state.tokens, bearer)
            .await
            .map(Self)
    }
}

/// A JSON request body.
///
/// Unlike [`Json`], a missing, malformed or mistyped body is rejected as
/// [`Error::InvalidArgument`], so it gets the usual `400 {"error": msg}` response.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                let message = rejection.body_text();
                debug!("Rejected request body: {}", message);
                Err(Error::invalid(message))
            }
        }
    }
}
