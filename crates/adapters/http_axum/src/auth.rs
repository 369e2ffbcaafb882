//! Caller identification.
//!
//! Authentication happens in front of this service. The proxy forwards the
//! authenticated user as `x-user-id` (a UUID) and marks administrators with
//! `x-user-role: admin`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use sensorhub_domain::id::UserId;
use sensorhub_domain::principal::Principal;

use crate::error::ApiError;

/// Header carrying the authenticated user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the authenticated user's role.
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// The principal on whose behalf a request runs.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Principal);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or(ApiError::Unauthenticated("missing x-user-id header"))?
            .to_str()
            .ok()
            .and_then(|raw| raw.trim().parse::<UserId>().ok())
            .ok_or(ApiError::Unauthenticated("x-user-id header is not a valid user id"))?;

        let is_admin = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|role| role.trim().eq_ignore_ascii_case("admin"));

        Ok(Self(if is_admin {
            Principal::admin(user_id)
        } else {
            Principal::user(user_id)
        }))
    }
}
