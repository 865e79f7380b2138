//! Header-based identity extractors.
//!
//! Authentication happens upstream. By the time a request reaches this
//! router the gateway has resolved the caller and forwards two headers:
//!
//! - `x-user-id`: the caller's decimal user id
//! - `x-user-admin`: `true` or `1` when the caller administers the site

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, request::Parts},
};
use betterpedia_core::{UserId, identity::Actor};

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const ADMIN_HEADER: &str = "x-user-admin";

/// Resolve the acting user from request headers.
pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, ApiError> {
  let raw = headers
    .get(USER_ID_HEADER)
    .ok_or_else(|| ApiError::Unauthorized(format!("missing {USER_ID_HEADER} header")))?;

  let user_id = raw
    .to_str()
    .ok()
    .and_then(|v| v.trim().parse::<UserId>().ok())
    .ok_or_else(|| ApiError::Unauthorized(format!("malformed {USER_ID_HEADER} header")))?;

  let is_admin = headers
    .get(ADMIN_HEADER)
    .and_then(|v| v.to_str().ok())
    .is_some_and(|v| {
      let v = v.trim();
      v == "1" || v.eq_ignore_ascii_case("true")
    });

  Ok(Actor { user_id, is_admin })
}

/// The authenticated caller. Rejects with 401 when no identity was forwarded.
#[derive(Debug, Clone, Copy)]
pub struct CurrentActor(pub Actor);

impl<S> FromRequestParts<S> for CurrentActor
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    actor_from_headers(&parts.headers).map(CurrentActor)
  }
}

/// An authenticated administrator. 401 without identity, 403 without the
/// admin flag.
#[derive(Debug, Clone, Copy)]
pub struct AdminActor(pub Actor);

impl<S> FromRequestParts<S> for AdminActor
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    let actor = actor_from_headers(&parts.headers)?;
    if !actor.is_admin {
      return Err(ApiError::Forbidden(format!(
        "user {} is not an administrator",
        actor.user_id
      )));
    }
    Ok(AdminActor(actor))
  }
}
