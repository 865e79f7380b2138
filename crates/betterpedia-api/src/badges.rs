//! Handlers for `/badges` and `/admin/badges` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/badges` | All badges, highest contribution count first |
//! | `GET`    | `/badges/me` | Caller's badge, created on first access |
//! | `GET`    | `/badges/stats` | Per-tier counts |
//! | `GET`    | `/badges/tiers/{tier}` | Tier name is case-insensitive |
//! | `GET`    | `/badges/users/{id}` | 404 if the user has no badge yet |
//! | `PUT`    | `/admin/badges/{id}/tier` | Body: `{"tier":"GOLD"}` |
//! | `PUT`    | `/admin/badges/{id}/contributions` | Body: `{"count":42}` |
//! | `DELETE` | `/admin/badges/{id}` | 204, or 404 if there was no badge |

use axum::{Json, extract::State, http::StatusCode};
use betterpedia_core::{
  UserId,
  badge::{Badge, BadgeStats, Tier},
  store::{BadgeStore, CommentStore},
};
use serde::Deserialize;
use tracing::debug;

use crate::{
  AppState,
  error::ApiError,
  extract::{JsonBody, PathParam},
  identity::{AdminActor, CurrentActor},
};

// ─── Reads ────────────────────────────────────────────────────────────────────

/// `GET /badges`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Badge>>, ApiError>
where
  S: CommentStore + BadgeStore,
{
  Ok(Json(state.threads.reputation().all_badges().await?))
}

/// `GET /badges/me`
pub async fn mine<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
) -> Result<Json<Badge>, ApiError>
where
  S: CommentStore + BadgeStore,
{
  let badge = state
    .threads
    .reputation()
    .get_or_initialize(actor.user_id)
    .await?;
  Ok(Json(badge))
}

/// `GET /badges/stats`
pub async fn stats<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<BadgeStats>, ApiError>
where
  S: CommentStore + BadgeStore,
{
  Ok(Json(state.threads.reputation().stats().await?))
}

/// `GET /badges/tiers/{tier}`
pub async fn by_tier<S>(
  State(state): State<AppState<S>>,
  PathParam(tier): PathParam<String>,
) -> Result<Json<Vec<Badge>>, ApiError>
where
  S: CommentStore + BadgeStore,
{
  let tier = Tier::parse(&tier)?;
  Ok(Json(state.threads.reputation().badges_by_tier(tier).await?))
}

/// `GET /badges/users/{id}`
pub async fn for_user<S>(
  State(state): State<AppState<S>>,
  PathParam(user_id): PathParam<UserId>,
) -> Result<Json<Badge>, ApiError>
where
  S: CommentStore + BadgeStore,
{
  state
    .threads
    .reputation()
    .badge_for(user_id)
    .await?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("no badge recorded for user {user_id}")))
}

// ─── Administration ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SetTierBody {
  pub tier: String,
}

/// `PUT /admin/badges/{id}/tier`
pub async fn set_tier<S>(
  State(state): State<AppState<S>>,
  AdminActor(admin): AdminActor,
  PathParam(user_id): PathParam<UserId>,
  JsonBody(body): JsonBody<SetTierBody>,
) -> Result<Json<Badge>, ApiError>
where
  S: CommentStore + BadgeStore,
{
  let tier = Tier::parse(&body.tier)?;
  debug!(admin_id = admin.user_id, user_id, %tier, "tier override requested");
  Ok(Json(state.threads.reputation().set_tier(user_id, tier).await?))
}

#[derive(Debug, Deserialize)]
pub struct SetCountBody {
  pub count: i64,
}

/// `PUT /admin/badges/{id}/contributions`
pub async fn set_contributions<S>(
  State(state): State<AppState<S>>,
  AdminActor(admin): AdminActor,
  PathParam(user_id): PathParam<UserId>,
  JsonBody(body): JsonBody<SetCountBody>,
) -> Result<Json<Badge>, ApiError>
where
  S: CommentStore + BadgeStore,
{
  debug!(admin_id = admin.user_id, user_id, count = body.count, "count override requested");
  let badge = state
    .threads
    .reputation()
    .set_contribution_count(user_id, body.count)
    .await?;
  Ok(Json(badge))
}

/// `DELETE /admin/badges/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  AdminActor(_): AdminActor,
  PathParam(user_id): PathParam<UserId>,
) -> Result<StatusCode, ApiError>
where
  S: CommentStore + BadgeStore,
{
  if state.threads.reputation().delete_badge(user_id).await? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("no badge recorded for user {user_id}")))
  }
}
