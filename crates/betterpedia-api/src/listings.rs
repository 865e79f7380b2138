//! Read-only comment listings keyed by article or by author.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/articles/{id}/comments` | Visible comments, oldest first |
//! | `GET`  | `/articles/{id}/comments/top-level` | Visible comments without a parent |
//! | `GET`  | `/articles/{id}/comments/count` | `{"count": n}` |
//! | `GET`  | `/users/{id}/comments` | Visible comments by the user, newest first |
//! | `GET`  | `/users/{id}/comments/count` | `{"count": n}` |

use axum::{Json, extract::State};
use betterpedia_core::{
  ArticleId, UserId,
  comment::Comment,
  store::{BadgeStore, CommentStore},
};
use serde::Serialize;

use crate::{AppState, error::ApiError, extract::PathParam};

#[derive(Debug, Serialize)]
pub struct CountResponse {
  pub count: u64,
}

// ─── Articles ─────────────────────────────────────────────────────────────────

pub async fn article_comments<S>(
  State(state): State<AppState<S>>,
  PathParam(article_id): PathParam<ArticleId>,
) -> Result<Json<Vec<Comment>>, ApiError>
where
  S: CommentStore + BadgeStore,
{
  Ok(Json(state.threads.comments_for_article(article_id).await?))
}

pub async fn article_top_level<S>(
  State(state): State<AppState<S>>,
  PathParam(article_id): PathParam<ArticleId>,
) -> Result<Json<Vec<Comment>>, ApiError>
where
  S: CommentStore + BadgeStore,
{
  Ok(Json(state.threads.top_level_for_article(article_id).await?))
}

pub async fn article_count<S>(
  State(state): State<AppState<S>>,
  PathParam(article_id): PathParam<ArticleId>,
) -> Result<Json<CountResponse>, ApiError>
where
  S: CommentStore + BadgeStore,
{
  let count = state.threads.count_for_article(article_id).await?;
  Ok(Json(CountResponse { count }))
}

// ─── Users ────────────────────────────────────────────────────────────────────

pub async fn user_comments<S>(
  State(state): State<AppState<S>>,
  PathParam(user_id): PathParam<UserId>,
) -> Result<Json<Vec<Comment>>, ApiError>
where
  S: CommentStore + BadgeStore,
{
  Ok(Json(state.threads.comments_by_author(user_id).await?))
}

pub async fn user_count<S>(
  State(state): State<AppState<S>>,
  PathParam(user_id): PathParam<UserId>,
) -> Result<Json<CountResponse>, ApiError>
where
  S: CommentStore + BadgeStore,
{
  let count = state.threads.count_by_author(user_id).await?;
  Ok(Json(CountResponse { count }))
}
