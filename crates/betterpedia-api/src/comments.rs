//! Handlers for `/comments` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/comments` | Body: [`NewCommentBody`]; returns 201 + stored comment |
//! | `POST`   | `/comments/replies` | Body: [`NewReplyBody`]; returns 201 + stored reply |
//! | `GET`    | `/comments/{id}` | Single comment, deleted ones included |
//! | `PUT`    | `/comments/{id}` | Body: `{"content":"..."}`; author only |
//! | `DELETE` | `/comments/{id}` | Author or administrator; 204, or 404 if nothing changed |
//! | `GET`    | `/comments/{id}/replies` | Visible direct replies, oldest first |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use betterpedia_core::{
  ArticleId,
  comment::Comment,
  store::{BadgeStore, CommentStore},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  error::ApiError,
  extract::{JsonBody, PathParam},
  identity::CurrentActor,
};

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NewCommentBody {
  pub article_id: ArticleId,
  pub content:    String,
}

/// `POST /comments`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  JsonBody(body): JsonBody<NewCommentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CommentStore + BadgeStore,
{
  let comment = state
    .threads
    .post_comment(actor.user_id, body.article_id, body.content)
    .await?;
  Ok((StatusCode::CREATED, Json(comment)))
}

#[derive(Debug, Deserialize)]
pub struct NewReplyBody {
  pub article_id: ArticleId,
  pub parent_id:  Uuid,
  pub content:    String,
}

/// `POST /comments/replies`
pub async fn reply<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  JsonBody(body): JsonBody<NewReplyBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CommentStore + BadgeStore,
{
  let reply = state
    .threads
    .post_reply(actor.user_id, body.article_id, body.parent_id, body.content)
    .await?;
  Ok((StatusCode::CREATED, Json(reply)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /comments/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  PathParam(id): PathParam<Uuid>,
) -> Result<Json<Comment>, ApiError>
where
  S: CommentStore + BadgeStore,
{
  Ok(Json(state.threads.get_comment(id).await?))
}

// ─── Edit ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EditBody {
  pub content: String,
}

/// `PUT /comments/{id}`
pub async fn edit<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  PathParam(id): PathParam<Uuid>,
  JsonBody(body): JsonBody<EditBody>,
) -> Result<Json<Comment>, ApiError>
where
  S: CommentStore + BadgeStore,
{
  let comment = state
    .threads
    .edit_comment(actor.user_id, id, body.content)
    .await?;
  Ok(Json(comment))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /comments/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  PathParam(id): PathParam<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: CommentStore + BadgeStore,
{
  if state.threads.delete_comment(actor, id).await? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("comment {id} not found or already deleted")))
  }
}

// ─── Replies ──────────────────────────────────────────────────────────────────

/// `GET /comments/{id}/replies`
pub async fn replies<S>(
  State(state): State<AppState<S>>,
  PathParam(id): PathParam<Uuid>,
) -> Result<Json<Vec<Comment>>, ApiError>
where
  S: CommentStore + BadgeStore,
{
  Ok(Json(state.threads.replies_of(id).await?))
}
