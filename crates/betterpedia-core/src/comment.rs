//! Comment types: the nodes of a discussion thread.
//!
//! Threads form a forest: a comment's parent is fixed at creation and always
//! points at a comment that already existed, so no cycle can ever be built.
//! Parents are stored as ids and resolved through a
//! [`CommentStore`](crate::store::CommentStore), never as owned references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ArticleId, Error, Result, UserId};

/// Upper bound on the length of a comment body, in Unicode scalar values.
pub const MAX_CONTENT_CHARS: usize = 10_000;

// ─── Comment ─────────────────────────────────────────────────────────────────

/// A comment on an article, or a reply to another comment.
///
/// Comments are never hard-deleted; `deleted` hides them from every read
/// projection while keeping reply linkage intact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
  pub comment_id: Uuid,
  pub author_id:  UserId,
  pub article_id: ArticleId,
  pub content:    String,
  /// `None` for a top-level comment. Immutable after creation.
  pub parent_id:  Option<Uuid>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub deleted:    bool,
}

impl Comment {
  pub fn is_visible(&self) -> bool { !self.deleted }
}

// ─── NewComment ──────────────────────────────────────────────────────────────

/// Input to [`crate::store::CommentStore::create`].
/// Ids and timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewComment {
  pub author_id:  UserId,
  pub article_id: ArticleId,
  pub content:    String,
  pub parent_id:  Option<Uuid>,
}

impl NewComment {
  /// A top-level comment.
  pub fn new(
    author_id: UserId,
    article_id: ArticleId,
    content: impl Into<String>,
  ) -> Self {
    Self { author_id, article_id, content: content.into(), parent_id: None }
  }

  /// A reply to `parent_id`.
  pub fn reply(
    author_id: UserId,
    article_id: ArticleId,
    parent_id: Uuid,
    content: impl Into<String>,
  ) -> Self {
    Self {
      author_id,
      article_id,
      content: content.into(),
      parent_id: Some(parent_id),
    }
  }
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Reject blank or oversized comment bodies.
pub fn validate_content(content: &str) -> Result<()> {
  if content.trim().is_empty() {
    return Err(Error::Validation("comment content cannot be empty".into()));
  }
  let len = content.chars().count();
  if len > MAX_CONTENT_CHARS {
    return Err(Error::Validation(format!(
      "comment content is {len} characters; the limit is {MAX_CONTENT_CHARS}"
    )));
  }
  Ok(())
}
