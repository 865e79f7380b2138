//! Error types for `betterpedia-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::UserId;

/// Coarse classification of an [`Error`], used by outer layers to pick a
/// response status without matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Validation,
  NotFound,
  Authorization,
  Storage,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid input: {0}")]
  Validation(String),

  #[error("unknown tier: {0:?}")]
  UnknownTier(String),

  #[error("comment not found: {0}")]
  CommentNotFound(Uuid),

  #[error("parent comment not found: {0}")]
  ParentNotFound(Uuid),

  #[error("user {actor} may not {action} comment {comment_id}")]
  Forbidden {
    actor:      UserId,
    action:     &'static str,
    comment_id: Uuid,
  },

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Validation(_) | Self::UnknownTier(_) => ErrorKind::Validation,
      Self::CommentNotFound(_) | Self::ParentNotFound(_) => ErrorKind::NotFound,
      Self::Forbidden { .. } => ErrorKind::Authorization,
      Self::Storage(_) => ErrorKind::Storage,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Lift a store's associated error into [`Error`].
pub(crate) fn from_store<E: Into<Error>>(e: E) -> Error { e.into() }
