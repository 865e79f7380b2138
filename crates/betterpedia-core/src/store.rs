//! The `CommentStore` and `BadgeStore` traits.
//!
//! Both are implemented by storage backends (e.g. `betterpedia-store-sqlite`).
//! The services in this crate depend on these abstractions, not on any
//! concrete backend.
//!
//! Stores do not apply visibility rules beyond what a method's name says;
//! hiding soft-deleted comments is the [`ThreadService`](crate::ThreadService)'s
//! job.

use std::future::Future;

use uuid::Uuid;

use crate::{
  ArticleId, UserId,
  badge::{Badge, Tier},
  comment::{Comment, NewComment},
};

// ─── Comments ────────────────────────────────────────────────────────────────

/// Abstraction over the comment table.
///
/// Comments are never removed. The only mutations are a content edit and the
/// one-way soft-delete flag.
pub trait CommentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  /// Validate and persist a new comment. The id and both timestamps are set
  /// by the store.
  ///
  /// Fails with [`crate::Error::Validation`] on blank or oversized content
  /// and with [`crate::Error::ParentNotFound`] if `input.parent_id` does not
  /// name a stored comment (deleted parents are accepted).
  fn create(
    &self,
    input: NewComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  /// Retrieve a comment by id, deleted or not. `None` if it never existed.
  fn get(
    &self,
    comment_id: Uuid,
  ) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + '_;

  /// All comments on an article, oldest first.
  fn list_by_article(
    &self,
    article_id: ArticleId,
    include_deleted: bool,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;

  /// Comments on an article with no parent, oldest first.
  fn list_top_level_by_article(
    &self,
    article_id: ArticleId,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;

  /// Direct children of `parent_id`, oldest first.
  fn list_replies(
    &self,
    parent_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;

  /// Everything a user has written, newest first.
  fn list_by_author(
    &self,
    author_id: UserId,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;

  fn count_visible_by_article(
    &self,
    article_id: ArticleId,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  fn count_visible_by_author(
    &self,
    author_id: UserId,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Replace the content of a live comment and refresh `updated_at`.
  ///
  /// Returns `None` if the comment is missing or already soft-deleted.
  fn update(
    &self,
    comment_id: Uuid,
    content: String,
  ) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + '_;

  /// Mark a comment deleted. Returns `true` only if this call flipped the
  /// flag.
  fn soft_delete(
    &self,
    comment_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Badges ──────────────────────────────────────────────────────────────────

/// Abstraction over the badge table: at most one row per user id.
///
/// Implementations must make [`BadgeStore::insert_if_absent`] and
/// [`BadgeStore::upsert_with`] atomic per user id, so that concurrent callers
/// can neither create duplicates nor lose increments.
pub trait BadgeStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  fn find_by_user(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Option<Badge>, Self::Error>> + Send + '_;

  /// Insert `badge` unless its user already has one; return whichever row is
  /// stored afterwards.
  fn insert_if_absent(
    &self,
    badge: Badge,
  ) -> impl Future<Output = Result<Badge, Self::Error>> + Send + '_;

  /// Insert or overwrite the row for `badge.user_id`.
  fn save(
    &self,
    badge: Badge,
  ) -> impl Future<Output = Result<Badge, Self::Error>> + Send + '_;

  /// Atomically read the user's badge, apply `f`, and write it back.
  ///
  /// A user without a badge starts from [`Badge::initial`] in the same
  /// transaction, so a concurrent delete cannot make the write fail.
  fn upsert_with<F>(
    &self,
    user_id: UserId,
    f: F,
  ) -> impl Future<Output = Result<Badge, Self::Error>> + Send + '_
  where
    F: FnOnce(&mut Badge) + Send + 'static;

  /// Remove the user's badge. Returns `false` if none existed.
  fn delete(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn list_all(
    &self,
  ) -> impl Future<Output = Result<Vec<Badge>, Self::Error>> + Send + '_;

  /// Badges at `tier`, highest contribution count first.
  fn list_by_tier(
    &self,
    tier: Tier,
  ) -> impl Future<Output = Result<Vec<Badge>, Self::Error>> + Send + '_;

  /// Every badge, highest contribution count first.
  fn list_all_ordered_by_contribution(
    &self,
  ) -> impl Future<Output = Result<Vec<Badge>, Self::Error>> + Send + '_;
}
