//! [`ThreadService`]: posting, editing, and deleting comments.
//!
//! Every successful post or reply credits the author with one contribution
//! through [`ReputationService::increment_contribution`]. That call is
//! best-effort: if it fails, the comment stays posted and the failure is only
//! logged.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  ArticleId, Error, Result, UserId,
  comment::{Comment, NewComment, validate_content},
  error::from_store,
  identity::Actor,
  reputation::ReputationService,
  store::{BadgeStore, CommentStore},
};

#[derive(Debug, Clone)]
pub struct ThreadService<C, B> {
  comments:   C,
  reputation: ReputationService<B>,
}

impl<C, B> ThreadService<C, B>
where
  C: CommentStore,
  B: BadgeStore,
{
  pub fn new(comments: C, reputation: ReputationService<B>) -> Self {
    Self { comments, reputation }
  }

  pub fn reputation(&self) -> &ReputationService<B> { &self.reputation }

  // ── Writes ──────────────────────────────────────────────────────────────

  /// Post a top-level comment on `article_id`.
  pub async fn post_comment(
    &self,
    actor_id: UserId,
    article_id: ArticleId,
    content: String,
  ) -> Result<Comment> {
    validate_content(&content)?;
    let comment = self
      .comments
      .create(NewComment::new(actor_id, article_id, content))
      .await
      .map_err(from_store)?;
    info!(comment_id = %comment.comment_id, actor_id, article_id, "comment posted");

    self.credit_contribution(actor_id).await;
    Ok(comment)
  }

  /// Reply to `parent_id`. The reply is filed under the caller's
  /// `article_id`, even if the parent belongs to a different article.
  pub async fn post_reply(
    &self,
    actor_id: UserId,
    article_id: ArticleId,
    parent_id: Uuid,
    content: String,
  ) -> Result<Comment> {
    validate_content(&content)?;
    let parent = self
      .comments
      .get(parent_id)
      .await
      .map_err(from_store)?
      .ok_or(Error::ParentNotFound(parent_id))?;

    if parent.article_id != article_id {
      debug!(
        %parent_id,
        parent_article = parent.article_id,
        article_id,
        "reply filed under a different article than its parent"
      );
    }

    let reply = self
      .comments
      .create(NewComment::reply(actor_id, article_id, parent_id, content))
      .await
      .map_err(from_store)?;
    info!(comment_id = %reply.comment_id, %parent_id, actor_id, "reply posted");

    self.credit_contribution(actor_id).await;
    Ok(reply)
  }

  /// Replace the content of a comment. Only its author may do this;
  /// administrators can delete other people's comments but not edit them.
  pub async fn edit_comment(
    &self,
    actor_id: UserId,
    comment_id: Uuid,
    new_content: String,
  ) -> Result<Comment> {
    let comment = self.get_comment(comment_id).await?;
    if comment.author_id != actor_id {
      return Err(Error::Forbidden { actor: actor_id, action: "edit", comment_id });
    }
    if comment.deleted {
      return Err(Error::CommentNotFound(comment_id));
    }
    validate_content(&new_content)?;

    let updated = self
      .comments
      .update(comment_id, new_content)
      .await
      .map_err(from_store)?
      .ok_or(Error::CommentNotFound(comment_id))?;
    info!(%comment_id, actor_id, "comment edited");
    Ok(updated)
  }

  /// Soft-delete a comment. Allowed for its author and for administrators.
  ///
  /// Returns `false` if there was nothing to delete: the comment does not
  /// exist or is already deleted. Replies are left untouched.
  pub async fn delete_comment(&self, actor: Actor, comment_id: Uuid) -> Result<bool> {
    let Some(comment) = self.comments.get(comment_id).await.map_err(from_store)? else {
      return Ok(false);
    };
    if comment.author_id != actor.user_id && !actor.is_admin {
      return Err(Error::Forbidden {
        actor: actor.user_id,
        action: "delete",
        comment_id,
      });
    }

    let deleted = self.comments.soft_delete(comment_id).await.map_err(from_store)?;
    if deleted {
      info!(%comment_id, actor_id = actor.user_id, by_admin = actor.is_admin, "comment deleted");
    }
    Ok(deleted)
  }

  // ── Reads ───────────────────────────────────────────────────────────────

  /// Look up a single comment, including soft-deleted ones.
  pub async fn get_comment(&self, comment_id: Uuid) -> Result<Comment> {
    self
      .comments
      .get(comment_id)
      .await
      .map_err(from_store)?
      .ok_or(Error::CommentNotFound(comment_id))
  }

  /// Visible comments on an article, oldest first.
  pub async fn comments_for_article(&self, article_id: ArticleId) -> Result<Vec<Comment>> {
    self
      .comments
      .list_by_article(article_id, false)
      .await
      .map_err(from_store)
  }

  /// Visible top-level comments on an article, oldest first.
  pub async fn top_level_for_article(&self, article_id: ArticleId) -> Result<Vec<Comment>> {
    let comments = self
      .comments
      .list_top_level_by_article(article_id)
      .await
      .map_err(from_store)?;
    Ok(visible(comments))
  }

  /// Visible direct replies to `parent_id`, oldest first. The parent itself
  /// may be deleted; only the replies are filtered.
  pub async fn replies_of(&self, parent_id: Uuid) -> Result<Vec<Comment>> {
    self.get_comment(parent_id).await?;
    let replies = self.comments.list_replies(parent_id).await.map_err(from_store)?;
    Ok(visible(replies))
  }

  /// Visible comments written by `author_id`, newest first.
  pub async fn comments_by_author(&self, author_id: UserId) -> Result<Vec<Comment>> {
    let comments = self.comments.list_by_author(author_id).await.map_err(from_store)?;
    Ok(visible(comments))
  }

  pub async fn count_for_article(&self, article_id: ArticleId) -> Result<u64> {
    self
      .comments
      .count_visible_by_article(article_id)
      .await
      .map_err(from_store)
  }

  pub async fn count_by_author(&self, author_id: UserId) -> Result<u64> {
    self
      .comments
      .count_visible_by_author(author_id)
      .await
      .map_err(from_store)
  }

  // ── Integration ─────────────────────────────────────────────────────────

  async fn credit_contribution(&self, actor_id: UserId) {
    match self.reputation.increment_contribution(actor_id).await {
      Ok(badge) => debug!(
        actor_id,
        count = badge.contribution_count,
        tier = %badge.tier,
        "contribution recorded"
      ),
      Err(error) => warn!(
        actor_id,
        %error,
        "failed to record contribution; comment was kept"
      ),
    }
  }
}

fn visible(mut comments: Vec<Comment>) -> Vec<Comment> {
  comments.retain(Comment::is_visible);
  comments
}
