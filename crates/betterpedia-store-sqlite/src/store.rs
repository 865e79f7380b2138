//! [`SqliteStore`]: the SQLite implementation of [`CommentStore`] and
//! [`BadgeStore`].

use std::path::Path;

use betterpedia_core::{
  ArticleId, UserId,
  badge::{Badge, Tier},
  comment::{Comment, NewComment, validate_content},
  store::{BadgeStore, CommentStore},
};
use rusqlite::OptionalExtension as _;
use tracing::debug;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    BADGE_COLUMNS, COMMENT_COLUMNS, RawBadge, RawComment, encode_dt,
    encode_tier, encode_uuid, now, truncate_dt,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Betterpedia store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl std::fmt::Debug for SqliteStore {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SqliteStore").finish_non_exhaustive()
  }
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store. Used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    debug!("schema initialised");
    Ok(())
  }

  /// Run a `SELECT` over `comments` with a trailing clause and decode every
  /// row.
  async fn query_comments(
    &self,
    clause: &'static str,
    param: rusqlite::types::Value,
  ) -> Result<Vec<Comment>> {
    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments {clause}");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![param], RawComment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComment::into_comment).collect()
  }

  async fn count_comments(
    &self,
    clause: &'static str,
    param: i64,
  ) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT COUNT(*) FROM comments {clause}");
        Ok(conn.query_row(&sql, rusqlite::params![param], |r| r.get(0))?)
      })
      .await?;
    Ok(u64::try_from(count).unwrap_or_default())
  }

  async fn query_badges(
    &self,
    clause: &'static str,
    params: Vec<rusqlite::types::Value>,
  ) -> Result<Vec<Badge>> {
    let raws: Vec<RawBadge> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {BADGE_COLUMNS} FROM badges {clause}");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawBadge::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBadge::into_badge).collect()
  }
}

/// Read one badge row inside an open connection or transaction.
fn select_badge(
  conn: &rusqlite::Connection,
  user_id: UserId,
) -> rusqlite::Result<Option<RawBadge>> {
  conn
    .query_row(
      &format!("SELECT {BADGE_COLUMNS} FROM badges WHERE user_id = ?1"),
      rusqlite::params![user_id],
      RawBadge::from_row,
    )
    .optional()
}

fn upsert_badge(conn: &rusqlite::Connection, raw: &RawBadge) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO badges (user_id, tier, contribution_count, awarded_at, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5)
     ON CONFLICT (user_id) DO UPDATE SET
       tier               = excluded.tier,
       contribution_count = excluded.contribution_count,
       updated_at         = excluded.updated_at",
    rusqlite::params![
      raw.user_id,
      raw.tier,
      raw.contribution_count,
      raw.awarded_at,
      raw.updated_at,
    ],
  )?;
  Ok(())
}

fn normalize(mut badge: Badge) -> Badge {
  badge.awarded_at = truncate_dt(badge.awarded_at);
  badge.updated_at = truncate_dt(badge.updated_at);
  badge
}

// ─── CommentStore impl ───────────────────────────────────────────────────────

impl CommentStore for SqliteStore {
  type Error = Error;

  async fn create(&self, input: NewComment) -> Result<Comment> {
    validate_content(&input.content)?;

    let at = now();
    let comment = Comment {
      comment_id: Uuid::new_v4(),
      author_id:  input.author_id,
      article_id: input.article_id,
      content:    input.content,
      parent_id:  input.parent_id,
      created_at: at,
      updated_at: at,
      deleted:    false,
    };

    let id_str      = encode_uuid(comment.comment_id);
    let parent_str  = comment.parent_id.map(encode_uuid);
    let at_str      = encode_dt(at);
    let author_id   = comment.author_id;
    let article_id  = comment.article_id;
    let content     = comment.content.clone();

    let parent_found: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if let Some(parent) = &parent_str {
          let exists = tx
            .query_row(
              "SELECT 1 FROM comments WHERE comment_id = ?1",
              rusqlite::params![parent],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
          if !exists {
            return Ok(false);
          }
        }
        tx.execute(
          "INSERT INTO comments (
             comment_id, author_id, article_id, content, parent_id,
             created_at, updated_at, deleted
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6, 0)",
          rusqlite::params![id_str, author_id, article_id, content, parent_str, at_str],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    match (parent_found, comment.parent_id) {
      (false, Some(parent_id)) => {
        Err(betterpedia_core::Error::ParentNotFound(parent_id).into())
      }
      _ => Ok(comment),
    }
  }

  async fn get(&self, comment_id: Uuid) -> Result<Option<Comment>> {
    let id_str = encode_uuid(comment_id);

    let raw: Option<RawComment> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE comment_id = ?1"),
            rusqlite::params![id_str],
            RawComment::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawComment::into_comment).transpose()
  }

  async fn list_by_article(
    &self,
    article_id:      ArticleId,
    include_deleted: bool,
  ) -> Result<Vec<Comment>> {
    let clause = if include_deleted {
      "WHERE article_id = ?1 ORDER BY created_at ASC, rowid ASC"
    } else {
      "WHERE article_id = ?1 AND deleted = 0 ORDER BY created_at ASC, rowid ASC"
    };
    self.query_comments(clause, article_id.into()).await
  }

  async fn list_top_level_by_article(&self, article_id: ArticleId) -> Result<Vec<Comment>> {
    self
      .query_comments(
        "WHERE article_id = ?1 AND parent_id IS NULL ORDER BY created_at ASC, rowid ASC",
        article_id.into(),
      )
      .await
  }

  async fn list_replies(&self, parent_id: Uuid) -> Result<Vec<Comment>> {
    self
      .query_comments(
        "WHERE parent_id = ?1 ORDER BY created_at ASC, rowid ASC",
        encode_uuid(parent_id).into(),
      )
      .await
  }

  async fn list_by_author(&self, author_id: UserId) -> Result<Vec<Comment>> {
    self
      .query_comments(
        "WHERE author_id = ?1 ORDER BY created_at DESC, rowid DESC",
        author_id.into(),
      )
      .await
  }

  async fn count_visible_by_article(&self, article_id: ArticleId) -> Result<u64> {
    self
      .count_comments("WHERE article_id = ?1 AND deleted = 0", article_id)
      .await
  }

  async fn count_visible_by_author(&self, author_id: UserId) -> Result<u64> {
    self
      .count_comments("WHERE author_id = ?1 AND deleted = 0", author_id)
      .await
  }

  async fn update(&self, comment_id: Uuid, content: String) -> Result<Option<Comment>> {
    validate_content(&content)?;

    let id_str = encode_uuid(comment_id);
    let at_str = encode_dt(now());

    let raw: Option<RawComment> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE comments SET content = ?2, updated_at = ?3
           WHERE comment_id = ?1 AND deleted = 0",
          rusqlite::params![id_str, content, at_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        let raw = tx.query_row(
          &format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE comment_id = ?1"),
          rusqlite::params![id_str],
          RawComment::from_row,
        )?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawComment::into_comment).transpose()
  }

  async fn soft_delete(&self, comment_id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(comment_id);

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE comments SET deleted = 1 WHERE comment_id = ?1 AND deleted = 0",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }
}

// ─── BadgeStore impl ─────────────────────────────────────────────────────────

impl BadgeStore for SqliteStore {
  type Error = Error;

  async fn find_by_user(&self, user_id: UserId) -> Result<Option<Badge>> {
    let raw = self
      .conn
      .call(move |conn| Ok(select_badge(conn, user_id)?))
      .await?;

    raw.map(RawBadge::into_badge).transpose()
  }

  async fn insert_if_absent(&self, badge: Badge) -> Result<Badge> {
    let user_id = badge.user_id;
    let raw_new = RawBadge::from_badge(&badge);

    let raw: RawBadge = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO badges (user_id, tier, contribution_count, awarded_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT (user_id) DO NOTHING",
          rusqlite::params![
            raw_new.user_id,
            raw_new.tier,
            raw_new.contribution_count,
            raw_new.awarded_at,
            raw_new.updated_at,
          ],
        )?;
        let stored = select_badge(&tx, user_id)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        tx.commit()?;
        Ok(stored)
      })
      .await?;

    raw.into_badge()
  }

  async fn save(&self, badge: Badge) -> Result<Badge> {
    let badge = normalize(badge);
    let raw = RawBadge::from_badge(&badge);

    self
      .conn
      .call(move |conn| {
        upsert_badge(conn, &raw)?;
        Ok(())
      })
      .await?;

    Ok(badge)
  }

  async fn upsert_with<F>(&self, user_id: UserId, f: F) -> Result<Badge>
  where
    F: FnOnce(&mut Badge) + Send + 'static,
  {
    let badge: Badge = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut badge = match select_badge(&tx, user_id)? {
          Some(raw) => raw
            .into_badge()
            .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?,
          None => Badge::initial(user_id, now()),
        };
        f(&mut badge);
        let badge = normalize(badge);
        upsert_badge(&tx, &RawBadge::from_badge(&badge))?;
        tx.commit()?;
        Ok(badge)
      })
      .await?;

    Ok(badge)
  }

  async fn delete(&self, user_id: UserId) -> Result<bool> {
    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM badges WHERE user_id = ?1",
          rusqlite::params![user_id],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn list_all(&self) -> Result<Vec<Badge>> {
    self.query_badges("ORDER BY user_id ASC", Vec::new()).await
  }

  async fn list_by_tier(&self, tier: Tier) -> Result<Vec<Badge>> {
    self
      .query_badges(
        "WHERE tier = ?1 ORDER BY contribution_count DESC, user_id ASC",
        vec![encode_tier(tier).to_owned().into()],
      )
      .await
  }

  async fn list_all_ordered_by_contribution(&self) -> Result<Vec<Badge>> {
    self
      .query_badges("ORDER BY contribution_count DESC, user_id ASC", Vec::new())
      .await
  }
}
