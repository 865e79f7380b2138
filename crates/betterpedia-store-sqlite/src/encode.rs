//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings with microsecond
//! precision, so lexical order equals chronological order. UUIDs are stored
//! as hyphenated lowercase strings. Tiers use their upper-case names.

use betterpedia_core::{
  badge::{Badge, Tier},
  comment::Comment,
};
use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

/// The current time at the precision the store keeps.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

/// Drop any precision the store cannot keep.
pub fn truncate_dt(dt: DateTime<Utc>) -> DateTime<Utc> { dt.trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Tier ─────────────────────────────────────────────────────────────────────

pub fn encode_tier(tier: Tier) -> &'static str { tier.into() }

pub fn decode_tier(s: &str) -> Result<Tier> {
  Tier::parse(s).map_err(|_| Error::Corrupt { column: "tier", value: s.to_owned() })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawComment::from_row`].
pub const COMMENT_COLUMNS: &str =
  "comment_id, author_id, article_id, content, parent_id, created_at, updated_at, deleted";

/// Raw values read directly from a `comments` row.
pub struct RawComment {
  pub comment_id: String,
  pub author_id:  i64,
  pub article_id: i64,
  pub content:    String,
  pub parent_id:  Option<String>,
  pub created_at: String,
  pub updated_at: String,
  pub deleted:    bool,
}

impl RawComment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      comment_id: row.get(0)?,
      author_id:  row.get(1)?,
      article_id: row.get(2)?,
      content:    row.get(3)?,
      parent_id:  row.get(4)?,
      created_at: row.get(5)?,
      updated_at: row.get(6)?,
      deleted:    row.get(7)?,
    })
  }

  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      comment_id: decode_uuid(&self.comment_id)?,
      author_id:  self.author_id,
      article_id: self.article_id,
      content:    self.content,
      parent_id:  self.parent_id.as_deref().map(decode_uuid).transpose()?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      deleted:    self.deleted,
    })
  }
}

/// Column list matching [`RawBadge::from_row`].
pub const BADGE_COLUMNS: &str =
  "user_id, tier, contribution_count, awarded_at, updated_at";

/// Raw values read directly from a `badges` row.
pub struct RawBadge {
  pub user_id:            i64,
  pub tier:               String,
  pub contribution_count: i64,
  pub awarded_at:         String,
  pub updated_at:         String,
}

impl RawBadge {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:            row.get(0)?,
      tier:               row.get(1)?,
      contribution_count: row.get(2)?,
      awarded_at:         row.get(3)?,
      updated_at:         row.get(4)?,
    })
  }

  pub fn from_badge(badge: &Badge) -> Self {
    Self {
      user_id:            badge.user_id,
      tier:               encode_tier(badge.tier).to_owned(),
      contribution_count: i64::from(badge.contribution_count),
      awarded_at:         encode_dt(badge.awarded_at),
      updated_at:         encode_dt(badge.updated_at),
    }
  }

  pub fn into_badge(self) -> Result<Badge> {
    let contribution_count =
      u32::try_from(self.contribution_count).map_err(|_| Error::Corrupt {
        column: "contribution_count",
        value:  self.contribution_count.to_string(),
      })?;

    Ok(Badge {
      user_id: self.user_id,
      tier: decode_tier(&self.tier)?,
      contribution_count,
      awarded_at: decode_dt(&self.awarded_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn encoded_timestamps_sort_chronologically() {
    let earlier = "2024-05-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
    let later = earlier + chrono::Duration::microseconds(1_500);
    assert!(encode_dt(earlier) < encode_dt(later));
    assert_eq!(encode_dt(earlier), "2024-05-01T10:00:00.000000Z");
  }

  #[test]
  fn timestamp_roundtrip_at_store_precision() {
    let t = now();
    assert_eq!(decode_dt(&encode_dt(t)).unwrap(), t);
  }

  #[test]
  fn unknown_tier_is_corrupt() {
    assert!(matches!(decode_tier("MITHRIL"), Err(Error::Corrupt { column: "tier", .. })));
    assert_eq!(decode_tier("GOLD").unwrap(), Tier::Gold);
  }

  #[test]
  fn negative_count_is_corrupt() {
    let raw = RawBadge {
      user_id:            1,
      tier:               "BRONZE".into(),
      contribution_count: -3,
      awarded_at:         encode_dt(now()),
      updated_at:         encode_dt(now()),
    };
    assert!(matches!(raw.into_badge(), Err(Error::Corrupt { .. })));
  }
}
