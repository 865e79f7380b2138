//! DDL for the `comments` and `badges` tables.
//!
//! Runs on every open. `user_version` records the layout for later
//! migrations.

/// Idempotent: every statement is `IF NOT EXISTS` or a pragma.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Comments are never deleted; `deleted` is a one-way soft-delete flag.
-- `parent_id` is written once, at insert.
CREATE TABLE IF NOT EXISTS comments (
    comment_id  TEXT PRIMARY KEY,
    author_id   INTEGER NOT NULL,
    article_id  INTEGER NOT NULL,
    content     TEXT NOT NULL CHECK (length(trim(content)) > 0),
    parent_id   TEXT REFERENCES comments(comment_id),
    created_at  TEXT NOT NULL,   -- RFC 3339 UTC, fixed-width microseconds
    updated_at  TEXT NOT NULL,
    deleted     INTEGER NOT NULL DEFAULT 0 CHECK (deleted IN (0, 1))
);

CREATE INDEX IF NOT EXISTS comments_article_idx ON comments(article_id, created_at);
CREATE INDEX IF NOT EXISTS comments_author_idx  ON comments(author_id, created_at);
CREATE INDEX IF NOT EXISTS comments_parent_idx  ON comments(parent_id, created_at);

-- One badge per user.
CREATE TABLE IF NOT EXISTS badges (
    user_id            INTEGER PRIMARY KEY,
    tier               TEXT NOT NULL DEFAULT 'BRONZE',   -- BRONZE | SILVER | GOLD | PLATINUM
    contribution_count INTEGER NOT NULL DEFAULT 0 CHECK (contribution_count >= 0),
    awarded_at         TEXT NOT NULL,
    updated_at         TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS badges_tier_idx ON badges(tier, contribution_count);

PRAGMA user_version = 1;
";
