//! SQL schema for the ponder SQLite store.
//!
//! Runs at every connection startup; `PRAGMA user_version` records the
//! installed revision so later migrations have something to gate on.

/// Schema DDL, safe to re-run (`CREATE TABLE IF NOT EXISTS`).
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Users are documents: scalar columns plus two JSON reference lists.
-- The lists are deliberately denormalised (no join tables, no foreign
-- keys); cross-document consistency is the relationship rules' job.
CREATE TABLE IF NOT EXISTS users (
    user_id   TEXT PRIMARY KEY,
    username  TEXT NOT NULL UNIQUE,        -- backstop for the create/update probes
    email     TEXT NOT NULL UNIQUE,
    thoughts  TEXT NOT NULL DEFAULT '[]',  -- JSON array of thought ids, creation order
    friends   TEXT NOT NULL DEFAULT '[]'   -- JSON array of user ids, set semantics
);

-- Thoughts embed their reactions wholesale; a reaction has no row of its
-- own. `username` is a denormalised copy of the owner's username, kept in
-- sync by the rename cascade.
CREATE TABLE IF NOT EXISTS thoughts (
    thought_id   TEXT PRIMARY KEY,
    thought_text TEXT NOT NULL,
    username     TEXT NOT NULL,
    created_at   TEXT NOT NULL,              -- ISO 8601 UTC; server-assigned
    reactions    TEXT NOT NULL DEFAULT '[]'  -- JSON array of reaction documents
);

PRAGMA user_version = 1;
";
