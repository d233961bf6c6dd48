//! Conversions between the domain types and the plain-text column forms
//! the SQLite store keeps.
//!
//! UUIDs are stored as hyphenated lowercase strings and timestamps as
//! RFC 3339. Id-reference lists and embedded reactions are stored as
//! compact JSON arrays, so the column text round-trips through the same
//! serde shapes the wire uses.

use chrono::{DateTime, Utc};
use ponder_core::{
  reaction::Reaction,
  thought::Thought,
  user::User,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Id lists ────────────────────────────────────────────────────────────────

pub fn encode_ids(ids: &[Uuid]) -> Result<String> {
  Ok(serde_json::to_string(ids)?)
}

pub fn decode_ids(s: &str) -> Result<Vec<Uuid>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Embedded reactions ──────────────────────────────────────────────────────

pub fn encode_reactions(reactions: &[Reaction]) -> Result<String> {
  Ok(serde_json::to_string(reactions)?)
}

pub fn decode_reactions(s: &str) -> Result<Vec<Reaction>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:  String,
  pub username: String,
  pub email:    String,
  /// JSON array of thought ids.
  pub thoughts: String,
  /// JSON array of friend ids.
  pub friends:  String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:  decode_uuid(&self.user_id)?,
      username: self.username,
      email:    self.email,
      thoughts: decode_ids(&self.thoughts)?,
      friends:  decode_ids(&self.friends)?,
    })
  }
}

/// Raw strings read directly from a `thoughts` row.
pub struct RawThought {
  pub thought_id:   String,
  pub thought_text: String,
  pub username:     String,
  pub created_at:   String,
  /// JSON array of reaction documents.
  pub reactions:    String,
}

impl RawThought {
  pub fn into_thought(self) -> Result<Thought> {
    Ok(Thought {
      thought_id:   decode_uuid(&self.thought_id)?,
      thought_text: self.thought_text,
      username:     self.username,
      created_at:   decode_dt(&self.created_at)?,
      reactions:    decode_reactions(&self.reactions)?,
    })
  }
}
