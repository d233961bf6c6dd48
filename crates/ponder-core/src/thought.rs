//! Thought documents.
//!
//! A thought is a short post owned by exactly one user. Reactions are
//! embedded sub-documents of the thought; they have no collection of their
//! own and are deleted with their parent. The serialized form carries a
//! derived `reactionCount` field, computed at serialization time.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer, ser::SerializeStruct};
use uuid::Uuid;

use crate::reaction::Reaction;

/// Maximum length of a thought's text, in characters.
pub const MAX_THOUGHT_LEN: usize = 280;

/// A stored thought document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thought {
  pub thought_id:   Uuid,
  pub thought_text: String,
  /// Denormalised copy of the owning user's username. Kept in sync with
  /// owner renames; see [`crate::store::RenameCascade`].
  pub username:     String,
  /// Server-assigned at creation, immutable afterwards. Serialized as
  /// RFC 3339.
  pub created_at:   DateTime<Utc>,
  /// Embedded reactions, in insertion order.
  pub reactions:    Vec<Reaction>,
}

impl Thought {
  pub fn reaction_count(&self) -> usize { self.reactions.len() }
}

impl Serialize for Thought {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut s = serializer.serialize_struct("Thought", 6)?;
    s.serialize_field("thoughtId", &self.thought_id)?;
    s.serialize_field("thoughtText", &self.thought_text)?;
    s.serialize_field("username", &self.username)?;
    s.serialize_field("createdAt", &self.created_at)?;
    s.serialize_field("reactions", &self.reactions)?;
    s.serialize_field("reactionCount", &self.reaction_count())?;
    s.end()
  }
}

/// Input to [`crate::store::ThoughtStore::insert_thought`], already
/// validated and cross-checked by the engine. The id and timestamp are
/// assigned by the store.
#[derive(Debug, Clone)]
pub struct NewThought {
  pub thought_text: String,
  pub username:     String,
  /// The owner. Must refer to the same user as `username`; the engine
  /// verifies this before constructing a `NewThought`.
  pub user_id:      Uuid,
}
