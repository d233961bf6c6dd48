//! Reaction sub-documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of a reaction's body, in characters.
pub const MAX_REACTION_LEN: usize = 280;

/// An embedded reaction. It lives and dies with its parent thought and is
/// only ever addressed through it. `username` is the author's name at
/// reaction time; under the default rename scope it is left as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
  pub reaction_id:   Uuid,
  pub reaction_body: String,
  pub username:      String,
  pub created_at:    DateTime<Utc>,
}

impl Reaction {
  /// Set-likeness key: two reactions are the same when body and author
  /// both match.
  pub fn same_as(&self, body: &str, username: &str) -> bool {
    self.reaction_body == body && self.username == username
  }
}

/// Input to [`crate::store::ThoughtStore::push_reaction`]. The id and
/// timestamp are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewReaction {
  pub reaction_body: String,
  pub username:      String,
}
