//! User documents and their derived read model.
//!
//! A user owns a sequence of thought ids and a set of friend ids. Both
//! lists hold identifiers only; the expanded [`UserView`] is assembled at
//! query time by the engine. Counts (`friendCount`) are computed during
//! serialization and never stored.

use serde::{Deserialize, Serialize, Serializer, ser::SerializeStruct};
use uuid::Uuid;

use crate::thought::Thought;

// ─── Stored document ─────────────────────────────────────────────────────────

/// A stored user document.
///
/// `friends` has set semantics: no duplicates, never the user's own id,
/// and always symmetric with the other side. The engine maintains these
/// properties; the store persists whatever it is handed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
  pub user_id:  Uuid,
  pub username: String,
  pub email:    String,
  /// Ids of thoughts owned by this user, in creation order.
  pub thoughts: Vec<Uuid>,
  /// Ids of befriended users.
  pub friends:  Vec<Uuid>,
}

impl User {
  pub fn friend_count(&self) -> usize { self.friends.len() }
}

impl Serialize for User {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut s = serializer.serialize_struct("User", 6)?;
    s.serialize_field("userId", &self.user_id)?;
    s.serialize_field("username", &self.username)?;
    s.serialize_field("email", &self.email)?;
    s.serialize_field("thoughts", &self.thoughts)?;
    s.serialize_field("friends", &self.friends)?;
    s.serialize_field("friendCount", &self.friend_count())?;
    s.end()
  }
}

// ─── Write inputs ────────────────────────────────────────────────────────────

/// Input to [`crate::store::UserStore::insert_user`]. Both fields arrive
/// already normalised (trimmed, email lowercased) from the engine.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username: String,
  pub email:    String,
}

/// A partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
  pub username: Option<String>,
  pub email:    Option<String>,
}

impl UserPatch {
  pub fn is_empty(&self) -> bool {
    self.username.is_none() && self.email.is_none()
  }
}

// ─── Derived read model ──────────────────────────────────────────────────────

/// The expanded read model for a single user, with thought and friend ids
/// materialised into full documents. Never stored, always derived.
#[derive(Debug, Clone)]
pub struct UserView {
  pub user_id:  Uuid,
  pub username: String,
  pub email:    String,
  /// Owned thoughts, in the user's sequence order.
  pub thoughts: Vec<Thought>,
  /// Befriended users as full documents.
  pub friends:  Vec<User>,
}

impl Serialize for UserView {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut s = serializer.serialize_struct("UserView", 6)?;
    s.serialize_field("userId", &self.user_id)?;
    s.serialize_field("username", &self.username)?;
    s.serialize_field("email", &self.email)?;
    s.serialize_field("thoughts", &self.thoughts)?;
    s.serialize_field("friends", &self.friends)?;
    s.serialize_field("friendCount", &self.friends.len())?;
    s.end()
  }
}

// ─── Deletion receipt ────────────────────────────────────────────────────────

/// Summary of a completed user-deletion cascade, returned as confirmation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRemoval {
  /// The user document as it stood at deletion time.
  pub user:                User,
  /// Owned thoughts deleted alongside the user.
  pub thoughts_deleted:    usize,
  /// Friend documents that had the deleted id scrubbed from their lists.
  pub friendships_severed: usize,
}
