//! The entity-store traits and supporting probe types.
//!
//! The traits are implemented by storage backends (e.g.
//! `ponder-store-sqlite`). Higher layers (the engine, `ponder-api`) depend
//! on these abstractions, not on any concrete backend.

use std::future::Future;

use serde::Deserialize;
use uuid::Uuid;

use crate::{
  reaction::NewReaction,
  thought::{NewThought, Thought},
  user::{NewUser, User, UserPatch, UserRemoval},
};

// ─── Existence probes ────────────────────────────────────────────────────────

/// A conjunction of field-equality constraints over the users collection.
/// `None` fields are unconstrained; an empty probe matches any document.
#[derive(Debug, Clone, Default)]
pub struct UserProbe {
  pub user_id:  Option<Uuid>,
  pub username: Option<String>,
  pub email:    Option<String>,
}

impl UserProbe {
  pub fn by_id(user_id: Uuid) -> Self {
    Self { user_id: Some(user_id), ..Self::default() }
  }

  pub fn by_username(username: impl Into<String>) -> Self {
    Self { username: Some(username.into()), ..Self::default() }
  }

  pub fn by_email(email: impl Into<String>) -> Self {
    Self { email: Some(email.into()), ..Self::default() }
  }
}

/// Field-equality constraints over the thoughts collection.
#[derive(Debug, Clone, Default)]
pub struct ThoughtProbe {
  pub thought_id: Option<Uuid>,
  pub username:   Option<String>,
}

impl ThoughtProbe {
  pub fn by_id(thought_id: Uuid) -> Self {
    Self { thought_id: Some(thought_id), ..Self::default() }
  }
}

// ─── Rename cascade scope ────────────────────────────────────────────────────

/// How far a username change propagates through denormalised copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenameCascade {
  /// Rewrite the `username` on every thought the user owns. Embedded
  /// reactions keep the name their author wrote under.
  #[default]
  Thoughts,
  /// Additionally rewrite the author on every embedded reaction written
  /// under the old name, across the whole thoughts collection.
  ThoughtsAndReactions,
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// The users collection.
///
/// Mutating methods that touch more than one document (deletion cascade,
/// friendship linking, rename propagation) must be atomic: either every
/// named document is updated or none is.
///
/// All methods return `Send` futures so the traits can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait UserStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  // ── Probes and reads ──────────────────────────────────────────────────

  /// The existence oracle over users: `true` iff at least one document
  /// satisfies every constraint in `probe`. Never has side effects.
  fn user_exists<'a>(
    &'a self,
    probe: &'a UserProbe,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Bulk lookup. Unknown ids are skipped; the result follows store
  /// order, not the order of `ids`.
  fn get_users<'a>(
    &'a self,
    ids: &'a [Uuid],
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + 'a;

  /// List every user document.
  fn list_users(
    &self,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Persist a new user with empty `thoughts` and `friends` lists and a
  /// store-assigned id. Username and email uniqueness is enforced here as
  /// the backstop to the engine's probe checks.
  fn insert_user(
    &self,
    new: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Apply a partial update. When the patch renames the user, the new
  /// username is propagated to denormalised copies per `cascade`, in the
  /// same atomic step. Returns `None` if the user does not exist.
  fn update_user(
    &self,
    id: Uuid,
    patch: UserPatch,
    cascade: RenameCascade,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Delete the user, scrub its id from every former friend's list, and
  /// delete every thought it owned, as one atomic cascade. Returns `None`
  /// if the user does not exist.
  fn remove_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<UserRemoval>, Self::Error>> + Send + '_;

  /// Symmetric set-insertion: `friend` into `user`'s list and `user` into
  /// `friend`'s, atomically. Re-linking an existing friendship is a
  /// no-op. Returns the updated `user` document.
  fn link_friends(
    &self,
    user: Uuid,
    friend: Uuid,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Symmetric set-removal; removing an absent friendship is a no-op.
  /// Returns the updated `user` document.
  fn unlink_friends(
    &self,
    user: Uuid,
    friend: Uuid,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;
}

/// The thoughts collection, including the embedded reaction sub-documents.
///
/// The same atomicity rule applies: compound writes (thought creation with
/// owner-reference append, deletion with owner-reference pull) happen in
/// one atomic step.
pub trait ThoughtStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  // ── Probes and reads ──────────────────────────────────────────────────

  /// The existence oracle over thoughts.
  fn thought_exists<'a>(
    &'a self,
    probe: &'a ThoughtProbe,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Retrieve a thought by id. Returns `None` if not found.
  fn get_thought(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Thought>, Self::Error>> + Send + '_;

  /// Bulk lookup. Unknown ids are skipped; the result follows store
  /// order, not the order of `ids`.
  fn get_thoughts<'a>(
    &'a self,
    ids: &'a [Uuid],
  ) -> impl Future<Output = Result<Vec<Thought>, Self::Error>> + Send + 'a;

  /// List every thought document.
  fn list_thoughts(
    &self,
  ) -> impl Future<Output = Result<Vec<Thought>, Self::Error>> + Send + '_;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Create the thought and append its id to the owner's `thoughts`
  /// sequence, atomically. The id and `created_at` are store-assigned.
  fn insert_thought(
    &self,
    new: NewThought,
  ) -> impl Future<Output = Result<Thought, Self::Error>> + Send + '_;

  /// Replace `thought_text`, leaving every other field untouched.
  /// Returns `None` if the thought does not exist.
  fn update_thought_text(
    &self,
    id: Uuid,
    text: String,
  ) -> impl Future<Output = Result<Option<Thought>, Self::Error>> + Send + '_;

  /// Delete the thought and pull its id from the owning user's `thoughts`
  /// sequence, atomically. Returns the document as it stood at deletion,
  /// or `None` if it did not exist.
  fn remove_thought(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Thought>, Self::Error>> + Send + '_;

  /// Set-like insertion into the embedded `reactions` list: a reaction
  /// with an identical body and author is not added twice. The id and
  /// timestamp are store-assigned. Returns the updated thought, or `None`
  /// if it does not exist.
  fn push_reaction(
    &self,
    thought_id: Uuid,
    new: NewReaction,
  ) -> impl Future<Output = Result<Option<Thought>, Self::Error>> + Send + '_;

  /// Remove the embedded reaction with the given id; an unknown reaction
  /// id is a no-op. Returns the updated thought, or `None` if it does not
  /// exist.
  fn pull_reaction(
    &self,
    thought_id: Uuid,
    reaction_id: Uuid,
  ) -> impl Future<Output = Result<Option<Thought>, Self::Error>> + Send + '_;
}
