//! The relationship engine.
//!
//! Every rule that keeps the denormalised user/thought/reaction documents
//! consistent lives here. Operations follow a fixed shape: validate the
//! input, gate on existence probes so the caller gets a precise signal,
//! then hand the store a single atomic mutation. A rejected operation
//! never reaches the store's write path.

use std::{
  collections::HashMap,
  sync::{Arc, LazyLock},
};

use regex::Regex;
use uuid::Uuid;

use crate::{
  Error, Result,
  reaction::{MAX_REACTION_LEN, NewReaction},
  store::{RenameCascade, ThoughtProbe, ThoughtStore, UserProbe, UserStore},
  thought::{MAX_THOUGHT_LEN, NewThought, Thought},
  user::{NewUser, User, UserPatch, UserRemoval, UserView},
};

/// Accepts `local@domain.tld`: word-character atoms separated by single
/// dots or hyphens, with a 2-3 letter top-level domain.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$")
    .expect("email pattern compiles")
});

// ─── Validation helpers ──────────────────────────────────────────────────────

/// Presence gate for required free-text fields. Empty counts as missing.
fn required(value: Option<String>, field: &'static str) -> Result<String> {
  match value {
    Some(v) if !v.is_empty() => Ok(v),
    _ => Err(Error::MissingField(field)),
  }
}

/// Presence gate for identity fields, which are stored trimmed.
fn required_trimmed(value: Option<String>, field: &'static str) -> Result<String> {
  let trimmed = value.as_deref().map(str::trim).unwrap_or_default();
  if trimmed.is_empty() {
    Err(Error::MissingField(field))
  } else {
    Ok(trimmed.to_owned())
  }
}

fn validate_email(email: &str) -> Result<()> {
  if EMAIL_RE.is_match(email) {
    Ok(())
  } else {
    Err(Error::InvalidEmail(email.to_owned()))
  }
}

fn validate_thought_text(text: &str) -> Result<()> {
  let len = text.chars().count();
  if len > MAX_THOUGHT_LEN {
    Err(Error::ThoughtTooLong(len))
  } else {
    Ok(())
  }
}

fn validate_reaction_body(body: &str) -> Result<()> {
  let len = body.chars().count();
  if len > MAX_REACTION_LEN {
    Err(Error::ReactionTooLong(len))
  } else {
    Ok(())
  }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// The relationship engine, generic over the backing store.
///
/// Cheap to clone; the store is shared.
pub struct Engine<S> {
  store:          Arc<S>,
  rename_cascade: RenameCascade,
}

impl<S> Clone for Engine<S> {
  fn clone(&self) -> Self {
    Self {
      store:          Arc::clone(&self.store),
      rename_cascade: self.rename_cascade,
    }
  }
}

impl<S> Engine<S>
where
  S: UserStore + ThoughtStore,
{
  pub fn new(store: Arc<S>, rename_cascade: RenameCascade) -> Self {
    Self { store, rename_cascade }
  }

  // ── Users ─────────────────────────────────────────────────────────────

  /// All users, as flat documents (reference lists unexpanded).
  pub async fn users(&self) -> Result<Vec<User>> {
    self.store.list_users().await.map_err(Into::into)
  }

  /// A single user with thoughts and friends expanded into full
  /// documents. Thoughts come back in the user's own sequence order.
  pub async fn user(&self, id: Uuid) -> Result<UserView> {
    let user = self
      .store
      .get_user(id)
      .await
      .map_err(Into::into)?
      .ok_or(Error::UserNotFound(id))?;

    let thoughts = self
      .store
      .get_thoughts(&user.thoughts)
      .await
      .map_err(Into::into)?;
    let thoughts = sequence_thoughts(user.user_id, &user.thoughts, thoughts)?;

    let friends = self
      .store
      .get_users(&user.friends)
      .await
      .map_err(Into::into)?;

    Ok(UserView {
      user_id: user.user_id,
      username: user.username,
      email: user.email,
      thoughts,
      friends,
    })
  }

  /// Create a user. The username is trimmed, the email is trimmed and
  /// lowercased, and both must be unused before the insert is attempted.
  pub async fn create_user(
    &self,
    username: Option<String>,
    email: Option<String>,
  ) -> Result<User> {
    let username = required_trimmed(username, "username")?;
    let email = required_trimmed(email, "email")?.to_lowercase();
    validate_email(&email)?;

    if self.username_taken(&username).await? {
      return Err(Error::UsernameTaken(username));
    }
    if self.email_taken(&email).await? {
      return Err(Error::EmailTaken(email));
    }

    self
      .store
      .insert_user(NewUser { username, email })
      .await
      .map_err(Into::into)
  }

  /// Apply a partial update to a user. Patched fields are validated and
  /// uniqueness-checked against every *other* document; re-submitting a
  /// user's current username or email is not a conflict. An empty patch
  /// returns the document unchanged. A username change propagates to
  /// denormalised copies per the configured rename scope, atomically with
  /// the user row itself.
  pub async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<User> {
    if !self.user_id_exists(id).await? {
      return Err(Error::UserNotFound(id));
    }

    let mut clean = UserPatch::default();
    if !patch.is_empty() {
      let current = self
        .store
        .get_user(id)
        .await
        .map_err(Into::into)?
        .ok_or(Error::UserNotFound(id))?;

      if let Some(username) = patch.username {
        let username = required_trimmed(Some(username), "username")?;
        if username != current.username && self.username_taken(&username).await? {
          return Err(Error::UsernameTaken(username));
        }
        clean.username = Some(username);
      }

      if let Some(email) = patch.email {
        let email = required_trimmed(Some(email), "email")?.to_lowercase();
        validate_email(&email)?;
        if email != current.email && self.email_taken(&email).await? {
          return Err(Error::EmailTaken(email));
        }
        clean.email = Some(email);
      }
    }

    self
      .store
      .update_user(id, clean, self.rename_cascade)
      .await
      .map_err(Into::into)?
      .ok_or(Error::UserNotFound(id))
  }

  /// Delete a user along with every thought it owned, and scrub the id
  /// from every former friend's list. Returns a receipt summarising the
  /// cascade.
  pub async fn delete_user(&self, id: Uuid) -> Result<UserRemoval> {
    self
      .store
      .remove_user(id)
      .await
      .map_err(Into::into)?
      .ok_or(Error::UserNotFound(id))
  }

  // ── Friendships ───────────────────────────────────────────────────────

  /// Record a mutual friendship. Both sides must exist and be distinct;
  /// re-adding an existing friendship is a no-op.
  pub async fn add_friend(&self, user: Uuid, friend: Uuid) -> Result<User> {
    self.check_friend_pair(user, friend).await?;
    self
      .store
      .link_friends(user, friend)
      .await
      .map_err(Into::into)
  }

  /// Dissolve a friendship on both sides. Removing one that does not
  /// exist is a no-op.
  pub async fn remove_friend(&self, user: Uuid, friend: Uuid) -> Result<User> {
    self.check_friend_pair(user, friend).await?;
    self
      .store
      .unlink_friends(user, friend)
      .await
      .map_err(Into::into)
  }

  async fn check_friend_pair(&self, user: Uuid, friend: Uuid) -> Result<()> {
    if user == friend {
      return Err(Error::SelfFriend);
    }
    // Checked one at a time so the signal names whichever id is missing.
    for id in [user, friend] {
      if !self.user_id_exists(id).await? {
        return Err(Error::UserNotFound(id));
      }
    }
    Ok(())
  }

  // ── Thoughts ──────────────────────────────────────────────────────────

  /// All thoughts, reactions embedded.
  pub async fn thoughts(&self) -> Result<Vec<Thought>> {
    self.store.list_thoughts().await.map_err(Into::into)
  }

  /// A single thought by id.
  pub async fn thought(&self, id: Uuid) -> Result<Thought> {
    self
      .store
      .get_thought(id)
      .await
      .map_err(Into::into)?
      .ok_or(Error::ThoughtNotFound(id))
  }

  /// Create a thought. The claimed owner is cross-checked: one user must
  /// hold *both* the given id and the given username, otherwise the pair
  /// is rejected as a mismatch. On success the thought's id is appended
  /// to the owner's sequence in the same atomic step as the insert.
  pub async fn add_thought(
    &self,
    thought_text: Option<String>,
    username: Option<String>,
    user_id: Option<Uuid>,
  ) -> Result<Thought> {
    let thought_text = required(thought_text, "thoughtText")?;
    validate_thought_text(&thought_text)?;
    let username = required_trimmed(username, "username")?;
    let user_id = user_id.ok_or(Error::MissingField("userId"))?;

    let probe = UserProbe {
      user_id:  Some(user_id),
      username: Some(username.clone()),
      email:    None,
    };
    if !self.store.user_exists(&probe).await.map_err(Into::into)? {
      return Err(Error::UserMismatch { username, user_id });
    }

    self
      .store
      .insert_thought(NewThought { thought_text, username, user_id })
      .await
      .map_err(Into::into)
  }

  /// Replace a thought's text. Absent or empty text is reported as a
  /// no-op, distinct from not-found; nothing else about the thought
  /// changes.
  pub async fn update_thought(
    &self,
    id: Uuid,
    thought_text: Option<String>,
  ) -> Result<Thought> {
    let text = match thought_text {
      Some(t) if !t.is_empty() => t,
      _ => return Err(Error::NothingToUpdate),
    };
    validate_thought_text(&text)?;

    if !self.thought_id_exists(id).await? {
      return Err(Error::ThoughtNotFound(id));
    }
    self
      .store
      .update_thought_text(id, text)
      .await
      .map_err(Into::into)?
      .ok_or(Error::ThoughtNotFound(id))
  }

  /// Delete a thought and pull its id from the owner's sequence. The
  /// owner is located through the thought's denormalised username; if the
  /// owner is already gone the deletion still succeeds.
  pub async fn delete_thought(&self, id: Uuid) -> Result<Thought> {
    self
      .store
      .remove_thought(id)
      .await
      .map_err(Into::into)?
      .ok_or(Error::ThoughtNotFound(id))
  }

  // ── Reactions ─────────────────────────────────────────────────────────

  /// Embed a reaction in a thought. The author must name an existing
  /// user; the parent thought must exist. Re-submitting an identical
  /// body/author pair leaves the list unchanged.
  pub async fn add_reaction(
    &self,
    thought_id: Uuid,
    reaction_body: Option<String>,
    username: Option<String>,
  ) -> Result<Thought> {
    let reaction_body = required(reaction_body, "reactionBody")?;
    validate_reaction_body(&reaction_body)?;
    let username = required_trimmed(username, "username")?;

    if !self.thought_id_exists(thought_id).await? {
      return Err(Error::ThoughtNotFound(thought_id));
    }
    if !self.username_taken(&username).await? {
      return Err(Error::UnknownUsername(username));
    }

    self
      .store
      .push_reaction(thought_id, NewReaction { reaction_body, username })
      .await
      .map_err(Into::into)?
      .ok_or(Error::ThoughtNotFound(thought_id))
  }

  /// Remove an embedded reaction by id. An unknown reaction id is a
  /// no-op; the parent thought must still exist.
  pub async fn remove_reaction(
    &self,
    thought_id: Uuid,
    reaction_id: Option<Uuid>,
  ) -> Result<Thought> {
    let reaction_id = reaction_id.ok_or(Error::MissingField("reactionId"))?;

    if !self.thought_id_exists(thought_id).await? {
      return Err(Error::ThoughtNotFound(thought_id));
    }
    self
      .store
      .pull_reaction(thought_id, reaction_id)
      .await
      .map_err(Into::into)?
      .ok_or(Error::ThoughtNotFound(thought_id))
  }

  // ── Probe shorthands ──────────────────────────────────────────────────

  async fn user_id_exists(&self, id: Uuid) -> Result<bool> {
    self
      .store
      .user_exists(&UserProbe::by_id(id))
      .await
      .map_err(Into::into)
  }

  async fn username_taken(&self, username: &str) -> Result<bool> {
    self
      .store
      .user_exists(&UserProbe::by_username(username))
      .await
      .map_err(Into::into)
  }

  async fn email_taken(&self, email: &str) -> Result<bool> {
    self
      .store
      .user_exists(&UserProbe::by_email(email))
      .await
      .map_err(Into::into)
  }

  async fn thought_id_exists(&self, id: Uuid) -> Result<bool> {
    self
      .store
      .thought_exists(&ThoughtProbe::by_id(id))
      .await
      .map_err(Into::into)
  }
}

// ─── Read-model assembly ─────────────────────────────────────────────────────

/// Expand an owner's thought-id sequence into full documents, in sequence
/// order. Bulk lookup follows store order, so the owner's order is restored
/// here. Every id must resolve: a reference with no backing document is
/// store corruption, reported rather than filtered out.
fn sequence_thoughts(
  user_id: Uuid,
  order: &[Uuid],
  found: Vec<Thought>,
) -> Result<Vec<Thought>> {
  let mut by_id: HashMap<Uuid, Thought> =
    found.into_iter().map(|t| (t.thought_id, t)).collect();
  order
    .iter()
    .map(|tid| {
      by_id.remove(tid).ok_or_else(|| {
        Error::Store(
          format!("user {user_id} references missing thought {tid}").into(),
        )
      })
    })
    .collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
