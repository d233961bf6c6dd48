//! [`SqliteStore`], the SQLite implementation of [`UserStore`] and
//! [`ThoughtStore`].
//!
//! Compound mutations (deletion cascades, friendship linking, rename
//! propagation, thought creation) run inside a single transaction on the
//! connection thread, so partial cascades cannot be observed even if the
//! process dies mid-write. Domain signals raised inside a transaction
//! travel out as plain values, not through the error channel.

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use ponder_core::{
  reaction::{NewReaction, Reaction},
  store::{RenameCascade, ThoughtProbe, ThoughtStore, UserProbe, UserStore},
  thought::{NewThought, Thought},
  user::{NewUser, User, UserPatch, UserRemoval},
};

use crate::{
  Error, Result,
  encode::{
    RawThought, RawUser, decode_ids, decode_reactions, encode_dt, encode_ids,
    encode_reactions, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A ponder store backed by a single SQLite file.
///
/// Clones share the underlying connection handle.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open the database at `path`, creating it if needed, and install the
  /// schema.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a fresh in-memory store, as used by the test suites.
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
    Ok(())
  }
}

// ─── UserStore impl ──────────────────────────────────────────────────────────

impl UserStore for SqliteStore {
  type Error = Error;

  // ── Probes and reads ──────────────────────────────────────────────────

  async fn user_exists(&self, probe: &UserProbe) -> Result<bool> {
    let id_str   = probe.user_id.map(encode_uuid);
    let username = probe.username.clone();
    let email    = probe.email.clone();

    let found = self
      .conn
      .call(move |conn| {
        let mut conds: Vec<&'static str> = vec![];
        let mut binds: Vec<String> = vec![];
        if let Some(id) = id_str {
          conds.push("user_id = ?");
          binds.push(id);
        }
        if let Some(u) = username {
          conds.push("username = ?");
          binds.push(u);
        }
        if let Some(m) = email {
          conds.push("email = ?");
          binds.push(m);
        }

        let sql = if conds.is_empty() {
          "SELECT 1 FROM users LIMIT 1".to_owned()
        } else {
          format!("SELECT 1 FROM users WHERE {} LIMIT 1", conds.join(" AND "))
        };

        let mut stmt = conn.prepare(&sql)?;
        let found = stmt
          .query_row(rusqlite::params_from_iter(binds), |_| Ok(true))
          .optional()?
          .unwrap_or(false);
        Ok(found)
      })
      .await?;

    Ok(found)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| Ok(select_user(conn, &id_str)?))
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn get_users(&self, ids: &[Uuid]) -> Result<Vec<User>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }
    let id_strs: Vec<String> = ids.iter().copied().map(encode_uuid).collect();

    let raws: Vec<RawUser> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT user_id, username, email, thoughts, friends
           FROM users WHERE user_id IN ({})",
          placeholders(id_strs.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(id_strs), user_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    let raws: Vec<RawUser> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare("SELECT user_id, username, email, thoughts, friends FROM users")?;
        let rows = stmt
          .query_map([], user_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  // ── Writes ────────────────────────────────────────────────────────────

  async fn insert_user(&self, new: NewUser) -> Result<User> {
    let user = User {
      user_id:  Uuid::new_v4(),
      username: new.username,
      email:    new.email,
      thoughts: Vec::new(),
      friends:  Vec::new(),
    };

    let id_str   = encode_uuid(user.user_id);
    let username = user.username.clone();
    let email    = user.email.clone();

    let collision: Option<Collision> = self
      .conn
      .call(move |conn| {
        let result = conn.execute(
          "INSERT INTO users (user_id, username, email, thoughts, friends)
           VALUES (?1, ?2, ?3, '[]', '[]')",
          rusqlite::params![id_str, username, email],
        );
        match result {
          Ok(_) => Ok(None),
          Err(e) => match collision_of(&e) {
            Some(collision) => Ok(Some(collision)),
            None => Err(e.into()),
          },
        }
      })
      .await?;

    match collision {
      None => Ok(user),
      Some(Collision::Username) => Err(Error::UsernameTaken(user.username)),
      Some(Collision::Email) => Err(Error::EmailTaken(user.email)),
    }
  }

  async fn update_user(
    &self,
    id: Uuid,
    patch: UserPatch,
    cascade: RenameCascade,
  ) -> Result<Option<User>> {
    let id_str = encode_uuid(id);
    let patched_username = patch.username.clone();
    let patched_email    = patch.email.clone();

    let outcome: UserWrite = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let Some(raw) = select_user(&tx, &id_str)? else {
          return Ok(UserWrite::Missing);
        };

        let old_username = raw.username.clone();
        let username = patch.username.unwrap_or_else(|| raw.username.clone());
        let email    = patch.email.unwrap_or_else(|| raw.email.clone());

        if let Err(e) = tx.execute(
          "UPDATE users SET username = ?2, email = ?3 WHERE user_id = ?1",
          rusqlite::params![id_str, username, email],
        ) {
          return match collision_of(&e) {
            Some(collision) => Ok(UserWrite::Collide(collision)),
            None => Err(e.into()),
          };
        }

        if username != old_username {
          rename_owned_thoughts(&tx, &raw.thoughts, &username)?;
          if cascade == RenameCascade::ThoughtsAndReactions {
            rename_reaction_authors(&tx, &old_username, &username)?;
          }
        }

        tx.commit()?;
        Ok(UserWrite::Done(RawUser {
          user_id: raw.user_id,
          username,
          email,
          thoughts: raw.thoughts,
          friends: raw.friends,
        }))
      })
      .await?;

    match outcome {
      UserWrite::Done(raw) => Ok(Some(raw.into_user()?)),
      UserWrite::Missing => Ok(None),
      UserWrite::Collide(Collision::Username) => {
        Err(Error::UsernameTaken(patched_username.unwrap_or_default()))
      }
      UserWrite::Collide(Collision::Email) => {
        Err(Error::EmailTaken(patched_email.unwrap_or_default()))
      }
    }
  }

  async fn remove_user(&self, id: Uuid) -> Result<Option<UserRemoval>> {
    let id_str = encode_uuid(id);

    let outcome: RemovedUser = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let Some(raw) = select_user(&tx, &id_str)? else {
          return Ok(RemovedUser::Missing);
        };

        tx.execute(
          "DELETE FROM users WHERE user_id = ?1",
          rusqlite::params![id_str],
        )?;

        // Scrub the deleted id from every former friend's list.
        let friends = decode_ids(&raw.friends).map_err(other)?;
        let mut severed = 0usize;
        for friend in friends {
          let friend_str = encode_uuid(friend);
          let row: Option<String> = tx
            .query_row(
              "SELECT friends FROM users WHERE user_id = ?1",
              rusqlite::params![friend_str],
              |r| r.get(0),
            )
            .optional()?;
          let Some(friends_json) = row else { continue };
          let mut list = decode_ids(&friends_json).map_err(other)?;
          let before = list.len();
          list.retain(|f| *f != id);
          if list.len() != before {
            tx.execute(
              "UPDATE users SET friends = ?2 WHERE user_id = ?1",
              rusqlite::params![friend_str, encode_ids(&list).map_err(other)?],
            )?;
            severed += 1;
          }
        }

        // Drop every owned thought outright; reactions go with them.
        let owned = decode_ids(&raw.thoughts).map_err(other)?;
        let mut deleted = 0usize;
        if !owned.is_empty() {
          let sql = format!(
            "DELETE FROM thoughts WHERE thought_id IN ({})",
            placeholders(owned.len())
          );
          deleted = tx.execute(
            &sql,
            rusqlite::params_from_iter(owned.iter().copied().map(encode_uuid)),
          )?;
        }

        tx.commit()?;
        Ok(RemovedUser::Done {
          raw,
          thoughts_deleted: deleted,
          friendships_severed: severed,
        })
      })
      .await?;

    match outcome {
      RemovedUser::Missing => Ok(None),
      RemovedUser::Done { raw, thoughts_deleted, friendships_severed } => {
        Ok(Some(UserRemoval {
          user: raw.into_user()?,
          thoughts_deleted,
          friendships_severed,
        }))
      }
    }
  }

  async fn link_friends(&self, user: Uuid, friend: Uuid) -> Result<User> {
    let outcome: FriendWrite = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let user_str   = encode_uuid(user);
        let friend_str = encode_uuid(friend);

        let Some(mut user_raw) = select_user(&tx, &user_str)? else {
          return Ok(FriendWrite::Missing(user));
        };
        let Some(friend_raw) = select_user(&tx, &friend_str)? else {
          return Ok(FriendWrite::Missing(friend));
        };

        let mut user_friends = decode_ids(&user_raw.friends).map_err(other)?;
        if !user_friends.contains(&friend) {
          user_friends.push(friend);
          user_raw.friends = encode_ids(&user_friends).map_err(other)?;
          tx.execute(
            "UPDATE users SET friends = ?2 WHERE user_id = ?1",
            rusqlite::params![user_str, user_raw.friends],
          )?;
        }

        let mut friend_friends = decode_ids(&friend_raw.friends).map_err(other)?;
        if !friend_friends.contains(&user) {
          friend_friends.push(user);
          tx.execute(
            "UPDATE users SET friends = ?2 WHERE user_id = ?1",
            rusqlite::params![friend_str, encode_ids(&friend_friends).map_err(other)?],
          )?;
        }

        tx.commit()?;
        Ok(FriendWrite::Done(user_raw))
      })
      .await?;

    match outcome {
      FriendWrite::Done(raw) => Ok(raw.into_user()?),
      FriendWrite::Missing(missing) => Err(Error::UserNotFound(missing)),
    }
  }

  async fn unlink_friends(&self, user: Uuid, friend: Uuid) -> Result<User> {
    let outcome: FriendWrite = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let user_str   = encode_uuid(user);
        let friend_str = encode_uuid(friend);

        let Some(mut user_raw) = select_user(&tx, &user_str)? else {
          return Ok(FriendWrite::Missing(user));
        };
        let Some(friend_raw) = select_user(&tx, &friend_str)? else {
          return Ok(FriendWrite::Missing(friend));
        };

        let mut user_friends = decode_ids(&user_raw.friends).map_err(other)?;
        let before = user_friends.len();
        user_friends.retain(|f| *f != friend);
        if user_friends.len() != before {
          user_raw.friends = encode_ids(&user_friends).map_err(other)?;
          tx.execute(
            "UPDATE users SET friends = ?2 WHERE user_id = ?1",
            rusqlite::params![user_str, user_raw.friends],
          )?;
        }

        let mut friend_friends = decode_ids(&friend_raw.friends).map_err(other)?;
        let before = friend_friends.len();
        friend_friends.retain(|f| *f != user);
        if friend_friends.len() != before {
          tx.execute(
            "UPDATE users SET friends = ?2 WHERE user_id = ?1",
            rusqlite::params![friend_str, encode_ids(&friend_friends).map_err(other)?],
          )?;
        }

        tx.commit()?;
        Ok(FriendWrite::Done(user_raw))
      })
      .await?;

    match outcome {
      FriendWrite::Done(raw) => Ok(raw.into_user()?),
      FriendWrite::Missing(missing) => Err(Error::UserNotFound(missing)),
    }
  }
}

// ─── ThoughtStore impl ───────────────────────────────────────────────────────

impl ThoughtStore for SqliteStore {
  type Error = Error;

  // ── Probes and reads ──────────────────────────────────────────────────

  async fn thought_exists(&self, probe: &ThoughtProbe) -> Result<bool> {
    let id_str   = probe.thought_id.map(encode_uuid);
    let username = probe.username.clone();

    let found = self
      .conn
      .call(move |conn| {
        let mut conds: Vec<&'static str> = vec![];
        let mut binds: Vec<String> = vec![];
        if let Some(id) = id_str {
          conds.push("thought_id = ?");
          binds.push(id);
        }
        if let Some(u) = username {
          conds.push("username = ?");
          binds.push(u);
        }

        let sql = if conds.is_empty() {
          "SELECT 1 FROM thoughts LIMIT 1".to_owned()
        } else {
          format!("SELECT 1 FROM thoughts WHERE {} LIMIT 1", conds.join(" AND "))
        };

        let mut stmt = conn.prepare(&sql)?;
        let found = stmt
          .query_row(rusqlite::params_from_iter(binds), |_| Ok(true))
          .optional()?
          .unwrap_or(false);
        Ok(found)
      })
      .await?;

    Ok(found)
  }

  async fn get_thought(&self, id: Uuid) -> Result<Option<Thought>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawThought> = self
      .conn
      .call(move |conn| Ok(select_thought(conn, &id_str)?))
      .await?;

    raw.map(RawThought::into_thought).transpose()
  }

  async fn get_thoughts(&self, ids: &[Uuid]) -> Result<Vec<Thought>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }
    let id_strs: Vec<String> = ids.iter().copied().map(encode_uuid).collect();

    let raws: Vec<RawThought> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT thought_id, thought_text, username, created_at, reactions
           FROM thoughts WHERE thought_id IN ({})",
          placeholders(id_strs.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(id_strs), thought_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawThought::into_thought).collect()
  }

  async fn list_thoughts(&self) -> Result<Vec<Thought>> {
    let raws: Vec<RawThought> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT thought_id, thought_text, username, created_at, reactions
           FROM thoughts",
        )?;
        let rows = stmt
          .query_map([], thought_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawThought::into_thought).collect()
  }

  // ── Writes ────────────────────────────────────────────────────────────

  async fn insert_thought(&self, new: NewThought) -> Result<Thought> {
    let thought = Thought {
      thought_id:   Uuid::new_v4(),
      thought_text: new.thought_text,
      username:     new.username,
      created_at:   Utc::now(),
      reactions:    Vec::new(),
    };

    let owner       = new.user_id;
    let thought_id  = thought.thought_id;
    let id_str      = encode_uuid(thought.thought_id);
    let text        = thought.thought_text.clone();
    let username    = thought.username.clone();
    let created_str = encode_dt(thought.created_at);

    let outcome: ThoughtWrite = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let owner_str = encode_uuid(owner);

        let Some(owner_raw) = select_user(&tx, &owner_str)? else {
          return Ok(ThoughtWrite::MissingOwner);
        };

        tx.execute(
          "INSERT INTO thoughts (thought_id, thought_text, username, created_at, reactions)
           VALUES (?1, ?2, ?3, ?4, '[]')",
          rusqlite::params![id_str, text, username, created_str],
        )?;

        // Append to the owner's sequence in the same transaction, so a
        // thought row and its owning reference appear together.
        let mut owned = decode_ids(&owner_raw.thoughts).map_err(other)?;
        owned.push(thought_id);
        tx.execute(
          "UPDATE users SET thoughts = ?2 WHERE user_id = ?1",
          rusqlite::params![owner_str, encode_ids(&owned).map_err(other)?],
        )?;

        tx.commit()?;
        Ok(ThoughtWrite::Done)
      })
      .await?;

    match outcome {
      ThoughtWrite::Done => Ok(thought),
      ThoughtWrite::MissingOwner => Err(Error::UserNotFound(owner)),
    }
  }

  async fn update_thought_text(
    &self,
    id: Uuid,
    text: String,
  ) -> Result<Option<Thought>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawThought> = self
      .conn
      .call(move |conn| {
        let Some(mut raw) = select_thought(conn, &id_str)? else {
          return Ok(None);
        };
        conn.execute(
          "UPDATE thoughts SET thought_text = ?2 WHERE thought_id = ?1",
          rusqlite::params![id_str, text],
        )?;
        raw.thought_text = text;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawThought::into_thought).transpose()
  }

  async fn remove_thought(&self, id: Uuid) -> Result<Option<Thought>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawThought> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let Some(raw) = select_thought(&tx, &id_str)? else {
          return Ok(None);
        };

        tx.execute(
          "DELETE FROM thoughts WHERE thought_id = ?1",
          rusqlite::params![id_str],
        )?;

        // Pull the reference from the owner, located through the
        // denormalised username. A missing owner is fine; the reference
        // died with them.
        if let Some(owner) = select_user_by_username(&tx, &raw.username)? {
          let mut owned = decode_ids(&owner.thoughts).map_err(other)?;
          let before = owned.len();
          owned.retain(|t| *t != id);
          if owned.len() != before {
            tx.execute(
              "UPDATE users SET thoughts = ?2 WHERE user_id = ?1",
              rusqlite::params![owner.user_id, encode_ids(&owned).map_err(other)?],
            )?;
          }
        }

        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawThought::into_thought).transpose()
  }

  async fn push_reaction(
    &self,
    thought_id: Uuid,
    new: NewReaction,
  ) -> Result<Option<Thought>> {
    let reaction = Reaction {
      reaction_id:   Uuid::new_v4(),
      reaction_body: new.reaction_body,
      username:      new.username,
      created_at:    Utc::now(),
    };
    let id_str = encode_uuid(thought_id);

    let raw: Option<RawThought> = self
      .conn
      .call(move |conn| {
        let Some(mut raw) = select_thought(conn, &id_str)? else {
          return Ok(None);
        };

        let mut reactions = decode_reactions(&raw.reactions).map_err(other)?;
        // Set semantics: an identical body/author pair stays as it is.
        let duplicate = reactions
          .iter()
          .any(|r| r.same_as(&reaction.reaction_body, &reaction.username));
        if !duplicate {
          reactions.push(reaction);
          raw.reactions = encode_reactions(&reactions).map_err(other)?;
          conn.execute(
            "UPDATE thoughts SET reactions = ?2 WHERE thought_id = ?1",
            rusqlite::params![id_str, raw.reactions],
          )?;
        }
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawThought::into_thought).transpose()
  }

  async fn pull_reaction(
    &self,
    thought_id: Uuid,
    reaction_id: Uuid,
  ) -> Result<Option<Thought>> {
    let id_str = encode_uuid(thought_id);

    let raw: Option<RawThought> = self
      .conn
      .call(move |conn| {
        let Some(mut raw) = select_thought(conn, &id_str)? else {
          return Ok(None);
        };

        let mut reactions = decode_reactions(&raw.reactions).map_err(other)?;
        let before = reactions.len();
        reactions.retain(|r| r.reaction_id != reaction_id);
        if reactions.len() != before {
          raw.reactions = encode_reactions(&reactions).map_err(other)?;
          conn.execute(
            "UPDATE thoughts SET reactions = ?2 WHERE thought_id = ?1",
            rusqlite::params![id_str, raw.reactions],
          )?;
        }
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawThought::into_thought).transpose()
  }
}

// ─── Write outcomes ──────────────────────────────────────────────────────────
//
// Values carried out of connection closures instead of errors, so domain
// signals do not have to squeeze through `tokio_rusqlite::Error`.

enum Collision {
  Username,
  Email,
}

enum UserWrite {
  Done(RawUser),
  Missing,
  Collide(Collision),
}

enum RemovedUser {
  Done {
    raw:                 RawUser,
    thoughts_deleted:    usize,
    friendships_severed: usize,
  },
  Missing,
}

enum FriendWrite {
  Done(RawUser),
  Missing(Uuid),
}

enum ThoughtWrite {
  Done,
  MissingOwner,
}

// ─── Row helpers ─────────────────────────────────────────────────────────────

fn user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawUser> {
  Ok(RawUser {
    user_id:  row.get(0)?,
    username: row.get(1)?,
    email:    row.get(2)?,
    thoughts: row.get(3)?,
    friends:  row.get(4)?,
  })
}

fn thought_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawThought> {
  Ok(RawThought {
    thought_id:   row.get(0)?,
    thought_text: row.get(1)?,
    username:     row.get(2)?,
    created_at:   row.get(3)?,
    reactions:    row.get(4)?,
  })
}

fn select_user(
  conn: &rusqlite::Connection,
  id_str: &str,
) -> rusqlite::Result<Option<RawUser>> {
  conn
    .query_row(
      "SELECT user_id, username, email, thoughts, friends
       FROM users WHERE user_id = ?1",
      rusqlite::params![id_str],
      user_row,
    )
    .optional()
}

fn select_user_by_username(
  conn: &rusqlite::Connection,
  username: &str,
) -> rusqlite::Result<Option<RawUser>> {
  conn
    .query_row(
      "SELECT user_id, username, email, thoughts, friends
       FROM users WHERE username = ?1",
      rusqlite::params![username],
      user_row,
    )
    .optional()
}

fn select_thought(
  conn: &rusqlite::Connection,
  id_str: &str,
) -> rusqlite::Result<Option<RawThought>> {
  conn
    .query_row(
      "SELECT thought_id, thought_text, username, created_at, reactions
       FROM thoughts WHERE thought_id = ?1",
      rusqlite::params![id_str],
      thought_row,
    )
    .optional()
}

// ─── Rename propagation ──────────────────────────────────────────────────────

/// Rewrite the denormalised username on every thought whose id appears in
/// `thoughts_json` (the owner's sequence column).
fn rename_owned_thoughts(
  conn: &rusqlite::Connection,
  thoughts_json: &str,
  new_username: &str,
) -> std::result::Result<(), tokio_rusqlite::Error> {
  let ids = decode_ids(thoughts_json).map_err(other)?;
  if ids.is_empty() {
    return Ok(());
  }

  let sql = format!(
    "UPDATE thoughts SET username = ? WHERE thought_id IN ({})",
    placeholders(ids.len())
  );
  let mut binds: Vec<String> = Vec::with_capacity(ids.len() + 1);
  binds.push(new_username.to_owned());
  binds.extend(ids.into_iter().map(encode_uuid));
  conn.execute(&sql, rusqlite::params_from_iter(binds))?;
  Ok(())
}

/// Rewrite reaction authorship from `old_username` to `new_username`
/// across the whole thoughts collection.
fn rename_reaction_authors(
  conn: &rusqlite::Connection,
  old_username: &str,
  new_username: &str,
) -> std::result::Result<(), tokio_rusqlite::Error> {
  let mut stmt = conn.prepare("SELECT thought_id, reactions FROM thoughts")?;
  let rows = stmt
    .query_map([], |row| {
      Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  for (thought_id, reactions_json) in rows {
    let mut reactions = decode_reactions(&reactions_json).map_err(other)?;
    let mut changed = false;
    for reaction in &mut reactions {
      if reaction.username == old_username {
        reaction.username = new_username.to_owned();
        changed = true;
      }
    }
    if changed {
      conn.execute(
        "UPDATE thoughts SET reactions = ?2 WHERE thought_id = ?1",
        rusqlite::params![
          thought_id,
          encode_reactions(&reactions).map_err(other)?
        ],
      )?;
    }
  }
  Ok(())
}

// ─── Closure plumbing ────────────────────────────────────────────────────────

/// `?, ?, …` list for a dynamic `IN` clause.
fn placeholders(n: usize) -> String {
  vec!["?"; n].join(", ")
}

/// Classify a UNIQUE-constraint failure on the users table.
fn collision_of(err: &rusqlite::Error) -> Option<Collision> {
  if let rusqlite::Error::SqliteFailure(failure, Some(message)) = err
    && failure.code == rusqlite::ErrorCode::ConstraintViolation
  {
    if message.contains("users.username") {
      return Some(Collision::Username);
    }
    if message.contains("users.email") {
      return Some(Collision::Email);
    }
  }
  None
}

/// Lift a non-SQL error into the connection-closure error channel.
fn other<E>(err: E) -> tokio_rusqlite::Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  tokio_rusqlite::Error::Other(Box::new(err))
}
