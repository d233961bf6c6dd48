//! Handlers for the `/api/users` routes.
//!
//! | Method   | Path                                 | Meaning                                  |
//! |----------|--------------------------------------|------------------------------------------|
//! | `GET`    | `/users`                             | All users, reference lists unexpanded    |
//! | `POST`   | `/users`                             | Create; body `{"username", "email"}`     |
//! | `GET`    | `/users/{userId}`                    | One user, thoughts and friends expanded  |
//! | `PUT`    | `/users/{userId}`                    | Patch username and/or email              |
//! | `DELETE` | `/users/{userId}`                    | Remove user plus all dependent state     |
//! | `POST`   | `/users/{userId}/friends/{friendId}` | Befriend, mutual, no body                |
//! | `DELETE` | `/users/{userId}/friends/{friendId}` | Unfriend, mutual, no body                |
//!
//! Success is always `200` with a JSON document; domain rejections are `400`
//! with `{"error": "..."}`.

use axum::{
  Json,
  extract::{Path, State},
};
use ponder_core::{
  engine::Engine,
  store::{ThoughtStore, UserStore},
  user::{User, UserPatch, UserRemoval, UserView},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /users`
pub async fn list<S>(
  State(engine): State<Engine<S>>,
) -> Result<Json<Vec<User>>, ApiError>
where
  S: UserStore + ThoughtStore + 'static,
{
  Ok(Json(engine.users().await?))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub username: Option<String>,
  pub email:    Option<String>,
}

/// `POST /users` with body `{"username": "...", "email": "..."}`
pub async fn create<S>(
  State(engine): State<Engine<S>>,
  Json(body): Json<CreateBody>,
) -> Result<Json<User>, ApiError>
where
  S: UserStore + ThoughtStore + 'static,
{
  Ok(Json(engine.create_user(body.username, body.email).await?))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /users/{userId}`
pub async fn get_one<S>(
  State(engine): State<Engine<S>>,
  Path(user_id): Path<Uuid>,
) -> Result<Json<UserView>, ApiError>
where
  S: UserStore + ThoughtStore + 'static,
{
  Ok(Json(engine.user(user_id).await?))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PUT /users/{userId}` with any subset of `{"username", "email"}`
pub async fn update<S>(
  State(engine): State<Engine<S>>,
  Path(user_id): Path<Uuid>,
  Json(patch): Json<UserPatch>,
) -> Result<Json<User>, ApiError>
where
  S: UserStore + ThoughtStore + 'static,
{
  Ok(Json(engine.update_user(user_id, patch).await?))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /users/{userId}`
pub async fn delete<S>(
  State(engine): State<Engine<S>>,
  Path(user_id): Path<Uuid>,
) -> Result<Json<UserRemoval>, ApiError>
where
  S: UserStore + ThoughtStore + 'static,
{
  Ok(Json(engine.delete_user(user_id).await?))
}

// ─── Friendships ─────────────────────────────────────────────────────────────

/// `POST /users/{userId}/friends/{friendId}`
pub async fn add_friend<S>(
  State(engine): State<Engine<S>>,
  Path((user_id, friend_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<User>, ApiError>
where
  S: UserStore + ThoughtStore + 'static,
{
  Ok(Json(engine.add_friend(user_id, friend_id).await?))
}

/// `DELETE /users/{userId}/friends/{friendId}`
pub async fn remove_friend<S>(
  State(engine): State<Engine<S>>,
  Path((user_id, friend_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<User>, ApiError>
where
  S: UserStore + ThoughtStore + 'static,
{
  Ok(Json(engine.remove_friend(user_id, friend_id).await?))
}
