//! Handlers for the `/api/thoughts` routes.
//!
//! | Method   | Path                             | Meaning                                     |
//! |----------|----------------------------------|---------------------------------------------|
//! | `GET`    | `/thoughts`                      | All thoughts, reactions embedded            |
//! | `POST`   | `/thoughts`                      | Post; body `{"thoughtText", "username", "userId"}` |
//! | `GET`    | `/thoughts/{thoughtId}`          | One thought                                 |
//! | `PUT`    | `/thoughts/{thoughtId}`          | Replace the text                            |
//! | `DELETE` | `/thoughts/{thoughtId}`          | Remove thought and the owner's reference    |
//! | `POST`   | `/thoughts/{thoughtId}/reactions`| React; body `{"reactionBody", "username"}`  |
//! | `DELETE` | `/thoughts/{thoughtId}/reactions`| Retract; body `{"reactionId"}`              |
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
  thought::Thought,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /thoughts`
pub async fn list<S>(
  State(engine): State<Engine<S>>,
) -> Result<Json<Vec<Thought>>, ApiError>
where
  S: UserStore + ThoughtStore + 'static,
{
  Ok(Json(engine.thoughts().await?))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  pub thought_text: Option<String>,
  pub username:     Option<String>,
  pub user_id:      Option<Uuid>,
}

/// `POST /thoughts` with body `{"thoughtText": "...", "username": "...",
/// "userId": "..."}`
pub async fn create<S>(
  State(engine): State<Engine<S>>,
  Json(body): Json<CreateBody>,
) -> Result<Json<Thought>, ApiError>
where
  S: UserStore + ThoughtStore + 'static,
{
  Ok(Json(
    engine
      .add_thought(body.thought_text, body.username, body.user_id)
      .await?,
  ))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /thoughts/{thoughtId}`
pub async fn get_one<S>(
  State(engine): State<Engine<S>>,
  Path(thought_id): Path<Uuid>,
) -> Result<Json<Thought>, ApiError>
where
  S: UserStore + ThoughtStore + 'static,
{
  Ok(Json(engine.thought(thought_id).await?))
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
  pub thought_text: Option<String>,
}

/// `PUT /thoughts/{thoughtId}` with body `{"thoughtText": "..."}`
pub async fn update<S>(
  State(engine): State<Engine<S>>,
  Path(thought_id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Thought>, ApiError>
where
  S: UserStore + ThoughtStore + 'static,
{
  Ok(Json(engine.update_thought(thought_id, body.thought_text).await?))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /thoughts/{thoughtId}`
pub async fn delete<S>(
  State(engine): State<Engine<S>>,
  Path(thought_id): Path<Uuid>,
) -> Result<Json<Thought>, ApiError>
where
  S: UserStore + ThoughtStore + 'static,
{
  Ok(Json(engine.delete_thought(thought_id).await?))
}

// ─── Reactions ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionBody {
  pub reaction_body: Option<String>,
  pub username:      Option<String>,
}

/// `POST /thoughts/{thoughtId}/reactions` with body
/// `{"reactionBody": "...", "username": "..."}`
pub async fn add_reaction<S>(
  State(engine): State<Engine<S>>,
  Path(thought_id): Path<Uuid>,
  Json(body): Json<ReactionBody>,
) -> Result<Json<Thought>, ApiError>
where
  S: UserStore + ThoughtStore + 'static,
{
  Ok(Json(
    engine
      .add_reaction(thought_id, body.reaction_body, body.username)
      .await?,
  ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetractBody {
  pub reaction_id: Option<Uuid>,
}

/// `DELETE /thoughts/{thoughtId}/reactions` with body `{"reactionId": "..."}`
pub async fn remove_reaction<S>(
  State(engine): State<Engine<S>>,
  Path(thought_id): Path<Uuid>,
  Json(body): Json<RetractBody>,
) -> Result<Json<Thought>, ApiError>
where
  S: UserStore + ThoughtStore + 'static,
{
  Ok(Json(engine.remove_reaction(thought_id, body.reaction_id).await?))
}
