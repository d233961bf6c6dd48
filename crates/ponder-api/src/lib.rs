//! HTTP surface for the ponder social API.
//!
//! [`router`] builds an axum application serving the JSON API under `/api`,
//! generic over any store that implements the core traits. [`ServerConfig`]
//! carries the runtime settings the `server` binary reads from `config.toml`
//! and `PONDER_*` environment variables.
//!
//! The wire contract is uniform: every success is `200` with a JSON
//! document, every domain rejection is `400` with `{"error": "..."}`, and
//! unexpected failures are `500` with the details kept in the logs.

mod error;
mod thoughts;
mod users;

use std::path::PathBuf;

use axum::{
  Json, Router,
  http::StatusCode,
  response::IntoResponse,
  routing::{get, post},
};
use ponder_core::{
  engine::Engine,
  store::{RenameCascade, ThoughtStore, UserStore},
};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

pub use crate::error::ApiError;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime configuration for the server binary.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  /// Interface to bind.
  #[serde(default = "default_host")]
  pub host:           String,
  /// Port to bind.
  #[serde(default = "default_port")]
  pub port:           u16,
  /// Path of the SQLite database file.
  #[serde(default = "default_store_path")]
  pub store_path:     PathBuf,
  /// How far a username change propagates into denormalised copies.
  #[serde(default)]
  pub rename_cascade: RenameCascade,
}

fn default_host() -> String {
  "127.0.0.1".to_owned()
}

fn default_port() -> u16 {
  3001
}

fn default_store_path() -> PathBuf {
  PathBuf::from("ponder.db")
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full application router around `engine`.
///
/// Domain routes are nested under `/api`; anything else lands on the JSON
/// 404 fallback.
pub fn router<S>(engine: Engine<S>) -> Router
where
  S: UserStore + ThoughtStore + 'static,
{
  let api = Router::new()
    .route("/users", get(users::list::<S>).post(users::create::<S>))
    .route(
      "/users/{user_id}",
      get(users::get_one::<S>)
        .put(users::update::<S>)
        .delete(users::delete::<S>),
    )
    .route(
      "/users/{user_id}/friends/{friend_id}",
      post(users::add_friend::<S>).delete(users::remove_friend::<S>),
    )
    .route(
      "/thoughts",
      get(thoughts::list::<S>).post(thoughts::create::<S>),
    )
    .route(
      "/thoughts/{thought_id}",
      get(thoughts::get_one::<S>)
        .put(thoughts::update::<S>)
        .delete(thoughts::delete::<S>),
    )
    .route(
      "/thoughts/{thought_id}/reactions",
      post(thoughts::add_reaction::<S>).delete(thoughts::remove_reaction::<S>),
    )
    .with_state(engine);

  Router::new()
    .nest("/api", api)
    .fallback(wrong_route)
    .layer(TraceLayer::new_for_http())
}

/// Catch-all for requests outside the API surface.
async fn wrong_route() -> impl IntoResponse {
  (StatusCode::NOT_FOUND, Json(json!({ "error": "no such route" })))
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, header},
  };
  use ponder_store_sqlite::SqliteStore;
  use serde_json::Value;
  use tower::ServiceExt as _;

  use super::*;

  async fn app() -> Router {
    app_with(RenameCascade::default()).await
  }

  async fn app_with(cascade: RenameCascade) -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    router(Engine::new(Arc::new(store), cascade))
  }

  /// Drive one request through the router and decode the JSON body.
  async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(value) => {
        request = request.header(header::CONTENT_TYPE, "application/json");
        Body::from(value.to_string())
      }
      None => Body::empty(),
    };

    let response = app
      .clone()
      .oneshot(request.body(body).unwrap())
      .await
      .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  async fn make_user(app: &Router, username: &str) -> Value {
    let (status, user) = send(
      app,
      "POST",
      "/api/users",
      Some(json!({
        "username": username,
        "email":    format!("{username}@example.com"),
      })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    user
  }

  async fn make_thought(app: &Router, owner: &Value, text: &str) -> Value {
    let (status, thought) = send(
      app,
      "POST",
      "/api/thoughts",
      Some(json!({
        "thoughtText": text,
        "username":    owner["username"],
        "userId":      owner["userId"],
      })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    thought
  }

  fn id(doc: &Value, key: &str) -> String {
    doc[key].as_str().unwrap().to_owned()
  }

  // ── Users ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_user_returns_full_document() {
    let app = app().await;

    let user = make_user(&app, "alice").await;

    assert_eq!(user["username"], "alice");
    assert_eq!(user["email"], "alice@example.com");
    assert_eq!(user["thoughts"], json!([]));
    assert_eq!(user["friends"], json!([]));
    assert_eq!(user["friendCount"], 0);
    assert!(user["userId"].as_str().is_some());
  }

  #[tokio::test]
  async fn create_user_normalises_identity_fields() {
    let app = app().await;

    let (status, user) = send(
      &app,
      "POST",
      "/api/users",
      Some(json!({ "username": "  alice  ", "email": " Alice@Example.COM " })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["username"], "alice");
    assert_eq!(user["email"], "alice@example.com");
  }

  #[tokio::test]
  async fn create_user_missing_email_is_rejected() {
    let app = app().await;

    let (status, body) =
      send(&app, "POST", "/api/users", Some(json!({ "username": "alice" })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing required field: email");
  }

  #[tokio::test]
  async fn create_user_invalid_email_is_rejected() {
    let app = app().await;

    let (status, body) = send(
      &app,
      "POST",
      "/api/users",
      Some(json!({ "username": "alice", "email": "not-an-email" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "\"not-an-email\" is not a valid email address");
  }

  #[tokio::test]
  async fn create_user_duplicate_username_is_rejected() {
    let app = app().await;
    make_user(&app, "alice").await;

    let (status, body) = send(
      &app,
      "POST",
      "/api/users",
      Some(json!({ "username": "alice", "email": "other@example.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "username \"alice\" is already taken");
  }

  #[tokio::test]
  async fn list_users_returns_flat_documents() {
    let app = app().await;
    make_user(&app, "alice").await;
    make_user(&app, "bob").await;

    let (status, users) = send(&app, "GET", "/api/users", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 2);
  }

  #[tokio::test]
  async fn get_user_expands_thoughts_and_friends() {
    let app = app().await;
    let alice = make_user(&app, "alice").await;
    let bob = make_user(&app, "bob").await;
    let alice_id = id(&alice, "userId");
    let bob_id = id(&bob, "userId");

    send(
      &app,
      "POST",
      &format!("/api/users/{alice_id}/friends/{bob_id}"),
      None,
    )
    .await;
    make_thought(&app, &alice, "first thought").await;

    let (status, view) =
      send(&app, "GET", &format!("/api/users/{alice_id}"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["thoughts"][0]["thoughtText"], "first thought");
    assert_eq!(view["friends"][0]["username"], "bob");
    assert_eq!(view["friendCount"], 1);
  }

  #[tokio::test]
  async fn get_unknown_user_is_rejected() {
    let app = app().await;
    let ghost = uuid::Uuid::new_v4();

    let (status, body) =
      send(&app, "GET", &format!("/api/users/{ghost}"), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], format!("user not found: {ghost}"));
  }

  #[tokio::test]
  async fn update_user_patches_and_renames_thoughts() {
    let app = app().await;
    let alice = make_user(&app, "alice").await;
    let alice_id = id(&alice, "userId");
    let thought = make_thought(&app, &alice, "soon to be renamed").await;
    let thought_id = id(&thought, "thoughtId");

    let (status, updated) = send(
      &app,
      "PUT",
      &format!("/api/users/{alice_id}"),
      Some(json!({ "username": "wonderland" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["username"], "wonderland");
    assert_eq!(updated["email"], "alice@example.com");

    let (_, thought) =
      send(&app, "GET", &format!("/api/thoughts/{thought_id}"), None).await;
    assert_eq!(thought["username"], "wonderland");
  }

  #[tokio::test]
  async fn update_user_empty_patch_returns_document_unchanged() {
    let app = app().await;
    let alice = make_user(&app, "alice").await;
    let alice_id = id(&alice, "userId");

    let (status, user) =
      send(&app, "PUT", &format!("/api/users/{alice_id}"), Some(json!({})))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["username"], "alice");
  }

  #[tokio::test]
  async fn update_user_taken_username_is_rejected() {
    let app = app().await;
    let alice = make_user(&app, "alice").await;
    make_user(&app, "bob").await;
    let alice_id = id(&alice, "userId");

    let (status, body) = send(
      &app,
      "PUT",
      &format!("/api/users/{alice_id}"),
      Some(json!({ "username": "bob" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "username \"bob\" is already taken");
  }

  #[tokio::test]
  async fn delete_user_reports_and_performs_cascade() {
    let app = app().await;
    let alice = make_user(&app, "alice").await;
    let bob = make_user(&app, "bob").await;
    let alice_id = id(&alice, "userId");
    let bob_id = id(&bob, "userId");

    send(
      &app,
      "POST",
      &format!("/api/users/{alice_id}/friends/{bob_id}"),
      None,
    )
    .await;
    make_thought(&app, &alice, "going").await;
    make_thought(&app, &alice, "gone").await;

    let (status, receipt) =
      send(&app, "DELETE", &format!("/api/users/{alice_id}"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["user"]["username"], "alice");
    assert_eq!(receipt["thoughtsDeleted"], 2);
    assert_eq!(receipt["friendshipsSevered"], 1);

    let (_, bob_view) =
      send(&app, "GET", &format!("/api/users/{bob_id}"), None).await;
    assert_eq!(bob_view["friends"], json!([]));

    let (_, thoughts) = send(&app, "GET", "/api/thoughts", None).await;
    assert_eq!(thoughts, json!([]));
  }

  // ── Friendships ───────────────────────────────────────────────────────

  #[tokio::test]
  async fn add_friend_links_both_sides() {
    let app = app().await;
    let alice = make_user(&app, "alice").await;
    let bob = make_user(&app, "bob").await;
    let alice_id = id(&alice, "userId");
    let bob_id = id(&bob, "userId");

    let (status, updated) = send(
      &app,
      "POST",
      &format!("/api/users/{alice_id}/friends/{bob_id}"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["friends"], json!([bob_id]));
    assert_eq!(updated["friendCount"], 1);

    let (_, bob_view) =
      send(&app, "GET", &format!("/api/users/{bob_id}"), None).await;
    assert_eq!(bob_view["friends"][0]["username"], "alice");
  }

  #[tokio::test]
  async fn add_friend_to_self_is_rejected() {
    let app = app().await;
    let alice = make_user(&app, "alice").await;
    let alice_id = id(&alice, "userId");

    let (status, body) = send(
      &app,
      "POST",
      &format!("/api/users/{alice_id}/friends/{alice_id}"),
      None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "users cannot befriend themselves");
  }

  #[tokio::test]
  async fn remove_friend_from_self_is_rejected() {
    let app = app().await;
    let alice = make_user(&app, "alice").await;
    let alice_id = id(&alice, "userId");

    let (status, body) = send(
      &app,
      "DELETE",
      &format!("/api/users/{alice_id}/friends/{alice_id}"),
      None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "users cannot befriend themselves");
  }

  #[tokio::test]
  async fn add_friend_unknown_user_is_rejected() {
    let app = app().await;
    let alice = make_user(&app, "alice").await;
    let alice_id = id(&alice, "userId");
    let ghost = uuid::Uuid::new_v4();

    let (status, body) = send(
      &app,
      "POST",
      &format!("/api/users/{alice_id}/friends/{ghost}"),
      None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], format!("user not found: {ghost}"));
  }

  #[tokio::test]
  async fn remove_friend_unlinks_both_sides() {
    let app = app().await;
    let alice = make_user(&app, "alice").await;
    let bob = make_user(&app, "bob").await;
    let alice_id = id(&alice, "userId");
    let bob_id = id(&bob, "userId");
    send(
      &app,
      "POST",
      &format!("/api/users/{alice_id}/friends/{bob_id}"),
      None,
    )
    .await;

    let (status, updated) = send(
      &app,
      "DELETE",
      &format!("/api/users/{alice_id}/friends/{bob_id}"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["friends"], json!([]));

    let (_, bob_view) =
      send(&app, "GET", &format!("/api/users/{bob_id}"), None).await;
    assert_eq!(bob_view["friends"], json!([]));

    // Unfriending again stays a 200 no-op.
    let (status, _) = send(
      &app,
      "DELETE",
      &format!("/api/users/{alice_id}/friends/{bob_id}"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
  }

  // ── Thoughts ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_thought_embeds_in_owner_sequence() {
    let app = app().await;
    let alice = make_user(&app, "alice").await;
    let alice_id = id(&alice, "userId");

    let thought = make_thought(&app, &alice, "hello world").await;

    assert_eq!(thought["thoughtText"], "hello world");
    assert_eq!(thought["username"], "alice");
    assert_eq!(thought["reactions"], json!([]));
    assert_eq!(thought["reactionCount"], 0);
    assert!(thought["createdAt"].as_str().is_some());

    let (_, view) =
      send(&app, "GET", &format!("/api/users/{alice_id}"), None).await;
    assert_eq!(view["thoughts"].as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn create_thought_mismatched_owner_is_rejected() {
    let app = app().await;
    let alice = make_user(&app, "alice").await;
    make_user(&app, "bob").await;

    let (status, body) = send(
      &app,
      "POST",
      "/api/thoughts",
      Some(json!({
        "thoughtText": "imposter",
        "username":    "bob",
        "userId":      alice["userId"],
      })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
      body["error"]
        .as_str()
        .unwrap()
        .starts_with("no user matches id")
    );
  }

  #[tokio::test]
  async fn create_thought_missing_text_is_rejected() {
    let app = app().await;
    let alice = make_user(&app, "alice").await;

    let (status, body) = send(
      &app,
      "POST",
      "/api/thoughts",
      Some(json!({ "username": "alice", "userId": alice["userId"] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing required field: thoughtText");
  }

  #[tokio::test]
  async fn create_thought_overlong_text_is_rejected() {
    let app = app().await;
    let alice = make_user(&app, "alice").await;

    let (status, body) = send(
      &app,
      "POST",
      "/api/thoughts",
      Some(json!({
        "thoughtText": "x".repeat(281),
        "username":    "alice",
        "userId":      alice["userId"],
      })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
      body["error"],
      "thought text must be at most 280 characters, got 281"
    );
  }

  #[tokio::test]
  async fn update_thought_replaces_text_only() {
    let app = app().await;
    let alice = make_user(&app, "alice").await;
    let thought = make_thought(&app, &alice, "draft").await;
    let thought_id = id(&thought, "thoughtId");

    let (status, updated) = send(
      &app,
      "PUT",
      &format!("/api/thoughts/{thought_id}"),
      Some(json!({ "thoughtText": "final" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["thoughtText"], "final");
    assert_eq!(updated["createdAt"], thought["createdAt"]);
  }

  #[tokio::test]
  async fn update_thought_empty_text_is_rejected() {
    let app = app().await;
    let alice = make_user(&app, "alice").await;
    let thought = make_thought(&app, &alice, "kept").await;
    let thought_id = id(&thought, "thoughtId");

    let (status, body) = send(
      &app,
      "PUT",
      &format!("/api/thoughts/{thought_id}"),
      Some(json!({ "thoughtText": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "no changes made");

    let (_, unchanged) =
      send(&app, "GET", &format!("/api/thoughts/{thought_id}"), None).await;
    assert_eq!(unchanged["thoughtText"], "kept");
  }

  #[tokio::test]
  async fn delete_thought_pulls_owner_reference() {
    let app = app().await;
    let alice = make_user(&app, "alice").await;
    let alice_id = id(&alice, "userId");
    let thought = make_thought(&app, &alice, "fleeting").await;
    let thought_id = id(&thought, "thoughtId");

    let (status, removed) =
      send(&app, "DELETE", &format!("/api/thoughts/{thought_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["thoughtText"], "fleeting");

    let (_, view) =
      send(&app, "GET", &format!("/api/users/{alice_id}"), None).await;
    assert_eq!(view["thoughts"], json!([]));
  }

  #[tokio::test]
  async fn get_unknown_thought_is_rejected() {
    let app = app().await;
    let ghost = uuid::Uuid::new_v4();

    let (status, body) =
      send(&app, "GET", &format!("/api/thoughts/{ghost}"), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], format!("thought not found: {ghost}"));
  }

  // ── Reactions ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn add_reaction_embeds_with_id_and_timestamp() {
    let app = app().await;
    let alice = make_user(&app, "alice").await;
    make_user(&app, "bob").await;
    let thought = make_thought(&app, &alice, "react to this").await;
    let thought_id = id(&thought, "thoughtId");

    let (status, updated) = send(
      &app,
      "POST",
      &format!("/api/thoughts/{thought_id}/reactions"),
      Some(json!({ "reactionBody": "nice one", "username": "bob" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["reactionCount"], 1);
    let reaction = &updated["reactions"][0];
    assert_eq!(reaction["reactionBody"], "nice one");
    assert_eq!(reaction["username"], "bob");
    assert!(reaction["reactionId"].as_str().is_some());
    assert!(reaction["createdAt"].as_str().is_some());
  }

  #[tokio::test]
  async fn add_reaction_unknown_author_is_rejected() {
    let app = app().await;
    let alice = make_user(&app, "alice").await;
    let thought = make_thought(&app, &alice, "no ghosts").await;
    let thought_id = id(&thought, "thoughtId");

    let (status, body) = send(
      &app,
      "POST",
      &format!("/api/thoughts/{thought_id}/reactions"),
      Some(json!({ "reactionBody": "boo", "username": "ghost" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "no user with username \"ghost\"");
  }

  #[tokio::test]
  async fn add_overlong_reaction_is_rejected() {
    let app = app().await;
    let alice = make_user(&app, "alice").await;
    let thought = make_thought(&app, &alice, "measured").await;
    let thought_id = id(&thought, "thoughtId");

    let (status, body) = send(
      &app,
      "POST",
      &format!("/api/thoughts/{thought_id}/reactions"),
      Some(json!({ "reactionBody": "x".repeat(281), "username": "alice" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
      body["error"],
      "reaction body must be at most 280 characters, got 281"
    );

    let (_, unchanged) =
      send(&app, "GET", &format!("/api/thoughts/{thought_id}"), None).await;
    assert_eq!(unchanged["reactionCount"], 0);
  }

  #[tokio::test]
  async fn add_duplicate_reaction_is_a_noop() {
    let app = app().await;
    let alice = make_user(&app, "alice").await;
    let thought = make_thought(&app, &alice, "once only").await;
    let thought_id = id(&thought, "thoughtId");
    let body = json!({ "reactionBody": "same", "username": "alice" });

    send(
      &app,
      "POST",
      &format!("/api/thoughts/{thought_id}/reactions"),
      Some(body.clone()),
    )
    .await;
    let (status, updated) = send(
      &app,
      "POST",
      &format!("/api/thoughts/{thought_id}/reactions"),
      Some(body),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["reactionCount"], 1);
  }

  #[tokio::test]
  async fn remove_reaction_by_id() {
    let app = app().await;
    let alice = make_user(&app, "alice").await;
    let thought = make_thought(&app, &alice, "retractable").await;
    let thought_id = id(&thought, "thoughtId");

    let (_, reacted) = send(
      &app,
      "POST",
      &format!("/api/thoughts/{thought_id}/reactions"),
      Some(json!({ "reactionBody": "oops", "username": "alice" })),
    )
    .await;
    let reaction_id = id(&reacted["reactions"][0], "reactionId");

    let (status, updated) = send(
      &app,
      "DELETE",
      &format!("/api/thoughts/{thought_id}/reactions"),
      Some(json!({ "reactionId": reaction_id })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["reactions"], json!([]));

    // An id that matches nothing is still a 200 no-op.
    let (status, _) = send(
      &app,
      "DELETE",
      &format!("/api/thoughts/{thought_id}/reactions"),
      Some(json!({ "reactionId": uuid::Uuid::new_v4() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
  }

  #[tokio::test]
  async fn remove_reaction_missing_id_is_rejected() {
    let app = app().await;
    let alice = make_user(&app, "alice").await;
    let thought = make_thought(&app, &alice, "keep it").await;
    let thought_id = id(&thought, "thoughtId");

    let (status, body) = send(
      &app,
      "DELETE",
      &format!("/api/thoughts/{thought_id}/reactions"),
      Some(json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing required field: reactionId");
  }

  // ── Routing and configuration ─────────────────────────────────────────

  #[tokio::test]
  async fn unknown_routes_get_a_json_404() {
    let app = app().await;

    for uri in ["/nope", "/api/nope"] {
      let (status, body) = send(&app, "GET", uri, None).await;
      assert_eq!(status, StatusCode::NOT_FOUND);
      assert_eq!(body["error"], "no such route");
    }
  }

  #[tokio::test]
  async fn configured_cascade_rewrites_reaction_authors() {
    let app = app_with(RenameCascade::ThoughtsAndReactions).await;
    let alice = make_user(&app, "alice").await;
    let bob = make_user(&app, "bob").await;
    let thought = make_thought(&app, &bob, "react here").await;
    let thought_id = id(&thought, "thoughtId");
    send(
      &app,
      "POST",
      &format!("/api/thoughts/{thought_id}/reactions"),
      Some(json!({ "reactionBody": "from alice", "username": "alice" })),
    )
    .await;

    let alice_id = id(&alice, "userId");
    send(
      &app,
      "PUT",
      &format!("/api/users/{alice_id}"),
      Some(json!({ "username": "wonderland" })),
    )
    .await;

    let (_, thought) =
      send(&app, "GET", &format!("/api/thoughts/{thought_id}"), None).await;
    assert_eq!(thought["reactions"][0]["username"], "wonderland");
  }

  #[tokio::test]
  async fn server_config_fills_defaults() {
    let config: ServerConfig = serde_json::from_value(json!({})).unwrap();

    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 3001);
    assert_eq!(config.store_path, PathBuf::from("ponder.db"));
    assert_eq!(config.rename_cascade, RenameCascade::Thoughts);
  }

  // ── End to end ────────────────────────────────────────────────────────

  #[tokio::test]
  async fn full_social_flow_stays_consistent() {
    let app = app().await;
    let poet = make_user(&app, "poet").await;
    let fan = make_user(&app, "fan").await;
    let poet_id = id(&poet, "userId");
    let fan_id = id(&fan, "userId");

    send(
      &app,
      "POST",
      &format!("/api/users/{poet_id}/friends/{fan_id}"),
      None,
    )
    .await;
    let thought = make_thought(&app, &poet, "ink and ashes").await;
    let thought_id = id(&thought, "thoughtId");
    send(
      &app,
      "POST",
      &format!("/api/thoughts/{thought_id}/reactions"),
      Some(json!({ "reactionBody": "stunning", "username": "fan" })),
    )
    .await;

    // Renaming the author reaches the denormalised thought copy while the
    // fan's reaction keeps its own author name.
    send(
      &app,
      "PUT",
      &format!("/api/users/{poet_id}"),
      Some(json!({ "username": "bard" })),
    )
    .await;
    let (_, thought) =
      send(&app, "GET", &format!("/api/thoughts/{thought_id}"), None).await;
    assert_eq!(thought["username"], "bard");
    assert_eq!(thought["reactions"][0]["username"], "fan");

    // Removing the author takes the thought along and leaves the fan with
    // a clean friend list.
    let (_, receipt) =
      send(&app, "DELETE", &format!("/api/users/{poet_id}"), None).await;
    assert_eq!(receipt["thoughtsDeleted"], 1);
    assert_eq!(receipt["friendshipsSevered"], 1);

    let (_, fan_view) =
      send(&app, "GET", &format!("/api/users/{fan_id}"), None).await;
    assert_eq!(fan_view["friends"], json!([]));
    let (_, thoughts) = send(&app, "GET", "/api/thoughts", None).await;
    assert_eq!(thoughts, json!([]));
  }
}
