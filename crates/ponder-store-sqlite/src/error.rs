//! Error type for `ponder-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] ponder_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// An in-transaction existence check failed. Backstops the engine's
  /// probes against writes racing between probe and mutation.
  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("thought not found: {0}")]
  ThoughtNotFound(Uuid),

  /// UNIQUE constraint on `users.username` fired.
  #[error("username {0:?} is already taken")]
  UsernameTaken(String),

  /// UNIQUE constraint on `users.email` fired.
  #[error("email {0:?} is already registered")]
  EmailTaken(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Bridge into the domain taxonomy, so a backstop firing surfaces as the
/// same signal the engine's own probes would have produced.
impl From<Error> for ponder_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::Core(core) => core,
      Error::UserNotFound(id) => ponder_core::Error::UserNotFound(id),
      Error::ThoughtNotFound(id) => ponder_core::Error::ThoughtNotFound(id),
      Error::UsernameTaken(username) => {
        ponder_core::Error::UsernameTaken(username)
      }
      Error::EmailTaken(email) => ponder_core::Error::EmailTaken(email),
      other => ponder_core::Error::store(other),
    }
  }
}
