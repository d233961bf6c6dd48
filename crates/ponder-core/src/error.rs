//! Error types for `ponder-core`.

use thiserror::Error;
use uuid::Uuid;

/// The domain error taxonomy.
///
/// Everything up to [`Error::NothingToUpdate`] is a client-class signal:
/// it is detected before any mutating store call, so a rejected operation
/// leaves the store untouched. [`Error::Serialization`] and
/// [`Error::Store`] are server-class.
#[derive(Debug, Error)]
pub enum Error {
  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("{0:?} is not a valid email address")]
  InvalidEmail(String),

  #[error("thought text must be at most 280 characters, got {0}")]
  ThoughtTooLong(usize),

  #[error("reaction body must be at most 280 characters, got {0}")]
  ReactionTooLong(usize),

  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("thought not found: {0}")]
  ThoughtNotFound(Uuid),

  #[error("no user with username {0:?}")]
  UnknownUsername(String),

  #[error("no user matches id {user_id} with username {username:?}")]
  UserMismatch { username: String, user_id: Uuid },

  #[error("username {0:?} is already taken")]
  UsernameTaken(String),

  #[error("email {0:?} is already registered")]
  EmailTaken(String),

  #[error("users cannot befriend themselves")]
  SelfFriend,

  #[error("no changes made")]
  NothingToUpdate,

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend failure that carries no domain meaning.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::Store(Box::new(err))
  }

  /// Whether this is something the caller can fix, as opposed to a
  /// failure inside the service.
  pub fn is_client_error(&self) -> bool {
    !matches!(self, Error::Serialization(_) | Error::Store(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
