//! Error type for `skillpostr-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown post category in row: {0:?}")]
  UnknownCategory(String),

  #[error("invalid email address: {0:?}")]
  InvalidEmail(String),

  #[error("password must be at least {min} characters")]
  WeakPassword { min: usize },

  #[error("an account already exists for {0}")]
  EmailTaken(String),

  #[error("invalid login credentials")]
  InvalidCredentials,

  #[error("password hashing error: {0}")]
  PasswordHash(String),

  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("object already exists: {bucket}/{key}")]
  ObjectExists { bucket: String, key: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
