//! Error types for `skillpostr-core`.
//!
//! Only mutations and explicit user actions produce these. The degrading
//! read paths (destination resolution, author enrichment) never do.

use thiserror::Error;
use uuid::Uuid;

use crate::auth::AuthAction;

/// A backend error, type-erased at the core boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{action} failed: {source}")]
  Authentication {
    action: AuthAction,
    #[source]
    source: BoxError,
  },

  #[error("not signed in")]
  NotSignedIn,

  #[error("session error: {0}")]
  Session(#[source] BoxError),

  #[error("profile not found: {0}")]
  ProfileNotFound(Uuid),

  #[error("profile lookup failed: {0}")]
  ProfileLookup(#[source] BoxError),

  #[error("profile write failed: {0}")]
  ProfileWrite(#[source] BoxError),

  #[error("upload of {key:?} failed: {source}")]
  Upload {
    key:    String,
    #[source]
    source: BoxError,
  },

  #[error("post write failed: {0}")]
  PostWrite(#[source] BoxError),

  #[error("feed unavailable: {0}")]
  FeedUnavailable(#[source] BoxError),

  #[error("unknown category: {0:?}")]
  UnknownCategory(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
