//! Tagged outcome of a read against the backend.
//!
//! Readers that degrade instead of failing (the session resolver, the feed
//! aggregator) first turn a backend result into a [`Lookup`], so "absent" and
//! "the backend errored" stay distinguishable in logs and tests even though
//! both collapse to the same user-facing value.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
  Found(T),
  NotFound,
  /// The backend call itself failed; carries the rendered error.
  TransientError(String),
}

impl<T> Lookup<T> {
  pub fn from_result<E: fmt::Display>(result: Result<Option<T>, E>) -> Self {
    match result {
      Ok(Some(value)) => Lookup::Found(value),
      Ok(None) => Lookup::NotFound,
      Err(e) => Lookup::TransientError(e.to_string()),
    }
  }

  pub fn found(self) -> Option<T> {
    match self {
      Lookup::Found(value) => Some(value),
      Lookup::NotFound | Lookup::TransientError(_) => None,
    }
  }

  pub fn as_found(&self) -> Option<&T> {
    match self {
      Lookup::Found(value) => Some(value),
      Lookup::NotFound | Lookup::TransientError(_) => None,
    }
  }

  pub fn is_transient(&self) -> bool {
    matches!(self, Lookup::TransientError(_))
  }

  /// Short label used as a structured log field.
  pub fn kind(&self) -> &'static str {
    match self {
      Lookup::Found(_) => "found",
      Lookup::NotFound => "not_found",
      Lookup::TransientError(_) => "transient_error",
    }
  }
}
