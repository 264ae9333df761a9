//! Posts and their feed-time enrichment.
//!
//! Posts are immutable once created. An [`EnrichedPost`] is never stored; it
//! is derived on every feed load by joining the post against its author's
//! profile.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

/// Shown in place of an author name that could not be resolved.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

// ─── Category ────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum Category {
  #[default]
  Tech,
  Business,
  Lifestyle,
}

impl Category {
  pub const ALL: [Category; 3] =
    [Category::Tech, Category::Business, Category::Lifestyle];

  pub fn as_str(self) -> &'static str {
    match self {
      Category::Tech => "Tech",
      Category::Business => "Business",
      Category::Lifestyle => "Lifestyle",
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Category {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Category::ALL
      .into_iter()
      .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| Error::UnknownCategory(s.to_owned()))
  }
}

// ─── Post ────────────────────────────────────────────────────────────────────

/// A published post as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
  /// Store-assigned, increasing with insertion order.
  pub id:          i64,
  pub title:       String,
  pub description: String,
  pub image_url:   Option<String>,
  pub category:    Category,
  /// The author's subject id; may not resolve to a profile.
  pub author_id:   Uuid,
  pub created_at:  DateTime<Utc>,
}

/// Input for creating a post. `id`, author and timestamp come from the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
  pub title:       String,
  pub description: String,
  pub category:    Category,
  pub image_url:   Option<String>,
}

impl NewPost {
  pub fn new(
    title: impl Into<String>,
    description: impl Into<String>,
    category: Category,
  ) -> Self {
    Self {
      title: title.into(),
      description: description.into(),
      category,
      image_url: None,
    }
  }
}

/// A post annotated with its author's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedPost {
  #[serde(flatten)]
  pub post:                Post,
  /// The author's profile name, or [`UNKNOWN_AUTHOR`].
  pub author_display_name: String,
}
