//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 with a fixed six fractional digits and a
//! `Z` suffix, so lexical order in SQL equals chronological order. UUIDs are
//! stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use skillpostr_core::{
  post::{Category, Post},
  profile::Profile,
  session::Session,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Category ─────────────────────────────────────────────────────────────────

pub fn encode_category(c: Category) -> &'static str { c.as_str() }

pub fn decode_category(s: &str) -> Result<Category> {
  Category::ALL
    .into_iter()
    .find(|c| c.as_str() == s)
    .ok_or_else(|| Error::UnknownCategory(s.to_owned()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// A `sessions` row joined with the owning user's email.
pub struct RawSession {
  pub token:      String,
  pub user_id:    String,
  pub email:      String,
  pub created_at: String,
  pub expires_at: String,
}

impl RawSession {
  pub fn into_session(self) -> Result<Session> {
    Ok(Session {
      user_id:      decode_uuid(&self.user_id)?,
      email:        self.email,
      access_token: self.token,
      created_at:   decode_dt(&self.created_at)?,
      expires_at:   decode_dt(&self.expires_at)?,
    })
  }
}

pub struct RawProfile {
  pub id:         String,
  pub name:       Option<String>,
  pub avatar_url: Option<String>,
  pub bio:        Option<String>,
  pub location:   Option<String>,
  pub updated_at: String,
}

impl RawProfile {
  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      id:         decode_uuid(&self.id)?,
      name:       self.name,
      avatar_url: self.avatar_url,
      bio:        self.bio,
      location:   self.location,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

pub struct RawPost {
  pub id:          i64,
  pub title:       String,
  pub description: String,
  pub image_url:   Option<String>,
  pub category:    String,
  pub author_id:   String,
  pub created_at:  String,
}

impl RawPost {
  pub fn into_post(self) -> Result<Post> {
    Ok(Post {
      id:          self.id,
      title:       self.title,
      description: self.description,
      image_url:   self.image_url,
      category:    decode_category(&self.category)?,
      author_id:   decode_uuid(&self.author_id)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}
