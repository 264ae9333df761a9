//! Profiles — one per authenticated subject.
//!
//! A profile row exists from sign-up onwards but stays incomplete until the
//! user picks a display name. That name is what the onboarding gate checks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored profile. `id` equals the owning session's `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
  pub id:         Uuid,
  pub name:       Option<String>,
  pub avatar_url: Option<String>,
  pub bio:        Option<String>,
  pub location:   Option<String>,
  pub updated_at: DateTime<Utc>,
}

impl Profile {
  /// The display name, if one has been set. Empty names count as unset.
  pub fn display_name(&self) -> Option<&str> {
    self.name.as_deref().filter(|n| !n.is_empty())
  }

  /// Onboarded iff the profile carries a non-empty name.
  pub fn is_onboarded(&self) -> bool { self.display_name().is_some() }
}

/// The user-editable part of a profile, written wholesale by an upsert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileFields {
  pub name:       Option<String>,
  pub avatar_url: Option<String>,
  pub bio:        Option<String>,
  pub location:   Option<String>,
}

impl From<&Profile> for ProfileFields {
  fn from(p: &Profile) -> Self {
    ProfileFields {
      name:       p.name.clone(),
      avatar_url: p.avatar_url.clone(),
      bio:        p.bio.clone(),
      location:   p.location.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn profile(name: Option<&str>) -> Profile {
    Profile {
      id:         Uuid::new_v4(),
      name:       name.map(str::to_owned),
      avatar_url: None,
      bio:        None,
      location:   None,
      updated_at: Utc::now(),
    }
  }

  #[test]
  fn missing_or_empty_name_is_not_onboarded() {
    assert!(!profile(None).is_onboarded());
    assert!(!profile(Some("")).is_onboarded());
    assert_eq!(profile(Some("")).display_name(), None);
  }

  #[test]
  fn non_empty_name_is_onboarded() {
    let p = profile(Some("Alice"));
    assert!(p.is_onboarded());
    assert_eq!(p.display_name(), Some("Alice"));
  }

  #[test]
  fn fields_copy_every_editable_column() {
    let mut p = profile(Some("Alice"));
    p.bio = Some("rustacean".into());
    p.location = Some("Lisbon".into());
    p.avatar_url = Some("https://cdn.example/a.png".into());

    let fields = ProfileFields::from(&p);
    assert_eq!(fields.name.as_deref(), Some("Alice"));
    assert_eq!(fields.bio.as_deref(), Some("rustacean"));
    assert_eq!(fields.location.as_deref(), Some("Lisbon"));
    assert_eq!(fields.avatar_url.as_deref(), Some("https://cdn.example/a.png"));
  }
}
