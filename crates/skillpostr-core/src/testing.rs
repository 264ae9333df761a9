//! A scripted in-memory [`Backend`] for exercising the core flows.

use std::{
  collections::{HashMap, HashSet},
  sync::{Mutex, MutexGuard},
  time::Duration,
};

use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::{
  backend::Backend,
  post::{Category, NewPost, Post},
  profile::{Profile, ProfileFields},
  session::{Credentials, Session},
  storage::ObjectUpload,
};

#[derive(Debug, Error)]
#[error("{0}")]
pub struct FakeError(pub String);

#[derive(Default)]
pub struct FakeState {
  /// The session handed out once it is visible.
  pub session:              Option<Session>,
  /// First `current_session` poll (1-based) on which `session` is visible.
  pub session_visible_from: u32,
  /// Polls (1-based) that fail with a transport error.
  pub session_errors_on:    Vec<u32>,
  pub session_polls:        u32,

  pub auth_error:    Option<String>,
  pub auth_calls:    u32,
  pub sign_out_error: Option<String>,

  pub profiles:          HashMap<Uuid, Profile>,
  pub failing_profiles:  HashSet<Uuid>,
  pub profile_delays:    HashMap<Uuid, Duration>,
  pub profile_lookups:   u32,
  pub lookups_in_flight: u32,
  pub max_in_flight:     u32,
  pub upsert_error:      Option<String>,
  pub upserts:           u32,

  pub posts:            Vec<Post>,
  pub list_posts_error: Option<String>,
  pub create_error:     Option<String>,

  pub uploads:      Vec<ObjectUpload>,
  pub upload_error: Option<String>,
}

#[derive(Default)]
pub struct FakeBackend {
  state: Mutex<FakeState>,
}

impl FakeBackend {
  pub fn new() -> Self { Self::default() }

  pub fn with(configure: impl FnOnce(&mut FakeState)) -> Self {
    let backend = Self::new();
    configure(&mut backend.state());
    backend
  }

  pub fn state(&self) -> MutexGuard<'_, FakeState> {
    self.state.lock().unwrap()
  }

  fn open_session(&self, email: String) -> Result<Session, FakeError> {
    let mut state = self.state();
    state.auth_calls += 1;
    if let Some(msg) = &state.auth_error {
      return Err(FakeError(msg.clone()));
    }
    let session = state
      .session
      .clone()
      .unwrap_or_else(|| session_for(Uuid::new_v4(), &email));
    state.session = Some(session.clone());
    Ok(session)
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

pub fn session_for(user_id: Uuid, email: &str) -> Session {
  let now = Utc::now();
  Session {
    user_id,
    email: email.to_owned(),
    access_token: format!("token-{user_id}"),
    created_at: now,
    expires_at: now + chrono::Duration::hours(1),
  }
}

pub fn profile(id: Uuid, name: Option<&str>) -> Profile {
  Profile {
    id,
    name: name.map(str::to_owned),
    avatar_url: None,
    bio: None,
    location: None,
    updated_at: Utc::now(),
  }
}

pub fn at(secs: i64) -> DateTime<Utc> { Utc.timestamp_opt(secs, 0).unwrap() }

pub fn post(id: i64, author_id: Uuid, created_at: DateTime<Utc>) -> Post {
  Post {
    id,
    title: format!("post {id}"),
    description: String::new(),
    image_url: None,
    category: Category::Tech,
    author_id,
    created_at,
  }
}

// ─── Backend impl ────────────────────────────────────────────────────────────

impl Backend for FakeBackend {
  type Error = FakeError;

  async fn sign_up(&self, credentials: Credentials) -> Result<Session, FakeError> {
    self.open_session(credentials.email)
  }

  async fn sign_in(&self, credentials: Credentials) -> Result<Session, FakeError> {
    self.open_session(credentials.email)
  }

  async fn sign_out(&self) -> Result<(), FakeError> {
    let mut state = self.state();
    if let Some(msg) = &state.sign_out_error {
      return Err(FakeError(msg.clone()));
    }
    state.session = None;
    Ok(())
  }

  async fn current_session(&self) -> Result<Option<Session>, FakeError> {
    let mut state = self.state();
    state.session_polls += 1;
    let poll = state.session_polls;
    if state.session_errors_on.contains(&poll) {
      return Err(FakeError(format!("transport error on poll {poll}")));
    }
    if poll < state.session_visible_from {
      return Ok(None);
    }
    Ok(state.session.clone())
  }

  async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, FakeError> {
    let delay = {
      let mut state = self.state();
      state.profile_lookups += 1;
      state.lookups_in_flight += 1;
      state.max_in_flight = state.max_in_flight.max(state.lookups_in_flight);
      state.profile_delays.get(&user_id).copied()
    };
    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    }

    let mut state = self.state();
    state.lookups_in_flight -= 1;
    if state.failing_profiles.contains(&user_id) {
      return Err(FakeError(format!("lookup of {user_id} timed out")));
    }
    Ok(state.profiles.get(&user_id).cloned())
  }

  async fn upsert_profile(
    &self,
    user_id: Uuid,
    fields: ProfileFields,
  ) -> Result<Profile, FakeError> {
    let mut state = self.state();
    state.upserts += 1;
    if let Some(msg) = &state.upsert_error {
      return Err(FakeError(msg.clone()));
    }
    let stored = Profile {
      id:         user_id,
      name:       fields.name,
      avatar_url: fields.avatar_url,
      bio:        fields.bio,
      location:   fields.location,
      updated_at: Utc::now(),
    };
    state.profiles.insert(user_id, stored.clone());
    Ok(stored)
  }

  async fn list_posts(&self) -> Result<Vec<Post>, FakeError> {
    let state = self.state();
    if let Some(msg) = &state.list_posts_error {
      return Err(FakeError(msg.clone()));
    }
    let mut posts = state.posts.clone();
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    Ok(posts)
  }

  async fn create_post(&self, author_id: Uuid, input: NewPost) -> Result<Post, FakeError> {
    let mut state = self.state();
    if let Some(msg) = &state.create_error {
      return Err(FakeError(msg.clone()));
    }
    let id = state.posts.iter().map(|p| p.id).max().unwrap_or(0) + 1;
    let stored = Post {
      id,
      title: input.title,
      description: input.description,
      image_url: input.image_url,
      category: input.category,
      author_id,
      created_at: Utc::now(),
    };
    state.posts.push(stored.clone());
    Ok(stored)
  }

  async fn upload_object(&self, upload: ObjectUpload) -> Result<String, FakeError> {
    let mut state = self.state();
    if let Some(msg) = &state.upload_error {
      return Err(FakeError(msg.clone()));
    }
    let url = format!("https://storage.test/{}/{}", upload.bucket, upload.key);
    state.uploads.push(upload);
    Ok(url)
  }
}
