//! The `Backend` trait — everything the client consumes from the managed
//! service.
//!
//! Identity, profile rows, post rows and object storage are treated as one
//! opaque collaborator. Implementations (e.g. `skillpostr-store-sqlite`) own
//! all persistence; the flows in this crate depend on this abstraction only.

use std::future::Future;

use uuid::Uuid;

use crate::{
  post::{NewPost, Post},
  profile::{Profile, ProfileFields},
  session::{Credentials, Session},
  storage::ObjectUpload,
};

/// Abstraction over the identity / profile / post / object service.
///
/// Reads may lag behind writes: in particular a session created by
/// [`sign_in`](Backend::sign_in) is not guaranteed to be visible to
/// [`current_session`](Backend::current_session) the moment the call returns.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait Backend: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Identity ──────────────────────────────────────────────────────────

  /// Register a new account and open a session for it.
  fn sign_up(
    &self,
    credentials: Credentials,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  /// Open a session for an existing account.
  fn sign_in(
    &self,
    credentials: Credentials,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  /// End the current session, if any.
  fn sign_out(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The session this client currently holds. `None` when signed out,
  /// expired, or not yet visible.
  fn current_session(
    &self,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  // ── Profiles ──────────────────────────────────────────────────────────

  /// Retrieve a profile by its subject id. Returns `None` if not found.
  fn get_profile(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// Create or replace the editable fields of `user_id`'s profile.
  fn upsert_profile(
    &self,
    user_id: Uuid,
    fields: ProfileFields,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  // ── Posts ─────────────────────────────────────────────────────────────

  /// All posts, newest first. Equal timestamps are ordered by descending id
  /// so repeated calls agree.
  fn list_posts(
    &self,
  ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + '_;

  /// Persist a post authored by `author_id`. The store assigns `id` and
  /// `created_at`.
  fn create_post(
    &self,
    author_id: Uuid,
    post: NewPost,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  // ── Objects ───────────────────────────────────────────────────────────

  /// Store an object under `(bucket, key)` and return its public URL.
  ///
  /// Must fail rather than overwrite an existing object.
  fn upload_object(
    &self,
    upload: ObjectUpload,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + '_;
}
