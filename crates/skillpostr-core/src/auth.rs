//! Sign-in, sign-up and sign-out, followed by destination resolution.
//!
//! A rejected authentication attempt stops here: the error is returned and
//! no routing decision is made.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
  Error, Result,
  backend::Backend,
  resolver::{Resolution, SessionResolver},
  retry::RetryPolicy,
  session::{Credentials, Session},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthAction {
  SignIn,
  SignUp,
}

impl fmt::Display for AuthAction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      AuthAction::SignIn => "sign-in",
      AuthAction::SignUp => "sign-up",
    })
  }
}

/// Perform `action`, then resolve where the user should land.
///
/// The session returned by the backend is not trusted for routing; the
/// resolver polls for it so that a not-yet-visible session is waited out.
pub async fn authenticate<B: Backend>(
  backend: &B,
  action: AuthAction,
  credentials: Credentials,
  policy: RetryPolicy,
) -> Result<Resolution> {
  let outcome = match action {
    AuthAction::SignIn => backend.sign_in(credentials).await,
    AuthAction::SignUp => backend.sign_up(credentials).await,
  };

  let session = outcome.map_err(|e| {
    warn!(%action, error = %e, "authentication rejected; not routing");
    Error::Authentication { action, source: Box::new(e) }
  })?;
  info!(%action, user_id = %session.user_id, "authenticated; resolving destination");

  Ok(SessionResolver::new(backend, policy).resolve().await)
}

pub async fn sign_out<B: Backend>(backend: &B) -> Result<()> {
  backend
    .sign_out()
    .await
    .map_err(|e| Error::Session(Box::new(e)))?;
  info!("signed out");
  Ok(())
}

/// The current session, for mutations that must act as a signed-in user.
///
/// No polling here: mutations run well after authentication settled.
pub(crate) async fn require_session<B: Backend>(backend: &B) -> Result<Session> {
  backend
    .current_session()
    .await
    .map_err(|e| Error::Session(Box::new(e)))?
    .ok_or(Error::NotSignedIn)
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use uuid::Uuid;

  use super::*;
  use crate::{
    resolver::Destination,
    testing::{FakeBackend, profile, session_for},
  };

  fn creds() -> Credentials { Credentials::new("alice@example.com", "hunter22") }

  #[tokio::test(start_paused = true)]
  async fn rejected_sign_in_halts_before_routing() {
    let backend = FakeBackend::with(|s| s.auth_error = Some("invalid login credentials".into()));

    let err = authenticate(&backend, AuthAction::SignIn, creds(), RetryPolicy::default())
      .await
      .unwrap_err();

    assert!(matches!(err, Error::Authentication { action: AuthAction::SignIn, .. }));
    assert_eq!(backend.state().session_polls, 0);
    assert_eq!(backend.state().profile_lookups, 0);
  }

  #[tokio::test(start_paused = true)]
  async fn sign_up_routes_new_user_to_onboarding() {
    let user_id = Uuid::new_v4();
    let backend = FakeBackend::with(|s| {
      s.session = Some(session_for(user_id, "alice@example.com"));
      s.session_visible_from = 2;
      s.profiles.insert(user_id, profile(user_id, None));
    });

    let resolution = authenticate(
      &backend,
      AuthAction::SignUp,
      creds(),
      RetryPolicy::new(5, Duration::from_millis(300)),
    )
    .await
    .unwrap();

    assert_eq!(resolution.destination, Destination::OnboardingRequired);
    assert_eq!(resolution.attempts, 2);
    assert_eq!(resolution.session.unwrap().user_id, user_id);
  }

  #[tokio::test(start_paused = true)]
  async fn sign_in_with_complete_profile_reaches_the_feed() {
    let user_id = Uuid::new_v4();
    let backend = FakeBackend::with(|s| {
      s.session = Some(session_for(user_id, "alice@example.com"));
      s.profiles.insert(user_id, profile(user_id, Some("Alice")));
    });

    let resolution = authenticate(&backend, AuthAction::SignIn, creds(), RetryPolicy::default())
      .await
      .unwrap();

    assert_eq!(resolution.destination, Destination::FeedReady);
    assert_eq!(backend.state().auth_calls, 1);
  }

  #[tokio::test]
  async fn sign_out_clears_the_session() {
    let backend = FakeBackend::with(|s| s.session = Some(session_for(Uuid::new_v4(), "a@b.c")));
    sign_out(&backend).await.unwrap();
    assert!(backend.state().session.is_none());
  }

  #[tokio::test]
  async fn sign_out_failure_is_reported() {
    let backend = FakeBackend::with(|s| s.sign_out_error = Some("offline".into()));
    assert!(matches!(sign_out(&backend).await, Err(Error::Session(_))));
  }

  #[tokio::test]
  async fn require_session_without_session_is_not_signed_in() {
    let backend = FakeBackend::new();
    assert!(matches!(require_session(&backend).await, Err(Error::NotSignedIn)));
  }
}
