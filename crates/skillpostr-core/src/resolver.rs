//! Post-authentication routing.
//!
//! After a sign-in or sign-up the session may take a moment to become
//! visible. [`SessionResolver`] polls for it under a [`RetryPolicy`], then
//! checks whether the user still has to finish onboarding.
//!
//! Resolution never fails: an exhausted poll is [`Destination::AuthRequired`],
//! and a failed profile read sends the user to onboarding.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
  backend::Backend,
  lookup::Lookup,
  retry::RetryPolicy,
  session::Session,
};

/// Where the user should land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
  /// No session could be observed; the user must sign in.
  AuthRequired,
  /// Signed in, but the profile has no display name yet.
  OnboardingRequired,
  /// Signed in with a complete profile.
  FeedReady,
}

impl Destination {
  pub fn as_str(self) -> &'static str {
    match self {
      Destination::AuthRequired => "auth_required",
      Destination::OnboardingRequired => "onboarding_required",
      Destination::FeedReady => "feed_ready",
    }
  }
}

impl fmt::Display for Destination {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// The full outcome of a resolution run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
  pub destination: Destination,
  /// Number of session probes that ran.
  pub attempts:    u32,
  /// The session that was observed, if any.
  pub session:     Option<Session>,
}

pub struct SessionResolver<'a, B> {
  backend: &'a B,
  policy:  RetryPolicy,
}

impl<'a, B: Backend> SessionResolver<'a, B> {
  pub fn new(backend: &'a B, policy: RetryPolicy) -> Self {
    Self { backend, policy }
  }

  pub async fn resolve_destination(&self) -> Destination {
    self.resolve().await.destination
  }

  pub async fn resolve(&self) -> Resolution {
    let backend = self.backend;
    let polled = self
      .policy
      .poll(move |attempt| async move {
        match Lookup::from_result(backend.current_session().await) {
          Lookup::Found(session) => Some(session),
          Lookup::NotFound => {
            debug!(attempt, "no session visible yet");
            None
          }
          Lookup::TransientError(reason) => {
            warn!(attempt, %reason, "session probe failed; counting as absent");
            None
          }
        }
      })
      .await;

    let Some(session) = polled.value else {
      info!(attempts = polled.attempts, "no session observed; sign-in required");
      return Resolution {
        destination: Destination::AuthRequired,
        attempts:    polled.attempts,
        session:     None,
      };
    };

    let profile = Lookup::from_result(backend.get_profile(session.user_id).await);
    let destination = match &profile {
      Lookup::Found(p) if p.is_onboarded() => Destination::FeedReady,
      Lookup::Found(_) | Lookup::NotFound => Destination::OnboardingRequired,
      Lookup::TransientError(reason) => {
        warn!(user_id = %session.user_id, %reason, "profile read failed; routing to onboarding");
        Destination::OnboardingRequired
      }
    };

    debug!(
      user_id = %session.user_id,
      attempts = polled.attempts,
      profile = profile.kind(),
      %destination,
      "destination resolved"
    );

    Resolution { destination, attempts: polled.attempts, session: Some(session) }
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use tokio::time::Instant;
  use uuid::Uuid;

  use super::*;
  use crate::testing::{FakeBackend, profile, session_for};

  const DELAY: Duration = Duration::from_millis(300);

  fn policy() -> RetryPolicy { RetryPolicy::new(5, DELAY) }

  fn signed_in(visible_from: u32, name: Option<&str>) -> FakeBackend {
    let user_id = Uuid::new_v4();
    let name = name.map(str::to_owned);
    FakeBackend::with(move |s| {
      s.session = Some(session_for(user_id, "alice@example.com"));
      s.session_visible_from = visible_from;
      s.profiles.insert(user_id, profile(user_id, name.as_deref()));
    })
  }

  #[tokio::test(start_paused = true)]
  async fn never_visible_session_requires_auth_after_all_attempts() {
    let backend = FakeBackend::new();
    let start = Instant::now();

    let resolution = SessionResolver::new(&backend, policy()).resolve().await;

    assert_eq!(resolution.destination, Destination::AuthRequired);
    assert_eq!(resolution.attempts, 5);
    assert_eq!(backend.state().session_polls, 5);
    let waited = start.elapsed();
    assert!(waited >= DELAY * 4 && waited < DELAY * 5, "waited {waited:?}");
  }

  #[tokio::test(start_paused = true)]
  async fn stops_polling_once_the_session_appears() {
    for k in 1..=5 {
      let backend = signed_in(k, Some("Alice"));
      let resolution = SessionResolver::new(&backend, policy()).resolve().await;

      assert_eq!(resolution.attempts, k);
      assert_eq!(backend.state().session_polls, k);
      assert_eq!(resolution.destination, Destination::FeedReady);
    }
  }

  #[tokio::test(start_paused = true)]
  async fn empty_name_on_third_attempt_routes_to_onboarding() {
    let backend = signed_in(3, Some(""));

    let resolution = SessionResolver::new(&backend, policy()).resolve().await;

    assert_eq!(resolution.destination, Destination::OnboardingRequired);
    assert_eq!(resolution.attempts, 3);
  }

  #[tokio::test(start_paused = true)]
  async fn missing_name_or_missing_profile_routes_to_onboarding() {
    let backend = signed_in(1, None);
    assert_eq!(
      SessionResolver::new(&backend, policy()).resolve_destination().await,
      Destination::OnboardingRequired
    );

    let user_id = Uuid::new_v4();
    let backend = FakeBackend::with(|s| {
      s.session = Some(session_for(user_id, "bob@example.com"));
    });
    assert_eq!(
      SessionResolver::new(&backend, policy()).resolve_destination().await,
      Destination::OnboardingRequired
    );
  }

  #[tokio::test(start_paused = true)]
  async fn transport_errors_do_not_abort_the_poll() {
    let backend = signed_in(1, Some("Alice"));
    backend.state().session_errors_on = vec![1, 2];

    let resolution = SessionResolver::new(&backend, policy()).resolve().await;

    assert_eq!(resolution.attempts, 3);
    assert_eq!(resolution.destination, Destination::FeedReady);
  }

  #[tokio::test(start_paused = true)]
  async fn failing_profile_read_routes_to_onboarding() {
    let backend = signed_in(1, Some("Alice"));
    let user_id = backend.state().session.as_ref().unwrap().user_id;
    backend.state().failing_profiles.insert(user_id);

    let destination = SessionResolver::new(&backend, policy()).resolve_destination().await;
    assert_eq!(destination, Destination::OnboardingRequired);
  }

  #[tokio::test(start_paused = true)]
  async fn attempt_bound_is_configurable() {
    let backend = FakeBackend::new();
    let start = Instant::now();

    let resolution =
      SessionResolver::new(&backend, RetryPolicy::new(2, Duration::from_millis(50)))
        .resolve()
        .await;

    assert_eq!(resolution.destination, Destination::AuthRequired);
    assert_eq!(resolution.attempts, 2);
    assert_eq!(start.elapsed(), Duration::from_millis(50));
  }
}
