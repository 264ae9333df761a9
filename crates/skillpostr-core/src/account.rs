//! The signed-in user's own profile, and other users' profile cards.

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  auth::require_session,
  backend::Backend,
  profile::{Profile, ProfileFields},
  storage::{AVATARS_BUCKET, ImageUpload, upload_image},
};

/// Create or update the current user's profile.
///
/// When `avatar` is given it is uploaded first and its public URL replaces
/// `fields.avatar_url`. If the upload fails nothing is written.
pub async fn save_profile<B: Backend>(
  backend: &B,
  mut fields: ProfileFields,
  avatar: Option<ImageUpload>,
) -> Result<Profile> {
  let session = require_session(backend).await?;

  if let Some(image) = avatar {
    fields.avatar_url = Some(upload_image(backend, image, AVATARS_BUCKET).await?);
  }

  let profile = backend
    .upsert_profile(session.user_id, fields)
    .await
    .map_err(|e| {
      warn!(user_id = %session.user_id, error = %e, "profile write failed");
      Error::ProfileWrite(Box::new(e))
    })?;

  info!(user_id = %profile.id, onboarded = profile.is_onboarded(), "profile saved");
  Ok(profile)
}

/// The current user's profile, if the row exists.
pub async fn own_profile<B: Backend>(backend: &B) -> Result<Option<Profile>> {
  let session = require_session(backend).await?;
  backend
    .get_profile(session.user_id)
    .await
    .map_err(|e| Error::ProfileLookup(Box::new(e)))
}

/// Another user's profile, e.g. the author of a post in the feed.
pub async fn view_profile<B: Backend>(backend: &B, user_id: Uuid) -> Result<Profile> {
  backend
    .get_profile(user_id)
    .await
    .map_err(|e| Error::ProfileLookup(Box::new(e)))?
    .ok_or(Error::ProfileNotFound(user_id))
}
