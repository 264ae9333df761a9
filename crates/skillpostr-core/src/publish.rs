//! Publishing posts with an optional image.

use tracing::{info, warn};

use crate::{
  Error, Result,
  auth::require_session,
  backend::Backend,
  post::{NewPost, Post},
  storage::{ImageUpload, POST_IMAGES_BUCKET, upload_image},
};

/// Publish `post` as the current user.
///
/// The image, if any, is uploaded before the row is written and its public
/// URL becomes `image_url`. A failed upload creates no post.
pub async fn publish_post<B: Backend>(
  backend: &B,
  mut post: NewPost,
  image: Option<ImageUpload>,
) -> Result<Post> {
  let session = require_session(backend).await?;

  if let Some(image) = image {
    post.image_url = Some(upload_image(backend, image, POST_IMAGES_BUCKET).await?);
  }

  let created = backend
    .create_post(session.user_id, post)
    .await
    .map_err(|e| {
      warn!(user_id = %session.user_id, error = %e, "post write failed");
      Error::PostWrite(Box::new(e))
    })?;

  info!(post_id = created.id, author_id = %created.author_id, "post published");
  Ok(created)
}
