//! Feed aggregation: posts joined with their authors' display names.
//!
//! Author lookups fan out concurrently on the calling task and are joined in
//! post order. A lookup that fails or finds nothing never drops the post; the
//! author is shown as [`UNKNOWN_AUTHOR`] instead.

use futures::future::join_all;
use tracing::{debug, warn};

use crate::{
  Error, Result,
  backend::Backend,
  lookup::Lookup,
  post::{EnrichedPost, Post, UNKNOWN_AUTHOR},
  profile::Profile,
};

pub struct FeedAggregator<'a, B> {
  backend: &'a B,
}

impl<'a, B: Backend> FeedAggregator<'a, B> {
  pub fn new(backend: &'a B) -> Self { Self { backend } }

  /// Load every post, newest first, with author names resolved.
  ///
  /// Only a failure to list the posts themselves is an error. Has no side
  /// effects on the store.
  pub async fn load_feed(&self) -> Result<Vec<EnrichedPost>> {
    let posts = self
      .backend
      .list_posts()
      .await
      .map_err(|e| Error::FeedUnavailable(Box::new(e)))?;

    let authors = join_all(posts.iter().map(|post| self.author_of(post))).await;

    let degraded = authors.iter().filter(|a| a.as_found().is_none()).count();
    debug!(posts = posts.len(), degraded, "feed aggregated");

    Ok(posts.into_iter().zip(authors).map(|(post, author)| enrich(post, author)).collect())
  }

  async fn author_of(&self, post: &Post) -> Lookup<Profile> {
    let lookup = Lookup::from_result(self.backend.get_profile(post.author_id).await);
    match &lookup {
      Lookup::Found(_) => {}
      Lookup::NotFound => {
        debug!(post_id = post.id, author_id = %post.author_id, "author has no profile");
      }
      Lookup::TransientError(reason) => {
        warn!(post_id = post.id, author_id = %post.author_id, %reason, "author lookup failed");
      }
    }
    lookup
  }
}

/// Attach the author's display name to `post`, falling back to
/// [`UNKNOWN_AUTHOR`] for any lookup that did not yield a non-empty name.
pub fn enrich(post: Post, author: Lookup<Profile>) -> EnrichedPost {
  let author_display_name = author
    .as_found()
    .and_then(Profile::display_name)
    .unwrap_or(UNKNOWN_AUTHOR)
    .to_owned();
  EnrichedPost { post, author_display_name }
}
