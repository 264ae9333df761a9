//! Object uploads: bucket names, unique keys, content types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::{Error, Result, backend::Backend};

pub const AVATARS_BUCKET: &str = "avatars";
pub const POST_IMAGES_BUCKET: &str = "post-images";

/// An object ready to be written to storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectUpload {
  pub bucket:       String,
  pub key:          String,
  pub content_type: String,
  pub bytes:        Vec<u8>,
}

/// An image chosen by the user that has not been uploaded yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
  /// The original filename; kept as the tail of the storage key.
  pub filename: String,
  pub bytes:    Vec<u8>,
}

impl ImageUpload {
  pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
    Self { filename: filename.into(), bytes }
  }

  pub fn content_type(&self) -> &'static str { content_type_for(&self.filename) }

  /// Turn this image into an upload for `bucket` under a fresh unique key.
  pub fn into_object(self, bucket: &str) -> ObjectUpload {
    ObjectUpload {
      bucket:       bucket.to_owned(),
      key:          unique_key(&self.filename, Utc::now()),
      content_type: self.content_type().to_owned(),
      bytes:        self.bytes,
    }
  }
}

/// Build a storage key that no other upload will share.
///
/// Layout: `<unix nanos>-<8 random hex>-<sanitised filename>`. The timestamp
/// keeps keys roughly time-ordered; the random segment separates uploads that
/// land in the same nanosecond with the same filename.
pub fn unique_key(filename: &str, now: DateTime<Utc>) -> String {
  let nanos = now
    .timestamp_nanos_opt()
    .unwrap_or_else(|| now.timestamp_micros().saturating_mul(1_000));
  let nonce = Uuid::new_v4().simple().to_string();
  format!("{nanos}-{}-{}", &nonce[..8], sanitize_filename(filename))
}

/// Keep only the final path component and replace anything outside
/// `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_filename(filename: &str) -> String {
  let base = filename
    .rsplit(['/', '\\'])
    .next()
    .unwrap_or_default()
    .trim_start_matches('.');

  let cleaned: String = base
    .chars()
    .map(|c| {
      if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
        c
      } else {
        '_'
      }
    })
    .collect();

  if cleaned.is_empty() { "upload".to_owned() } else { cleaned }
}

/// Infer a MIME type from the filename extension.
pub fn content_type_for(filename: &str) -> &'static str {
  let ext = filename
    .rsplit_once('.')
    .map(|(_, ext)| ext.to_ascii_lowercase())
    .unwrap_or_default();
  match ext.as_str() {
    "png" => "image/png",
    "jpg" | "jpeg" => "image/jpeg",
    "gif" => "image/gif",
    "webp" => "image/webp",
    "avif" => "image/avif",
    "svg" => "image/svg+xml",
    _ => "application/octet-stream",
  }
}

/// Upload `image` into `bucket` and return its public URL.
pub(crate) async fn upload_image<B: Backend>(
  backend: &B,
  image: ImageUpload,
  bucket: &str,
) -> Result<String> {
  let upload = image.into_object(bucket);
  let key = upload.key.clone();
  backend.upload_object(upload).await.map_err(|e| {
    warn!(bucket, key = %key, error = %e, "image upload failed");
    Error::Upload { key, source: Box::new(e) }
  })
}
