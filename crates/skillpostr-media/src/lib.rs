//! HTTP object server for SkillPostr.
//!
//! Exposes an axum [`Router`] that serves uploaded avatars and post images
//! at the public URLs [`SqliteStore`] hands out:
//! `GET|HEAD /objects/{bucket}/{*key}`.

pub mod error;
pub mod etag;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::{Path, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
  routing::get,
};
use serde::Deserialize;
use skillpostr_store_sqlite::SqliteStore;
use tower_http::trace::TraceLayer;
use tracing::debug;

use etag::{etag_for, if_none_match};

/// Sent with every object response.
pub const CACHE_CONTROL: &str = "public, max-age=3600";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `MEDIA_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  pub store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8790 }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState {
  pub store: Arc<SqliteStore>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build an axum [`Router`] for the object server.
///
/// HEAD is answered by the GET handler; axum drops the body and keeps the
/// headers.
pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/objects/{bucket}/{*key}", get(object_handler))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

async fn object_handler(
  State(state): State<AppState>,
  Path((bucket, key)): Path<(String, String)>,
  headers: HeaderMap,
) -> Result<Response, Error> {
  let object = state
    .store
    .get_object(&bucket, &key)
    .await?
    .ok_or(Error::NotFound)?;

  let etag = etag_for(&object.content_hash);

  let not_modified = headers
    .get(header::IF_NONE_MATCH)
    .and_then(|v| v.to_str().ok())
    .is_some_and(|v| if_none_match(v, &etag));

  if not_modified {
    debug!(bucket = %bucket, key = %key, "object not modified");
    return Ok(
      (
        StatusCode::NOT_MODIFIED,
        [(header::ETAG, etag), (header::CACHE_CONTROL, CACHE_CONTROL.to_string())],
      )
        .into_response(),
    );
  }

  Ok(
    (
      StatusCode::OK,
      [
        (header::CONTENT_TYPE, object.content_type),
        (header::ETAG, etag),
        (header::CACHE_CONTROL, CACHE_CONTROL.to_string()),
      ],
      object.bytes,
    )
      .into_response(),
  )
}

// ─── Integration tests ────────────────────────────────────────────────────────
