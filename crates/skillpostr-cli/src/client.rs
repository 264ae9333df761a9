//! The local client: an opened store plus the persisted session token.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use skillpostr_core::retry::RetryPolicy;
use skillpostr_store_sqlite::{SqliteStore, StoreOptions};
use tracing::debug;

/// Resolved client settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
  pub store_path:      PathBuf,
  pub session_file:    PathBuf,
  pub public_base_url: String,
  pub policy:          RetryPolicy,
}

/// An opened store whose current session was restored from disk.
pub struct Client {
  pub store:    SqliteStore,
  pub policy:   RetryPolicy,
  session_file: PathBuf,
}

impl Client {
  pub async fn open(settings: Settings) -> Result<Self> {
    let store_path = expand_tilde(&settings.store_path);
    ensure_parent(&store_path)?;

    let options = StoreOptions {
      public_base_url: settings.public_base_url,
      ..StoreOptions::default()
    };
    let store = SqliteStore::open(&store_path, options)
      .await
      .with_context(|| format!("failed to open store at {}", store_path.display()))?;

    let session_file = expand_tilde(&settings.session_file);
    let token = read_token(&session_file)?;
    debug!(restored = token.is_some(), "session token loaded");
    store.restore_session(token).await;

    Ok(Self { store, policy: settings.policy, session_file })
  }

  /// Write the store's current token to the session file, or remove the file
  /// when there is none.
  pub async fn persist_session(&self) -> Result<()> {
    match self.store.session_token().await {
      Some(token) => write_token(&self.session_file, &token),
      None => remove_token(&self.session_file),
    }
  }
}

// ─── Session file ────────────────────────────────────────────────────────────

fn read_token(path: &Path) -> Result<Option<String>> {
  match std::fs::read_to_string(path) {
    Ok(raw) => {
      let token = raw.trim();
      Ok((!token.is_empty()).then(|| token.to_owned()))
    }
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
    Err(e) => Err(e).with_context(|| format!("reading session file {}", path.display())),
  }
}

fn write_token(path: &Path, token: &str) -> Result<()> {
  ensure_parent(path)?;
  std::fs::write(path, format!("{token}\n"))
    .with_context(|| format!("writing session file {}", path.display()))?;
  restrict_permissions(path)
}

fn remove_token(path: &Path) -> Result<()> {
  match std::fs::remove_file(path) {
    Ok(()) => Ok(()),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
    Err(e) => Err(e).with_context(|| format!("removing session file {}", path.display())),
  }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
  use std::os::unix::fs::PermissionsExt as _;
  std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
    .with_context(|| format!("restricting permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> { Ok(()) }

fn ensure_parent(path: &Path) -> Result<()> {
  match path.parent() {
    Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir)
      .with_context(|| format!("creating directory {}", dir.display())),
    _ => Ok(()),
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
