//! [`SqliteStore`] — the SQLite implementation of [`Backend`].

use std::{path::Path, sync::Arc};

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, SubsecRound as _, Utc};
use rand_core::{OsRng, RngCore as _};
use rusqlite::{ErrorCode, OptionalExtension as _};
use sha2::{Digest, Sha256};
use skillpostr_core::{
  backend::Backend,
  post::{NewPost, Post},
  profile::{Profile, ProfileFields},
  session::{Credentials, Session},
  storage::ObjectUpload,
};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    RawPost, RawProfile, RawSession, decode_dt, encode_category, encode_dt,
    encode_uuid,
  },
  schema::SCHEMA,
};

/// Shortest password accepted at sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

// ─── Options ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct StoreOptions {
  /// Prefix of every public object URL; the media server must answer here.
  pub public_base_url: String,
  /// Lifetime of a newly opened session.
  pub session_ttl:     Duration,
  /// Cost parameters for password hashing.
  pub argon2_params:   argon2::Params,
}

impl Default for StoreOptions {
  fn default() -> Self {
    Self {
      public_base_url: "http://localhost:8790".to_string(),
      session_ttl:     Duration::days(7),
      argon2_params:   argon2::Params::default(),
    }
  }
}

// ─── Stored object ───────────────────────────────────────────────────────────

/// An object as read back for serving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
  pub bucket:       String,
  pub key:          String,
  pub content_type: String,
  /// SHA-256 of `bytes`, lowercase hex.
  pub content_hash: String,
  pub bytes:        Vec<u8>,
  pub created_at:   DateTime<Utc>,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A SkillPostr backend stored in a single SQLite file.
///
/// The store also plays the client role for identity: it remembers the token
/// of the session it opened (or was handed via [`restore_session`]) and
/// reports that session from [`Backend::current_session`].
///
/// Clones share the connection and the current-session slot.
///
/// [`restore_session`]: SqliteStore::restore_session
#[derive(Clone)]
pub struct SqliteStore {
  conn:    tokio_rusqlite::Connection,
  options: Arc<StoreOptions>,
  current: Arc<RwLock<Option<String>>>,
}

/// Store timestamps at the precision the columns keep, so values read back
/// compare equal to the ones returned on write.
fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
  matches!(e, rusqlite::Error::SqliteFailure(f, _) if f.code == ErrorCode::ConstraintViolation)
}

fn normalize_email(raw: &str) -> Result<String> {
  let email = raw.trim().to_lowercase();
  match email.split_once('@') {
    Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
    _ => Err(Error::InvalidEmail(raw.to_owned())),
  }
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn, options).await
  }

  /// Open an in-memory store with default options.
  pub async fn open_in_memory() -> Result<Self> {
    Self::open_in_memory_with(StoreOptions::default()).await
  }

  /// Open an in-memory store with custom options.
  pub async fn open_in_memory_with(options: StoreOptions) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn, options).await
  }

  async fn init(conn: tokio_rusqlite::Connection, options: StoreOptions) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(Self {
      conn,
      options: Arc::new(options),
      current: Arc::new(RwLock::new(None)),
    })
  }

  // ── Client session slot ─────────────────────────────────────────────────

  /// Adopt a previously issued session token (e.g. persisted by a CLI), or
  /// forget the current one without revoking it.
  pub async fn restore_session(&self, token: Option<String>) {
    *self.current.write().await = token;
  }

  /// The token of the session this store currently holds.
  pub async fn session_token(&self) -> Option<String> {
    self.current.read().await.clone()
  }

  // ── Objects ─────────────────────────────────────────────────────────────

  pub fn public_url(&self, bucket: &str, key: &str) -> String {
    format!(
      "{}/objects/{bucket}/{key}",
      self.options.public_base_url.trim_end_matches('/')
    )
  }

  /// Read an object back. Returns `None` if `(bucket, key)` was never written.
  pub async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<StoredObject>> {
    let bucket = bucket.to_owned();
    let key = key.to_owned();

    let raw: Option<(String, String, String, Vec<u8>, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT bucket, object_key, content_type, data, created_at
               FROM objects WHERE bucket = ?1 AND object_key = ?2",
              rusqlite::params![bucket, key],
              |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(|(bucket, key, content_type, bytes, created_at)| {
        Ok(StoredObject {
          content_hash: hex::encode(Sha256::digest(&bytes)),
          created_at: decode_dt(&created_at)?,
          bucket,
          key,
          content_type,
          bytes,
        })
      })
      .transpose()
  }

  // ── Helpers ─────────────────────────────────────────────────────────────

  fn argon2(&self) -> Argon2<'static> {
    Argon2::new(
      argon2::Algorithm::Argon2id,
      argon2::Version::V0x13,
      self.options.argon2_params.clone(),
    )
  }

  fn hash_password(&self, password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    self
      .argon2()
      .hash_password(password.as_bytes(), &salt)
      .map(|h| h.to_string())
      .map_err(|e| Error::PasswordHash(e.to_string()))
  }

  fn verify_password(&self, password: &str, phc: &str) -> Result<bool> {
    let parsed = PasswordHash::new(phc).map_err(|e| Error::PasswordHash(e.to_string()))?;
    Ok(self.argon2().verify_password(password.as_bytes(), &parsed).is_ok())
  }

  /// Issue a session for `user_id`, persist it, and make it current.
  async fn open_session(&self, user_id: Uuid, email: String) -> Result<Session> {
    let mut raw_token = [0u8; 32];
    OsRng.fill_bytes(&mut raw_token);

    let created_at = now();
    let session = Session {
      user_id,
      email,
      access_token: URL_SAFE_NO_PAD.encode(raw_token),
      created_at,
      expires_at: created_at + self.options.session_ttl,
    };

    let token_str   = session.access_token.clone();
    let user_id_str = encode_uuid(user_id);
    let created_str = encode_dt(session.created_at);
    let expires_str = encode_dt(session.expires_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (token, user_id, created_at, expires_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![token_str, user_id_str, created_str, expires_str],
        )?;
        Ok(())
      })
      .await?;

    *self.current.write().await = Some(session.access_token.clone());
    debug!(user_id = %user_id, "session opened");
    Ok(session)
  }
}

// ─── Backend impl ────────────────────────────────────────────────────────────

impl Backend for SqliteStore {
  type Error = Error;

  // ── Identity ──────────────────────────────────────────────────────────────

  async fn sign_up(&self, credentials: Credentials) -> Result<Session> {
    let email = normalize_email(&credentials.email)?;
    if credentials.password.chars().count() < MIN_PASSWORD_LEN {
      return Err(Error::WeakPassword { min: MIN_PASSWORD_LEN });
    }
    let password_hash = self.hash_password(&credentials.password)?;

    let user_id     = Uuid::new_v4();
    let user_id_str = encode_uuid(user_id);
    let email_str   = email.clone();
    let at_str      = encode_dt(now());

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        match tx.execute(
          "INSERT INTO users (user_id, email, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![user_id_str, email_str, password_hash, at_str],
        ) {
          Ok(_) => {}
          Err(e) if is_constraint_violation(&e) => return Ok(false),
          Err(e) => return Err(e.into()),
        }
        // The profile row exists from the start; onboarding fills it in.
        tx.execute(
          "INSERT INTO profiles (id, updated_at) VALUES (?1, ?2)",
          rusqlite::params![user_id_str, at_str],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::EmailTaken(email));
    }
    info!(user_id = %user_id, "account created");
    self.open_session(user_id, email).await
  }

  async fn sign_in(&self, credentials: Credentials) -> Result<Session> {
    let email     = credentials.email.trim().to_lowercase();
    let email_str = email.clone();

    let row: Option<(String, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, password_hash FROM users WHERE email = ?1",
              rusqlite::params![email_str],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?,
        )
      })
      .await?;

    let Some((user_id_str, phc)) = row else {
      return Err(Error::InvalidCredentials);
    };
    if !self.verify_password(&credentials.password, &phc)? {
      return Err(Error::InvalidCredentials);
    }
    self.open_session(Uuid::parse_str(&user_id_str)?, email).await
  }

  async fn sign_out(&self) -> Result<()> {
    let Some(token) = self.current.write().await.take() else {
      return Ok(());
    };
    self
      .conn
      .call(move |conn| {
        conn.execute("DELETE FROM sessions WHERE token = ?1", rusqlite::params![token])?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn current_session(&self) -> Result<Option<Session>> {
    let Some(token) = self.current.read().await.clone() else {
      return Ok(None);
    };

    let raw: Option<RawSession> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT s.token, s.user_id, u.email, s.created_at, s.expires_at
               FROM sessions s
               JOIN users u ON u.user_id = s.user_id
               WHERE s.token = ?1",
              rusqlite::params![token],
              |row| {
                Ok(RawSession {
                  token:      row.get(0)?,
                  user_id:    row.get(1)?,
                  email:      row.get(2)?,
                  created_at: row.get(3)?,
                  expires_at: row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    let Some(session) = raw.map(RawSession::into_session).transpose()? else {
      return Ok(None);
    };
    if session.is_expired_at(Utc::now()) {
      debug!(user_id = %session.user_id, "held session has expired");
      return Ok(None);
    }
    Ok(Some(session))
  }

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
    let id_str = encode_uuid(user_id);

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, name, avatar_url, bio, location, updated_at
               FROM profiles WHERE id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawProfile {
                  id:         row.get(0)?,
                  name:       row.get(1)?,
                  avatar_url: row.get(2)?,
                  bio:        row.get(3)?,
                  location:   row.get(4)?,
                  updated_at: row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn upsert_profile(&self, user_id: Uuid, fields: ProfileFields) -> Result<Profile> {
    let profile = Profile {
      id:         user_id,
      name:       fields.name,
      avatar_url: fields.avatar_url,
      bio:        fields.bio,
      location:   fields.location,
      updated_at: now(),
    };

    let id_str     = encode_uuid(user_id);
    let name       = profile.name.clone();
    let avatar_url = profile.avatar_url.clone();
    let bio        = profile.bio.clone();
    let location   = profile.location.clone();
    let at_str     = encode_dt(profile.updated_at);

    let written: bool = self
      .conn
      .call(move |conn| {
        let result = conn.execute(
          "INSERT INTO profiles (id, name, avatar_url, bio, location, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT (id) DO UPDATE SET
             name       = excluded.name,
             avatar_url = excluded.avatar_url,
             bio        = excluded.bio,
             location   = excluded.location,
             updated_at = excluded.updated_at",
          rusqlite::params![id_str, name, avatar_url, bio, location, at_str],
        );
        match result {
          Ok(_) => Ok(true),
          Err(e) if is_constraint_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !written {
      return Err(Error::UserNotFound(user_id));
    }
    Ok(profile)
  }

  // ── Posts ─────────────────────────────────────────────────────────────────

  async fn list_posts(&self) -> Result<Vec<Post>> {
    let raws: Vec<RawPost> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, title, description, image_url, category, author_id, created_at
           FROM posts
           ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawPost {
              id:          row.get(0)?,
              title:       row.get(1)?,
              description: row.get(2)?,
              image_url:   row.get(3)?,
              category:    row.get(4)?,
              author_id:   row.get(5)?,
              created_at:  row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPost::into_post).collect()
  }

  async fn create_post(&self, author_id: Uuid, input: NewPost) -> Result<Post> {
    let created_at = now();

    let title        = input.title.clone();
    let description  = input.description.clone();
    let image_url    = input.image_url.clone();
    let category_str = encode_category(input.category).to_owned();
    let author_str   = encode_uuid(author_id);
    let at_str       = encode_dt(created_at);

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let result = conn.execute(
          "INSERT INTO posts (title, description, image_url, category, author_id, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![title, description, image_url, category_str, author_str, at_str],
        );
        match result {
          Ok(_) => Ok(Some(conn.last_insert_rowid())),
          Err(e) if is_constraint_violation(&e) => Ok(None),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    let id = id.ok_or(Error::UserNotFound(author_id))?;
    Ok(Post {
      id,
      title: input.title,
      description: input.description,
      image_url: input.image_url,
      category: input.category,
      author_id,
      created_at,
    })
  }

  // ── Objects ───────────────────────────────────────────────────────────────

  async fn upload_object(&self, upload: ObjectUpload) -> Result<String> {
    let ObjectUpload { bucket, key, content_type, bytes } = upload;
    let url = self.public_url(&bucket, &key);

    let content_hash = hex::encode(Sha256::digest(&bytes));
    let size         = bytes.len() as i64;
    let at_str       = encode_dt(now());
    let bucket_str   = bucket.clone();
    let key_str      = key.clone();

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let result = conn.execute(
          "INSERT INTO objects
             (bucket, object_key, content_type, content_hash, size, data, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![bucket_str, key_str, content_type, content_hash, size, bytes, at_str],
        );
        match result {
          Ok(_) => Ok(true),
          Err(e) if is_constraint_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      return Err(Error::ObjectExists { bucket, key });
    }
    debug!(bucket = %bucket, key = %key, size, "object stored");
    Ok(url)
  }
}
