//! One function per subcommand.

use std::{
  io::{self, BufRead, Write},
  path::Path,
};

use anyhow::{Context, Result, anyhow};
use skillpostr_core::{
  account,
  auth::{self, AuthAction},
  feed::FeedAggregator,
  post::{Category, NewPost},
  profile::ProfileFields,
  publish::publish_post,
  resolver::SessionResolver,
  session::Credentials,
  storage::ImageUpload,
};
use uuid::Uuid;

use crate::{client::Client, render};

// ─── Identity ────────────────────────────────────────────────────────────────

pub async fn sign_up(client: &Client, email: String, password: Option<String>) -> Result<()> {
  authenticate(client, AuthAction::SignUp, email, password).await
}

pub async fn sign_in(client: &Client, email: String, password: Option<String>) -> Result<()> {
  authenticate(client, AuthAction::SignIn, email, password).await
}

async fn authenticate(
  client: &Client,
  action: AuthAction,
  email: String,
  password: Option<String>,
) -> Result<()> {
  let password = match password {
    Some(p) => p,
    None => prompt_password()?,
  };
  let resolution = auth::authenticate(
    &client.store,
    action,
    Credentials::new(email, password),
    client.policy,
  )
  .await?;
  client.persist_session().await?;
  println!("{}", render::destination(resolution.destination));
  Ok(())
}

pub async fn sign_out(client: &Client) -> Result<()> {
  auth::sign_out(&client.store).await?;
  client.persist_session().await?;
  println!("Signed out.");
  Ok(())
}

pub async fn route(client: &Client) -> Result<()> {
  let destination = SessionResolver::new(&client.store, client.policy)
    .resolve_destination()
    .await;
  println!("{}", render::destination(destination));
  Ok(())
}

// ─── Feed ────────────────────────────────────────────────────────────────────

pub async fn feed(client: &Client, json: bool) -> Result<()> {
  let posts = FeedAggregator::new(&client.store).load_feed().await?;
  if json {
    println!("{}", serde_json::to_string_pretty(&posts).context("serialising feed")?);
  } else {
    print!("{}", render::feed(&posts));
  }
  Ok(())
}

// ─── Profiles ────────────────────────────────────────────────────────────────

pub async fn show_profile(client: &Client, user_id: Option<Uuid>) -> Result<()> {
  let profile = match user_id {
    Some(id) => account::view_profile(&client.store, id).await?,
    None => account::own_profile(&client.store)
      .await?
      .ok_or_else(|| anyhow!("no profile yet; run `skillpostr profile save --name …`"))?,
  };
  print!("{}", render::profile(&profile));
  Ok(())
}

/// Field edits from the command line; `None` keeps the stored value.
#[derive(Debug, Default)]
pub struct ProfileEdits {
  pub name:     Option<String>,
  pub bio:      Option<String>,
  pub location: Option<String>,
}

impl ProfileEdits {
  pub fn apply(self, mut fields: ProfileFields) -> ProfileFields {
    if self.name.is_some() {
      fields.name = self.name;
    }
    if self.bio.is_some() {
      fields.bio = self.bio;
    }
    if self.location.is_some() {
      fields.location = self.location;
    }
    fields
  }
}

pub async fn save_profile(
  client: &Client,
  edits: ProfileEdits,
  avatar: Option<impl AsRef<Path>>,
) -> Result<()> {
  let current = account::own_profile(&client.store).await?;
  let fields = edits.apply(current.as_ref().map(ProfileFields::from).unwrap_or_default());

  let avatar = match avatar {
    Some(path) => Some(read_image(path.as_ref()).await?),
    None => None,
  };

  let profile = account::save_profile(&client.store, fields, avatar).await?;
  print!("{}", render::profile(&profile));
  Ok(())
}

// ─── Posts ───────────────────────────────────────────────────────────────────

pub async fn post(
  client: &Client,
  title: String,
  description: String,
  category: Category,
  image: Option<impl AsRef<Path>>,
) -> Result<()> {
  let image = match image {
    Some(path) => Some(read_image(path.as_ref()).await?),
    None => None,
  };
  let post = publish_post(&client.store, NewPost::new(title, description, category), image).await?;
  println!("Published post #{}.", post.id);
  Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

async fn read_image(path: &Path) -> Result<ImageUpload> {
  let bytes = tokio::fs::read(path)
    .await
    .with_context(|| format!("reading image {}", path.display()))?;
  let filename = path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_default();
  Ok(ImageUpload::new(filename, bytes))
}

/// Read a password from stdin, prompting on stderr.
fn prompt_password() -> Result<String> {
  eprint!("Password: ");
  io::stderr().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line).context("reading password")?;
  Ok(line.trim_end_matches('\n').trim_end_matches('\r').to_string())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn edits_only_touch_given_fields() {
    let existing = ProfileFields {
      name:       Some("Alice".into()),
      avatar_url: Some("http://media.test/objects/avatars/a.png".into()),
      bio:        Some("Rustacean".into()),
      location:   None,
    };
    let edits = ProfileEdits { location: Some("Wonderland".into()), ..ProfileEdits::default() };

    let merged = edits.apply(existing.clone());
    assert_eq!(merged.name, existing.name);
    assert_eq!(merged.avatar_url, existing.avatar_url);
    assert_eq!(merged.bio, existing.bio);
    assert_eq!(merged.location.as_deref(), Some("Wonderland"));
  }

  #[test]
  fn edits_on_blank_profile() {
    let merged = ProfileEdits { name: Some("Bob".into()), ..ProfileEdits::default() }
      .apply(ProfileFields::default());
    assert_eq!(merged, ProfileFields { name: Some("Bob".into()), ..ProfileFields::default() });
  }
}
