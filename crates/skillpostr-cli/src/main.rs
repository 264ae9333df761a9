//! `skillpostr` — command-line client for SkillPostr.
//!
//! # Usage
//!
//! ```
//! skillpostr sign-up --email alice@example.com
//! skillpostr profile save --name Alice --avatar ./me.png
//! skillpostr post --title "Hiring" --description "Two roles" --category business
//! skillpostr feed
//! ```

mod client;
mod commands;
mod render;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{Client, Settings};
use serde::Deserialize;
use skillpostr_core::{post::Category, retry::RetryPolicy};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "skillpostr", about = "Share skills and browse the SkillPostr feed")]
struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", env = "SKILLPOSTR_CONFIG")]
  config: Option<PathBuf>,

  /// SQLite store to use (default: ~/.local/share/skillpostr/skillpostr.db).
  #[arg(long, value_name = "PATH", env = "SKILLPOSTR_STORE")]
  store: Option<PathBuf>,

  /// Where the session token is kept between invocations.
  #[arg(long, value_name = "PATH", env = "SKILLPOSTR_SESSION_FILE")]
  session_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Create an account and sign in.
  SignUp(CredentialArgs),
  /// Sign in to an existing account.
  SignIn(CredentialArgs),
  /// Revoke the current session.
  SignOut,
  /// Print where the current session should land.
  Route,
  /// Show the feed, newest first.
  Feed {
    /// Print JSON instead of text.
    #[arg(long)]
    json: bool,
  },
  /// Show or edit profiles.
  #[command(subcommand)]
  Profile(ProfileCommand),
  /// Publish a post.
  Post {
    #[arg(long)]
    title:       String,
    #[arg(long)]
    description: String,
    /// Tech, Business or Lifestyle.
    #[arg(long, default_value_t = Category::default())]
    category:    Category,
    /// Image file to attach.
    #[arg(long, value_name = "PATH")]
    image:       Option<PathBuf>,
  },
}

#[derive(clap::Args, Debug)]
struct CredentialArgs {
  #[arg(long)]
  email:    String,
  /// Prompted for when omitted.
  #[arg(long, env = "SKILLPOSTR_PASSWORD", hide_env_values = true)]
  password: Option<String>,
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
  /// Show a profile card (your own when no id is given).
  Show { user_id: Option<Uuid> },
  /// Update your profile. Fields not given keep their current value.
  Save {
    #[arg(long)]
    name:     Option<String>,
    #[arg(long)]
    bio:      Option<String>,
    #[arg(long)]
    location: Option<String>,
    /// Image file to upload as the avatar.
    #[arg(long, value_name = "PATH")]
    avatar:   Option<PathBuf>,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
  store_path:       Option<PathBuf>,
  session_file:     Option<PathBuf>,
  public_base_url:  Option<String>,
  resolve_attempts: Option<u32>,
  resolve_delay_ms: Option<u64>,
}

const DEFAULT_STORE_PATH: &str = "~/.local/share/skillpostr/skillpostr.db";
const DEFAULT_SESSION_FILE: &str = "~/.local/share/skillpostr/session";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8790";

/// CLI flags override config file, which overrides defaults.
fn settings(args: &Args, file_cfg: ConfigFile) -> Settings {
  let policy = RetryPolicy::new(
    file_cfg.resolve_attempts.unwrap_or(RetryPolicy::DEFAULT_ATTEMPTS),
    file_cfg
      .resolve_delay_ms
      .map(Duration::from_millis)
      .unwrap_or(RetryPolicy::DEFAULT_DELAY),
  );

  Settings {
    store_path: args
      .store
      .clone()
      .or(file_cfg.store_path)
      .unwrap_or_else(|| DEFAULT_STORE_PATH.into()),
    session_file: args
      .session_file
      .clone()
      .or(file_cfg.session_file)
      .unwrap_or_else(|| DEFAULT_SESSION_FILE.into()),
    public_base_url: file_cfg
      .public_base_url
      .unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_string()),
    policy,
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  // Logs on stderr; stdout carries command output.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  let client = Client::open(settings(&args, file_cfg)).await?;

  match args.command {
    Command::SignUp(c) => commands::sign_up(&client, c.email, c.password).await,
    Command::SignIn(c) => commands::sign_in(&client, c.email, c.password).await,
    Command::SignOut => commands::sign_out(&client).await,
    Command::Route => commands::route(&client).await,
    Command::Feed { json } => commands::feed(&client, json).await,
    Command::Profile(ProfileCommand::Show { user_id }) => {
      commands::show_profile(&client, user_id).await
    }
    Command::Profile(ProfileCommand::Save { name, bio, location, avatar }) => {
      let edits = commands::ProfileEdits { name, bio, location };
      commands::save_profile(&client, edits, avatar).await
    }
    Command::Post { title, description, category, image } => {
      commands::post(&client, title, description, category, image).await
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn args_are_well_formed() {
    <Args as clap::CommandFactory>::command().debug_assert();
  }

  #[test]
  fn flags_override_file_which_overrides_defaults() {
    let args = Args::parse_from(["skillpostr", "--store", "/tmp/flag.db", "route"]);
    let file_cfg: ConfigFile = toml::from_str(
      r#"
        store_path = "/tmp/file.db"
        session_file = "/tmp/file-session"
        resolve_attempts = 3
        resolve_delay_ms = 50
      "#,
    )
    .unwrap();

    let s = settings(&args, file_cfg);
    assert_eq!(s.store_path, PathBuf::from("/tmp/flag.db"));
    assert_eq!(s.session_file, PathBuf::from("/tmp/file-session"));
    assert_eq!(s.public_base_url, DEFAULT_PUBLIC_BASE_URL);
    assert_eq!(s.policy, RetryPolicy::new(3, Duration::from_millis(50)));
  }

  #[test]
  fn defaults_apply_without_file() {
    let args = Args::parse_from(["skillpostr", "feed", "--json"]);
    let s = settings(&args, ConfigFile::default());
    assert_eq!(s.store_path, PathBuf::from(DEFAULT_STORE_PATH));
    assert_eq!(s.policy, RetryPolicy::default());
    assert!(matches!(args.command, Command::Feed { json: true }));
  }

  #[test]
  fn category_flag_is_case_insensitive() {
    let args = Args::parse_from([
      "skillpostr", "post", "--title", "t", "--description", "d", "--category", "lifestyle",
    ]);
    assert!(matches!(args.command, Command::Post { category: Category::Lifestyle, .. }));
  }

  #[test]
  fn unknown_config_keys_are_rejected() {
    assert!(toml::from_str::<ConfigFile>("colour = \"red\"").is_err());
  }
}
