//! Plain-text rendering of command results.

use std::fmt::Write as _;

use skillpostr_core::{post::EnrichedPost, profile::Profile, resolver::Destination};

pub fn destination(destination: Destination) -> String {
  let hint = match destination {
    Destination::AuthRequired => "sign in with `skillpostr sign-in --email …`",
    Destination::OnboardingRequired => "set your name with `skillpostr profile save --name …`",
    Destination::FeedReady => "you're all set; try `skillpostr feed`",
  };
  format!("{destination}: {hint}")
}

pub fn feed(posts: &[EnrichedPost]) -> String {
  if posts.is_empty() {
    return "No posts yet.\n".to_string();
  }

  let mut out = String::new();
  for (i, p) in posts.iter().enumerate() {
    if i > 0 {
      out.push('\n');
    }
    let _ = writeln!(out, "#{} [{}] {}", p.post.id, p.post.category, p.post.title);
    let _ = writeln!(
      out,
      "  by {} on {}",
      p.author_display_name,
      p.post.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    for line in p.post.description.lines() {
      let _ = writeln!(out, "  {line}");
    }
    if let Some(url) = &p.post.image_url {
      let _ = writeln!(out, "  image: {url}");
    }
  }
  out
}

pub fn profile(profile: &Profile) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "{}", profile.display_name().unwrap_or("(no name yet)"));
  let _ = writeln!(out, "  id: {}", profile.id);
  for (label, value) in [
    ("bio", &profile.bio),
    ("location", &profile.location),
    ("avatar", &profile.avatar_url),
  ] {
    if let Some(value) = value {
      let _ = writeln!(out, "  {label}: {value}");
    }
  }
  out
}
