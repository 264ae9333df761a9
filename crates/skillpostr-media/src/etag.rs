//! Entity tags for stored objects.
//!
//! Objects are write-once, so the SHA-256 of the content is a strong
//! validator for the lifetime of the key.

/// The quoted ETag for an object with the given hex content hash.
pub fn etag_for(content_hash: &str) -> String { format!("\"{content_hash}\"") }

/// Whether an `If-None-Match` header value matches `etag`.
///
/// Accepts `*`, comma-separated lists, unquoted tags, and weak (`W/`)
/// tags, which compare equal under the weak comparison GET uses.
pub fn if_none_match(header: &str, etag: &str) -> bool {
  let ours = strip(etag);
  header.split(',').map(str::trim).any(|candidate| {
    candidate == "*" || strip(candidate) == ours
  })
}

fn strip(tag: &str) -> &str {
  let tag = tag.strip_prefix("W/").unwrap_or(tag);
  tag.trim_matches('"')
}
