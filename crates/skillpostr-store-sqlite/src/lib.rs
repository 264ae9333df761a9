//! SQLite backend for SkillPostr.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. [`SqliteStore`] implements the whole
//! [`skillpostr_core::backend::Backend`] contract: accounts and sessions,
//! profiles, posts, and object storage.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{SqliteStore, StoreOptions, StoredObject};
