//! Core types, the backend contract, and the client flows for SkillPostr.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Backends (e.g. `skillpostr-store-sqlite`) implement [`backend::Backend`];
//! front ends drive the flows in [`auth`], [`resolver`], [`feed`],
//! [`account`] and [`publish`].

pub mod account;
pub mod auth;
pub mod backend;
pub mod error;
pub mod feed;
pub mod lookup;
pub mod post;
pub mod profile;
pub mod publish;
pub mod resolver;
pub mod retry;
pub mod session;
pub mod storage;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
