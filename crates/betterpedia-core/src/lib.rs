//! Core types, store traits, and services for Betterpedia discussions and
//! reputation.
//!
//! This crate has no HTTP or database dependencies.
//! Storage backends implement [`store::CommentStore`] and
//! [`store::BadgeStore`]; everything else talks to [`ThreadService`] and
//! [`ReputationService`].

// Store impls use native `async fn` against `Send` trait signatures.
#![allow(async_fn_in_trait)]

pub mod badge;
pub mod comment;
pub mod error;
pub mod identity;
pub mod reputation;
pub mod store;
pub mod thread;

pub use error::{Error, ErrorKind, Result};
pub use reputation::ReputationService;
pub use thread::ThreadService;

/// Opaque user identifier supplied by the identity layer.
pub type UserId = i64;

/// Opaque article identifier supplied by the wiki layer.
pub type ArticleId = i64;
