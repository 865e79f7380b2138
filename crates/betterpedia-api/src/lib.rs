//! JSON REST API for Betterpedia discussions and reputation.
//!
//! Exposes an axum [`Router`] backed by any store that implements both
//! [`CommentStore`] and [`BadgeStore`]. Authentication happens upstream;
//! this layer only reads the identity headers described in [`identity`].
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", betterpedia_api::api_router(store.clone()))
//! ```

pub mod badges;
pub mod comments;
pub mod error;
pub mod extract;
pub mod identity;
pub mod listings;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use betterpedia_core::{
  ReputationService, ThreadService,
  store::{BadgeStore, CommentStore},
};

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub threads: Arc<ThreadService<S, S>>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self { Self { threads: Arc::clone(&self.threads) } }
}

impl<S> AppState<S>
where
  S: CommentStore + BadgeStore + Clone,
{
  /// Wire both services over one backing store.
  pub fn new(store: S) -> Self {
    let reputation = ReputationService::new(store.clone());
    Self { threads: Arc::new(ThreadService::new(store, reputation)) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: S) -> Router<()>
where
  S: CommentStore + BadgeStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Comments
    .route("/comments", post(comments::create::<S>))
    .route("/comments/replies", post(comments::reply::<S>))
    .route(
      "/comments/{id}",
      get(comments::get_one::<S>)
        .put(comments::edit::<S>)
        .delete(comments::delete::<S>),
    )
    .route("/comments/{id}/replies", get(comments::replies::<S>))
    // Listings
    .route("/articles/{id}/comments", get(listings::article_comments::<S>))
    .route("/articles/{id}/comments/top-level", get(listings::article_top_level::<S>))
    .route("/articles/{id}/comments/count", get(listings::article_count::<S>))
    .route("/users/{id}/comments", get(listings::user_comments::<S>))
    .route("/users/{id}/comments/count", get(listings::user_count::<S>))
    // Badges
    .route("/badges", get(badges::list::<S>))
    .route("/badges/me", get(badges::mine::<S>))
    .route("/badges/stats", get(badges::stats::<S>))
    .route("/badges/tiers/{tier}", get(badges::by_tier::<S>))
    .route("/badges/users/{id}", get(badges::for_user::<S>))
    // Administration
    .route("/admin/badges/{id}", axum::routing::delete(badges::delete::<S>))
    .route("/admin/badges/{id}/tier", put(badges::set_tier::<S>))
    .route("/admin/badges/{id}/contributions", put(badges::set_contributions::<S>))
    .with_state(AppState::new(store))
}

// ─── Integration tests ────────────────────────────────────────────────────────
