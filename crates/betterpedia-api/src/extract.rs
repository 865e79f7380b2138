//! Request extractors whose rejections go through [`ApiError`].
//!
//! axum's own `Json` and `Path` reject with 422 or plain-text 400 bodies.
//! These wrappers turn every malformed body or path segment into a
//! `400 {"error": ...}` like any other validation failure.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// A JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// A typed path parameter.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct PathParam<T>(pub T);
