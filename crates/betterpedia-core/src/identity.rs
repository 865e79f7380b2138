//! The acting user, as resolved by whatever authenticates the request.
//!
//! The core never authenticates anyone. It trusts the two facts an outer
//! layer hands it: who is acting, and whether they administer the site.

use serde::{Deserialize, Serialize};

use crate::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
  pub user_id:  UserId,
  pub is_admin: bool,
}

impl Actor {
  pub fn user(user_id: UserId) -> Self { Self { user_id, is_admin: false } }

  pub fn admin(user_id: UserId) -> Self { Self { user_id, is_admin: true } }
}
