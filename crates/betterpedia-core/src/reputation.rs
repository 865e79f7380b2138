//! [`ReputationService`]: contribution tracking and tier management.
//!
//! Two ways to change a tier coexist:
//!
//! - [`ReputationService::increment_contribution`] and
//!   [`ReputationService::set_contribution_count`] always re-derive the tier
//!   from the new count.
//! - [`ReputationService::set_tier`] pins a tier without touching the count.
//!   The pin holds until the next re-derivation.

use chrono::Utc;
use tracing::{debug, info};

use crate::{
  Error, Result, UserId,
  badge::{Badge, BadgeStats, Tier},
  error::from_store,
  store::BadgeStore,
};

#[derive(Debug, Clone)]
pub struct ReputationService<B> {
  store: B,
}

impl<B: BadgeStore> ReputationService<B> {
  pub fn new(store: B) -> Self { Self { store } }

  /// Return the user's badge, creating a `Bronze`/0 record on first access.
  pub async fn get_or_initialize(&self, user_id: UserId) -> Result<Badge> {
    if let Some(badge) = self.store.find_by_user(user_id).await.map_err(from_store)? {
      return Ok(badge);
    }
    let badge = self
      .store
      .insert_if_absent(Badge::initial(user_id, Utc::now()))
      .await
      .map_err(from_store)?;
    debug!(user_id, "initialised badge");
    Ok(badge)
  }

  /// The user's badge, if one has been created. Never initialises.
  pub async fn badge_for(&self, user_id: UserId) -> Result<Option<Badge>> {
    self.store.find_by_user(user_id).await.map_err(from_store)
  }

  /// Count one more contribution and re-derive the tier.
  pub async fn increment_contribution(&self, user_id: UserId) -> Result<Badge> {
    let now = Utc::now();
    let badge = self
      .modify(user_id, move |badge| {
        badge.contribution_count = badge.contribution_count.saturating_add(1);
        badge.recompute_tier(now);
      })
      .await?;

    if badge.tier != Tier::Bronze
      && badge.contribution_count == badge.tier.threshold()
    {
      info!(user_id, tier = %badge.tier, "badge promoted");
    }
    Ok(badge)
  }

  /// Administrative override: pin `tier`, leaving the count untouched.
  pub async fn set_tier(&self, user_id: UserId, tier: Tier) -> Result<Badge> {
    let now = Utc::now();
    let badge = self
      .modify(user_id, move |badge| {
        badge.tier = tier;
        badge.updated_at = now;
      })
      .await?;
    info!(user_id, %tier, count = badge.contribution_count, "tier set by administrator");
    Ok(badge)
  }

  /// Administrative override: replace the count and re-derive the tier.
  pub async fn set_contribution_count(
    &self,
    user_id: UserId,
    count: i64,
  ) -> Result<Badge> {
    let count = u32::try_from(count).map_err(|_| {
      Error::Validation(format!(
        "contribution count must be between 0 and {}, got {count}",
        u32::MAX
      ))
    })?;

    let now = Utc::now();
    let badge = self
      .modify(user_id, move |badge| {
        badge.contribution_count = count;
        badge.recompute_tier(now);
      })
      .await?;
    info!(user_id, count, tier = %badge.tier, "contribution count set by administrator");
    Ok(badge)
  }

  /// Hard-delete the user's badge. Returns `false` if none existed.
  pub async fn delete_badge(&self, user_id: UserId) -> Result<bool> {
    let deleted = self.store.delete(user_id).await.map_err(from_store)?;
    if deleted {
      info!(user_id, "badge deleted");
    }
    Ok(deleted)
  }

  /// Every badge, highest contribution count first.
  pub async fn all_badges(&self) -> Result<Vec<Badge>> {
    self
      .store
      .list_all_ordered_by_contribution()
      .await
      .map_err(from_store)
  }

  pub async fn badges_by_tier(&self, tier: Tier) -> Result<Vec<Badge>> {
    self.store.list_by_tier(tier).await.map_err(from_store)
  }

  /// Count badges per tier with a full scan.
  pub async fn stats(&self) -> Result<BadgeStats> {
    let badges = self.store.list_all().await.map_err(from_store)?;
    Ok(BadgeStats::tally(&badges))
  }

  async fn modify<F>(&self, user_id: UserId, f: F) -> Result<Badge>
  where
    F: FnOnce(&mut Badge) + Send + 'static,
  {
    self.store.upsert_with(user_id, f).await.map_err(from_store)
  }
}
