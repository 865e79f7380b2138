//! Badge types, one reputation record per user.
//!
//! A badge's tier normally follows from its contribution count, but an
//! administrator may pin any tier. The tier is stored, never derived at read
//! time, so a pinned tier survives until the next recomputation.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator as _, IntoStaticStr};

use crate::{Error, Result, UserId};

// ─── Tier ────────────────────────────────────────────────────────────────────

/// Ordered reputation level. `Bronze` is the floor.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Tier {
  #[default]
  Bronze,
  Silver,
  Gold,
  Platinum,
}

impl Tier {
  /// Contribution count at which a badge reaches this tier.
  pub const fn threshold(self) -> u32 {
    match self {
      Self::Bronze => 0,
      Self::Silver => 20,
      Self::Gold => 50,
      Self::Platinum => 100,
    }
  }

  /// The tier a badge with `count` contributions earns.
  pub fn for_count(count: u32) -> Self {
    Self::iter()
      .rev()
      .find(|tier| count >= tier.threshold())
      .unwrap_or_default()
  }

  /// Parse a tier name, ignoring ASCII case.
  pub fn parse(name: &str) -> Result<Self> {
    Self::from_str(name.trim()).map_err(|_| Error::UnknownTier(name.to_owned()))
  }
}

// ─── Badge ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
  pub user_id:            UserId,
  pub tier:               Tier,
  pub contribution_count: u32,
  /// Set once, when the record is first created.
  pub awarded_at:         DateTime<Utc>,
  pub updated_at:         DateTime<Utc>,
}

impl Badge {
  /// A fresh `Bronze` badge with no contributions.
  pub fn initial(user_id: UserId, now: DateTime<Utc>) -> Self {
    Self {
      user_id,
      tier: Tier::Bronze,
      contribution_count: 0,
      awarded_at: now,
      updated_at: now,
    }
  }

  /// Re-derive `tier` from `contribution_count`. Returns the previous tier.
  pub fn recompute_tier(&mut self, now: DateTime<Utc>) -> Tier {
    let previous = self.tier;
    self.tier = Tier::for_count(self.contribution_count);
    self.updated_at = now;
    previous
  }
}

// ─── Stats ───────────────────────────────────────────────────────────────────

/// Number of badges currently held at each tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeStats {
  pub bronze_count:   u64,
  pub silver_count:   u64,
  pub gold_count:     u64,
  pub platinum_count: u64,
}

impl BadgeStats {
  pub fn tally<'a>(badges: impl IntoIterator<Item = &'a Badge>) -> Self {
    badges.into_iter().fold(Self::default(), |mut stats, badge| {
      match badge.tier {
        Tier::Bronze => stats.bronze_count += 1,
        Tier::Silver => stats.silver_count += 1,
        Tier::Gold => stats.gold_count += 1,
        Tier::Platinum => stats.platinum_count += 1,
      }
      stats
    })
  }
}
