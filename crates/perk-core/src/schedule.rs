use serde::{Deserialize, Serialize};

use crate::types::Coins;

/// The reward amounts, caps, and cooldowns the engine operates with.
///
/// Every field has a production default; deployments override individual
/// values through the node's TOML config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardSchedule {
    /// One-time welcome bonus.
    #[serde(default = "default_welcome")]
    pub welcome: Coins,
    /// Once-per-calendar-day check-in reward.
    #[serde(default = "default_check_in")]
    pub check_in: Coins,
    /// Reward for claiming a completed mining cycle.
    #[serde(default = "default_mining")]
    pub mining: Coins,
    /// Maximum settled coins per game kind per calendar day. Checked against
    /// the pre-submission total: a single submission may overshoot, after
    /// which further submissions for that kind and day are refused.
    #[serde(default = "default_daily_game_cap")]
    pub daily_game_cap: Coins,
    /// Coins earned per score point: `coins = floor(score * score_rate)`.
    #[serde(default = "default_score_rate")]
    pub score_rate: f64,
    /// Hours between mining starts, and from start to claim.
    #[serde(default = "default_mining_cooldown_hours")]
    pub mining_cooldown_hours: u32,
}

fn default_welcome() -> Coins {
    25
}
fn default_check_in() -> Coins {
    2
}
fn default_mining() -> Coins {
    5
}
fn default_daily_game_cap() -> Coins {
    100
}
fn default_score_rate() -> f64 {
    0.1
}
fn default_mining_cooldown_hours() -> u32 {
    24
}

impl Default for RewardSchedule {
    fn default() -> Self {
        Self {
            welcome: default_welcome(),
            check_in: default_check_in(),
            mining: default_mining(),
            daily_game_cap: default_daily_game_cap(),
            score_rate: default_score_rate(),
            mining_cooldown_hours: default_mining_cooldown_hours(),
        }
    }
}

impl RewardSchedule {
    /// Coins earned for a game score, floored.
    pub fn coins_for_score(&self, score: f64) -> Coins {
        (score * self.score_rate).floor() as Coins
    }
}
