//! Pure eligibility rules.
//!
//! Every reward kind is evaluated as a pure function over the profile, the
//! current instant, and the schedule — no I/O, no clocks. The engine owns the
//! side-effecting commit that follows a granted decision.

use chrono::{DateTime, Utc};
use perk_core::{elapsed_hours, remaining_whole_hours, Coins, DayKey, RewardSchedule};
use std::collections::BTreeMap;

use crate::profile::IdentityProfile;

/// Why an action was refused right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refusal {
    /// Human-readable reason, returned to the caller verbatim.
    pub reason: String,
    /// Whole hours until the action can succeed, where a cooldown applies.
    pub retry_after_hours: Option<u64>,
}

impl Refusal {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            retry_after_hours: None,
        }
    }

    fn with_wait(reason: impl Into<String>, hours: u64) -> Self {
        Self {
            reason: reason.into(),
            retry_after_hours: Some(hours),
        }
    }
}

/// One-time welcome bonus.
pub fn welcome(profile: &IdentityProfile, schedule: &RewardSchedule) -> Result<Coins, Refusal> {
    if profile.welcome_granted {
        return Err(Refusal::new("welcome bonus already granted"));
    }
    Ok(schedule.welcome)
}

/// Once per UTC calendar date, regardless of elapsed hours.
pub fn check_in(
    profile: &IdentityProfile,
    now: DateTime<Utc>,
    schedule: &RewardSchedule,
) -> Result<Coins, Refusal> {
    if let Some(prev) = profile.last_check_in {
        if DayKey::from_datetime(prev) == DayKey::from_datetime(now) {
            return Err(Refusal::new("already checked in today"));
        }
    }
    Ok(schedule.check_in)
}

/// Arm a new mining cycle. Grants no coins; only gated by the cooldown since
/// the previous start.
pub fn mine_start(
    profile: &IdentityProfile,
    now: DateTime<Utc>,
    schedule: &RewardSchedule,
) -> Result<(), Refusal> {
    if let Some(last) = profile.last_mine_time {
        let cooldown = schedule.mining_cooldown_hours;
        if elapsed_hours(last, now) < cooldown as f64 {
            let wait = remaining_whole_hours(last, now, cooldown);
            return Err(Refusal::with_wait(
                format!("mining cooldown: try again in {} hours", wait),
                wait,
            ));
        }
    }
    Ok(())
}

/// Claim an armed, matured mining cycle.
pub fn mine_claim(
    profile: &IdentityProfile,
    now: DateTime<Utc>,
    schedule: &RewardSchedule,
) -> Result<Coins, Refusal> {
    let last = match (profile.mining_ready, profile.last_mine_time) {
        (true, Some(last)) => last,
        _ => return Err(Refusal::new("mining not ready: start mining first")),
    };
    let cooldown = schedule.mining_cooldown_hours;
    if elapsed_hours(last, now) < cooldown as f64 {
        let wait = remaining_whole_hours(last, now, cooldown);
        return Err(Refusal::with_wait(
            format!("still mining: wait {} more hours", wait),
            wait,
        ));
    }
    Ok(schedule.mining)
}

/// Immediate settlement of a game score.
///
/// The daily cap is a trigger threshold checked against the pre-submission
/// total, not a clamp: once below the cap, the full computed amount settles
/// even if the resulting total overshoots it.
pub fn score_submission(
    profile: &IdentityProfile,
    now: DateTime<Utc>,
    game_kind: &str,
    coins: Coins,
    schedule: &RewardSchedule,
) -> Result<Coins, Refusal> {
    let today = DayKey::from_datetime(now);
    let settled = profile.game_earnings.balance(today, game_kind);
    if settled >= schedule.daily_game_cap {
        return Err(Refusal::new(format!(
            "daily earning limit reached for {}: try again tomorrow",
            game_kind
        )));
    }
    Ok(coins)
}

/// Batched claim of today's pending rewards: the summed total plus the
/// per-kind breakdown to report back to the caller.
pub fn pending_claim(
    profile: &IdentityProfile,
    now: DateTime<Utc>,
) -> Result<(Coins, BTreeMap<String, Coins>), Refusal> {
    let today = DayKey::from_datetime(now);
    let total = profile.pending_rewards.day_total(today);
    if total == 0 {
        return Err(Refusal::new("no pending game rewards to claim"));
    }
    Ok((total, profile.pending_rewards.day_breakdown(today)))
}
