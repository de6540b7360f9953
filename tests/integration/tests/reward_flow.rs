//! Integration test: full reward lifecycle across crates.
//!
//! Drives the engine through welcome bonus, daily check-in, a mining cycle,
//! score settlement, and a batched pending claim, asserting what actually
//! landed on the settlement rail at every step.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use perk_core::{DayKey, RewardSchedule, WalletAddress};
use perk_rewards::{MemoryStore, ProfileStore, RewardEngine, RewardError};
use perk_settlement::adapters::internal::InternalRail;

fn wallet() -> WalletAddress {
    WalletAddress::new("0xf00df00df00df00df00df00df00df00df00df00d").unwrap()
}

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

/// Helper: engine over a fresh memory store and a well-funded internal rail.
fn setup() -> (Arc<RewardEngine>, Arc<MemoryStore>, Arc<InternalRail>) {
    let store = Arc::new(MemoryStore::new());
    let rail = Arc::new(InternalRail::new(1_000_000));
    let engine = Arc::new(RewardEngine::new(
        store.clone(),
        rail.clone(),
        RewardSchedule::default(),
    ));
    (engine, store, rail)
}

// =========================================================================
// Full lifecycle: one wallet through every reward kind
// =========================================================================

#[tokio::test]
async fn test_full_reward_lifecycle() {
    let (engine, _store, rail) = setup();
    let w = wallet();

    // Welcome bonus provisions the profile and pays 25.
    let bonus = engine.welcome_bonus(&w).await.expect("welcome bonus");
    assert!(bonus.tx_hash.starts_with("0x"));
    assert_eq!(rail.balance_of(&w), 25);

    // Day 1: check in, arm mining.
    engine.daily_check_in_at(&w, noon()).await.expect("check-in");
    assert_eq!(rail.balance_of(&w), 27);

    engine.start_mining_at(&w, noon()).await.expect("mine start");

    // Settle a couple of scores for two game kinds.
    let score = engine
        .submit_score_at(&w, "snake", 155.0, noon())
        .await
        .expect("score");
    assert_eq!(score.coins_earned, 15);
    engine
        .submit_score_at(&w, "tetris", 80.0, noon())
        .await
        .expect("score");
    assert_eq!(rail.balance_of(&w), 27 + 15 + 8);

    // Accrue pending instead of settling, then claim the batch.
    engine
        .accrue_pending_at(&w, "snake", 100.0, noon())
        .await
        .expect("accrue");
    engine
        .accrue_pending_at(&w, "tetris", 60.0, noon())
        .await
        .expect("accrue");
    let claim = engine
        .claim_pending_at(&w, noon())
        .await
        .expect("claim pending");
    assert_eq!(claim.total_claimed, 16);
    assert_eq!(claim.breakdown.get("snake"), Some(&10));
    assert_eq!(claim.breakdown.get("tetris"), Some(&6));
    assert_eq!(rail.balance_of(&w), 50 + 16);

    // Day 2, 25 hours on: the mining cycle has matured.
    let next_day = noon() + Duration::hours(25);
    let mined = engine
        .claim_mining_at(&w, next_day)
        .await
        .expect("mine claim");
    assert_eq!(mined.amount, 5);
    assert_eq!(rail.balance_of(&w), 66 + 5);

    // Check-in works again on the new calendar date.
    engine
        .daily_check_in_at(&w, next_day)
        .await
        .expect("next-day check-in");
    assert_eq!(rail.balance_of(&w), 71 + 2);

    // Stats reflect only the current day.
    let stats = engine.game_stats_at(&w, next_day).await.expect("stats");
    assert_eq!(stats.total_earned_today, 0);
    assert_eq!(stats.total_pending, 0);
}

// =========================================================================
// The documented cap-overshoot boundary
// =========================================================================

#[tokio::test]
async fn test_cap_overshoot_boundary_end_to_end() {
    let (engine, store, rail) = setup();
    let w = wallet();
    engine.welcome_bonus(&w).await.unwrap();

    // Seed the day at exactly 95 settled coins for "snake".
    let mut profile = store.fetch(&w).await.unwrap().expect("profile exists");
    profile
        .game_earnings
        .credit(DayKey::from_datetime(noon()), "snake", 95);
    store.update(profile).await.unwrap();

    // 95 < 100: a 10-coin submission passes and the total becomes 105.
    let receipt = engine
        .submit_score_at(&w, "snake", 100.0, noon())
        .await
        .expect("pre-cap submission");
    assert_eq!(receipt.coins_earned, 10);
    assert_eq!(receipt.today_total, 105);

    // 105 >= 100: the next submission is refused and nothing settles.
    let transfers = rail.transfer_count();
    let err = engine
        .submit_score_at(&w, "snake", 10.0, noon())
        .await
        .unwrap_err();
    assert!(matches!(err, RewardError::Ineligible { .. }));
    assert_eq!(rail.transfer_count(), transfers);
}

// =========================================================================
// Timeouts surface as failed actions with no record mutation
// =========================================================================

#[tokio::test]
async fn test_timed_out_settlement_mutates_nothing() {
    use perk_settlement::{DeadlineRail, TransferError};
    use std::time::Duration as StdDuration;

    let store = Arc::new(MemoryStore::new());
    let rail = Arc::new(DeadlineRail::new(
        Arc::new(StalledRail),
        StdDuration::from_millis(20),
    ));
    let engine = RewardEngine::new(store.clone(), rail, RewardSchedule::default());
    store
        .insert(perk_rewards::IdentityProfile::new(wallet()))
        .await
        .unwrap();

    let err = engine.daily_check_in_at(&wallet(), noon()).await.unwrap_err();
    assert!(matches!(
        err,
        RewardError::Transfer(TransferError::Timeout(_))
    ));

    let profile = store.fetch(&wallet()).await.unwrap().unwrap();
    assert!(profile.last_check_in.is_none());
}

/// A rail that never answers within a test deadline.
struct StalledRail;

#[async_trait::async_trait]
impl perk_settlement::ITokenRail for StalledRail {
    async fn transfer(
        &self,
        recipient: &WalletAddress,
        amount: perk_core::Coins,
    ) -> Result<perk_settlement::TransferReceipt, perk_settlement::TransferError> {
        tokio::time::sleep(std::time::Duration::from_secs(60)).await;
        Ok(perk_settlement::TransferReceipt {
            transfer_id: perk_settlement::TransferId::new(),
            rail_id: "rail-stalled".to_string(),
            recipient: recipient.clone(),
            amount,
            tx_hash: "0x0".to_string(),
            confirmed_at: Utc::now(),
        })
    }

    fn rail_id(&self) -> &str {
        "rail-stalled"
    }
}
