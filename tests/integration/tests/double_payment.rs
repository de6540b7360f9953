//! Integration test: no double-payment under racing requests.
//!
//! Every mutating operation for one wallet must serialize against itself:
//! N tasks racing the same eligibility window produce exactly one settled
//! transfer, and bookkeeping deltas are never lost.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use perk_core::{DayKey, RewardSchedule, WalletAddress};
use perk_rewards::{IdentityProfile, MemoryStore, ProfileStore, RewardEngine};
use perk_settlement::adapters::internal::InternalRail;

const RACERS: usize = 16;

fn wallet() -> WalletAddress {
    WalletAddress::new("0xbeefbeefbeefbeefbeefbeefbeefbeefbeefbeef").unwrap()
}

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

#[tokio::test]
async fn test_concurrent_welcome_bonus_pays_once() {
    let (engine, _store, rail) = setup();

    let mut handles = Vec::new();
    for _ in 0..RACERS {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine.welcome_bonus(&wallet()).await.is_ok()
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap() {
            successes += 1;
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(rail.transfer_count(), 1);
    assert_eq!(rail.balance_of(&wallet()), 25);
}

#[tokio::test]
async fn test_concurrent_check_in_pays_once() {
    let (engine, store, rail) = setup();
    store.insert(IdentityProfile::new(wallet())).await.unwrap();

    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let mut handles = Vec::new();
    for _ in 0..RACERS {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine.daily_check_in_at(&wallet(), now).await.is_ok()
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap() {
            successes += 1;
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(rail.transfer_count(), 1);
    assert_eq!(rail.balance_of(&wallet()), 2);
}

#[tokio::test]
async fn test_concurrent_mining_claim_pays_once() {
    let (engine, store, rail) = setup();

    let start = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let mut profile = IdentityProfile::new(wallet());
    profile.last_mine_time = Some(start);
    profile.mining_ready = true;
    store.insert(profile).await.unwrap();

    let now = start + Duration::hours(25);
    let mut handles = Vec::new();
    for _ in 0..RACERS {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine.claim_mining_at(&wallet(), now).await.is_ok()
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap() {
            successes += 1;
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(rail.transfer_count(), 1);
    assert_eq!(rail.balance_of(&wallet()), 5);

    let stored = store.fetch(&wallet()).await.unwrap().unwrap();
    assert!(!stored.mining_ready);
}

#[tokio::test]
async fn test_concurrent_pending_claim_pays_once() {
    let (engine, store, rail) = setup();

    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let mut profile = IdentityProfile::new(wallet());
    profile
        .pending_rewards
        .credit(DayKey::from_datetime(now), "snake", 40);
    store.insert(profile).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..RACERS {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine.claim_pending_at(&wallet(), now).await.is_ok()
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap() {
            successes += 1;
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(rail.transfer_count(), 1);
    assert_eq!(rail.balance_of(&wallet()), 40);
}

#[tokio::test]
async fn test_concurrent_accruals_lose_no_updates() {
    let (engine, store, _rail) = setup();
    store.insert(IdentityProfile::new(wallet())).await.unwrap();

    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let mut handles = Vec::new();
    for _ in 0..RACERS {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine
                .accrue_pending_at(&wallet(), "snake", 100.0, now)
                .await
                .expect("accrual")
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let stored = store.fetch(&wallet()).await.unwrap().unwrap();
    assert_eq!(
        stored.pending_rewards.day_total(DayKey::from_datetime(now)),
        (RACERS as u64) * 10
    );
}

#[tokio::test]
async fn test_concurrent_score_submissions_accumulate_exactly() {
    let (engine, store, rail) = setup();
    store.insert(IdentityProfile::new(wallet())).await.unwrap();

    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    // Eight racers of 10 coins each stay under the 100 cap, so all succeed.
    let mut handles = Vec::new();
    for _ in 0..8 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine
                .submit_score_at(&wallet(), "snake", 100.0, now)
                .await
                .expect("submission")
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(rail.transfer_count(), 8);
    assert_eq!(rail.balance_of(&wallet()), 80);
    let stored = store.fetch(&wallet()).await.unwrap().unwrap();
    assert_eq!(
        stored
            .game_earnings
            .balance(DayKey::from_datetime(now), "snake"),
        80
    );
}

#[tokio::test]
async fn test_different_wallets_do_not_serialize_against_each_other() {
    let (engine, store, rail) = setup();

    let other = WalletAddress::new("0xcafecafecafecafecafecafecafecafecafecafe").unwrap();
    store.insert(IdentityProfile::new(wallet())).await.unwrap();
    store.insert(IdentityProfile::new(other.clone())).await.unwrap();

    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let a = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.daily_check_in_at(&wallet(), now).await })
    };
    let b = {
        let engine = engine.clone();
        let other = other.clone();
        tokio::spawn(async move { engine.daily_check_in_at(&other, now).await })
    };

    a.await.unwrap().expect("wallet a check-in");
    b.await.unwrap().expect("wallet b check-in");
    assert_eq!(rail.transfer_count(), 2);
}
