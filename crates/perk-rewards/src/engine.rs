//! The reward engine: orchestrates eligibility evaluation, settlement, and
//! the profile update for every reward kind.
//!
//! Commit protocol: settle first, record second. A record-update failure
//! after a confirmed transfer surfaces as [`RewardError::Divergence`]: the
//! external ledger and the local eligibility state disagree until an
//! operator reconciles them.
//!
//! Concurrency: all mutating operations for one wallet run under that
//! wallet's mutex ([`IdentityLocks`]), covering the whole
//! read-evaluate-settle-update sequence. The settlement call is on the
//! critical path by construction; the rail handed to the engine is expected
//! to be deadline-bounded (see `perk_settlement::DeadlineRail`).

use chrono::{DateTime, Utc};
use perk_core::{Coins, CoreError, DayKey, RewardSchedule, WalletAddress};
use perk_settlement::{ITokenRail, TransferReceipt};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::RewardError;
use crate::locks::IdentityLocks;
use crate::profile::IdentityProfile;
use crate::rules;
use crate::store::ProfileStore;

/// Result of a settled fixed-amount reward (welcome, check-in, mining claim).
#[derive(Debug, Clone)]
pub struct IssueReceipt {
    pub tx_hash: String,
    pub amount: Coins,
}

/// Result of an immediate score settlement.
#[derive(Debug, Clone)]
pub struct ScoreReceipt {
    pub tx_hash: String,
    pub coins_earned: Coins,
    pub today_total: Coins,
}

/// Result of accruing coins for a later batched claim.
#[derive(Debug, Clone)]
pub struct AccrualReceipt {
    pub coins_earned: Coins,
    pub today_pending: Coins,
}

/// Result of claiming today's pending rewards in one transfer.
#[derive(Debug, Clone)]
pub struct PendingClaimReceipt {
    pub tx_hash: String,
    pub total_claimed: Coins,
    pub breakdown: BTreeMap<String, Coins>,
}

/// Read-only snapshot of a wallet's game bookkeeping for today.
#[derive(Debug, Clone)]
pub struct GameStats {
    pub today_earnings: BTreeMap<String, Coins>,
    pub today_pending: BTreeMap<String, Coins>,
    pub total_pending: Coins,
    pub total_earned_today: Coins,
}

/// The reward issuance engine.
pub struct RewardEngine {
    store: Arc<dyn ProfileStore>,
    rail: Arc<dyn ITokenRail>,
    schedule: RewardSchedule,
    locks: IdentityLocks,
}

impl RewardEngine {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        rail: Arc<dyn ITokenRail>,
        schedule: RewardSchedule,
    ) -> Self {
        Self {
            store,
            rail,
            schedule,
            locks: IdentityLocks::new(),
        }
    }

    /// The schedule this engine operates with.
    pub fn schedule(&self) -> &RewardSchedule {
        &self.schedule
    }

    // --- Welcome bonus ---

    /// One-time welcome bonus. Provisions a fresh profile for wallets this
    /// service has never seen; a repeat call is refused.
    pub async fn welcome_bonus(&self, wallet: &WalletAddress) -> Result<IssueReceipt, RewardError> {
        let lock = self.locks.lock_for(wallet);
        let _guard = lock.lock().await;

        let (mut profile, fresh) = match self.fetch(wallet).await? {
            Some(profile) => (profile, false),
            None => (IdentityProfile::new(wallet.clone()), true),
        };
        let amount = rules::welcome(&profile, &self.schedule)?;

        let receipt = self.rail.transfer(wallet, amount).await?;
        profile.welcome_granted = true;
        self.persist_paid(profile, fresh, &receipt).await?;

        tracing::info!(wallet = %wallet, amount, tx_hash = %receipt.tx_hash, "welcome bonus issued");
        Ok(IssueReceipt {
            tx_hash: receipt.tx_hash,
            amount,
        })
    }

    // --- Daily check-in ---

    pub async fn daily_check_in(&self, wallet: &WalletAddress) -> Result<IssueReceipt, RewardError> {
        self.daily_check_in_at(wallet, Utc::now()).await
    }

    pub async fn daily_check_in_at(
        &self,
        wallet: &WalletAddress,
        now: DateTime<Utc>,
    ) -> Result<IssueReceipt, RewardError> {
        let lock = self.locks.lock_for(wallet);
        let _guard = lock.lock().await;

        let mut profile = self.require_profile(wallet).await?;
        let amount = rules::check_in(&profile, now, &self.schedule)?;

        let receipt = self.rail.transfer(wallet, amount).await?;
        profile.last_check_in = Some(now);
        self.persist_paid(profile, false, &receipt).await?;

        tracing::info!(wallet = %wallet, amount, tx_hash = %receipt.tx_hash, "daily check-in rewarded");
        Ok(IssueReceipt {
            tx_hash: receipt.tx_hash,
            amount,
        })
    }

    // --- Mining ---

    /// Arm a new mining cycle. No settlement happens here.
    pub async fn start_mining(&self, wallet: &WalletAddress) -> Result<(), RewardError> {
        self.start_mining_at(wallet, Utc::now()).await
    }

    pub async fn start_mining_at(
        &self,
        wallet: &WalletAddress,
        now: DateTime<Utc>,
    ) -> Result<(), RewardError> {
        let lock = self.locks.lock_for(wallet);
        let _guard = lock.lock().await;

        let mut profile = self.require_profile(wallet).await?;
        rules::mine_start(&profile, now, &self.schedule)?;

        profile.last_mine_time = Some(now);
        profile.mining_ready = true;
        self.store.update(profile).await.map_err(RewardError::Store)?;

        tracing::info!(wallet = %wallet, "mining cycle armed");
        Ok(())
    }

    /// Claim a matured mining cycle. `last_mine_time` is left untouched so a
    /// fresh start can re-arm against the previous cycle's clock.
    pub async fn claim_mining(&self, wallet: &WalletAddress) -> Result<IssueReceipt, RewardError> {
        self.claim_mining_at(wallet, Utc::now()).await
    }

    pub async fn claim_mining_at(
        &self,
        wallet: &WalletAddress,
        now: DateTime<Utc>,
    ) -> Result<IssueReceipt, RewardError> {
        let lock = self.locks.lock_for(wallet);
        let _guard = lock.lock().await;

        let mut profile = self.require_profile(wallet).await?;
        let amount = rules::mine_claim(&profile, now, &self.schedule)?;

        let receipt = self.rail.transfer(wallet, amount).await?;
        profile.mining_ready = false;
        self.persist_paid(profile, false, &receipt).await?;

        tracing::info!(wallet = %wallet, amount, tx_hash = %receipt.tx_hash, "mining reward claimed");
        Ok(IssueReceipt {
            tx_hash: receipt.tx_hash,
            amount,
        })
    }

    // --- Game scores ---

    /// Settle a game score immediately, subject to the per-kind daily cap.
    pub async fn submit_score(
        &self,
        wallet: &WalletAddress,
        game_kind: &str,
        score: f64,
    ) -> Result<ScoreReceipt, RewardError> {
        self.submit_score_at(wallet, game_kind, score, Utc::now()).await
    }

    pub async fn submit_score_at(
        &self,
        wallet: &WalletAddress,
        game_kind: &str,
        score: f64,
        now: DateTime<Utc>,
    ) -> Result<ScoreReceipt, RewardError> {
        let game_kind = validated_game_kind(game_kind)?;
        let score = validated_score(score)?;

        let lock = self.locks.lock_for(wallet);
        let _guard = lock.lock().await;

        let mut profile = self.require_profile(wallet).await?;
        let coins = self.schedule.coins_for_score(score);
        rules::score_submission(&profile, now, game_kind, coins, &self.schedule)?;

        let receipt = self.rail.transfer(wallet, coins).await?;
        let today = DayKey::from_datetime(now);
        profile.game_earnings.credit(today, game_kind, coins);
        let today_total = profile.game_earnings.balance(today, game_kind);
        self.persist_paid(profile, false, &receipt).await?;

        tracing::info!(
            wallet = %wallet,
            game = game_kind,
            coins,
            today_total,
            tx_hash = %receipt.tx_hash,
            "game score settled"
        );
        Ok(ScoreReceipt {
            tx_hash: receipt.tx_hash,
            coins_earned: coins,
            today_total,
        })
    }

    /// Accrue coins for a later batched claim. No settlement, no cap check —
    /// pending coins are a separate accounting track.
    pub async fn accrue_pending(
        &self,
        wallet: &WalletAddress,
        game_kind: &str,
        score: f64,
    ) -> Result<AccrualReceipt, RewardError> {
        self.accrue_pending_at(wallet, game_kind, score, Utc::now()).await
    }

    pub async fn accrue_pending_at(
        &self,
        wallet: &WalletAddress,
        game_kind: &str,
        score: f64,
        now: DateTime<Utc>,
    ) -> Result<AccrualReceipt, RewardError> {
        let game_kind = validated_game_kind(game_kind)?;
        let score = validated_score(score)?;

        let lock = self.locks.lock_for(wallet);
        let _guard = lock.lock().await;

        let mut profile = self.require_profile(wallet).await?;
        let coins = self.schedule.coins_for_score(score);
        let today = DayKey::from_datetime(now);
        profile.pending_rewards.credit(today, game_kind, coins);
        let today_pending = profile.pending_rewards.day_total(today);
        self.store.update(profile).await.map_err(RewardError::Store)?;

        tracing::debug!(wallet = %wallet, game = game_kind, coins, today_pending, "pending reward accrued");
        Ok(AccrualReceipt {
            coins_earned: coins,
            today_pending,
        })
    }

    /// Claim all of today's pending rewards in a single transfer, then clear
    /// exactly today's entries.
    pub async fn claim_pending(
        &self,
        wallet: &WalletAddress,
    ) -> Result<PendingClaimReceipt, RewardError> {
        self.claim_pending_at(wallet, Utc::now()).await
    }

    pub async fn claim_pending_at(
        &self,
        wallet: &WalletAddress,
        now: DateTime<Utc>,
    ) -> Result<PendingClaimReceipt, RewardError> {
        let lock = self.locks.lock_for(wallet);
        let _guard = lock.lock().await;

        let mut profile = self.require_profile(wallet).await?;
        let (total, breakdown) = rules::pending_claim(&profile, now)?;

        let receipt = self.rail.transfer(wallet, total).await?;
        profile.pending_rewards.clear_day(DayKey::from_datetime(now));
        profile.last_game_reward_claim = Some(now);
        self.persist_paid(profile, false, &receipt).await?;

        tracing::info!(wallet = %wallet, total, tx_hash = %receipt.tx_hash, "pending rewards claimed");
        Ok(PendingClaimReceipt {
            tx_hash: receipt.tx_hash,
            total_claimed: total,
            breakdown,
        })
    }

    // --- Stats ---

    /// Read-only snapshot; takes no identity lock.
    pub async fn game_stats(&self, wallet: &WalletAddress) -> Result<GameStats, RewardError> {
        self.game_stats_at(wallet, Utc::now()).await
    }

    pub async fn game_stats_at(
        &self,
        wallet: &WalletAddress,
        now: DateTime<Utc>,
    ) -> Result<GameStats, RewardError> {
        let profile = self.require_profile(wallet).await?;
        let today = DayKey::from_datetime(now);
        Ok(GameStats {
            today_earnings: profile.game_earnings.day_breakdown(today),
            today_pending: profile.pending_rewards.day_breakdown(today),
            total_pending: profile.pending_rewards.day_total(today),
            total_earned_today: profile.game_earnings.day_total(today),
        })
    }

    // --- Internals ---

    async fn fetch(&self, wallet: &WalletAddress) -> Result<Option<IdentityProfile>, RewardError> {
        self.store.fetch(wallet).await.map_err(RewardError::Store)
    }

    async fn require_profile(&self, wallet: &WalletAddress) -> Result<IdentityProfile, RewardError> {
        self.fetch(wallet)
            .await?
            .ok_or_else(|| RewardError::UnknownWallet(wallet.clone()))
    }

    /// Persist a profile after a confirmed transfer. Any failure here means
    /// the ledger and the eligibility record now disagree.
    async fn persist_paid(
        &self,
        profile: IdentityProfile,
        fresh: bool,
        receipt: &TransferReceipt,
    ) -> Result<(), RewardError> {
        let wallet = profile.wallet.clone();
        let result = if fresh {
            self.store.insert(profile).await
        } else {
            self.store.update(profile).await
        };
        result.map_err(|source| {
            tracing::error!(
                wallet = %wallet,
                tx_hash = %receipt.tx_hash,
                error = %source,
                "transfer confirmed but profile update failed: ledger and eligibility state have diverged"
            );
            RewardError::Divergence {
                wallet,
                tx_hash: receipt.tx_hash.clone(),
                source,
            }
        })
    }
}

fn validated_game_kind(kind: &str) -> Result<&str, RewardError> {
    let trimmed = kind.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidGameKind("game kind must be non-empty".into()).into());
    }
    Ok(trimmed)
}

fn validated_score(score: f64) -> Result<f64, RewardError> {
    if !score.is_finite() || score <= 0.0 {
        return Err(CoreError::InvalidScore(format!(
            "score must be a positive number, got {}",
            score
        ))
        .into());
    }
    Ok(score)
}
