use dashmap::DashMap;
use perk_core::WalletAddress;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Per-identity mutual exclusion.
///
/// The full read-evaluate-settle-update sequence for one wallet runs inside
/// that wallet's mutex; requests for different wallets never contend. The
/// settlement call sits inside the critical section because the commit
/// protocol settles before it writes, so holders may keep a lock for the
/// full rail latency.
pub struct IdentityLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl IdentityLocks {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// The mutex guarding a wallet, created on first use.
    pub fn lock_for(&self, wallet: &WalletAddress) -> Arc<Mutex<()>> {
        self.locks
            .entry(wallet.as_str().to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Number of wallets that have ever been locked.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl Default for IdentityLocks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet(byte: char) -> WalletAddress {
        WalletAddress::new(&format!("0x{}", byte.to_string().repeat(40))).unwrap()
    }

    #[tokio::test]
    async fn test_same_wallet_shares_a_mutex() {
        let locks = IdentityLocks::new();
        let a = locks.lock_for(&wallet('a'));
        let b = locks.lock_for(&wallet('a'));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(locks.len(), 1);
    }

    #[tokio::test]
    async fn test_different_wallets_do_not_contend() {
        let locks = IdentityLocks::new();
        let a = locks.lock_for(&wallet('a'));
        let b = locks.lock_for(&wallet('b'));

        let _held = a.lock().await;
        // Lock for a different wallet is immediately available.
        assert!(b.try_lock().is_ok());
    }

    #[tokio::test]
    async fn test_same_wallet_serializes() {
        let locks = IdentityLocks::new();
        let lock = locks.lock_for(&wallet('c'));
        let _held = lock.lock().await;
        assert!(locks.lock_for(&wallet('c')).try_lock().is_err());
    }
}
