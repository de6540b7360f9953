use async_trait::async_trait;
use dashmap::DashMap;
use perk_core::WalletAddress;

use crate::profile::IdentityProfile;

/// Profile-store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("profile already exists: {0}")]
    AlreadyExists(WalletAddress),

    #[error("no stored profile for {0}")]
    Missing(WalletAddress),

    #[error("version conflict for {wallet}: submitted {submitted}, stored {stored}")]
    VersionConflict {
        wallet: WalletAddress,
        submitted: u64,
        stored: u64,
    },

    #[error("corrupt profile record: {0}")]
    Corrupt(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Durable store of per-wallet reward state.
///
/// `update` is a compare-and-swap on `profile.version`: the write lands only
/// if the stored version still matches the one the caller read, and the
/// stored copy then carries `version + 1`. This is what makes concurrent
/// read-modify-write sequences over one profile lose no updates.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn fetch(&self, wallet: &WalletAddress) -> Result<Option<IdentityProfile>, StoreError>;

    /// Create a profile that must not already exist.
    async fn insert(&self, profile: IdentityProfile) -> Result<(), StoreError>;

    /// Conditionally replace a profile (CAS on `version`).
    async fn update(&self, profile: IdentityProfile) -> Result<(), StoreError>;
}

/// In-memory profile store over `DashMap`.
///
/// Backs tests and ephemeral deployments; the durable deployment uses the
/// RocksDB store in the node crate.
pub struct MemoryStore {
    profiles: DashMap<String, IdentityProfile>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            profiles: DashMap::new(),
        }
    }

    /// Number of stored profiles.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn fetch(&self, wallet: &WalletAddress) -> Result<Option<IdentityProfile>, StoreError> {
        Ok(self.profiles.get(wallet.as_str()).map(|p| p.clone()))
    }

    async fn insert(&self, profile: IdentityProfile) -> Result<(), StoreError> {
        match self.profiles.entry(profile.wallet.as_str().to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(StoreError::AlreadyExists(profile.wallet.clone()))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(profile);
                Ok(())
            }
        }
    }

    async fn update(&self, profile: IdentityProfile) -> Result<(), StoreError> {
        match self.profiles.entry(profile.wallet.as_str().to_string()) {
            dashmap::mapref::entry::Entry::Occupied(mut slot) => {
                let stored = slot.get().version;
                if stored != profile.version {
                    return Err(StoreError::VersionConflict {
                        wallet: profile.wallet.clone(),
                        submitted: profile.version,
                        stored,
                    });
                }
                let mut next = profile;
                next.version += 1;
                slot.insert(next);
                Ok(())
            }
            dashmap::mapref::entry::Entry::Vacant(_) => {
                Err(StoreError::Missing(profile.wallet.clone()))
            }
        }
    }
}
