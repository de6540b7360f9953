//! RocksDB-backed profile store.

use async_trait::async_trait;
use dashmap::DashMap;
use perk_core::WalletAddress;
use perk_rewards::{IdentityProfile, ProfileStore, StoreError};
use rocksdb::{ColumnFamilyDescriptor, Options, DB};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column family names.
const CF_PROFILES: &str = "profiles";
const CF_META: &str = "meta";

/// Durable profile store over RocksDB.
///
/// RocksDB has no native compare-and-swap, so each wallet's
/// read-compare-write runs under a per-key mutex; the version check on top
/// of that keeps writers outside this process honest.
pub struct RocksStore {
    db: DB,
    write_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl RocksStore {
    /// Open or create a RocksDB database at the given path.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(path)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_PROFILES, Options::default()),
            ColumnFamilyDescriptor::new(CF_META, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;

        Ok(Self {
            db,
            write_locks: DashMap::new(),
        })
    }

    fn write_lock(&self, wallet: &WalletAddress) -> Arc<Mutex<()>> {
        self.write_locks
            .entry(wallet.as_str().to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn read_profile(&self, wallet: &WalletAddress) -> Result<Option<IdentityProfile>, StoreError> {
        let cf = self
            .db
            .cf_handle(CF_PROFILES)
            .ok_or_else(|| StoreError::Backend("profiles column family not found".into()))?;
        let bytes = self
            .db
            .get_cf(&cf, wallet.as_str().as_bytes())
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        match bytes {
            Some(bytes) => {
                let profile = serde_json::from_slice(&bytes)
                    .map_err(|e| StoreError::Corrupt(e.to_string()))?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    fn write_profile(&self, profile: &IdentityProfile) -> Result<(), StoreError> {
        let cf = self
            .db
            .cf_handle(CF_PROFILES)
            .ok_or_else(|| StoreError::Backend("profiles column family not found".into()))?;
        let bytes =
            serde_json::to_vec(profile).map_err(|e| StoreError::Backend(e.to_string()))?;
        self.db
            .put_cf(&cf, profile.wallet.as_str().as_bytes(), bytes)
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

#[async_trait]
impl ProfileStore for RocksStore {
    async fn fetch(&self, wallet: &WalletAddress) -> Result<Option<IdentityProfile>, StoreError> {
        self.read_profile(wallet)
    }

    async fn insert(&self, profile: IdentityProfile) -> Result<(), StoreError> {
        let lock = self.write_lock(&profile.wallet);
        let _guard = lock.lock().await;

        if self.read_profile(&profile.wallet)?.is_some() {
            return Err(StoreError::AlreadyExists(profile.wallet.clone()));
        }
        self.write_profile(&profile)
    }

    async fn update(&self, profile: IdentityProfile) -> Result<(), StoreError> {
        let lock = self.write_lock(&profile.wallet);
        let _guard = lock.lock().await;

        let stored = self
            .read_profile(&profile.wallet)?
            .ok_or_else(|| StoreError::Missing(profile.wallet.clone()))?;
        if stored.version != profile.version {
            return Err(StoreError::VersionConflict {
                wallet: profile.wallet.clone(),
                submitted: profile.version,
                stored: stored.version,
            });
        }

        let mut next = profile;
        next.version += 1;
        self.write_profile(&next)
    }
}
