//! Non-authoritative local copy of the resolved identity.

use crate::{KeyValueStore, SessionErrorResult};

use kuku_core::{Identity, Role};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

pub const PROFILE_KEY: &str = "user_profile";
pub const ROLE_KEY: &str = "user_role";
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Snapshot written after every successful remote fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedIdentitySnapshot {
    pub identity: Identity,
    pub cached_at: DateTime<Utc>,
    pub schema_version: u32,
}

/// Result of reading the cache. Distinguishes "nothing cached" from a
/// corrupted entry.
#[derive(Debug, Default)]
pub struct LoadResult {
    pub snapshot: Option<CachedIdentitySnapshot>,
    /// Cached role string, already normalised.
    pub role: Option<Role>,
    /// Present if the profile entry exists but could not be parsed
    pub corruption_error: Option<String>,
}

#[derive(Clone)]
pub struct IdentityCache {
    store: Arc<dyn KeyValueStore>,
}

impl IdentityCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn load(&self) -> SessionErrorResult<LoadResult> {
        let role = self
            .store
            .get(ROLE_KEY)?
            .map(|raw| Role::normalize(&raw));

        let Some(contents) = self.store.get(PROFILE_KEY)? else {
            debug!("No cached identity");
            return Ok(LoadResult {
                snapshot: None,
                role,
                corruption_error: None,
            });
        };

        match serde_json::from_str::<CachedIdentitySnapshot>(&contents) {
            Ok(snapshot) if snapshot.schema_version == SNAPSHOT_SCHEMA_VERSION => {
                info!(
                    "Loaded cached identity {} (cached at {})",
                    snapshot.identity.id, snapshot.cached_at
                );
                Ok(LoadResult {
                    snapshot: Some(snapshot),
                    role,
                    corruption_error: None,
                })
            }
            Ok(snapshot) => {
                warn!(
                    "Ignoring cached identity with schema v{} (expected v{})",
                    snapshot.schema_version, SNAPSHOT_SCHEMA_VERSION
                );
                Ok(LoadResult {
                    snapshot: None,
                    role,
                    corruption_error: Some(format!(
                        "unsupported schema version {}",
                        snapshot.schema_version
                    )),
                })
            }
            Err(e) => {
                warn!("Cached identity is corrupted: {e}");
                Ok(LoadResult {
                    snapshot: None,
                    role,
                    corruption_error: Some(e.to_string()),
                })
            }
        }
    }

    /// Writes both keys. Each key holds a complete value.
    pub fn save(&self, identity: &Identity, now: DateTime<Utc>) -> SessionErrorResult<()> {
        let snapshot = CachedIdentitySnapshot {
            identity: identity.clone(),
            cached_at: now,
            schema_version: SNAPSHOT_SCHEMA_VERSION,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        self.store.set(PROFILE_KEY, &json)?;
        self.store.set(ROLE_KEY, identity.role.as_str())?;

        debug!("Cached identity {} as {}", identity.id, identity.role);
        Ok(())
    }

    pub fn clear(&self) -> SessionErrorResult<()> {
        self.store.remove(PROFILE_KEY)?;
        self.store.remove(ROLE_KEY)?;
        debug!("Cleared cached identity");
        Ok(())
    }
}

impl std::fmt::Debug for IdentityCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityCache").finish_non_exhaustive()
    }
}
