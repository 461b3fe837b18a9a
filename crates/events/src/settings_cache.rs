//! TTL cache over the organization settings read model.
//!
//! Entries are keyed by organization id and guarded by a single
//! `parking_lot::RwLock`. Concurrent readers share the lock; a refresh
//! takes it exclusively only to insert. A value may be up to one TTL stale.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use herald_core::types::DbId;
use herald_db::models::org_settings::OrgSettings;
use parking_lot::RwLock;

use crate::error::StoreError;
use crate::store::OrgSettingsReader;

/// Default entry lifetime.
pub const DEFAULT_SETTINGS_TTL: Duration = Duration::from_secs(300);

struct CachedSettings {
    /// `None` records that the organization has no settings row.
    settings: Option<OrgSettings>,
    expires_at: Instant,
}

/// Read-through cache for [`OrgSettings`].
pub struct OrgSettingsCache {
    reader: Arc<dyn OrgSettingsReader>,
    ttl: Duration,
    entries: RwLock<HashMap<DbId, CachedSettings>>,
}

impl OrgSettingsCache {
    pub fn new(reader: Arc<dyn OrgSettingsReader>, ttl: Duration) -> Self {
        Self {
            reader,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Settings for an organization, `None` when it has no settings row.
    ///
    /// Organization `0` never reaches the reader. A missing row is cached
    /// like any other value. Reader errors are returned and not cached.
    pub async fn get(&self, organization_id: DbId) -> Result<Option<OrgSettings>, StoreError> {
        if organization_id == 0 {
            return Ok(None);
        }

        if let Some(hit) = self.lookup(organization_id) {
            return Ok(hit);
        }

        let settings = self.reader.find(organization_id).await?;

        self.entries.write().insert(
            organization_id,
            CachedSettings {
                settings: settings.clone(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        tracing::debug!(
            organization_id,
            stored = settings.is_some(),
            "Organization settings cached"
        );
        Ok(settings)
    }

    /// Drop one organization's entry so the next read refreshes it.
    pub fn invalidate(&self, organization_id: DbId) {
        self.entries.write().remove(&organization_id);
    }

    fn lookup(&self, organization_id: DbId) -> Option<Option<OrgSettings>> {
        let entries = self.entries.read();
        entries
            .get(&organization_id)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.settings.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
