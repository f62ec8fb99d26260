//! Two-phase user status scan state
//!
//! With user status enabled, listing users runs in two phases sharing one
//! lineage id:
//!
//! 1. `deleted-scan` drains the deactivated-user search into the
//!    [`DeletedUserRegistry`]. These pages carry no users.
//! 2. `all-users-scan` drains the users endpoint, marking each user disabled
//!    when its id was recorded in phase one.
//!
//! Reaching the end of phase two tears the lineage down. Lineages abandoned
//! midway (a failed or cancelled sync) are evicted once they sit idle longer
//! than the registry's idle timeout.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use hubspot_sync_domain::constants::DEFAULT_SCAN_IDLE_TIMEOUT_SECS;
use hubspot_sync_domain::{impl_tag_conversions, ConnectorError, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncPhase {
    #[default]
    DeletedScan,
    AllUsersScan,
    Completed,
}

impl_tag_conversions!(SyncPhase {
    DeletedScan => "deleted-scan",
    AllUsersScan => "all-users-scan",
    Completed => "completed",
});

/// Cursor of the user listing, stored as the token of the user frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsersPageToken {
    pub phase: SyncPhase,
    /// Remote cursor within the phase. Empty on the first page of a phase.
    #[serde(default)]
    pub page: String,
    #[serde(default)]
    pub lineage: String,
}

impl UsersPageToken {
    /// First token of a new scan, with a freshly minted lineage.
    pub fn start() -> Self {
        Self {
            phase: SyncPhase::DeletedScan,
            page: String::new(),
            lineage: Uuid::new_v4().to_string(),
        }
    }

    /// Same phase and lineage, next remote cursor.
    pub fn next_page(&self, page: impl Into<String>) -> Self {
        Self { phase: self.phase, page: page.into(), lineage: self.lineage.clone() }
    }

    /// First page of `phase` within the same lineage.
    pub fn enter(&self, phase: SyncPhase) -> Self {
        Self { phase, page: String::new(), lineage: self.lineage.clone() }
    }

    /// `None` for an empty frame token.
    ///
    /// # Errors
    /// `InvalidPageToken` if the frame token is not a user phase token.
    pub fn decode(raw: &str) -> Result<Option<Self>> {
        if raw.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(raw)
            .map(Some)
            .map_err(|e| ConnectorError::InvalidPageToken(format!("malformed user phase: {e}")))
    }

    /// # Errors
    /// `Internal` if serialization fails.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| ConnectorError::Internal(format!("failed to encode user phase: {e}")))
    }
}

/// Deactivated user ids collected per scan lineage.
///
/// Owned by the caller and shared with the user syncer, so concurrent list
/// calls for different lineages never observe each other's sets.
#[derive(Debug)]
pub struct DeletedUserRegistry {
    scans: Mutex<HashMap<String, Scan>>,
    idle_timeout: Duration,
}

#[derive(Debug)]
struct Scan {
    deleted: HashSet<String>,
    last_used: Instant,
}

impl Default for DeletedUserRegistry {
    fn default() -> Self {
        Self::with_idle_timeout(Duration::from_secs(DEFAULT_SCAN_IDLE_TIMEOUT_SECS))
    }
}

impl DeletedUserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry evicting lineages untouched for longer than `idle_timeout`.
    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self { scans: Mutex::new(HashMap::new()), idle_timeout }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Start tracking a lineage. Restarting a known lineage clears it.
    ///
    /// Idle lineages are evicted first.
    pub fn begin(&self, lineage: &str) {
        let now = Instant::now();
        let mut scans = self.scans.lock();
        self.evict_idle(&mut scans, now);
        scans.insert(lineage.to_string(), Scan { deleted: HashSet::new(), last_used: now });
        debug!(lineage, "deleted-user scan started");
    }

    /// Add deactivated ids to a lineage and return its new size.
    ///
    /// # Errors
    /// `InvalidPageToken` if the lineage was never started, is complete or
    /// was evicted.
    pub fn record<I>(&self, lineage: &str, ids: I) -> Result<usize>
    where
        I: IntoIterator<Item = String>,
    {
        let mut scans = self.scans.lock();
        let scan = scans.get_mut(lineage).ok_or_else(|| unknown_lineage(lineage))?;
        scan.deleted.extend(ids.into_iter().filter(|id| !id.is_empty()));
        scan.last_used = Instant::now();
        Ok(scan.deleted.len())
    }

    /// Copy of a lineage's deleted set. Counts as use of the lineage.
    pub fn snapshot(&self, lineage: &str) -> Option<HashSet<String>> {
        let mut scans = self.scans.lock();
        let scan = scans.get_mut(lineage)?;
        scan.last_used = Instant::now();
        Some(scan.deleted.clone())
    }

    pub fn contains_lineage(&self, lineage: &str) -> bool {
        self.scans.lock().contains_key(lineage)
    }

    /// Tear a lineage down. Returns whether it was being tracked.
    pub fn complete(&self, lineage: &str) -> bool {
        let removed = self.scans.lock().remove(lineage).is_some();
        if removed {
            debug!(lineage, "deleted-user scan torn down");
        }
        removed
    }

    /// Drop every lineage idle past the timeout. Returns how many went.
    pub fn evict_stale(&self) -> usize {
        let mut scans = self.scans.lock();
        self.evict_idle(&mut scans, Instant::now())
    }

    pub fn active_lineages(&self) -> usize {
        self.scans.lock().len()
    }

    fn evict_idle(&self, scans: &mut HashMap<String, Scan>, now: Instant) -> usize {
        let before = scans.len();
        scans.retain(|_, scan| now.saturating_duration_since(scan.last_used) <= self.idle_timeout);
        let evicted = before - scans.len();
        if evicted > 0 {
            warn!(evicted, "evicted abandoned deleted-user scans");
        }
        evicted
    }
}

pub(crate) fn unknown_lineage(lineage: &str) -> ConnectorError {
    ConnectorError::InvalidPageToken(format!("unknown user scan lineage '{lineage}'"))
}
