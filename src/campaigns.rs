//! Registry of campaigns currently sending.
//!
//! The campaign manager registers a campaign when it starts sending and
//! removes it when it finishes. The registry answers the activity probe the
//! reload coordinator consults before reloading.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use serde::Serialize;

use crate::reload::ActivityProbe;

/// A campaign that is sending right now.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RunningCampaign {
    pub id: u64,
    pub name: String,
    /// Seconds since epoch.
    pub started_at: u64,
}

#[derive(Clone, Default)]
pub struct CampaignRegistry {
    inner: Arc<DashMap<u64, RunningCampaign>>,
}

impl CampaignRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a campaign as running. Returns `false` if it already was.
    pub fn start(&self, id: u64, name: impl Into<String>) -> bool {
        let started_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let mut inserted = false;
        self.inner.entry(id).or_insert_with(|| {
            inserted = true;
            RunningCampaign {
                id,
                name: name.into(),
                started_at,
            }
        });

        if inserted {
            tracing::info!(campaign_id = id, "Campaign started");
        }
        inserted
    }

    /// Mark a campaign as done.
    pub fn finish(&self, id: u64) -> Option<RunningCampaign> {
        let removed = self.inner.remove(&id).map(|(_, c)| c);
        if removed.is_some() {
            tracing::info!(campaign_id = id, "Campaign finished");
        }
        removed
    }

    pub fn count(&self) -> usize {
        self.inner.len()
    }

    /// Running campaigns ordered by id.
    pub fn running(&self) -> Vec<RunningCampaign> {
        let mut out: Vec<_> = self.inner.iter().map(|r| r.value().clone()).collect();
        out.sort_by_key(|c| c.id);
        out
    }
}

impl ActivityProbe for CampaignRegistry {
    fn has_protected_activity(&self) -> bool {
        !self.inner.is_empty()
    }
}
