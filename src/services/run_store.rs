use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::models::AllocationRunResponse;

/// Errors that can occur when reading completed runs
#[derive(Debug, Error)]
pub enum RunStoreError {
    #[error("Run not found: {0}")]
    NotFound(String),
}

/// In-memory store of completed allocation runs
///
/// Only finished runs are ever inserted, so readers see a run in full or not
/// at all. Entries are bounded in number and expire after the configured TTL;
/// nothing survives a restart.
pub struct RunStore {
    runs: moka::future::Cache<String, Arc<AllocationRunResponse>>,
    ttl_secs: u64,
}

impl RunStore {
    /// Create a new run store
    pub fn new(max_runs: u64, ttl_secs: u64) -> Self {
        let runs = moka::future::CacheBuilder::new(max_runs)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { runs, ttl_secs }
    }

    /// Publish a completed run and return the shared handle
    pub async fn insert(&self, run: AllocationRunResponse) -> Arc<AllocationRunResponse> {
        let run = Arc::new(run);
        self.runs.insert(run.run_id.clone(), Arc::clone(&run)).await;
        tracing::trace!("Run stored: {}", run.run_id);
        run
    }

    /// Fetch a completed run by id
    pub async fn get(&self, run_id: &str) -> Result<Arc<AllocationRunResponse>, RunStoreError> {
        match self.runs.get(run_id).await {
            Some(run) => Ok(run),
            None => {
                tracing::trace!("Run miss: {}", run_id);
                Err(RunStoreError::NotFound(run_id.to_string()))
            }
        }
    }

    /// Get store statistics
    ///
    /// Pending inserts and evictions are applied first so the count includes
    /// runs stored just before the call.
    pub async fn stats(&self) -> RunStoreStats {
        self.runs.run_pending_tasks().await;
        RunStoreStats {
            entries: self.runs.entry_count(),
            ttl_secs: self.ttl_secs,
        }
    }
}

/// Run store statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStoreStats {
    pub entries: u64,
    pub ttl_secs: u64,
}
