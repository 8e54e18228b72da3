//! Pending-job store — the hand-off point between the analyze and generate
//! phases. Key-value with create and get only; records are never updated in
//! place and never deleted (retention is an open policy question, see
//! DESIGN.md), so concurrent readers need no locking.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::pipeline::analyzer::JobProfile;

/// The persisted unit: the raw job description plus its analyzed profile,
/// keyed by an opaque job id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingJob {
    pub job_description: String,
    pub extractor_json: JobProfile,
}

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn create(&self, job_id: &str, job: &PendingJob) -> Result<()>;
    async fn get(&self, job_id: &str) -> Result<Option<PendingJob>>;
}

/// Disk-backed store writing one JSON file per job under
/// `{storage_dir}/tmp_jobs/`.
pub struct FsJobStore {
    dir: PathBuf,
}

impl FsJobStore {
    pub fn new(storage_dir: &str) -> Self {
        Self {
            dir: PathBuf::from(storage_dir).join("tmp_jobs"),
        }
    }

    /// Job ids are generated internally as hex UUIDs, but `get` receives the
    /// id from the caller — anything that could escape the store directory
    /// is rejected outright.
    fn path_for(&self, job_id: &str) -> Result<PathBuf> {
        if job_id.is_empty() || !job_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            bail!("invalid job id '{job_id}'");
        }
        Ok(self.dir.join(format!("{job_id}.json")))
    }
}

#[async_trait]
impl JobStore for FsJobStore {
    async fn create(&self, job_id: &str, job: &PendingJob) -> Result<()> {
        let path = self.path_for(job_id)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("creating {}", self.dir.display()))?;
        let payload = serde_json::to_vec_pretty(job).context("serializing pending job")?;
        tokio::fs::write(&path, payload)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    async fn get(&self, job_id: &str) -> Result<Option<PendingJob>> {
        let path = match self.path_for(job_id) {
            Ok(p) => p,
            Err(_) => return Ok(None),
        };
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        };
        let job = serde_json::from_slice(&bytes)
            .with_context(|| format!("deserializing {}", path.display()))?;
        Ok(Some(job))
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryJobStore {
    jobs: Mutex<HashMap<String, PendingJob>>,
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create(&self, job_id: &str, job: &PendingJob) -> Result<()> {
        self.jobs
            .lock()
            .expect("job store lock poisoned")
            .insert(job_id.to_string(), job.clone());
        Ok(())
    }

    async fn get(&self, job_id: &str) -> Result<Option<PendingJob>> {
        Ok(self
            .jobs
            .lock()
            .expect("job store lock poisoned")
            .get(job_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::analyzer::JobProfile;

    fn sample_job() -> PendingJob {
        PendingJob {
            job_description: "Senior backend engineer, Python, PostgreSQL".to_string(),
            extractor_json: JobProfile::parse_error("not json at all"),
        }
    }

    #[tokio::test]
    async fn test_fs_store_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsJobStore::new(tmp.path().to_str().unwrap());

        store.create("abc123", &sample_job()).await.unwrap();
        let loaded = store.get("abc123").await.unwrap().expect("job must exist");

        assert_eq!(loaded.job_description, sample_job().job_description);
    }

    #[tokio::test]
    async fn test_fs_store_missing_id_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsJobStore::new(tmp.path().to_str().unwrap());

        assert!(store.get("deadbeef").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fs_store_rejects_traversal_ids() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsJobStore::new(tmp.path().to_str().unwrap());

        assert!(store.create("../escape", &sample_job()).await.is_err());
        assert!(store.get("../../etc/passwd").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryJobStore::default();
        store.create("job1", &sample_job()).await.unwrap();

        assert!(store.get("job1").await.unwrap().is_some());
        assert!(store.get("job2").await.unwrap().is_none());
    }
}
