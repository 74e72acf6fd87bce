//! Per-run artifact locations.
//!
//! Every pipeline run gets its own directory under the configured artifact
//! root, so concurrent uploads can never race on a shared file path.

use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::errors::AppError;

pub const SUMMARY_FILE: &str = "contract_summary.md";
pub const DELIVERABLES_FILE: &str = "calendar_deliverables.json";

#[derive(Debug, Clone)]
pub struct RunArtifacts {
    pub run_id: Uuid,
    dir: PathBuf,
}

impl RunArtifacts {
    /// Creates the run directory under `root`.
    pub async fn create(root: &str) -> Result<Self, AppError> {
        let run_id = Uuid::new_v4();
        let dir = Path::new(root).join(run_id.to_string());
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { run_id, dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn summary_path(&self) -> PathBuf {
        self.dir.join(SUMMARY_FILE)
    }

    pub fn deliverables_path(&self) -> PathBuf {
        self.dir.join(DELIVERABLES_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn runs_get_distinct_directories() {
        let root = tempfile::tempdir().expect("tempdir");
        let root_str = root.path().to_string_lossy().to_string();
        let a = RunArtifacts::create(&root_str).await.expect("create");
        let b = RunArtifacts::create(&root_str).await.expect("create");
        assert_ne!(a.dir(), b.dir());
        assert!(a.dir().exists());
        assert!(a.summary_path().ends_with(SUMMARY_FILE));
        assert!(b.deliverables_path().ends_with(DELIVERABLES_FILE));
    }
}
