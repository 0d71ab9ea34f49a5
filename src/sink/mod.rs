//! Result sink boundary.
//!
//! The grading/learning loop lives outside this service; the pipeline's
//! output is handed to an abstract sink capability with no dependency from
//! the pipeline back into storage. The file sink writes the assembled
//! response as pretty JSON, one file per slate.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::assembler::SlateResponse;
use crate::types::SlateError;

/// Consumer of assembled slate responses.
#[cfg_attr(test, mockall::automock)]
pub trait ResultSink {
    fn publish(&self, response: &SlateResponse) -> Result<(), SlateError>;
}

/// Writes each response to a JSON file under a base directory, named by
/// request id.
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ResultSink for JsonFileSink {
    fn publish(&self, response: &SlateResponse) -> Result<(), SlateError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| SlateError::Sink(format!("create {}: {e}", self.dir.display())))?;

        let path = self.dir.join(format!("slate_{}.json", response.metadata.request_id));
        let json = serde_json::to_string_pretty(response)
            .map_err(|e| SlateError::Sink(format!("serialize response: {e}")))?;
        std::fs::write(&path, json)
            .map_err(|e| SlateError::Sink(format!("write {}: {e}", path.display())))?;

        debug!(
            path = %path.display(),
            picks = response.metadata.picks_out,
            "Slate response published"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
