//! One load cycle over the SavedVariables file.

use super::decode::PayloadDecoder;
use super::error::LoadError;
use super::export::extract_export;
use super::model::Snapshot;
use super::parse::parse_snapshot;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The addon's SavedVariables file and the decoder used to read it.
#[derive(Debug, Clone)]
pub struct SavedVariables {
    path: PathBuf,
    decoder: PayloadDecoder,
}

impl SavedVariables {
    pub fn new(path: impl Into<PathBuf>, decoder: PayloadDecoder) -> Self {
        Self {
            path: path.into(),
            decoder,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file and run it through the whole pipeline.
    ///
    /// Produces a brand-new [`Snapshot`]; nothing is retained on failure.
    ///
    /// # Errors
    ///
    /// Any [`LoadError`] stage failure.
    pub async fn load(&self) -> Result<Snapshot, LoadError> {
        let raw = tokio::fs::read(&self.path)
            .await
            .map_err(|source| LoadError::Read {
                path: self.path.clone(),
                source,
            })?;
        debug!(path = %self.path.display(), bytes = raw.len(), "read saved variables");
        self.decode_contents(&raw)
    }

    /// Extract, decode, inflate and parse raw file contents.
    ///
    /// # Errors
    ///
    /// Any [`LoadError`] stage failure other than [`LoadError::Read`].
    pub fn decode_contents(&self, raw: &[u8]) -> Result<Snapshot, LoadError> {
        let payload = extract_export(raw)?;
        let json = self.decoder.decode(payload)?;
        let snapshot = parse_snapshot(&json)?;
        debug!(
            payload_bytes = payload.len(),
            json_bytes = json.len(),
            characters = snapshot.len(),
            "decoded addon export"
        );
        Ok(snapshot)
    }
}
