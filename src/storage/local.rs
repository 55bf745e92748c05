use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::checkpoint;
use crate::error::PersistError;

/// Local snapshot store. Keeps at most one snapshot file in the data
/// directory; the filename doubles as the checkpoint record.
///
/// Single-writer by assumption: overlapping invocations would race on the
/// delete-then-write sequence, and the external scheduler is expected to
/// prevent them.
pub struct LocalStore {
    data_dir: PathBuf,
}

impl LocalStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Create the data directory if missing. Not an error if it exists.
    pub fn ensure_dir(&self) -> Result<(), PersistError> {
        fs::create_dir_all(&self.data_dir).map_err(PersistError::DirectoryCreation)
    }

    /// The checkpoint string of the previously persisted snapshot, or `None`
    /// if the directory holds no snapshot file. At most one is expected; if
    /// several are somehow present, the first found wins.
    pub fn previous_checkpoint(&self) -> Result<Option<String>, PersistError> {
        let entries = fs::read_dir(&self.data_dir).map_err(PersistError::DirectoryRead)?;
        for entry in entries {
            let entry = entry.map_err(PersistError::DirectoryRead)?;
            let name = entry.file_name();
            if let Some(stamp) = name.to_str().and_then(checkpoint::parse_filename) {
                return Ok(Some(stamp.to_string()));
            }
        }
        Ok(None)
    }

    /// Persist a new snapshot: delete any previous snapshot file, then write
    /// the body under the new checkpoint name. A crash between the two steps
    /// leaves zero snapshot files, which the next run treats as "no
    /// checkpoint" and safely re-ingests.
    pub fn replace_snapshot(&self, stamp: &str, body: &str) -> Result<PathBuf, PersistError> {
        self.delete_snapshots()?;

        let path = self.data_dir.join(checkpoint::filename_for(stamp));
        fs::write(&path, body).map_err(PersistError::FileWrite)?;
        info!(path = %path.display(), "persisted snapshot");
        Ok(path)
    }

    fn delete_snapshots(&self) -> Result<(), PersistError> {
        let entries = fs::read_dir(&self.data_dir).map_err(PersistError::DirectoryRead)?;
        for entry in entries {
            let entry = entry.map_err(PersistError::DirectoryRead)?;
            let name = entry.file_name();
            if name.to_str().is_some_and(checkpoint::is_snapshot_file) {
                debug!(file = %entry.path().display(), "deleting previous snapshot");
                fs::remove_file(entry.path()).map_err(PersistError::FileCleanup)?;
            }
        }
        Ok(())
    }
}
