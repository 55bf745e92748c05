mod checkpoint;
mod local;
mod s3;

pub use checkpoint::{filename_for, format_timestamp, is_snapshot_file, parse_filename};
pub use local::LocalStore;
pub use s3::S3Store;

use std::path::Path;

use crate::error::UploadError;

/// Remote archive for persisted snapshots. The production implementation is
/// [`S3Store`]; tests substitute stubs.
pub trait SnapshotSink {
    /// Upload the file at `local_path` under `key`, overwriting any existing
    /// object at that key.
    async fn upload(&self, local_path: &Path, key: &str) -> Result<(), UploadError>;
}

/// Derive the object key for a persisted snapshot: its path relative to the
/// working directory, with `/` separators regardless of platform (e.g.
/// `data/bicing_2014-05-31_13.53.07_UTC.xml`).
///
/// `local_path` is expected to be relative: an absolute path leaks its root
/// into the key as a leading `/`. The production data directory is kept
/// relative for exactly this reason (see `Settings::data_dir`).
pub fn object_key(local_path: &Path) -> String {
    local_path
        .iter()
        .map(|part| part.to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn object_key_mirrors_relative_path() {
        let path = PathBuf::from("data").join("bicing_2014-05-31_13.53.07_UTC.xml");
        assert_eq!(object_key(&path), "data/bicing_2014-05-31_13.53.07_UTC.xml");
    }

    #[test]
    fn object_key_of_absolute_path_keeps_the_root() {
        // Documented hazard: absolute paths surface as a leading slash, which
        // is why the configured data dir stays relative.
        let key = object_key(Path::new("/data/bicing_2014-05-31_13.53.07_UTC.xml"));
        assert_eq!(key, "//data/bicing_2014-05-31_13.53.07_UTC.xml");
    }
}
