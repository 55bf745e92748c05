//! Checkpoint naming: the last persisted update time lives in the filename
//! of the single retained snapshot, `bicing_<YYYY-MM-DD_HH.MM.SS_UTC>.xml`.

use chrono::{DateTime, Utc};

pub const FILE_PREFIX: &str = "bicing_";
pub const FILE_SUFFIX: &str = ".xml";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H.%M.%S_UTC";

/// Format a Unix timestamp (UTC seconds) into the checkpoint string, e.g.
/// `2014-05-31_13.53.07_UTC`. Returns `None` for timestamps chrono cannot
/// represent.
pub fn format_timestamp(epoch_secs: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(epoch_secs, 0)
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
}

/// Snapshot filename for a formatted checkpoint string.
pub fn filename_for(stamp: &str) -> String {
    format!("{FILE_PREFIX}{stamp}{FILE_SUFFIX}")
}

/// Extract the checkpoint string back out of a snapshot filename.
pub fn parse_filename(name: &str) -> Option<&str> {
    name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)
}

pub fn is_snapshot_file(name: &str) -> bool {
    parse_filename(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn formats_known_epoch() {
        // 1401544387 is 2014-05-31 13:53:07 UTC
        assert_eq!(
            format_timestamp(1401544387).as_deref(),
            Some("2014-05-31_13.53.07_UTC")
        );
    }

    #[test]
    fn filename_for_known_epoch() {
        let stamp = format_timestamp(1401544387).unwrap();
        assert_eq!(filename_for(&stamp), "bicing_2014-05-31_13.53.07_UTC.xml");
    }

    #[test_case(0)]
    #[test_case(1401544387)]
    #[test_case(2147483647)]
    fn timestamp_roundtrips_through_filename(epoch: i64) {
        let stamp = format_timestamp(epoch).unwrap();
        let name = filename_for(&stamp);
        assert_eq!(parse_filename(&name), Some(stamp.as_str()));
    }

    #[test_case("bicing_2014-05-31_13.53.07_UTC.xml", true)]
    #[test_case("bicing_.xml", true)]
    #[test_case("bicing_2014-05-31_13.53.07_UTC.xml.tmp", false)]
    #[test_case("stations_2014-05-31_13.53.07_UTC.xml", false)]
    #[test_case("bicing_ingest.log", false)]
    fn recognizes_snapshot_filenames(name: &str, expected: bool) {
        assert_eq!(is_snapshot_file(name), expected);
    }

    #[test]
    fn out_of_range_epoch_is_none() {
        assert_eq!(format_timestamp(i64::MAX), None);
    }
}
