use std::time::Duration;

use tracing::debug;

use crate::error::Result;
use crate::fetch::SnapshotSource;

/// Diagnostic utility: refetch up to `trials` times, sleeping in between,
/// until the feed's update time changes. Returns the observed delta in
/// seconds, or `None` if the bound is exhausted without a change.
///
/// In practice the feed updates about once a minute, so polling every 30
/// seconds with checkpointing avoids duplicate uploads.
pub async fn refresh_rate<S: SnapshotSource>(
    source: &S,
    trials: u32,
    sleep: Duration,
) -> Result<Option<i64>> {
    let first = source.fetch().await?.update_time;
    for trial in 0..trials {
        tokio::time::sleep(sleep).await;
        let current = source.fetch().await?.update_time;
        debug!(trial, current, "refresh probe");
        if current != first {
            return Ok(Some(current - first));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::Snapshot;
    use std::cell::Cell;

    /// Serves `first` until `flip_after` fetches have happened, then `second`.
    struct FlippingSource {
        first: i64,
        second: i64,
        flip_after: u32,
        fetches: Cell<u32>,
    }

    impl SnapshotSource for FlippingSource {
        async fn fetch(&self) -> Result<Snapshot> {
            let n = self.fetches.get();
            self.fetches.set(n + 1);
            let update_time = if n < self.flip_after {
                self.first
            } else {
                self.second
            };
            Ok(Snapshot {
                update_time,
                body: String::new(),
            })
        }
    }

    #[tokio::test]
    async fn reports_delta_when_feed_changes() {
        let source = FlippingSource {
            first: 1401544387,
            second: 1401544447,
            flip_after: 3,
            fetches: Cell::new(0),
        };
        let delta = refresh_rate(&source, 10, Duration::ZERO).await.unwrap();
        assert_eq!(delta, Some(60));
    }

    #[tokio::test]
    async fn exhausted_bound_reports_none() {
        let source = FlippingSource {
            first: 1401544387,
            second: 1401544387,
            flip_after: u32::MAX,
            fetches: Cell::new(0),
        };
        let delta = refresh_rate(&source, 5, Duration::ZERO).await.unwrap();
        assert_eq!(delta, None);
    }
}
