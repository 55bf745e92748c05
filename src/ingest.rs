//! One ingestion run is a single linear pass: fetch the feed, compare its
//! update time against the filename-encoded checkpoint, persist if new, then
//! upload to the remote archive. Errors at any stage fail the run; retries
//! are the caller's business and happen by invoking the whole pass again.

use std::time::Duration;

use tracing::{error, info};

use crate::error::{Error, ParseError, Result};
use crate::fetch::SnapshotSource;
use crate::storage::{self, LocalStore, SnapshotSink};

/// Stage at which a run failed, for log context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Comparing,
    Persisting,
    Uploading,
}

impl Error {
    /// Maps an error back to the run stage that produces it. `None` for
    /// errors that cannot occur inside an ingestion run.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Fetch(_) | Error::Parse(_) => Some(Stage::Fetching),
            Error::Persist(_) => Some(Stage::Persisting),
            Error::Upload(_) => Some(Stage::Uploading),
            Error::Notify(_) | Error::Config(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A new snapshot was persisted and uploaded.
    Stored { checkpoint: String },
    /// The feed still serves the checkpointed snapshot; nothing to do.
    Duplicate,
}

/// Execute one ingestion pass. Duplicate snapshots are a success without
/// persist or upload; an upload failure leaves the freshly written local
/// file in place.
pub async fn run_once<S, U>(source: &S, store: &LocalStore, sink: &U) -> Result<RunOutcome>
where
    S: SnapshotSource,
    U: SnapshotSink,
{
    store.ensure_dir()?;

    let snapshot = source.fetch().await?;
    let stamp = storage::format_timestamp(snapshot.update_time)
        .ok_or_else(|| ParseError::BadTimestamp(snapshot.update_time.to_string()))?;

    if store.previous_checkpoint()?.as_deref() == Some(stamp.as_str()) {
        return Ok(RunOutcome::Duplicate);
    }

    let path = store.replace_snapshot(&stamp, &snapshot.body)?;
    sink.upload(&path, &storage::object_key(&path)).await?;

    Ok(RunOutcome::Stored { checkpoint: stamp })
}

/// One run with the error caught at the stage boundary and logged; returns
/// whether the run succeeded.
pub async fn run<S, U>(source: &S, store: &LocalStore, sink: &U) -> bool
where
    S: SnapshotSource,
    U: SnapshotSink,
{
    match run_once(source, store, sink).await {
        Ok(RunOutcome::Stored { checkpoint }) => {
            info!(checkpoint, "snapshot ingested");
            true
        }
        Ok(RunOutcome::Duplicate) => {
            info!("snapshot unchanged, nothing to do");
            true
        }
        Err(err) => {
            error!(stage = ?err.stage(), %err, "ingestion run failed");
            false
        }
    }
}

/// Execute `times` independent runs with a fixed pause in between, so a
/// scheduler with a coarse minimum interval can still poll faster. Returns
/// false if any run failed.
pub async fn run_repeatedly<S, U>(
    source: &S,
    store: &LocalStore,
    sink: &U,
    times: u32,
    pause: Duration,
) -> bool
where
    S: SnapshotSource,
    U: SnapshotSink,
{
    let mut all_ok = true;
    for i in 0..times {
        info!(run = i + 1, of = times, "ingesting");
        all_ok &= run(source, store, sink).await;
        if i + 1 < times {
            tokio::time::sleep(pause).await;
        }
    }
    all_ok
}
