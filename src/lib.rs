pub mod config;
pub mod error;
pub mod estimate;
pub mod fetch;
pub mod ingest;
pub mod logging;
pub mod notify;
pub mod storage;

pub use error::{Error, Result};
