use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Persist error: {0}")]
    Persist(#[from] PersistError),

    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("Notify error: {0}")]
    Notify(#[from] NotifyError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("updatetime marker not found in response body")]
    MarkerMissing,

    #[error("updatetime value {0:?} is not a valid timestamp")]
    BadTimestamp(String),
}

#[derive(thiserror::Error, Debug)]
pub enum PersistError {
    #[error("failed to create data directory: {0}")]
    DirectoryCreation(io::Error),

    #[error("failed to list data directory: {0}")]
    DirectoryRead(io::Error),

    #[error("failed to delete previous snapshot: {0}")]
    FileCleanup(io::Error),

    #[error("failed to write snapshot: {0}")]
    FileWrite(io::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum UploadError {
    #[error("failed to read local file for upload: {0}")]
    FileRead(io::Error),

    #[error("S3 upload error: {0}")]
    S3Upload(String),
}

#[derive(thiserror::Error, Debug)]
pub enum NotifyError {
    #[error("mailer configuration error: {0}")]
    Config(String),

    #[error("failed to read attachment: {0}")]
    Attachment(io::Error),

    #[error("SMTP error: {0}")]
    Smtp(String),
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Configuration parsing error: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("failed to read credentials file {path}: {source}")]
    CredentialsRead { path: String, source: io::Error },

    #[error("failed to parse credentials file {path}: {source}")]
    CredentialsParse {
        path: String,
        source: serde_json::Error,
    },

    #[error("failed to open log file: {0}")]
    LogFile(io::Error),
}
