use std::path::{Path, PathBuf};

use config::{Config, File, FileFormat};
use serde::Deserialize;

use crate::error::ConfigError;

/// Process-wide settings, built once at startup and passed to every
/// component by parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Bicing station feed endpoint.
    pub endpoint_url: String,
    /// Directory holding the single checkpoint snapshot file. Must stay a
    /// relative path: S3 object keys are derived from it.
    pub data_dir: PathBuf,
    /// Error log consumed by the `report-errors` action.
    pub log_file: PathBuf,
    /// JSON file with AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY.
    pub credentials_file: PathBuf,
    /// Timeout applied to every feed request, in seconds.
    pub http_timeout_secs: u64,
    pub s3: S3Settings,
    pub email: EmailSettings,
    pub schedule: ScheduleSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Settings {
    pub region: String,
    pub bucket: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailSettings {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub use_tls: bool,
    pub sender: String,
    /// Operator address receiving error reports and heartbeats.
    pub admin: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleSettings {
    /// Ingestion runs per invocation, to poll faster than the scheduler's
    /// minimum interval.
    pub runs: u32,
    /// Pause between runs, in milliseconds.
    pub pause_ms: u64,
    /// Refetch bound for the refresh-rate estimator.
    pub estimate_trials: u32,
    /// Pause between estimator refetches, in milliseconds.
    pub estimate_sleep_ms: u64,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .set_default("endpoint_url", "http://wservice.viabicing.cat/getstations.php?v=1")?
            .set_default("data_dir", "data")?
            .set_default("log_file", "bicing_ingest.log")?
            .set_default("credentials_file", "aws_credentials.json")?
            .set_default("http_timeout_secs", 30_i64)?
            .set_default("s3.region", "us-east-1")?
            .set_default("s3.bucket", "bicingbcn")?
            .set_default("email.smtp_host", "localhost")?
            .set_default("email.smtp_port", 25_i64)?
            .set_default("email.use_tls", false)?
            .set_default("email.sender", "bicing-ingest@localhost")?
            .set_default("email.admin", "admin@localhost")?
            .set_default("schedule.runs", 3_i64)?
            .set_default("schedule.pause_ms", 333_i64)?
            .set_default("schedule.estimate_trials", 110_i64)?
            .set_default("schedule.estimate_sleep_ms", 100_i64)?
            // Optional configuration files override the defaults above
            .add_source(File::new("config/default", FileFormat::Toml).required(false))
            .add_source(File::new(&format!("config/{}", env), FileFormat::Toml).required(false))
            .build()?;

        Ok(s.try_deserialize()?)
    }
}

/// AWS credentials loaded from a local JSON file. The field names match the
/// keys the file is expected to carry.
#[derive(Debug, Clone, Deserialize)]
pub struct AwsCredentials {
    #[serde(rename = "AWS_ACCESS_KEY_ID")]
    pub access_key_id: String,
    #[serde(rename = "AWS_SECRET_ACCESS_KEY")]
    pub secret_access_key: String,
}

impl AwsCredentials {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::CredentialsRead {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::CredentialsParse {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_deserialize() {
        let settings = Settings::new().expect("default settings should build");
        assert_eq!(settings.data_dir, PathBuf::from("data"));
        assert_eq!(settings.schedule.runs, 3);
        assert_eq!(settings.email.smtp_port, 25);
        assert!(settings.endpoint_url.starts_with("http://"));
    }

    #[test]
    fn credentials_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"AWS_ACCESS_KEY_ID": "AKIATEST", "AWS_SECRET_ACCESS_KEY": "sekrit"}}"#
        )
        .unwrap();

        let creds = AwsCredentials::load(file.path()).unwrap();
        assert_eq!(creds.access_key_id, "AKIATEST");
        assert_eq!(creds.secret_access_key, "sekrit");
    }

    #[test]
    fn credentials_missing_file() {
        let err = AwsCredentials::load(Path::new("/nonexistent/aws_credentials.json"));
        assert!(matches!(err, Err(ConfigError::CredentialsRead { .. })));
    }

    #[test]
    fn credentials_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = AwsCredentials::load(file.path());
        assert!(matches!(err, Err(ConfigError::CredentialsParse { .. })));
    }
}
