use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub aws_region: String,
    /// Internal endpoint (MinIO or another S3 compatible service). `None` means AWS.
    pub s3_endpoint: Option<String>,
    pub s3_bucket_name: String,
    /// Host (and optional port) clients use to reach the bucket.
    pub public_endpoint: String,
    pub public_ssl: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub storage: StorageConfig,
    /// Object key prefix for the parent entity, e.g. `spots` or `benches`.
    pub parent_type: String,
    pub pending_sweep_interval: Duration,
    pub pending_grace: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        let aws_region = optional("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string());
        let s3_endpoint = optional("S3_ENDPOINT");
        let public_endpoint = match optional("S3_PUBLIC_ENDPOINT") {
            Some(endpoint) => endpoint,
            None => default_public_endpoint(s3_endpoint.as_deref(), &aws_region),
        };

        let storage = StorageConfig {
            aws_access_key_id: required("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: required("AWS_SECRET_ACCESS_KEY")?,
            aws_region,
            s3_endpoint,
            s3_bucket_name: optional("S3_BUCKET_NAME").unwrap_or_else(|| "spot-photos".to_string()),
            public_endpoint,
            public_ssl: flag("S3_PUBLIC_SSL")?,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: optional("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            storage,
            parent_type: optional("PHOTO_PARENT_TYPE").unwrap_or_else(|| "spots".to_string()),
            pending_sweep_interval: non_zero(
                "PENDING_SWEEP_INTERVAL_SECS",
                seconds("PENDING_SWEEP_INTERVAL_SECS", 3600)?,
            )?,
            pending_grace: seconds("PENDING_GRACE_SECS", 3600)?,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn flag(name: &'static str) -> Result<bool, ConfigError> {
    match optional(name).as_deref() {
        None => Ok(false),
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(other) => Err(ConfigError::Invalid {
            name,
            value: other.to_string(),
        }),
    }
}

fn seconds(name: &'static str, default: u64) -> Result<Duration, ConfigError> {
    match optional(name) {
        None => Ok(Duration::from_secs(default)),
        Some(raw) => raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}

fn non_zero(name: &'static str, value: Duration) -> Result<Duration, ConfigError> {
    if value.is_zero() {
        return Err(ConfigError::Invalid {
            name,
            value: "0".to_string(),
        });
    }
    Ok(value)
}

/// Falls back to the internal endpoint's authority, or the AWS virtual host.
fn default_public_endpoint(s3_endpoint: Option<&str>, region: &str) -> String {
    match s3_endpoint.and_then(|e| url::Url::parse(e).ok()) {
        Some(url) => match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            _ => format!("s3.{}.amazonaws.com", region),
        },
        None => format!("s3.{}.amazonaws.com", region),
    }
}
