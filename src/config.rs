use std::{env, net::SocketAddr, str::FromStr};
use thiserror::Error;

pub const DEFAULT_GIF_LIMIT: u32 = 25;
pub const DEFAULT_FAN_OUT_LIMIT: usize = 8;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid environment variable format for {0}: {1}")]
    InvalidVar(String, String),
    #[error(transparent)]
    DotEnvError(#[from] dotenvy::Error),
}

#[derive(Clone, Debug)] // Clone needed if passed around, Debug for logging
pub struct Config {
    pub bind_address: SocketAddr,
    pub bucket_name: String,
    pub giphy_api_key: String,
    pub giphy_base_url: String,
    /// How many trending entries to request per fetch.
    pub gif_limit: u32,
    /// Upper bound on concurrent per-item work within one invocation.
    pub fan_out_limit: usize,
    // Store region as string for simplicity here, aws_clients can convert
    pub aws_region: String,
    // Optional endpoint for LocalStack
    pub localstack_endpoint: Option<String>,
}

fn parsed_var<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidVar(name.into(), e.to_string())),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignores errors, relies on env vars otherwise)
        dotenvy::dotenv().ok();

        let bind_address_str =
            env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = SocketAddr::from_str(&bind_address_str)
            .map_err(|e| ConfigError::InvalidVar("BIND_ADDRESS".into(), e.to_string()))?;

        let bucket_name =
            env::var("BUCKET").map_err(|_| ConfigError::MissingVar("BUCKET".into()))?;

        let giphy_api_key =
            env::var("GIPHY_API").map_err(|_| ConfigError::MissingVar("GIPHY_API".into()))?;

        // Override point for stub servers in local testing
        let giphy_base_url =
            env::var("GIPHY_BASE_URL").unwrap_or_else(|_| "https://api.giphy.com".to_string());

        let gif_limit = parsed_var("NUMBER_OF_GIFS", DEFAULT_GIF_LIMIT)?;
        let fan_out_limit = parsed_var("FAN_OUT_LIMIT", DEFAULT_FAN_OUT_LIMIT)?;
        if fan_out_limit == 0 {
            return Err(ConfigError::InvalidVar(
                "FAN_OUT_LIMIT".into(),
                "must be at least 1".into(),
            ));
        }

        let aws_region =
            env::var("AWS_DEFAULT_REGION").unwrap_or_else(|_| "ca-central-1".to_string());

        // Allow overriding endpoint for localstack/testing
        let localstack_endpoint = env::var("AWS_ENDPOINT_URL").ok(); // Optional

        Ok(Config {
            bind_address,
            bucket_name,
            giphy_api_key,
            giphy_base_url,
            gif_limit,
            fan_out_limit,
            aws_region,
            localstack_endpoint,
        })
    }
}
