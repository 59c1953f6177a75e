use std::{path::Path, time::Duration};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use url::Url;

use super::{BaseHttpClientConfig, deserialize_duration_from_seconds};
use crate::models::DestinationId;

/// The community tick feed polled by default.
pub const DEFAULT_TICK_URL: &str = "http://tick.infomancer.uk/galtick.json";

fn default_tick_url() -> Url {
    Url::parse(DEFAULT_TICK_URL).expect("default tick URL is valid")
}

/// Provides the default value for check_interval (5 minutes).
fn default_check_interval() -> Duration {
    Duration::from_secs(5 * 60)
}

/// Application configuration for Galtick.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Discord bot token. Required; startup fails without it.
    pub discord_token: String,

    /// URL of the tick feed.
    #[serde(default = "default_tick_url")]
    pub tick_url: Url,

    /// Channel that receives tick announcements. Absent (or `0`, for parity
    /// with the historical env convention) leaves notifications disabled
    /// until `!tickchannel` reconfigures a destination at runtime.
    #[serde(default)]
    pub tick_channel_id: Option<u64>,

    /// The interval in seconds between tick checks.
    #[serde(
        default = "default_check_interval",
        deserialize_with = "deserialize_duration_from_seconds"
    )]
    pub check_interval: Duration,

    /// Configuration for the HTTP client used to poll the feed.
    #[serde(default)]
    pub http: BaseHttpClientConfig,
}

impl AppConfig {
    /// Loads configuration from an optional TOML file layered under
    /// `GALTICK_`-prefixed environment variables.
    ///
    /// With no explicit path, `galtick.toml` in the working directory is used
    /// if present. Environment variables always win, e.g.
    /// `GALTICK_DISCORD_TOKEN` or `GALTICK_CHECK_INTERVAL`.
    pub fn new(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        builder = match config_path {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::with_name("galtick").required(false)),
        };
        builder = builder.add_source(Environment::with_prefix("GALTICK"));

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.discord_token.trim().is_empty() {
            return Err(ConfigError::Message("discord_token must not be empty".into()));
        }
        if self.check_interval.is_zero() {
            return Err(ConfigError::Message("check_interval must be at least 1 second".into()));
        }
        Ok(())
    }

    /// The startup notification destination, if one is configured.
    pub fn notification_destination(&self) -> Option<DestinationId> {
        self.tick_channel_id.filter(|id| *id != 0).map(DestinationId::new)
    }
}
