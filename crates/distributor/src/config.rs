//! Distributor configuration
//!
//! Every option has a default and can be overridden from the environment
//! with a `DISTRIBUTOR_` prefixed variable:
//!
//! | Variable                           | Default                               |
//! |------------------------------------|---------------------------------------|
//! | `DISTRIBUTOR_LISTEN`               | `0.0.0.0:9090`                        |
//! | `DISTRIBUTOR_ORG_ID`               | (required)                            |
//! | `DISTRIBUTOR_ORG_NAME`             | empty                                 |
//! | `DISTRIBUTOR_DATABASE_URL`         | `postgres://localhost/notification`   |
//! | `DISTRIBUTOR_DB_CONNECT_TIMEOUT_SECS` | `5`                                |
//! | `DISTRIBUTOR_CHANGE_CHANNEL`       | `notification_changes`                |
//! | `DISTRIBUTOR_BUFFER_SIZE`          | `10`                                  |
//! | `DISTRIBUTOR_STREAM_BUFFER`        | `16`                                  |
//! | `DISTRIBUTOR_RECONNECT_MIN_SECS`   | `10`                                  |
//! | `DISTRIBUTOR_RECONNECT_MAX_SECS`   | `60`                                  |
//! | `DISTRIBUTOR_LOOKUP_TIMEOUT_SECS`  | `3`                                   |
//! | `DISTRIBUTOR_EVENT_NOTIFY_URL`     | `http://event-notify:9090`            |
//! | `DISTRIBUTOR_REGISTRY_URL`         | `http://registry:8080`                |
//! | `DISTRIBUTOR_SUBSCRIBER_URL`       | `http://subscriber-registry:8080`     |
//! | `DISTRIBUTOR_HTTP_TIMEOUT_SECS`    | `3`                                   |

use std::str::FromStr;
use std::time::Duration;

use crate::prelude::*;

const ENV_PREFIX: &str = "DISTRIBUTOR_";

#[derive(Debug, Clone)]
pub struct DistributorConfig {
	/// gRPC listen address
	pub listen: Box<str>,
	/// Organization served by this instance
	pub org_id: Box<str>,
	pub org_name: Box<str>,
	pub database_url: Box<str>,
	/// Change feed channel name
	pub change_channel: Box<str>,
	/// Per-subscriber notification queue capacity
	pub buffer_size: usize,
	/// Outgoing message buffer of one client stream
	pub stream_buffer: usize,
	/// Bound on one change feed connect attempt
	pub db_connect_timeout: Duration,
	pub reconnect_min: Duration,
	pub reconnect_max: Duration,
	pub lookup_timeout: Duration,
	pub event_notify_url: Box<str>,
	/// Base URL of the member and network registry
	pub registry_url: Box<str>,
	pub subscriber_url: Box<str>,
	pub http_timeout: Duration,
}

impl Default for DistributorConfig {
	fn default() -> Self {
		Self {
			listen: "0.0.0.0:9090".into(),
			org_id: "".into(),
			org_name: "".into(),
			database_url: "postgres://localhost/notification".into(),
			change_channel: distributor_core::pump::DEFAULT_CHANNEL.into(),
			buffer_size: 10,
			stream_buffer: 16,
			db_connect_timeout: Duration::from_secs(5),
			reconnect_min: Duration::from_secs(10),
			reconnect_max: Duration::from_secs(60),
			lookup_timeout: Duration::from_secs(3),
			event_notify_url: "http://event-notify:9090".into(),
			registry_url: "http://registry:8080".into(),
			subscriber_url: "http://subscriber-registry:8080".into(),
			http_timeout: Duration::from_secs(3),
		}
	}
}

impl DistributorConfig {
	/// Load configuration from the process environment
	pub fn from_env() -> ClResult<Self> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Load configuration from an arbitrary key lookup.
	///
	/// Keys are passed with the `DISTRIBUTOR_` prefix.
	pub fn from_lookup<F>(lookup: F) -> ClResult<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let var = |name: &str| {
			lookup(&format!("{}{}", ENV_PREFIX, name))
				.map(|value| value.trim().to_string())
				.filter(|value| !value.is_empty())
		};

		let mut config = Self::default();
		if let Some(value) = var("LISTEN") {
			config.listen = value.into();
		}
		if let Some(value) = var("ORG_ID") {
			config.org_id = value.into();
		}
		if let Some(value) = var("ORG_NAME") {
			config.org_name = value.into();
		}
		if let Some(value) = var("DATABASE_URL") {
			config.database_url = value.into();
		}
		if let Some(value) = var("CHANGE_CHANNEL") {
			config.change_channel = value.into();
		}
		if let Some(value) = var("BUFFER_SIZE") {
			config.buffer_size = parse("BUFFER_SIZE", &value)?;
		}
		if let Some(value) = var("STREAM_BUFFER") {
			config.stream_buffer = parse("STREAM_BUFFER", &value)?;
		}
		if let Some(value) = var("DB_CONNECT_TIMEOUT_SECS") {
			config.db_connect_timeout =
				Duration::from_secs(parse("DB_CONNECT_TIMEOUT_SECS", &value)?);
		}
		if let Some(value) = var("RECONNECT_MIN_SECS") {
			config.reconnect_min = Duration::from_secs(parse("RECONNECT_MIN_SECS", &value)?);
		}
		if let Some(value) = var("RECONNECT_MAX_SECS") {
			config.reconnect_max = Duration::from_secs(parse("RECONNECT_MAX_SECS", &value)?);
		}
		if let Some(value) = var("LOOKUP_TIMEOUT_SECS") {
			config.lookup_timeout = Duration::from_secs(parse("LOOKUP_TIMEOUT_SECS", &value)?);
		}
		if let Some(value) = var("EVENT_NOTIFY_URL") {
			config.event_notify_url = value.into();
		}
		if let Some(value) = var("REGISTRY_URL") {
			config.registry_url = value.into();
		}
		if let Some(value) = var("SUBSCRIBER_URL") {
			config.subscriber_url = value.into();
		}
		if let Some(value) = var("HTTP_TIMEOUT_SECS") {
			config.http_timeout = Duration::from_secs(parse("HTTP_TIMEOUT_SECS", &value)?);
		}

		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> ClResult<()> {
		if self.org_id.is_empty() {
			return Err(Error::ConfigError(format!("{}ORG_ID is required", ENV_PREFIX)));
		}
		if self.change_channel.is_empty() {
			return Err(Error::ConfigError("change channel must not be empty".into()));
		}
		if self.buffer_size == 0 || self.stream_buffer == 0 {
			return Err(Error::ConfigError("buffer sizes must be positive".into()));
		}
		if self.reconnect_min.is_zero() || self.reconnect_min > self.reconnect_max {
			return Err(Error::ConfigError(format!(
				"invalid reconnect window {:?}..{:?}",
				self.reconnect_min, self.reconnect_max
			)));
		}
		if self.lookup_timeout.is_zero()
			|| self.http_timeout.is_zero()
			|| self.db_connect_timeout.is_zero()
		{
			return Err(Error::ConfigError("timeouts must be positive".into()));
		}
		Ok(())
	}
}

fn parse<T: FromStr>(name: &str, value: &str) -> ClResult<T> {
	value.parse().map_err(|_| {
		Error::ConfigError(format!("invalid value for {}{}: {:?}", ENV_PREFIX, name, value))
	})
}


// vim: ts=4
