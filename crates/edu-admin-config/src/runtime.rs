// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Runtime configuration types with resolved defaults.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub use edu_policy_core::DEFAULT_POLICY_STALE_TIME;

use crate::layer::ConfigLayer;
use crate::paths::PathsConfig;
use crate::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Bearer token for the admin API. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
	pub fn new(token: impl Into<String>) -> Self {
		Self(token.into())
	}

	pub fn expose(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for ApiToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("ApiToken([REDACTED])")
	}
}

/// The final, validated configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
	pub api: ApiConfig,
	pub policies: PolicyCacheConfig,
	pub retry: RetrySettings,
	pub logging: LoggingConfig,
	pub paths: PathsConfig,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
	pub base_url: String,
	pub request_timeout: Duration,
	pub token: Option<ApiToken>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyCacheConfig {
	pub stale_time: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySettings {
	pub max_attempts: u32,
	pub base_delay: Duration,
	pub max_delay: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggingConfig {
	pub level: LogLevel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
	Trace,
	Debug,
	#[default]
	Info,
	Warn,
	Error,
}

impl LogLevel {
	pub fn as_str(&self) -> &'static str {
		match self {
			LogLevel::Trace => "trace",
			LogLevel::Debug => "debug",
			LogLevel::Info => "info",
			LogLevel::Warn => "warn",
			LogLevel::Error => "error",
		}
	}
}

impl FromStr for LogLevel {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"trace" => Ok(LogLevel::Trace),
			"debug" => Ok(LogLevel::Debug),
			"info" => Ok(LogLevel::Info),
			"warn" | "warning" => Ok(LogLevel::Warn),
			"error" => Ok(LogLevel::Error),
			other => Err(ConfigError::invalid_value(
				"logging.level",
				format!("unknown level '{other}'"),
			)),
		}
	}
}

impl AdminConfig {
	/// Resolve a merged layer into a runtime config, filling in defaults.
	pub fn from_layer(layer: ConfigLayer, paths: PathsConfig) -> Result<Self, ConfigError> {
		let api = layer.api.unwrap_or_default();
		let policies = layer.policies.unwrap_or_default();
		let retry = layer.retry.unwrap_or_default();
		let logging = layer.logging.unwrap_or_default();

		let level = match logging.level {
			Some(level) => level.parse()?,
			None => LogLevel::default(),
		};

		Ok(Self {
			api: ApiConfig {
				base_url: api
					.base_url
					.map(|url| url.trim_end_matches('/').to_string())
					.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
				request_timeout: api
					.request_timeout_secs
					.map(Duration::from_secs)
					.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
				token: api.token,
			},
			policies: PolicyCacheConfig {
				stale_time: policies
					.stale_time_secs
					.map(Duration::from_secs)
					.unwrap_or(DEFAULT_POLICY_STALE_TIME),
			},
			retry: RetrySettings {
				max_attempts: retry.max_attempts.unwrap_or(3),
				base_delay: Duration::from_millis(retry.base_delay_ms.unwrap_or(200)),
				max_delay: Duration::from_millis(retry.max_delay_ms.unwrap_or(5_000)),
			},
			logging: LoggingConfig { level },
			paths,
		})
	}
}
