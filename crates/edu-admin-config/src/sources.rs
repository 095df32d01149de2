// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: files, environment, CLI, defaults.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::layer::ConfigLayer;
use crate::paths::PathsConfig;
use crate::runtime::ApiToken;
use crate::ConfigError;

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	SystemFile = 20,
	UserFile = 30,
	WorkspaceFile = 40,
	Environment = 50,
	Cli = 60,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	/// Name for logging
	fn name(&self) -> &'static str;

	/// Precedence level
	fn precedence(&self) -> Precedence;

	/// Load configuration layer from this source
	fn load(&self) -> Result<ConfigLayer, ConfigError>;
}

/// Built-in defaults source. Defaults are applied when resolving the runtime
/// config, so this contributes an empty layer.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		Ok(ConfigLayer::default())
	}
}

/// File-based configuration source (TOML). A missing file is an empty layer.
pub struct FileSource {
	path: PathBuf,
	precedence: Precedence,
	name: &'static str,
}

impl FileSource {
	pub fn system(paths: &PathsConfig) -> Self {
		Self::custom(
			paths.system_config_file.clone(),
			Precedence::SystemFile,
			"system-config",
		)
	}

	pub fn user(paths: &PathsConfig) -> Self {
		Self::custom(
			paths.user_config_file.clone(),
			Precedence::UserFile,
			"user-config",
		)
	}

	pub fn workspace(paths: &PathsConfig) -> Self {
		Self::custom(
			paths.workspace_config_file.clone(),
			Precedence::WorkspaceFile,
			"workspace-config",
		)
	}

	/// Custom file path with specified precedence
	pub fn custom(path: PathBuf, precedence: Precedence, name: &'static str) -> Self {
		Self {
			path,
			precedence,
			name,
		}
	}
}

impl ConfigSource for FileSource {
	fn name(&self) -> &'static str {
		self.name
	}

	fn precedence(&self) -> Precedence {
		self.precedence
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), source = self.name, "config file not found, skipping");
			return Ok(ConfigLayer::default());
		}

		debug!(path = %self.path.display(), source = self.name, "loading config file");

		let content = std::fs::read_to_string(&self.path)?;
		toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
			path: self.path.clone(),
			source: e,
		})
	}
}

/// Environment variable source.
///
/// Recognised variables:
/// `EDU_ADMIN_BASE_URL`, `EDU_ADMIN_REQUEST_TIMEOUT_SECS`,
/// `EDU_ADMIN_POLICY_STALE_SECS`, `EDU_ADMIN_RETRY_MAX_ATTEMPTS`,
/// `EDU_ADMIN_LOG_LEVEL`, `EDU_ADMIN_TOKEN`.
pub struct EnvSource {
	vars: Option<Vec<(String, String)>>,
}

impl EnvSource {
	/// Reads the process environment at load time.
	pub fn new() -> Self {
		Self { vars: None }
	}

	/// Uses a fixed set of variables instead of the process environment.
	pub fn from_vars<I, K, V>(vars: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			vars: Some(
				vars
					.into_iter()
					.map(|(k, v)| (k.into(), v.into()))
					.collect(),
			),
		}
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new()
	}
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
	value
		.parse()
		.map_err(|_| ConfigError::invalid_value(key, format!("expected a number, got '{value}'")))
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		let vars = match &self.vars {
			Some(vars) => vars.clone(),
			None => std::env::vars().collect(),
		};

		let mut layer = ConfigLayer::default();

		for (key, value) in vars {
			if !key.starts_with("EDU_ADMIN_") {
				continue;
			}

			let value = value.trim().to_string();
			if value.is_empty() {
				continue;
			}

			match key.as_str() {
				"EDU_ADMIN_BASE_URL" => layer.api_mut().base_url = Some(value),
				"EDU_ADMIN_REQUEST_TIMEOUT_SECS" => {
					layer.api_mut().request_timeout_secs = Some(parse_number(&key, &value)?)
				}
				"EDU_ADMIN_TOKEN" => {
					trace!("loaded API token from environment");
					layer.api_mut().token = Some(ApiToken::new(value));
					continue;
				}
				"EDU_ADMIN_POLICY_STALE_SECS" => {
					layer.policies_mut().stale_time_secs = Some(parse_number(&key, &value)?)
				}
				"EDU_ADMIN_RETRY_MAX_ATTEMPTS" => {
					layer.retry_mut().max_attempts = Some(parse_number(&key, &value)?)
				}
				"EDU_ADMIN_LOG_LEVEL" => layer.logging_mut().level = Some(value),
				_ => {
					trace!(key = %key, "ignoring unrecognised env var");
					continue;
				}
			}
			trace!(key = %key, "applied env var");
		}

		Ok(layer)
	}
}

/// Values passed on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
	pub base_url: Option<String>,
	pub token: Option<String>,
	pub log_level: Option<String>,
}

pub struct CliSource {
	overrides: CliOverrides,
}

impl CliSource {
	pub fn new(overrides: CliOverrides) -> Self {
		Self { overrides }
	}
}

impl ConfigSource for CliSource {
	fn name(&self) -> &'static str {
		"cli"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Cli
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		let mut layer = ConfigLayer::default();
		if let Some(url) = &self.overrides.base_url {
			layer.api_mut().base_url = Some(url.clone());
		}
		if let Some(token) = &self.overrides.token {
			layer.api_mut().token = Some(ApiToken::new(token.clone()));
		}
		if let Some(level) = &self.overrides.log_level {
			layer.logging_mut().level = Some(level.clone());
		}
		Ok(layer)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn missing_file_is_empty_layer() {
		let source = FileSource::custom(
			PathBuf::from("/definitely/not/here.toml"),
			Precedence::UserFile,
			"test",
		);
		let layer = source.load().unwrap();
		assert!(layer.api.is_none());
	}

	#[test]
	fn file_source_parses_toml() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			"[api]\nbase_url = \"https://api.school.test\"\n[policies]\nstale_time_secs = 60"
		)
		.unwrap();

		let source = FileSource::custom(file.path().to_path_buf(), Precedence::UserFile, "test");
		let layer = source.load().unwrap();
		assert_eq!(
			layer.api.unwrap().base_url.as_deref(),
			Some("https://api.school.test")
		);
		assert_eq!(layer.policies.unwrap().stale_time_secs, Some(60));
	}

	#[test]
	fn file_source_reports_parse_errors() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[api\nbase_url = ").unwrap();

		let source = FileSource::custom(file.path().to_path_buf(), Precedence::UserFile, "test");
		assert!(matches!(
			source.load(),
			Err(ConfigError::TomlParse { .. })
		));
	}

	#[test]
	fn env_source_reads_known_vars() {
		let source = EnvSource::from_vars([
			("EDU_ADMIN_BASE_URL", "https://env.example.com"),
			("EDU_ADMIN_POLICY_STALE_SECS", "120"),
			("EDU_ADMIN_TOKEN", "tok"),
			("EDU_ADMIN_UNKNOWN", "x"),
			("PATH", "/usr/bin"),
		]);
		let layer = source.load().unwrap();
		let api = layer.api.unwrap();
		assert_eq!(api.base_url.as_deref(), Some("https://env.example.com"));
		assert_eq!(api.token.unwrap().expose(), "tok");
		assert_eq!(layer.policies.unwrap().stale_time_secs, Some(120));
	}

	#[test]
	fn env_source_rejects_non_numeric_values() {
		let source = EnvSource::from_vars([("EDU_ADMIN_POLICY_STALE_SECS", "soon")]);
		assert!(matches!(
			source.load(),
			Err(ConfigError::InvalidValue { .. })
		));
	}

	#[test]
	fn env_source_skips_blank_values() {
		let source = EnvSource::from_vars([("EDU_ADMIN_BASE_URL", "   ")]);
		assert!(source.load().unwrap().api.is_none());
	}

	#[test]
	fn precedence_order() {
		assert!(Precedence::Defaults < Precedence::SystemFile);
		assert!(Precedence::UserFile < Precedence::WorkspaceFile);
		assert!(Precedence::Environment < Precedence::Cli);
	}
}
