// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration management for the education admin client.
//!
//! This crate provides:
//! - XDG Base Directory compliant path resolution
//! - Layered configuration from multiple sources
//! - TOML configuration file parsing
//! - Environment variable and command line overrides
//! - Configuration validation
//!
//! Precedence, lowest first: defaults, `/etc/edu-admin/config.toml`,
//! `$XDG_CONFIG_HOME/edu-admin/config.toml`, `./.edu-admin/config.toml`,
//! `EDU_ADMIN_*` environment variables, command line.

pub mod error;
pub mod layer;
pub mod paths;
pub mod registry;
pub mod runtime;
pub mod sources;
pub mod validation;

use std::path::PathBuf;

pub use error::ConfigError;
pub use layer::ConfigLayer;
pub use paths::PathsConfig;
pub use registry::ConfigRegistry;
pub use runtime::{
	AdminConfig, ApiConfig, ApiToken, LogLevel, LoggingConfig, PolicyCacheConfig, RetrySettings,
	DEFAULT_POLICY_STALE_TIME,
};
pub use sources::{CliOverrides, ConfigSource, Precedence};

/// Load configuration from all sources with CLI overrides on top.
pub fn load_config(cli: CliOverrides) -> Result<AdminConfig, ConfigError> {
	let paths = paths::resolve_xdg_paths()?;

	let mut registry = ConfigRegistry::new();
	registry.register(Box::new(sources::DefaultsSource));
	registry.register(Box::new(sources::FileSource::system(&paths)));
	registry.register(Box::new(sources::FileSource::user(&paths)));
	registry.register(Box::new(sources::FileSource::workspace(&paths)));
	registry.register(Box::new(sources::EnvSource::new()));
	registry.register(Box::new(sources::CliSource::new(cli)));

	registry.load(paths)
}

/// Load configuration from a single explicit file instead of the standard
/// locations. Environment and CLI overrides still apply.
pub fn load_config_from_file(path: PathBuf, cli: CliOverrides) -> Result<AdminConfig, ConfigError> {
	if !path.exists() {
		return Err(ConfigError::Io(std::io::Error::new(
			std::io::ErrorKind::NotFound,
			format!("config file not found: {}", path.display()),
		)));
	}

	let paths = PathsConfig {
		user_config_file: path.clone(),
		..PathsConfig::default()
	};

	let mut registry = ConfigRegistry::new();
	registry.register(Box::new(sources::DefaultsSource));
	registry.register(Box::new(sources::FileSource::custom(
		path,
		Precedence::UserFile,
		"explicit-config",
	)));
	registry.register(Box::new(sources::EnvSource::new()));
	registry.register(Box::new(sources::CliSource::new(cli)));

	registry.load(paths)
}
