// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! XDG Base Directory compliant config file locations.

use std::path::PathBuf;

use crate::ConfigError;

const APP_DIR: &str = "edu-admin";
const CONFIG_FILE: &str = "config.toml";

/// Resolved config file locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathsConfig {
	/// User config file: ~/.config/edu-admin/config.toml
	pub user_config_file: PathBuf,
	/// System config file: /etc/edu-admin/config.toml
	pub system_config_file: PathBuf,
	/// Workspace config file: ./.edu-admin/config.toml
	pub workspace_config_file: PathBuf,
}

impl Default for PathsConfig {
	fn default() -> Self {
		Self {
			user_config_file: PathBuf::from("~/.config/edu-admin/config.toml"),
			system_config_file: PathBuf::from("/etc/edu-admin/config.toml"),
			workspace_config_file: PathBuf::from(".edu-admin/config.toml"),
		}
	}
}

/// Resolve config paths, honouring `XDG_CONFIG_HOME`.
pub fn resolve_xdg_paths() -> Result<PathsConfig, ConfigError> {
	let config_home = match std::env::var_os("XDG_CONFIG_HOME") {
		Some(dir) if !dir.is_empty() => PathBuf::from(dir),
		_ => dirs::home_dir()
			.ok_or(ConfigError::HomeDirNotFound)?
			.join(".config"),
	};

	let cwd = std::env::current_dir()?;

	tracing::debug!(config_home = %config_home.display(), "resolved XDG config home");

	Ok(PathsConfig {
		user_config_file: config_home.join(APP_DIR).join(CONFIG_FILE),
		system_config_file: PathBuf::from("/etc").join(APP_DIR).join(CONFIG_FILE),
		workspace_config_file: cwd.join(format!(".{APP_DIR}")).join(CONFIG_FILE),
	})
}
