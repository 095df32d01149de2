// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration registry - manages sources and merges layers.

use tracing::{debug, info};

use crate::layer::ConfigLayer;
use crate::paths::PathsConfig;
use crate::runtime::AdminConfig;
use crate::sources::ConfigSource;
use crate::validation::validate_config;
use crate::ConfigError;

/// Registry that manages configuration sources and merges them.
#[derive(Default)]
pub struct ConfigRegistry {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl ConfigRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register(&mut self, source: Box<dyn ConfigSource>) {
		debug!(source = source.name(), precedence = ?source.precedence(), "registering config source");
		self.sources.push(source);
	}

	/// Load configuration from all sources, merge, and validate.
	///
	/// Sources are merged lowest precedence first so higher precedence
	/// sources override lower ones. A source that fails to load fails the
	/// whole load: a broken file should not be silently ignored.
	pub fn load(&self, paths: PathsConfig) -> Result<AdminConfig, ConfigError> {
		let mut sorted: Vec<_> = self.sources.iter().collect();
		sorted.sort_by_key(|s| s.precedence());

		let mut merged = ConfigLayer::default();
		for source in sorted {
			let layer = source.load()?;
			debug!(source = source.name(), "merged config layer");
			merged.merge(layer);
		}

		let config = AdminConfig::from_layer(merged, paths)?;
		validate_config(&config)?;

		info!(
			base_url = %config.api.base_url,
			stale_time_secs = config.policies.stale_time.as_secs(),
			has_token = config.api.token.is_some(),
			log_level = config.logging.level.as_str(),
			"configuration loaded"
		);

		Ok(config)
	}

	pub fn source_count(&self) -> usize {
		self.sources.len()
	}
}
