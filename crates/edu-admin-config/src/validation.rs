// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration validation rules.

use std::time::Duration;

use tracing::warn;

use crate::runtime::AdminConfig;
use crate::ConfigError;

pub fn validate_config(config: &AdminConfig) -> Result<(), ConfigError> {
	let base_url = &config.api.base_url;
	if base_url.is_empty() {
		return Err(ConfigError::invalid_value(
			"api.base_url",
			"base_url cannot be empty",
		));
	}
	if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
		return Err(ConfigError::invalid_value(
			"api.base_url",
			format!("expected an http(s) URL, got '{base_url}'"),
		));
	}
	if base_url.starts_with("http://") && !is_loopback(base_url) {
		warn!(base_url = %base_url, "api.base_url is not using TLS");
	}

	if config.api.request_timeout == Duration::ZERO {
		return Err(ConfigError::invalid_value(
			"api.request_timeout_secs",
			"must be greater than zero",
		));
	}

	if config.retry.max_attempts == 0 {
		return Err(ConfigError::invalid_value(
			"retry.max_attempts",
			"must be at least 1",
		));
	}
	if config.retry.base_delay > config.retry.max_delay {
		return Err(ConfigError::invalid_value(
			"retry.base_delay_ms",
			"cannot exceed retry.max_delay_ms",
		));
	}

	if config.policies.stale_time == Duration::ZERO {
		warn!("policies.stale_time_secs is 0, policies will be refetched on every use");
	}

	Ok(())
}

fn is_loopback(url: &str) -> bool {
	let host = url
		.trim_start_matches("http://")
		.split(['/', ':'])
		.next()
		.unwrap_or_default();
	matches!(host, "localhost" | "127.0.0.1")
}
