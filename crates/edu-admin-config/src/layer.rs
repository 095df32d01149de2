// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration layer for merging from multiple sources.

use serde::Deserialize;

use crate::runtime::ApiToken;

/// Partial configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
	#[serde(default)]
	pub api: Option<ApiLayer>,
	#[serde(default)]
	pub policies: Option<PoliciesLayer>,
	#[serde(default)]
	pub retry: Option<RetryLayer>,
	#[serde(default)]
	pub logging: Option<LoggingLayer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiLayer {
	#[serde(default)]
	pub base_url: Option<String>,
	#[serde(default)]
	pub request_timeout_secs: Option<u64>,
	/// Only set from the environment or the command line, never from files.
	#[serde(skip)]
	pub token: Option<ApiToken>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoliciesLayer {
	#[serde(default)]
	pub stale_time_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetryLayer {
	#[serde(default)]
	pub max_attempts: Option<u32>,
	#[serde(default)]
	pub base_delay_ms: Option<u64>,
	#[serde(default)]
	pub max_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingLayer {
	#[serde(default)]
	pub level: Option<String>,
}

impl ConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: ConfigLayer) {
		merge_option(&mut self.api, other.api, ApiLayer::merge);
		merge_option(&mut self.policies, other.policies, PoliciesLayer::merge);
		merge_option(&mut self.retry, other.retry, RetryLayer::merge);
		merge_option(&mut self.logging, other.logging, LoggingLayer::merge);
	}

	pub(crate) fn api_mut(&mut self) -> &mut ApiLayer {
		self.api.get_or_insert_with(ApiLayer::default)
	}

	pub(crate) fn policies_mut(&mut self) -> &mut PoliciesLayer {
		self.policies.get_or_insert_with(PoliciesLayer::default)
	}

	pub(crate) fn retry_mut(&mut self) -> &mut RetryLayer {
		self.retry.get_or_insert_with(RetryLayer::default)
	}

	pub(crate) fn logging_mut(&mut self) -> &mut LoggingLayer {
		self.logging.get_or_insert_with(LoggingLayer::default)
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}

fn take_some<T>(target: &mut Option<T>, source: Option<T>) {
	if source.is_some() {
		*target = source;
	}
}

impl ApiLayer {
	fn merge(&mut self, other: ApiLayer) {
		take_some(&mut self.base_url, other.base_url);
		take_some(&mut self.request_timeout_secs, other.request_timeout_secs);
		take_some(&mut self.token, other.token);
	}
}

impl PoliciesLayer {
	fn merge(&mut self, other: PoliciesLayer) {
		take_some(&mut self.stale_time_secs, other.stale_time_secs);
	}
}

impl RetryLayer {
	fn merge(&mut self, other: RetryLayer) {
		take_some(&mut self.max_attempts, other.max_attempts);
		take_some(&mut self.base_delay_ms, other.base_delay_ms);
		take_some(&mut self.max_delay_ms, other.max_delay_ms);
	}
}

impl LoggingLayer {
	fn merge(&mut self, other: LoggingLayer) {
		take_some(&mut self.level, other.level);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn later_layer_overrides_earlier() {
		let mut base: ConfigLayer = toml::from_str(
			r#"
			[api]
			base_url = "https://base.example.com"
			request_timeout_secs = 10

			[policies]
			stale_time_secs = 600
			"#,
		)
		.unwrap();

		let overlay: ConfigLayer = toml::from_str(
			r#"
			[api]
			base_url = "https://overlay.example.com"
			"#,
		)
		.unwrap();

		base.merge(overlay);

		let api = base.api.unwrap();
		assert_eq!(api.base_url.as_deref(), Some("https://overlay.example.com"));
		assert_eq!(api.request_timeout_secs, Some(10));
		assert_eq!(base.policies.unwrap().stale_time_secs, Some(600));
	}

	#[test]
	fn token_is_not_read_from_files() {
		let layer: ConfigLayer = toml::from_str(
			r#"
			[api]
			base_url = "https://api.example.com"
			"#,
		)
		.unwrap();
		assert!(layer.api.unwrap().token.is_none());
	}

	#[test]
	fn unknown_sections_are_rejected() {
		let result: Result<ConfigLayer, _> = toml::from_str("[providers]\nx = 1\n");
		assert!(result.is_err());
	}

	proptest! {
		#[test]
		fn merge_with_empty_layer_is_identity(stale in proptest::option::of(1u64..100_000)) {
			let mut layer = ConfigLayer::default();
			layer.policies_mut().stale_time_secs = stale;
			layer.merge(ConfigLayer::default());
			prop_assert_eq!(layer.policies.and_then(|p| p.stale_time_secs), stale);
		}

		#[test]
		fn merge_prefers_overlay_values(a in 1u32..50, b in 1u32..50) {
			let mut base = ConfigLayer::default();
			base.retry_mut().max_attempts = Some(a);
			let mut overlay = ConfigLayer::default();
			overlay.retry_mut().max_attempts = Some(b);
			base.merge(overlay);
			prop_assert_eq!(base.retry.and_then(|r| r.max_attempts), Some(b));
		}
	}
}
