// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Where policy documents come from.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use edu_common_http::RetryConfig;
use edu_policy_core::PolicyDocument;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::error::{PolicyError, Result};

/// Credential of the signed-in principal. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
	pub fn new(token: impl Into<String>) -> Self {
		Self(token.into())
	}

	pub fn expose(&self) -> &str {
		&self.0
	}

	pub fn is_blank(&self) -> bool {
		self.0.trim().is_empty()
	}
}

impl fmt::Debug for BearerToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("BearerToken([REDACTED])")
	}
}

/// Fetches the policy document of the principal holding `token`.
#[async_trait]
pub trait PolicySource: Send + Sync {
	async fn fetch(&self, token: &BearerToken) -> Result<PolicyDocument>;
}

/// Body of `GET /policies`.
#[derive(Debug, Deserialize)]
struct PoliciesResponse {
	#[serde(rename = "permissionSet")]
	permission_set: PolicyDocument,
}

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Builder for [`HttpPolicySource`].
pub struct HttpPolicySourceBuilder {
	base_url: Option<String>,
	request_timeout: Duration,
	retry_config: RetryConfig,
}

impl HttpPolicySourceBuilder {
	pub fn new() -> Self {
		Self {
			base_url: None,
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
			retry_config: RetryConfig::default(),
		}
	}

	/// Sets the API base URL, e.g. `https://admin.school.example`.
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = Some(url.into());
		self
	}

	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;
		self
	}

	pub fn retry_config(mut self, config: RetryConfig) -> Self {
		self.retry_config = config;
		self
	}

	pub fn build(self) -> Result<HttpPolicySource> {
		let base_url = self.base_url.ok_or(PolicyError::InvalidBaseUrl)?;
		if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
			return Err(PolicyError::InvalidBaseUrl);
		}

		let http_client = edu_common_http::builder_with_timeout(self.request_timeout)
			.build()
			.map_err(PolicyError::ClientBuild)?;

		Ok(HttpPolicySource {
			base_url: base_url.trim_end_matches('/').to_string(),
			http_client,
			retry_config: self.retry_config,
		})
	}
}

impl Default for HttpPolicySourceBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Reads the policy document from the admin API.
///
/// Holds no credential of its own: every fetch is made with the token of
/// the session asking for it.
#[derive(Debug)]
pub struct HttpPolicySource {
	base_url: String,
	http_client: Client,
	retry_config: RetryConfig,
}

impl HttpPolicySource {
	pub fn builder() -> HttpPolicySourceBuilder {
		HttpPolicySourceBuilder::new()
	}

	pub fn policies_url(&self) -> String {
		format!("{}/policies", self.base_url)
	}

	async fn fetch_once(&self, token: &BearerToken) -> Result<PolicyDocument> {
		let response = self
			.http_client
			.get(self.policies_url())
			.bearer_auth(token.expose())
			.header(ACCEPT, "application/json")
			.send()
			.await
			.map_err(PolicyError::RequestFailed)?;

		let status = response.status();
		if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
			return Err(PolicyError::Unauthorized);
		}
		if !status.is_success() {
			let message = response.text().await.unwrap_or_default();
			return Err(PolicyError::ServerError {
				status: status.as_u16(),
				message,
			});
		}

		let body = response.text().await.map_err(PolicyError::RequestFailed)?;
		let parsed: PoliciesResponse =
			serde_json::from_str(&body).map_err(|e| PolicyError::ParseFailed(e.to_string()))?;

		debug!(actions = parsed.permission_set.len(), "decoded policy document");
		Ok(parsed.permission_set)
	}
}

#[async_trait]
impl PolicySource for HttpPolicySource {
	async fn fetch(&self, token: &BearerToken) -> Result<PolicyDocument> {
		if token.is_blank() {
			return Err(PolicyError::MissingToken);
		}
		debug!(url = %self.policies_url(), "fetching policy document");
		edu_common_http::retry(&self.retry_config, || self.fetch_once(token)).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn build_requires_base_url() {
		let err = HttpPolicySource::builder().build().unwrap_err();
		assert!(matches!(err, PolicyError::InvalidBaseUrl));
	}

	#[test]
	fn build_rejects_non_http_base_url() {
		let err = HttpPolicySource::builder()
			.base_url("admin.school.example")
			.build()
			.unwrap_err();
		assert!(matches!(err, PolicyError::InvalidBaseUrl));
	}

	#[tokio::test]
	async fn blank_token_is_rejected_before_any_request() {
		let source = HttpPolicySource::builder()
			.base_url("https://admin.school.example")
			.build()
			.unwrap();
		let err = source.fetch(&BearerToken::new("  ")).await.unwrap_err();
		assert!(matches!(err, PolicyError::MissingToken));
	}

	#[test]
	fn policies_url_drops_trailing_slash() {
		let source = HttpPolicySource::builder()
			.base_url("https://admin.school.example/api/")
			.build()
			.unwrap();
		assert_eq!(source.policies_url(), "https://admin.school.example/api/policies");
	}

	#[test]
	fn token_debug_is_redacted() {
		let token = BearerToken::new("very-secret-token");
		let rendered = format!("{token:?}");
		assert!(!rendered.contains("very-secret-token"));
		assert_eq!(token.expose(), "very-secret-token");
	}

	#[test]
	fn response_wrapper_decodes_permission_set() {
		let body = r#"{"permissionSet": {"course:read": {"scopes": ["admin"]}}}"#;
		let parsed: PoliciesResponse = serde_json::from_str(body).unwrap();
		assert_eq!(parsed.permission_set.len(), 1);
	}
}
