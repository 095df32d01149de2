// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the policy SDK.

use edu_common_http::{is_retryable_status, RetryableError};
use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for the policy SDK.
pub type Result<T> = std::result::Result<T, PolicyError>;

/// Errors that can occur while fetching a policy document.
#[derive(Error, Debug)]
pub enum PolicyError {
	/// Base URL is missing or not an http(s) URL.
	#[error("Invalid or missing base URL")]
	InvalidBaseUrl,

	/// No bearer token was supplied.
	#[error("Missing API token")]
	MissingToken,

	/// The HTTP client could not be constructed.
	#[error("Failed to build HTTP client: {0}")]
	ClientBuild(#[source] reqwest::Error),

	/// HTTP request failed before a response arrived.
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[source] reqwest::Error),

	/// The server rejected the token (401 or 403).
	#[error("Not authorized to read policies")]
	Unauthorized,

	/// Server returned a non-success status.
	#[error("Server returned an error: {status} - {message}")]
	ServerError {
		/// HTTP status code.
		status: u16,
		/// Response body, if any.
		message: String,
	},

	/// Response body was not a policy document.
	#[error("Failed to parse server response: {0}")]
	ParseFailed(String),
}

impl PolicyError {
	/// Returns true for transport failures and throttling or gateway statuses.
	pub fn is_retryable(&self) -> bool {
		match self {
			PolicyError::RequestFailed(err) => RetryableError::is_retryable(err),
			PolicyError::ServerError { status, .. } => StatusCode::from_u16(*status)
				.map(is_retryable_status)
				.unwrap_or(false),
			_ => false,
		}
	}
}

impl RetryableError for PolicyError {
	fn is_retryable(&self) -> bool {
		PolicyError::is_retryable(self)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn gateway_errors_are_retryable() {
		assert!(PolicyError::ServerError {
			status: 503,
			message: "unavailable".to_string()
		}
		.is_retryable());
		assert!(PolicyError::ServerError {
			status: 429,
			message: String::new()
		}
		.is_retryable());
	}

	#[test]
	fn client_errors_are_final() {
		assert!(!PolicyError::Unauthorized.is_retryable());
		assert!(!PolicyError::ParseFailed("eof".to_string()).is_retryable());
		assert!(!PolicyError::ServerError {
			status: 404,
			message: "not found".to_string()
		}
		.is_retryable());
	}

	proptest! {
		#[test]
		fn server_error_classification_matches_http_policy(status in 100u16..600) {
			let err = PolicyError::ServerError { status, message: String::new() };
			let expected = StatusCode::from_u16(status).map(is_retryable_status).unwrap_or(false);
			prop_assert_eq!(err.is_retryable(), expected);
		}
	}
}
