// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP client builder with a consistent User-Agent header.

use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Creates a client builder carrying the standard User-Agent.
///
/// Callers finish the builder themselves so that build errors are propagated
/// instead of panicking.
///
/// # Example
/// ```ignore
/// let client = edu_common_http::builder()
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// Creates a builder with the standard User-Agent and the given request
/// timeout.
pub fn builder_with_timeout(timeout: Duration) -> ClientBuilder {
	builder().timeout(timeout)
}

/// Returns the standard User-Agent string.
///
/// Format: `edu-admin/{version} ({os}-{arch})`
pub fn user_agent() -> String {
	format!(
		"edu-admin/{} ({}-{})",
		env!("CARGO_PKG_VERSION"),
		std::env::consts::OS,
		std::env::consts::ARCH
	)
}
