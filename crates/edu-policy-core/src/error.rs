// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Errors raised when parsing policy vocabulary from strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyCoreError {
	#[error("unknown action: {0}")]
	UnknownAction(String),

	#[error("unknown scope: {0}")]
	UnknownScope(String),

	#[error("unknown account type: {0}")]
	UnknownAccountType(String),

	#[error("unknown route: {0}")]
	UnknownRoute(String),
}

pub type Result<T> = std::result::Result<T, PolicyCoreError>;
