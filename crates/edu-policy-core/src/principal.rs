// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The signed-in account and the surface it sees.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PolicyCoreError;

/// Which admin surface an account uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
	/// Student-facing surface.
	Student,
	/// Staff-facing surface.
	User,
}

impl AccountType {
	pub fn as_str(&self) -> &'static str {
		match self {
			AccountType::Student => "student",
			AccountType::User => "user",
		}
	}
}

impl FromStr for AccountType {
	type Err = PolicyCoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"student" => Ok(AccountType::Student),
			"user" => Ok(AccountType::User),
			other => Err(PolicyCoreError::UnknownAccountType(other.to_string())),
		}
	}
}

impl fmt::Display for AccountType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// The authenticated account, as returned by the backend.
///
/// Orthogonal to the policy document: it picks the navigation surface, the
/// document decides what is allowed on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
	pub login_id: String,
	pub account_type: AccountType,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
}

impl Principal {
	pub fn new(login_id: impl Into<String>, account_type: AccountType) -> Self {
		Self {
			login_id: login_id.into(),
			account_type,
			name: None,
		}
	}

	/// Builder: set the display name.
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn is_student(&self) -> bool {
		self.account_type == AccountType::Student
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn principal_decodes_camel_case() {
		let principal: Principal =
			serde_json::from_str(r#"{"loginId":"jdoe","accountType":"student"}"#).unwrap();
		assert_eq!(principal, Principal::new("jdoe", AccountType::Student));
		assert!(principal.is_student());
	}

	#[test]
	fn principal_encodes_without_missing_name() {
		let json = serde_json::to_value(Principal::new("ops", AccountType::User)).unwrap();
		assert_eq!(
			json,
			serde_json::json!({ "loginId": "ops", "accountType": "user" })
		);
	}

	#[test]
	fn account_type_parses() {
		assert_eq!("user".parse::<AccountType>().unwrap(), AccountType::User);
		assert!("staff".parse::<AccountType>().is_err());
	}
}
