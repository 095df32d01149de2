// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy vocabulary: the closed sets of actions and scopes.
//!
//! - [`Action`]: an operation class on a resource, written `"<resource>:<verb>"`
//!   on the wire (e.g. `course:read`, `grade:write`)
//! - [`Scope`]: the breadth of authority a principal holds for an action
//!
//! Both are closed enumerations. Strings outside these sets are rejected by
//! [`FromStr`] and skipped when decoding a policy document.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PolicyCoreError;

// =============================================================================
// Actions
// =============================================================================

macro_rules! define_actions {
	($($variant:ident => $wire:literal, $doc:literal;)*) => {
		/// An operation class on a resource.
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		pub enum Action {
			$(
				#[doc = $doc]
				#[serde(rename = $wire)]
				$variant,
			)*
		}

		impl Action {
			/// Every action, in declaration order.
			pub const ALL: &'static [Action] = &[$(Action::$variant,)*];

			/// Returns the wire form, e.g. `"course:read"`.
			pub fn as_str(&self) -> &'static str {
				match self {
					$(Action::$variant => $wire,)*
				}
			}
		}

		impl FromStr for Action {
			type Err = PolicyCoreError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				match s {
					$($wire => Ok(Action::$variant),)*
					other => Err(PolicyCoreError::UnknownAction(other.to_string())),
				}
			}
		}
	};
}

define_actions! {
	OrganizationRead => "organization:read", "View organizations.";
	OrganizationWrite => "organization:write", "Create or edit organizations.";
	ProgramRead => "program:read", "View programs.";
	ProgramWrite => "program:write", "Create or edit programs and their course tags.";
	CourseRead => "course:read", "View courses.";
	CourseWrite => "course:write", "Create or edit courses.";
	ModuleRead => "module:read", "View course modules and sections.";
	ModuleWrite => "module:write", "Build or edit course modules and sections.";
	BatchRead => "batch:read", "View batches.";
	BatchWrite => "batch:write", "Create or edit batches and their student tags.";
	StudentRead => "student:read", "View students.";
	StudentWrite => "student:write", "Create or edit students.";
	UserRead => "user:read", "View staff users.";
	UserWrite => "user:write", "Create or edit staff users.";
	SubmissionRead => "submission:read", "View assignment submissions.";
	SubmissionWrite => "submission:write", "Upload or replace assignment submissions.";
	GradeRead => "grade:read", "View grades.";
	GradeWrite => "grade:write", "Grade assignment submissions.";
}

impl fmt::Display for Action {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

// =============================================================================
// Scopes
// =============================================================================

/// Breadth of authority the principal holds for an action.
///
/// Scopes carry no ordering. Any hierarchy between them is expressed by the
/// server granting several scopes, never by the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
	/// The principal's own records. Wire name `self`.
	#[serde(rename = "self")]
	Own,
	/// Records of the people the principal supervises.
	Supervisor,
	/// Everything inside the principal's organization.
	Organization,
	/// Everything inside the programs the principal manages.
	Program,
	/// Everything.
	Admin,
}

impl Scope {
	pub const ALL: &'static [Scope] = &[
		Scope::Own,
		Scope::Supervisor,
		Scope::Organization,
		Scope::Program,
		Scope::Admin,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			Scope::Own => "self",
			Scope::Supervisor => "supervisor",
			Scope::Organization => "organization",
			Scope::Program => "program",
			Scope::Admin => "admin",
		}
	}
}

impl FromStr for Scope {
	type Err = PolicyCoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"self" => Ok(Scope::Own),
			"supervisor" => Ok(Scope::Supervisor),
			"organization" => Ok(Scope::Organization),
			"program" => Ok(Scope::Program),
			"admin" => Ok(Scope::Admin),
			other => Err(PolicyCoreError::UnknownScope(other.to_string())),
		}
	}
}

impl fmt::Display for Scope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
