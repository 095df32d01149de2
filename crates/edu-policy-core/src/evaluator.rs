// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Scope evaluation.
//!
//! [`check_action_scopes`] answers "may the current principal perform this
//! action at one of these scopes?" against a policy document. It is pure and
//! cheap enough to call on every render.
//!
//! Evaluation is fail-closed: a missing document (not fetched yet, fetch
//! failed, signed out) or a missing action entry always denies.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::document::PolicyDocument;
use crate::types::{Action, Scope};

/// How the requested scopes are matched against the granted ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeMatch {
	/// At least one requested scope is granted.
	#[default]
	Any,
	/// Every requested scope is granted.
	All,
}

/// Evaluates whether `document` grants `action` at the requested scopes.
///
/// * `ScopeMatch::Any`: true iff the granted and requested scopes intersect.
///   An empty request is always denied.
/// * `ScopeMatch::All`: true iff every requested scope is granted. An empty
///   request is allowed when the document has an entry for `action`; route
///   rules never issue empty requests.
pub fn check_action_scopes(
	document: Option<&PolicyDocument>,
	action: Action,
	requested: &[Scope],
	mode: ScopeMatch,
) -> bool {
	let allowed = match document.and_then(|doc| doc.granted_scopes(action)) {
		None => false,
		Some(granted) => match mode {
			ScopeMatch::Any => requested.iter().any(|scope| granted.contains(scope)),
			ScopeMatch::All => requested.iter().all(|scope| granted.contains(scope)),
		},
	};

	trace!(
		action = %action,
		mode = ?mode,
		requested = ?requested,
		has_document = document.is_some(),
		allowed,
		"evaluated scope check"
	);

	allowed
}

/// Shorthand for [`check_action_scopes`] with [`ScopeMatch::Any`].
pub fn has_any_scope(document: Option<&PolicyDocument>, action: Action, scopes: &[Scope]) -> bool {
	check_action_scopes(document, action, scopes, ScopeMatch::Any)
}

/// Shorthand for [`check_action_scopes`] with [`ScopeMatch::All`].
pub fn has_all_scopes(document: Option<&PolicyDocument>, action: Action, scopes: &[Scope]) -> bool {
	check_action_scopes(document, action, scopes, ScopeMatch::All)
}

/// One evaluator call captured as data, so rule tables need no closures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeCheck {
	pub action: Action,
	pub scopes: &'static [Scope],
	pub mode: ScopeMatch,
}

impl ScopeCheck {
	pub const fn any(action: Action, scopes: &'static [Scope]) -> Self {
		Self {
			action,
			scopes,
			mode: ScopeMatch::Any,
		}
	}

	pub const fn all(action: Action, scopes: &'static [Scope]) -> Self {
		Self {
			action,
			scopes,
			mode: ScopeMatch::All,
		}
	}

	pub fn evaluate(&self, document: Option<&PolicyDocument>) -> bool {
		check_action_scopes(document, self.action, self.scopes, self.mode)
	}
}
