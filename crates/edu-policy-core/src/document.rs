// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The policy document: every action mapped to the scopes the current
//! principal holds for it.
//!
//! A document is built once from the backend response and never mutated
//! afterwards. Callers share it as `Arc<PolicyDocument>` and replace it
//! wholesale on refetch.
//!
//! # Wire format
//!
//! ```json
//! {
//!   "course:read": { "scopes": ["organization", "admin"] },
//!   "batch:write": { "scopes": ["admin"] }
//! }
//! ```
//!
//! Unknown action keys and unknown scope strings are dropped while decoding,
//! so a newer server never breaks an older client and never grants anything
//! the client cannot name. A known action whose entry is malformed is
//! dropped on its own; the rest of the document still loads.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tracing::warn;

use crate::evaluator::{check_action_scopes, ScopeMatch};
use crate::types::{Action, Scope};

/// How long a fetched document may be served before it is refetched.
pub const DEFAULT_POLICY_STALE_TIME: Duration = Duration::from_secs(30 * 60);

/// The scopes held for one action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PolicyAction {
	pub scopes: BTreeSet<Scope>,
}

impl PolicyAction {
	pub fn new(scopes: impl IntoIterator<Item = Scope>) -> Self {
		Self {
			scopes: scopes.into_iter().collect(),
		}
	}

	pub fn has_scope(&self, scope: Scope) -> bool {
		self.scopes.contains(&scope)
	}
}

/// Action to granted-scopes mapping for the current principal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawPolicyDocument")]
pub struct PolicyDocument {
	actions: BTreeMap<Action, PolicyAction>,
}

impl PolicyDocument {
	/// Creates an empty document. Every evaluation against it is denied.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder: grant `scopes` for `action`, merging with existing grants.
	pub fn with_grant(mut self, action: Action, scopes: impl IntoIterator<Item = Scope>) -> Self {
		self
			.actions
			.entry(action)
			.or_default()
			.scopes
			.extend(scopes);
		self
	}

	pub fn get(&self, action: Action) -> Option<&PolicyAction> {
		self.actions.get(&action)
	}

	/// Returns the granted scopes for `action`, or `None` if the document has
	/// no entry for it.
	pub fn granted_scopes(&self, action: Action) -> Option<&BTreeSet<Scope>> {
		self.actions.get(&action).map(|entry| &entry.scopes)
	}

	pub fn contains(&self, action: Action) -> bool {
		self.actions.contains_key(&action)
	}

	pub fn len(&self) -> usize {
		self.actions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.actions.is_empty()
	}

	/// Iterates entries in action declaration order.
	pub fn iter(&self) -> impl Iterator<Item = (Action, &PolicyAction)> {
		self.actions.iter().map(|(action, entry)| (*action, entry))
	}

	/// Evaluates a scope check against this document.
	pub fn allows(&self, action: Action, scopes: &[Scope], mode: ScopeMatch) -> bool {
		check_action_scopes(Some(self), action, scopes, mode)
	}
}

impl FromIterator<(Action, PolicyAction)> for PolicyDocument {
	fn from_iter<I: IntoIterator<Item = (Action, PolicyAction)>>(iter: I) -> Self {
		iter
			.into_iter()
			.fold(PolicyDocument::new(), |doc, (action, entry)| {
				doc.with_grant(action, entry.scopes)
			})
	}
}

impl Serialize for PolicyDocument {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.actions.len()))?;
		for (action, entry) in &self.actions {
			map.serialize_entry(action.as_str(), entry)?;
		}
		map.end()
	}
}

/// Entries stay as raw JSON until the key is known, so one odd-shaped entry
/// cannot fail the whole document.
#[derive(Deserialize)]
#[serde(transparent)]
struct RawPolicyDocument(BTreeMap<String, Value>);

impl From<RawPolicyDocument> for PolicyDocument {
	fn from(raw: RawPolicyDocument) -> Self {
		let mut actions = BTreeMap::new();
		for (key, entry) in raw.0 {
			let Ok(action) = key.parse::<Action>() else {
				warn!(action = %key, "ignoring unknown action in policy document");
				continue;
			};

			let Some(scopes) = decode_scopes(action, &entry) else {
				continue;
			};
			actions.insert(action, PolicyAction { scopes });
		}
		Self { actions }
	}
}

/// Reads `{ "scopes": [...] }` for a known action. Returns `None` when the
/// entry has the wrong shape, which drops the action entirely.
fn decode_scopes(action: Action, entry: &Value) -> Option<BTreeSet<Scope>> {
	let Some(fields) = entry.as_object() else {
		warn!(action = %action, "ignoring malformed policy entry");
		return None;
	};

	let raw_scopes = match fields.get("scopes") {
		None | Some(Value::Null) => return Some(BTreeSet::new()),
		Some(Value::Array(items)) => items,
		Some(_) => {
			warn!(action = %action, "ignoring policy entry whose scopes are not a list");
			return None;
		}
	};

	let scopes = raw_scopes
		.iter()
		.filter_map(|item| {
			let Some(name) = item.as_str() else {
				warn!(action = %action, scope = %item, "ignoring non-string scope in policy document");
				return None;
			};
			match name.parse::<Scope>() {
				Ok(scope) => Some(scope),
				Err(_) => {
					warn!(action = %action, scope = %name, "ignoring unknown scope in policy document");
					None
				}
			}
		})
		.collect();
	Some(scopes)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decodes_wire_document() {
		let doc: PolicyDocument = serde_json::from_str(
			r#"{
				"course:read": { "scopes": ["organization", "admin"] },
				"batch:write": { "scopes": ["admin"] }
			}"#,
		)
		.unwrap();

		assert_eq!(doc.len(), 2);
		assert!(doc.get(Action::CourseRead).unwrap().has_scope(Scope::Admin));
		assert!(doc
			.get(Action::CourseRead)
			.unwrap()
			.has_scope(Scope::Organization));
		assert_eq!(
			doc.granted_scopes(Action::BatchWrite),
			Some(&BTreeSet::from([Scope::Admin]))
		);
		assert!(!doc.contains(Action::StudentWrite));
	}

	#[test]
	fn unknown_actions_and_scopes_are_dropped() {
		let doc: PolicyDocument = serde_json::from_str(
			r#"{
				"course:archive": { "scopes": ["admin"] },
				"student:read": { "scopes": ["self", "galaxy"] }
			}"#,
		)
		.unwrap();

		assert_eq!(doc.len(), 1);
		assert_eq!(
			doc.granted_scopes(Action::StudentRead),
			Some(&BTreeSet::from([Scope::Own]))
		);
	}

	#[test]
	fn missing_scopes_field_means_no_grants() {
		let doc: PolicyDocument = serde_json::from_str(r#"{ "grade:write": {} }"#).unwrap();
		assert!(doc.contains(Action::GradeWrite));
		assert!(doc.granted_scopes(Action::GradeWrite).unwrap().is_empty());
	}

	#[test]
	fn duplicate_scopes_collapse() {
		let doc: PolicyDocument =
			serde_json::from_str(r#"{ "user:read": { "scopes": ["admin", "admin"] } }"#).unwrap();
		assert_eq!(doc.granted_scopes(Action::UserRead).unwrap().len(), 1);
	}

	#[test]
	fn entry_with_non_list_scopes_is_dropped_alone() {
		let doc: PolicyDocument = serde_json::from_str(
			r#"{"course:read":{"scopes":["admin"]},"attendance:read":{"scopes":"all"},"grade:read":{"scopes":"all"}}"#,
		)
		.unwrap();

		assert_eq!(doc.len(), 1);
		assert!(doc.allows(Action::CourseRead, &[Scope::Admin], ScopeMatch::Any));
		assert!(!doc.contains(Action::GradeRead));
	}

	#[test]
	fn non_string_scopes_are_skipped() {
		let doc: PolicyDocument =
			serde_json::from_str(r#"{"course:read":{"scopes":["admin",7]}}"#).unwrap();
		assert_eq!(
			doc.granted_scopes(Action::CourseRead),
			Some(&BTreeSet::from([Scope::Admin]))
		);
	}

	#[test]
	fn unknown_action_with_any_shape_is_skipped() {
		let doc: PolicyDocument = serde_json::from_str(
			r#"{"course:read":{"scopes":["program"]},"reports:export":true,"audit:read":[1,2]}"#,
		)
		.unwrap();
		assert_eq!(doc.len(), 1);
		assert!(doc.allows(Action::CourseRead, &[Scope::Program], ScopeMatch::Any));
	}

	#[test]
	fn known_action_that_is_not_an_object_is_dropped() {
		let doc: PolicyDocument =
			serde_json::from_str(r#"{"user:read":"admin","batch:read":{"scopes":null}}"#).unwrap();
		assert!(!doc.contains(Action::UserRead));
		assert!(doc.granted_scopes(Action::BatchRead).unwrap().is_empty());
	}

	#[test]
	fn non_object_document_fails_to_decode() {
		let result: Result<PolicyDocument, _> = serde_json::from_str(r#"["course:read"]"#);
		assert!(result.is_err());
	}

	#[test]
	fn encodes_in_stable_order() {
		let doc = PolicyDocument::new()
			.with_grant(Action::GradeWrite, [Scope::Admin, Scope::Own])
			.with_grant(Action::CourseRead, [Scope::Program]);

		let json = serde_json::to_string(&doc).unwrap();
		assert_eq!(
			json,
			r#"{"course:read":{"scopes":["program"]},"grade:write":{"scopes":["self","admin"]}}"#
		);
	}

	#[test]
	fn with_grant_merges_scopes() {
		let doc = PolicyDocument::new()
			.with_grant(Action::BatchRead, [Scope::Admin])
			.with_grant(Action::BatchRead, [Scope::Supervisor]);
		assert_eq!(
			doc.granted_scopes(Action::BatchRead),
			Some(&BTreeSet::from([Scope::Supervisor, Scope::Admin]))
		);
	}

	#[test]
	fn collects_from_entries() {
		let doc: PolicyDocument = [
			(Action::ModuleRead, PolicyAction::new([Scope::Program])),
			(Action::ModuleWrite, PolicyAction::new([])),
		]
		.into_iter()
		.collect();
		assert_eq!(doc.len(), 2);
		assert!(doc.allows(Action::ModuleRead, &[Scope::Program], ScopeMatch::Any));
		assert!(!doc.allows(Action::ModuleWrite, &[Scope::Program], ScopeMatch::Any));
	}
}
