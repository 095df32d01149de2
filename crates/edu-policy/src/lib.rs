// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy SDK for the education admin client.
//!
//! Fetches the signed-in principal's policy document from `GET /policies`,
//! caches it for a bounded window and answers permission checks against it.
//! Every check fails closed: no document, a failed fetch or a logged-out
//! session all deny.
//!
//! # Example
//!
//! ```ignore
//! use edu_policy::{BearerToken, HttpPolicySource, PolicyStore};
//! use edu_policy_core::{Action, Scope, ScopeMatch};
//!
//! let source = HttpPolicySource::builder()
//!     .base_url("https://admin.school.example")
//!     .build()?;
//! let store = PolicyStore::new(source);
//! store.login(BearerToken::new(token)).await;
//!
//! let snapshot = store.policies(true).await;
//! if snapshot.allows(Action::CourseWrite, &[Scope::Admin, Scope::Organization], ScopeMatch::Any) {
//!     // show the edit button
//! }
//!
//! store.logout().await;
//! ```

pub mod error;
pub mod source;
pub mod store;

pub use error::{PolicyError, Result};
pub use source::{BearerToken, HttpPolicySource, HttpPolicySourceBuilder, PolicySource};
pub use store::{PolicySnapshot, PolicyStore, StoreConfig};

pub use edu_policy_core::{
	check_action_scopes, route_access, visible_routes, AccountType, Action, NavAccess,
	PolicyDocument, Route, Scope, ScopeMatch, DEFAULT_POLICY_STALE_TIME,
};
