// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core policy types for the education admin client.
//!
//! This crate holds everything about permissions that needs no I/O:
//!
//! - [`Action`] and [`Scope`]: the closed policy vocabulary
//! - [`PolicyDocument`]: the principal's granted scopes per action
//! - [`check_action_scopes`]: the fail-closed evaluator
//! - [`Route`] and [`route_access`]: the navigation guard table
//!
//! Fetching and caching the document lives in `edu-policy`.
//!
//! # Example
//!
//! ```
//! use edu_policy_core::{check_action_scopes, Action, PolicyDocument, Scope, ScopeMatch};
//!
//! let doc = PolicyDocument::new().with_grant(Action::CourseRead, [Scope::Organization, Scope::Admin]);
//!
//! assert!(!check_action_scopes(Some(&doc), Action::CourseRead, &[Scope::Own], ScopeMatch::Any));
//! assert!(check_action_scopes(Some(&doc), Action::CourseRead, &[Scope::Admin, Scope::Own], ScopeMatch::Any));
//! assert!(!check_action_scopes(None, Action::CourseRead, &[Scope::Admin], ScopeMatch::Any));
//! ```

pub mod document;
pub mod error;
pub mod evaluator;
pub mod nav;
pub mod principal;
pub mod types;

pub use document::{PolicyAction, PolicyDocument, DEFAULT_POLICY_STALE_TIME};
pub use error::{PolicyCoreError, Result};
pub use evaluator::{check_action_scopes, has_all_scopes, has_any_scope, ScopeCheck, ScopeMatch};
pub use nav::{is_route_visible, route_access, visible_routes, NavAccess, Route, RouteGuard, Rule};
pub use principal::{AccountType, Principal};
pub use types::{Action, Scope};
