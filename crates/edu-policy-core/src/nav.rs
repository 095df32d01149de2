// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Route guard table for the admin navigation.
//!
//! Each [`Route`] maps to a [`RouteGuard`]: which account types may see the
//! entry, the rule that makes it visible, and the rule that makes it
//! editable. The table is an exhaustive `match`, so adding a route without a
//! guard does not compile.
//!
//! This only filters what is rendered. The backend enforces every request on
//! its own.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::document::PolicyDocument;
use crate::error::PolicyCoreError;
use crate::evaluator::ScopeCheck;
use crate::principal::AccountType;
use crate::types::{Action, Scope};

/// A predicate over the policy document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
	/// Always satisfied, regardless of the document.
	Always,
	/// Satisfied when the single check passes.
	Check(ScopeCheck),
	/// Satisfied when any of the checks passes.
	AnyOf(&'static [ScopeCheck]),
}

impl Rule {
	pub fn evaluate(&self, document: Option<&PolicyDocument>) -> bool {
		match self {
			Rule::Always => true,
			Rule::Check(check) => check.evaluate(document),
			Rule::AnyOf(checks) => checks.iter().any(|check| check.evaluate(document)),
		}
	}

	/// The scope checks this rule is made of.
	pub fn checks(&self) -> &[ScopeCheck] {
		match self {
			Rule::Always => &[],
			Rule::Check(check) => std::slice::from_ref(check),
			Rule::AnyOf(checks) => checks,
		}
	}
}

/// Static guard attached to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteGuard {
	pub visible_to: &'static [AccountType],
	pub view: Rule,
	pub edit: Option<Rule>,
}

impl RouteGuard {
	pub fn is_visible_to(&self, account_type: AccountType) -> bool {
		self.visible_to.contains(&account_type)
	}
}

/// What a principal gets for a navigation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavAccess {
	Hidden,
	ReadOnly,
	Editable,
}

impl NavAccess {
	pub fn is_visible(&self) -> bool {
		!matches!(self, NavAccess::Hidden)
	}
}

impl fmt::Display for NavAccess {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			NavAccess::Hidden => "hidden",
			NavAccess::ReadOnly => "read-only",
			NavAccess::Editable => "editable",
		})
	}
}

/// Navigation entries of the admin application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
	Dashboard,
	Organizations,
	Programs,
	Courses,
	Modules,
	Batches,
	Students,
	Users,
	Submissions,
	MyCourses,
	MyAssignments,
	Profile,
}

const STAFF: &[AccountType] = &[AccountType::User];
const STUDENTS: &[AccountType] = &[AccountType::Student];
const EVERYONE: &[AccountType] = &[AccountType::Student, AccountType::User];

const ADMIN: &[Scope] = &[Scope::Admin];
const ORG_WIDE: &[Scope] = &[Scope::Admin, Scope::Organization];
const PROGRAM_WIDE: &[Scope] = &[Scope::Admin, Scope::Organization, Scope::Program];
const SUPERVISED: &[Scope] = &[
	Scope::Admin,
	Scope::Organization,
	Scope::Program,
	Scope::Supervisor,
];
const OWN: &[Scope] = &[Scope::Own];

const COURSE_EDITORS: &[ScopeCheck] = &[
	ScopeCheck::any(Action::CourseWrite, ORG_WIDE),
	ScopeCheck::any(Action::CourseWrite, &[Scope::Program]),
];
const USER_EDITORS: &[ScopeCheck] = &[
	ScopeCheck::any(Action::UserWrite, ADMIN),
	ScopeCheck::any(Action::UserWrite, &[Scope::Organization]),
];

impl Route {
	pub const ALL: &'static [Route] = &[
		Route::Dashboard,
		Route::Organizations,
		Route::Programs,
		Route::Courses,
		Route::Modules,
		Route::Batches,
		Route::Students,
		Route::Users,
		Route::Submissions,
		Route::MyCourses,
		Route::MyAssignments,
		Route::Profile,
	];

	pub fn path(&self) -> &'static str {
		match self {
			Route::Dashboard => "/",
			Route::Organizations => "/organizations",
			Route::Programs => "/programs",
			Route::Courses => "/courses",
			Route::Modules => "/modules",
			Route::Batches => "/batches",
			Route::Students => "/students",
			Route::Users => "/users",
			Route::Submissions => "/submissions",
			Route::MyCourses => "/my-courses",
			Route::MyAssignments => "/my-assignments",
			Route::Profile => "/profile",
		}
	}

	/// Human readable label for menus.
	pub fn label(&self) -> &'static str {
		match self {
			Route::Dashboard => "Dashboard",
			Route::Organizations => "Organizations",
			Route::Programs => "Programs",
			Route::Courses => "Courses",
			Route::Modules => "Modules",
			Route::Batches => "Batches",
			Route::Students => "Students",
			Route::Users => "Users",
			Route::Submissions => "Submissions",
			Route::MyCourses => "My Courses",
			Route::MyAssignments => "My Assignments",
			Route::Profile => "Profile",
		}
	}

	/// Looks up a route by path. A trailing slash is ignored.
	pub fn from_path(path: &str) -> Option<Route> {
		let trimmed = path.trim_end_matches('/');
		let normalized = if trimmed.is_empty() { "/" } else { trimmed };
		Route::ALL
			.iter()
			.copied()
			.find(|route| route.path() == normalized)
	}

	pub fn guard(&self) -> RouteGuard {
		match self {
			Route::Dashboard => RouteGuard {
				visible_to: EVERYONE,
				view: Rule::Always,
				edit: None,
			},
			Route::Organizations => RouteGuard {
				visible_to: STAFF,
				view: Rule::Check(ScopeCheck::any(Action::OrganizationRead, ADMIN)),
				edit: Some(Rule::Check(ScopeCheck::any(Action::OrganizationWrite, ADMIN))),
			},
			Route::Programs => RouteGuard {
				visible_to: STAFF,
				view: Rule::Check(ScopeCheck::any(Action::ProgramRead, PROGRAM_WIDE)),
				edit: Some(Rule::Check(ScopeCheck::any(Action::ProgramWrite, ORG_WIDE))),
			},
			Route::Courses => RouteGuard {
				visible_to: STAFF,
				view: Rule::Check(ScopeCheck::any(Action::CourseRead, PROGRAM_WIDE)),
				edit: Some(Rule::AnyOf(COURSE_EDITORS)),
			},
			Route::Modules => RouteGuard {
				visible_to: STAFF,
				view: Rule::Check(ScopeCheck::any(Action::ModuleRead, PROGRAM_WIDE)),
				edit: Some(Rule::Check(ScopeCheck::any(Action::ModuleWrite, PROGRAM_WIDE))),
			},
			Route::Batches => RouteGuard {
				visible_to: STAFF,
				view: Rule::Check(ScopeCheck::any(Action::BatchRead, SUPERVISED)),
				edit: Some(Rule::Check(ScopeCheck::any(Action::BatchWrite, ORG_WIDE))),
			},
			Route::Students => RouteGuard {
				visible_to: STAFF,
				view: Rule::Check(ScopeCheck::any(Action::StudentRead, SUPERVISED)),
				edit: Some(Rule::Check(ScopeCheck::any(Action::StudentWrite, ORG_WIDE))),
			},
			Route::Users => RouteGuard {
				visible_to: STAFF,
				view: Rule::Check(ScopeCheck::any(Action::UserRead, ORG_WIDE)),
				edit: Some(Rule::AnyOf(USER_EDITORS)),
			},
			Route::Submissions => RouteGuard {
				visible_to: STAFF,
				view: Rule::Check(ScopeCheck::any(Action::SubmissionRead, SUPERVISED)),
				edit: Some(Rule::Check(ScopeCheck::any(Action::GradeWrite, SUPERVISED))),
			},
			Route::MyCourses => RouteGuard {
				visible_to: STUDENTS,
				view: Rule::Check(ScopeCheck::any(Action::CourseRead, OWN)),
				edit: None,
			},
			Route::MyAssignments => RouteGuard {
				visible_to: STUDENTS,
				view: Rule::Check(ScopeCheck::any(Action::SubmissionRead, OWN)),
				edit: Some(Rule::Check(ScopeCheck::any(Action::SubmissionWrite, OWN))),
			},
			Route::Profile => RouteGuard {
				visible_to: EVERYONE,
				view: Rule::Always,
				edit: Some(Rule::Check(ScopeCheck::any(Action::UserWrite, OWN))),
			},
		}
	}
}

impl FromStr for Route {
	type Err = PolicyCoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Route::from_path(s).ok_or_else(|| PolicyCoreError::UnknownRoute(s.to_string()))
	}
}

impl fmt::Display for Route {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.path())
	}
}

/// Resolves what `account_type` gets for `route` under `document`.
pub fn route_access(
	route: Route,
	document: Option<&PolicyDocument>,
	account_type: AccountType,
) -> NavAccess {
	let guard = route.guard();
	if !guard.is_visible_to(account_type) || !guard.view.evaluate(document) {
		return NavAccess::Hidden;
	}

	match guard.edit {
		Some(rule) if rule.evaluate(document) => NavAccess::Editable,
		_ => NavAccess::ReadOnly,
	}
}

pub fn is_route_visible(
	route: Route,
	document: Option<&PolicyDocument>,
	account_type: AccountType,
) -> bool {
	route_access(route, document, account_type).is_visible()
}

/// Routes shown to `account_type`, in menu order.
pub fn visible_routes(document: Option<&PolicyDocument>, account_type: AccountType) -> Vec<Route> {
	Route::ALL
		.iter()
		.copied()
		.filter(|route| is_route_visible(*route, document, account_type))
		.collect()
}
