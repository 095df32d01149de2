// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Fetch-and-cache lifecycle for the principal's policy document.
//!
//! The store is the single owner of the current [`PolicyDocument`]. Callers
//! receive [`PolicySnapshot`] values holding an `Arc` of an immutable
//! document, so evaluation never takes a lock and never observes a document
//! being replaced.
//!
//! The store also holds the session credential. [`PolicyStore::login`] sets
//! it and [`PolicyStore::logout`] clears it, so a fetch is always made with
//! the token of the principal currently signed in.
//!
//! Every state change bumps a generation counter. A fetch records the
//! generation it started under and installs its result only if nothing has
//! happened since, so a logout, a new login or a newer fetch always wins
//! over a response that arrives late.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use edu_policy_core::{
	check_action_scopes, route_access, AccountType, Action, NavAccess, PolicyDocument, Route,
	Scope, ScopeMatch, DEFAULT_POLICY_STALE_TIME,
};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::source::{BearerToken, PolicySource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
	/// How long a fetched document is served without refetching.
	pub stale_time: Duration,
}

impl Default for StoreConfig {
	fn default() -> Self {
		Self {
			stale_time: DEFAULT_POLICY_STALE_TIME,
		}
	}
}

/// Point-in-time view of the store.
#[derive(Debug, Clone)]
pub enum PolicySnapshot {
	/// Not signed in, logged out, or invalidated.
	Idle,
	/// A fetch is in flight and no document is available.
	Pending,
	Ready {
		document: Arc<PolicyDocument>,
		fetched_at: DateTime<Utc>,
	},
	/// The last fetch failed. Carries the error text.
	Failed { reason: String },
}

impl PolicySnapshot {
	/// The document, present only in the `Ready` state.
	pub fn document(&self) -> Option<&PolicyDocument> {
		match self {
			PolicySnapshot::Ready { document, .. } => Some(document.as_ref()),
			_ => None,
		}
	}

	pub fn is_ready(&self) -> bool {
		matches!(self, PolicySnapshot::Ready { .. })
	}

	pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
		match self {
			PolicySnapshot::Ready { fetched_at, .. } => Some(*fetched_at),
			_ => None,
		}
	}

	/// Evaluates against this snapshot. Anything but `Ready` denies.
	pub fn allows(&self, action: Action, scopes: &[Scope], mode: ScopeMatch) -> bool {
		check_action_scopes(self.document(), action, scopes, mode)
	}

	pub fn route_access(&self, route: Route, account_type: AccountType) -> NavAccess {
		route_access(route, self.document(), account_type)
	}
}

#[derive(Debug)]
struct StoreInner {
	snapshot: PolicySnapshot,
	/// Monotonic fetch time of the `Ready` document.
	fetched_instant: Option<Instant>,
	generation: u64,
	/// Credential of the signed-in principal.
	token: Option<BearerToken>,
}

impl StoreInner {
	fn new() -> Self {
		Self {
			snapshot: PolicySnapshot::Idle,
			fetched_instant: None,
			generation: 0,
			token: None,
		}
	}

	fn fresh_document(&self, stale_time: Duration) -> Option<PolicySnapshot> {
		match (&self.snapshot, self.fetched_instant) {
			(PolicySnapshot::Ready { .. }, Some(at)) if at.elapsed() < stale_time => {
				Some(self.snapshot.clone())
			}
			_ => None,
		}
	}

	fn reset(&mut self) {
		self.generation += 1;
		self.snapshot = PolicySnapshot::Idle;
		self.fetched_instant = None;
	}
}

/// Owns the policy document for one session.
pub struct PolicyStore<S> {
	source: Arc<S>,
	config: StoreConfig,
	inner: Arc<RwLock<StoreInner>>,
}

impl<S> Clone for PolicyStore<S> {
	fn clone(&self) -> Self {
		Self {
			source: Arc::clone(&self.source),
			config: self.config,
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<S: PolicySource> PolicyStore<S> {
	pub fn new(source: S) -> Self {
		Self::with_config(source, StoreConfig::default())
	}

	pub fn with_config(source: S, config: StoreConfig) -> Self {
		Self {
			source: Arc::new(source),
			config,
			inner: Arc::new(RwLock::new(StoreInner::new())),
		}
	}

	pub fn config(&self) -> StoreConfig {
		self.config
	}

	/// Starts a session for the principal holding `token`.
	///
	/// Any document cached for a previous principal is dropped and any fetch
	/// still in flight for it will not install its result.
	pub async fn login(&self, token: BearerToken) {
		let mut inner = self.inner.write().await;
		inner.reset();
		inner.token = Some(token);
		info!("policy session started");
	}

	/// Whether a session credential is held.
	pub async fn is_signed_in(&self) -> bool {
		self.inner.read().await.token.is_some()
	}

	/// Returns the policy document for the session, fetching it if needed.
	///
	/// Unauthenticated callers, and callers with no session credential, get
	/// `Idle` and no request is made; any cached document is dropped. A fresh
	/// cached document is returned as-is. Otherwise a fetch starts with the
	/// session token, superseding any fetch already in flight.
	pub async fn policies(&self, authenticated: bool) -> PolicySnapshot {
		if !authenticated {
			let mut inner = self.inner.write().await;
			if !matches!(inner.snapshot, PolicySnapshot::Idle) {
				debug!("unauthenticated, dropping cached policies");
				inner.reset();
			}
			return PolicySnapshot::Idle;
		}

		{
			let inner = self.inner.read().await;
			if let Some(snapshot) = inner.fresh_document(self.config.stale_time) {
				debug!("policy cache hit");
				return snapshot;
			}
		}

		let (generation, token) = {
			let mut inner = self.inner.write().await;
			// Another caller may have refreshed while we waited for the lock.
			if let Some(snapshot) = inner.fresh_document(self.config.stale_time) {
				debug!("policy cache hit");
				return snapshot;
			}
			let Some(token) = inner.token.clone() else {
				debug!("no session credential, skipping policy fetch");
				inner.reset();
				return PolicySnapshot::Idle;
			};
			inner.generation += 1;
			inner.snapshot = PolicySnapshot::Pending;
			inner.fetched_instant = None;
			debug!(generation = inner.generation, "policy cache miss, fetching");
			(inner.generation, token)
		};

		let result = self.source.fetch(&token).await;

		let mut inner = self.inner.write().await;
		if inner.generation != generation {
			debug!(
				generation,
				current = inner.generation,
				"discarding superseded policy fetch"
			);
			return inner.snapshot.clone();
		}

		match result {
			Ok(document) => {
				info!(actions = document.len(), "policies fetched");
				inner.snapshot = PolicySnapshot::Ready {
					document: Arc::new(document),
					fetched_at: Utc::now(),
				};
				inner.fetched_instant = Some(Instant::now());
			}
			Err(err) => {
				warn!(error = %err, "policy fetch failed");
				inner.snapshot = PolicySnapshot::Failed {
					reason: err.to_string(),
				};
				inner.fetched_instant = None;
			}
		}
		inner.snapshot.clone()
	}

	/// Current state without fetching.
	pub async fn snapshot(&self) -> PolicySnapshot {
		self.inner.read().await.snapshot.clone()
	}

	/// Ends the session: drops the credential and the cached document at
	/// once. A fetch still in flight will not install its result.
	pub async fn logout(&self) {
		let mut inner = self.inner.write().await;
		inner.reset();
		inner.token = None;
		info!("policies cleared on logout");
	}

	/// Forces the next `policies(true)` call to refetch. The session
	/// credential is kept.
	pub async fn invalidate(&self) {
		self.inner.write().await.reset();
		debug!("policy cache invalidated");
	}

	/// Evaluates against the current snapshot without fetching.
	pub async fn check(&self, action: Action, scopes: &[Scope], mode: ScopeMatch) -> bool {
		self.snapshot().await.allows(action, scopes, mode)
	}
}
