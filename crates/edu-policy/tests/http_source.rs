// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::time::Duration;

use edu_common_http::RetryConfig;
use edu_policy::{
	Action, BearerToken, HttpPolicySource, PolicyError, PolicySnapshot, PolicySource, PolicyStore,
	Scope, ScopeMatch,
};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_retry(max_attempts: u32) -> RetryConfig {
	RetryConfig {
		max_attempts,
		base_delay: Duration::from_millis(1),
		max_delay: Duration::from_millis(5),
		backoff_factor: 2.0,
		jitter: false,
	}
}

fn source_for(server: &MockServer, max_attempts: u32) -> HttpPolicySource {
	HttpPolicySource::builder()
		.base_url(server.uri())
		.request_timeout(Duration::from_secs(5))
		.retry_config(fast_retry(max_attempts))
		.build()
		.unwrap()
}

fn token() -> BearerToken {
	BearerToken::new("test-token")
}

fn policies_body() -> serde_json::Value {
	json!({
		"permissionSet": {
			"course:read": { "scopes": ["organization", "admin"] },
			"batch:write": { "scopes": ["admin"] },
			"attendance:read": { "scopes": ["admin"] }
		}
	})
}

#[tokio::test]
async fn fetches_and_decodes_permission_set() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/policies"))
		.and(header("authorization", "Bearer test-token"))
		.and(header("accept", "application/json"))
		.respond_with(ResponseTemplate::new(200).set_body_json(policies_body()))
		.expect(1)
		.mount(&server)
		.await;

	let document = source_for(&server, 1).fetch(&token()).await.unwrap();

	assert_eq!(document.len(), 2);
	assert!(document.allows(Action::CourseRead, &[Scope::Admin, Scope::Own], ScopeMatch::Any));
	assert!(!document.allows(Action::CourseRead, &[Scope::Own], ScopeMatch::Any));
	assert!(document.allows(Action::BatchWrite, &[Scope::Admin], ScopeMatch::All));
	assert!(!document.allows(
		Action::BatchWrite,
		&[Scope::Admin, Scope::Organization],
		ScopeMatch::All
	));
}

#[tokio::test]
async fn unauthorized_is_not_retried() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/policies"))
		.respond_with(ResponseTemplate::new(401))
		.expect(1)
		.mount(&server)
		.await;

	let err = source_for(&server, 3).fetch(&token()).await.unwrap_err();
	assert!(matches!(err, PolicyError::Unauthorized));
}

#[tokio::test]
async fn forbidden_maps_to_unauthorized() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/policies"))
		.respond_with(ResponseTemplate::new(403))
		.mount(&server)
		.await;

	let err = source_for(&server, 1).fetch(&token()).await.unwrap_err();
	assert!(matches!(err, PolicyError::Unauthorized));
}

#[tokio::test]
async fn server_errors_are_retried_then_reported() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/policies"))
		.respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
		.expect(3)
		.mount(&server)
		.await;

	let err = source_for(&server, 3).fetch(&token()).await.unwrap_err();
	match err {
		PolicyError::ServerError { status, message } => {
			assert_eq!(status, 503);
			assert_eq!(message, "maintenance");
		}
		other => panic!("expected ServerError, got {other:?}"),
	}
}

#[tokio::test]
async fn recovers_from_a_transient_failure() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/policies"))
		.respond_with(ResponseTemplate::new(502))
		.up_to_n_times(1)
		.mount(&server)
		.await;
	Mock::given(method("GET"))
		.and(path("/policies"))
		.respond_with(ResponseTemplate::new(200).set_body_json(policies_body()))
		.mount(&server)
		.await;

	let document = source_for(&server, 3).fetch(&token()).await.unwrap();
	assert!(document.contains(Action::CourseRead));
}

#[tokio::test]
async fn malformed_body_is_a_parse_failure() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/policies"))
		.respond_with(ResponseTemplate::new(200).set_body_string("{\"permissionSet\": [1, 2"))
		.expect(1)
		.mount(&server)
		.await;

	let err = source_for(&server, 3).fetch(&token()).await.unwrap_err();
	assert!(matches!(err, PolicyError::ParseFailed(_)));
}

#[tokio::test]
async fn missing_permission_set_is_a_parse_failure() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/policies"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({ "policies": {} })))
		.mount(&server)
		.await;

	let err = source_for(&server, 1).fetch(&token()).await.unwrap_err();
	assert!(matches!(err, PolicyError::ParseFailed(_)));
}

#[tokio::test]
async fn store_caches_then_fails_closed_after_logout() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/policies"))
		.respond_with(ResponseTemplate::new(200).set_body_json(policies_body()))
		.expect(1)
		.mount(&server)
		.await;

	let store = PolicyStore::new(source_for(&server, 1));
	store.login(token()).await;

	assert!(matches!(store.policies(false).await, PolicySnapshot::Idle));
	assert!(store.policies(true).await.is_ready());
	assert!(store.policies(true).await.is_ready());
	assert!(store.check(Action::CourseRead, &[Scope::Admin], ScopeMatch::Any).await);

	store.logout().await;

	assert!(!store.check(Action::CourseRead, &[Scope::Admin], ScopeMatch::Any).await);
	assert!(!store.check(Action::BatchWrite, &[Scope::Admin], ScopeMatch::All).await);
}

#[tokio::test]
async fn store_reports_failure_without_a_document() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/policies"))
		.respond_with(ResponseTemplate::new(500))
		.mount(&server)
		.await;

	let store = PolicyStore::new(source_for(&server, 2));
	store.login(token()).await;
	let snapshot = store.policies(true).await;

	assert!(matches!(snapshot, PolicySnapshot::Failed { .. }));
	assert!(snapshot.document().is_none());
	assert!(!snapshot.allows(Action::CourseRead, &[Scope::Admin], ScopeMatch::Any));
}

#[tokio::test]
async fn each_session_sends_its_own_token() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/policies"))
		.and(header("authorization", "Bearer teacher-token"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"permissionSet": { "course:read": { "scopes": ["program"] } }
		})))
		.expect(1)
		.mount(&server)
		.await;
	Mock::given(method("GET"))
		.and(path("/policies"))
		.and(header("authorization", "Bearer registrar-token"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"permissionSet": { "student:write": { "scopes": ["organization"] } }
		})))
		.expect(1)
		.mount(&server)
		.await;

	let store = PolicyStore::new(source_for(&server, 1));

	store.login(BearerToken::new("teacher-token")).await;
	let teacher = store.policies(true).await;
	assert!(teacher.allows(Action::CourseRead, &[Scope::Program], ScopeMatch::Any));

	store.logout().await;
	assert!(matches!(store.policies(true).await, PolicySnapshot::Idle));

	store.login(BearerToken::new("registrar-token")).await;
	let registrar = store.policies(true).await;
	assert!(registrar.allows(Action::StudentWrite, &[Scope::Organization], ScopeMatch::Any));
	assert!(!registrar.allows(Action::CourseRead, &[Scope::Program], ScopeMatch::Any));
}
