// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Folda Finances

//! End-to-end authentication flow tests.
//!
//! A wiremock server stands in for the issuer's JWKS endpoint; requests run
//! through the real router so the gate, verifier, fetcher and cache are all
//! exercised together.

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use tower::util::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use folda_finances_server::api::router;
use folda_finances_server::auth::KeySetCache;

use common::{
    app_state, es256_token, hs256_token, jwks_document, now, EC_X, EC_Y, KID, SUBJECT,
};

const DISCOVERY_PATH: &str = "/auth/v1/.well-known/jwks.json";

async fn start_issuer(expected_fetches: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DISCOVERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(jwks_document()))
        .expect(expected_fetches)
        .mount(&server)
        .await;
    server
}

fn me_request(authorization: Option<&str>) -> Request<Body> {
    let builder = Request::builder().uri("/api/auth/me");
    let builder = match authorization {
        Some(value) => builder.header("Authorization", value),
        None => builder,
    };
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn valid_es256_token_authenticates_and_caches_the_key() {
    // Two requests, one fetch: the first misses the empty cache and
    // refreshes, the second hits.
    let issuer = start_issuer(1).await;
    let app = router(app_state(Some(&issuer.uri())));

    let token = es256_token(KID, SUBJECT, now() + 3600);

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(me_request(Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["user_id"], SUBJECT);
        assert_eq!(body["email"], "user@example.com");
    }
}

#[tokio::test]
async fn unknown_kid_triggers_exactly_one_refresh_then_rejects() {
    let issuer = start_issuer(1).await;
    let app = router(app_state(Some(&issuer.uri())));

    let token = es256_token("rotated-away", SUBJECT, now() + 3600);
    let response = app
        .oneshot(me_request(Some(&format!("Bearer {token}"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_es256_token_is_rejected() {
    let issuer = start_issuer(1).await;
    let app = router(app_state(Some(&issuer.uri())));

    let token = es256_token(KID, SUBJECT, now() - 10);
    let response = app
        .oneshot(me_request(Some(&format!("Bearer {token}"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn hs256_token_verifies_against_the_shared_secret() {
    // No issuer configured; the symmetric path needs no key lookup.
    let app = router(app_state(None));

    let token = hs256_token(SUBJECT, now() + 3600);
    let response = app
        .oneshot(me_request(Some(&format!("Bearer {token}"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user_id"], SUBJECT);
}

#[tokio::test]
async fn asymmetric_token_without_issuer_is_rejected_without_any_fetch() {
    let app = router(app_state(None));

    let token = es256_token(KID, SUBJECT, now() + 3600);
    let response = app
        .oneshot(me_request(Some(&format!("Bearer {token}"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unsupported_algorithm_is_rejected_even_with_a_valid_secret() {
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

    let app = router(app_state(None));

    let token = encode(
        &Header::new(Algorithm::HS384),
        &serde_json::json!({ "sub": SUBJECT, "exp": now() + 3600 }),
        &EncodingKey::from_secret(common::SECRET.as_bytes()),
    )
    .unwrap();

    let response = app
        .oneshot(me_request(Some(&format!("Bearer {token}"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn header_shape_is_matched_exactly() {
    let app = router(app_state(None));
    let token = hs256_token(SUBJECT, now() + 3600);

    let bad_headers = [
        None,
        Some(format!("bearer {token}")),
        Some(format!("BEARER {token}")),
        Some(format!("Bearer{token}")),
        Some("Bearer ".to_string()),
        Some(format!("Basic {token}")),
    ];

    for value in &bad_headers {
        let response = app
            .clone()
            .oneshot(me_request(value.as_deref()))
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "header {value:?} must be rejected"
        );
    }
}

#[tokio::test]
async fn every_rejection_has_the_same_body() {
    let issuer = start_issuer(1).await;
    let app = router(app_state(Some(&issuer.uri())));

    let uniform = serde_json::json!({
        "error": "invalid or expired token",
        "error_code": "invalid_token"
    });

    let rejected = [
        None,                                                        // missing header
        Some("Bearer not-a-jwt".to_string()),                        // malformed token
        Some(format!("Bearer {}", es256_token("nope", SUBJECT, now() + 3600))), // unknown kid
        Some(format!("Bearer {}", hs256_token(SUBJECT, now() - 10))), // expired
    ];

    for value in &rejected {
        let response = app
            .clone()
            .oneshot(me_request(value.as_deref()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await, uniform, "body differs for {value:?}");
    }
}

#[tokio::test]
async fn concurrent_verifications_survive_a_key_set_swap() {
    use jsonwebtoken::DecodingKey;
    use std::collections::HashMap;
    use folda_finances_server::auth::VerificationKey;

    // Pre-seeded cache, no issuer: verification never leaves the process.
    let state = app_state(None);
    let seed = || {
        let mut keys = HashMap::new();
        keys.insert(
            KID.to_string(),
            VerificationKey {
                key: DecodingKey::from_ec_components(EC_X, EC_Y).unwrap(),
                curve: "P-256".to_string(),
            },
        );
        keys
    };
    let cache: &KeySetCache = state.verifier.key_cache();
    cache.replace_all(seed()).await;

    let token = es256_token(KID, SUBJECT, now() + 3600);

    let writer = {
        let state = state.clone();
        tokio::spawn(async move {
            for _ in 0..100 {
                state.verifier.key_cache().replace_all(seed()).await;
            }
        })
    };

    let verifiers: Vec<_> = (0..8)
        .map(|_| {
            let state = state.clone();
            let token = token.clone();
            tokio::spawn(async move {
                for _ in 0..50 {
                    let identity = state.verifier.verify(&token).await.unwrap();
                    assert_eq!(identity.user_id.to_string(), SUBJECT);
                }
            })
        })
        .collect();

    writer.await.unwrap();
    for task in verifiers {
        task.await.unwrap();
    }
}
