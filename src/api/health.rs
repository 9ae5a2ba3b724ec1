// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Folda Finances

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Readiness response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall status ("ok" or "degraded").
    pub status: String,
    /// Individual checks and their results.
    pub checks: ReadyChecks,
}

/// Individual readiness check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Verification-key cache status ("ok" once keys are cached, "empty"
    /// before the first successful fetch or when no issuer is configured).
    pub verification_keys: String,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/ready",
    tag = "Health",
    responses((status = 200, body = ReadyResponse))
)]
pub async fn ready(State(state): State<AppState>) -> Json<ReadyResponse> {
    let keys_cached = state.verifier.key_cache().key_count().await > 0;
    let verification_keys = if keys_cached { "ok" } else { "empty" };

    // An empty key cache still serves HS256 deployments; report degraded
    // rather than failing the probe outright.
    let status = if keys_cached { "ok" } else { "degraded" };

    Json(ReadyResponse {
        status: status.to_string(),
        checks: ReadyChecks {
            service: "ok".to_string(),
            verification_keys: verification_keys.to_string(),
        },
    })
}
