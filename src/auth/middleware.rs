// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Folda Finances

//! Authentication middleware for Axum.
//!
//! The gate sits at the request boundary: it extracts the bearer token,
//! hands it to the [`TokenVerifier`](super::verifier::TokenVerifier), and
//! either publishes the resolved identity into the request extensions or
//! short-circuits with the uniform 401. Downstream handlers read the
//! identity through the extractors in [`extractor`](super::extractor).

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::error::AuthError;
use super::identity::ResolvedIdentity;
use crate::state::AppState;

/// Require a verified bearer token.
///
/// Apply with `axum::middleware::from_fn_with_state(state, require_auth)` on
/// every router subtree that resolves identities.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(request.headers(), &state).await {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => {
            // The caller gets the generic body; the taxonomy goes to the log.
            tracing::warn!(code = e.code(), error = %e, "request rejected by authentication gate");
            e.into_response()
        }
    }
}

/// Authenticate a request from its headers.
///
/// The scheme prefix is matched exactly and case-sensitively: `bearer`,
/// a missing space, or an empty token are all malformed.
async fn authenticate(
    headers: &HeaderMap,
    state: &AppState,
) -> Result<ResolvedIdentity, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?;

    let value = header.to_str().map_err(|_| AuthError::MalformedHeader)?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MalformedHeader)?;
    if token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }

    state.verifier.verify(token).await
}
