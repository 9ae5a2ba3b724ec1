// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Folda Finances

//! Axum extractors for the gate-resolved identity.
//!
//! Use `Identity` in handlers behind [`require_auth`](super::middleware::require_auth):
//!
//! ```rust,ignore
//! async fn my_handler(Identity(identity): Identity) -> impl IntoResponse {
//!     // identity.user_id scopes every query this handler makes
//! }
//! ```
//!
//! Both extractors read only the request extensions: an identity can enter
//! the system through the authentication gate and nowhere else. Absence
//! means unauthenticated.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::error::AuthError;
use super::identity::ResolvedIdentity;

/// Extractor for the authenticated identity. Rejects when the gate did not
/// run on this request.
pub struct Identity(pub ResolvedIdentity);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ResolvedIdentity>()
            .cloned()
            .map(Identity)
            .ok_or(AuthError::MissingHeader)
    }
}

/// Extractor that yields `None` instead of rejecting.
///
/// For routes mounted outside the gate that can still personalize a
/// response when one of the gated layers ran upstream.
pub struct OptionalIdentity(pub Option<ResolvedIdentity>);

impl<S> FromRequestParts<S> for OptionalIdentity
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalIdentity(
            parts.extensions.get::<ResolvedIdentity>().cloned(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use uuid::Uuid;

    fn request_parts(identity: Option<ResolvedIdentity>) -> Parts {
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        if let Some(identity) = identity {
            parts.extensions.insert(identity);
        }
        parts
    }

    fn sample_identity() -> ResolvedIdentity {
        ResolvedIdentity {
            user_id: Uuid::new_v4(),
            email: Some("user@example.com".to_string()),
        }
    }

    #[tokio::test]
    async fn identity_reads_the_gate_extension() {
        let identity = sample_identity();
        let mut parts = request_parts(Some(identity.clone()));

        let Identity(extracted) = Identity::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(extracted.user_id, identity.user_id);
        assert_eq!(extracted.email, identity.email);
    }

    #[tokio::test]
    async fn identity_rejects_when_the_gate_did_not_run() {
        let mut parts = request_parts(None);
        let result = Identity::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::MissingHeader)));
    }

    #[tokio::test]
    async fn optional_identity_is_none_without_the_gate() {
        let mut parts = request_parts(None);
        let OptionalIdentity(extracted) = OptionalIdentity::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(extracted.is_none());
    }

    #[tokio::test]
    async fn optional_identity_reads_the_extension() {
        let mut parts = request_parts(Some(sample_identity()));
        let OptionalIdentity(extracted) = OptionalIdentity::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(extracted.is_some());
    }
}
