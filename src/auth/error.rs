// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Folda Finances

//! Authentication errors.
//!
//! Every variant is terminal and non-retryable at the verification layer.
//! Externally, all of them render as the same generic 401 so a caller cannot
//! distinguish "wrong signature" from "unknown key" from "expired"; the
//! specific variant is logged, not surfaced.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
///
/// `FetchTransport` and `FetchParse` occur during an inline key refresh and
/// are never returned to a caller directly: the verifier logs them and the
/// request fails with `UnknownKeyId` instead. They exist as variants so the
/// fetcher can report what actually went wrong.
#[derive(Debug)]
pub enum AuthError {
    /// No authorization header present
    MissingHeader,
    /// Header present but not of the form `Bearer <token>`
    MalformedHeader,
    /// Token algorithm is neither ES256 nor HS256
    UnsupportedAlgorithm,
    /// Asymmetric token without a `kid` header field
    MissingKeyId,
    /// No key for the token's `kid`, even after a refresh
    UnknownKeyId,
    /// Asymmetric verification is unavailable (no issuer URL configured)
    KeyResolutionUnavailable,
    /// Signature check failed or the token structure is malformed
    SignatureInvalid,
    /// The `exp` claim is in the past
    Expired,
    /// No `sub` claim
    MissingSubject,
    /// The `sub` claim is not a UUID
    InvalidSubjectFormat,
    /// Transport or HTTP failure fetching the key set
    FetchTransport(String),
    /// Key-set document was not valid JSON of the expected shape
    FetchParse(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: &'static str,
    error_code: &'static str,
}

impl AuthError {
    /// Stable diagnostic code for this error. Logged, never sent to callers.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingHeader => "missing_header",
            AuthError::MalformedHeader => "malformed_header",
            AuthError::UnsupportedAlgorithm => "unsupported_algorithm",
            AuthError::MissingKeyId => "missing_key_id",
            AuthError::UnknownKeyId => "unknown_key_id",
            AuthError::KeyResolutionUnavailable => "key_resolution_unavailable",
            AuthError::SignatureInvalid => "signature_invalid",
            AuthError::Expired => "expired",
            AuthError::MissingSubject => "missing_subject",
            AuthError::InvalidSubjectFormat => "invalid_subject_format",
            AuthError::FetchTransport(_) => "fetch_transport_error",
            AuthError::FetchParse(_) => "fetch_parse_error",
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingHeader => write!(f, "Authorization header is required"),
            AuthError::MalformedHeader => {
                write!(f, "Invalid authorization header format (expected 'Bearer <token>')")
            }
            AuthError::UnsupportedAlgorithm => write!(f, "Token signing algorithm is not supported"),
            AuthError::MissingKeyId => write!(f, "Token is missing the kid header field"),
            AuthError::UnknownKeyId => write!(f, "No verification key found for the token's kid"),
            AuthError::KeyResolutionUnavailable => {
                write!(f, "Asymmetric key resolution is not configured")
            }
            AuthError::SignatureInvalid => write!(f, "Token signature is invalid"),
            AuthError::Expired => write!(f, "Token has expired"),
            AuthError::MissingSubject => write!(f, "Token is missing the sub claim"),
            AuthError::InvalidSubjectFormat => write!(f, "Token sub claim is not a valid UUID"),
            AuthError::FetchTransport(msg) => write!(f, "Failed to fetch key set: {msg}"),
            AuthError::FetchParse(msg) => write!(f, "Failed to parse key set: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    /// Uniform rejection: one status, one body, for every variant.
    fn into_response(self) -> Response {
        let body = Json(AuthErrorBody {
            error: "invalid or expired token",
            error_code: "invalid_token",
        });
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
