// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Folda Finances

//! Token verification.
//!
//! The issuer may be deployed with either of two signing schemes, so the
//! verifier supports both and dispatches on the token's `alg` header field:
//!
//! - **ES256**: the verification key is published in the issuer's JWKS and
//!   looked up by `kid`. The issuer rotates keys without notice; the only
//!   signal is an unrecognized `kid`, so a cache miss triggers one inline
//!   refetch, with a time-based staleness backstop for rotations where the
//!   old `kid` briefly still resolves.
//! - **HS256**: the shared secret configured at process start.
//!
//! Verification is synchronous within the calling request; the refetch is
//! the only suspension point.

use base64ct::{Base64UrlUnpadded, Encoding};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use uuid::Uuid;

use super::error::AuthError;
use super::identity::ResolvedIdentity;
use super::jwks::JwksFetcher;
use super::keyset::{KeySetCache, VerificationKey};

/// Supported signing schemes, dispatched explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningScheme {
    /// ES256: issuer-published elliptic-curve key, resolved by `kid`
    EllipticCurve,
    /// HS256: process-configured shared secret, no lookup
    SharedSecret,
}

impl SigningScheme {
    /// Map the token's `alg` header value. Anything else is unsupported.
    fn from_alg(alg: &str) -> Option<Self> {
        match alg {
            "ES256" => Some(SigningScheme::EllipticCurve),
            "HS256" => Some(SigningScheme::SharedSecret),
            _ => None,
        }
    }

    fn algorithm(self) -> Algorithm {
        match self {
            SigningScheme::EllipticCurve => Algorithm::ES256,
            SigningScheme::SharedSecret => Algorithm::HS256,
        }
    }
}

/// Token header fields the verifier dispatches on.
#[derive(Debug, Deserialize)]
struct TokenHeader {
    #[serde(default)]
    alg: String,
    #[serde(default)]
    kid: Option<String>,
}

/// Claims the verifier extracts. Expiry is enforced by the decode step
/// itself; `sub` and `email` are validated here.
#[derive(Debug, Deserialize)]
struct TokenClaims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

/// Verifies bearer tokens against the cached key set or the shared secret.
pub struct TokenVerifier {
    keys: KeySetCache,
    fetcher: Option<JwksFetcher>,
    shared_secret: String,
}

impl TokenVerifier {
    /// Create a verifier.
    ///
    /// `fetcher` is `None` when no issuer URL is configured; asymmetric
    /// tokens then fail without ever touching the network.
    pub fn new(keys: KeySetCache, fetcher: Option<JwksFetcher>, shared_secret: String) -> Self {
        Self {
            keys,
            fetcher,
            shared_secret,
        }
    }

    /// The shared key cache, for readiness reporting.
    pub fn key_cache(&self) -> &KeySetCache {
        &self.keys
    }

    /// Populate the key set once at startup. Failure is logged, not fatal:
    /// the first asymmetric verification retries inline.
    pub async fn prime(&self) {
        let Some(fetcher) = &self.fetcher else {
            tracing::warn!("issuer URL is not set - asymmetric token verification will fail");
            return;
        };
        match fetcher.fetch().await {
            Ok(keys) => self.keys.replace_all(keys).await,
            Err(e) => tracing::warn!(error = %e, "initial key set fetch failed"),
        }
    }

    /// Verify a raw token and resolve the identity it carries.
    pub async fn verify(&self, token: &str) -> Result<ResolvedIdentity, AuthError> {
        let header = decode_token_header(token)?;

        let scheme =
            SigningScheme::from_alg(&header.alg).ok_or(AuthError::UnsupportedAlgorithm)?;

        let decoding_key = match scheme {
            SigningScheme::EllipticCurve => {
                let kid = header.kid.as_deref().ok_or(AuthError::MissingKeyId)?;
                self.resolve_key(kid).await?.key
            }
            SigningScheme::SharedSecret => DecodingKey::from_secret(self.shared_secret.as_bytes()),
        };

        let mut validation = Validation::new(scheme.algorithm());
        // Expiry is exact; a token 10 seconds past exp is expired.
        validation.leeway = 0;
        validation.validate_aud = false;

        let token_data =
            decode::<TokenClaims>(token, &decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::Expired,
                    _ => AuthError::SignatureInvalid,
                }
            })?;

        let sub = token_data.claims.sub.ok_or(AuthError::MissingSubject)?;
        let user_id = Uuid::parse_str(&sub).map_err(|_| AuthError::InvalidSubjectFormat)?;

        Ok(ResolvedIdentity {
            user_id,
            email: token_data.claims.email,
        })
    }

    /// Resolve the verification key for a `kid`.
    ///
    /// A fresh cache hit is returned immediately. On a miss, or when the
    /// whole cache has gone stale, the key set is refetched and replaced
    /// wholesale, then the lookup retried exactly once. A refetch failure is
    /// logged in full but surfaces as `UnknownKeyId`; a still-cached key
    /// keeps verifying through a failed refresh.
    async fn resolve_key(&self, kid: &str) -> Result<VerificationKey, AuthError> {
        let cached = self.keys.lookup(kid).await;

        let Some(fetcher) = &self.fetcher else {
            // No issuer configured: a pre-seeded cache still serves hits,
            // but there is nothing to refresh from.
            return cached.ok_or(AuthError::KeyResolutionUnavailable);
        };

        if let Some(key) = cached {
            if !self.keys.is_stale().await {
                return Ok(key);
            }
        }

        match fetcher.fetch().await {
            Ok(keys) => self.keys.replace_all(keys).await,
            Err(e) => tracing::warn!(error = %e, code = e.code(), "inline key set refresh failed"),
        }

        self.keys.lookup(kid).await.ok_or(AuthError::UnknownKeyId)
    }
}

/// Decode the first segment of a compact JWT.
///
/// Done by hand rather than through `jsonwebtoken::decode_header` so that a
/// well-formed header carrying an algorithm we do not support ("RS256",
/// "none", ...) is reported as unsupported rather than as a parse failure.
fn decode_token_header(token: &str) -> Result<TokenHeader, AuthError> {
    let mut segments = token.split('.');
    let header_segment = segments.next().ok_or(AuthError::SignatureInvalid)?;
    if segments.count() != 2 {
        return Err(AuthError::SignatureInvalid);
    }

    let raw = Base64UrlUnpadded::decode_vec(header_segment)
        .map_err(|_| AuthError::SignatureInvalid)?;
    serde_json::from_slice(&raw).map_err(|_| AuthError::SignatureInvalid)
}
