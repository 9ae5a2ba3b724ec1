// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Folda Finances

//! # Authentication Module
//!
//! Bearer-token authentication for the Folda Finances API.
//!
//! ## Auth Flow
//!
//! 1. Frontend authenticates the user with the identity provider (Supabase)
//! 2. Frontend sends `Authorization: Bearer <JWT>`
//! 3. This server:
//!    - Resolves the verification key (JWKS lookup for ES256, the shared
//!      secret for HS256; the issuer may emit either depending on
//!      deployment configuration)
//!    - Verifies signature and expiry
//!    - Extracts `sub` → canonical `user_id` (UUID) and the optional
//!      `email` claim
//!
//! ## Security
//!
//! - Every non-health endpoint sits behind the gate
//! - Keys are cached process-wide and replaced wholesale on refresh
//! - Every rejection renders the same generic 401; the specific cause is
//!   logged, never surfaced

pub mod error;
pub mod extractor;
pub mod identity;
pub mod jwks;
pub mod keyset;
pub mod middleware;
pub mod verifier;

pub use error::AuthError;
pub use extractor::{Identity, OptionalIdentity};
pub use identity::ResolvedIdentity;
pub use jwks::JwksFetcher;
pub use keyset::{KeySetCache, VerificationKey};
pub use middleware::require_auth;
pub use verifier::TokenVerifier;
