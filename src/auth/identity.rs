// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Folda Finances

//! Resolved identity of an authenticated request.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// The output of successful token verification.
///
/// Created fresh per request by the authentication gate and published into
/// the request extensions; collaborators read it through the extractors in
/// [`extractor`](super::extractor) and must treat its absence as
/// "unauthenticated". Never cached.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResolvedIdentity {
    /// Canonical user id (the token's `sub` claim)
    pub user_id: Uuid,

    /// Email claim, when the issuer includes one. Consumers that need it
    /// (first-time identity bootstrap) fail on absence themselves; the
    /// verifier does not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}
