// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Folda Finances

use axum::Json;

use crate::auth::{Identity, ResolvedIdentity};

/// Return the identity the authentication gate resolved for this request.
///
/// The CRUD collaborators (accounts, transactions, budgets) read the same
/// identity to scope their queries; this endpoint exposes it directly so a
/// client can confirm who it is authenticated as.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, body = ResolvedIdentity),
        (status = 401, description = "Invalid or expired token")
    )
)]
pub async fn current_user(Identity(identity): Identity) -> Json<ResolvedIdentity> {
    Json(identity)
}
