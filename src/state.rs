// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Folda Finances

use std::sync::Arc;

use crate::auth::{JwksFetcher, KeySetCache, TokenVerifier};
use crate::config::AuthSettings;

/// Shared application state.
///
/// The verifier (and the key cache inside it) is the only state shared
/// across concurrent requests.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(settings: &AuthSettings) -> Self {
        let cache = KeySetCache::new(settings.key_max_age);
        let fetcher = settings
            .issuer_base_url
            .as_deref()
            .and_then(JwksFetcher::new);
        let verifier = TokenVerifier::new(cache, fetcher, settings.jwt_secret.clone());

        Self {
            verifier: Arc::new(verifier),
        }
    }
}
