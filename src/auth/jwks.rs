// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Folda Finances

//! JWKS (JSON Web Key Set) fetching.
//!
//! The issuer publishes its current public keys at a well-known path under
//! its base URL. The fetcher retrieves and parses that document; installing
//! the result into the [`KeySetCache`](super::keyset::KeySetCache) is the
//! caller's job.
//!
//! The issuer may publish key types we do not verify with (RSA, octet keys,
//! other curves). Those records are skipped, not errors: only transport/HTTP
//! failures and an unparseable top-level document fail the fetch.

use std::collections::HashMap;

use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use url::Url;

use super::error::AuthError;
use super::keyset::VerificationKey;

/// Well-known discovery path under the issuer base URL.
const DISCOVERY_PATH: &str = "/auth/v1/.well-known/jwks.json";

/// The one curve tokens are verified on.
const SUPPORTED_CURVE: &str = "P-256";

/// Key-set document as published at the discovery endpoint.
#[derive(Debug, Deserialize)]
struct KeySetDocument {
    keys: Vec<KeyRecord>,
}

/// One published key record. Every field defaults so that records of types
/// we never look at cannot fail the document parse.
#[derive(Debug, Default, Deserialize)]
struct KeyRecord {
    #[serde(default)]
    kid: String,
    #[serde(default)]
    kty: String,
    #[serde(default)]
    crv: String,
    #[serde(default)]
    x: String,
    #[serde(default)]
    y: String,
}

/// Fetches the issuer's key set over HTTPS.
#[derive(Clone)]
pub struct JwksFetcher {
    discovery_url: String,
    client: reqwest::Client,
}

impl JwksFetcher {
    /// Create a fetcher for the given issuer base URL.
    ///
    /// Returns `None` when the base URL does not parse; the caller treats
    /// that the same as an unconfigured issuer.
    pub fn new(issuer_base_url: &str) -> Option<Self> {
        let discovery_url = format!(
            "{}{}",
            issuer_base_url.trim_end_matches('/'),
            DISCOVERY_PATH
        );
        if Url::parse(&discovery_url).is_err() {
            return None;
        }
        Some(Self {
            discovery_url,
            // No timeout override; the host request deadline governs.
            client: reqwest::Client::new(),
        })
    }

    /// The resolved discovery URL.
    pub fn discovery_url(&self) -> &str {
        &self.discovery_url
    }

    /// Fetch and parse the key set.
    ///
    /// Success means the document parsed, even if zero keys were usable.
    pub async fn fetch(&self) -> Result<HashMap<String, VerificationKey>, AuthError> {
        let response = self
            .client
            .get(&self.discovery_url)
            .send()
            .await
            .map_err(|e| AuthError::FetchTransport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::FetchTransport(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        let document: KeySetDocument = response
            .json()
            .await
            .map_err(|e| AuthError::FetchParse(e.to_string()))?;

        let keys = keys_from_document(document);
        tracing::info!(count = keys.len(), "fetched verification keys from issuer");
        Ok(keys)
    }
}

/// Convert published records into verification keys, keeping only EC keys on
/// the supported curve. Records that fail to parse are dropped, never stored
/// as placeholders.
fn keys_from_document(document: KeySetDocument) -> HashMap<String, VerificationKey> {
    let mut keys = HashMap::new();
    for record in document.keys {
        if record.kty != "EC" || record.crv != SUPPORTED_CURVE {
            continue;
        }
        match DecodingKey::from_ec_components(&record.x, &record.y) {
            Ok(key) => {
                keys.insert(
                    record.kid,
                    VerificationKey {
                        key,
                        curve: record.crv,
                    },
                );
            }
            Err(e) => {
                tracing::warn!(kid = %record.kid, error = %e, "skipping unparseable key record");
            }
        }
    }
    keys
}
