// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Folda Finances

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup and is immutable afterwards.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SUPABASE_URL` | Issuer base URL for JWKS discovery | Unset: ES256 verification unavailable |
//! | `SUPABASE_JWT_SECRET` | Shared secret for HS256 verification | Required for HS256 deployments |
//! | `JWKS_MAX_AGE_SECS` | Key-cache staleness threshold in seconds | `3600` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::time::Duration;

use crate::auth::keyset::DEFAULT_KEY_MAX_AGE;

/// Environment variable name for the issuer base URL.
pub const ISSUER_URL_ENV: &str = "SUPABASE_URL";

/// Environment variable name for the HS256 shared secret.
pub const JWT_SECRET_ENV: &str = "SUPABASE_JWT_SECRET";

/// Environment variable name for the key-cache staleness threshold.
pub const KEY_MAX_AGE_ENV: &str = "JWKS_MAX_AGE_SECS";

/// Authentication settings, fixed at process start.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Issuer base URL. `None` disables asymmetric verification entirely:
    /// no network call is ever attempted and every asymmetric token fails.
    pub issuer_base_url: Option<String>,
    /// Shared secret for the symmetric scheme.
    pub jwt_secret: String,
    /// Maximum key-cache age before a lookup forces a refresh.
    pub key_max_age: Duration,
}

impl AuthSettings {
    /// Load settings from the environment.
    pub fn from_env() -> Self {
        let issuer_base_url = env::var(ISSUER_URL_ENV).ok().filter(|s| !s.is_empty());
        if issuer_base_url.is_none() {
            tracing::warn!(
                "{ISSUER_URL_ENV} is not set - ES256 token verification will fail"
            );
        }

        let jwt_secret = env::var(JWT_SECRET_ENV).unwrap_or_else(|_| {
            tracing::warn!("{JWT_SECRET_ENV} is not set - HS256 token verification will fail");
            String::new()
        });

        let key_max_age = env::var(KEY_MAX_AGE_ENV)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_KEY_MAX_AGE);

        Self {
            issuer_base_url,
            jwt_secret,
            key_max_age,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_key_max_age_is_one_hour() {
        assert_eq!(DEFAULT_KEY_MAX_AGE, Duration::from_secs(3600));
    }
}
