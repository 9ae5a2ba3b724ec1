// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Folda Finances

use axum::{middleware, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    api::health::{HealthResponse, ReadyChecks, ReadyResponse},
    auth::{identity::ResolvedIdentity, require_auth},
    state::AppState,
};

pub mod health;
pub mod user;

pub fn router(state: AppState) -> Router {
    // Everything that resolves identities sits behind the gate; the CRUD
    // collaborator routers nest here as they come online.
    let protected = Router::new()
        .route("/auth/me", get(user::current_user))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .nest("/api", protected)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::permissive()),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(health::health, health::ready, user::current_user),
    components(schemas(HealthResponse, ReadyResponse, ReadyChecks, ResolvedIdentity)),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Auth", description = "Authenticated identity")
    )
)]
struct ApiDoc;
