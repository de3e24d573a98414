//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage wiring (in-memory or Postgres)
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: JSON response shaping
//! - `errors.rs`: the error taxonomy and its JSON body

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use stayhub_auth::{Hs256JwtValidator, JwtValidator};

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router with the storage selected by `config`.
pub async fn build_app(config: &ApiConfig) -> anyhow::Result<Router> {
    let services = services::build_services(&config.storage).await?;
    Ok(build_router(config, Arc::new(services)))
}

/// Build the router around already-constructed services.
pub fn build_router(config: &ApiConfig, services: Arc<AppServices>) -> Router {
    let jwt: Arc<dyn JwtValidator> =
        Arc::new(Hs256JwtValidator::new(config.jwt_secret.clone().into_bytes()));
    let auth_state = middleware::AuthState { jwt };

    Router::new()
        .route("/", get(routes::system::root))
        .route("/health", get(routes::system::health))
        .nest("/api", routes::router())
        .fallback(routes::system::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(axum::middleware::from_fn_with_state(
                    config.environment,
                    middleware::error_detail_middleware,
                ))
                .layer(Extension(services))
                .layer(axum::middleware::from_fn_with_state(
                    auth_state,
                    middleware::auth_middleware,
                )),
        )
}
