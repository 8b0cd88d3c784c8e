//! HTTP API Layer
//!
//! This crate provides the REST API for the claim approval engine using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for claims, skip rules, and tenant config
//! - **Middleware**: Tracing and audit logging
//! - **DTOs**: Request/Response data transfer objects with validation
//! - **Error Handling**: Consistent error responses
//!
//! Authentication is handled upstream; requests arrive with the acting
//! tenant in the `X-Tenant-Id` header and the actor identity in the body.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(service, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_approval::ApprovalService;

use crate::config::ApiConfig;
use crate::handlers::{claims, health, skip_rules, tenant_config};
use crate::middleware::audit_middleware;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: ApprovalService,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `service` - The approval orchestration service
/// * `config` - API configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(service: ApprovalService, config: ApiConfig) -> Router {
    let state = AppState { service, config };

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let claims_routes = Router::new()
        .route("/", post(claims::submit_claim))
        .route("/:id", get(claims::get_claim))
        .route("/:id/actions", post(claims::act_on_claim))
        .route("/:id/resubmit", post(claims::resubmit_claim));

    let tenant_routes = Router::new()
        .route("/:tenant_id/skip-rules", get(skip_rules::list_rules))
        .route("/:tenant_id/skip-rules", post(skip_rules::create_rule))
        .route("/:tenant_id/skip-rules/:rule_id", put(skip_rules::update_rule))
        .route(
            "/:tenant_id/skip-rules/:rule_id",
            delete(skip_rules::delete_rule),
        )
        .route(
            "/:tenant_id/auto-approval",
            get(tenant_config::get_auto_approval),
        )
        .route(
            "/:tenant_id/auto-approval",
            put(tenant_config::put_auto_approval),
        );

    let api_routes = Router::new()
        .nest("/claims", claims_routes)
        .nest("/tenants", tenant_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            audit_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
