//! # REST Routes
//!
//! Route definitions for the gateway.
//!
//! # Route Structure
//!
//! ```text
//! /health                              GET   - Health check
//! /api
//! ├── /config                          GET   - Public catalog
//! │   ├── /countries                   GET
//! │   └── /cryptocurrencies            GET
//! ├── /crypto
//! │   ├── /onramp                      GET   - ?country=
//! │   ├── /offramp                     GET   - ?country=
//! │   └── /payment-methods             GET   - ?country=&currency=
//! ├── /quotes                          POST  - Price a quote form
//! │   └── /live                        GET   - WebSocket live quotes
//! ├── /auth
//! │   ├── /login                       POST
//! │   ├── /verify                      POST
//! │   ├── /logout                      POST
//! │   └── /session                     GET
//! ├── /customers                       POST
//! │   └── /fiat-accounts               GET, POST
//! ├── /kyc                             GET
//! ├── /webhooks/exchange               POST  - Signed provider events
//! ├── /transactions                    GET
//! │   └── /{referenceId}               GET
//! └── /admin
//!     ├── /cryptocurrencies            GET
//!     │   └── /{code}                  PATCH
//!     ├── /payment-methods             GET
//!     │   └── /{type}                  PATCH
//!     └── /config/refresh              POST
//! ```

use crate::api::middleware::auth::session_middleware;
use crate::api::middleware::logging::{LoggingConfig, logging_middleware};
use crate::api::rest::handlers::{
    admin_list_cryptocurrencies, admin_list_payment_methods, admin_refresh_config,
    admin_update_cryptocurrency, admin_update_payment_method, create_customer,
    create_fiat_account, create_quote, exchange_webhook, get_config, get_kyc, get_session,
    get_transaction, health_check, list_countries, list_cryptocurrencies, list_fiat_accounts,
    list_offramp_cryptocurrencies, list_onramp_cryptocurrencies, list_payment_methods,
    list_transactions, login, logout, verify,
};
use crate::api::state::AppState;
use crate::api::websocket::live_quotes;
use crate::config::RestConfig;
use axum::http::{HeaderValue, Method, header};
use axum::middleware::from_fn_with_state;
use axum::{
    Router,
    routing::{get, patch, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

fn api_routes() -> Router<Arc<AppState>> {
    let config_routes = Router::new()
        .route("/", get(get_config))
        .route("/countries", get(list_countries))
        .route("/cryptocurrencies", get(list_cryptocurrencies));

    let crypto_routes = Router::new()
        .route("/onramp", get(list_onramp_cryptocurrencies))
        .route("/offramp", get(list_offramp_cryptocurrencies))
        .route("/payment-methods", get(list_payment_methods));

    let auth_routes = Router::new()
        .route("/login", post(login))
        .route("/verify", post(verify))
        .route("/logout", post(logout))
        .route("/session", get(get_session));

    let customer_routes = Router::new()
        .route("/", post(create_customer))
        .route(
            "/fiat-accounts",
            get(list_fiat_accounts).post(create_fiat_account),
        );

    let transaction_routes = Router::new()
        .route("/", get(list_transactions))
        .route("/{reference_id}", get(get_transaction));

    let admin_routes = Router::new()
        .route("/cryptocurrencies", get(admin_list_cryptocurrencies))
        .route("/cryptocurrencies/{code}", patch(admin_update_cryptocurrency))
        .route("/payment-methods", get(admin_list_payment_methods))
        .route("/payment-methods/{method_type}", patch(admin_update_payment_method))
        .route("/config/refresh", post(admin_refresh_config));

    Router::new()
        .nest("/config", config_routes)
        .nest("/crypto", crypto_routes)
        .route("/quotes", post(create_quote))
        .route("/quotes/live", get(live_quotes))
        .nest("/auth", auth_routes)
        .nest("/customers", customer_routes)
        .route("/kyc", get(get_kyc))
        .route("/webhooks/exchange", post(exchange_webhook))
        .nest("/transactions", transaction_routes)
        .nest("/admin", admin_routes)
}

fn cors_layer(rest: &RestConfig) -> CorsLayer {
    if rest.cors_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = rest
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    // Session cookies need credentials, which rule out wildcards.
    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Creates the gateway router with all endpoints.
///
/// Layers, outermost first: CORS, HTTP trace, request logging, session.
pub fn create_router(state: Arc<AppState>, rest: &RestConfig) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .layer(from_fn_with_state(state.clone(), session_middleware))
        .layer(from_fn_with_state(
            Arc::new(LoggingConfig::default()),
            logging_middleware,
        ))
        .layer(TraceLayer::new_for_http());

    let router = if rest.enable_cors {
        router.layer(cors_layer(rest))
    } else {
        router
    };

    router.with_state(state)
}

/// Creates a router for tests: sessions but no tracing, logging or CORS.
#[cfg(test)]
pub fn create_test_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .layer(from_fn_with_state(state.clone(), session_middleware))
        .with_state(state)
}
