use std::sync::Arc;

use axum::{
    Router,
    extract::FromRef,
    routing::{get, post},
};

use crate::{
    config::Config,
    infrastructure::UpstreamClient,
    middleware::{
        RequestForwarder, SessionValidator, TicketExchanger, check_sid, check_ticket, forward,
        log_errors, trace_requests,
    },
};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub config: Arc<Config>,
    pub validator: Arc<SessionValidator>,
    pub exchanger: Arc<TicketExchanger>,
    pub forwarder: Arc<RequestForwarder>,
}

impl AppState {
    pub fn new(config: Config, upstream: UpstreamClient) -> Self {
        Self {
            validator: Arc::new(SessionValidator::new(&config, upstream.clone())),
            exchanger: Arc::new(TicketExchanger::new(&config, upstream.clone())),
            forwarder: Arc::new(RequestForwarder::new(&config, upstream)),
            config: Arc::new(config),
        }
    }
}

async fn session_ok() -> &'static str {
    "ok"
}

pub fn build(config: Config) -> Router {
    build_with_client(config, UpstreamClient::new())
}

pub fn build_with_client(config: Config, upstream: UpstreamClient) -> Router {
    let state = AppState::new(config, upstream);

    // 换票接口本身无需会话
    let public_routes = Router::new().route("/sso/ticket", get(check_ticket));

    let protected_routes = Router::new()
        .route("/session", get(session_ok))
        .route("/forward", post(forward))
        .layer(axum::middleware::from_fn_with_state(state.clone(), check_sid));

    let routes = Router::new().merge(public_routes).merge(protected_routes);
    let base = state.config.api_base_uri.trim_matches('/');
    let router = if base.is_empty() {
        routes
    } else {
        Router::new().nest(&format!("/{base}"), routes)
    };

    router
        .layer(axum::middleware::from_fn(log_errors))
        .layer(axum::middleware::from_fn(trace_requests))
        .with_state(state)
}
