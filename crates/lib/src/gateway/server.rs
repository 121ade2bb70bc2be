//! Gateway HTTP server: health, webhook verification, and event ingestion.

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::dispatch::Dispatcher;
use crate::channels::messenger::{InboundCallback, PAGE_OBJECT, PLATFORM};
use crate::config::{Config, MalformedPayloadPolicy, MessengerSettings};

/// Shared state for the gateway handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub settings: Arc<MessengerSettings>,
    pub dispatcher: Arc<Dispatcher>,
    pub port: u16,
}

/// Handshake query Messenger sends when a webhook is (re)subscribed.
#[derive(Debug, Default, Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
}

/// Returns the challenge to echo when mode is "subscribe" and the token matches.
/// An unset expected token never matches.
pub fn verify_handshake(expected_token: Option<&str>, query: &VerifyQuery) -> Option<String> {
    let expected = expected_token.filter(|t| !t.is_empty())?;
    if query.mode.as_deref() == Some("subscribe") && query.verify_token.as_deref() == Some(expected) {
        Some(query.challenge.clone().unwrap_or_default())
    } else {
        None
    }
}

/// Build the gateway router.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(health_http))
        .route("/webhook", get(verify_webhook).post(receive_events))
        .with_state(state)
}

/// Run the gateway until SIGINT or SIGTERM.
pub async fn run_gateway(config: &Config, settings: Arc<MessengerSettings>, dispatcher: Dispatcher) -> Result<()> {
    if settings.verify_token.is_none() {
        log::warn!("messenger verify token not configured; webhook verification will always fail");
    }
    if settings.access_token.is_none() {
        log::warn!("messenger access token not configured; replies will not be delivered");
    }
    let state = GatewayState {
        settings,
        dispatcher: Arc::new(dispatcher),
        port: config.gateway.port,
    };
    let app = router(state);

    let bind_addr = format!("{}:{}", config.gateway.bind.trim(), config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped; in-flight steps are abandoned");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received");
}

/// GET / returns a simple health JSON.
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "platform": PLATFORM,
        "port": state.port,
    }))
}

/// GET /webhook — verification handshake. 200 + challenge, or 403 with an empty body.
/// A query that does not deserialize (e.g. a repeated `hub.mode`) is a failed handshake too.
async fn verify_webhook(
    State(state): State<GatewayState>,
    query: Result<Query<VerifyQuery>, QueryRejection>,
) -> (StatusCode, String) {
    let query = match query {
        Ok(Query(q)) => q,
        Err(e) => {
            log::warn!("messenger webhook verification failed: {}", e);
            return (StatusCode::FORBIDDEN, String::new());
        }
    };
    match verify_handshake(state.settings.verify_token.as_deref(), &query) {
        Some(challenge) => {
            log::info!("messenger webhook verified");
            (StatusCode::OK, challenge)
        }
        None => {
            log::warn!(
                "messenger webhook verification failed (mode {:?})",
                query.mode.as_deref().unwrap_or("")
            );
            (StatusCode::FORBIDDEN, String::new())
        }
    }
}

/// POST /webhook — page events. Schedules one step per messaging event and answers 200
/// without waiting for any of them.
async fn receive_events(State(state): State<GatewayState>, body: Bytes) -> StatusCode {
    let callback: InboundCallback = match serde_json::from_slice(&body) {
        Ok(cb) => cb,
        Err(e) => match state.settings.malformed_payload {
            MalformedPayloadPolicy::Ignore => {
                log::warn!("messenger: ignoring malformed callback payload: {}", e);
                return StatusCode::OK;
            }
            MalformedPayloadPolicy::Reject => {
                log::warn!("messenger: rejecting malformed callback payload: {}", e);
                return StatusCode::BAD_REQUEST;
            }
        },
    };
    if callback.object != PAGE_OBJECT {
        log::debug!("messenger: callback object is {:?}, expected {:?}", callback.object, PAGE_OBJECT);
    }
    state.dispatcher.dispatch(&callback);
    StatusCode::OK
}
