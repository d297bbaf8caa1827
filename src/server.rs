//! HTTP surface of the dashboard, built on axum.
//!
//! Handlers stay thin: they pull the token out of the [`TokenStore`], call into the pipeline and
//! map the outcome to a response. The token is only ever set by the OAuth callback and cleared by
//! logout.

use crate::auth::{build_authorization_url, exchange_code_for_token};
use crate::automations::get_automations;
use crate::client::MarketingCloudClient;
use crate::config::DashboardConfig;
use crate::dashboard::{DashboardTemplate, IndexTemplate};
use crate::errors::DashboardError;
use crate::models::automation::NormalizedAutomationRecord;
use crate::session::{InMemoryTokenStore, TokenStore};
use anyhow::Context;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Json, Router};
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<MarketingCloudClient>,
    pub tokens: Arc<dyn TokenStore>,
}

impl AppState {
    pub fn new(client: MarketingCloudClient, tokens: Arc<dyn TokenStore>) -> Self {
        AppState {
            client: Arc::new(client),
            tokens,
        }
    }
}

/// Query parameters the authorization server appends to the redirect URI
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = match &self {
            DashboardError::MissingAccessToken => StatusCode::UNAUTHORIZED,
            DashboardError::AuthExchange { .. }
            | DashboardError::Retrieval { .. }
            | DashboardError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Builds the router with all dashboard, auth and API routes. Unknown paths are served from the
/// static directory. Every route answers cross-origin requests.
pub fn build_router(state: AppState) -> Router {
    let static_dir = state.client.config.static_dir.clone();
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/login", get(login))
        .route("/oauth2/callback", get(oauth_callback))
        .route("/logout", get(logout))
        .route("/debug-env", get(debug_env))
        .route("/dashboard", get(dashboard))
        .route("/api/automations", get(api_automations))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds the configured port and serves until the process is stopped.
pub async fn serve(config: DashboardConfig) -> anyhow::Result<()> {
    let port = config.port;
    let client = MarketingCloudClient::try_from(config).context("Unable to build HTTP client")?;
    let state = AppState::new(client, Arc::new(InMemoryTokenStore::default()));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Unable to bind port {}", port))?;
    info!("Server running on port {}", port);
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}

async fn index() -> IndexTemplate {
    IndexTemplate
}

/// `GET /login`: send the browser to the authorization endpoint.
async fn login(State(state): State<AppState>) -> Redirect {
    let config = &state.client.config;
    let url = build_authorization_url(&config.auth_url, &config.client_id, &config.redirect_uri);
    info!("Authorization URL: {}", url);
    Redirect::to(&url)
}

/// `GET /oauth2/callback`: exchange the code and remember the token.
async fn oauth_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    let code = match params.code.filter(|code| !code.is_empty()) {
        Some(code) => code,
        None => {
            warn!(
                "OAuth callback without code: {}",
                params.error.as_deref().unwrap_or("no error given")
            );
            return (StatusCode::BAD_REQUEST, "Missing authorization code").into_response();
        }
    };

    match exchange_code_for_token(&state.client, &code).await {
        Ok(token) => {
            state.tokens.set(token).await;
            Redirect::to("/dashboard").into_response()
        }
        Err(err) => {
            error!("Error getting token: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed").into_response()
        }
    }
}

/// `GET /logout`
async fn logout(State(state): State<AppState>) -> Redirect {
    state.tokens.clear().await;
    info!("session logged out");
    Redirect::to("/")
}

/// `GET /debug-env`: the public part of the OAuth settings.
async fn debug_env(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = &state.client.config;
    Json(json!({
        "REDIRECT_URI": config.redirect_uri,
        "AUTH_URL": config.auth_url,
        "CLIENT_ID": config.client_id,
    }))
}

/// `GET /dashboard`: HTML table of all active automations.
async fn dashboard(State(state): State<AppState>) -> Response {
    let token = match state.tokens.get().await {
        Some(token) => token,
        None => {
            return (
                StatusCode::UNAUTHORIZED,
                "Unauthorized: No access token found",
            )
                .into_response()
        }
    };

    match get_automations(&state.client, &token).await {
        Ok(records) => DashboardTemplate { data: records }.into_response(),
        Err(err) => {
            error!("Error fetching data for dashboard: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error fetching data for dashboard",
            )
                .into_response()
        }
    }
}

/// `GET /api/automations`: all normalized fields as JSON.
async fn api_automations(
    State(state): State<AppState>,
) -> Result<Json<Vec<NormalizedAutomationRecord>>, DashboardError> {
    let token = state
        .tokens
        .get()
        .await
        .ok_or(DashboardError::MissingAccessToken)?;
    let records = get_automations(&state.client, &token).await.map_err(|err| {
        error!("Error fetching automations: {}", err);
        err
    })?;
    Ok(Json(records))
}
