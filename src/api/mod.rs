//! Prospect REST API
//!
//! HTTP API layer for Prospect, built with Axum.
//!
//! # Endpoints
//!
//! ## Contacts
//! - `GET /api/v1/contacts` - List contacts (search, filters, sorting)
//! - `POST /api/v1/contacts` - Create a contact
//! - `GET /api/v1/contacts/companies` - Distinct companies
//! - `GET /api/v1/contacts/tags` - Distinct tags
//! - `POST /api/v1/contacts/import` - CSV import
//! - `GET /api/v1/contacts/:id` - Get a contact
//! - `PUT /api/v1/contacts/:id` - Update a contact
//! - `DELETE /api/v1/contacts/:id` - Delete a contact
//! - `POST /api/v1/contacts/:id/tags` - Add a tag
//! - `DELETE /api/v1/contacts/:id/tags/:tag` - Remove a tag
//!
//! ## Reports
//! - `GET /api/v1/reports` - List saved reports
//! - `POST /api/v1/reports` - Save a report
//! - `POST /api/v1/reports/preview` - Run an unsaved definition
//! - `GET /api/v1/reports/:id` - Get a report
//! - `PUT /api/v1/reports/:id` - Update a report
//! - `DELETE /api/v1/reports/:id` - Delete a report
//! - `POST /api/v1/reports/:id/run` - Run a saved report
//! - `GET /api/v1/reports/:id/export` - CSV export
//!
//! ## Templates, schema and dashboard
//! - `GET /api/v1/templates` - Built-in templates
//! - `POST /api/v1/templates/:id/instantiate` - Unsaved copy of a template
//! - `GET /api/v1/schema` - Entity catalog
//! - `GET /api/v1/schema/:entity` - One entity
//! - `GET /api/v1/dashboard` - Summary widgets
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use prospect::api::{serve, ApiConfig, AppState};
//! use prospect::store::{Store, StoreConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(Store::open(StoreConfig::default()).await?);
//!     let config = ApiConfig::default();
//!
//!     let state = AppState::new(store, config.clone());
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Contact routes
        .route(
            "/contacts",
            get(routes::contacts::list_contacts).post(routes::contacts::create_contact),
        )
        .route("/contacts/companies", get(routes::contacts::list_companies))
        .route("/contacts/tags", get(routes::contacts::list_tags))
        .route("/contacts/import", post(routes::contacts::import_contacts))
        .route(
            "/contacts/:id",
            get(routes::contacts::get_contact)
                .put(routes::contacts::update_contact)
                .delete(routes::contacts::delete_contact),
        )
        .route("/contacts/:id/tags", post(routes::contacts::add_tag))
        .route("/contacts/:id/tags/:tag", delete(routes::contacts::remove_tag))
        // Report routes
        .route(
            "/reports",
            get(routes::reports::list_reports).post(routes::reports::create_report),
        )
        .route("/reports/preview", post(routes::reports::preview_report))
        .route(
            "/reports/:id",
            get(routes::reports::get_report)
                .put(routes::reports::update_report)
                .delete(routes::reports::delete_report),
        )
        .route("/reports/:id/run", post(routes::reports::run_report))
        .route("/reports/:id/export", get(routes::reports::export_report))
        // Template routes
        .route("/templates", get(routes::templates::list_templates))
        .route(
            "/templates/:id/instantiate",
            post(routes::templates::instantiate_template),
        )
        // Schema routes
        .route("/schema", get(routes::schema::list_entities))
        .route("/schema/:entity", get(routes::schema::get_entity))
        // Dashboard
        .route("/dashboard", get(routes::dashboard::get_dashboard))
        .layer(DefaultBodyLimit::max(state.config.max_body_size));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config.cors_origins);

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// CORS for the configured origins; any origin when none are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();

    CorsLayer::permissive().allow_origin(AllowOrigin::list(allowed))
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Prospect API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Prospect API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Store, StoreConfig};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::Value as Json;
    use tempfile::tempdir;
    use tower::util::ServiceExt;

    async fn create_test_app() -> (Router, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = Arc::new(Store::open(StoreConfig::new(dir.path())).await.unwrap());
        let state = AppState::new(store, ApiConfig::default());
        let router = build_router(state);

        (router, dir)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Json) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(b) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(b.to_string())
            }
            None => Body::empty(),
        };

        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Json::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health_live() {
        let (app, _dir) = create_test_app().await;
        let (status, _) = send(&app, "GET", "/health/live", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_full() {
        let (app, _dir) = create_test_app().await;
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["contacts"], 0);

        let (status, _) = send(&app, "GET", "/health/ready", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_contact() {
        let (app, _dir) = create_test_app().await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/contacts",
            Some(r#"{"firstName":"John","lastName":"Smith","email":"john@example.com","company":"Acme Inc.","tags":["VIP"]}"#),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "Lead");
        let id = body["id"].as_str().unwrap().to_string();

        let (status, body) = send(&app, "GET", &format!("/api/v1/contacts/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "john@example.com");

        let (status, body) = send(&app, "GET", "/api/v1/contacts?search=smith", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);

        let (_, body) = send(&app, "GET", "/api/v1/contacts/companies", None).await;
        assert_eq!(body, serde_json::json!(["Acme Inc."]));
    }

    #[tokio::test]
    async fn test_create_contact_invalid_email() {
        let (app, _dir) = create_test_app().await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/contacts",
            Some(r#"{"firstName":"John","lastName":"Smith","email":"john.example.com","company":"Acme Inc."}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["fields"]["email"], "Invalid email address");

        let (_, body) = send(&app, "GET", "/api/v1/contacts", None).await;
        assert_eq!(body["total"], 0);
    }

    #[tokio::test]
    async fn test_contact_not_found() {
        let (app, _dir) = create_test_app().await;
        let (status, body) = send(&app, "DELETE", "/api/v1/contacts/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_preview_bar_chart() {
        let (app, _dir) = create_test_app().await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/reports/preview",
            Some(r#"{"entity":"deals","fields":["stage"],"chartType":"bar","filterExpression":"stage != 'Closed Lost'"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let viz = &body["visualization"];
        assert_eq!(viz["kind"], "chart");
        assert_eq!(viz["chartType"], "bar");
        assert_eq!(viz["title"], "Stage Distribution");
        assert_eq!(viz["series"][0]["name"], "Count");
    }

    #[tokio::test]
    async fn test_preview_rejects_incompatible_operator() {
        let (app, _dir) = create_test_app().await;

        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/reports/preview",
            Some(r#"{"entity":"deals","fields":["stage"],"filterExpression":"amount contains '5'"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_huge_in_the_last_windows() {
        let (app, _dir) = create_test_app().await;

        send(
            &app,
            "POST",
            "/api/v1/contacts",
            Some(r#"{"firstName":"John","lastName":"Smith","email":"john@example.com","company":"Acme Inc."}"#),
        )
        .await;

        let (status, body) = send(
            &app,
            "GET",
            "/api/v1/contacts?filter=createdAt%20in%20last%2099999999999",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/reports/preview",
            Some(r#"{"entity":"deals","fields":["stage"],"filterExpression":"closeDate in last 99999999999"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_save_run_and_export_report() {
        let (app, _dir) = create_test_app().await;

        let (status, body) = send(&app, "POST", "/api/v1/templates/template-sales-pipeline/instantiate", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Sales Pipeline (Copy)");

        let (status, saved) = send(&app, "POST", "/api/v1/reports", Some(body.to_string().as_str())).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = saved["id"].as_str().unwrap().to_string();

        let (status, run) = send(&app, "POST", &format!("/api/v1/reports/{}/run", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(run["entity"], "deals");

        let (_, saved) = send(&app, "GET", &format!("/api/v1/reports/{}", id), None).await;
        assert!(saved["lastRun"].is_string());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/reports/{}/export", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/csv");
    }

    #[tokio::test]
    async fn test_save_report_requires_name() {
        let (app, _dir) = create_test_app().await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/reports",
            Some(r#"{"entity":"contacts","fields":["status"]}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["fields"]["name"], "Report name is required");
    }

    #[tokio::test]
    async fn test_schema_and_dashboard() {
        let (app, _dir) = create_test_app().await;

        let (status, body) = send(&app, "GET", "/api/v1/schema", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["entities"].as_array().unwrap().len(), 3);

        let (status, _) = send(&app, "GET", "/api/v1/schema/invoices", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, "GET", "/api/v1/dashboard", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalContacts"], 0);
    }

    #[tokio::test]
    async fn test_import_contacts() {
        let (app, _dir) = create_test_app().await;

        let csv = "firstName,lastName,email,company\nJohn,Smith,john@example.com,Acme Inc.\nBad,Row,nope,Acme\n";
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/contacts/import")
                    .header("Content-Type", "text/csv")
                    .body(Body::from(csv))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Json = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "partial");
        assert_eq!(body["imported"], 1);
        assert_eq!(body["errors"][0]["line"], 3);
    }
}
