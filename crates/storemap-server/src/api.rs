//! Routes: the browser bundle as static files, plus a small JSON API the
//! bundle reads its settings from.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{any, get},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use storemap_core::{
    AppConfig, Viewport, FOCUS_ZOOM, MAP_BOUNDS, NEARBY_FOCUS_ZOOM, NEARBY_RESULT_LIMIT,
    SEARCH_DEBOUNCE_MS, SEARCH_RESULT_LIMIT, STATE_KEY, STATE_VERSION,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir,
    set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

use crate::middleware::{request_id, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub static_dir: PathBuf,
    pub client: Arc<ClientConfig>,
}

impl AppState {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            static_dir: config.static_dir.clone(),
            client: Arc::new(ClientConfig::from_app_config(config)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

impl ResponseMeta {
    fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Client settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ViewSettings {
    pub lat: f64,
    pub lng: f64,
    pub zoom: u8,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoundsSettings {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GeolocationSettings {
    pub enable_high_accuracy: bool,
    pub timeout_ms: u64,
    pub maximum_age_ms: u64,
}

/// Settings the browser bundle needs to behave like the command line tools.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub storage_key: &'static str,
    pub state_version: u32,
    pub save_debounce_ms: u64,
    pub search_debounce_ms: u64,
    pub search_result_limit: usize,
    pub nearby_result_limit: usize,
    pub focus_zoom: u8,
    pub nearby_focus_zoom: u8,
    pub default_view: ViewSettings,
    pub bounds: BoundsSettings,
    pub catalog_sources: Vec<String>,
    pub cookie_max_age_days: u32,
    pub geolocation: GeolocationSettings,
}

impl ClientConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        let view = Viewport::default();
        Self {
            storage_key: STATE_KEY,
            state_version: STATE_VERSION,
            save_debounce_ms: config.save_debounce_ms,
            search_debounce_ms: SEARCH_DEBOUNCE_MS,
            search_result_limit: SEARCH_RESULT_LIMIT,
            nearby_result_limit: NEARBY_RESULT_LIMIT,
            focus_zoom: FOCUS_ZOOM,
            nearby_focus_zoom: NEARBY_FOCUS_ZOOM,
            default_view: ViewSettings {
                lat: view.lat(),
                lng: view.lng(),
                zoom: view.zoom(),
            },
            bounds: BoundsSettings {
                south: MAP_BOUNDS.south,
                west: MAP_BOUNDS.west,
                north: MAP_BOUNDS.north,
                east: MAP_BOUNDS.east,
            },
            catalog_sources: config.catalog_sources.clone(),
            cookie_max_age_days: config.cookie_max_age_days,
            geolocation: GeolocationSettings {
                enable_high_accuracy: config.geo_high_accuracy,
                timeout_ms: config.geo_timeout_secs.saturating_mul(1000),
                maximum_age_ms: config.geo_max_age_secs.saturating_mul(1000),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::HEAD])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

pub fn build_app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/client-config", get(client_config))
        .route("/api/{*rest}", any(api_not_found));

    let static_files = ServeDir::new(&state.static_dir);

    Router::new()
        .merge(api_routes)
        .fallback_service(static_files)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id))
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(build_cors())
                // Catalog files change between deploys without renaming.
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("no-cache"),
                )),
        )
        .with_state(state)
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    static_files: &'static str,
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);
    let static_ok = tokio::fs::metadata(&state.static_dir)
        .await
        .is_ok_and(|m| m.is_dir());

    if static_ok {
        (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    static_files: "ok",
                },
                meta,
            }),
        )
    } else {
        tracing::warn!(
            static_dir = %state.static_dir.display(),
            "health check: static directory missing"
        );
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse {
                data: HealthData {
                    status: "degraded",
                    static_files: "missing",
                },
                meta,
            }),
        )
    }
}

async fn client_config(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    Json(ApiResponse {
        data: state.client.as_ref().clone(),
        meta: ResponseMeta::new(req_id.0),
    })
}

async fn api_not_found(Extension(req_id): Extension<RequestId>) -> ApiError {
    ApiError::new(req_id.0, "not_found", "no such API route")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_config(static_dir: PathBuf) -> ClientConfig {
        ClientConfig {
            storage_key: STATE_KEY,
            state_version: STATE_VERSION,
            save_debounce_ms: 300,
            search_debounce_ms: SEARCH_DEBOUNCE_MS,
            search_result_limit: SEARCH_RESULT_LIMIT,
            nearby_result_limit: NEARBY_RESULT_LIMIT,
            focus_zoom: FOCUS_ZOOM,
            nearby_focus_zoom: NEARBY_FOCUS_ZOOM,
            default_view: ViewSettings {
                lat: 23.5,
                lng: 121.0,
                zoom: 8,
            },
            bounds: BoundsSettings {
                south: 20.0,
                west: 118.0,
                north: 26.0,
                east: 124.0,
            },
            catalog_sources: vec![static_dir.join("store_coordinates.json").display().to_string()],
            cookie_max_age_days: 365,
            geolocation: GeolocationSettings {
                enable_high_accuracy: true,
                timeout_ms: 15_000,
                maximum_age_ms: 30_000,
            },
        }
    }

    fn test_app(static_dir: PathBuf) -> Router {
        let client = Arc::new(test_config(static_dir.clone()));
        build_app(AppState { static_dir, client })
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_is_ok_with_static_dir() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get_json(test_app(dir.path().to_path_buf()), "/api/v1/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "ok");
        assert!(body["meta"]["request_id"].is_string());
    }

    #[tokio::test]
    async fn health_is_degraded_without_static_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let (status, body) = get_json(test_app(missing), "/api/v1/health").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["data"]["static_files"], "missing");
    }

    #[tokio::test]
    async fn request_id_is_echoed() {
        let dir = tempfile::tempdir().unwrap();
        let response = test_app(dir.path().to_path_buf())
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .header("x-request-id", "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["x-request-id"], "req-42");
    }

    #[tokio::test]
    async fn client_config_exposes_storage_settings() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) =
            get_json(test_app(dir.path().to_path_buf()), "/api/v1/client-config").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["storageKey"], "storeMapState");
        assert_eq!(body["data"]["saveDebounceMs"], 300);
        assert_eq!(body["data"]["searchDebounceMs"], 200);
        assert_eq!(body["data"]["defaultView"]["zoom"], 8);
        assert_eq!(body["data"]["geolocation"]["timeoutMs"], 15_000);
    }

    #[tokio::test]
    async fn unknown_api_route_is_json_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get_json(test_app(dir.path().to_path_buf()), "/api/v1/stores").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn serves_bundle_and_catalog_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>store map</h1>").unwrap();
        std::fs::write(dir.path().join("store_coordinates.json"), "[]").unwrap();
        let app = test_app(dir.path().to_path_buf());

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"<h1>store map</h1>");

        let (status, body) = get_json(app, "/store_coordinates.json").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));
    }

    #[test]
    fn api_error_not_found_maps_to_404() {
        let response = ApiError::new("req-1", "not_found", "missing").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
