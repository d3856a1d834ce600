mod restaurants;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use drange_engine::{DeliveryRangeService, EngineError, ErrorKind};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, require_bearer_auth, AuthState, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub service: DeliveryRangeService,
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

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    store: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
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
            "catalog_not_built" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "validation_error" => StatusCode::BAD_REQUEST,
            "bad_gateway" => StatusCode::BAD_GATEWAY,
            "service_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_engine_error(request_id: String, error: &EngineError) -> ApiError {
    match error.kind() {
        ErrorKind::NotFound => {
            tracing::warn!(error = %error, "catalog indexes missing");
            ApiError::new(
                request_id,
                "catalog_not_built",
                "restaurant catalog has not been built",
            )
        }
        ErrorKind::Store => {
            tracing::error!(error = %error, "store operation failed");
            ApiError::new(request_id, "service_unavailable", "store unavailable")
        }
        kind @ (ErrorKind::Format | ErrorKind::Data | ErrorKind::Feed) => {
            tracing::error!(error = %error, %kind, "catalog feed rejected");
            ApiError::new(request_id, "bad_gateway", error.to_string())
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/restaurants/preprocess",
            post(restaurants::preprocess),
        )
        .layer(axum::middleware::from_fn_with_state(
            auth,
            require_bearer_auth,
        ))
}

pub fn build_app(state: AppState, auth: AuthState) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/restaurants/in-range", get(restaurants::in_range));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match state.service.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    store: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        store: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use drange_catalog::StaticCatalog;
    use drange_core::IndexStrategy;
    use drange_engine::EngineSettings;
    use drange_store::MemoryStore;
    use tower::ServiceExt;

    // Complementary windows: exactly one of the two is open at any minute.
    const CATALOG: &str = "id,latitude,longitude,availability_radius,open_hour,close_hour,rating\n\
                           day,50.05,8.67,6,00:00,12:00,4.5\n\
                           night,50.05,8.67,6,12:00,00:00,4.1\n";

    fn app(body: &str, auth: AuthState) -> Router {
        let service = DeliveryRangeService::new(
            Arc::new(StaticCatalog::new(body)),
            Arc::new(MemoryStore::new()),
            EngineSettings {
                strategy: IndexStrategy::Sharded,
                ..EngineSettings::default()
            },
        );
        build_app(AppState { service }, auth)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = serde_json::from_slice(&body).expect("json parse");
        (status, json)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    fn preprocess_request(token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/restaurants/preprocess");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).expect("request")
    }

    #[test]
    fn api_error_codes_map_to_statuses() {
        let cases = [
            ("validation_error", StatusCode::BAD_REQUEST),
            ("catalog_not_built", StatusCode::NOT_FOUND),
            ("bad_gateway", StatusCode::BAD_GATEWAY),
            ("service_unavailable", StatusCode::SERVICE_UNAVAILABLE),
            ("something_else", StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (code, status) in cases {
            let response = ApiError::new("req-1", code, "msg").into_response();
            assert_eq!(response.status(), status, "{code}");
        }
    }

    #[tokio::test]
    async fn health_reports_ok_and_echoes_request_id() {
        let app = app(CATALOG, AuthState::disabled());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .header("x-request-id", "req-42")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-request-id"], "req-42");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["meta"]["request_id"], "req-42");
    }

    #[tokio::test]
    async fn in_range_before_preprocess_is_catalog_not_built() {
        let app = app(CATALOG, AuthState::disabled());
        let (status, json) = send(
            &app,
            get_request("/api/v1/restaurants/in-range?lat=50.06&long=8.68"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "catalog_not_built");
    }

    #[tokio::test]
    async fn preprocess_then_query_returns_restaurant() {
        let app = app(CATALOG, AuthState::disabled());

        let (status, json) = send(&app, preprocess_request(None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["restaurants_indexed"], 2);
        assert_eq!(json["data"]["rows_skipped"], 0);
        assert_eq!(json["data"]["radius_exceeds_window"], 0);

        let (status, json) = send(
            &app,
            get_request("/api/v1/restaurants/in-range?lat=50.06&long=8.68"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let ids = json["data"]["restaurant_ids"].as_array().expect("ids array");
        assert_eq!(ids.len(), 1, "{ids:?}");
    }

    #[tokio::test]
    async fn in_range_rejects_bad_parameters() {
        let app = app(CATALOG, AuthState::disabled());
        for uri in [
            "/api/v1/restaurants/in-range",
            "/api/v1/restaurants/in-range?lat=50.06",
            "/api/v1/restaurants/in-range?lat=north&long=8.68",
            "/api/v1/restaurants/in-range?lat=91&long=8.68",
            "/api/v1/restaurants/in-range?lat=50&long=-180.5",
            "/api/v1/restaurants/in-range?lat=NaN&long=8.68",
        ] {
            let (status, json) = send(&app, get_request(uri)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(json["error"]["code"], "validation_error", "{uri}");
        }
    }

    #[tokio::test]
    async fn preprocess_requires_bearer_token_when_enabled() {
        let app = app(CATALOG, AuthState::with_keys(["secret".to_owned()]));

        let (status, json) = send(&app, preprocess_request(None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["code"], "unauthorized");

        let (status, _) = send(&app, preprocess_request(Some("wrong"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, preprocess_request(Some("secret"))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn preprocess_with_bad_header_is_bad_gateway() {
        let app = app("id,lat\nr1,50\n", AuthState::disabled());
        let (status, json) = send(&app, preprocess_request(None)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"]["code"], "bad_gateway");
    }
}
