//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use super::common::ApiResponse;
use super::middleware::{auth_middleware, AuthState};
use super::modules::auth::{self, AuthHandlerState, OperatorCredentials};
use super::modules::dispensers::{self, DispenserHandlerState};
use super::modules::health::{self, HealthState};
use super::modules::telemetry::{record_route, render_metrics, trace_request, MetricsState};
use crate::application::DispenserService;
use crate::infrastructure::crypto::jwt::JwtConfig;

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token from POST /security/authenticate"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::authenticate,
        dispensers::create_dispenser,
        dispensers::change_status,
        dispensers::get_spending,
        dispensers::get_dispenser,
    ),
    components(
        schemas(
            ApiResponse<String>,
            health::HealthResponse,
            health::ComponentHealth,
            auth::LoginRequest,
            auth::LoginResponse,
            dispensers::CreateDispenserRequest,
            dispensers::DispenserResponse,
            dispensers::ChangeStatusRequest,
            dispensers::StatusChangedResponse,
            dispensers::SpendingResponse,
            dispensers::SessionSpendingDto,
            dispensers::DispenserStateResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Server health check endpoints"),
        (name = "Authentication", description = "Token issuance for the operator account"),
        (name = "Dispensers", description = "Beer taps: registration, open/close and spending"),
    ),
    info(
        title = "Dispenser Billing API",
        version = "0.1.0",
        description = "Tracks beer tap usage sessions and bills them by time and flow rate",
    )
)]
pub struct ApiDoc;

/// Everything the HTTP layer needs from the running service
pub struct RouterDeps {
    pub service: Arc<DispenserService>,
    pub jwt_config: JwtConfig,
    pub credentials: Arc<OperatorCredentials>,
    /// Pinged by `/health`; `None` skips the database check
    pub db: Option<DatabaseConnection>,
    /// Serves `/metrics` when a recorder is installed
    pub prometheus: Option<PrometheusHandle>,
}

/// Create the API router with all routes
pub fn create_api_router(deps: RouterDeps) -> Router {
    let middleware_state = AuthState {
        jwt_config: deps.jwt_config.clone(),
    };

    // Protected
    let dispenser_routes = Router::new()
        .route("/dispenser", post(dispensers::create_dispenser))
        .route("/dispenser/{id}", get(dispensers::get_dispenser))
        .route("/dispenser/{id}/status", put(dispensers::change_status))
        .route("/dispenser/{id}/spending", get(dispensers::get_spending))
        .layer(middleware::from_fn_with_state(
            middleware_state,
            auth_middleware,
        ))
        .with_state(DispenserHandlerState {
            service: deps.service,
        });

    // Public
    let auth_routes = Router::new()
        .route("/security/authenticate", post(auth::authenticate))
        .with_state(AuthHandlerState {
            credentials: deps.credentials,
            jwt_config: deps.jwt_config,
        });

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(HealthState {
            db: deps.db,
            started_at: Arc::new(Instant::now()),
        });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let mut router = Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .merge(auth_routes)
        .merge(dispenser_routes);

    if let Some(handle) = deps.prometheus {
        router = router.route(
            "/metrics",
            get(render_metrics).with_state(MetricsState { handle }),
        );
    }

    router
        .route_layer(middleware::from_fn(record_route))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_request))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::infrastructure::storage::InMemoryRepositoryProvider;

    const USER: &str = "operator";
    const PASSWORD: &str = "hoppy";

    fn app() -> Router {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        create_api_router(RouterDeps {
            service: Arc::new(DispenserService::new(repos)),
            jwt_config: JwtConfig::new("router-test-secret", 10),
            credentials: Arc::new(OperatorCredentials::with_cost(USER, PASSWORD, 4).unwrap()),
            db: None,
            prometheus: None,
        })
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(b) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&b).unwrap())
            }
            None => Body::empty(),
        };

        let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn login(app: &Router) -> String {
        let (status, body) = send(
            app,
            "POST",
            "/security/authenticate",
            None,
            Some(json!({"userName": USER, "password": PASSWORD})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["jsonWebToken"].as_str().unwrap().to_string()
    }

    async fn create(app: &Router, token: &str, flow_rate: f64) -> i64 {
        let (status, body) = send(
            app,
            "POST",
            "/dispenser",
            Some(token),
            Some(json!({"flowRate": flow_rate})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let (status, body) = send(&app(), "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn bad_credentials_are_unauthorized() {
        let (status, body) = send(
            &app(),
            "POST",
            "/security/authenticate",
            None,
            Some(json!({"userName": USER, "password": "wrong"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn dispenser_routes_require_a_token() {
        let app = app();
        let (status, _) = send(&app, "POST", "/dispenser", None, Some(json!({"flowRate": 0.1}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, "GET", "/dispenser/1/spending", Some("not-a-jwt"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_rejects_non_positive_flow_rate() {
        let app = app();
        let token = login(&app).await;
        let (status, _) = send(&app, "POST", "/dispenser", Some(&token), Some(json!({"flowRate": 0}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        for rate in [1e30, 1e-30] {
            let (status, body) =
                send(&app, "POST", "/dispenser", Some(&token), Some(json!({"flowRate": rate}))).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            assert_eq!(body["success"], false);
        }
    }

    #[tokio::test]
    async fn open_close_and_bill_end_to_end() {
        let app = app();
        let token = login(&app).await;
        let id = create(&app, &token, 0.0834).await;

        let (status, body) = send(
            &app,
            "PUT",
            &format!("/dispenser/{}/status", id),
            Some(&token),
            Some(json!({"status": "open", "timestamp": "2022-01-01T02:00:00Z"})),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["message"], "Status of the tap changed correctly");

        let (status, body) = send(&app, "GET", &format!("/dispenser/{}", id), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "running");

        let (status, _) = send(
            &app,
            "PUT",
            &format!("/dispenser/{}/status", id),
            Some(&token),
            Some(json!({"status": "close", "timestamp": "2022-01-01T02:01:40Z"})),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);

        let (status, body) = send(
            &app,
            "GET",
            &format!("/dispenser/{}/spending", id),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalAmount"], "102.165");
        let sessions = body["sessions"].as_array().unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0]["openedAt"], "2022-01-01T02:00:00Z");
        assert_eq!(sessions[0]["closedAt"], "2022-01-01T02:01:40Z");
        assert_eq!(sessions[0]["amountOwed"], "102.165");

        let (_, body) = send(&app, "GET", &format!("/dispenser/{}", id), Some(&token), None).await;
        assert_eq!(body["state"], "idle");
        assert_eq!(body["amount"], "102.165");
    }

    #[tokio::test]
    async fn running_session_shows_flat_amount() {
        let app = app();
        let token = login(&app).await;
        let id = create(&app, &token, 0.5).await;

        send(
            &app,
            "PUT",
            &format!("/dispenser/{}/status", id),
            Some(&token),
            Some(json!({"status": "open", "updated_at": "2022-01-01 02:00:00"})),
        )
        .await;

        let (_, body) = send(
            &app,
            "GET",
            &format!("/dispenser/{}/spending", id),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(body["totalAmount"], "1.23");
        assert_eq!(body["sessions"][0]["closedAt"], Value::Null);
    }

    #[tokio::test]
    async fn invalid_transitions_are_conflicts() {
        let app = app();
        let token = login(&app).await;
        let id = create(&app, &token, 0.1).await;
        let uri = format!("/dispenser/{}/status", id);

        let (status, body) = send(
            &app,
            "PUT",
            &uri,
            Some(&token),
            Some(json!({"status": "close", "timestamp": "2022-01-01T00:00:00Z"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);

        let open = json!({"status": "open", "timestamp": "2022-01-01T00:00:00Z"});
        let (status, _) = send(&app, "PUT", &uri, Some(&token), Some(open.clone())).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        let (status, _) = send(&app, "PUT", &uri, Some(&token), Some(open)).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn close_before_open_fails_on_spending() {
        let app = app();
        let token = login(&app).await;
        let id = create(&app, &token, 0.1).await;
        let uri = format!("/dispenser/{}/status", id);

        send(
            &app,
            "PUT",
            &uri,
            Some(&token),
            Some(json!({"status": "open", "timestamp": "2021-12-31T00:00:00Z"})),
        )
        .await;
        let (status, _) = send(
            &app,
            "PUT",
            &uri,
            Some(&token),
            Some(json!({"status": "close", "timestamp": "2021-12-20T00:00:00Z"})),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);

        let (status, _) = send(
            &app,
            "GET",
            &format!("/dispenser/{}/spending", id),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn unknown_dispenser_is_not_found() {
        let app = app();
        let token = login(&app).await;
        for (method, uri, body) in [
            ("GET", "/dispenser/404/spending", None),
            ("GET", "/dispenser/404", None),
            (
                "PUT",
                "/dispenser/404/status",
                Some(json!({"status": "open", "timestamp": "2022-01-01T00:00:00Z"})),
            ),
        ] {
            let (status, _) = send(&app, method, uri, Some(&token), body).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{} {}", method, uri);
        }
    }

    #[tokio::test]
    async fn request_id_is_echoed() {
        let resp = app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.headers()["x-request-id"], "abc-123");
    }
}
