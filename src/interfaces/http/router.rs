//! API Router with Swagger UI

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{
    BusinessService, ReservationService, ResourceService, SharedEventBus, UserService,
};
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::common::{ApiResponse, EmptyData, PageQuery, PaginatedResponse};
use crate::interfaces::http::middleware::{auth_middleware, AuthState};
use crate::interfaces::http::modules::{
    auth, businesses, health, metrics, request_id, reservations, resources,
};
use crate::interfaces::ws::{ws_notifications_handler, NotificationState};

/// Everything the HTTP layer needs, built once at startup.
#[derive(Clone)]
pub struct ApiContext {
    pub users: Arc<UserService>,
    pub businesses: Arc<BusinessService>,
    pub resources: Arc<ResourceService>,
    pub reservations: Arc<ReservationService>,
    pub event_bus: SharedEventBus,
    pub jwt_config: JwtConfig,
    /// `None` on in-memory repositories
    pub db: Option<DatabaseConnection>,
    /// `None` disables `GET /metrics`
    pub prometheus: Option<PrometheusHandle>,
    pub request_timeout: Duration,
}

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
                        .description(Some("JWT from POST /api/v1/auth/login"))
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
        // Health
        health::health_check,
        // Auth
        auth::login,
        auth::register,
        auth::get_current_user,
        // Businesses
        businesses::list_businesses,
        businesses::create_business,
        businesses::get_business,
        businesses::update_business,
        businesses::delete_business,
        // Resources
        resources::list_resources,
        resources::create_resource,
        resources::get_resource,
        resources::update_resource,
        resources::delete_resource,
        resources::resource_availability,
        // Reservations
        reservations::list_reservations,
        reservations::create_reservation,
        reservations::get_reservation,
        reservations::update_reservation,
        reservations::confirm_reservation,
        reservations::cancel_reservation,
        reservations::delete_reservation,
    ),
    components(
        schemas(
            // Common
            ApiResponse<EmptyData>,
            EmptyData,
            PageQuery,
            PaginatedResponse<businesses::BusinessDto>,
            PaginatedResponse<resources::ResourceDto>,
            PaginatedResponse<reservations::ReservationDto>,
            // Health
            health::HealthResponse,
            health::ComponentHealth,
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::RegisterRequest,
            auth::UserInfo,
            // Businesses
            businesses::BusinessRequest,
            businesses::BusinessDto,
            // Resources
            resources::ResourceRequest,
            resources::ResourceDto,
            resources::AvailabilityDto,
            // Reservations
            reservations::ContactDto,
            reservations::ReservationRequest,
            reservations::ReservationDto,
            reservations::CancelReservationResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Server health check"),
        (name = "Authentication", description = "Login (JWT), user registration, current user"),
        (name = "Businesses", description = "Tenant management"),
        (name = "Resources", description = "Tables and rooms, slot availability"),
        (name = "Reservations", description = "Bookings with overlap protection"),
    ),
    info(
        title = "Reserva API",
        version = "0.1.0",
        description = "Multi-tenant reservation platform for restaurants and lodgings",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(ctx: ApiContext) -> Router {
    let auth_state = AuthState {
        jwt_config: ctx.jwt_config.clone(),
    };
    let require_auth = middleware::from_fn_with_state(auth_state, auth_middleware);

    // Login is public; everything layered above it needs a token.
    let auth_routes = Router::new()
        .route("/me", get(auth::get_current_user))
        .route("/register", post(auth::register))
        .layer(require_auth.clone())
        .route("/login", post(auth::login))
        .with_state(auth::AuthHandlerState {
            users: Arc::clone(&ctx.users),
        });

    // ── Tenant routes ───────────────────────────────────────────

    let business_routes = Router::new()
        .route(
            "/",
            get(businesses::list_businesses).post(businesses::create_business),
        )
        .route(
            "/{business_id}",
            get(businesses::get_business)
                .put(businesses::update_business)
                .delete(businesses::delete_business),
        )
        .with_state(businesses::BusinessAppState {
            businesses: Arc::clone(&ctx.businesses),
        });

    let resource_routes = Router::new()
        .route(
            "/{business_id}/resources",
            get(resources::list_resources).post(resources::create_resource),
        )
        .route(
            "/{business_id}/resources/{resource_id}",
            get(resources::get_resource)
                .put(resources::update_resource)
                .delete(resources::delete_resource),
        )
        .route(
            "/{business_id}/resources/{resource_id}/availability",
            get(resources::resource_availability),
        )
        .with_state(resources::ResourceAppState {
            resources: Arc::clone(&ctx.resources),
        });

    let reservation_routes = Router::new()
        .route(
            "/{business_id}/reservations",
            get(reservations::list_reservations).post(reservations::create_reservation),
        )
        .route(
            "/{business_id}/reservations/{reservation_id}",
            get(reservations::get_reservation)
                .put(reservations::update_reservation)
                .delete(reservations::delete_reservation),
        )
        .route(
            "/{business_id}/reservations/{reservation_id}/confirm",
            post(reservations::confirm_reservation),
        )
        .route(
            "/{business_id}/reservations/{reservation_id}/cancel",
            post(reservations::cancel_reservation),
        )
        .with_state(reservations::ReservationAppState {
            reservations: Arc::clone(&ctx.reservations),
        });

    let tenant_routes = business_routes
        .merge(resource_routes)
        .merge(reservation_routes)
        .layer(require_auth);

    // Notifications WebSocket (authenticates itself, see `ws::notifications`)
    let notification_routes = Router::new()
        .route("/ws", get(ws_notifications_handler))
        .with_state(NotificationState {
            event_bus: ctx.event_bus.clone(),
            jwt_config: ctx.jwt_config.clone(),
        });

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health::HealthState {
            db: ctx.db.clone(),
            event_bus: ctx.event_bus.clone(),
            started_at: Arc::new(Instant::now()),
        });

    // The timeout must not cut long-lived WebSocket streams.
    let api_routes = Router::new()
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/businesses", tenant_routes)
        .layer(TimeoutLayer::new(ctx.request_timeout));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(health_routes)
        .merge(api_routes)
        .nest("/api/v1/notifications", notification_routes);

    if let Some(handle) = ctx.prometheus {
        router = router.merge(
            Router::new()
                .route("/metrics", get(metrics::prometheus_metrics))
                .with_state(metrics::MetricsState { handle }),
        );
    }

    router
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};

    use crate::application::{create_event_bus, ReservationPolicy};
    use crate::domain::{
        Business, BusinessDraft, RepositoryProvider, Resource, ResourceDraft, ResourceKind,
        UserRole,
    };
    use crate::infrastructure::crypto::jwt::create_token;
    use crate::infrastructure::notifications::LogMailer;
    use crate::infrastructure::storage::InMemoryRepositoryProvider;

    struct Fixture {
        router: Router,
        business_id: String,
        table_id: String,
        jwt: JwtConfig,
    }

    impl Fixture {
        fn token(&self, role: UserRole, business_id: Option<&str>) -> String {
            create_token("u-test", "tester", role, business_id, &self.jwt).unwrap()
        }

        fn staff(&self) -> String {
            self.token(UserRole::Staff, Some(&self.business_id))
        }

        async fn send(
            &self,
            method: &str,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            use tower::Service;

            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header("authorization", format!("Bearer {}", token));
            }
            let request = match body {
                Some(body) => builder
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let mut svc = self.router.clone().into_service();
            let response = svc.call(request).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, json)
        }
    }

    async fn fixture() -> Fixture {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let business = Business::new(BusinessDraft {
            name: "Casa Lola".into(),
            slug: "casa-lola".into(),
            email: None,
            phone: None,
            address: None,
            is_active: true,
        });
        repos.businesses().insert(business.clone()).await.unwrap();
        let table = Resource::new(
            business.id.clone(),
            ResourceDraft {
                kind: ResourceKind::Table,
                name: "Mesa 4".into(),
                min_capacity: Some(1),
                max_capacity: Some(4),
                is_active: true,
            },
        );
        repos.resources().insert(table.clone()).await.unwrap();

        let repos: Arc<dyn RepositoryProvider> = repos;
        let jwt = JwtConfig::default();
        let event_bus = create_event_bus();
        let ctx = ApiContext {
            users: Arc::new(UserService::new(repos.clone(), jwt.clone())),
            businesses: Arc::new(BusinessService::new(repos.clone())),
            resources: Arc::new(ResourceService::new(repos.clone())),
            reservations: Arc::new(ReservationService::new(
                repos,
                Arc::new(LogMailer::new("reservas@example.com", false)),
                event_bus.clone(),
                ReservationPolicy::default(),
            )),
            event_bus,
            jwt_config: jwt.clone(),
            db: None,
            prometheus: None,
            request_timeout: Duration::from_secs(5),
        };

        Fixture {
            router: create_api_router(ctx),
            business_id: business.id,
            table_id: table.id,
            jwt,
        }
    }

    fn booking(table_id: &str, start: &str, end: &str) -> Value {
        json!({
            "resource_id": table_id,
            "contact": {"name": "Ana", "email": "ana@example.com", "phone": "600000000"},
            "start_at": start,
            "end_at": end,
            "number_of_guests": 2
        })
    }

    #[tokio::test]
    async fn health_is_public() {
        let f = fixture().await;
        let (status, body) = f.send("GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"]["status"], "memory");
    }

    #[tokio::test]
    async fn tenant_routes_require_a_token() {
        let f = fixture().await;
        let uri = format!("/api/v1/businesses/{}/reservations", f.business_id);
        let (status, body) = f.send("GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);

        let (status, _) = f.send("GET", &uri, Some("not-a-jwt"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn overlapping_booking_is_409_and_touching_is_201() {
        let f = fixture().await;
        let token = f.staff();
        let uri = format!("/api/v1/businesses/{}/reservations", f.business_id);

        let (status, body) = f
            .send(
                "POST",
                &uri,
                Some(&token),
                Some(booking(&f.table_id, "2030-05-01T10:00:00Z", "2030-05-01T11:00:00Z")),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["status"], "Confirmed");

        let (status, body) = f
            .send(
                "POST",
                &uri,
                Some(&token),
                Some(booking(&f.table_id, "2030-05-01T10:30:00Z", "2030-05-01T11:30:00Z")),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);

        let (status, _) = f
            .send(
                "POST",
                &uri,
                Some(&token),
                Some(booking(&f.table_id, "2030-05-01T11:00:00Z", "2030-05-01T12:00:00Z")),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn invalid_bookings_are_400() {
        let f = fixture().await;
        let token = f.staff();
        let uri = format!("/api/v1/businesses/{}/reservations", f.business_id);

        let (status, _) = f
            .send(
                "POST",
                &uri,
                Some(&token),
                Some(booking(&f.table_id, "2030-05-01T11:00:00Z", "2030-05-01T10:00:00Z")),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let mut zero_guests = booking(&f.table_id, "2030-05-01T10:00:00Z", "2030-05-01T11:00:00Z");
        zero_guests["number_of_guests"] = json!(0);
        let (status, _) = f.send("POST", &uri, Some(&token), Some(zero_guests)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let mut bad_email = booking(&f.table_id, "2030-05-01T10:00:00Z", "2030-05-01T11:00:00Z");
        bad_email["contact"]["email"] = json!("not-an-email");
        let (status, _) = f.send("POST", &uri, Some(&token), Some(bad_email)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn other_business_in_path_is_403() {
        let f = fixture().await;
        let foreign = f.token(UserRole::Owner, Some("someone-else"));
        let uri = format!("/api/v1/businesses/{}/reservations", f.business_id);

        let (status, _) = f.send("GET", &uri, Some(&foreign), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn reservation_of_another_business_is_404() {
        let f = fixture().await;
        let uri = format!("/api/v1/businesses/{}/reservations", f.business_id);
        let (_, created) = f
            .send(
                "POST",
                &uri,
                Some(&f.staff()),
                Some(booking(&f.table_id, "2030-05-02T20:00:00Z", "2030-05-02T22:00:00Z")),
            )
            .await;
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let admin = f.token(UserRole::Admin, None);
        let (status, _) = f
            .send(
                "GET",
                &format!("/api/v1/businesses/other-biz/reservations/{}", id),
                Some(&admin),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cancel_is_idempotent_and_frees_the_slot() {
        let f = fixture().await;
        let token = f.staff();
        let uri = format!("/api/v1/businesses/{}/reservations", f.business_id);
        let slot = booking(&f.table_id, "2030-06-01T19:00:00Z", "2030-06-01T21:00:00Z");

        let (_, created) = f.send("POST", &uri, Some(&token), Some(slot.clone())).await;
        let id = created["data"]["id"].as_str().unwrap().to_string();
        let cancel_uri = format!("{}/{}/cancel", uri, id);

        let (status, first) = f.send("POST", &cancel_uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["data"]["already_cancelled"], false);
        assert_eq!(first["data"]["reservation"]["status"], "Cancelled");

        let (status, second) = f.send("POST", &cancel_uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["data"]["already_cancelled"], true);

        let (status, _) = f.send("POST", &uri, Some(&token), Some(slot)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn update_keeping_the_same_slot_succeeds() {
        let f = fixture().await;
        let token = f.staff();
        let uri = format!("/api/v1/businesses/{}/reservations", f.business_id);
        let mut slot = booking(&f.table_id, "2030-07-01T13:00:00Z", "2030-07-01T15:00:00Z");

        let (_, created) = f.send("POST", &uri, Some(&token), Some(slot.clone())).await;
        let id = created["data"]["id"].as_str().unwrap().to_string();

        slot["number_of_guests"] = json!(4);
        slot["notes"] = json!("window seat");
        let (status, body) = f
            .send("PUT", &format!("{}/{}", uri, id), Some(&token), Some(slot))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["number_of_guests"], 4);
    }

    #[tokio::test]
    async fn deleted_reservation_disappears() {
        let f = fixture().await;
        let token = f.staff();
        let uri = format!("/api/v1/businesses/{}/reservations", f.business_id);
        let (_, created) = f
            .send(
                "POST",
                &uri,
                Some(&token),
                Some(booking(&f.table_id, "2030-08-01T10:00:00Z", "2030-08-01T11:00:00Z")),
            )
            .await;
        let item = format!("{}/{}", uri, created["data"]["id"].as_str().unwrap());

        let (status, _) = f.send("DELETE", &item, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = f.send("GET", &item, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, list) = f.send("GET", &uri, Some(&token), None).await;
        assert_eq!(list["data"]["total"], 0);
    }

    #[tokio::test]
    async fn availability_reports_conflicts() {
        let f = fixture().await;
        let token = f.staff();
        f.send(
            "POST",
            &format!("/api/v1/businesses/{}/reservations", f.business_id),
            Some(&token),
            Some(booking(&f.table_id, "2030-09-01T20:00:00Z", "2030-09-01T22:00:00Z")),
        )
        .await;

        let base = format!(
            "/api/v1/businesses/{}/resources/{}/availability",
            f.business_id, f.table_id
        );
        let (status, busy) = f
            .send(
                "GET",
                &format!("{}?start_at=2030-09-01T21:00:00Z&end_at=2030-09-01T23:00:00Z", base),
                Some(&token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(busy["data"]["available"], false);
        assert_eq!(busy["data"]["conflicts"].as_array().unwrap().len(), 1);

        let (_, free) = f
            .send(
                "GET",
                &format!("{}?start_at=2030-09-01T22:00:00Z&end_at=2030-09-01T23:00:00Z", base),
                Some(&token),
                None,
            )
            .await;
        assert_eq!(free["data"]["available"], true);
    }

    #[tokio::test]
    async fn staff_cannot_manage_resources() {
        let f = fixture().await;
        let uri = format!("/api/v1/businesses/{}/resources", f.business_id);
        let room = json!({"kind": "Room", "name": "Suite 1", "max_capacity": 2});

        let (status, _) = f.send("POST", &uri, Some(&f.staff()), Some(room.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let owner = f.token(UserRole::Owner, Some(&f.business_id));
        let (status, body) = f.send("POST", &uri, Some(&owner), Some(room)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["kind"], "Room");
    }

    #[tokio::test]
    async fn only_admins_create_businesses() {
        let f = fixture().await;
        let draft = json!({"name": "Hostal Sol", "slug": "hostal-sol"});

        let owner = f.token(UserRole::Owner, Some(&f.business_id));
        let (status, _) = f
            .send("POST", "/api/v1/businesses", Some(&owner), Some(draft.clone()))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let admin = f.token(UserRole::Admin, None);
        let (status, _) = f
            .send("POST", "/api/v1/businesses", Some(&admin), Some(draft.clone()))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = f
            .send("POST", "/api/v1/businesses", Some(&admin), Some(draft))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn register_then_login() {
        let f = fixture().await;
        let admin = f.token(UserRole::Admin, None);
        let (status, _) = f
            .send(
                "POST",
                "/api/v1/auth/register",
                Some(&admin),
                Some(json!({
                    "username": "lola",
                    "email": "lola@casalola.example",
                    "password": "correct-horse",
                    "role": "owner",
                    "business_id": f.business_id,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = f
            .send(
                "POST",
                "/api/v1/auth/login",
                None,
                Some(json!({"username": "lola", "password": "correct-horse"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["data"]["token"].as_str().unwrap().to_string();

        let (status, me) = f.send("GET", "/api/v1/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["data"]["business_id"], f.business_id.as_str());

        let (status, _) = f
            .send(
                "POST",
                "/api/v1/auth/login",
                None,
                Some(json!({"username": "lola", "password": "wrong-horse"})),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn notification_stream_requires_a_token() {
        let f = fixture().await;
        let (status, _) = f.send("GET", "/api/v1/notifications/ws", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn openapi_lists_tenant_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc
            .paths
            .paths
            .contains_key("/api/v1/businesses/{business_id}/reservations/{reservation_id}/cancel"));
    }
}
