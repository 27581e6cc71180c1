//! Administrator HTTP API for the docdesk control plane

pub mod handlers;
pub mod middleware;
pub mod models;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use docdesk_control::ControlPlane;

/// Application state shared across handlers
pub struct AppState {
    pub plane: ControlPlane,
    /// Secret used to sign session tokens at login
    pub jwt_secret: Vec<u8>,
    pub session_ttl: chrono::Duration,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "docdesk admin API",
        version = "0.1.0",
        description = "Member, book, access token and ownership administration"
    ),
    paths(
        handlers::health_check,
        handlers::login,
        handlers::verify_access,
        handlers::dashboard,
        handlers::list_members,
        handlers::create_member,
        handlers::update_member_status,
        handlers::change_member_role,
        handlers::list_books,
        handlers::create_book,
        handlers::get_book,
        handlers::edit_book,
        handlers::set_visibility,
        handlers::book_token,
        handlers::transfer_book,
        handlers::delete_book,
        handlers::delete_comment,
        handlers::get_settings,
        handlers::save_settings,
    ),
    components(
        schemas(
            models::ApiResult,
            models::ErrorResponse,
            models::HealthResponse,
            models::LoginRequest,
            models::PageQuery,
            models::CreateMemberRequest,
            models::MemberStatusRequest,
            models::MemberRoleRequest,
            models::CreateBookRequest,
            models::EditBookRequest,
            models::VisibilityRequest,
            models::TokenRequest,
            models::TransferRequest,
            models::DeleteBookRequest,
            models::DeleteCommentRequest,
            models::SaveSettingsRequest,
            models::AccessQuery,
            models::AccessResponse,
        )
    ),
    tags(
        (name = "auth", description = "Session login"),
        (name = "manager", description = "Administrator dashboard"),
        (name = "members", description = "Member account administration"),
        (name = "books", description = "Book visibility, tokens and ownership"),
        (name = "comments", description = "Comment moderation"),
        (name = "settings", description = "Site options"),
        (name = "reader", description = "Reader access checks"),
        (name = "system", description = "System health and info endpoints")
    )
)]
struct ApiDoc;

/// API server configuration
pub struct ApiServerConfig {
    /// Address to bind the API server
    pub bind_addr: SocketAddr,
    /// Enable CORS for local development origins
    pub enable_cors: bool,
    /// Secret used to sign and validate session tokens
    pub jwt_secret: String,
    /// Validity of session tokens issued at login
    pub session_ttl: chrono::Duration,
}

/// API Server
pub struct ApiServer {
    config: ApiServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(config: ApiServerConfig, plane: ControlPlane) -> Self {
        let state = Arc::new(AppState {
            plane,
            jwt_secret: config.jwt_secret.as_bytes().to_vec(),
            session_ttl: config.session_ttl,
        });
        Self { config, state }
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let api_doc = ApiDoc::openapi();
        let jwt_state = Arc::new(middleware::JwtState::new(self.config.jwt_secret.as_bytes()));

        let public_router = Router::new()
            .route("/api/health", get(handlers::health_check))
            .route("/api/auth/login", post(handlers::login))
            .route("/api/docs/{identify}/access", get(handlers::verify_access))
            .with_state(self.state.clone());

        let protected_router = Router::new()
            .route("/api/manager/dashboard", get(handlers::dashboard))
            .route(
                "/api/manager/users",
                get(handlers::list_members).post(handlers::create_member),
            )
            .route(
                "/api/manager/users/{id}/status",
                post(handlers::update_member_status),
            )
            .route(
                "/api/manager/users/{id}/role",
                post(handlers::change_member_role),
            )
            .route(
                "/api/manager/books",
                get(handlers::list_books).post(handlers::create_book),
            )
            .route(
                "/api/manager/books/{identify}",
                get(handlers::get_book).post(handlers::edit_book),
            )
            .route(
                "/api/manager/books/{identify}/visibility",
                post(handlers::set_visibility),
            )
            .route(
                "/api/manager/books/{identify}/token",
                post(handlers::book_token),
            )
            .route(
                "/api/manager/books/{identify}/transfer",
                post(handlers::transfer_book),
            )
            .route("/api/manager/delete-book", post(handlers::delete_book))
            .route("/api/manager/delete-comment", post(handlers::delete_comment))
            .route(
                "/api/manager/settings",
                get(handlers::get_settings).post(handlers::save_settings),
            )
            .with_state(self.state.clone())
            .layer(axum_middleware::from_fn_with_state(
                jwt_state,
                middleware::require_auth,
            ));

        let router = Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", api_doc))
            .merge(public_router)
            .merge(protected_router);

        let mut router = router.layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            use tower_http::cors::AllowOrigin;

            // Credentialed requests need explicit origins
            let cors = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
                .allow_credentials(true)
                .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
                    let origin = origin.to_str().unwrap_or("");
                    origin.starts_with("http://localhost:")
                        || origin.starts_with("http://127.0.0.1:")
                }));
            router = router.layer(cors);
        }

        router
    }

    /// Start the API server
    pub async fn start(self) -> Result<(), anyhow::Error> {
        let router = self.build_router();

        info!("Starting admin API on {}", self.config.bind_addr);
        info!("Swagger UI: http://{}/swagger-ui", self.config.bind_addr);

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        axum::serve(listener, router)
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        Ok(())
    }
}
