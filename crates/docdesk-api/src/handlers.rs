use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use docdesk_auth::{JwtValidator, SessionClaims};
use docdesk_control::{
    validation, BookMetadata, Caller, ControlError, ErrorKind, NewBook, NewMember, ValidationError,
    Visibility,
};
use std::sync::Arc;
use tracing::{debug, error};

use crate::middleware::SessionMember;
use crate::models::*;
use crate::AppState;

pub type ApiError = (StatusCode, Json<ApiResult>);

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::StorageFailure => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::Timeout => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Convert a control-plane failure into the result envelope
pub fn failure(err: ControlError) -> ApiError {
    (
        status_for(err.kind()),
        Json(ApiResult {
            code: err.code(),
            message: err.to_string(),
            data: None,
        }),
    )
}

/// Resolve the session member into a fresh caller snapshot
async fn caller(state: &AppState, session: SessionMember) -> Result<Caller, ApiError> {
    state
        .plane
        .identity
        .resolve_caller(session.member_id)
        .await
        .map_err(|e| match e {
            ControlError::NotFound(_) => (
                StatusCode::UNAUTHORIZED,
                Json(ApiResult {
                    code: e.code(),
                    message: "Session member no longer exists".to_string(),
                    data: None,
                }),
            ),
            other => failure(other),
        })
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Log in with account and password
///
/// Sets the `session_token` cookie and also returns the token in `data` for
/// clients that send it as a Bearer header.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = ApiResult),
        (status = 403, description = "Invalid account or password", body = ApiResult)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let member = state
        .plane
        .identity
        .authenticate(&req.account, &req.password)
        .await
        .map_err(failure)?;

    let claims = SessionClaims::new(member.member_id, state.session_ttl);
    let token = JwtValidator::encode(&state.jwt_secret, &claims).map_err(|e| {
        error!(error = %e, "Failed to sign session token");
        failure(ControlError::Storage {
            operation: "sessions.sign",
        })
    })?;

    let cookie = format!(
        "session_token={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        token,
        state.session_ttl.num_seconds()
    );

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(ApiResult::with_data(&serde_json::json!({
            "member": member,
            "token": token,
        }))),
    ))
}

/// Check a reader access token
#[utoipa::path(
    get,
    path = "/api/docs/{identify}/access",
    params(
        ("identify" = String, Path, description = "Book identifier"),
        AccessQuery
    ),
    responses(
        (status = 200, description = "Whether the token opens the book", body = AccessResponse),
        (status = 503, description = "Storage unavailable", body = ApiResult)
    ),
    tag = "reader"
)]
pub async fn verify_access(
    State(state): State<Arc<AppState>>,
    Path(identify): Path<String>,
    Query(query): Query<AccessQuery>,
) -> Result<Json<AccessResponse>, ApiError> {
    let valid = state
        .plane
        .tokens
        .verify(&identify, &query.token)
        .await
        .map_err(failure)?;

    Ok(Json(AccessResponse { valid }))
}

/// Dashboard counters
#[utoipa::path(
    get,
    path = "/api/manager/dashboard",
    responses(
        (status = 200, description = "Member, book and comment counts", body = ApiResult),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Administrator role required", body = ApiResult)
    ),
    tag = "manager"
)]
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionMember>,
) -> Result<Json<ApiResult>, ApiError> {
    let caller = caller(&state, session).await?;
    let summary = state.plane.dashboard.summary(&caller).await.map_err(failure)?;
    Ok(Json(ApiResult::with_data(&summary)))
}

/// List members
#[utoipa::path(
    get,
    path = "/api/manager/users",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of members", body = ApiResult),
        (status = 403, description = "Administrator role required", body = ApiResult)
    ),
    tag = "members"
)]
pub async fn list_members(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionMember>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResult>, ApiError> {
    let caller = caller(&state, session).await?;
    let page = state
        .plane
        .identity
        .list(&caller, query.page.unwrap_or(1))
        .await
        .map_err(failure)?;
    Ok(Json(ApiResult::with_data(&page)))
}

/// Create a member
#[utoipa::path(
    post,
    path = "/api/manager/users",
    request_body = CreateMemberRequest,
    responses(
        (status = 200, description = "Member created", body = ApiResult),
        (status = 400, description = "Invalid input", body = ApiResult),
        (status = 403, description = "Administrator role required", body = ApiResult),
        (status = 409, description = "Account already exists", body = ApiResult)
    ),
    tag = "members"
)]
pub async fn create_member(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionMember>,
    Json(req): Json<CreateMemberRequest>,
) -> Result<Json<ApiResult>, ApiError> {
    let caller = caller(&state, session).await?;
    debug!(account = %req.account, "Creating member");

    let member = state
        .plane
        .identity
        .create_member(
            &caller,
            NewMember {
                account: req.account,
                password: req.password,
                confirm_password: req.confirm_password,
                email: req.email,
                phone: req.phone,
                role: req.role.unwrap_or(2),
                status: req.status.unwrap_or(0),
            },
        )
        .await
        .map_err(failure)?;
    Ok(Json(ApiResult::with_data(&member)))
}

/// Enable or disable a member
#[utoipa::path(
    post,
    path = "/api/manager/users/{id}/status",
    params(("id" = i32, Path, description = "Member ID")),
    request_body = MemberStatusRequest,
    responses(
        (status = 200, description = "Member updated", body = ApiResult),
        (status = 404, description = "Member not found", body = ApiResult)
    ),
    tag = "members"
)]
pub async fn update_member_status(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionMember>,
    Path(id): Path<i32>,
    Json(req): Json<MemberStatusRequest>,
) -> Result<Json<ApiResult>, ApiError> {
    let caller = caller(&state, session).await?;
    let member = state
        .plane
        .identity
        .set_status(&caller, id, req.status)
        .await
        .map_err(failure)?;
    Ok(Json(ApiResult::with_data(&member)))
}

/// Change a member's role
#[utoipa::path(
    post,
    path = "/api/manager/users/{id}/role",
    params(("id" = i32, Path, description = "Member ID")),
    request_body = MemberRoleRequest,
    responses(
        (status = 200, description = "Member updated", body = ApiResult),
        (status = 400, description = "Role is not assignable", body = ApiResult),
        (status = 404, description = "Member not found", body = ApiResult)
    ),
    tag = "members"
)]
pub async fn change_member_role(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionMember>,
    Path(id): Path<i32>,
    Json(req): Json<MemberRoleRequest>,
) -> Result<Json<ApiResult>, ApiError> {
    let caller = caller(&state, session).await?;
    let member = state
        .plane
        .identity
        .set_role(&caller, id, req.role)
        .await
        .map_err(failure)?;
    Ok(Json(ApiResult::with_data(&member)))
}

/// List books
#[utoipa::path(
    get,
    path = "/api/manager/books",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of books", body = ApiResult),
        (status = 403, description = "Administrator role required", body = ApiResult)
    ),
    tag = "books"
)]
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionMember>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResult>, ApiError> {
    let caller = caller(&state, session).await?;
    let page = state
        .plane
        .registry
        .list(&caller, query.page.unwrap_or(1))
        .await
        .map_err(failure)?;
    Ok(Json(ApiResult::with_data(&page)))
}

/// Create a book owned by the caller
#[utoipa::path(
    post,
    path = "/api/manager/books",
    request_body = CreateBookRequest,
    responses(
        (status = 200, description = "Book created", body = ApiResult),
        (status = 409, description = "Identifier already exists", body = ApiResult)
    ),
    tag = "books"
)]
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionMember>,
    Json(req): Json<CreateBookRequest>,
) -> Result<Json<ApiResult>, ApiError> {
    let caller = caller(&state, session).await?;

    let visibility = match req.status.as_deref() {
        None => Visibility::Public,
        Some(status) => validation::visibility(status)
            .map_err(|e| failure(ControlError::from(e)))?,
    };

    let book = state
        .plane
        .registry
        .create_book(
            &caller,
            NewBook {
                book_name: req.book_name,
                identify: req.identify,
                description: req.description,
                visibility,
            },
        )
        .await
        .map_err(failure)?;
    Ok(Json(ApiResult::with_data(&book)))
}

/// Book edit view, including the reader URL of an active token
#[utoipa::path(
    get,
    path = "/api/manager/books/{identify}",
    params(("identify" = String, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "Book", body = ApiResult),
        (status = 404, description = "Book not found", body = ApiResult)
    ),
    tag = "books"
)]
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionMember>,
    Path(identify): Path<String>,
) -> Result<Json<ApiResult>, ApiError> {
    let caller = caller(&state, session).await?;
    let view = state
        .plane
        .registry
        .edit_view(&caller, &identify)
        .await
        .map_err(failure)?;
    Ok(Json(ApiResult::with_data(&view)))
}

/// Edit book metadata
#[utoipa::path(
    post,
    path = "/api/manager/books/{identify}",
    params(("identify" = String, Path, description = "Book identifier")),
    request_body = EditBookRequest,
    responses(
        (status = 200, description = "Book updated", body = ApiResult),
        (status = 400, description = "Invalid input", body = ApiResult),
        (status = 404, description = "Book not found", body = ApiResult)
    ),
    tag = "books"
)]
pub async fn edit_book(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionMember>,
    Path(identify): Path<String>,
    Json(req): Json<EditBookRequest>,
) -> Result<Json<ApiResult>, ApiError> {
    let caller = caller(&state, session).await?;
    let book = state
        .plane
        .registry
        .update_metadata(
            &caller,
            &identify,
            BookMetadata {
                book_name: req.book_name,
                description: req.description,
                comment_status: req.comment_status,
                labels: req.label,
                order_index: req.order_index,
            },
        )
        .await
        .map_err(failure)?;
    Ok(Json(ApiResult::with_data(&book)))
}

/// Make a book public or private
#[utoipa::path(
    post,
    path = "/api/manager/books/{identify}/visibility",
    params(("identify" = String, Path, description = "Book identifier")),
    request_body = VisibilityRequest,
    responses(
        (status = 200, description = "Visibility changed", body = ApiResult),
        (status = 400, description = "Unknown visibility", body = ApiResult),
        (status = 404, description = "Book not found", body = ApiResult)
    ),
    tag = "books"
)]
pub async fn set_visibility(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionMember>,
    Path(identify): Path<String>,
    Json(req): Json<VisibilityRequest>,
) -> Result<Json<ApiResult>, ApiError> {
    let caller = caller(&state, session).await?;
    let book = state
        .plane
        .registry
        .set_visibility(&caller, &identify, &req.status)
        .await
        .map_err(failure)?;
    Ok(Json(ApiResult::with_data(&book)))
}

/// Issue or revoke the shared-access token
#[utoipa::path(
    post,
    path = "/api/manager/books/{identify}/token",
    params(("identify" = String, Path, description = "Book identifier")),
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Reader URL for `create`, empty for `delete`", body = ApiResult),
        (status = 400, description = "Unknown action", body = ApiResult),
        (status = 403, description = "Public books cannot have a token", body = ApiResult),
        (status = 404, description = "Book not found", body = ApiResult)
    ),
    tag = "books"
)]
pub async fn book_token(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionMember>,
    Path(identify): Path<String>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<ApiResult>, ApiError> {
    let caller = caller(&state, session).await?;

    match req.action.trim() {
        "create" => {
            let issued = state
                .plane
                .tokens
                .issue(&caller, &identify)
                .await
                .map_err(failure)?;
            Ok(Json(ApiResult::with_data(&issued.access_url)))
        }
        "delete" => {
            state
                .plane
                .tokens
                .revoke(&caller, &identify)
                .await
                .map_err(failure)?;
            Ok(Json(ApiResult::ok()))
        }
        other => Err(failure(
            ValidationError::InvalidTokenAction(other.to_string()).into(),
        )),
    }
}

/// Transfer book ownership to another account
#[utoipa::path(
    post,
    path = "/api/manager/books/{identify}/transfer",
    params(("identify" = String, Path, description = "Book identifier")),
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Founder changed", body = ApiResult),
        (status = 404, description = "Book or recipient not found", body = ApiResult),
        (status = 409, description = "Recipient disabled or already founder", body = ApiResult)
    ),
    tag = "books"
)]
pub async fn transfer_book(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionMember>,
    Path(identify): Path<String>,
    Json(req): Json<TransferRequest>,
) -> Result<Json<ApiResult>, ApiError> {
    let caller = caller(&state, session).await?;
    let founder = state
        .plane
        .transfer
        .transfer(&caller, &identify, &req.account)
        .await
        .map_err(failure)?;
    Ok(Json(ApiResult::with_data(&founder)))
}

/// Delete a book with its memberships and comments
#[utoipa::path(
    post,
    path = "/api/manager/delete-book",
    request_body = DeleteBookRequest,
    responses(
        (status = 200, description = "Book deleted", body = ApiResult),
        (status = 404, description = "Book not found", body = ApiResult)
    ),
    tag = "books"
)]
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionMember>,
    Json(req): Json<DeleteBookRequest>,
) -> Result<Json<ApiResult>, ApiError> {
    let caller = caller(&state, session).await?;
    state
        .plane
        .registry
        .delete(&caller, req.book_id)
        .await
        .map_err(failure)?;
    Ok(Json(ApiResult::ok()))
}

/// Soft-delete a comment
#[utoipa::path(
    post,
    path = "/api/manager/delete-comment",
    request_body = DeleteCommentRequest,
    responses(
        (status = 200, description = "Comment flagged as deleted", body = ApiResult),
        (status = 404, description = "Comment not found", body = ApiResult)
    ),
    tag = "comments"
)]
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionMember>,
    Json(req): Json<DeleteCommentRequest>,
) -> Result<Json<ApiResult>, ApiError> {
    let caller = caller(&state, session).await?;
    let comment = state
        .plane
        .moderation
        .mark_deleted(&caller, req.comment_id)
        .await
        .map_err(failure)?;
    Ok(Json(ApiResult::with_data(&comment)))
}

/// Site settings
#[utoipa::path(
    get,
    path = "/api/manager/settings",
    responses(
        (status = 200, description = "All site options", body = ApiResult),
        (status = 403, description = "Administrator role required", body = ApiResult)
    ),
    tag = "settings"
)]
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionMember>,
) -> Result<Json<ApiResult>, ApiError> {
    let caller = caller(&state, session).await?;
    let options = state.plane.options.list(&caller).await.map_err(failure)?;
    Ok(Json(ApiResult::with_data(&options)))
}

/// Update site settings
#[utoipa::path(
    post,
    path = "/api/manager/settings",
    request_body = SaveSettingsRequest,
    responses(
        (status = 200, description = "Updated site options", body = ApiResult),
        (status = 403, description = "Administrator role required", body = ApiResult)
    ),
    tag = "settings"
)]
pub async fn save_settings(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionMember>,
    Json(req): Json<SaveSettingsRequest>,
) -> Result<Json<ApiResult>, ApiError> {
    let caller = caller(&state, session).await?;
    let options = state
        .plane
        .options
        .save(&caller, req.options)
        .await
        .map_err(failure)?;
    Ok(Json(ApiResult::with_data(&options)))
}
