//! Authentication service routes

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    AppState,
    jwt::now_seconds,
    models::{GoogleLoginRequest, LoginRequest, LoginResponse, RegisterRequest, User},
    oauth::GoogleAuthError,
    repositories::user::verify_password,
    validation::validate_registration,
};

/// Custom error type for authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("Too many login attempts")]
    TooManyRequests,

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(&'static str),

    #[error("Internal server error")]
    InternalServerError,
}

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AuthError::BadRequest(rejection.body_text())
    }
}

impl From<GoogleAuthError> for AuthError {
    fn from(err: GoogleAuthError) -> Self {
        match err {
            GoogleAuthError::NotConfigured => {
                AuthError::ServiceUnavailable("Google sign-in is not configured")
            }
            GoogleAuthError::Rejected(reason) => {
                warn!("Rejected Google credential: {}", reason);
                AuthError::Unauthorized("Invalid Google credential")
            }
            GoogleAuthError::Upstream(reason) => {
                error!("Google request failed: {}", reason);
                AuthError::InternalServerError
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AuthError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AuthError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.to_string()),
            AuthError::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many login attempts, try again later".to_string(),
            ),
            AuthError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, msg.to_string())
            }
            AuthError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .is_some_and(|e| e.is_unique_violation())
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/users/register", post(register))
        .route("/api/users/login", post(login))
        .route("/api/users/auth/google", post(google_login))
        .route("/api/users/logout", post(logout))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let healthy = common::database::health_check(state.user_repository.pool())
        .await
        .unwrap_or(false);

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if healthy { "ok" } else { "unavailable" },
            "service": "auth-service"
        })),
    )
}

fn login_response(state: &AppState, user: &User) -> Result<Json<LoginResponse>, AuthError> {
    let token = state.jwt_service.generate_access_token(user).map_err(|e| {
        error!("Failed to generate access token: {}", e);
        AuthError::InternalServerError
    })?;

    Ok(Json(LoginResponse {
        message: "Login successful",
        token,
        userid: user.id,
        expires_in: state.jwt_service.access_token_expiry(),
    }))
}

/// User registration endpoint
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(payload) = payload?;
    validate_registration(&payload).map_err(AuthError::BadRequest)?;

    info!("Registration attempt for user: {}", payload.username);

    let taken = state
        .user_repository
        .username_or_email_taken(&payload.username, &payload.email)
        .await
        .map_err(|e| {
            error!("Failed to check existing users: {}", e);
            AuthError::InternalServerError
        })?;
    if taken {
        return Err(AuthError::BadRequest(
            "Username or email already exists".to_string(),
        ));
    }

    let user = state
        .user_repository
        .create(&payload)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return AuthError::BadRequest("Username or email already exists".to_string());
            }
            error!("Failed to create user: {}", e);
            AuthError::InternalServerError
        })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "userid": user.id,
        })),
    ))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(payload) = payload?;
    let invalid = || AuthError::BadRequest("Invalid email or password".to_string());

    if !state.rate_limiter.check(&payload.email).await {
        return Err(AuthError::TooManyRequests);
    }

    let user = state
        .user_repository
        .find_by_email(&payload.email)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            AuthError::InternalServerError
        })?
        .ok_or_else(invalid)?;

    let matches = verify_password(&user, &payload.password).map_err(|e| {
        error!("Failed to verify password for user {}: {}", user.id, e);
        AuthError::InternalServerError
    })?;
    if !matches {
        return Err(invalid());
    }

    state.rate_limiter.reset(&payload.email).await;
    info!("User {} logged in", user.id);

    login_response(&state, &user)
}

/// Google sign-in endpoint
pub async fn google_login(
    State(state): State<AppState>,
    payload: Result<Json<GoogleLoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(payload) = payload?;

    let profile = match (payload.token, payload.code, payload.code_verifier) {
        (Some(id_token), _, _) => state.google.verify_id_token(&id_token).await?,
        (None, Some(code), Some(code_verifier)) => {
            state
                .google
                .exchange_code(code, code_verifier, payload.redirect_uri)
                .await?
        }
        _ => {
            return Err(AuthError::BadRequest(
                "A Google ID token, or an authorization code with its code verifier, is required"
                    .to_string(),
            ));
        }
    };

    let user = state
        .user_repository
        .find_or_create_google_user(&profile)
        .await
        .map_err(|e| {
            error!("Failed to resolve Google user: {}", e);
            AuthError::InternalServerError
        })?;

    info!("User {} signed in with Google", user.id);
    login_response(&state, &user)
}

/// Logout endpoint: revokes the presented access token
pub async fn logout(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<impl IntoResponse, AuthError> {
    let TypedHeader(Authorization(bearer)) =
        bearer.ok_or(AuthError::Unauthorized("Unauthorized"))?;

    let claims = state
        .jwt_service
        .validate_token(bearer.token())
        .map_err(|e| {
            warn!("Logout with invalid token: {}", e);
            AuthError::Unauthorized("Unauthorized")
        })?;

    let now = now_seconds().map_err(|e| {
        error!("{}", e);
        AuthError::InternalServerError
    })?;

    state
        .revocations
        .revoke(&claims.jti, claims.exp.saturating_sub(now))
        .await
        .map_err(|e| {
            error!("Failed to revoke token: {}", e);
            AuthError::InternalServerError
        })?;

    info!("User {} logged out", claims.sub);

    Ok(Json(json!({"message": "Logged out successfully"})))
}
