//! Handlers for the `/auth` resource (register, login, refresh, logout, OAuth).

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use gigboard_core::error::CoreError;
use gigboard_core::profile::UserProfile;
use gigboard_core::roles::Role;
use gigboard_db::models::session::{NewSession, SessionOrigin};
use gigboard_db::models::user::{CreateUser, User, UserResponse};
use gigboard_db::repositories::{SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::{hash_password, validate_password_length, verify_password};
use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ValidJson};
use crate::middleware::auth::AuthUser;
use crate::oauth::yandex::{OAuthError, OAuthIdentity, PROVIDER};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    pub password: String,
    #[validate(length(min = 2, max = 50, message = "must be 2-50 characters"))]
    pub full_name: String,
    #[serde(default)]
    pub role: Role,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Request body for `POST /auth/oauth/yandex`.
#[derive(Debug, Deserialize, Validate)]
pub struct OAuthCodeRequest {
    #[validate(length(min = 1, max = 512, message = "authorization code is required"))]
    pub code: String,
}

/// Successful authentication response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

/// `GET /auth/me` payload.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidJson(input): ValidJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    validate_password_length(&input.password)?;
    let email = normalize_email(&input.email);

    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "A user with this email already exists".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email,
            password_hash: Some(password_hash),
            full_name: input.full_name.trim().to_string(),
            role: input.role,
            profile: UserProfile::default(),
            oauth_provider: None,
            oauth_subject: None,
        },
    )
    .await?;
    tracing::info!(user_id = user.id, role = %input.role, "User registered");

    let response = create_auth_response(&state, user, client_origin(&headers)).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(input): ApiJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid email or password".into()));

    let user = UserRepo::find_by_email(&state.pool, &normalize_email(&input.email))
        .await?
        .ok_or_else(invalid)?;

    // OAuth-only accounts have no password to check against.
    let Some(password_hash) = user.password_hash.as_deref() else {
        return Err(invalid());
    };
    let password_valid = verify_password(&input.password, password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(invalid());
    }

    ensure_active(&user)?;
    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(
        create_auth_response(&state, user, client_origin(&headers)).await?,
    ))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for new access + refresh tokens. The old
/// session is revoked and linked to the new one.
///
/// Presenting a token that was already exchanged revokes every session of
/// its owner: one of the two holders is not the user.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(input): ApiJson<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let invalid =
        || AppError::Core(CoreError::Unauthorized("Invalid or expired refresh token".into()));

    let token_hash = hash_refresh_token(&input.refresh_token);
    let session = SessionRepo::find_by_token_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(invalid)?;

    if session.was_rotated() {
        let revoked = SessionRepo::revoke_all_for_user(&state.pool, session.user_id).await?;
        tracing::warn!(
            user_id = session.user_id,
            session_id = session.id,
            revoked,
            "Rotated refresh token replayed, all sessions revoked"
        );
        return Err(invalid());
    }
    if !session.is_live(Utc::now()) {
        return Err(invalid());
    }

    let origin = client_origin(&headers);
    if session.origin_differs(&origin) {
        tracing::warn!(
            user_id = session.user_id,
            session_id = session.id,
            stored_agent = session.user_agent.as_deref().unwrap_or(""),
            stored_ip = session.ip_address.as_deref().unwrap_or(""),
            "Refresh from a different client than the session was opened on"
        );
    }

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;
    ensure_active(&user)?;

    let issued = issue_tokens(&state, &user, origin)?;
    // A concurrent refresh with the same token got there first.
    SessionRepo::rotate(&state.pool, session.id, &issued.session)
        .await?
        .ok_or_else(invalid)?;

    Ok(Json(issued.into_response(&state, user)?))
}

/// POST /api/v1/auth/logout
///
/// Revoke all sessions for the authenticated user. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    tracing::info!(user_id = auth_user.user_id, revoked, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn me(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<Json<MeResponse>> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth_user.user_id,
        }))?;
    Ok(Json(MeResponse {
        user: user.try_into()?,
    }))
}

/// POST /api/v1/auth/oauth/yandex
///
/// Sign in with a Yandex authorization code. Links to an existing account by
/// provider identity or email, otherwise creates a passwordless freelancer.
pub async fn oauth_yandex(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidJson(input): ValidJson<OAuthCodeRequest>,
) -> AppResult<Json<AuthResponse>> {
    let identity = state
        .yandex
        .authenticate(input.code.trim())
        .await
        .map_err(|e| match e {
            OAuthError::Disabled => AppError::BadRequest(OAuthError::Disabled.to_string()),
            other => {
                tracing::warn!(error = %other, "Yandex OAuth failed");
                AppError::Core(CoreError::Unauthorized(
                    "OAuth authentication failed".into(),
                ))
            }
        })?;

    let user = upsert_oauth_user(&state, &identity).await?;
    ensure_active(&user)?;
    tracing::info!(user_id = user.id, provider = PROVIDER, "User signed in via OAuth");

    Ok(Json(
        create_auth_response(&state, user, client_origin(&headers)).await?,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Client identity for a new session: `User-Agent`, and the first
/// `X-Forwarded-For` hop or `X-Real-IP` set by the reverse proxy.
fn client_origin(headers: &HeaderMap) -> SessionOrigin {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let ip = header("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .or_else(|| header("x-real-ip"));
    SessionOrigin::new(header("user-agent"), ip)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn ensure_active(user: &User) -> AppResult<()> {
    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }
    Ok(())
}

/// Find the account for an OAuth identity, refreshing its name and avatar,
/// or create a new freelancer account without a password.
async fn upsert_oauth_user(state: &AppState, identity: &OAuthIdentity) -> AppResult<User> {
    let email = normalize_email(&identity.email);

    let existing = match UserRepo::find_by_oauth_identity(&state.pool, PROVIDER, &identity.subject)
        .await?
    {
        Some(user) => Some(user),
        None => UserRepo::find_by_email(&state.pool, &email).await?,
    };

    if let Some(user) = existing {
        let mut profile = user.profile()?;
        if let Some(avatar) = &identity.avatar {
            profile.avatar = avatar.clone();
        }
        return UserRepo::link_oauth_identity(
            &state.pool,
            user.id,
            PROVIDER,
            &identity.subject,
            &identity.full_name,
            &profile.to_json(),
        )
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user.id,
        }));
    }

    let profile = UserProfile {
        avatar: identity.avatar.clone().unwrap_or_default(),
        ..Default::default()
    };
    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email,
            password_hash: None,
            full_name: identity.full_name.clone(),
            role: Role::Freelancer,
            profile,
            oauth_provider: Some(PROVIDER.to_string()),
            oauth_subject: Some(identity.subject.clone()),
        },
    )
    .await?;
    tracing::info!(user_id = user.id, provider = PROVIDER, "User created from OAuth identity");
    Ok(user)
}

/// Tokens minted for a user whose session row is not written yet.
struct IssuedTokens {
    access_token: String,
    refresh_token: String,
    session: NewSession,
}

impl IssuedTokens {
    fn into_response(self, state: &AppState, user: User) -> AppResult<AuthResponse> {
        Ok(AuthResponse {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_in: state.config.jwt.access_token_expiry_mins * 60,
            user: user.try_into()?,
        })
    }
}

fn issue_tokens(state: &AppState, user: &User, origin: SessionOrigin) -> AppResult<IssuedTokens> {
    let role = user.role()?;
    let access_token = generate_access_token(user.id, role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_token, token_hash) = generate_refresh_token();
    let expires_at =
        Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days);

    Ok(IssuedTokens {
        access_token,
        refresh_token,
        session: NewSession {
            user_id: user.id,
            token_hash,
            expires_at,
            origin,
        },
    })
}

/// Issue tokens on a new session and build the response.
async fn create_auth_response(
    state: &AppState,
    user: User,
    origin: SessionOrigin,
) -> AppResult<AuthResponse> {
    let issued = issue_tokens(state, &user, origin)?;
    SessionRepo::create(&state.pool, &issued.session).await?;
    issued.into_response(state, user)
}
