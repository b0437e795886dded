//! Login, logout and own-account endpoints

use axum::{
    extract::{ConnectInfo, State},
    http::{header::USER_AGENT, HeaderMap},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    models::user::{permissions_for, ChangePassword, Rights, UpdateProfile, User},
};

use super::{ActionResponse, AuthenticatedUser, SESSION_COOKIE};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Username or e-mail address
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    /// Session token, also set as an HttpOnly cookie
    pub token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
    #[schema(value_type = Object)]
    pub permissions: IndexMap<&'static str, Rights>,
}

/// Current account with its effective permissions
#[derive(Serialize, ToSchema)]
pub struct MeResponse {
    pub user: User,
    pub session_expires_at: DateTime<Utc>,
    #[schema(value_type = Object)]
    pub permissions: IndexMap<&'static str, Rights>,
}

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Open a session
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid credentials, locked or disabled account"),
        (status = 429, description = "Too many attempts")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    request.validate()?;

    let ip = connect_info.map(|ConnectInfo(addr)| addr.ip().to_string());
    let user_agent = headers.get(USER_AGENT).and_then(|v| v.to_str().ok());
    let outcome = state
        .services
        .auth
        .login(request.username.trim(), &request.password, ip.as_deref(), user_agent)
        .await?;

    let jar = jar.add(session_cookie(
        outcome.token.clone(),
        state.config.auth.cookie_secure,
    ));

    Ok((
        jar,
        Json(LoginResponse {
            success: true,
            token: outcome.token,
            token_type: "Bearer".to_string(),
            expires_at: outcome.expires_at,
            permissions: permissions_for(outcome.user.role),
            user: outcome.user,
        }),
    ))
}

/// Close the current session
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Logged out", body = ActionResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn logout(
    State(state): State<crate::AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<ActionResponse>)> {
    state.services.auth.logout(&session).await?;

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/").build());
    Ok((jar, Json(ActionResponse::ok("Logged out"))))
}

/// Get current user
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
) -> AppResult<Json<MeResponse>> {
    let user = state.services.users.get_by_id(session.user_id).await?;
    Ok(Json(MeResponse {
        user,
        session_expires_at: session.expires_at,
        permissions: session.permissions(),
    }))
}

/// Change own password
#[utoipa::path(
    post,
    path = "/auth/change-password",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = ChangePassword,
    responses(
        (status = 200, description = "Password changed", body = ActionResponse),
        (status = 400, description = "Passwords do not match or too short"),
        (status = 401, description = "Current password is incorrect")
    )
)]
pub async fn change_password(
    State(state): State<crate::AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    Json(data): Json<ChangePassword>,
) -> AppResult<Json<ActionResponse>> {
    data.validate()?;

    state.services.auth.change_password(&session, &data).await?;
    Ok(Json(ActionResponse::ok("Password changed")))
}

/// Update own profile
#[utoipa::path(
    put,
    path = "/auth/profile",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn update_profile(
    State(state): State<crate::AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    Json(profile): Json<UpdateProfile>,
) -> AppResult<Json<User>> {
    profile.validate()?;

    let user = state.services.users.update_profile(session.user_id, profile).await?;
    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_flags() {
        let cookie = session_cookie("abc".to_string(), true);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn test_login_request_requires_fields() {
        let request = LoginRequest {
            username: String::new(),
            password: "x".to_string(),
        };
        assert!(request.validate().is_err());
    }
}
