//! API handlers for Camtrack REST endpoints

/// CRUD + status handlers for one equipment kind, generated with their OpenAPI annotations
macro_rules! equipment_handlers {
    (
        kind: $kind:expr,
        model: $model:ty,
        create: $create:ty => $create_fn:ident,
        update: $update:ty => $update_fn:ident,
        tag: $tag:literal,
        list_path: $list_path:literal,
        item_path: $item_path:literal,
        status_path: $status_path:literal $(,)?
    ) => {
        /// List with filters and pagination
        #[utoipa::path(
            get,
            path = $list_path,
            tag = $tag,
            security(("bearer_auth" = [])),
            params(crate::models::equipment::EquipmentQuery),
            responses(
                (status = 200, description = "Equipment list", body = crate::api::PaginatedResponse<$model>),
                (status = 401, description = "Not authenticated")
            )
        )]
        pub async fn list(
            axum::extract::State(state): axum::extract::State<crate::AppState>,
            crate::api::AuthenticatedUser(user): crate::api::AuthenticatedUser,
            axum::extract::Query(query): axum::extract::Query<crate::models::equipment::EquipmentQuery>,
        ) -> crate::error::AppResult<axum::Json<crate::api::PaginatedResponse<$model>>> {
            user.require_read(crate::models::user::Resource::Equipment)?;

            let (items, total) = state.services.inventory.list::<$model>(&query).await?;
            Ok(axum::Json(crate::api::PaginatedResponse::new(
                items,
                total,
                query.page,
                query.per_page,
            )))
        }

        /// Get by ID
        #[utoipa::path(
            get,
            path = $item_path,
            tag = $tag,
            security(("bearer_auth" = [])),
            params(("id" = i32, Path, description = "Equipment ID")),
            responses(
                (status = 200, description = "Equipment details", body = $model),
                (status = 404, description = "Not found")
            )
        )]
        pub async fn get(
            axum::extract::State(state): axum::extract::State<crate::AppState>,
            crate::api::AuthenticatedUser(user): crate::api::AuthenticatedUser,
            axum::extract::Path(id): axum::extract::Path<i32>,
        ) -> crate::error::AppResult<axum::Json<$model>> {
            user.require_read(crate::models::user::Resource::Equipment)?;

            let row = state.services.inventory.get::<$model>(id).await?;
            Ok(axum::Json(row))
        }

        /// Create
        #[utoipa::path(
            post,
            path = $list_path,
            tag = $tag,
            security(("bearer_auth" = [])),
            request_body = $create,
            responses(
                (status = 201, description = "Created", body = $model),
                (status = 400, description = "Invalid input"),
                (status = 409, description = "Code or IP address already in use")
            )
        )]
        pub async fn create(
            axum::extract::State(state): axum::extract::State<crate::AppState>,
            crate::api::AuthenticatedUser(user): crate::api::AuthenticatedUser,
            axum::Json(data): axum::Json<$create>,
        ) -> crate::error::AppResult<(axum::http::StatusCode, axum::Json<$model>)> {
            user.require_write(crate::models::user::Resource::Equipment)?;
            validator::Validate::validate(&data)?;

            let created = state.services.inventory.$create_fn(data, Some(user.user_id)).await?;
            Ok((axum::http::StatusCode::CREATED, axum::Json(created)))
        }

        /// Partial update
        #[utoipa::path(
            put,
            path = $item_path,
            tag = $tag,
            security(("bearer_auth" = [])),
            params(("id" = i32, Path, description = "Equipment ID")),
            request_body = $update,
            responses(
                (status = 200, description = "Updated", body = $model),
                (status = 404, description = "Not found"),
                (status = 409, description = "Code or IP address already in use")
            )
        )]
        pub async fn update(
            axum::extract::State(state): axum::extract::State<crate::AppState>,
            crate::api::AuthenticatedUser(user): crate::api::AuthenticatedUser,
            axum::extract::Path(id): axum::extract::Path<i32>,
            axum::Json(data): axum::Json<$update>,
        ) -> crate::error::AppResult<axum::Json<$model>> {
            user.require_write(crate::models::user::Resource::Equipment)?;
            validator::Validate::validate(&data)?;

            let updated = state.services.inventory.$update_fn(id, data, Some(user.user_id)).await?;
            Ok(axum::Json(updated))
        }

        /// Soft delete (decommission)
        #[utoipa::path(
            delete,
            path = $item_path,
            tag = $tag,
            security(("bearer_auth" = [])),
            params(("id" = i32, Path, description = "Equipment ID")),
            responses(
                (status = 204, description = "Deleted"),
                (status = 404, description = "Not found")
            )
        )]
        pub async fn delete(
            axum::extract::State(state): axum::extract::State<crate::AppState>,
            crate::api::AuthenticatedUser(user): crate::api::AuthenticatedUser,
            axum::extract::Path(id): axum::extract::Path<i32>,
        ) -> crate::error::AppResult<axum::http::StatusCode> {
            user.require_delete(crate::models::user::Resource::Equipment)?;

            state.services.inventory.delete($kind, id, Some(user.user_id)).await?;
            Ok(axum::http::StatusCode::NO_CONTENT)
        }

        /// Change status with a reason; recorded in the status history
        #[utoipa::path(
            post,
            path = $status_path,
            tag = $tag,
            security(("bearer_auth" = [])),
            params(("id" = i32, Path, description = "Equipment ID")),
            request_body = crate::models::equipment::StatusChange,
            responses(
                (status = 200, description = "Status changed", body = crate::models::equipment::EquipmentSummary),
                (status = 400, description = "Invalid status"),
                (status = 404, description = "Not found")
            )
        )]
        pub async fn change_status(
            axum::extract::State(state): axum::extract::State<crate::AppState>,
            crate::api::AuthenticatedUser(user): crate::api::AuthenticatedUser,
            axum::extract::Path(id): axum::extract::Path<i32>,
            axum::Json(data): axum::Json<crate::models::equipment::StatusChange>,
        ) -> crate::error::AppResult<axum::Json<crate::models::equipment::EquipmentSummary>> {
            user.require_write(crate::models::user::Resource::Equipment)?;
            validator::Validate::validate(&data)?;

            let summary = state
                .services
                .inventory
                .change_status($kind, id, &data, Some(user.user_id))
                .await?;
            Ok(axum::Json(summary))
        }
    };
}

pub mod auth;
pub mod cabinets;
pub mod cameras;
pub mod dashboard;
pub mod equipment;
pub mod failures;
pub mod health;
pub mod imports;
pub mod locations;
pub mod maintenance;
pub mod map;
pub mod network_links;
pub mod nvrs;
pub mod openapi;
pub mod photos;
pub mod power_supplies;
pub mod reports;
pub mod switches;
pub mod technicians;
pub mod ups;
pub mod users;

use axum::{
    async_trait,
    body::Body,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use serde::Serialize;
use tracing::Instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{error::AppError, models::user::SessionUser, AppState};

/// Name of the HttpOnly cookie carrying the session token
pub const SESSION_COOKIE: &str = "camtrack_session";

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Extractor for the user behind a session token (Bearer header or session cookie)
pub struct AuthenticatedUser(pub SessionUser);

/// Session token sent by the client, header first
pub fn session_token(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());
    bearer.or_else(|| {
        CookieJar::from_headers(&parts.headers)
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
    })
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = session_token(parts)
            .ok_or_else(|| AppError::Authentication("Missing session token".to_string()))?;

        let user = state.services.auth.authenticate(&token).await?;
        Ok(AuthenticatedUser(user))
    }
}

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

impl<T> PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub fn new(items: Vec<T>, total: i64, page: Option<i64>, per_page: Option<i64>) -> Self {
        let (page, per_page, _) = crate::repository::page_bounds(page, per_page);
        Self {
            items,
            total,
            page,
            per_page,
        }
    }
}

/// `{"success": true, "message": ...}` for actions without a resource body
#[derive(Serialize, ToSchema)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

impl ActionResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Request ID stored in request extensions
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Take the client's `X-Request-ID` or generate one, run the request in a span
/// carrying it, and echo it back on the response
pub async fn request_id(mut req: Request<Body>, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= 128)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(RequestId(request_id.clone()));
    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    let mut response = next.run(req).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::COOKIE, Request};

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/cameras");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_session_token_from_bearer() {
        let p = parts(&[(AUTHORIZATION.as_str(), "Bearer abc123")]);
        assert_eq!(session_token(&p).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_session_token_from_cookie() {
        let p = parts(&[(COOKIE.as_str(), "theme=dark; camtrack_session=tok_42")]);
        assert_eq!(session_token(&p).as_deref(), Some("tok_42"));
    }

    #[test]
    fn test_bearer_wins_over_cookie() {
        let p = parts(&[
            (AUTHORIZATION.as_str(), "Bearer from-header"),
            (COOKIE.as_str(), "camtrack_session=from-cookie"),
        ]);
        assert_eq!(session_token(&p).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_no_token() {
        assert_eq!(session_token(&parts(&[])), None);
        let p = parts(&[(AUTHORIZATION.as_str(), "Basic dXNlcjpwYXNz")]);
        assert_eq!(session_token(&p), None);
    }

    #[test]
    fn test_pagination_defaults() {
        let page: PaginatedResponse<crate::models::Location> =
            PaginatedResponse::new(Vec::new(), 0, None, None);
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 50);
    }
}
