use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::admin_auth::AdminAuth;
use crate::domain::order::{Order, RestaurantSettings, SettingsUpdate};
use crate::errors::{AppError, ErrorBody};
use crate::SharedOrderService;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

fn require_admin(req: &HttpRequest, auth: &AdminAuth) -> Result<(), AppError> {
    match bearer_token(req) {
        Some(token) if auth.verify(token) => Ok(()),
        _ => Err(AppError::Unauthorized),
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /admin/auth
///
/// Exchanges the shared admin password for a bearer token.
#[utoipa::path(
    post,
    path = "/admin/auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid password", body = ErrorBody),
    ),
    tag = "admin"
)]
pub async fn login(
    auth: web::Data<AdminAuth>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let token = auth
        .login(&body.password)
        .map_err(|_| AppError::Unauthorized)?;
    Ok(HttpResponse::Ok().json(LoginResponse { token }))
}

/// POST /admin/logout
///
/// Revokes the bearer token the request was made with.
#[utoipa::path(
    post,
    path = "/admin/logout",
    responses(
        (status = 204, description = "Logged out"),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn logout(
    req: HttpRequest,
    auth: web::Data<AdminAuth>,
) -> Result<HttpResponse, AppError> {
    let token = bearer_token(&req).ok_or(AppError::Unauthorized)?;
    if !auth.logout(token)? {
        return Err(AppError::Unauthorized);
    }
    Ok(HttpResponse::NoContent().finish())
}

/// POST /admin/settings
///
/// Pauses or resumes ordering and changes the prep-time estimate. Absent
/// fields are left unchanged.
#[utoipa::path(
    post,
    path = "/admin/settings",
    request_body = SettingsUpdate,
    responses(
        (status = 200, description = "Updated settings", body = RestaurantSettings),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn update_settings(
    req: HttpRequest,
    auth: web::Data<AdminAuth>,
    service: web::Data<SharedOrderService>,
    body: web::Json<SettingsUpdate>,
) -> Result<HttpResponse, AppError> {
    require_admin(&req, &auth)?;
    Ok(HttpResponse::Ok().json(service.update_settings(&body)?))
}

/// GET /admin/orders/today
///
/// Every order created since UTC midnight, newest first, delivered included.
#[utoipa::path(
    get,
    path = "/admin/orders/today",
    responses(
        (status = 200, description = "Today's orders", body = Vec<Order>),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn todays_orders(
    req: HttpRequest,
    auth: web::Data<AdminAuth>,
    service: web::Data<SharedOrderService>,
) -> Result<HttpResponse, AppError> {
    require_admin(&req, &auth)?;
    Ok(HttpResponse::Ok().json(service.todays_orders(Utc::now())?))
}

/// POST /admin/orders/{id}/advance
#[utoipa::path(
    post,
    path = "/admin/orders/{id}/advance",
    params(
        ("id" = i64, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "Order advanced", body = Order),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
        (status = 404, description = "Order not found", body = ErrorBody),
        (status = 409, description = "Order already delivered", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn advance_order(
    req: HttpRequest,
    auth: web::Data<AdminAuth>,
    service: web::Data<SharedOrderService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    require_admin(&req, &auth)?;
    Ok(HttpResponse::Ok().json(service.advance_order(path.into_inner())?))
}
