use actix_web::{web, HttpResponse};

use crate::domain::menu::MenuItem;
use crate::domain::order::RestaurantSettings;
use crate::errors::AppError;
use crate::SharedOrderService;

/// GET /menu
///
/// Items currently available to order.
#[utoipa::path(
    get,
    path = "/menu",
    responses(
        (status = 200, description = "Available menu items", body = Vec<MenuItem>),
    ),
    tag = "menu"
)]
pub async fn get_menu(service: web::Data<SharedOrderService>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.menu()?))
}

/// GET /settings
#[utoipa::path(
    get,
    path = "/settings",
    responses(
        (status = 200, description = "Whether orders are accepted and the prep-time estimate", body = RestaurantSettings),
    ),
    tag = "menu"
)]
pub async fn get_settings(
    service: web::Data<SharedOrderService>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.settings()?))
}
