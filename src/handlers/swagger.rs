use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::admin::{LoginRequest, LoginResponse};
use super::{admin, menu, orders};
use crate::domain::menu::MenuItem;
use crate::domain::order::{
    Fulfillment, Order, OrderLine, OrderRequest, OrderStatus, PaymentMethod, RestaurantSettings,
    SettingsUpdate,
};
use crate::errors::ErrorBody;

#[derive(OpenApi)]
#[openapi(
    info(title = "Food Ordering API"),
    paths(
        orders::create_order,
        orders::list_active_orders,
        orders::get_order,
        orders::track_order,
        orders::advance_order,
        menu::get_menu,
        menu::get_settings,
        admin::login,
        admin::logout,
        admin::update_settings,
        admin::todays_orders,
        admin::advance_order,
    ),
    components(schemas(
        MenuItem,
        Order,
        OrderLine,
        OrderRequest,
        OrderStatus,
        Fulfillment,
        PaymentMethod,
        RestaurantSettings,
        SettingsUpdate,
        LoginRequest,
        LoginResponse,
        ErrorBody,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "orders", description = "Order placement, tracking and kitchen advance"),
        (name = "menu", description = "Menu and restaurant settings"),
        (name = "admin", description = "Password-protected administration"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}
