pub mod admin;
pub mod menu;
pub mod orders;
pub mod swagger;

use actix_web::web;

use crate::errors::AppError;

/// Malformed JSON bodies are answered with a 400 `{error}` body like any other
/// validation failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid request body: {err}")).into()
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use actix_web::web;

    use crate::application::admin_auth::AdminAuth;
    use crate::application::order_service::OrderService;
    use crate::domain::order::RestaurantSettings;
    use crate::infrastructure::order_repo::InMemoryOrderRepository;
    use crate::infrastructure::restaurant_repo::{default_menu, InMemoryRestaurantRepository};
    use crate::SharedOrderService;

    pub const ADMIN_PASSWORD: &str = "letmein";

    pub fn state(
        accepting_orders: bool,
    ) -> (web::Data<SharedOrderService>, web::Data<AdminAuth>) {
        let service = OrderService::new(
            InMemoryOrderRepository::new(),
            InMemoryRestaurantRepository::new(
                default_menu(),
                RestaurantSettings {
                    accepting_orders,
                    prep_time_minutes: 20,
                },
            ),
        );
        (
            web::Data::new(service),
            web::Data::new(AdminAuth::new(ADMIN_PASSWORD)),
        )
    }

    pub fn order_body(unit: &str) -> serde_json::Value {
        serde_json::json!({
            "unit_number": unit,
            "order_type": "delivery",
            "payment_method": "cash",
            "cutlery": true,
            "items": [
                { "id": 1, "name": "Chicken Adobo", "price": "120.00", "quantity": 2, "notes": "extra rice" },
                { "id": 5, "name": "Iced Tea", "price": "40.00", "quantity": 1 }
            ],
            "total": "280.00"
        })
    }
}
