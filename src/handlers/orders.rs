use actix_web::{web, HttpResponse};

use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderRequest};
use crate::errors::{AppError, ErrorBody};
use crate::SharedOrderService;

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Places an order from a cart snapshot. The server recomputes the total from
/// the submitted lines and assigns the order number and tracking token.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = OrderRequest,
    responses(
        (status = 201, description = "Order created", body = Order),
        (status = 400, description = "Missing unit number, empty cart or bad payment details", body = ErrorBody),
        (status = 503, description = "Restaurant is not accepting orders", body = ErrorBody),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<SharedOrderService>,
    body: web::Json<OrderRequest>,
) -> Result<HttpResponse, AppError> {
    let order = service.place_order(body.into_inner())?;
    Ok(HttpResponse::Created().json(order))
}

/// GET /orders
///
/// Orders not yet delivered, oldest first.
#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "Active orders", body = Vec<Order>),
    ),
    tag = "orders"
)]
pub async fn list_active_orders(
    service: web::Data<SharedOrderService>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.list_active_orders()?))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = i64, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "Order found", body = Order),
        (status = 404, description = "Order not found", body = ErrorBody),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<SharedOrderService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let order = service
        .get_order(path.into_inner())?
        .ok_or(DomainError::NotFound)?;
    Ok(HttpResponse::Ok().json(order))
}

/// GET /orders/track/{token}
///
/// Unauthenticated lookup by tracking token, used by the customer's status
/// polling.
#[utoipa::path(
    get,
    path = "/orders/track/{token}",
    params(
        ("token" = String, Path, description = "Tracking token returned at creation"),
    ),
    responses(
        (status = 200, description = "Order found", body = Order),
        (status = 404, description = "Unknown or expired token", body = ErrorBody),
    ),
    tag = "orders"
)]
pub async fn track_order(
    service: web::Data<SharedOrderService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let order = service
        .track_order(&path.into_inner())?
        .ok_or(DomainError::NotFound)?;
    Ok(HttpResponse::Ok().json(order))
}

/// POST /orders/{id}/advance
///
/// Moves the order to the next status. Delivered orders answer 409.
#[utoipa::path(
    post,
    path = "/orders/{id}/advance",
    params(
        ("id" = i64, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "Order advanced", body = Order),
        (status = 404, description = "Order not found", body = ErrorBody),
        (status = 409, description = "Order already delivered", body = ErrorBody),
    ),
    tag = "orders"
)]
pub async fn advance_order(
    service: web::Data<SharedOrderService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let order = service.advance_order(path.into_inner())?;
    Ok(HttpResponse::Ok().json(order))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::Value;

    use super::*;
    use crate::configure;
    use crate::handlers::test_support::{order_body, state};

    macro_rules! app {
        ($accepting:expr) => {{
            let (service, auth) = state($accepting);
            test::init_service(
                App::new()
                    .app_data(service)
                    .app_data(auth)
                    .configure(configure),
            )
            .await
        }};
    }

    // ── POST /orders ─────────────────────────────────────────────────────────

    #[actix_web::test]
    async fn create_order_returns_201_with_token() {
        let app = app!(true);

        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(order_body(" 12a "))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let order: Order = test::read_body_json(resp).await;
        assert_eq!(order.order_number, 1001);
        assert_eq!(order.unit_number, "12A");
        assert!(!order.tracking_token.is_empty());
        assert_eq!(order.items[0].notes, "extra rice");
    }

    #[actix_web::test]
    async fn create_order_while_paused_is_503() {
        let app = app!(false);

        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(order_body("12A"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "The restaurant is not accepting orders right now");
    }

    #[actix_web::test]
    async fn create_order_without_unit_is_400() {
        let app = app!(true);

        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(order_body("  "))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Unit number is required");
    }

    #[actix_web::test]
    async fn malformed_json_is_400_with_error_body() {
        let app = app!(true);

        let req = test::TestRequest::post()
            .uri("/orders")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }

    // ── GET /orders, /orders/{id}, /orders/track/{token} ─────────────────────

    #[actix_web::test]
    async fn track_and_get_find_the_same_order() {
        let app = app!(true);
        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(order_body("12A"))
            .to_request();
        let created: Order = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::get()
            .uri(&format!("/orders/track/{}", created.tracking_token))
            .to_request();
        let tracked: Order = test::call_and_read_body_json(&app, req).await;
        assert_eq!(tracked.id, created.id);

        let req = test::TestRequest::get()
            .uri(&format!("/orders/{}", created.id))
            .to_request();
        let fetched: Order = test::call_and_read_body_json(&app, req).await;
        assert_eq!(fetched.tracking_token, created.tracking_token);
    }

    #[actix_web::test]
    async fn unknown_token_and_id_are_404() {
        let app = app!(true);

        for uri in ["/orders/track/nope", "/orders/999"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[actix_web::test]
    async fn list_contains_only_active_orders() {
        let app = app!(true);
        for unit in ["1A", "2B"] {
            let req = test::TestRequest::post()
                .uri("/orders")
                .set_json(order_body(unit))
                .to_request();
            test::call_service(&app, req).await;
        }
        for _ in 0..3 {
            let req = test::TestRequest::post()
                .uri("/orders/1/advance")
                .to_request();
            test::call_service(&app, req).await;
        }

        let req = test::TestRequest::get().uri("/orders").to_request();
        let active: Vec<Order> = test::call_and_read_body_json(&app, req).await;
        let units: Vec<&str> = active.iter().map(|o| o.unit_number.as_str()).collect();
        assert_eq!(units, vec!["2B"]);
    }

    // ── POST /orders/{id}/advance ────────────────────────────────────────────

    #[actix_web::test]
    async fn advance_past_delivered_is_409() {
        let app = app!(true);
        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(order_body("12A"))
            .to_request();
        let created: Order = test::call_and_read_body_json(&app, req).await;
        let uri = format!("/orders/{}/advance", created.id);

        let mut statuses = Vec::new();
        for _ in 0..4 {
            let req = test::TestRequest::post().uri(&uri).to_request();
            statuses.push(test::call_service(&app, req).await.status());
        }

        assert_eq!(
            statuses,
            vec![
                StatusCode::OK,
                StatusCode::OK,
                StatusCode::OK,
                StatusCode::CONFLICT
            ]
        );
    }
}
