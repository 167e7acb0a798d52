pub mod application;
pub mod config;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;

use actix_web::{middleware::Logger, web, App, HttpServer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::admin_auth::AdminAuth;
use application::order_service::OrderService;
use handlers::swagger::ApiDoc;
use infrastructure::order_repo::InMemoryOrderRepository;
use infrastructure::restaurant_repo::InMemoryRestaurantRepository;

/// Order service as wired into the HTTP server.
pub type SharedOrderService = OrderService<InMemoryOrderRepository, InMemoryRestaurantRepository>;

/// Registers every route. `/orders/track/{token}` must precede
/// `/orders/{id}` so tokens are never parsed as ids.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(handlers::json_config())
        .service(
            web::scope("/orders")
                .route("", web::post().to(handlers::orders::create_order))
                .route("", web::get().to(handlers::orders::list_active_orders))
                .route("/track/{token}", web::get().to(handlers::orders::track_order))
                .route("/{id}", web::get().to(handlers::orders::get_order))
                .route("/{id}/advance", web::post().to(handlers::orders::advance_order)),
        )
        .route("/menu", web::get().to(handlers::menu::get_menu))
        .route("/settings", web::get().to(handlers::menu::get_settings))
        .service(
            web::scope("/admin")
                .route("/auth", web::post().to(handlers::admin::login))
                .route("/logout", web::post().to(handlers::admin::logout))
                .route("/settings", web::post().to(handlers::admin::update_settings))
                .route("/orders/today", web::get().to(handlers::admin::todays_orders))
                .route(
                    "/orders/{id}/advance",
                    web::post().to(handlers::admin::advance_order),
                ),
        );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    service: SharedOrderService,
    auth: AdminAuth,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let service = web::Data::new(service);
    let auth = web::Data::new(auth);
    let openapi = ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .app_data(auth.clone())
            .wrap(Logger::default())
            .configure(configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
