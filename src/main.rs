use std::io;

use dotenvy::dotenv;
use food_ordering::application::admin_auth::AdminAuth;
use food_ordering::application::order_service::OrderService;
use food_ordering::build_server;
use food_ordering::config::ServerConfig;
use food_ordering::infrastructure::order_repo::InMemoryOrderRepository;
use food_ordering::infrastructure::restaurant_repo::{default_menu, InMemoryRestaurantRepository};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = ServerConfig::from_env().map_err(io::Error::other)?;

    let settings = config.initial_settings.clone();
    let restaurant = match &config.menu_file {
        Some(path) => InMemoryRestaurantRepository::from_menu_file(path, settings)
            .map_err(io::Error::other)?,
        None => InMemoryRestaurantRepository::new(default_menu(), settings),
    };
    let service = OrderService::new(InMemoryOrderRepository::new(), restaurant);
    let auth = AdminAuth::new(config.admin_password.clone());

    log::info!("Starting server at http://{}:{}", config.host, config.port);
    log::info!("API docs at http://{}:{}/swagger-ui/", config.host, config.port);

    build_server(service, auth, &config.host, config.port)?.await
}
