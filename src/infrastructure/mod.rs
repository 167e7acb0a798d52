pub mod http_api;
pub mod order_repo;
pub mod restaurant_repo;
pub mod token_store;
