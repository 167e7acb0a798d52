use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::errors::{ApiError, DomainError, TokenStoreError};
use super::menu::MenuItem;
use super::order::{
    NewOrder, Order, OrderRecord, OrderRequest, OrderStatus, RestaurantSettings, SettingsUpdate,
};

/// Storage key under which the customer's tracking token is persisted.
pub const TRACKING_TOKEN_KEY: &str = "zitan_order_token";

// ── Server side ──────────────────────────────────────────────────────────────

pub trait OrderRepository: Send + Sync + 'static {
    /// Stores the order, assigning id, order number, tracking token, status
    /// `new` and creation time.
    fn insert(&self, order: NewOrder) -> Result<OrderRecord, DomainError>;
    fn find_by_id(&self, id: i64) -> Result<Option<OrderRecord>, DomainError>;
    fn find_by_token(&self, token: &str) -> Result<Option<OrderRecord>, DomainError>;
    /// Orders not yet delivered, oldest first.
    fn list_active(&self) -> Result<Vec<OrderRecord>, DomainError>;
    /// Orders created at or after `since`, newest first.
    fn list_since(&self, since: DateTime<Utc>) -> Result<Vec<OrderRecord>, DomainError>;
    /// Moves `id` from `from` to `to`. Fails with `Conflict` when the stored
    /// status is no longer `from`; returns `None` for unknown ids.
    fn update_status(
        &self,
        id: i64,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<OrderRecord>, DomainError>;
}

pub trait RestaurantRepository: Send + Sync + 'static {
    /// Items currently offered to customers.
    fn menu(&self) -> Result<Vec<MenuItem>, DomainError>;
    fn settings(&self) -> Result<RestaurantSettings, DomainError>;
    fn update_settings(&self, update: &SettingsUpdate) -> Result<RestaurantSettings, DomainError>;
}

// ── Client side ──────────────────────────────────────────────────────────────

#[async_trait]
pub trait OrderingApi: Send + Sync {
    async fn fetch_menu(&self) -> Result<Vec<MenuItem>, ApiError>;
    async fn fetch_settings(&self) -> Result<RestaurantSettings, ApiError>;
    async fn create_order(&self, request: &OrderRequest) -> Result<Order, ApiError>;
    async fn track_order(&self, token: &str) -> Result<Order, ApiError>;
    async fn get_order(&self, id: i64) -> Result<Order, ApiError>;
    async fn list_active_orders(&self) -> Result<Vec<Order>, ApiError>;
    async fn advance_order(&self, id: i64) -> Result<Order, ApiError>;
}

/// Durable key/value storage for the tracking token.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, TokenStoreError>;
    fn save(&self, token: &str) -> Result<(), TokenStoreError>;
    fn clear(&self) -> Result<(), TokenStoreError>;
}
