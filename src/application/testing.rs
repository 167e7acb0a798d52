//! Port fakes shared by the application tests.

use std::collections::VecDeque;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;

use super::order_service::OrderService;
use crate::domain::errors::{ApiError, DomainError};
use crate::domain::menu::MenuItem;
use crate::domain::order::{
    Fulfillment, Order, OrderLine, OrderRequest, PaymentMethod, ReportedStatus,
    RestaurantSettings,
};
use crate::domain::ports::OrderingApi;
use crate::infrastructure::order_repo::InMemoryOrderRepository;
use crate::infrastructure::restaurant_repo::{default_menu, InMemoryRestaurantRepository};

pub type MemoryService = OrderService<InMemoryOrderRepository, InMemoryRestaurantRepository>;

/// Backend fake running the real order service in memory, with call counters
/// and a switch that makes every call fail at the transport level.
pub struct FakeApi {
    pub service: MemoryService,
    offline: AtomicBool,
    pub settings_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub track_calls: AtomicUsize,
    pub advance_calls: AtomicUsize,
}

impl FakeApi {
    pub fn new(accepting_orders: bool) -> Self {
        Self {
            service: OrderService::new(
                InMemoryOrderRepository::new(),
                InMemoryRestaurantRepository::new(
                    default_menu(),
                    RestaurantSettings {
                        accepting_orders,
                        prep_time_minutes: 20,
                    },
                ),
            ),
            offline: AtomicBool::new(false),
            settings_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            track_calls: AtomicUsize::new(0),
            advance_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn network_calls(&self) -> usize {
        self.settings_calls.load(Ordering::SeqCst)
            + self.create_calls.load(Ordering::SeqCst)
            + self.track_calls.load(Ordering::SeqCst)
            + self.advance_calls.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), ApiError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ApiError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

pub fn to_api_error(e: DomainError) -> ApiError {
    let status = match e {
        DomainError::NotFound => return ApiError::NotFound,
        DomainError::InvalidInput(_) => 400,
        DomainError::Unauthorized => 401,
        DomainError::AlreadyDelivered | DomainError::Conflict(_) => 409,
        DomainError::OrdersPaused => 503,
        DomainError::Internal(_) => 500,
    };
    ApiError::Rejected {
        status,
        message: Some(e.to_string()),
    }
}

#[async_trait]
impl OrderingApi for FakeApi {
    async fn fetch_menu(&self) -> Result<Vec<MenuItem>, ApiError> {
        self.check_online()?;
        self.service.menu().map_err(to_api_error)
    }

    async fn fetch_settings(&self) -> Result<RestaurantSettings, ApiError> {
        self.settings_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        self.service.settings().map_err(to_api_error)
    }

    async fn create_order(&self, request: &OrderRequest) -> Result<Order, ApiError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        self.service
            .place_order(request.clone())
            .map_err(to_api_error)
    }

    async fn track_order(&self, token: &str) -> Result<Order, ApiError> {
        self.track_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        self.service
            .track_order(token)
            .map_err(to_api_error)?
            .ok_or(ApiError::NotFound)
    }

    async fn get_order(&self, id: i64) -> Result<Order, ApiError> {
        self.check_online()?;
        self.service
            .get_order(id)
            .map_err(to_api_error)?
            .ok_or(ApiError::NotFound)
    }

    async fn list_active_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.check_online()?;
        self.service.list_active_orders().map_err(to_api_error)
    }

    async fn advance_order(&self, id: i64) -> Result<Order, ApiError> {
        self.advance_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        self.service.advance_order(id).map_err(to_api_error)
    }
}

/// Answers `track_order` from a fixed script; every other call fails.
pub struct ScriptedApi {
    responses: Mutex<VecDeque<Result<Order, ApiError>>>,
    pub track_calls: AtomicUsize,
}

impl ScriptedApi {
    pub fn new(responses: Vec<Result<Order, ApiError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            track_calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.track_calls.load(Ordering::SeqCst)
    }
}

fn unused() -> ApiError {
    ApiError::Transport("not scripted".to_string())
}

#[async_trait]
impl OrderingApi for ScriptedApi {
    async fn fetch_menu(&self) -> Result<Vec<MenuItem>, ApiError> {
        Err(unused())
    }

    async fn fetch_settings(&self) -> Result<RestaurantSettings, ApiError> {
        Err(unused())
    }

    async fn create_order(&self, _request: &OrderRequest) -> Result<Order, ApiError> {
        Err(unused())
    }

    async fn track_order(&self, _token: &str) -> Result<Order, ApiError> {
        self.track_calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock().unwrap_or_else(|e| e.into_inner());
        responses.pop_front().unwrap_or_else(|| Err(unused()))
    }

    async fn get_order(&self, _id: i64) -> Result<Order, ApiError> {
        Err(unused())
    }

    async fn list_active_orders(&self) -> Result<Vec<Order>, ApiError> {
        Err(unused())
    }

    async fn advance_order(&self, _id: i64) -> Result<Order, ApiError> {
        Err(unused())
    }
}

pub fn sample_order(status: impl Into<ReportedStatus>) -> Order {
    let line = OrderLine {
        id: 1,
        name: "Chicken Adobo".to_string(),
        price: BigDecimal::from_str("120.00").expect("valid decimal"),
        quantity: 1,
        notes: String::new(),
    };
    Order {
        id: 1,
        order_number: 1001,
        tracking_token: "token-1".to_string(),
        status: status.into(),
        unit_number: "12A".to_string(),
        phone_number: None,
        email: None,
        delivery_notes: None,
        order_type: Fulfillment::Delivery,
        payment_method: PaymentMethod::Cash,
        gcash_ref: None,
        cutlery: false,
        total: line.line_total(),
        items: vec![line],
        created_at: Utc::now(),
    }
}

pub fn unrecognized(value: &str) -> ReportedStatus {
    ReportedStatus::Unrecognized(value.to_string())
}
