//! Staff views: the kitchen board with its advance action, and the daily
//! summary shown on the admin page.

use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::errors::ApiError;
use crate::domain::order::{Order, OrderStatus};
use crate::domain::ports::OrderingApi;

/// Label of the button that moves an order out of `status`.
pub fn next_action(status: OrderStatus) -> Option<&'static str> {
    match status {
        OrderStatus::New => Some("Start Preparing"),
        OrderStatus::Preparing => Some("Mark Ready"),
        OrderStatus::Ready => Some("Mark Delivered"),
        OrderStatus::Delivered => None,
    }
}

pub fn time_ago(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let mins = (now - created_at).num_minutes();
    if mins < 1 {
        return "Just now".to_string();
    }
    if mins < 60 {
        return format!("{mins}m ago");
    }
    format!("{}h {}m ago", mins / 60, mins % 60)
}

// ── Board ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KitchenBoard {
    new: Vec<Order>,
    preparing: Vec<Order>,
    ready: Vec<Order>,
}

impl KitchenBoard {
    /// Sorts active orders into columns, oldest first. Delivered orders and
    /// statuses this build does not know are left off.
    pub fn from_orders(orders: Vec<Order>) -> Self {
        let mut board = Self::default();
        for order in orders {
            match order.known_status() {
                Some(OrderStatus::New) => board.new.push(order),
                Some(OrderStatus::Preparing) => board.preparing.push(order),
                Some(OrderStatus::Ready) => board.ready.push(order),
                Some(OrderStatus::Delivered) => {}
                None => log::debug!(
                    "Leaving order #{} with status {:?} off the board",
                    order.order_number,
                    order.status
                ),
            }
        }
        for column in [&mut board.new, &mut board.preparing, &mut board.ready] {
            column.sort_by_key(|o| (o.created_at, o.id));
        }
        board
    }

    pub fn column(&self, status: OrderStatus) -> &[Order] {
        match status {
            OrderStatus::New => &self.new,
            OrderStatus::Preparing => &self.preparing,
            OrderStatus::Ready => &self.ready,
            OrderStatus::Delivered => &[],
        }
    }

    pub fn active_count(&self) -> usize {
        self.new.len() + self.preparing.len() + self.ready.len()
    }
}

// ── Dashboard ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdvanceError {
    #[error("{0}")]
    Rejected(String),
    #[error("Order not found")]
    NotFound,
    #[error("Could not reach the server: {0}")]
    Connection(String),
}

impl From<ApiError> for AdvanceError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::NotFound => AdvanceError::NotFound,
            ApiError::Rejected { status, message } => AdvanceError::Rejected(
                message.unwrap_or_else(|| format!("Request rejected with status {status}")),
            ),
            ApiError::Transport(reason) => AdvanceError::Connection(reason),
        }
    }
}

pub struct KitchenDashboard {
    api: Arc<dyn OrderingApi>,
    board: KitchenBoard,
}

impl KitchenDashboard {
    pub fn new(api: Arc<dyn OrderingApi>) -> Self {
        Self {
            api,
            board: KitchenBoard::default(),
        }
    }

    pub fn board(&self) -> &KitchenBoard {
        &self.board
    }

    pub async fn refresh(&mut self) -> Result<&KitchenBoard, ApiError> {
        let orders = self.api.list_active_orders().await?;
        self.board = KitchenBoard::from_orders(orders);
        Ok(&self.board)
    }

    /// Asks the server to advance `id`. The board only changes through the
    /// refresh that follows a confirmed advance.
    pub async fn advance(&mut self, id: i64) -> Result<Order, AdvanceError> {
        let order = self.api.advance_order(id).await.map_err(|e| {
            log::warn!("Advance of order {} failed: {}", id, e);
            AdvanceError::from(e)
        })?;
        if let Err(e) = self.refresh().await {
            log::warn!("Board refresh after advancing order {} failed: {}", id, e);
        }
        Ok(order)
    }
}

// ── Daily stats ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct DailyStats {
    pub total_orders: usize,
    pub revenue: BigDecimal,
    pub active: usize,
    pub delivered: usize,
}

impl DailyStats {
    pub fn from_orders(orders: &[Order]) -> Self {
        let delivered = orders
            .iter()
            .filter(|o| o.known_status() == Some(OrderStatus::Delivered))
            .count();
        DailyStats {
            total_orders: orders.len(),
            revenue: orders
                .iter()
                .fold(BigDecimal::from(0), |sum, o| sum + &o.total),
            active: orders.len() - delivered,
            delivered,
        }
    }
}
