use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, OrderRecord, OrderStatus};
use crate::domain::ports::OrderRepository;

// ── Repository ────────────────────────────────────────────────────────────────

pub const FIRST_ORDER_NUMBER: i64 = 1001;

struct OrderTable {
    rows: Vec<OrderRecord>,
    next_id: i64,
    next_number: i64,
}

/// Process-local order store. Orders are lost on restart.
pub struct InMemoryOrderRepository {
    table: Mutex<OrderTable>,
}

impl Default for InMemoryOrderRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(OrderTable {
                rows: Vec::new(),
                next_id: 1,
                next_number: FIRST_ORDER_NUMBER,
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, OrderTable>, DomainError> {
        Ok(self.table.lock()?)
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn insert(&self, order: NewOrder) -> Result<OrderRecord, DomainError> {
        let mut table = self.lock()?;

        let record = OrderRecord {
            id: table.next_id,
            order_number: table.next_number,
            tracking_token: Uuid::new_v4().simple().to_string(),
            status: OrderStatus::New,
            order,
            created_at: Utc::now(),
        };
        table.next_id += 1;
        table.next_number += 1;
        table.rows.push(record.clone());

        Ok(record)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<OrderRecord>, DomainError> {
        let table = self.lock()?;
        Ok(table.rows.iter().find(|r| r.id == id).cloned())
    }

    fn find_by_token(&self, token: &str) -> Result<Option<OrderRecord>, DomainError> {
        let table = self.lock()?;
        Ok(table
            .rows
            .iter()
            .find(|r| r.tracking_token == token)
            .cloned())
    }

    fn list_active(&self) -> Result<Vec<OrderRecord>, DomainError> {
        let table = self.lock()?;
        let mut active: Vec<OrderRecord> = table
            .rows
            .iter()
            .filter(|r| !r.status.is_terminal())
            .cloned()
            .collect();
        active.sort_by_key(|r| (r.created_at, r.id));
        Ok(active)
    }

    fn list_since(&self, since: DateTime<Utc>) -> Result<Vec<OrderRecord>, DomainError> {
        let table = self.lock()?;
        let mut recent: Vec<OrderRecord> = table
            .rows
            .iter()
            .filter(|r| r.created_at >= since)
            .cloned()
            .collect();
        recent.sort_by_key(|r| std::cmp::Reverse((r.created_at, r.id)));
        Ok(recent)
    }

    fn update_status(
        &self,
        id: i64,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<OrderRecord>, DomainError> {
        let mut table = self.lock()?;

        let Some(row) = table.rows.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        if row.status != from {
            return Err(DomainError::Conflict(format!(
                "expected '{}' but order {} is '{}'",
                from, id, row.status
            )));
        }
        row.status = to;

        Ok(Some(row.clone()))
    }
}
