use chrono::{DateTime, Utc};

use crate::domain::errors::DomainError;
use crate::domain::menu::MenuItem;
use crate::domain::order::{
    lines_total, NewOrder, Order, OrderRequest, PaymentMethod, RestaurantSettings, SettingsUpdate,
};
use crate::domain::ports::{OrderRepository, RestaurantRepository};

/// Server-side order lifecycle. The repositories hold the order of record;
/// this layer owns validation, pricing and the status transition rules.
pub struct OrderService<R, S> {
    repo: R,
    restaurant: S,
}

impl<R: OrderRepository, S: RestaurantRepository> OrderService<R, S> {
    pub fn new(repo: R, restaurant: S) -> Self {
        Self { repo, restaurant }
    }

    pub fn place_order(&self, request: OrderRequest) -> Result<Order, DomainError> {
        if !self.restaurant.settings()?.accepting_orders {
            return Err(DomainError::OrdersPaused);
        }

        let unit_number = request.unit_number.trim().to_uppercase();
        if unit_number.is_empty() {
            return Err(DomainError::InvalidInput(
                "Unit number is required".to_string(),
            ));
        }
        if request.items.is_empty() {
            return Err(DomainError::InvalidInput("Cart is empty".to_string()));
        }
        if let Some(line) = request.items.iter().find(|l| l.quantity == 0) {
            return Err(DomainError::InvalidInput(format!(
                "Quantity for '{}' must be at least 1",
                line.name
            )));
        }
        let gcash_ref = non_blank(request.gcash_ref);
        if request.payment_method == PaymentMethod::GCash && gcash_ref.is_none() {
            return Err(DomainError::InvalidInput(
                "GCash reference number is required".to_string(),
            ));
        }

        let total = lines_total(&request.items);
        if total != request.total {
            log::warn!(
                "Order total discrepancy for unit {}: client sent {}, recomputed {}",
                unit_number,
                request.total,
                total
            );
        }

        let record = self.repo.insert(NewOrder {
            unit_number,
            phone_number: non_blank(request.phone_number),
            email: non_blank(request.email),
            delivery_notes: non_blank(request.delivery_notes),
            order_type: request.order_type,
            payment_method: request.payment_method,
            gcash_ref,
            cutlery: request.cutlery,
            items: request.items,
            total,
        })?;

        log::info!(
            "Order #{} placed for unit {} ({} lines)",
            record.order_number,
            record.order.unit_number,
            record.order.items.len()
        );
        Ok(record.into())
    }

    pub fn get_order(&self, id: i64) -> Result<Option<Order>, DomainError> {
        Ok(self.repo.find_by_id(id)?.map(Order::from))
    }

    pub fn track_order(&self, token: &str) -> Result<Option<Order>, DomainError> {
        Ok(self.repo.find_by_token(token)?.map(Order::from))
    }

    pub fn list_active_orders(&self) -> Result<Vec<Order>, DomainError> {
        Ok(self
            .repo
            .list_active()?
            .into_iter()
            .map(Order::from)
            .collect())
    }

    /// Orders created since UTC midnight of `now`, newest first.
    pub fn todays_orders(&self, now: DateTime<Utc>) -> Result<Vec<Order>, DomainError> {
        let midnight = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|t| t.and_utc())
            .unwrap_or(now);
        Ok(self
            .repo
            .list_since(midnight)?
            .into_iter()
            .map(Order::from)
            .collect())
    }

    /// Moves the order one step forward. Delivered orders cannot advance.
    pub fn advance_order(&self, id: i64) -> Result<Order, DomainError> {
        let current = self.repo.find_by_id(id)?.ok_or(DomainError::NotFound)?;
        let next = current
            .status
            .next()
            .ok_or(DomainError::AlreadyDelivered)?;

        let updated = self
            .repo
            .update_status(id, current.status, next)?
            .ok_or(DomainError::NotFound)?;

        log::info!(
            "Order #{} advanced {} -> {}",
            updated.order_number,
            current.status,
            updated.status
        );
        Ok(updated.into())
    }

    pub fn menu(&self) -> Result<Vec<MenuItem>, DomainError> {
        self.restaurant.menu()
    }

    pub fn settings(&self) -> Result<RestaurantSettings, DomainError> {
        self.restaurant.settings()
    }

    pub fn update_settings(
        &self,
        update: &SettingsUpdate,
    ) -> Result<RestaurantSettings, DomainError> {
        let settings = self.restaurant.update_settings(update)?;
        log::info!(
            "Settings updated: accepting_orders={}, prep_time_minutes={}",
            settings.accepting_orders,
            settings.prep_time_minutes
        );
        Ok(settings)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use chrono::TimeZone;

    use super::*;
    use crate::domain::order::{OrderLine, OrderStatus, ReportedStatus};
    use crate::infrastructure::order_repo::InMemoryOrderRepository;
    use crate::infrastructure::restaurant_repo::{default_menu, InMemoryRestaurantRepository};

    type Service = OrderService<InMemoryOrderRepository, InMemoryRestaurantRepository>;

    fn service(accepting: bool) -> Service {
        OrderService::new(
            InMemoryOrderRepository::new(),
            InMemoryRestaurantRepository::new(
                default_menu(),
                RestaurantSettings {
                    accepting_orders: accepting,
                    prep_time_minutes: 20,
                },
            ),
        )
    }

    fn request(unit: &str, total: &str) -> OrderRequest {
        OrderRequest {
            unit_number: unit.to_string(),
            phone_number: Some("  ".to_string()),
            email: None,
            delivery_notes: None,
            order_type: Default::default(),
            payment_method: PaymentMethod::Cash,
            gcash_ref: None,
            cutlery: true,
            items: vec![
                OrderLine {
                    id: 1,
                    name: "Chicken Adobo".to_string(),
                    price: BigDecimal::from_str("8.50").expect("valid decimal"),
                    quantity: 2,
                    notes: "no onions".to_string(),
                },
                OrderLine {
                    id: 5,
                    name: "Iced Tea".to_string(),
                    price: BigDecimal::from_str("3.50").expect("valid decimal"),
                    quantity: 1,
                    notes: String::new(),
                },
            ],
            total: BigDecimal::from_str(total).expect("valid decimal"),
        }
    }

    #[test]
    fn place_order_normalizes_and_starts_new() {
        let svc = service(true);

        let order = svc.place_order(request(" 12a ", "20.50")).expect("place failed");

        assert_eq!(order.unit_number, "12A");
        assert_eq!(order.status, ReportedStatus::Known(OrderStatus::New));
        assert_eq!(order.phone_number, None);
        assert_eq!(order.items[0].notes, "no onions");
        assert!(!order.tracking_token.is_empty());
    }

    #[test]
    fn place_order_rejected_while_paused() {
        let svc = service(false);
        let result = svc.place_order(request("12A", "20.50"));
        assert!(matches!(result, Err(DomainError::OrdersPaused)));
        assert!(svc.list_active_orders().expect("list").is_empty());
    }

    #[test]
    fn place_order_requires_unit_and_items() {
        let svc = service(true);
        assert!(matches!(
            svc.place_order(request("   ", "20.50")),
            Err(DomainError::InvalidInput(_))
        ));

        let mut empty = request("12A", "0");
        empty.items.clear();
        assert!(matches!(
            svc.place_order(empty),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn place_order_requires_wallet_reference() {
        let svc = service(true);
        let mut req = request("12A", "20.50");
        req.payment_method = PaymentMethod::GCash;
        req.gcash_ref = Some(" ".to_string());
        assert!(matches!(
            svc.place_order(req.clone()),
            Err(DomainError::InvalidInput(_))
        ));

        req.gcash_ref = Some("REF-123".to_string());
        let order = svc.place_order(req).expect("place failed");
        assert_eq!(order.gcash_ref.as_deref(), Some("REF-123"));
    }

    #[test]
    fn place_order_stores_recomputed_total() {
        let svc = service(true);
        let order = svc.place_order(request("12A", "1.00")).expect("place failed");
        assert_eq!(order.total, BigDecimal::from_str("20.50").expect("valid decimal"));
    }

    #[test]
    fn advance_walks_lifecycle_then_refuses() {
        let svc = service(true);
        let order = svc.place_order(request("12A", "20.50")).expect("place failed");

        let statuses: Vec<_> = (0..3)
            .map(|_| {
                svc.advance_order(order.id)
                    .expect("advance failed")
                    .known_status()
            })
            .collect();
        assert_eq!(
            statuses,
            vec![
                Some(OrderStatus::Preparing),
                Some(OrderStatus::Ready),
                Some(OrderStatus::Delivered)
            ]
        );

        assert!(matches!(
            svc.advance_order(order.id),
            Err(DomainError::AlreadyDelivered)
        ));
        assert!(svc.list_active_orders().expect("list").is_empty());
    }

    #[test]
    fn advance_unknown_order_is_not_found() {
        let svc = service(true);
        assert!(matches!(svc.advance_order(77), Err(DomainError::NotFound)));
    }

    #[test]
    fn track_order_by_token() {
        let svc = service(true);
        let order = svc.place_order(request("12A", "20.50")).expect("place failed");

        let tracked = svc
            .track_order(&order.tracking_token)
            .expect("track failed")
            .expect("order should exist");
        assert_eq!(tracked.id, order.id);
        assert!(svc.track_order("bogus").expect("track failed").is_none());
    }

    #[test]
    fn todays_orders_start_at_utc_midnight() {
        let svc = service(true);
        svc.place_order(request("12A", "20.50")).expect("place failed");

        assert_eq!(svc.todays_orders(Utc::now()).expect("today").len(), 1);
        let later = Utc
            .with_ymd_and_hms(2999, 1, 1, 12, 0, 0)
            .single()
            .expect("valid date");
        assert!(svc.todays_orders(later).expect("today").is_empty());
    }

    #[test]
    fn pausing_via_settings_blocks_new_orders() {
        let svc = service(true);
        svc.update_settings(&SettingsUpdate {
            accepting_orders: Some(false),
            prep_time_minutes: Some(35),
        })
        .expect("update failed");

        assert_eq!(svc.settings().expect("settings").prep_time_minutes, 35);
        assert!(matches!(
            svc.place_order(request("12A", "20.50")),
            Err(DomainError::OrdersPaused)
        ));
    }
}
