use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ── Status ───────────────────────────────────────────────────────────────────

/// Order lifecycle, in transition order. `Delivered` is terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    New,
    Preparing,
    Ready,
    Delivered,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::New,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivered,
    ];

    pub fn next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::New => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::Ready),
            OrderStatus::Ready => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    /// 1-based position in the lifecycle.
    pub fn step(self) -> u8 {
        match self {
            OrderStatus::New => 1,
            OrderStatus::Preparing => 2,
            OrderStatus::Ready => 3,
            OrderStatus::Delivered => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized order status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Status as reported over the wire. Values this build does not know are
/// kept verbatim instead of failing the whole order payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportedStatus {
    Known(OrderStatus),
    Unrecognized(String),
}

impl ReportedStatus {
    pub fn known(&self) -> Option<OrderStatus> {
        match self {
            ReportedStatus::Known(status) => Some(*status),
            ReportedStatus::Unrecognized(_) => None,
        }
    }
}

impl From<OrderStatus> for ReportedStatus {
    fn from(status: OrderStatus) -> Self {
        ReportedStatus::Known(status)
    }
}

// ── Checkout choices ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Fulfillment {
    #[default]
    Delivery,
    Pickup,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cash,
    GCash,
}

/// Optional contact channel. Phone and email are mutually exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Contact {
    #[default]
    None,
    Phone(String),
    Email(String),
}

/// Payment choice; the wallet variant carries the external reference code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Payment {
    #[default]
    Cash,
    Wallet { reference: String },
}

impl Payment {
    pub fn method(&self) -> PaymentMethod {
        match self {
            Payment::Cash => PaymentMethod::Cash,
            Payment::Wallet { .. } => PaymentMethod::GCash,
        }
    }
}

// ── Orders ───────────────────────────────────────────────────────────────────

/// Immutable snapshot of one cart line taken at submission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderLine {
    pub id: i64,
    pub name: String,
    #[schema(value_type = String, example = "8.50")]
    pub price: BigDecimal,
    pub quantity: u32,
    #[serde(default)]
    pub notes: String,
}

impl OrderLine {
    pub fn line_total(&self) -> BigDecimal {
        &self.price * BigDecimal::from(self.quantity)
    }
}

pub fn lines_total(lines: &[OrderLine]) -> BigDecimal {
    lines
        .iter()
        .fold(BigDecimal::from(0), |sum, line| sum + line.line_total())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderRequest {
    #[serde(default)]
    pub unit_number: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub delivery_notes: Option<String>,
    #[serde(default)]
    pub order_type: Fulfillment,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub gcash_ref: Option<String>,
    #[serde(default)]
    pub cutlery: bool,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    /// Client-computed total; advisory only.
    #[serde(default)]
    #[schema(value_type = String, example = "20.50")]
    pub total: BigDecimal,
}

/// Order of record as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: i64,
    pub order_number: i64,
    pub tracking_token: String,
    #[schema(value_type = String, example = "new")]
    pub status: ReportedStatus,
    pub unit_number: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub delivery_notes: Option<String>,
    #[serde(default)]
    pub order_type: Fulfillment,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub gcash_ref: Option<String>,
    #[serde(default)]
    pub cutlery: bool,
    pub items: Vec<OrderLine>,
    #[schema(value_type = String, example = "20.50")]
    pub total: BigDecimal,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn known_status(&self) -> Option<OrderStatus> {
        self.status.known()
    }
}

/// Validated order ready to be stored; the repository assigns identity.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub unit_number: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub delivery_notes: Option<String>,
    pub order_type: Fulfillment,
    pub payment_method: PaymentMethod,
    pub gcash_ref: Option<String>,
    pub cutlery: bool,
    pub items: Vec<OrderLine>,
    pub total: BigDecimal,
}

/// Stored order with a typed status.
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub id: i64,
    pub order_number: i64,
    pub tracking_token: String,
    pub status: OrderStatus,
    pub order: NewOrder,
    pub created_at: DateTime<Utc>,
}

impl From<OrderRecord> for Order {
    fn from(record: OrderRecord) -> Self {
        let o = record.order;
        Order {
            id: record.id,
            order_number: record.order_number,
            tracking_token: record.tracking_token,
            status: record.status.into(),
            unit_number: o.unit_number,
            phone_number: o.phone_number,
            email: o.email,
            delivery_notes: o.delivery_notes,
            order_type: o.order_type,
            payment_method: o.payment_method,
            gcash_ref: o.gcash_ref,
            cutlery: o.cutlery,
            items: o.items,
            total: o.total,
            created_at: record.created_at,
        }
    }
}

// ── Restaurant settings ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RestaurantSettings {
    pub accepting_orders: bool,
    pub prep_time_minutes: u32,
}

impl RestaurantSettings {
    /// Preparation estimate shown to customers, `(min, min + 10)` minutes.
    pub fn estimate_window(&self) -> (u32, u32) {
        (self.prep_time_minutes, self.prep_time_minutes + 10)
    }

    pub fn estimate_label(&self) -> String {
        let (min, max) = self.estimate_window();
        format!("{min}-{max} min")
    }
}

/// Partial settings change; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepting_orders: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time_minutes: Option<u32>,
}

impl SettingsUpdate {
    pub fn apply_to(&self, settings: &mut RestaurantSettings) {
        if let Some(accepting) = self.accepting_orders {
            settings.accepting_orders = accepting;
        }
        if let Some(minutes) = self.prep_time_minutes {
            settings.prep_time_minutes = minutes;
        }
    }
}
