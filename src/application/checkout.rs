use std::fmt;

use thiserror::Error;

use crate::domain::cart::Cart;
use crate::domain::errors::ApiError;
use crate::domain::menu::Menu;
use crate::domain::order::{
    lines_total, Contact, Fulfillment, Order, OrderLine, OrderRequest, Payment,
};
use crate::domain::ports::{OrderingApi, TokenStore};

pub const CONNECTIVITY_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    UnitNumber,
    WalletReference,
    Items,
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RequiredField::UnitNumber => "unit number",
            RequiredField::WalletReference => "GCash reference number",
            RequiredField::Items => "at least one item",
        })
    }
}

fn join_fields(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Please provide: {}", join_fields(.0))]
    Validation(Vec<RequiredField>),
    #[error("Sorry, the restaurant is not accepting orders right now. Please try again later.")]
    OrdersPaused,
    #[error("Item {item_id} is no longer on the menu. Please review your cart.")]
    InvalidCartState { item_id: i64 },
    #[error("{0}")]
    Submission(String),
}

/// What the customer typed on the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutDetails {
    pub unit_number: String,
    pub contact: Contact,
    pub delivery_notes: String,
    pub fulfillment: Fulfillment,
    pub payment: Payment,
    pub cutlery: bool,
}

impl CheckoutDetails {
    /// Every missing field at once, in form order.
    pub fn missing_fields(&self, cart: &Cart) -> Vec<RequiredField> {
        let mut missing = Vec::new();
        if self.unit_number.trim().is_empty() {
            missing.push(RequiredField::UnitNumber);
        }
        if let Payment::Wallet { reference } = &self.payment {
            if reference.trim().is_empty() {
                missing.push(RequiredField::WalletReference);
            }
        }
        if cart.is_empty() {
            missing.push(RequiredField::Items);
        }
        missing
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Snapshots the cart against `menu` into the request body. The returned
/// lines own their name and price, so later menu changes do not reach them.
pub fn build_request(
    cart: &Cart,
    menu: &Menu,
    details: &CheckoutDetails,
) -> Result<OrderRequest, CheckoutError> {
    let items = cart
        .lines()
        .filter(|(_, line)| line.quantity() > 0)
        .map(|(item_id, line)| {
            let item = menu
                .get(item_id)
                .ok_or(CheckoutError::InvalidCartState { item_id })?;
            Ok(OrderLine {
                id: item.id,
                name: item.name.clone(),
                price: item.price.clone(),
                quantity: line.quantity(),
                notes: line.notes().to_string(),
            })
        })
        .collect::<Result<Vec<_>, CheckoutError>>()?;

    let (phone_number, email) = match &details.contact {
        Contact::None => (None, None),
        Contact::Phone(phone) => (non_blank(phone), None),
        Contact::Email(email) => (None, non_blank(email)),
    };
    let gcash_ref = match &details.payment {
        Payment::Cash => None,
        Payment::Wallet { reference } => non_blank(reference),
    };

    Ok(OrderRequest {
        unit_number: details.unit_number.trim().to_uppercase(),
        phone_number,
        email,
        delivery_notes: non_blank(&details.delivery_notes),
        order_type: details.fulfillment,
        payment_method: details.payment.method(),
        gcash_ref,
        cutlery: details.cutlery,
        total: lines_total(&items),
        items,
    })
}

fn submission_error(e: ApiError) -> CheckoutError {
    match e {
        ApiError::Rejected { status: 503, .. } => CheckoutError::OrdersPaused,
        ApiError::Rejected {
            message: Some(message),
            ..
        } => CheckoutError::Submission(message),
        ApiError::Rejected { message: None, .. } | ApiError::NotFound | ApiError::Transport(_) => {
            CheckoutError::Submission(CONNECTIVITY_MESSAGE.to_string())
        }
    }
}

/// Places one order from `cart`.
///
/// Field validation runs before any request. Settings are then re-fetched so
/// a pause since page load is honoured; if that fetch fails the server still
/// gets the final say. On success the tracking token is persisted and the
/// cart is emptied; on failure the cart is left untouched. Not idempotent:
/// each successful call creates a new order.
pub async fn submit_order(
    api: &dyn OrderingApi,
    tokens: &dyn TokenStore,
    cart: &mut Cart,
    menu: &Menu,
    details: &CheckoutDetails,
) -> Result<Order, CheckoutError> {
    let missing = details.missing_fields(cart);
    if !missing.is_empty() {
        return Err(CheckoutError::Validation(missing));
    }

    match api.fetch_settings().await {
        Ok(settings) if !settings.accepting_orders => return Err(CheckoutError::OrdersPaused),
        Ok(_) => {}
        Err(e) => log::warn!("Could not re-check restaurant settings before submitting: {}", e),
    }

    let request = build_request(cart, menu, details)?;
    let order = api.create_order(&request).await.map_err(|e| {
        log::warn!("Order submission failed: {}", e);
        submission_error(e)
    })?;

    if let Err(e) = tokens.save(&order.tracking_token) {
        log::error!(
            "Order #{} placed but its tracking token could not be saved: {}",
            order.order_number,
            e
        );
    }
    cart.clear();

    log::info!("Order #{} submitted", order.order_number);
    Ok(order)
}
