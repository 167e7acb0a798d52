use std::sync::Arc;
use std::time::Duration;

use crate::application::checkout::{submit_order, CheckoutDetails, CheckoutError};
use crate::application::tracking::{start_tracking, TrackingHandle, DEFAULT_POLL_INTERVAL};
use crate::domain::cart::{Cart, CartTotals};
use crate::domain::errors::ApiError;
use crate::domain::menu::Menu;
use crate::domain::order::{Order, OrderStatus, RestaurantSettings};
use crate::domain::ports::{OrderingApi, TokenStore};
use crate::domain::status::{project, StatusDisplay};

/// Result of trying to pick up a persisted tracking token at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeOutcome {
    NoToken,
    /// Order still in progress; polling has started.
    Tracking,
    /// Order was already delivered; the token was discarded.
    Completed,
    /// The server does not know the token; it was discarded.
    Discarded,
    /// The order could not be checked right now; the token is kept for next time.
    Deferred,
}

/// One customer's ordering session: menu reference data, the open cart and at
/// most one order being tracked. Ending or resetting the session cancels the
/// tracking loop.
pub struct OrderingSession {
    api: Arc<dyn OrderingApi>,
    tokens: Arc<dyn TokenStore>,
    poll_interval: Duration,
    menu: Menu,
    settings: Option<RestaurantSettings>,
    cart: Cart,
    current: Option<Order>,
    tracking: Option<TrackingHandle>,
}

impl OrderingSession {
    pub fn new(api: Arc<dyn OrderingApi>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            api,
            tokens,
            poll_interval: DEFAULT_POLL_INTERVAL,
            menu: Menu::default(),
            settings: None,
            cart: Cart::new(),
            current: None,
            tracking: None,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Resumes any persisted order, then loads settings and the menu.
    pub async fn start(&mut self) -> Result<ResumeOutcome, ApiError> {
        let outcome = self.resume().await;
        self.refresh_settings().await?;
        self.load_menu().await?;
        Ok(outcome)
    }

    pub async fn refresh_settings(&mut self) -> Result<&RestaurantSettings, ApiError> {
        let settings = self.api.fetch_settings().await?;
        Ok(&*self.settings.insert(settings))
    }

    pub async fn load_menu(&mut self) -> Result<&Menu, ApiError> {
        self.menu = Menu::new(self.api.fetch_menu().await?);
        Ok(&self.menu)
    }

    /// Checks the persisted token once. A 404 or a delivered order discards
    /// it; any other failure keeps it and leaves polling off for this session.
    pub async fn resume(&mut self) -> ResumeOutcome {
        let token = match self.tokens.load() {
            Ok(Some(token)) => token,
            Ok(None) => return ResumeOutcome::NoToken,
            Err(e) => {
                log::warn!("Could not read tracking token: {}", e);
                return ResumeOutcome::NoToken;
            }
        };

        match self.api.track_order(&token).await {
            Ok(order) if order.known_status() == Some(OrderStatus::Delivered) => {
                log::info!("Order #{} was already delivered", order.order_number);
                self.clear_token();
                ResumeOutcome::Completed
            }
            Ok(order) => {
                log::info!("Resuming tracking for order #{}", order.order_number);
                self.begin_tracking(order);
                ResumeOutcome::Tracking
            }
            Err(ApiError::NotFound) => {
                log::info!("Persisted tracking token is no longer valid");
                self.clear_token();
                ResumeOutcome::Discarded
            }
            Err(e) => {
                log::info!("Could not check persisted order, will retry next start: {}", e);
                ResumeOutcome::Deferred
            }
        }
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn settings(&self) -> Option<&RestaurantSettings> {
        self.settings.as_ref()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    pub fn totals(&self) -> CartTotals {
        self.cart.totals(&self.menu)
    }

    /// Submits the cart and starts tracking the new order. Any order tracked
    /// before is dropped from the session.
    pub async fn place_order(
        &mut self,
        details: &CheckoutDetails,
    ) -> Result<&Order, CheckoutError> {
        let order = submit_order(
            self.api.as_ref(),
            self.tokens.as_ref(),
            &mut self.cart,
            &self.menu,
            details,
        )
        .await?;
        let order = self.begin_tracking(order);
        Ok(order)
    }

    fn begin_tracking(&mut self, order: Order) -> &Order {
        self.tracking = None;
        if order.known_status() != Some(OrderStatus::Delivered) {
            self.tracking = Some(start_tracking(
                self.api.clone(),
                self.tokens.clone(),
                order.clone(),
                self.poll_interval,
            ));
        }
        self.current.insert(order)
    }

    /// Forgets the current order and its token and empties the cart.
    pub fn start_new_order(&mut self) {
        if let Some(tracking) = self.tracking.take() {
            tracking.cancel();
        }
        self.clear_token();
        self.current = None;
        self.cart.clear();
    }

    /// The order being followed, refreshed by every applied poll.
    pub fn current_order(&self) -> Option<Order> {
        match &self.tracking {
            Some(tracking) => Some(tracking.order()),
            None => self.current.clone(),
        }
    }

    pub fn current_status(&self) -> Option<OrderStatus> {
        match &self.tracking {
            Some(tracking) => Some(tracking.status()),
            // Unrecognised statuses count from the beginning of the lifecycle.
            None => self
                .current
                .as_ref()
                .map(|order| order.known_status().unwrap_or(OrderStatus::New)),
        }
    }

    pub fn status_display(&self) -> Option<StatusDisplay> {
        self.current_status().map(project)
    }

    pub fn can_start_new_order(&self) -> bool {
        self.current_status().is_some_and(OrderStatus::is_terminal)
    }

    pub fn tracking_mut(&mut self) -> Option<&mut TrackingHandle> {
        self.tracking.as_mut()
    }

    /// Stops polling. The persisted token is kept so the next session resumes.
    pub fn end(&mut self) {
        if let Some(tracking) = self.tracking.take() {
            tracking.cancel();
            self.current = Some(tracking.order());
        }
    }

    fn clear_token(&self) {
        if let Err(e) = self.tokens.clear() {
            log::warn!("Could not clear tracking token: {}", e);
        }
    }
}
