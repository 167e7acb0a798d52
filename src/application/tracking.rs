//! Background status polling for one placed order.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::order::{Order, OrderStatus};
use crate::domain::ports::{OrderingApi, TokenStore};
use crate::domain::status::{project, StatusDisplay};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Orders poll responses. Each request takes a ticket from `issue`; a
/// response is applied only if its ticket is newer than the last applied one
/// and it does not move the status backwards.
#[derive(Debug, Clone)]
pub struct PollSequencer {
    status: OrderStatus,
    issued: u64,
    applied: u64,
}

impl PollSequencer {
    pub fn new(initial: OrderStatus) -> Self {
        Self {
            status: initial,
            issued: 0,
            applied: 0,
        }
    }

    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Returns the new status when the response changed it.
    pub fn apply(&mut self, ticket: u64, status: OrderStatus) -> Option<OrderStatus> {
        if ticket <= self.applied {
            return None;
        }
        self.applied = ticket;
        if status <= self.status {
            return None;
        }
        self.status = status;
        Some(status)
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }
}

/// Last applied poll result: the status the sequencer settled on and the
/// server's copy of the order it came with.
#[derive(Debug, Clone)]
struct Snapshot {
    status: OrderStatus,
    order: Order,
}

/// Owner of a running tracking loop. Dropping the handle cancels the loop.
pub struct TrackingHandle {
    latest: watch::Receiver<Snapshot>,
    task: JoinHandle<()>,
}

impl TrackingHandle {
    pub fn status(&self) -> OrderStatus {
        self.latest.borrow().status
    }

    /// The order as last returned by an applied poll, or as tracking began.
    pub fn order(&self) -> Order {
        self.latest.borrow().order.clone()
    }

    pub fn display(&self) -> StatusDisplay {
        project(self.status())
    }

    /// True once the loop has stopped, either at `delivered` or by cancellation.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the next status change. `None` once the loop has stopped.
    pub async fn changed(&mut self) -> Option<OrderStatus> {
        self.latest.changed().await.ok()?;
        Some(self.latest.borrow_and_update().status)
    }

    /// Waits for the loop to stop and returns the last applied status.
    pub async fn finished(&mut self) -> OrderStatus {
        while self.latest.changed().await.is_ok() {}
        self.status()
    }

    pub fn cancel(&self) {
        self.task.abort();
    }
}

impl Drop for TrackingHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawns the polling loop for `order`. An unrecognised starting status is
/// tracked from `new`.
///
/// The next request is scheduled only after the previous one completes, so
/// requests never overlap. Failed polls and unrecognised statuses are skipped.
/// On `delivered` the persisted token is cleared and the loop ends.
pub fn start_tracking(
    api: Arc<dyn OrderingApi>,
    tokens: Arc<dyn TokenStore>,
    order: Order,
    interval: Duration,
) -> TrackingHandle {
    let initial = order.known_status().unwrap_or(OrderStatus::New);
    let token = order.tracking_token.clone();
    let (tx, rx) = watch::channel(Snapshot {
        status: initial,
        order,
    });
    let task = tokio::spawn(async move {
        let mut sequencer = PollSequencer::new(initial);
        while !sequencer.status().is_terminal() {
            tokio::time::sleep(interval).await;

            let ticket = sequencer.issue();
            match api.track_order(&token).await {
                Ok(order) => match order.known_status() {
                    Some(status) => {
                        if let Some(changed) = sequencer.apply(ticket, status) {
                            log::info!("Order #{} is now {}", order.order_number, changed);
                            tx.send_replace(Snapshot {
                                status: changed,
                                order,
                            });
                        }
                    }
                    None => log::debug!(
                        "Ignoring unrecognized status {:?} for order #{}",
                        order.status,
                        order.order_number
                    ),
                },
                Err(e) => log::debug!("Tracking poll failed, retrying next tick: {}", e),
            }
        }

        if let Err(e) = tokens.clear() {
            log::warn!("Could not clear tracking token after delivery: {}", e);
        }
    });

    TrackingHandle { latest: rx, task }
}
