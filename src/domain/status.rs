//! Display metadata for each order status, shared by the customer tracking
//! screen and the staff views.

use super::order::{OrderStatus, ReportedStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusDisplay {
    pub status: OrderStatus,
    pub step: u8,
    pub label: &'static str,
    pub icon: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Completed,
    Active,
    Pending,
}

pub const STEP_COUNT: u8 = 4;

pub fn project(status: OrderStatus) -> StatusDisplay {
    let (label, icon, message) = match status {
        OrderStatus::New => ("Order Received", "📋", "Your order has been received!"),
        OrderStatus::Preparing => ("Preparing Your Order", "🍳", "The kitchen is working on it!"),
        OrderStatus::Ready => ("Ready for Delivery", "✅", "Your order is ready!"),
        OrderStatus::Delivered => ("Delivered", "🍽️", "Enjoy your meal!"),
    };
    StatusDisplay {
        status,
        step: status.step(),
        label,
        icon,
        message,
    }
}

/// `None` for statuses this build does not recognise; callers keep their
/// previous projection in that case.
pub fn project_reported(status: &ReportedStatus) -> Option<StatusDisplay> {
    status.known().map(project)
}

impl StatusDisplay {
    pub fn progress_percent(&self) -> u8 {
        ((u32::from(self.step) - 1) * 100 / u32::from(STEP_COUNT - 1)) as u8
    }

    pub fn step_states(&self) -> [StepState; STEP_COUNT as usize] {
        let mut states = [StepState::Pending; STEP_COUNT as usize];
        for (pos, state) in states.iter_mut().enumerate() {
            let step = pos as u8 + 1;
            *state = if step < self.step {
                StepState::Completed
            } else if step == self.step {
                StepState::Active
            } else {
                StepState::Pending
            };
        }
        states
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
