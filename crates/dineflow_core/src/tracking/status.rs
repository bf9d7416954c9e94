//! Status step lookup and transition rules.
//!
//! # Invariants
//! - Known non-cancelled statuses map to a step index in `0..ORDER_STEPS.len()`.
//! - `CANCELLED` maps to the sentinel, never to a step index.
//! - Transitions only move forward; terminal statuses never move.

use crate::model::order::{OrderStatus, UnknownStatus};
use serde::{Deserialize, Serialize};

/// Display order of the non-cancelled lifecycle.
pub const ORDER_STEPS: [OrderStatus; 5] = [
    OrderStatus::Created,
    OrderStatus::PaymentPending,
    OrderStatus::Paid,
    OrderStatus::Accepted,
    OrderStatus::Completed,
];

/// Index reported for cancelled orders by `StatusStep::as_index`.
pub const CANCELLED_STEP_INDEX: i32 = -1;

/// Position of a status in the progress display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum StatusStep {
    Step(usize),
    Cancelled,
}

impl StatusStep {
    pub fn as_index(self) -> i32 {
        match self {
            // ORDER_STEPS has five entries; the cast cannot truncate.
            Self::Step(index) => index as i32,
            Self::Cancelled => CANCELLED_STEP_INDEX,
        }
    }
}

/// Step for a typed status.
pub fn step_of(status: OrderStatus) -> StatusStep {
    ORDER_STEPS
        .iter()
        .position(|step| *step == status)
        .map_or(StatusStep::Cancelled, StatusStep::Step)
}

/// Step for a wire label such as `"PAID"` or `"cancelled"`.
pub fn status_step(raw: &str) -> Result<StatusStep, UnknownStatus> {
    raw.parse::<OrderStatus>().map(step_of)
}

/// Whether the backend may move an order from `from` to `to`.
pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    if from.is_terminal() {
        return false;
    }
    match (step_of(from), step_of(to)) {
        (_, StatusStep::Cancelled) => true,
        (StatusStep::Step(current), StatusStep::Step(next)) => next > current,
        (StatusStep::Cancelled, _) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{can_transition, status_step, step_of, StatusStep, CANCELLED_STEP_INDEX, ORDER_STEPS};
    use crate::model::order::OrderStatus;

    #[test]
    fn every_known_label_has_a_valid_step() {
        for (expected, label) in ["CREATED", "PAYMENT_PENDING", "PAID", "ACCEPTED", "COMPLETED"]
            .into_iter()
            .enumerate()
        {
            let step = status_step(label).unwrap();
            assert_eq!(step, StatusStep::Step(expected));
            assert!((0..ORDER_STEPS.len() as i32).contains(&step.as_index()));
        }
    }

    #[test]
    fn cancelled_maps_to_sentinel() {
        let step = status_step("cancelled").unwrap();
        assert_eq!(step, StatusStep::Cancelled);
        assert_eq!(step.as_index(), CANCELLED_STEP_INDEX);
    }

    #[test]
    fn unknown_label_is_rejected() {
        assert!(status_step("DELIVERED").is_err());
        assert!(status_step("").is_err());
    }

    #[test]
    fn transitions_move_forward_only() {
        assert!(can_transition(OrderStatus::Created, OrderStatus::PaymentPending));
        assert!(can_transition(OrderStatus::Paid, OrderStatus::Completed));
        assert!(!can_transition(OrderStatus::Accepted, OrderStatus::Paid));
        assert!(!can_transition(OrderStatus::Paid, OrderStatus::Paid));
    }

    #[test]
    fn cancel_allowed_until_terminal() {
        for status in ORDER_STEPS {
            assert_eq!(
                can_transition(status, OrderStatus::Cancelled),
                !status.is_terminal()
            );
        }
        assert!(!can_transition(OrderStatus::Cancelled, OrderStatus::Created));
        assert!(!can_transition(OrderStatus::Cancelled, OrderStatus::Cancelled));
    }

    #[test]
    fn step_of_matches_display_order() {
        assert_eq!(step_of(OrderStatus::Accepted), StatusStep::Step(3));
        assert_eq!(step_of(OrderStatus::Cancelled), StatusStep::Cancelled);
    }
}
