use tracing::{debug, warn};

use shared_config::TransitionPolicy;
use shared_models::BookingStatus;

use crate::error::BookingError;

/// Booking lifecycle graph:
///
/// `PENDING -> CONFIRMED -> PAYMENT_PENDING -> PAID -> IN_PROGRESS -> COMPLETED`,
/// with `CANCELLED` reachable from the first three states.
///
/// Under [`TransitionPolicy::Permissive`] every write is accepted and the
/// graph is advisory only.
#[derive(Debug, Clone, Copy)]
pub struct BookingLifecycle {
    policy: TransitionPolicy,
}

impl BookingLifecycle {
    pub fn new(policy: TransitionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    pub fn valid_transitions(current: BookingStatus) -> &'static [BookingStatus] {
        use BookingStatus::*;

        match current {
            Pending => &[Confirmed, Cancelled],
            Confirmed => &[PaymentPending, Cancelled],
            PaymentPending => &[Paid, Cancelled],
            Paid => &[InProgress],
            InProgress => &[Completed],
            Completed | Cancelled => &[],
        }
    }

    pub fn is_edge(from: BookingStatus, to: BookingStatus) -> bool {
        Self::valid_transitions(from).contains(&to)
    }

    pub fn validate_transition(&self, from: BookingStatus, to: BookingStatus) -> Result<(), BookingError> {
        if Self::is_edge(from, to) {
            return Ok(());
        }

        match self.policy {
            TransitionPolicy::Permissive => {
                debug!("Accepting off-graph transition {} -> {}", from, to);
                Ok(())
            }
            TransitionPolicy::Strict => {
                warn!("Invalid status transition attempted: {} -> {}", from, to);
                Err(BookingError::InvalidTransition { from, to })
            }
        }
    }
}
