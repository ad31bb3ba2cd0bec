//! # Transaction Status
//!
//! Transaction lifecycle state machine.
//!
//! # State Machine
//!
//! ```text
//! Pending → PaymentReceived → TradeCompleted → WithdrawalInitiated → Completed
//!    ↓             ↓                ↓                   ↓
//!    └─────────────┴────────────────┴───────────────────┴──────────→ Failed
//! ```
//!
//! Statuses arrive from upstream webhook events. Each event may only move a
//! transaction one step forward, or into `Failed`.
//!
//! # Examples
//!
//! ```
//! use onramp_gateway::domain::value_objects::TransactionStatus;
//!
//! let status = TransactionStatus::Pending;
//! assert!(status.can_transition_to(TransactionStatus::PaymentReceived));
//! assert!(!status.can_transition_to(TransactionStatus::Completed));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Transaction lifecycle status.
///
/// `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Created, waiting for the user's payment.
    #[default]
    Pending,
    /// Payment received by the provider.
    PaymentReceived,
    /// Trade executed at the provider.
    TradeCompleted,
    /// Withdrawal to the destination initiated.
    WithdrawalInitiated,
    /// Funds delivered (terminal).
    Completed,
    /// Processing failed (terminal).
    Failed,
}

impl TransactionStatus {
    /// All statuses in lifecycle order, `Failed` last.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::PaymentReceived,
        Self::TradeCompleted,
        Self::WithdrawalInitiated,
        Self::Completed,
        Self::Failed,
    ];

    /// Returns true if this is a terminal status.
    #[inline]
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns the next status on the success path, if any.
    #[must_use]
    pub const fn next(&self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::PaymentReceived),
            Self::PaymentReceived => Some(Self::TradeCompleted),
            Self::TradeCompleted => Some(Self::WithdrawalInitiated),
            Self::WithdrawalInitiated => Some(Self::Completed),
            Self::Completed | Self::Failed => None,
        }
    }

    /// Returns true if this status can transition to `target`.
    ///
    /// - Non-terminal → its immediate successor, or `Failed`
    /// - Terminal → (none)
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::PaymentReceived)
                | (Self::PaymentReceived, Self::TradeCompleted)
                | (Self::TradeCompleted, Self::WithdrawalInitiated)
                | (Self::WithdrawalInitiated, Self::Completed)
                | (Self::Pending, Self::Failed)
                | (Self::PaymentReceived, Self::Failed)
                | (Self::TradeCompleted, Self::Failed)
                | (Self::WithdrawalInitiated, Self::Failed)
        )
    }

    /// Returns the valid next statuses.
    #[must_use]
    pub fn valid_transitions(&self) -> Vec<Self> {
        match self.next() {
            Some(next) => vec![next, Self::Failed],
            None => vec![],
        }
    }

    /// Wire name of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PaymentReceived => "payment_received",
            Self::TradeCompleted => "trade_completed",
            Self::WithdrawalInitiated => "withdrawal_initiated",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transaction status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for TransactionStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod transitions {
        use super::*;

        #[test]
        fn forward_sequence_reaches_completed() {
            let mut status = TransactionStatus::Pending;
            let mut steps = 0;
            while let Some(next) = status.next() {
                assert!(status.can_transition_to(next));
                status = next;
                steps += 1;
            }
            assert_eq!(status, TransactionStatus::Completed);
            assert_eq!(steps, 4);
        }

        #[test]
        fn pending_cannot_skip_to_completed() {
            assert!(!TransactionStatus::Pending.can_transition_to(TransactionStatus::Completed));
            assert!(
                !TransactionStatus::Pending.can_transition_to(TransactionStatus::TradeCompleted)
            );
        }

        #[test]
        fn any_active_status_can_fail() {
            for status in TransactionStatus::ALL.into_iter().filter(|s| !s.is_terminal()) {
                assert!(status.can_transition_to(TransactionStatus::Failed));
            }
        }

        #[test]
        fn terminal_statuses_are_final() {
            for terminal in [TransactionStatus::Completed, TransactionStatus::Failed] {
                for target in TransactionStatus::ALL {
                    assert!(
                        !terminal.can_transition_to(target),
                        "{terminal:?} should not transition to {target:?}"
                    );
                }
                assert!(terminal.valid_transitions().is_empty());
            }
        }

        #[test]
        fn no_backward_moves() {
            assert!(
                !TransactionStatus::TradeCompleted.can_transition_to(TransactionStatus::Pending)
            );
        }
    }

    mod parsing {
        use super::*;

        #[test]
        fn from_str_round_trips_display() {
            for status in TransactionStatus::ALL {
                assert_eq!(status.to_string().parse::<TransactionStatus>().unwrap(), status);
            }
        }

        #[test]
        fn from_str_rejects_unknown() {
            assert!("refunded".parse::<TransactionStatus>().is_err());
        }

        #[test]
        fn serde_uses_snake_case() {
            let json = serde_json::to_string(&TransactionStatus::WithdrawalInitiated).unwrap();
            assert_eq!(json, "\"withdrawal_initiated\"");
        }
    }
}
