//! Status codes and failure reasons.
//!
//! Both travel as small integers. Conversion from a raw value is the only
//! way in, and rejects anything past the last variant.

use serde::{Deserialize, Serialize};

use crate::error::StatusError;

/// Lifecycle position of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum StatusCode {
    Queued = 0,
    Running = 1,
    Success = 2,
    Failed = 3,
}

impl StatusCode {
    pub const MAX: u8 = StatusCode::Failed as u8;

    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// No update is accepted after a terminal status.
    pub const fn is_terminal(self) -> bool {
        matches!(self, StatusCode::Success | StatusCode::Failed)
    }

    /// Allowed edges: Queued -> Running -> {Success, Failed}, Queued -> Failed.
    pub const fn can_transition_to(self, next: StatusCode) -> bool {
        matches!(
            (self, next),
            (StatusCode::Queued, StatusCode::Running)
                | (StatusCode::Queued, StatusCode::Failed)
                | (StatusCode::Running, StatusCode::Success)
                | (StatusCode::Running, StatusCode::Failed)
        )
    }
}

impl TryFrom<u8> for StatusCode {
    type Error = StatusError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(StatusCode::Queued),
            1 => Ok(StatusCode::Running),
            2 => Ok(StatusCode::Success),
            3 => Ok(StatusCode::Failed),
            other => Err(StatusError::StatusOutOfRange(other)),
        }
    }
}

/// Why a ticket failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FailReason {
    NoReason = 0,
    /// The operation did not pass authentication or authorization.
    Rejected = 1,
    /// The operation was trusted but could not be carried out.
    Failed = 2,
}

impl FailReason {
    pub const MAX: u8 = FailReason::Failed as u8;

    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for FailReason {
    type Error = StatusError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FailReason::NoReason),
            1 => Ok(FailReason::Rejected),
            2 => Ok(FailReason::Failed),
            other => Err(StatusError::ReasonOutOfRange(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_codes_roundtrip() {
        for code in [
            StatusCode::Queued,
            StatusCode::Running,
            StatusCode::Success,
            StatusCode::Failed,
        ] {
            assert_eq!(StatusCode::try_from(code.as_u8()), Ok(code));
        }
        for reason in [FailReason::NoReason, FailReason::Rejected, FailReason::Failed] {
            assert_eq!(FailReason::try_from(reason.as_u8()), Ok(reason));
        }
    }

    #[test]
    fn test_one_past_the_end() {
        assert_eq!(
            StatusCode::try_from(StatusCode::MAX + 1),
            Err(StatusError::StatusOutOfRange(4))
        );
        assert_eq!(
            FailReason::try_from(FailReason::MAX + 1),
            Err(StatusError::ReasonOutOfRange(3))
        );
    }

    #[test]
    fn test_transitions() {
        use StatusCode::*;
        assert!(Queued.can_transition_to(Running));
        assert!(Queued.can_transition_to(Failed));
        assert!(!Queued.can_transition_to(Success));
        assert!(!Queued.can_transition_to(Queued));
        assert!(Running.can_transition_to(Success));
        assert!(!Running.can_transition_to(Queued));
        for terminal in [Success, Failed] {
            assert!(terminal.is_terminal());
            for next in [Queued, Running, Success, Failed] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    proptest! {
        #[test]
        fn test_out_of_range_rejected(raw in 4u8..=u8::MAX) {
            prop_assert_eq!(StatusCode::try_from(raw), Err(StatusError::StatusOutOfRange(raw)));
        }

        #[test]
        fn test_reason_out_of_range_rejected(raw in 3u8..=u8::MAX) {
            prop_assert_eq!(FailReason::try_from(raw), Err(StatusError::ReasonOutOfRange(raw)));
        }
    }
}
