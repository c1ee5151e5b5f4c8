use crate::model::BookingId;
use crate::time::TimestampError;

/// Coarse category of a [`BookingError`], for transport mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Malformed,
    Validation,
    Conflict,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    MissingField(&'static str),
    InvalidTimestamp {
        field: &'static str,
        reason: TimestampError,
    },
    LimitExceeded(&'static str),
    StartNotBeforeEnd,
    StartInPast,
    OverlapConflict,
    NotFound(BookingId),
}

impl BookingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BookingError::MissingField(_)
            | BookingError::InvalidTimestamp { .. }
            | BookingError::LimitExceeded(_) => ErrorKind::Malformed,
            BookingError::StartNotBeforeEnd | BookingError::StartInPast => ErrorKind::Validation,
            BookingError::OverlapConflict => ErrorKind::Conflict,
            BookingError::NotFound(_) => ErrorKind::NotFound,
        }
    }

    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            BookingError::MissingField(_) => "missing_field",
            BookingError::InvalidTimestamp { .. } => "invalid_timestamp",
            BookingError::LimitExceeded(_) => "limit_exceeded",
            BookingError::StartNotBeforeEnd => "start_not_before_end",
            BookingError::StartInPast => "start_in_past",
            BookingError::OverlapConflict => "overlap_conflict",
            BookingError::NotFound(_) => "not_found",
        }
    }
}

impl std::fmt::Display for BookingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingError::MissingField(field) => write!(f, "{field} must be a non-empty string"),
            BookingError::InvalidTimestamp { field, reason } => write!(f, "{field}: {reason}"),
            BookingError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            BookingError::StartNotBeforeEnd => write!(f, "start must be before end"),
            BookingError::StartInPast => write!(f, "booking start cannot be in the past"),
            BookingError::OverlapConflict => {
                write!(f, "booking overlaps an existing booking in this room")
            }
            BookingError::NotFound(id) => write!(f, "booking not found: {id}"),
        }
    }
}

impl std::error::Error for BookingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BookingError::InvalidTimestamp { reason, .. } => Some(reason),
            _ => None,
        }
    }
}
