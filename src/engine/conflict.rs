use crate::model::*;

use super::BookingError;

/// Ordering and no-past rules, in that order. `now` is sampled once by the caller.
pub(crate) fn validate_span(
    start: Timestamp,
    end: Timestamp,
    now: Timestamp,
) -> Result<Span, BookingError> {
    if start >= end {
        return Err(BookingError::StartNotBeforeEnd);
    }
    if start < now {
        return Err(BookingError::StartInPast);
    }
    Ok(Span::new(start, end))
}

/// First booking in the room that overlaps `span` under half-open comparison.
/// Caller must hold the room's write lock for the result to stay valid.
pub(crate) fn find_conflict<'a>(room: &'a RoomState, span: &Span) -> Option<&'a Booking> {
    room.overlapping(span).next()
}
