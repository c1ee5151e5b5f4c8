use std::time::Instant;

use tracing::{debug, info};

use crate::limits::*;
use crate::model::*;
use crate::observability::{ADMISSIONS_TOTAL, ADMISSION_DURATION_SECONDS, DELETIONS_TOTAL};
use crate::time::parse_timestamp;

use super::conflict::validate_span;
use super::{BookingError, BookingService};

impl BookingService {
    /// Parse, validate and admit a booking request.
    ///
    /// Malformed input fails before any rule runs; rules fail before the store
    /// is touched.
    pub async fn create_booking(
        &self,
        room_id: &str,
        start: &str,
        end: &str,
    ) -> Result<Booking, BookingError> {
        let started = Instant::now();
        let result = self.parse_and_admit(room_id, start, end).await;
        metrics::histogram!(ADMISSION_DURATION_SECONDS).record(started.elapsed().as_secs_f64());

        let outcome = match &result {
            Ok(_) => "admitted",
            Err(e) => e.label(),
        };
        metrics::counter!(ADMISSIONS_TOTAL, "outcome" => outcome).increment(1);
        result
    }

    async fn parse_and_admit(
        &self,
        room_id: &str,
        start: &str,
        end: &str,
    ) -> Result<Booking, BookingError> {
        validate_room_id(room_id)?;
        let start = parse_timestamp(start).map_err(|reason| BookingError::InvalidTimestamp {
            field: "start",
            reason,
        })?;
        let end = parse_timestamp(end).map_err(|reason| BookingError::InvalidTimestamp {
            field: "end",
            reason,
        })?;
        self.admit(room_id, start, end).await
    }

    /// Apply the ordering, no-past and no-overlap rules to already parsed instants.
    pub async fn admit(
        &self,
        room_id: &str,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Booking, BookingError> {
        validate_room_id(room_id)?;
        let now = self.clock.now();
        let span = validate_span(start, end, now).inspect_err(|e| {
            debug!(room_id, %start, %end, %now, "booking rejected: {e}");
        })?;

        let candidate = Booking::new(BookingId::generate(), room_id, span);
        if !self.store.insert_if_no_overlap(candidate.clone()).await {
            info!(room_id, %start, %end, "booking conflicts with an existing booking");
            return Err(BookingError::OverlapConflict);
        }

        info!(id = %candidate.id, room_id, %start, %end, "booking admitted");
        Ok(candidate)
    }

    /// Hard, unconditional removal.
    pub async fn delete_booking(&self, id: &str) -> Result<(), BookingError> {
        if id.is_empty() {
            return Err(BookingError::MissingField("booking_id"));
        }
        let id = BookingId::from(id);
        if !self.store.delete(&id).await {
            metrics::counter!(DELETIONS_TOTAL, "outcome" => "not_found").increment(1);
            return Err(BookingError::NotFound(id));
        }
        metrics::counter!(DELETIONS_TOTAL, "outcome" => "deleted").increment(1);
        info!(%id, "booking deleted");
        Ok(())
    }
}

fn validate_room_id(room_id: &str) -> Result<(), BookingError> {
    if room_id.is_empty() {
        return Err(BookingError::MissingField("room_id"));
    }
    if room_id.len() > MAX_ROOM_ID_LEN {
        return Err(BookingError::LimitExceeded("room_id too long"));
    }
    Ok(())
}
