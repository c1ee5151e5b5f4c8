use crate::model::*;
use crate::observability::LIST_QUERIES_TOTAL;

use super::BookingService;

impl BookingService {
    /// Bookings of one room ascending by start, ties broken by id.
    /// An unknown room yields an empty list.
    pub async fn list_bookings_for_room(&self, room_id: &str) -> Vec<Booking> {
        metrics::counter!(LIST_QUERIES_TOTAL).increment(1);
        let mut bookings = self.store.list_by_room(room_id).await;
        sort_for_listing(&mut bookings);
        bookings
    }
}

pub(super) fn sort_for_listing(bookings: &mut [Booking]) {
    bookings.sort_by(|a, b| {
        a.start_utc
            .cmp(&b.start_utc)
            .then_with(|| a.id.cmp(&b.id))
    });
}
