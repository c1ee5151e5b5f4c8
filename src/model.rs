use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use ulid::Ulid;

/// UTC instant. The only time type past the parsing boundary.
pub type Timestamp = DateTime<Utc>;

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Span {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains_instant(&self, t: Timestamp) -> bool {
        self.start <= t && t < self.end
    }
}

/// Opaque booking identifier: `bkg_` followed by a ULID.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BookingId(String);

impl BookingId {
    const PREFIX: &'static str = "bkg_";

    pub fn generate() -> Self {
        Self(format!("{}{}", Self::PREFIX, Ulid::new()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BookingId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for BookingId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An admitted reservation of one room. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: BookingId,
    pub room_id: String,
    pub start_utc: Timestamp,
    pub end_utc: Timestamp,
}

impl Booking {
    pub fn new(id: BookingId, room_id: impl Into<String>, span: Span) -> Self {
        Self {
            id,
            room_id: room_id.into(),
            start_utc: span.start,
            end_utc: span.end,
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.start_utc, self.end_utc)
    }
}

/// All bookings of a single room.
#[derive(Debug, Clone, Default)]
pub struct RoomState {
    /// Sorted by `start_utc`. Pairwise non-overlapping once admitted.
    pub bookings: Vec<Booking>,
}

impl RoomState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    /// Insert booking maintaining sort order by start.
    pub fn insert(&mut self, booking: Booking) {
        let pos = self
            .bookings
            .binary_search_by_key(&booking.start_utc, |b| b.start_utc)
            .unwrap_or_else(|e| e);
        self.bookings.insert(pos, booking);
    }

    /// Remove booking by id.
    pub fn remove(&mut self, id: &BookingId) -> Option<Booking> {
        let pos = self.bookings.iter().position(|b| &b.id == id)?;
        Some(self.bookings.remove(pos))
    }

    /// Return only bookings whose span overlaps the query window.
    /// Uses binary search to skip bookings starting at or after `query.end`.
    pub fn overlapping(&self, query: &Span) -> impl Iterator<Item = &Booking> {
        let right_bound = self
            .bookings
            .partition_point(|b| b.start_utc < query.end);
        self.bookings[..right_bound]
            .iter()
            .filter(move |b| b.end_utc > query.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2030, 1, 1, h, m, 0).unwrap()
    }

    fn booking(start: Timestamp, end: Timestamp) -> Booking {
        Booking::new(BookingId::generate(), "room_1", Span::new(start, end))
    }

    #[test]
    fn span_basics() {
        let s = Span::new(at(10, 0), at(11, 0));
        assert_eq!(s.duration(), TimeDelta::hours(1));
        assert!(s.contains_instant(at(10, 0)));
        assert!(s.contains_instant(at(10, 59)));
        assert!(!s.contains_instant(at(11, 0))); // half-open
    }

    #[test]
    fn span_overlap() {
        let a = Span::new(at(10, 0), at(11, 0));
        let b = Span::new(at(10, 30), at(11, 30));
        let c = Span::new(at(11, 0), at(12, 0));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c)); // adjacent, not overlapping
        assert!(!c.overlaps(&a));
    }

    #[test]
    fn span_containing_other_overlaps() {
        let outer = Span::new(at(9, 0), at(13, 0));
        let inner = Span::new(at(10, 0), at(11, 0));
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn booking_id_prefix_and_uniqueness() {
        let a = BookingId::generate();
        let b = BookingId::generate();
        assert!(a.as_str().starts_with("bkg_"));
        assert_eq!(a.as_str().len(), 4 + 26);
        assert_ne!(a, b);
    }

    #[test]
    fn booking_id_displays_as_plain_string() {
        let id = BookingId::from("bkg_abc");
        assert_eq!(id.to_string(), "bkg_abc");
        assert_eq!(id.as_str(), "bkg_abc");
    }

    #[test]
    fn room_state_keeps_start_order() {
        let mut rs = RoomState::new();
        rs.insert(booking(at(14, 0), at(15, 0)));
        rs.insert(booking(at(10, 0), at(11, 0)));
        rs.insert(booking(at(12, 0), at(13, 0)));
        let starts: Vec<_> = rs.bookings.iter().map(|b| b.start_utc).collect();
        assert_eq!(starts, vec![at(10, 0), at(12, 0), at(14, 0)]);
    }

    #[test]
    fn room_state_remove() {
        let mut rs = RoomState::new();
        let b = booking(at(10, 0), at(11, 0));
        let id = b.id.clone();
        rs.insert(b);
        assert_eq!(rs.len(), 1);
        assert!(rs.remove(&BookingId::generate()).is_none());
        assert_eq!(rs.remove(&id).map(|b| b.id), Some(id));
        assert!(rs.is_empty());
    }

    #[test]
    fn overlapping_skips_before_and_after() {
        let mut rs = RoomState::new();
        rs.insert(booking(at(8, 0), at(9, 0)));
        rs.insert(booking(at(10, 0), at(11, 0)));
        rs.insert(booking(at(15, 0), at(16, 0)));

        let query = Span::new(at(10, 30), at(12, 0));
        let hits: Vec<_> = rs.overlapping(&query).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].start_utc, at(10, 0));
    }

    #[test]
    fn overlapping_adjacent_not_included() {
        let mut rs = RoomState::new();
        rs.insert(booking(at(10, 0), at(11, 0)));
        rs.insert(booking(at(12, 0), at(13, 0)));
        let query = Span::new(at(11, 0), at(12, 0));
        assert_eq!(rs.overlapping(&query).count(), 0);
    }

    #[test]
    fn overlapping_long_booking_spanning_query() {
        let mut rs = RoomState::new();
        rs.insert(booking(at(0, 0), at(23, 0)));
        let query = Span::new(at(10, 0), at(10, 30));
        assert_eq!(rs.overlapping(&query).count(), 1);
    }

    #[test]
    fn overlapping_empty_room() {
        let rs = RoomState::new();
        let query = Span::new(at(0, 0), at(23, 0));
        assert_eq!(rs.overlapping(&query).count(), 0);
    }
}
