use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::model::*;

use super::conflict::find_conflict;

/// Authoritative booking collection.
///
/// `insert_if_no_overlap` and `delete` are each a single critical section: no
/// other mutation of the same room can interleave between the overlap scan and
/// the insert.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Bookings of one room, in no particular order.
    async fn list_by_room(&self, room_id: &str) -> Vec<Booking>;

    /// Insert `candidate` unless it overlaps a booking of the same room.
    async fn insert_if_no_overlap(&self, candidate: Booking) -> bool;

    /// Remove a booking; returns whether it existed.
    async fn delete(&self, id: &BookingId) -> bool;

    /// Drop everything. Test harnesses only.
    async fn reset(&self);

    /// Number of bookings across all rooms.
    async fn count(&self) -> usize;
}

/// Which [`BookingStore`] implementation to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreKind {
    /// One lock over every room.
    #[default]
    Single,
    /// One lock per room.
    Sharded,
}

impl StoreKind {
    pub fn build(self) -> Arc<dyn BookingStore> {
        match self {
            StoreKind::Single => Arc::new(InMemoryStore::new()),
            StoreKind::Sharded => Arc::new(ShardedStore::new()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StoreKind::Single => "single",
            StoreKind::Sharded => "sharded",
        }
    }
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(StoreKind::Single),
            "sharded" => Ok(StoreKind::Sharded),
            other => Err(format!("unknown store kind: {other}")),
        }
    }
}

// ── Single-lock store ────────────────────────────────────

#[derive(Default)]
struct StoreState {
    rooms: HashMap<String, RoomState>,
    /// Reverse lookup: booking id → room id
    booking_rooms: HashMap<BookingId, String>,
}

/// Every room behind one mutex.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingStore for InMemoryStore {
    async fn list_by_room(&self, room_id: &str) -> Vec<Booking> {
        let state = self.state.lock().await;
        state
            .rooms
            .get(room_id)
            .map(|room| room.bookings.clone())
            .unwrap_or_default()
    }

    async fn insert_if_no_overlap(&self, candidate: Booking) -> bool {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let room = state.rooms.entry(candidate.room_id.clone()).or_default();
        if let Some(existing) = find_conflict(room, &candidate.span()) {
            debug!(room_id = %candidate.room_id, existing = %existing.id, "overlap rejected");
            return false;
        }
        state
            .booking_rooms
            .insert(candidate.id.clone(), candidate.room_id.clone());
        room.insert(candidate);
        true
    }

    async fn delete(&self, id: &BookingId) -> bool {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let Some(room_id) = state.booking_rooms.remove(id) else {
            return false;
        };
        let Some(room) = state.rooms.get_mut(&room_id) else {
            return false;
        };
        let removed = room.remove(id).is_some();
        if room.is_empty() {
            state.rooms.remove(&room_id);
        }
        removed
    }

    async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.rooms.clear();
        state.booking_rooms.clear();
    }

    async fn count(&self) -> usize {
        let state = self.state.lock().await;
        state.booking_rooms.len()
    }
}

// ── Per-room store ───────────────────────────────────────

/// A room's bookings plus the flag that marks the shard as unlinked.
#[derive(Debug, Default)]
pub struct RoomShard {
    room: RoomState,
    /// Set under the write lock just before the shard leaves the map. A writer
    /// that locks a retired shard must look the room up again.
    retired: bool,
}

pub type SharedRoomShard = Arc<RwLock<RoomShard>>;

/// One write lock per room, so admissions for different rooms never contend.
///
/// A shard is dropped from the map by the delete that empties it.
#[derive(Default)]
pub struct ShardedStore {
    rooms: DashMap<String, SharedRoomShard>,
    /// Reverse lookup: booking id → room id
    booking_rooms: DashMap<BookingId, String>,
}

impl ShardedStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn get_room(&self, room_id: &str) -> Option<SharedRoomShard> {
        self.rooms.get(room_id).map(|e| e.value().clone())
    }

    fn get_or_create_room(&self, room_id: &str) -> SharedRoomShard {
        if let Some(room) = self.get_room(room_id) {
            return room;
        }
        self.rooms
            .entry(room_id.to_string())
            .or_default()
            .value()
            .clone()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

#[async_trait]
impl BookingStore for ShardedStore {
    async fn list_by_room(&self, room_id: &str) -> Vec<Booking> {
        let Some(shard) = self.get_room(room_id) else {
            return Vec::new();
        };
        let guard = shard.read().await;
        guard.room.bookings.clone()
    }

    async fn insert_if_no_overlap(&self, candidate: Booking) -> bool {
        loop {
            let shard = self.get_or_create_room(&candidate.room_id);
            let mut guard = shard.write().await;
            if guard.retired {
                continue;
            }
            if let Some(existing) = find_conflict(&guard.room, &candidate.span()) {
                debug!(room_id = %candidate.room_id, existing = %existing.id, "overlap rejected");
                return false;
            }
            self.booking_rooms
                .insert(candidate.id.clone(), candidate.room_id.clone());
            guard.room.insert(candidate);
            return true;
        }
    }

    async fn delete(&self, id: &BookingId) -> bool {
        loop {
            let Some(room_id) = self.booking_rooms.get(id).map(|e| e.value().clone()) else {
                return false;
            };
            let Some(shard) = self.get_room(&room_id) else {
                return false;
            };
            let mut guard = shard.write().await;
            if guard.retired {
                continue;
            }
            if guard.room.remove(id).is_none() {
                return false;
            }
            self.booking_rooms.remove(id);
            if guard.room.is_empty() {
                guard.retired = true;
                self.rooms
                    .remove_if(&room_id, |_, current| Arc::ptr_eq(current, &shard));
                debug!(room_id = %room_id, "room shard released");
            }
            return true;
        }
    }

    async fn reset(&self) {
        self.rooms.clear();
        self.booking_rooms.clear();
    }

    async fn count(&self) -> usize {
        self.booking_rooms.len()
    }
}
