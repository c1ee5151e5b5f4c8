mod conflict;
mod error;
mod mutations;
mod queries;
mod store;

pub use error::{BookingError, ErrorKind};
pub use store::{
    BookingStore, InMemoryStore, RoomShard, ShardedStore, SharedRoomShard, StoreKind,
};

use std::sync::Arc;

use crate::clock::Clock;

/// Booking rules on top of an injected [`BookingStore`].
///
/// Holds no lock of its own: the overlap decision is made only inside
/// [`BookingStore::insert_if_no_overlap`].
pub struct BookingService {
    store: Arc<dyn BookingStore>,
    clock: Arc<dyn Clock>,
}

impl BookingService {
    pub fn new(store: Arc<dyn BookingStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &Arc<dyn BookingStore> {
        &self.store
    }

    /// Clear the underlying store. Test harnesses only.
    pub async fn reset(&self) {
        self.store.reset().await;
    }
}
