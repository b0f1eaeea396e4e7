use lodge_types::Room;
use serde::Serialize;

/// Snapshot of the cached rooms collection.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StoreState {
    /// A refresh is in flight.
    pub loading: bool,
    /// Message of the last failed operation, cleared when the next one starts.
    pub error: Option<String>,
    /// Cached rooms in stored order.
    pub items: Vec<Room>,
}

impl StoreState {
    /// State before the first refresh completes.
    pub fn initial() -> Self {
        Self {
            loading: true,
            error: None,
            items: Vec::new(),
        }
    }

    /// Replace the cached room with the same id, or append it if the cache
    /// has not seen it yet.
    pub(crate) fn upsert(&mut self, room: &Room) {
        match self.items.iter_mut().find(|r| r.meta.id == room.meta.id) {
            Some(slot) => *slot = room.clone(),
            None => self.items.push(room.clone()),
        }
    }
}

impl Default for StoreState {
    fn default() -> Self {
        Self::initial()
    }
}
