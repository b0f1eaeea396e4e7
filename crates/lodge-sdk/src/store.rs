use std::future::Future;

use lodge_repo::{RepoResult, RoomRepository};
use lodge_types::{NewRoom, RecordId, Room, RoomPatch, RoomStatus, TenantId};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::LodgeResult;
use crate::query::{self, StatusCounts};
use crate::state::StoreState;

/// Observable cache of the rooms collection.
///
/// Construct one per process and hand it to every consumer. Reads come from
/// the cache; every mutation goes to the repository first and only touches
/// the cache once the repository has confirmed it, so after an operation
/// settles the cache matches what is persisted.
///
/// `refresh` absorbs failures into [`StoreState::error`] and keeps the
/// previously cached items. Mutations also record their failure message but
/// return the error to the caller and leave the items untouched.
///
/// Calls are expected one at a time from a single control flow. Overlapping
/// mutations are serialized by the repository, but the cache applies each
/// result as it arrives.
pub struct RoomStore {
    repo: RoomRepository,
    state: watch::Sender<StoreState>,
}

impl RoomStore {
    /// A store in the initial state (`loading`, no items). Performs no I/O.
    pub fn new(repo: RoomRepository) -> Self {
        let (state, _) = watch::channel(StoreState::initial());
        Self { repo, state }
    }

    /// A store that has completed its first refresh.
    pub async fn open(repo: RoomRepository) -> Self {
        let store = Self::new(repo);
        store.refresh().await;
        store
    }

    /// Receive every subsequent state change.
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state.subscribe()
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> StoreState {
        self.state.borrow().clone()
    }

    pub fn items(&self) -> Vec<Room> {
        self.state.borrow().items.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    /// Reload the cache from the repository.
    ///
    /// On failure the error message is kept in the state and the previous
    /// items stay available.
    pub async fn refresh(&self) {
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
        match self.repo.list_all().await {
            Ok(items) => {
                debug!(count = items.len(), "refreshed rooms");
                self.state.send_modify(|s| {
                    s.items = items;
                    s.loading = false;
                });
            }
            Err(e) => {
                warn!(error = %e, "failed to refresh rooms");
                self.state.send_modify(|s| {
                    s.error = Some(e.to_string());
                    s.loading = false;
                });
            }
        }
    }

    /// Create a room and append it to the cache.
    pub async fn add(&self, room: NewRoom) -> LodgeResult<Room> {
        let created = self.mutate("add", self.repo.create(room)).await?;
        self.state.send_modify(|s| s.items.push(created.clone()));
        Ok(created)
    }

    /// Edit room fields. `Ok(None)` if the room does not exist.
    pub async fn edit(&self, id: &RecordId, patch: RoomPatch) -> LodgeResult<Option<Room>> {
        let updated = self.mutate("edit", self.repo.update(id, patch)).await?;
        Ok(self.reconcile(updated))
    }

    /// Set the status directly. See [`RoomRepository::change_status`].
    pub async fn set_status(
        &self,
        id: &RecordId,
        status: RoomStatus,
    ) -> LodgeResult<Option<Room>> {
        let updated = self
            .mutate("set_status", self.repo.change_status(id, status))
            .await?;
        Ok(self.reconcile(updated))
    }

    /// Set the status from its name. Unknown names fail with an invalid
    /// argument error and change nothing.
    pub async fn set_status_named(
        &self,
        id: &RecordId,
        status: &str,
    ) -> LodgeResult<Option<Room>> {
        let updated = self
            .mutate("set_status", self.repo.change_status_named(id, status))
            .await?;
        Ok(self.reconcile(updated))
    }

    /// Let the room to `tenant_id`; the room becomes `Occupied`.
    pub async fn assign_tenant(
        &self,
        room_id: &RecordId,
        tenant_id: TenantId,
    ) -> LodgeResult<Option<Room>> {
        let updated = self
            .mutate("assign_tenant", self.repo.assign_tenant(room_id, tenant_id))
            .await?;
        Ok(self.reconcile(updated))
    }

    /// Vacate the room; it moves to `Cleaning`.
    pub async fn remove_tenant(&self, room_id: &RecordId) -> LodgeResult<Option<Room>> {
        let updated = self
            .mutate("remove_tenant", self.repo.remove_tenant(room_id))
            .await?;
        Ok(self.reconcile(updated))
    }

    /// Delete a room. `Ok(false)` if it did not exist.
    pub async fn remove(&self, id: &RecordId) -> LodgeResult<bool> {
        let removed = self.mutate("remove", self.repo.delete(id)).await?;
        if removed {
            self.state.send_modify(|s| s.items.retain(|r| &r.meta.id != id));
        }
        Ok(removed)
    }

    /// Read one room straight from the repository, bypassing the cache.
    pub async fn get(&self, id: &RecordId) -> LodgeResult<Option<Room>> {
        self.mutate("get", self.repo.get_by_id(id)).await
    }

    // ---- Derived queries ----

    pub fn by_status(&self, status: RoomStatus) -> Vec<Room> {
        query::by_status(&self.state.borrow().items, status)
    }

    pub fn empty_rooms(&self) -> Vec<Room> {
        self.by_status(RoomStatus::Empty)
    }

    pub fn occupied_rooms(&self) -> Vec<Room> {
        self.by_status(RoomStatus::Occupied)
    }

    pub fn cleaning_rooms(&self) -> Vec<Room> {
        self.by_status(RoomStatus::Cleaning)
    }

    /// The cached room with `id`.
    pub fn find(&self, id: &RecordId) -> Option<Room> {
        query::find(&self.state.borrow().items, id).cloned()
    }

    pub fn status_counts(&self) -> StatusCounts {
        query::status_counts(&self.state.borrow().items)
    }

    async fn mutate<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = RepoResult<T>>,
    ) -> LodgeResult<T> {
        self.state.send_modify(|s| s.error = None);
        match fut.await {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(op, error = %e, "room operation failed");
                self.state.send_modify(|s| s.error = Some(e.to_string()));
                Err(e.into())
            }
        }
    }

    fn reconcile(&self, updated: Option<Room>) -> Option<Room> {
        if let Some(room) = &updated {
            self.state.send_modify(|s| s.upsert(room));
        }
        updated
    }
}

impl std::fmt::Debug for RoomStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("RoomStore")
            .field("key", &self.repo.key())
            .field("loading", &state.loading)
            .field("items", &state.items.len())
            .finish()
    }
}
