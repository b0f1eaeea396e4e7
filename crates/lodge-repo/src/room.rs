use std::sync::Arc;

use lodge_store::KvStore;
use lodge_types::{NewRoom, RecordId, Room, RoomChange, RoomPatch, RoomStatus, TenantId};
use tracing::debug;

use crate::collection::CollectionRepository;
use crate::error::RepoResult;

/// Repository for the `rooms` collection.
///
/// Besides plain CRUD it exposes the status transitions. Each transition is a
/// tagged [`RoomChange`]; [`update`](Self::update) only accepts field edits,
/// so it cannot desynchronize status and tenant.
#[derive(Debug)]
pub struct RoomRepository {
    rooms: CollectionRepository<Room>,
}

impl RoomRepository {
    pub fn new(store: Arc<dyn KvStore>, namespace: &str) -> Self {
        Self {
            rooms: CollectionRepository::new(store, namespace),
        }
    }

    /// The storage key of the rooms collection.
    pub fn key(&self) -> &str {
        self.rooms.key()
    }

    pub async fn list_all(&self) -> RepoResult<Vec<Room>> {
        self.rooms.list_all().await
    }

    pub async fn get_by_id(&self, id: &RecordId) -> RepoResult<Option<Room>> {
        self.rooms.get_by_id(id).await
    }

    /// Create an `Empty` room with no tenant.
    pub async fn create(&self, room: NewRoom) -> RepoResult<Room> {
        self.rooms.create(room).await
    }

    /// Edit room fields. Returns `Ok(None)` if the room does not exist.
    pub async fn update(&self, id: &RecordId, patch: RoomPatch) -> RepoResult<Option<Room>> {
        self.apply(id, RoomChange::Edit(patch)).await
    }

    pub async fn delete(&self, id: &RecordId) -> RepoResult<bool> {
        self.rooms.delete(id).await
    }

    /// Set the status directly. Only the status changes; any current tenant
    /// is kept.
    pub async fn change_status(
        &self,
        id: &RecordId,
        status: RoomStatus,
    ) -> RepoResult<Option<Room>> {
        self.apply(id, RoomChange::SetStatus(status)).await
    }

    /// [`change_status`](Self::change_status) from a status name such as
    /// `"cleaning"`. Unknown names are an invalid argument and nothing is
    /// read or written.
    pub async fn change_status_named(
        &self,
        id: &RecordId,
        status: &str,
    ) -> RepoResult<Option<Room>> {
        let status: RoomStatus = status.parse()?;
        self.change_status(id, status).await
    }

    /// Let the room to `tenant_id` and mark it `Occupied`.
    ///
    /// The tenant id is a weak reference and is not checked.
    pub async fn assign_tenant(
        &self,
        room_id: &RecordId,
        tenant_id: TenantId,
    ) -> RepoResult<Option<Room>> {
        self.apply(room_id, RoomChange::AssignTenant(tenant_id))
            .await
    }

    /// Clear the tenant and move the room to `Cleaning`.
    pub async fn remove_tenant(&self, room_id: &RecordId) -> RepoResult<Option<Room>> {
        self.apply(room_id, RoomChange::RemoveTenant).await
    }

    /// Apply any tagged change.
    pub async fn apply(&self, id: &RecordId, change: RoomChange) -> RepoResult<Option<Room>> {
        debug!(%id, change = change.name(), "applying room change");
        self.rooms.update(id, change).await
    }
}
