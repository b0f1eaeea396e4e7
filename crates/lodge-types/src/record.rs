//! The record factory.
//!
//! Every persisted entity embeds a [`RecordMeta`] carrying its identity and
//! timestamps. New records are built from a [`Draft`] by [`stamp_new`];
//! existing records are changed by applying a [`Patch`] through
//! [`stamp_update`]. Neither drafts nor patches can reach the meta, so a
//! patch can never reassign an id or rewrite a creation time.

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::collection::Collection;
use crate::error::TypeError;
use crate::id::RecordId;

/// Wall-clock timestamp, serialized as an RFC 3339 string.
pub type Timestamp = DateTime<Utc>;

/// Identity and lifecycle timestamps shared by all records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMeta {
    pub id: RecordId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl RecordMeta {
    /// Fresh meta with a new id and `created_at == updated_at == now`.
    pub fn fresh() -> Self {
        Self::fresh_at(Utc::now())
    }

    pub fn fresh_at(now: Timestamp) -> Self {
        Self {
            id: RecordId::generate(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Advance `updated_at` to `now`, or by one microsecond past its current
    /// value when the clock has not moved.
    pub fn touch_at(&mut self, now: Timestamp) {
        let floor = self.updated_at + Duration::microseconds(1);
        self.updated_at = now.max(floor);
    }
}

/// A persisted entity.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The collection this record type is stored in.
    const COLLECTION: Collection;

    fn meta(&self) -> &RecordMeta;

    fn meta_mut(&mut self) -> &mut RecordMeta;

    fn id(&self) -> &RecordId {
        &self.meta().id
    }

    fn created_at(&self) -> Timestamp {
        self.meta().created_at
    }

    fn updated_at(&self) -> Timestamp {
        self.meta().updated_at
    }
}

/// Caller-supplied data for a record that does not exist yet.
pub trait Draft {
    type Record: Record;

    /// Reject drafts that would produce an invalid record.
    fn validate(&self) -> Result<(), TypeError> {
        Ok(())
    }

    /// Combine the draft with defaults and the given meta.
    fn build(self, meta: RecordMeta) -> Self::Record;
}

/// A change to an existing record. Implementations only touch entity fields.
pub trait Patch<R: Record> {
    /// Reject patches that would leave the record invalid.
    fn validate(&self) -> Result<(), TypeError> {
        Ok(())
    }

    fn apply(self, record: &mut R);
}

/// Stamp a new record with a fresh id and `created_at = updated_at = now`.
pub fn stamp_new<D: Draft>(draft: D) -> D::Record {
    draft.build(RecordMeta::fresh())
}

/// Apply `patch` over a copy of `existing` and refresh `updated_at`.
pub fn stamp_update<R: Record, P: Patch<R>>(existing: &R, patch: P) -> R {
    let mut record = existing.clone();
    patch.apply(&mut record);
    record.meta_mut().touch_at(Utc::now());
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::{NewRoom, Room, RoomPatch};
    use proptest::prelude::*;

    fn draft() -> NewRoom {
        NewRoom::new("101", 1_500_000.0)
    }

    #[test]
    fn stamp_new_sets_equal_timestamps() {
        let room: Room = stamp_new(draft());
        assert_eq!(room.created_at(), room.updated_at());
        assert!(!room.id().as_str().is_empty());
    }

    #[test]
    fn stamp_new_assigns_distinct_ids() {
        let a = stamp_new(draft());
        let b = stamp_new(draft());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn stamp_update_keeps_identity() {
        let room = stamp_new(draft());
        let patch = RoomPatch {
            room_number: Some("102".into()),
            ..Default::default()
        };
        let updated = stamp_update(&room, patch);
        assert_eq!(updated.id(), room.id());
        assert_eq!(updated.created_at(), room.created_at());
        assert!(updated.updated_at() > room.updated_at());
        assert_eq!(updated.room_number, "102");
    }

    #[test]
    fn touch_advances_when_clock_is_behind() {
        let now = Utc::now();
        let mut meta = RecordMeta::fresh_at(now);
        meta.touch_at(now - Duration::seconds(10));
        assert_eq!(meta.updated_at, now + Duration::microseconds(1));
        assert_eq!(meta.created_at, now);
    }

    #[test]
    fn meta_serializes_camel_case() {
        let meta = RecordMeta::fresh();
        let json = serde_json::to_value(&meta).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json["createdAt"].is_string());
    }

    proptest! {
        #[test]
        fn repeated_updates_never_touch_identity(prices in proptest::collection::vec(1.0f64..1e9, 1..20)) {
            let original = stamp_new(draft());
            let mut current = original.clone();
            for price in prices {
                let next = stamp_update(&current, RoomPatch { price: Some(price), ..Default::default() });
                prop_assert!(next.updated_at() > current.updated_at());
                prop_assert_eq!(next.id(), original.id());
                prop_assert_eq!(next.created_at(), original.created_at());
                current = next;
            }
        }
    }
}
