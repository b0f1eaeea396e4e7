//! The room entity and its status state machine.
//!
//! Generic edits ([`RoomPatch`]) cannot reach status or tenant; those only
//! change through the tagged transitions in [`RoomChange`]. The tenant
//! transitions move both fields together, so a room let or vacated through
//! them is `Occupied` exactly when it has a current tenant.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::collection::Collection;
use crate::error::TypeError;
use crate::id::TenantId;
use crate::record::{Draft, Patch, Record, RecordMeta};

/// Occupancy status of a room.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    /// Ready to be let.
    #[default]
    Empty,
    /// Has a current tenant.
    Occupied,
    /// Vacated and awaiting cleaning before it can be let again.
    Cleaning,
}

impl RoomStatus {
    pub const ALL: [RoomStatus; 3] = [Self::Empty, Self::Occupied, Self::Cleaning];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Occupied => "occupied",
            Self::Cleaning => "cleaning",
        }
    }
}

impl FromStr for RoomStatus {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TypeError::InvalidStatus(s.to_string()))
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rentable room.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub room_number: String,
    #[serde(default)]
    pub status: RoomStatus,
    /// Monthly price in currency units.
    pub price: f64,
    #[serde(default)]
    pub current_tenant_id: Option<TenantId>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amenities: Vec<String>,
}

impl Room {
    pub fn is_occupied(&self) -> bool {
        self.status == RoomStatus::Occupied
    }

    /// `true` when status and tenant agree: occupied rooms have a tenant,
    /// all other rooms have none.
    pub fn is_consistent(&self) -> bool {
        self.is_occupied() == self.current_tenant_id.is_some()
    }
}

impl Record for Room {
    const COLLECTION: Collection = Collection::Rooms;

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }
}

/// Data for a room that has not been created yet.
///
/// New rooms always start `Empty` with no tenant.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoom {
    pub room_number: String,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amenities: Vec<String>,
}

impl NewRoom {
    pub fn new(room_number: impl Into<String>, price: f64) -> Self {
        Self {
            room_number: room_number.into(),
            price,
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_amenities<I, S>(mut self, amenities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.amenities = amenities.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> Result<(), TypeError> {
        validate_room_number(&self.room_number)?;
        validate_price(self.price)
    }
}

impl Draft for NewRoom {
    type Record = Room;

    fn validate(&self) -> Result<(), TypeError> {
        NewRoom::validate(self)
    }

    fn build(self, meta: RecordMeta) -> Room {
        Room {
            meta,
            room_number: self.room_number.trim().to_string(),
            status: RoomStatus::Empty,
            price: self.price,
            current_tenant_id: None,
            description: self.description.trim().to_string(),
            amenities: self.amenities,
        }
    }
}

/// Field edits for an existing room. `None` leaves a field unchanged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPatch {
    pub room_number: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub amenities: Option<Vec<String>>,
}

impl RoomPatch {
    pub fn is_empty(&self) -> bool {
        self.room_number.is_none()
            && self.price.is_none()
            && self.description.is_none()
            && self.amenities.is_none()
    }

    pub fn validate(&self) -> Result<(), TypeError> {
        if let Some(number) = &self.room_number {
            validate_room_number(number)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        Ok(())
    }
}

impl Patch<Room> for RoomPatch {
    fn validate(&self) -> Result<(), TypeError> {
        RoomPatch::validate(self)
    }

    fn apply(self, room: &mut Room) {
        if let Some(number) = self.room_number {
            room.room_number = number.trim().to_string();
        }
        if let Some(price) = self.price {
            room.price = price;
        }
        if let Some(description) = self.description {
            room.description = description.trim().to_string();
        }
        if let Some(amenities) = self.amenities {
            room.amenities = amenities;
        }
    }
}

/// A tagged change to a room.
///
/// `SetStatus` touches the status alone. `AssignTenant` and `RemoveTenant`
/// always set status and tenant together.
#[derive(Clone, Debug, PartialEq)]
pub enum RoomChange {
    /// Generic field edit.
    Edit(RoomPatch),
    /// Set status directly. The current tenant is left as it is.
    SetStatus(RoomStatus),
    /// Let the room to a tenant; always pairs the tenant with `Occupied`.
    AssignTenant(TenantId),
    /// Vacate the room. A vacated room always needs cleaning before it can
    /// be let again, so it moves to `Cleaning` rather than `Empty`.
    RemoveTenant,
}

impl RoomChange {
    pub fn validate(&self) -> Result<(), TypeError> {
        match self {
            Self::Edit(patch) => patch.validate(),
            Self::SetStatus(_) | Self::AssignTenant(_) | Self::RemoveTenant => Ok(()),
        }
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Edit(_) => "edit",
            Self::SetStatus(_) => "set_status",
            Self::AssignTenant(_) => "assign_tenant",
            Self::RemoveTenant => "remove_tenant",
        }
    }
}

impl Patch<Room> for RoomChange {
    fn validate(&self) -> Result<(), TypeError> {
        RoomChange::validate(self)
    }

    fn apply(self, room: &mut Room) {
        match self {
            Self::Edit(patch) => patch.apply(room),
            Self::SetStatus(status) => room.status = status,
            Self::AssignTenant(tenant) => {
                room.current_tenant_id = Some(tenant);
                room.status = RoomStatus::Occupied;
            }
            Self::RemoveTenant => {
                room.current_tenant_id = None;
                room.status = RoomStatus::Cleaning;
            }
        }
    }
}

fn validate_room_number(number: &str) -> Result<(), TypeError> {
    if number.trim().is_empty() {
        return Err(TypeError::EmptyRoomNumber);
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<(), TypeError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(TypeError::InvalidPrice(price.to_string()));
    }
    Ok(())
}
