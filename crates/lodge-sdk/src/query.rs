//! Pure queries over a cached rooms snapshot. None of these perform I/O.

use lodge_types::{RecordId, Room, RoomStatus};
use serde::Serialize;

/// Rooms with the given status, in cache order.
pub fn by_status(rooms: &[Room], status: RoomStatus) -> Vec<Room> {
    rooms.iter().filter(|r| r.status == status).cloned().collect()
}

/// The cached room with `id`.
pub fn find<'a>(rooms: &'a [Room], id: &RecordId) -> Option<&'a Room> {
    rooms.iter().find(|r| &r.meta.id == id)
}

/// Number of rooms per status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub empty: usize,
    pub occupied: usize,
    pub cleaning: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.empty + self.occupied + self.cleaning
    }

    pub fn get(&self, status: RoomStatus) -> usize {
        match status {
            RoomStatus::Empty => self.empty,
            RoomStatus::Occupied => self.occupied,
            RoomStatus::Cleaning => self.cleaning,
        }
    }

    /// Fraction of rooms that are occupied, or `0.0` with no rooms.
    pub fn occupancy(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.occupied as f64 / total as f64,
        }
    }
}

pub fn status_counts(rooms: &[Room]) -> StatusCounts {
    rooms
        .iter()
        .fold(StatusCounts::default(), |mut counts, room| {
            match room.status {
                RoomStatus::Empty => counts.empty += 1,
                RoomStatus::Occupied => counts.occupied += 1,
                RoomStatus::Cleaning => counts.cleaning += 1,
            }
            counts
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodge_types::{stamp_new, NewRoom, Patch, RoomChange};

    fn rooms() -> Vec<Room> {
        let mut out = Vec::new();
        for (number, change) in [
            ("1", None),
            ("2", Some(RoomChange::AssignTenant(RecordId::new("t1").unwrap()))),
            ("3", Some(RoomChange::RemoveTenant)),
            ("4", None),
        ] {
            let mut room = stamp_new(NewRoom::new(number, 100.0));
            if let Some(change) = change {
                change.apply(&mut room);
            }
            out.push(room);
        }
        out
    }

    #[test]
    fn filters_by_status_in_order() {
        let rooms = rooms();
        let empty_rooms = by_status(&rooms, RoomStatus::Empty);
        let empty: Vec<&str> = empty_rooms
            .iter()
            .map(|r| r.room_number.as_str())
            .collect();
        assert_eq!(empty, vec!["1", "4"]);
        assert_eq!(by_status(&rooms, RoomStatus::Occupied).len(), 1);
        assert_eq!(by_status(&rooms, RoomStatus::Cleaning)[0].room_number, "3");
    }

    #[test]
    fn finds_by_id() {
        let rooms = rooms();
        let id = rooms[2].meta.id.clone();
        assert_eq!(find(&rooms, &id).map(|r| r.room_number.as_str()), Some("3"));
        assert!(find(&rooms, &RecordId::new("nope").unwrap()).is_none());
    }

    #[test]
    fn counts() {
        let counts = status_counts(&rooms());
        assert_eq!(
            counts,
            StatusCounts {
                empty: 2,
                occupied: 1,
                cleaning: 1
            }
        );
        assert_eq!(counts.total(), 4);
        assert_eq!(counts.get(RoomStatus::Occupied), 1);
        assert!((counts.occupancy() - 0.25).abs() < f64::EPSILON);
        assert_eq!(status_counts(&[]).occupancy(), 0.0);
    }
}
