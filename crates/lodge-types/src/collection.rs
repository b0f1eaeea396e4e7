use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Current layout version written by [`CollectionEnvelope`].
pub const SCHEMA_VERSION: u32 = 1;

/// A persisted entity collection. Each collection is stored under one key.
///
/// Only `Rooms` has a record type today; the others reserve their keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Rooms,
    Tenants,
    Bills,
    Payments,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rooms => "rooms",
            Self::Tenants => "tenants",
            Self::Bills => "bills",
            Self::Payments => "payments",
        }
    }

    /// Storage key of this collection within `namespace`.
    pub fn key(&self, namespace: &str) -> String {
        format!("{namespace}:{}", self.name())
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// On-disk form of a collection.
///
/// Writes always produce the versioned form. Reads also accept a bare JSON
/// array, the layout used before the version field existed. Layouts newer
/// than [`SCHEMA_VERSION`] are refused by [`check_version`](Self::check_version)
/// so they are never rewritten in an older form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CollectionEnvelope<T> {
    Versioned {
        #[serde(rename = "schemaVersion")]
        schema_version: u32,
        records: Vec<T>,
    },
    Legacy(Vec<T>),
}

impl<T> CollectionEnvelope<T> {
    pub fn current(records: Vec<T>) -> Self {
        Self::Versioned {
            schema_version: SCHEMA_VERSION,
            records,
        }
    }

    pub fn schema_version(&self) -> u32 {
        match self {
            Self::Versioned { schema_version, .. } => *schema_version,
            Self::Legacy(_) => 0,
        }
    }

    /// Fail if the envelope was written by a newer layout.
    pub fn check_version(&self) -> Result<(), TypeError> {
        match self.schema_version() {
            found if found > SCHEMA_VERSION => Err(TypeError::UnsupportedSchema {
                found,
                supported: SCHEMA_VERSION,
            }),
            _ => Ok(()),
        }
    }

    pub fn into_records(self) -> Vec<T> {
        match self {
            Self::Versioned { records, .. } | Self::Legacy(records) => records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced() {
        assert_eq!(Collection::Rooms.key("lodge"), "lodge:rooms");
        assert_eq!(Collection::Payments.key("motel"), "motel:payments");
    }

    #[test]
    fn envelope_writes_version() {
        let env = CollectionEnvelope::current(vec![1, 2, 3]);
        let json = serde_json::to_string(&env).unwrap();
        assert_eq!(json, r#"{"schemaVersion":1,"records":[1,2,3]}"#);
    }

    #[test]
    fn envelope_reads_both_layouts() {
        let versioned: CollectionEnvelope<u32> =
            serde_json::from_str(r#"{"schemaVersion":1,"records":[4]}"#).unwrap();
        assert_eq!(versioned.schema_version(), 1);
        assert_eq!(versioned.into_records(), vec![4]);

        let legacy: CollectionEnvelope<u32> = serde_json::from_str("[5, 6]").unwrap();
        assert_eq!(legacy.schema_version(), 0);
        assert_eq!(legacy.into_records(), vec![5, 6]);
    }

    #[test]
    fn newer_schema_is_refused() {
        let newer: CollectionEnvelope<u32> =
            serde_json::from_str(r#"{"schemaVersion":2,"records":[1]}"#).unwrap();
        assert_eq!(
            newer.check_version(),
            Err(TypeError::UnsupportedSchema {
                found: 2,
                supported: SCHEMA_VERSION
            })
        );
        assert!(CollectionEnvelope::current(vec![1]).check_version().is_ok());
        assert!(CollectionEnvelope::Legacy(vec![1]).check_version().is_ok());
    }

    #[test]
    fn envelope_rejects_other_shapes() {
        assert!(serde_json::from_str::<CollectionEnvelope<u32>>(r#"{"rooms":[]}"#).is_err());
        assert!(serde_json::from_str::<CollectionEnvelope<u32>>("42").is_err());
    }
}
