//! Ordered in-memory device collection.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::error::{InvError, Result};
use crate::record::DeviceRecord;

/// Minimum length of an id prefix accepted as a selector.
pub const MIN_ID_PREFIX: usize = 4;

/// Result of an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "position", rename_all = "snake_case")]
pub enum Upserted {
    /// Appended at this position.
    Inserted(usize),
    /// Replaced in place at this position.
    Replaced(usize),
}

impl Upserted {
    #[must_use]
    pub const fn position(self) -> usize {
        match self {
            Self::Inserted(pos) | Self::Replaced(pos) => pos,
        }
    }
}

/// Ordered sequence of records, unique by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DeviceCollection {
    records: Vec<DeviceRecord>,
}

impl<'de> Deserialize<'de> for DeviceCollection {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<DeviceRecord>::deserialize(deserializer).map(Self::from_records)
    }
}

impl DeviceCollection {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection, giving a new id to any record whose id repeats
    /// an earlier one.
    ///
    /// The new id is derived from the repeated id and the record's position,
    /// so the same input always yields the same ids.
    #[must_use]
    pub fn from_records(mut records: Vec<DeviceRecord>) -> Self {
        let mut seen = HashSet::with_capacity(records.len());
        for (pos, record) in records.iter_mut().enumerate() {
            if seen.insert(record.id) {
                continue;
            }
            let mut fresh = Uuid::new_v5(&record.id, pos.to_string().as_bytes());
            while !seen.insert(fresh) {
                fresh = Uuid::new_v5(&fresh, pos.to_string().as_bytes());
            }
            warn!(position = pos, old = %record.id, new = %fresh, "Duplicate device id, reassigning");
            record.id = fresh;
        }
        Self { records }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[DeviceRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DeviceRecord> {
        self.records.iter()
    }

    /// Record at a position.
    #[must_use]
    pub fn at(&self, position: usize) -> Option<&DeviceRecord> {
        self.records.get(position)
    }

    /// Record with the given id.
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&DeviceRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Position of the record with the given id.
    #[must_use]
    pub fn position_of(&self, id: Uuid) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    /// Replace the record with the same id in place, or append it.
    pub fn upsert(&mut self, record: DeviceRecord) -> Upserted {
        if let Some(pos) = self.position_of(record.id) {
            debug!(id = %record.id, position = pos, "Replacing device");
            self.records[pos] = record;
            Upserted::Replaced(pos)
        } else {
            let pos = self.records.len();
            debug!(id = %record.id, position = pos, "Appending device");
            self.records.push(record);
            Upserted::Inserted(pos)
        }
    }

    /// Remove the records at the given positions, keeping the order of the
    /// rest. Positions past the end are ignored.
    ///
    /// Returns the removed records in their original order.
    pub fn remove(&mut self, positions: &BTreeSet<usize>) -> Vec<DeviceRecord> {
        if positions.is_empty() {
            return Vec::new();
        }

        let mut removed = Vec::with_capacity(positions.len());
        let mut kept = Vec::with_capacity(self.records.len());
        for (pos, record) in std::mem::take(&mut self.records).into_iter().enumerate() {
            if positions.contains(&pos) {
                removed.push(record);
            } else {
                kept.push(record);
            }
        }
        self.records = kept;

        debug!(removed = removed.len(), remaining = self.records.len(), "Removed devices");
        removed
    }

    /// Move the record at `from` so that it ends up at `to`.
    ///
    /// `to` is clamped to the last position. Returns false, leaving the
    /// collection unchanged, if `from` is out of range.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        if from >= self.records.len() {
            trace!(from, len = self.records.len(), "Reorder source out of range");
            return false;
        }
        let to = to.min(self.records.len() - 1);
        if from != to {
            let record = self.records.remove(from);
            self.records.insert(to, record);
        }
        debug!(from, to, "Moved device");
        true
    }

    /// Resolve a user-supplied selector to a position.
    ///
    /// All-digit selectors are positions. Anything else must be a full id
    /// or an id prefix of at least [`MIN_ID_PREFIX`] characters matching
    /// exactly one record.
    pub fn resolve(&self, selector: &str) -> Result<usize> {
        let selector = selector.trim();

        if !selector.is_empty() && selector.chars().all(|c| c.is_ascii_digit()) {
            let index: usize = selector.parse().map_err(|_| InvError::DeviceNotFound {
                selector: selector.to_string(),
            })?;
            if index >= self.records.len() {
                return Err(InvError::InvalidPosition {
                    index,
                    len: self.records.len(),
                });
            }
            return Ok(index);
        }

        if let Ok(id) = Uuid::parse_str(selector) {
            return self.position_of(id).ok_or_else(|| InvError::DeviceNotFound {
                selector: selector.to_string(),
            });
        }

        let prefix = selector.to_ascii_lowercase().replace('-', "");
        if prefix.len() < MIN_ID_PREFIX {
            return Err(InvError::DeviceNotFound {
                selector: selector.to_string(),
            });
        }

        let matches: Vec<usize> = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.id.simple().to_string().starts_with(&prefix))
            .map(|(pos, _)| pos)
            .collect();

        match matches.as_slice() {
            [pos] => Ok(*pos),
            [] => Err(InvError::DeviceNotFound {
                selector: selector.to_string(),
            }),
            _ => Err(InvError::AmbiguousSelector {
                selector: selector.to_string(),
                ids: matches
                    .iter()
                    .map(|&pos| self.records[pos].short_id())
                    .collect(),
            }),
        }
    }
}

impl From<Vec<DeviceRecord>> for DeviceCollection {
    fn from(records: Vec<DeviceRecord>) -> Self {
        Self::from_records(records)
    }
}

impl<'a> IntoIterator for &'a DeviceCollection {
    type Item = &'a DeviceRecord;
    type IntoIter = std::slice::Iter<'a, DeviceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
