//! Per-item diff records

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a per-item record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Same item, different content
    Changed,
    /// Only present in the old list
    Removed,
    /// Only present in the new list
    Inserted,
    /// Same item and content at a different index
    PositionChanged,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Changed => "changed",
            RecordKind::Removed => "removed",
            RecordKind::Inserted => "inserted",
            RecordKind::PositionChanged => "position_changed",
        };
        f.write_str(name)
    }
}

/// An item that exists only in the new list
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Inserted<'a, T> {
    pub item: &'a T,
    pub new_position: usize,
}

/// An item that exists only in the old list
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Removed<'a, T> {
    pub item: &'a T,
    pub old_position: usize,
}

/// A matched pair whose content differs.
///
/// The pair may also sit at different indices; the position delta is not
/// reported separately.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Changed<'a, T, P> {
    pub old_item: &'a T,
    pub new_item: &'a T,
    pub old_position: usize,
    pub new_position: usize,
    pub payload: Option<P>,
}

/// A matched pair with equal content at different indices
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct PositionChanged<'a, T> {
    pub item: &'a T,
    pub old_position: usize,
    pub new_position: usize,
}

/// Any of the four record kinds
#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemDiffRecord<'a, T, P> {
    Changed(Changed<'a, T, P>),
    Removed(Removed<'a, T>),
    Inserted(Inserted<'a, T>),
    PositionChanged(PositionChanged<'a, T>),
}

impl<T, P> ItemDiffRecord<'_, T, P> {
    pub fn kind(&self) -> RecordKind {
        match self {
            ItemDiffRecord::Changed(_) => RecordKind::Changed,
            ItemDiffRecord::Removed(_) => RecordKind::Removed,
            ItemDiffRecord::Inserted(_) => RecordKind::Inserted,
            ItemDiffRecord::PositionChanged(_) => RecordKind::PositionChanged,
        }
    }

    /// Index in the old list, if the record has one
    pub fn old_position(&self) -> Option<usize> {
        match self {
            ItemDiffRecord::Changed(c) => Some(c.old_position),
            ItemDiffRecord::Removed(r) => Some(r.old_position),
            ItemDiffRecord::Inserted(_) => None,
            ItemDiffRecord::PositionChanged(p) => Some(p.old_position),
        }
    }

    /// Index in the new list, if the record has one
    pub fn new_position(&self) -> Option<usize> {
        match self {
            ItemDiffRecord::Changed(c) => Some(c.new_position),
            ItemDiffRecord::Removed(_) => None,
            ItemDiffRecord::Inserted(i) => Some(i.new_position),
            ItemDiffRecord::PositionChanged(p) => Some(p.new_position),
        }
    }
}

// Records only hold references and indices, so cloning never needs `T: Clone`.

impl<T> Clone for Inserted<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Inserted<'_, T> {}

impl<T> Clone for Removed<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Removed<'_, T> {}

impl<T> Clone for PositionChanged<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PositionChanged<'_, T> {}

impl<T, P: Clone> Clone for Changed<'_, T, P> {
    fn clone(&self) -> Self {
        Self {
            old_item: self.old_item,
            new_item: self.new_item,
            old_position: self.old_position,
            new_position: self.new_position,
            payload: self.payload.clone(),
        }
    }
}

impl<T, P: Clone> Clone for ItemDiffRecord<'_, T, P> {
    fn clone(&self) -> Self {
        match self {
            ItemDiffRecord::Changed(c) => ItemDiffRecord::Changed(c.clone()),
            ItemDiffRecord::Removed(r) => ItemDiffRecord::Removed(*r),
            ItemDiffRecord::Inserted(i) => ItemDiffRecord::Inserted(*i),
            ItemDiffRecord::PositionChanged(p) => ItemDiffRecord::PositionChanged(*p),
        }
    }
}

impl<'a, T, P> From<Changed<'a, T, P>> for ItemDiffRecord<'a, T, P> {
    fn from(record: Changed<'a, T, P>) -> Self {
        ItemDiffRecord::Changed(record)
    }
}

impl<'a, T, P> From<Removed<'a, T>> for ItemDiffRecord<'a, T, P> {
    fn from(record: Removed<'a, T>) -> Self {
        ItemDiffRecord::Removed(record)
    }
}

impl<'a, T, P> From<Inserted<'a, T>> for ItemDiffRecord<'a, T, P> {
    fn from(record: Inserted<'a, T>) -> Self {
        ItemDiffRecord::Inserted(record)
    }
}

impl<'a, T, P> From<PositionChanged<'a, T>> for ItemDiffRecord<'a, T, P> {
    fn from(record: PositionChanged<'a, T>) -> Self {
        ItemDiffRecord::PositionChanged(record)
    }
}
