//! Atomic Diff Core - per-item list diffing for animated updates
//!
//! This library computes the minimal edit script between two lists of items
//! and classifies it into insertions, removals, content changes and position
//! changes, so a UI can animate each item instead of redrawing the list.

pub mod callback;
pub mod diff;
pub mod error;
pub mod record;
pub mod result;
pub mod update;

pub use callback::{by_key, ItemCallback, KeyedCallback};
pub use diff::{calculate_atomic_diff, AtomicDiffEngine, DiffOptions};
pub use error::{DiffError, ListSide};
pub use record::{Changed, Inserted, ItemDiffRecord, PositionChanged, RecordKind, Removed};
pub use result::AtomicDiffResult;
pub use update::{BatchingSink, ListUpdateSink, RawDiffOperation, RawOperationRecorder};
