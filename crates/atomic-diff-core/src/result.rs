//! Classification of a computed diff into per-item records

use crate::diff::PositionMap;
use crate::error::{DiffError, ListSide};
use crate::record::{Changed, Inserted, ItemDiffRecord, PositionChanged, Removed};
use crate::update::{ListUpdateSink, RawDiffOperation};
use std::sync::OnceLock;

/// Result of an atomic diff.
///
/// Holds both lists, the raw range operations and the position mapping.
/// Each record collection is computed on first access and cached; later
/// calls return the cached slice, including under concurrent first access.
#[derive(Debug)]
pub struct AtomicDiffResult<'a, T, P> {
    old_list: &'a [T],
    new_list: &'a [T],
    raw_operations: Vec<RawDiffOperation<P>>,
    position_map: PositionMap,
    insertions: OnceLock<Vec<Inserted<'a, T>>>,
    removals: OnceLock<Vec<Removed<'a, T>>>,
    changes: OnceLock<Vec<Changed<'a, T, P>>>,
    position_changes: OnceLock<Vec<PositionChanged<'a, T>>>,
}

impl<'a, T, P> AtomicDiffResult<'a, T, P> {
    pub(crate) fn new(
        old_list: &'a [T],
        new_list: &'a [T],
        raw_operations: Vec<RawDiffOperation<P>>,
        position_map: PositionMap,
    ) -> Self {
        Self {
            old_list,
            new_list,
            raw_operations,
            position_map,
            insertions: OnceLock::new(),
            removals: OnceLock::new(),
            changes: OnceLock::new(),
            position_changes: OnceLock::new(),
        }
    }

    pub fn old_list(&self) -> &'a [T] {
        self.old_list
    }

    pub fn new_list(&self) -> &'a [T] {
        self.new_list
    }

    /// Range operations in dispatch order
    pub fn raw_operations(&self) -> &[RawDiffOperation<P>] {
        &self.raw_operations
    }

    /// Map an old list index to the new list, `None` if the item is gone
    pub fn convert_old_position_to_new(
        &self,
        old_position: usize,
    ) -> Result<Option<usize>, DiffError> {
        let len = self.position_map.old_len();
        if old_position >= len {
            return Err(DiffError::PositionOutOfBounds {
                side: ListSide::Old,
                position: old_position,
                len,
            });
        }
        Ok(self.position_map.old_to_new(old_position))
    }

    /// Map a new list index to the old list, `None` if the item is new
    pub fn convert_new_position_to_old(
        &self,
        new_position: usize,
    ) -> Result<Option<usize>, DiffError> {
        let len = self.position_map.new_len();
        if new_position >= len {
            return Err(DiffError::PositionOutOfBounds {
                side: ListSide::New,
                position: new_position,
                len,
            });
        }
        Ok(self.position_map.new_to_old(new_position))
    }

    /// Items only present in the new list, by ascending new index
    pub fn insertions(&self) -> &[Inserted<'a, T>] {
        self.insertions.get_or_init(|| self.compute_insertions())
    }

    /// Items only present in the old list, by ascending old index
    pub fn removals(&self) -> &[Removed<'a, T>] {
        self.removals.get_or_init(|| self.compute_removals())
    }

    /// Matched items with equal content at a different index, by ascending
    /// new index
    pub fn position_changes(&self) -> &[PositionChanged<'a, T>] {
        self.position_changes
            .get_or_init(|| self.compute_position_changes())
    }

    /// `true` when the two lists are equivalent item for item
    pub fn is_empty(&self) -> bool {
        self.raw_operations.is_empty() && self.position_changes().is_empty()
    }

    fn compute_insertions(&self) -> Vec<Inserted<'a, T>> {
        let stage_moves = self.position_changes.get().is_none();
        let mut insertions = Vec::new();
        let mut position_changes = Vec::new();

        for (new_position, item) in self.new_list.iter().enumerate() {
            match self.position_map.new_to_old(new_position) {
                None => insertions.push(Inserted { item, new_position }),
                Some(old_position) if stage_moves => {
                    if let Some(record) = self.position_change_at(old_position, new_position) {
                        position_changes.push(record);
                    }
                }
                Some(_) => {}
            }
        }

        if stage_moves {
            // Lost race with a dedicated pass: both produce the same records.
            let _ = self.position_changes.set(position_changes);
        }
        tracing::trace!(count = insertions.len(), "computed insertion records");
        insertions
    }

    fn compute_removals(&self) -> Vec<Removed<'a, T>> {
        let removals: Vec<_> = self
            .old_list
            .iter()
            .enumerate()
            .filter(|(old_position, _)| self.position_map.old_to_new(*old_position).is_none())
            .map(|(old_position, item)| Removed { item, old_position })
            .collect();
        tracing::trace!(count = removals.len(), "computed removal records");
        removals
    }

    fn compute_position_changes(&self) -> Vec<PositionChanged<'a, T>> {
        let position_changes: Vec<_> = (0..self.new_list.len())
            .filter_map(|new_position| {
                let old_position = self.position_map.new_to_old(new_position)?;
                self.position_change_at(old_position, new_position)
            })
            .collect();
        tracing::trace!(
            count = position_changes.len(),
            "computed position change records"
        );
        position_changes
    }

    /// Content changes win over position changes
    fn position_change_at(
        &self,
        old_position: usize,
        new_position: usize,
    ) -> Option<PositionChanged<'a, T>> {
        if old_position == new_position || self.position_map.is_changed(old_position) {
            return None;
        }
        Some(PositionChanged {
            item: &self.new_list[new_position],
            old_position,
            new_position,
        })
    }
}

impl<'a, T, P: Clone> AtomicDiffResult<'a, T, P> {
    /// Matched items whose content differs.
    ///
    /// Records follow the dispatch order of the change ranges, not index
    /// order: with disjoint ranges the last one in the list comes first.
    pub fn changes(&self) -> &[Changed<'a, T, P>] {
        self.changes.get_or_init(|| self.compute_changes())
    }

    /// Changes, removals, insertions and position changes, in that order
    pub fn all_records(&self) -> Vec<ItemDiffRecord<'a, T, P>> {
        let changes = self.changes().iter().cloned().map(ItemDiffRecord::from);
        let removals = self.removals().iter().copied().map(ItemDiffRecord::from);
        let insertions = self.insertions().iter().copied().map(ItemDiffRecord::from);
        let position_changes = self
            .position_changes()
            .iter()
            .copied()
            .map(ItemDiffRecord::from);

        changes
            .chain(removals)
            .chain(insertions)
            .chain(position_changes)
            .collect()
    }

    /// Replay the raw operations into another sink
    pub fn dispatch_updates_to<S>(&self, sink: &mut S)
    where
        S: ListUpdateSink<P>,
    {
        for operation in &self.raw_operations {
            match operation {
                RawDiffOperation::Insert { position, count } => {
                    sink.on_inserted(*position, *count)
                }
                RawDiffOperation::Remove { position, count } => {
                    sink.on_removed(*position, *count)
                }
                RawDiffOperation::Change {
                    position,
                    count,
                    payload,
                } => sink.on_changed(*position, *count, payload.clone()),
            }
        }
    }

    fn compute_changes(&self) -> Vec<Changed<'a, T, P>> {
        let mut changes = Vec::new();
        for operation in &self.raw_operations {
            let RawDiffOperation::Change {
                position,
                count,
                payload,
            } = operation
            else {
                continue;
            };
            for old_position in *position..*position + *count {
                // Change ranges only ever cover matched items
                let Some(new_position) = self.position_map.old_to_new(old_position) else {
                    continue;
                };
                changes.push(Changed {
                    old_item: &self.old_list[old_position],
                    new_item: &self.new_list[new_position],
                    old_position,
                    new_position,
                    payload: payload.clone(),
                });
            }
        }
        tracing::trace!(count = changes.len(), "computed change records");
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::{by_key, ItemCallback};
    use crate::diff::calculate_atomic_diff;
    use crate::record::RecordKind;
    use crate::update::RawOperationRecorder;

    #[derive(Debug, Clone, PartialEq)]
    struct Tile {
        id: char,
        color: &'static str,
    }

    fn tile(id: char, color: &'static str) -> Tile {
        Tile { id, color }
    }

    struct ColorPayload;

    impl ItemCallback<Tile> for ColorPayload {
        type Payload = (&'static str, &'static str);

        fn are_items_the_same(&self, old_item: &Tile, new_item: &Tile) -> bool {
            old_item.id == new_item.id
        }

        fn are_contents_the_same(&self, old_item: &Tile, new_item: &Tile) -> bool {
            old_item == new_item
        }

        fn change_payload(&self, old_item: &Tile, new_item: &Tile) -> Option<Self::Payload> {
            Some((old_item.color, new_item.color))
        }
    }

    #[test]
    fn test_no_changes() {
        let tiles = vec![tile('a', "red"), tile('b', "blue")];
        let result = calculate_atomic_diff(&tiles, &tiles, &by_key(|t: &Tile| t.id));

        assert!(result.is_empty());
        assert!(result.all_records().is_empty());
        assert_eq!(result.convert_old_position_to_new(1), Ok(Some(1)));
    }

    #[test]
    fn test_payload_reaches_change_record() {
        let old = vec![tile('a', "red"), tile('b', "blue"), tile('c', "green")];
        let new = vec![tile('a', "red"), tile('b', "pink"), tile('c', "teal")];
        let result = calculate_atomic_diff(&old, &new, &ColorPayload);

        let changes = result.changes();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].old_position, 2);
        assert_eq!(changes[0].payload, Some(("green", "teal")));
        assert_eq!(changes[1].old_position, 1);
        assert_eq!(changes[1].payload, Some(("blue", "pink")));
    }

    #[test]
    fn test_swap_reports_position_changes_only() {
        let old = vec![tile('a', "red"), tile('b', "blue")];
        let new = vec![tile('b', "blue"), tile('a', "red")];
        let result = calculate_atomic_diff(&old, &new, &by_key(|t: &Tile| t.id));

        assert_eq!(
            result.position_changes(),
            &[
                PositionChanged {
                    item: &new[0],
                    old_position: 1,
                    new_position: 0
                },
                PositionChanged {
                    item: &new[1],
                    old_position: 0,
                    new_position: 1
                },
            ]
        );
        assert!(result.changes().is_empty());
        assert!(result.insertions().is_empty());
        assert!(result.removals().is_empty());
        assert!(!result.is_empty());
    }

    #[test]
    fn test_insertions_stage_position_changes() {
        let old = vec![tile('a', "red"), tile('b', "blue")];
        let new = vec![tile('x', "gray"), tile('a', "red"), tile('b', "blue")];
        let result = calculate_atomic_diff(&old, &new, &by_key(|t: &Tile| t.id));

        assert!(result.position_changes.get().is_none());
        assert_eq!(result.insertions().len(), 1);
        let staged = result.position_changes.get().map(Vec::len);
        assert_eq!(staged, Some(2));
        assert_eq!(result.position_changes()[0].old_position, 0);
        assert_eq!(result.position_changes()[0].new_position, 1);
    }

    #[test]
    fn test_dedicated_position_pass_matches_staged() {
        let old = vec![tile('a', "red"), tile('b', "blue"), tile('c', "green")];
        let new = vec![tile('c', "green"), tile('z', "black"), tile('a', "red")];
        let callback = by_key(|t: &Tile| t.id);

        let staged = calculate_atomic_diff(&old, &new, &callback);
        staged.insertions();
        let dedicated = calculate_atomic_diff(&old, &new, &callback);

        assert_eq!(staged.position_changes(), dedicated.position_changes());
    }

    #[test]
    fn test_queries_are_memoized() {
        let old = vec![tile('a', "red"), tile('b', "blue")];
        let new = vec![tile('b', "navy")];
        let result = calculate_atomic_diff(&old, &new, &by_key(|t: &Tile| t.id));

        let first = result.changes().as_ptr();
        let second = result.changes().as_ptr();
        assert_eq!(first, second);
        assert_eq!(result.all_records(), result.all_records());
    }

    #[test]
    fn test_concurrent_first_access_shares_one_computation() {
        let old = vec![tile('a', "red"), tile('b', "blue"), tile('c', "green")];
        let new = vec![tile('c', "green"), tile('x', "gray"), tile('a', "red")];
        let result = calculate_atomic_diff(&old, &new, &by_key(|t: &Tile| t.id));

        let seen: Vec<(usize, usize)> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let result = &result;
                    scope.spawn(move || {
                        // Alternate which collection is touched first
                        if i % 2 == 0 {
                            let insertions = result.insertions().as_ptr() as usize;
                            (insertions, result.position_changes().as_ptr() as usize)
                        } else {
                            let moves = result.position_changes().as_ptr() as usize;
                            (result.insertions().as_ptr() as usize, moves)
                        }
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect()
        });

        assert!(seen.iter().all(|pointers| *pointers == seen[0]));
        assert_eq!(result.insertions().len(), 1);
        assert_eq!(result.position_changes().len(), 2);
    }

    #[test]
    fn test_all_records_order() {
        let old = vec![tile('a', "red"), tile('b', "blue"), tile('c', "green")];
        let new = vec![tile('c', "green"), tile('b', "navy"), tile('d', "white")];
        let result = calculate_atomic_diff(&old, &new, &by_key(|t: &Tile| t.id));

        let kinds: Vec<RecordKind> = result.all_records().iter().map(|r| r.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                RecordKind::Changed,
                RecordKind::Removed,
                RecordKind::Inserted,
                RecordKind::PositionChanged,
            ]
        );
    }

    #[test]
    fn test_position_queries_reject_out_of_bounds() {
        let old = vec![tile('a', "red")];
        let new: Vec<Tile> = Vec::new();
        let result = calculate_atomic_diff(&old, &new, &by_key(|t: &Tile| t.id));

        assert_eq!(result.convert_old_position_to_new(0), Ok(None));
        assert_eq!(
            result.convert_old_position_to_new(1),
            Err(DiffError::PositionOutOfBounds {
                side: ListSide::Old,
                position: 1,
                len: 1
            })
        );
        assert_eq!(
            result.convert_new_position_to_old(0),
            Err(DiffError::PositionOutOfBounds {
                side: ListSide::New,
                position: 0,
                len: 0
            })
        );
    }

    #[test]
    fn test_dispatch_updates_to_replays_raw_operations() {
        let old = vec![tile('a', "red"), tile('b', "blue")];
        let new = vec![tile('a', "pink"), tile('c', "gray")];
        let result = calculate_atomic_diff(&old, &new, &by_key(|t: &Tile| t.id));

        let mut recorder = RawOperationRecorder::new();
        result.dispatch_updates_to(&mut recorder);
        assert_eq!(recorder.into_operations(), result.raw_operations());
    }
}
