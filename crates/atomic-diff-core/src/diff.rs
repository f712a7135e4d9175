//! Diff computation engine

use crate::callback::ItemCallback;
use crate::result::AtomicDiffResult;
use crate::update::{BatchingSink, ListUpdateSink, RawOperationRecorder};
use serde::{Deserialize, Serialize};
use similar::algorithms::{myers, DiffHook};
use std::convert::Infallible;
use std::marker::PhantomData;

/// Settings for [`AtomicDiffEngine`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Pair removed and inserted items that share an identity
    pub detect_moves: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self { detect_moves: true }
    }
}

/// A run of items matched by the edit script, `size` long, starting at
/// `x` in the old list and `y` in the new list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Snake {
    pub x: usize,
    pub y: usize,
    pub size: usize,
}

impl Snake {
    const ROOT: Snake = Snake {
        x: 0,
        y: 0,
        size: 0,
    };
}

/// What happened to an item of the old list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OldStatus {
    Removed,
    /// Matched by the edit script
    Kept { new: usize, changed: bool },
    /// Paired with an insertion by move detection
    Moved { new: usize, changed: bool },
}

/// Old/new index correspondence derived from the edit script
#[derive(Debug, Clone)]
pub(crate) struct PositionMap {
    old: Vec<OldStatus>,
    new_to_old: Vec<Option<usize>>,
}

impl PositionMap {
    fn from_snakes<T, C>(old: &[T], new: &[T], callback: &C, snakes: &[Snake]) -> Self
    where
        C: ItemCallback<T>,
    {
        let mut map = Self {
            old: vec![OldStatus::Removed; old.len()],
            new_to_old: vec![None; new.len()],
        };
        for snake in snakes {
            for offset in 0..snake.size {
                let (x, y) = (snake.x + offset, snake.y + offset);
                let changed = !callback.are_contents_the_same(&old[x], &new[y]);
                map.old[x] = OldStatus::Kept { new: y, changed };
                map.new_to_old[y] = Some(x);
            }
        }
        map
    }

    /// Pair every removed item with the first unmatched new item of the same
    /// identity. Returns the number of pairs made.
    fn detect_moves<T, C>(&mut self, old: &[T], new: &[T], callback: &C) -> usize
    where
        C: ItemCallback<T>,
    {
        let mut unmatched_new: Vec<usize> = (0..new.len())
            .filter(|&y| self.new_to_old[y].is_none())
            .collect();
        let mut moves = 0;

        for x in 0..old.len() {
            if unmatched_new.is_empty() {
                break;
            }
            if self.old[x] != OldStatus::Removed {
                continue;
            }
            let Some(slot) = unmatched_new
                .iter()
                .position(|&y| callback.are_items_the_same(&old[x], &new[y]))
            else {
                continue;
            };
            let y = unmatched_new.remove(slot);
            let changed = !callback.are_contents_the_same(&old[x], &new[y]);
            self.old[x] = OldStatus::Moved { new: y, changed };
            self.new_to_old[y] = Some(x);
            moves += 1;
        }
        moves
    }

    pub(crate) fn old_len(&self) -> usize {
        self.old.len()
    }

    pub(crate) fn new_len(&self) -> usize {
        self.new_to_old.len()
    }

    pub(crate) fn status(&self, old_position: usize) -> OldStatus {
        self.old[old_position]
    }

    pub(crate) fn old_to_new(&self, old_position: usize) -> Option<usize> {
        match self.old[old_position] {
            OldStatus::Removed => None,
            OldStatus::Kept { new, .. } | OldStatus::Moved { new, .. } => Some(new),
        }
    }

    pub(crate) fn new_to_old(&self, new_position: usize) -> Option<usize> {
        self.new_to_old[new_position]
    }

    /// Whether the matched item at `old_position` changed content
    pub(crate) fn is_changed(&self, old_position: usize) -> bool {
        matches!(
            self.old[old_position],
            OldStatus::Kept { changed: true, .. } | OldStatus::Moved { changed: true, .. }
        )
    }
}

/// Old list item as seen by the edit script: equal means same identity
struct OldItem<'a, T, C> {
    item: &'a T,
    callback: &'a C,
}

/// New list item as seen by the edit script
struct NewItem<'a, T, C> {
    item: &'a T,
    _callback: PhantomData<&'a C>,
}

impl<'o, 'n, T, C: ItemCallback<T>> PartialEq<NewItem<'n, T, C>> for OldItem<'o, T, C> {
    fn eq(&self, other: &NewItem<'n, T, C>) -> bool {
        self.callback.are_items_the_same(self.item, other.item)
    }
}

impl<'o, 'n, T, C: ItemCallback<T>> PartialEq<OldItem<'o, T, C>> for NewItem<'n, T, C> {
    fn eq(&self, other: &OldItem<'o, T, C>) -> bool {
        other.callback.are_items_the_same(other.item, self.item)
    }
}

/// Collects the equal runs of an edit script, joining runs that touch
#[derive(Default)]
struct SnakeCollector {
    snakes: Vec<Snake>,
}

impl DiffHook for SnakeCollector {
    type Error = Infallible;

    fn equal(
        &mut self,
        old_index: usize,
        new_index: usize,
        len: usize,
    ) -> Result<(), Infallible> {
        if len == 0 {
            return Ok(());
        }
        match self.snakes.last_mut() {
            Some(last) if last.x + last.size == old_index && last.y + last.size == new_index => {
                last.size += len
            }
            _ => self.snakes.push(Snake {
                x: old_index,
                y: new_index,
                size: len,
            }),
        }
        Ok(())
    }
}

/// Run Myers over item identities and return the matched runs in ascending order
pub(crate) fn find_snakes<T, C>(old: &[T], new: &[T], callback: &C) -> Vec<Snake>
where
    C: ItemCallback<T>,
{
    let old_items: Vec<OldItem<'_, T, C>> = old
        .iter()
        .map(|item| OldItem { item, callback })
        .collect();
    let new_items: Vec<NewItem<'_, T, C>> = new
        .iter()
        .map(|item| NewItem {
            item,
            _callback: PhantomData,
        })
        .collect();

    let mut collector = SnakeCollector::default();
    match myers::diff(
        &mut collector,
        &old_items[..],
        0..old_items.len(),
        &new_items[..],
        0..new_items.len(),
    ) {
        Ok(()) => {}
        Err(never) => match never {},
    }
    collector.snakes
}

/// Replay the edit script into `sink`, walking from the end of both lists
/// towards the start.
///
/// Before each snake the gap that follows it is dispatched: removals first
/// (descending), then insertions anchored at the gap's old position. Changes
/// inside the snake follow in descending order. A moved item whose content
/// differs reports its change where its removal would have been.
fn dispatch_updates<T, C, S>(
    old: &[T],
    new: &[T],
    callback: &C,
    snakes: &[Snake],
    map: &PositionMap,
    sink: &mut S,
) where
    C: ItemCallback<T>,
    S: ListUpdateSink<C::Payload>,
{
    let mut pos_x = old.len();
    let mut pos_y = new.len();

    for snake in snakes.iter().rev().copied().chain(std::iter::once(Snake::ROOT)) {
        let end_x = snake.x + snake.size;
        let end_y = snake.y + snake.size;

        while pos_x > end_x {
            pos_x -= 1;
            match map.status(pos_x) {
                OldStatus::Removed => sink.on_removed(pos_x, 1),
                OldStatus::Moved { new: y, changed: true } => {
                    let payload = callback.change_payload(&old[pos_x], &new[y]);
                    sink.on_changed(pos_x, 1, payload);
                }
                OldStatus::Moved { .. } | OldStatus::Kept { .. } => {}
            }
        }

        while pos_y > end_y {
            pos_y -= 1;
            if map.new_to_old(pos_y).is_none() {
                sink.on_inserted(pos_x, 1);
            }
        }

        for offset in (0..snake.size).rev() {
            let x = snake.x + offset;
            if let OldStatus::Kept { new: y, changed: true } = map.status(x) {
                let payload = callback.change_payload(&old[x], &new[y]);
                sink.on_changed(x, 1, payload);
            }
        }

        pos_x = snake.x;
        pos_y = snake.y;
    }
}

/// The main diff engine
#[derive(Debug, Clone, Default)]
pub struct AtomicDiffEngine {
    options: DiffOptions,
}

impl AtomicDiffEngine {
    /// Engine with default options (move detection on)
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable pairing of removed and inserted items
    pub fn with_detect_moves(mut self, enabled: bool) -> Self {
        self.options.detect_moves = enabled;
        self
    }

    /// Replace all options at once
    pub fn with_options(mut self, options: DiffOptions) -> Self {
        self.options = options;
        self
    }

    /// Get the current options
    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    /// Compute the per-item diff between two lists
    pub fn calculate<'a, T, C>(
        &self,
        old: &'a [T],
        new: &'a [T],
        callback: &C,
    ) -> AtomicDiffResult<'a, T, C::Payload>
    where
        C: ItemCallback<T>,
    {
        let snakes = find_snakes(old, new, callback);
        let mut map = PositionMap::from_snakes(old, new, callback, &snakes);
        let moves = if self.options.detect_moves {
            map.detect_moves(old, new, callback)
        } else {
            0
        };

        let mut sink = BatchingSink::new(RawOperationRecorder::new());
        dispatch_updates(old, new, callback, &snakes, &map, &mut sink);
        let operations = sink.into_inner().into_operations();

        tracing::debug!(
            old_len = old.len(),
            new_len = new.len(),
            snakes = snakes.len(),
            moves,
            operations = operations.len(),
            "calculated atomic diff"
        );

        AtomicDiffResult::new(old, new, operations, map)
    }
}

/// Compute the per-item diff between two lists with default options
pub fn calculate_atomic_diff<'a, T, C>(
    old: &'a [T],
    new: &'a [T],
    callback: &C,
) -> AtomicDiffResult<'a, T, C::Payload>
where
    C: ItemCallback<T>,
{
    AtomicDiffEngine::new().calculate(old, new, callback)
}
