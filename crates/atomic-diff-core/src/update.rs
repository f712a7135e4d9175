//! Raw range operations and the sinks that receive them

use serde::{Deserialize, Serialize};

/// A contiguous edit as replayed against the old list.
///
/// Operations are stored in dispatch order, which walks both lists from the
/// end towards the start. Positions are therefore valid in the list as it
/// looks at the time the operation is replayed, and a `Change` position is
/// always an index into the old list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawDiffOperation<P> {
    Insert { position: usize, count: usize },
    Remove { position: usize, count: usize },
    Change {
        position: usize,
        count: usize,
        payload: Option<P>,
    },
}

impl<P> RawDiffOperation<P> {
    /// First index the range covers
    pub fn position(&self) -> usize {
        match self {
            RawDiffOperation::Insert { position, .. }
            | RawDiffOperation::Remove { position, .. }
            | RawDiffOperation::Change { position, .. } => *position,
        }
    }

    /// Number of items in the range
    pub fn count(&self) -> usize {
        match self {
            RawDiffOperation::Insert { count, .. }
            | RawDiffOperation::Remove { count, .. }
            | RawDiffOperation::Change { count, .. } => *count,
        }
    }
}

/// Receiver for range updates.
///
/// Moves are never reported; moved items surface through the position
/// mapping instead.
pub trait ListUpdateSink<P> {
    fn on_inserted(&mut self, position: usize, count: usize);

    fn on_removed(&mut self, position: usize, count: usize);

    fn on_changed(&mut self, position: usize, count: usize, payload: Option<P>);
}

/// Sink that records every update as a [`RawDiffOperation`]
#[derive(Debug, Default)]
pub struct RawOperationRecorder<P> {
    operations: Vec<RawDiffOperation<P>>,
}

impl<P> RawOperationRecorder<P> {
    pub fn new() -> Self {
        Self {
            operations: Vec::new(),
        }
    }

    pub fn into_operations(self) -> Vec<RawDiffOperation<P>> {
        self.operations
    }
}

impl<P> ListUpdateSink<P> for RawOperationRecorder<P> {
    fn on_inserted(&mut self, position: usize, count: usize) {
        self.operations
            .push(RawDiffOperation::Insert { position, count });
    }

    fn on_removed(&mut self, position: usize, count: usize) {
        self.operations
            .push(RawDiffOperation::Remove { position, count });
    }

    fn on_changed(&mut self, position: usize, count: usize, payload: Option<P>) {
        self.operations.push(RawDiffOperation::Change {
            position,
            count,
            payload,
        });
    }
}

/// Sink adapter that merges consecutive updates of the same kind into ranges.
///
/// The pending event is only forwarded once an incompatible event arrives or
/// [`BatchingSink::flush`] is called. Change events carrying a payload are
/// never merged, since payloads are opaque.
pub struct BatchingSink<S, P> {
    inner: S,
    pending: Option<RawDiffOperation<P>>,
}

impl<S, P> BatchingSink<S, P>
where
    S: ListUpdateSink<P>,
{
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            pending: None,
        }
    }

    /// Forward the pending event, if any
    pub fn flush(&mut self) {
        match self.pending.take() {
            Some(RawDiffOperation::Insert { position, count }) => {
                self.inner.on_inserted(position, count)
            }
            Some(RawDiffOperation::Remove { position, count }) => {
                self.inner.on_removed(position, count)
            }
            Some(RawDiffOperation::Change {
                position,
                count,
                payload,
            }) => self.inner.on_changed(position, count, payload),
            None => {}
        }
    }

    /// Flush and hand back the wrapped sink
    pub fn into_inner(mut self) -> S {
        self.flush();
        self.inner
    }
}

impl<S, P> ListUpdateSink<P> for BatchingSink<S, P>
where
    S: ListUpdateSink<P>,
{
    fn on_inserted(&mut self, position: usize, count: usize) {
        if let Some(RawDiffOperation::Insert {
            position: last_position,
            count: last_count,
        }) = &mut self.pending
        {
            if position >= *last_position && position <= *last_position + *last_count {
                *last_count += count;
                *last_position = position.min(*last_position);
                return;
            }
        }
        self.flush();
        self.pending = Some(RawDiffOperation::Insert { position, count });
    }

    fn on_removed(&mut self, position: usize, count: usize) {
        if let Some(RawDiffOperation::Remove {
            position: last_position,
            count: last_count,
        }) = &mut self.pending
        {
            if *last_position >= position && *last_position <= position + count {
                *last_count += count;
                *last_position = position;
                return;
            }
        }
        self.flush();
        self.pending = Some(RawDiffOperation::Remove { position, count });
    }

    fn on_changed(&mut self, position: usize, count: usize, payload: Option<P>) {
        if let Some(RawDiffOperation::Change {
            position: last_position,
            count: last_count,
            payload: None,
        }) = &mut self.pending
        {
            let touches = position <= *last_position + *last_count
                && position + count >= *last_position;
            if payload.is_none() && touches {
                let previous_end = *last_position + *last_count;
                *last_position = position.min(*last_position);
                *last_count = previous_end.max(position + count) - *last_position;
                return;
            }
        }
        self.flush();
        self.pending = Some(RawDiffOperation::Change {
            position,
            count,
            payload,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Sink = BatchingSink<RawOperationRecorder<&'static str>, &'static str>;

    fn batched(events: impl FnOnce(&mut Sink)) -> Vec<RawDiffOperation<&'static str>> {
        let mut sink = BatchingSink::new(RawOperationRecorder::new());
        events(&mut sink);
        sink.into_inner().into_operations()
    }

    #[test]
    fn test_descending_removals_merge() {
        let ops = batched(|sink| {
            sink.on_removed(5, 1);
            sink.on_removed(4, 1);
            sink.on_removed(3, 1);
        });
        assert_eq!(
            ops,
            vec![RawDiffOperation::Remove {
                position: 3,
                count: 3
            }]
        );
    }

    #[test]
    fn test_inserts_at_same_anchor_merge() {
        let ops = batched(|sink| {
            sink.on_inserted(2, 1);
            sink.on_inserted(2, 1);
        });
        assert_eq!(
            ops,
            vec![RawDiffOperation::Insert {
                position: 2,
                count: 2
            }]
        );
    }

    #[test]
    fn test_disjoint_changes_stay_separate() {
        let ops = batched(|sink| {
            sink.on_changed(4, 1, None);
            sink.on_changed(3, 1, None);
            sink.on_changed(1, 1, None);
            sink.on_changed(0, 1, None);
        });
        assert_eq!(
            ops,
            vec![
                RawDiffOperation::Change {
                    position: 3,
                    count: 2,
                    payload: None
                },
                RawDiffOperation::Change {
                    position: 0,
                    count: 2,
                    payload: None
                },
            ]
        );
    }

    #[test]
    fn test_changes_with_payload_never_merge() {
        let ops = batched(|sink| {
            sink.on_changed(2, 1, Some("score"));
            sink.on_changed(1, 1, Some("score"));
        });
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].position(), 2);
        assert_eq!(ops[1].position(), 1);
    }

    #[test]
    fn test_kind_switch_flushes() {
        let ops = batched(|sink| {
            sink.on_changed(3, 1, None);
            sink.on_removed(2, 1);
            sink.on_inserted(2, 1);
        });
        assert_eq!(ops.len(), 3);
        assert!(matches!(ops[0], RawDiffOperation::Change { position: 3, .. }));
        assert!(matches!(ops[1], RawDiffOperation::Remove { position: 2, .. }));
        assert!(matches!(ops[2], RawDiffOperation::Insert { position: 2, .. }));
    }

    #[test]
    fn test_flush_without_pending_is_noop() {
        let ops = batched(|sink| sink.flush());
        assert!(ops.is_empty());
    }
}
