use crate::runtime::{EventId, EventNode};
use crate::time::SimTime;
use fxhash::FxHashSet;
use std::collections::{BinaryHeap, VecDeque};

///
/// The future event set of a scheduler.
///
/// Events for the instant currently being processed bypass the heap
/// and go into a FIFO `zero_queue`. Both queues are merged on fetch by
/// `(time, id)`, so heap entries for the same instant with a lower id
/// still come first.
///
/// Cancellation is lazy: a cancelled id leaves `pending`, and its node is
/// dropped once it reaches the front.
///
pub(crate) struct FutureEventSet<A> {
    heap: BinaryHeap<EventNode<A>>,
    zero_queue: VecDeque<EventNode<A>>,
    pending: FxHashSet<EventId>,

    last_event_simtime: SimTime,
    discarded: usize,
}

impl<A> FutureEventSet<A> {
    pub(crate) fn new() -> Self {
        Self {
            heap: BinaryHeap::with_capacity(64),
            zero_queue: VecDeque::with_capacity(32),
            pending: FxHashSet::default(),

            last_event_simtime: SimTime::ZERO,
            discarded: 0,
        }
    }

    pub(crate) fn descriptor(&self) -> String {
        "FutureEventSet::BinaryHeap()".to_string()
    }

    /// The number of queued nodes, including cancelled ones
    /// that were not yet discarded.
    pub(crate) fn len(&self) -> usize {
        self.heap.len() + self.zero_queue.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.heap.is_empty() && self.zero_queue.is_empty()
    }

    /// The number of events that will still be executed.
    pub(crate) fn len_pending(&self) -> usize {
        self.pending.len()
    }

    /// The number of cancelled nodes dropped from the front so far.
    pub(crate) fn num_discarded(&self) -> usize {
        self.discarded
    }

    pub(crate) fn is_pending(&self, id: EventId) -> bool {
        self.pending.contains(&id)
    }

    pub(crate) fn add(&mut self, node: EventNode<A>) {
        assert!(
            node.time >= self.last_event_simtime,
            "Sorry we cannot timetravel yet"
        );

        self.pending.insert(node.id);
        if node.time == self.last_event_simtime {
            self.zero_queue.push_back(node);
        } else {
            self.heap.push(node);
        }
    }

    /// Marks the event as cancelled. Returns `false` if the event
    /// was no longer pending.
    pub(crate) fn cancel(&mut self, id: EventId) -> bool {
        self.pending.remove(&id)
    }

    fn front_is_zero_queue(&self) -> Option<bool> {
        match (self.zero_queue.front(), self.heap.peek()) {
            (None, None) => None,
            (Some(_), None) => Some(true),
            (None, Some(_)) => Some(false),
            (Some(zero), Some(heap)) => Some(zero.key() < heap.key()),
        }
    }

    fn front(&self) -> Option<&EventNode<A>> {
        if self.front_is_zero_queue()? {
            self.zero_queue.front()
        } else {
            self.heap.peek()
        }
    }

    fn pop_front(&mut self) -> Option<EventNode<A>> {
        if self.front_is_zero_queue()? {
            self.zero_queue.pop_front()
        } else {
            self.heap.pop()
        }
    }

    // Cancelled nodes do not move `last_event_simtime`, the clock
    // only follows live events.
    fn skip_cancelled(&mut self) {
        while let Some(id) = self.front().map(|node| node.id) {
            if self.pending.contains(&id) {
                break;
            }
            self.pop_front();
            self.discarded += 1;
        }
    }

    /// The `(time, id)` key of the next live event. Cancelled nodes
    /// in front of it are dropped.
    pub(crate) fn peek_next(&mut self) -> Option<(SimTime, EventId)> {
        self.skip_cancelled();
        self.front().map(EventNode::key)
    }

    /// Removes the next live event.
    pub(crate) fn fetch_next(&mut self) -> Option<EventNode<A>> {
        self.skip_cancelled();
        let node = self.pop_front()?;
        self.pending.remove(&node.id);
        self.last_event_simtime = node.time;
        Some(node)
    }

    /// Drops all queued nodes without executing them.
    /// Returns the number of events that were still pending.
    pub(crate) fn clear(&mut self) -> usize {
        let n = self.pending.len();
        self.heap.clear();
        self.zero_queue.clear();
        self.pending.clear();
        n
    }
}
