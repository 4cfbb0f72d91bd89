//! The bounded reorder buffer for completed-but-not-yet-writable results.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Mutex;

use crate::package::ParsedPackage;
use crate::xml::XmlTriple;

/// Hard cap on the number of deferred results held at once; a
/// memory/latency tradeoff, not a tunable.
pub const MAX_BUFFER: usize = 20;

/// A completed task's result, deposited in the buffer when it arrives
/// before its turn to write.
#[derive(Debug)]
pub struct BufferedResult {
    /// Global sequence id.
    pub id: u64,
    /// The three formatted chunks.
    pub triple: XmlTriple,
    /// The package to mirror into the database sinks, if configured.
    pub package: ParsedPackage,
}

struct HeapEntry(Reverse<u64>, BufferedResult);

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for HeapEntry {}
impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

/// A bounded min-heap of [`BufferedResult`]s, ordered by id.
#[derive(Default)]
pub struct ReorderBuffer {
    heap: Mutex<BinaryHeap<HeapEntry>>,
}

impl ReorderBuffer {
    /// An empty buffer.
    pub fn new() -> Self {
        ReorderBuffer {
            heap: Mutex::new(BinaryHeap::new()),
        }
    }

    /// Attempts to admit `result`.
    ///
    /// Returns `result` back to the caller (as `Err`) if the buffer is at
    /// capacity, so the caller falls through to writing directly instead.
    pub fn try_defer(&self, result: BufferedResult) -> Result<(), BufferedResult> {
        let mut heap = self.heap.lock().unwrap();
        if heap.len() >= MAX_BUFFER {
            return Err(result);
        }
        heap.push(HeapEntry(Reverse(result.id), result));
        Ok(())
    }

    /// Removes and returns the minimum-id entry iff its id equals
    /// `current_next_id`.
    pub fn pop_if_ready(&self, current_next_id: u64) -> Option<BufferedResult> {
        let mut heap = self.heap.lock().unwrap();
        if heap.peek().is_some_and(|e| e.1.id == current_next_id) {
            heap.pop().map(|e| e.1)
        } else {
            None
        }
    }

    /// Current number of deferred results.
    pub fn len(&self) -> usize {
        self.heap.lock().unwrap().len()
    }

    /// True iff no results are deferred.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
