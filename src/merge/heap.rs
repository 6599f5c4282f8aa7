//! Min-heap over the head packet of each active source.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::pcap::RawPacket;

/// A source's current head packet, keyed for the merge.
///
/// Ordered by timestamp, then input position, then enqueue sequence, so
/// equal timestamps come out in command-line order and, within a source,
/// in arrival order.
#[derive(Debug)]
pub struct HeapEntry {
    pub source: usize,
    pub sequence: u64,
    pub packet: RawPacket,
}

impl HeapEntry {
    fn key(&self) -> (u64, usize, u64) {
        (self.packet.timestamp_ns, self.source, self.sequence)
    }
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    // Reversed: BinaryHeap is a max-heap
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

/// K-way merge structure holding at most one entry per source.
#[derive(Debug, Default)]
pub struct MergeHeap {
    heap: BinaryHeap<HeapEntry>,
    next_sequence: u64,
}

impl MergeHeap {
    pub fn with_capacity(sources: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(sources),
            next_sequence: 0,
        }
    }

    /// Enqueue the next packet of `source`.
    pub fn push(&mut self, source: usize, packet: RawPacket) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(HeapEntry {
            source,
            sequence,
            packet,
        });
    }

    /// Remove the earliest entry.
    pub fn pop(&mut self) -> Option<HeapEntry> {
        self.heap.pop()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
