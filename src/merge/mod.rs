//! Concurrent k-way merge of capture files.
//!
//! One [`SourceWorker`] per input decodes and filters its file on its own
//! thread; the coordinator reconciles link types and merges the
//! per-source streams by timestamp into a single output.

/// Log a discarded file or packet: a warning in verbose mode, debug otherwise.
macro_rules! discard {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::warn!($($arg)+)
        } else {
            tracing::debug!($($arg)+)
        }
    };
}

mod config;
mod coordinator;
mod heap;
mod linktype;
mod worker;

pub use config::{MergeConfig, OutputTarget, DEFAULT_CHANNEL_CAPACITY};
pub use coordinator::{merge, MergeSummary};
pub use heap::{HeapEntry, MergeHeap};
pub use linktype::{LinkTypeReconciler, DEFAULT_LINK_TYPE};
pub use worker::{SourceEvent, SourceReport, SourceWorker, Termination};
