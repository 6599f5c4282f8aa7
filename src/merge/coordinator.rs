//! Merge coordinator: runs the workers and the k-way merge.
//!
//! Every input gets its own worker thread and the coordinator gets one more,
//! pulling from the per-source channels. None of them wait on tokio's
//! blocking pool, so the number of inputs is bounded only by what the OS
//! allows, and no async executor thread blocks on file I/O.
//!
//! Before anything is written, each source is primed up to its first packet.
//! Workers report their link type ahead of any packet, so after priming every
//! valid input has been reconciled and the output header can be written with
//! the final link type. A mismatch therefore aborts before a single byte of
//! output exists.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::thread;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use super::heap::MergeHeap;
use super::linktype::LinkTypeReconciler;
use super::worker::{SourceEvent, SourceReport, SourceWorker};
use super::{MergeConfig, OutputTarget};
use crate::error::{MergeError, Result};
use crate::pcap::{Linktype, PcapWriter, RawPacket};

/// Buffer size for the output writer (64KB).
const OUTPUT_BUFFER_SIZE: usize = 65536;

/// Result of a successful merge.
#[derive(Debug, Clone)]
pub struct MergeSummary {
    /// Link type written to the output header.
    pub link_type: Linktype,
    pub packets_written: u64,
    /// One report per input, in input order.
    pub sources: Vec<SourceReport>,
}

impl MergeSummary {
    /// Number of inputs that contributed a valid global header.
    pub fn valid_sources(&self) -> usize {
        self.sources
            .iter()
            .filter(|s| s.termination.had_header())
            .count()
    }

    /// Packets dropped across all inputs for going back in time.
    pub fn packets_dropped(&self) -> u64 {
        self.sources.iter().map(|s| s.dropped).sum()
    }
}

/// Merge every input of `config` into its output.
///
/// Fails only if the output cannot be opened or written, or if two valid
/// inputs disagree on link type. In both of the latter cases a partially
/// written output file is removed.
pub async fn merge(config: MergeConfig) -> Result<MergeSummary> {
    let output = open_output(&config.output)?;
    info!(
        inputs = config.inputs.len(),
        output = %config.output,
        "merging captures"
    );

    let mut receivers = Vec::with_capacity(config.inputs.len());
    let mut reports = Vec::with_capacity(config.inputs.len());
    for (index, path) in config.inputs.iter().enumerate() {
        let (rx, report) =
            SourceWorker::spawn(index, path.clone(), config.verbose, config.channel_capacity);
        receivers.push(rx);
        reports.push(report);
    }

    let coordinator = Coordinator::new(config.inputs.clone(), receivers);
    let (done_tx, done_rx) = oneshot::channel();
    let spawned = thread::Builder::new()
        .name("pcapjoin-merge".to_string())
        .spawn(move || {
            let _ = done_tx.send(coordinator.run(output));
        });
    let outcome = match spawned {
        Ok(_) => match done_rx.await {
            Ok(result) => result,
            Err(_) => Err(MergeError::TaskFailed {
                reason: "merge thread exited without a result".to_string(),
            }
            .into()),
        },
        Err(e) => Err(MergeError::TaskFailed {
            reason: e.to_string(),
        }
        .into()),
    };

    // The coordinator has dropped every receiver by now, so workers that
    // are still producing fail their next send and stop.
    let mut sources = Vec::with_capacity(reports.len());
    for (index, (report, path)) in reports.into_iter().zip(&config.inputs).enumerate() {
        match report.await {
            Ok(report) => sources.push(report),
            Err(_) => {
                warn!(path = %path.display(), "source worker exited without a report");
                sources.push(SourceReport::crashed(
                    index,
                    path.clone(),
                    "worker thread exited without a report".to_string(),
                ));
            }
        }
    }

    match outcome {
        Ok((link_type, packets_written)) => {
            let summary = MergeSummary {
                link_type,
                packets_written,
                sources,
            };
            info!(
                ?link_type,
                packets = packets_written,
                valid_inputs = summary.valid_sources(),
                dropped = summary.packets_dropped(),
                "merge complete"
            );
            Ok(summary)
        }
        Err(e) => {
            discard_output(&config.output);
            Err(e)
        }
    }
}

/// Open the destination before any input is touched.
fn open_output(target: &OutputTarget) -> Result<BufWriter<Box<dyn Write + Send>>> {
    let inner: Box<dyn Write + Send> = match target {
        OutputTarget::Stdout => Box::new(io::stdout()),
        OutputTarget::File(path) => {
            let file = File::create(path).map_err(|source| MergeError::CannotOpenOutput {
                path: path.clone(),
                source,
            })?;
            Box::new(file)
        }
    };
    Ok(BufWriter::with_capacity(OUTPUT_BUFFER_SIZE, inner))
}

fn discard_output(target: &OutputTarget) {
    if let OutputTarget::File(path) = target {
        if let Err(e) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "failed to remove partial output");
        } else {
            debug!(path = %path.display(), "removed partial output");
        }
    }
}

/// Merge state. Owned by the coordinator alone; workers only feed channels.
struct Coordinator {
    paths: Vec<PathBuf>,
    receivers: Vec<mpsc::Receiver<SourceEvent>>,
    reconciler: LinkTypeReconciler,
    heap: MergeHeap,
}

impl Coordinator {
    fn new(paths: Vec<PathBuf>, receivers: Vec<mpsc::Receiver<SourceEvent>>) -> Self {
        let heap = MergeHeap::with_capacity(receivers.len());
        Self {
            paths,
            receivers,
            reconciler: LinkTypeReconciler::new(),
            heap,
        }
    }

    /// Blocking. Returns the output link type and packet count.
    fn run<W: Write>(mut self, output: W) -> Result<(Linktype, u64)> {
        for source in 0..self.receivers.len() {
            if let Some(packet) = self.next_packet(source)? {
                self.heap.push(source, packet);
            }
        }

        let link_type = self.reconciler.output_link_type();
        debug!(?link_type, active = self.heap.len(), "sources primed");

        let mut writer = PcapWriter::new(output, link_type)?;
        while let Some(entry) = self.heap.pop() {
            writer.write_packet(&entry.packet)?;
            if let Some(packet) = self.next_packet(entry.source)? {
                self.heap.push(entry.source, packet);
            }
        }

        let packets_written = writer.packets_written();
        writer.finish()?;
        Ok((link_type, packets_written))
    }

    /// Next packet of `source`, or `None` once its worker has finished.
    fn next_packet(&mut self, source: usize) -> Result<Option<RawPacket>> {
        while let Some(event) = self.receivers[source].blocking_recv() {
            match event {
                SourceEvent::LinkType(link_type) => {
                    self.reconciler.observe(&self.paths[source], link_type)?;
                }
                SourceEvent::Packet(packet) => return Ok(Some(packet)),
            }
        }
        Ok(None)
    }
}
