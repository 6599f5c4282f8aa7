//! Per-input source worker.
//!
//! A worker owns one input for its whole life: it opens the file, sniffs
//! compression, decodes records and hands them to the coordinator through a
//! bounded channel. Nothing that goes wrong inside a worker escapes it; the
//! coordinator only ever sees the channel close.

use std::io::{BufReader, Read};
use std::path::PathBuf;
use std::thread;

use tokio::sync::{mpsc, oneshot};

use crate::error::PcapError;
use crate::io::FileDecoder;
use crate::pcap::{Linktype, PcapReader, RawPacket};

/// Buffer size for reading inputs (64KB).
const BUFFER_SIZE: usize = 65536;

/// What a worker sends to the coordinator.
#[derive(Debug)]
pub enum SourceEvent {
    /// Link type from the global header, sent once before any packet.
    LinkType(Linktype),
    /// Next packet, never earlier than any packet sent before it.
    Packet(RawPacket),
}

/// Why a source stopped producing packets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// Clean end of input, or a truncated trailing record.
    EndOfStream,
    /// The input could not be opened or read at all.
    OpenFailed(String),
    /// Missing, short or unrecognized global header; nothing was used.
    HeaderError(String),
    /// A record header was implausible; packets before it were kept.
    CorruptRecord(String),
    /// The byte stream failed mid-way (I/O or decompression error).
    ReadError(String),
    /// The coordinator stopped listening.
    Cancelled,
    /// The worker thread died or never started.
    Crashed(String),
}

impl Termination {
    /// Whether the input contributed its global header to the run.
    pub fn had_header(&self) -> bool {
        !matches!(
            self,
            Termination::OpenFailed(_) | Termination::HeaderError(_) | Termination::Crashed(_)
        )
    }
}

/// Outcome of one worker.
#[derive(Debug, Clone)]
pub struct SourceReport {
    /// Position of the input on the command line.
    pub index: usize,
    pub path: PathBuf,
    pub link_type: Option<Linktype>,
    /// Packets handed to the coordinator.
    pub packets: u64,
    /// Packets dropped because their timestamp went backwards.
    pub dropped: u64,
    pub termination: Termination,
}

impl SourceReport {
    fn new(index: usize, path: PathBuf) -> Self {
        Self {
            index,
            path,
            link_type: None,
            packets: 0,
            dropped: 0,
            termination: Termination::EndOfStream,
        }
    }

    /// Report for a worker whose thread died before reporting.
    pub fn crashed(index: usize, path: PathBuf, reason: String) -> Self {
        Self {
            termination: Termination::Crashed(reason),
            ..Self::new(index, path)
        }
    }
}

/// Decodes one input and publishes its packets in non-decreasing time order.
pub struct SourceWorker {
    report: SourceReport,
    verbose: bool,
    tx: mpsc::Sender<SourceEvent>,
}

impl SourceWorker {
    pub fn new(index: usize, path: PathBuf, verbose: bool, tx: mpsc::Sender<SourceEvent>) -> Self {
        Self {
            report: SourceReport::new(index, path),
            verbose,
            tx,
        }
    }

    /// Run the worker on a thread of its own.
    ///
    /// Workers block while their channel is full, so they must not share a
    /// bounded pool with each other or with the coordinator draining them.
    /// Returns the receiving end of a channel holding at most `capacity`
    /// undelivered events, and a receiver for the final report. The report
    /// receiver errors if the thread died before finishing.
    pub fn spawn(
        index: usize,
        path: PathBuf,
        verbose: bool,
        capacity: usize,
    ) -> (mpsc::Receiver<SourceEvent>, oneshot::Receiver<SourceReport>) {
        let (tx, rx) = mpsc::channel(capacity);
        let (report_tx, report_rx) = oneshot::channel();
        let worker = Self::new(index, path.clone(), verbose, tx);

        let spawned = thread::Builder::new()
            .name(format!("pcapjoin-source-{index}"))
            .spawn(move || {
                let _ = report_tx.send(worker.run());
            });
        // On failure the closure is dropped, closing both channels.
        if let Err(e) = spawned {
            tracing::warn!(path = %path.display(), error = %e, "cannot start source worker");
        }

        (rx, report_rx)
    }

    /// Open the input and decode it to the end. Blocking.
    pub fn run(self) -> SourceReport {
        match FileDecoder::open(&self.report.path) {
            Ok(input) => {
                tracing::debug!(
                    path = %self.report.path.display(),
                    compression = %input.compression(),
                    "opened input"
                );
                self.run_stream(BufReader::with_capacity(BUFFER_SIZE, input))
            }
            Err(e) => {
                discard!(self.verbose, path = %self.report.path.display(), error = %e,
                    "cannot open input, skipping file");
                self.finish(Termination::OpenFailed(e.to_string()))
            }
        }
    }

    /// Decode an already opened (and decompressed) byte stream. Blocking.
    pub fn run_stream<R: Read>(mut self, input: R) -> SourceReport {
        let mut reader = match PcapReader::new(input) {
            Ok(reader) => reader,
            Err(e) => {
                discard!(self.verbose, path = %self.report.path.display(), error = %e,
                    "bad global header, skipping file");
                return self.finish(Termination::HeaderError(e.to_string()));
            }
        };

        let link_type = reader.link_type();
        self.report.link_type = Some(link_type);
        if !self.send(SourceEvent::LinkType(link_type)) {
            return self.finish(Termination::Cancelled);
        }

        let mut max_timestamp_ns = 0u64;
        loop {
            let packet = match reader.next_packet() {
                Ok(Some(packet)) => packet,
                Ok(None) => return self.finish(Termination::EndOfStream),
                Err(PcapError::Io(e)) => {
                    discard!(self.verbose, path = %self.report.path.display(), error = %e,
                        "read failed, ignoring rest of file");
                    return self.finish(Termination::ReadError(e.to_string()));
                }
                Err(e) => {
                    discard!(self.verbose, path = %self.report.path.display(),
                        frame = reader.frame_count() + 1, error = %e,
                        "corrupt record header, ignoring rest of file");
                    return self.finish(Termination::CorruptRecord(e.to_string()));
                }
            };

            if packet.timestamp_ns < max_timestamp_ns {
                discard!(self.verbose, path = %self.report.path.display(),
                    frame = packet.frame_number, timestamp_ns = packet.timestamp_ns,
                    max_timestamp_ns, "packet is earlier than a previous one, skipping packet");
                self.report.dropped += 1;
                continue;
            }
            max_timestamp_ns = packet.timestamp_ns;

            if !self.send(SourceEvent::Packet(packet)) {
                return self.finish(Termination::Cancelled);
            }
            self.report.packets += 1;
        }
    }

    /// Blocks while the channel is full. False once the coordinator is gone.
    fn send(&self, event: SourceEvent) -> bool {
        self.tx.blocking_send(event).is_ok()
    }

    fn finish(mut self, termination: Termination) -> SourceReport {
        tracing::debug!(
            path = %self.report.path.display(),
            packets = self.report.packets,
            dropped = self.report.dropped,
            ?termination,
            "source finished"
        );
        self.report.termination = termination;
        self.report
    }
}
