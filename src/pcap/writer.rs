//! PCAP output encoder.

use std::io::{self, Write};

use pcap_parser::Linktype;

use super::header::GlobalHeader;
use super::packet::RECORD_HEADER_LEN;
use super::RawPacket;

/// Writes a nanosecond-resolution PCAP stream.
///
/// The global header is written once on construction; records are appended
/// verbatim after it.
pub struct PcapWriter<W: Write> {
    inner: W,
    packets_written: u64,
}

impl<W: Write> PcapWriter<W> {
    /// Write the output global header for `link_type`.
    pub fn new(mut inner: W, link_type: Linktype) -> io::Result<Self> {
        inner.write_all(&GlobalHeader::output(link_type).to_bytes())?;
        Ok(Self {
            inner,
            packets_written: 0,
        })
    }

    /// Append one record.
    pub fn write_packet(&mut self, packet: &RawPacket) -> io::Result<()> {
        let (secs, nanos) = packet.timestamp_parts();

        let mut hdr = [0u8; RECORD_HEADER_LEN];
        hdr[0..4].copy_from_slice(&secs.to_le_bytes());
        hdr[4..8].copy_from_slice(&nanos.to_le_bytes());
        hdr[8..12].copy_from_slice(&packet.captured_length().to_le_bytes());
        hdr[12..16].copy_from_slice(&packet.original_length.to_le_bytes());

        self.inner.write_all(&hdr)?;
        self.inner.write_all(&packet.data)?;
        self.packets_written += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn packets_written(&self) -> u64 {
        self.packets_written
    }

    /// Flush and return the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}
