//! PCAP file format.
//!
//! This module handles decoding classic PCAP streams (both byte orders,
//! microsecond and nanosecond resolution) and encoding the merged output.

mod header;
mod packet;
mod reader;
mod writer;

pub use header::{GlobalHeader, PcapFormat, GLOBAL_HEADER_LEN, MAX_SNAPLEN};
pub use packet::{RawPacket, RECORD_HEADER_LEN};
pub use pcap_parser::Linktype;
pub use reader::PcapReader;
pub use writer::PcapWriter;
