//! Fuzz target for PCAP stream decoding.
//!
//! Tests handling of malformed captures including:
//! - Magic byte detection
//! - Global header parsing
//! - Record headers (caplen, origlen, timestamps)
//! - Endianness handling

#![no_main]

use libfuzzer_sys::fuzz_target;
use pcapjoin::pcap::{PcapFormat, PcapReader, MAX_SNAPLEN};
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // Format detection should never panic
    let _ = PcapFormat::detect(data);

    if let Ok(mut reader) = PcapReader::new(Cursor::new(data)) {
        // Every record either decodes within the ceiling or ends the stream
        while let Ok(Some(packet)) = reader.next_packet() {
            assert!(packet.captured_length() <= MAX_SNAPLEN);
        }
    }
});
