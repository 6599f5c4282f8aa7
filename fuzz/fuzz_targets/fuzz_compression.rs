//! Fuzz target for compression detection and decompression.
//!
//! Tests format confusion and decompression bombs for the enabled formats.

#![no_main]

use libfuzzer_sys::fuzz_target;
use pcapjoin::io::{Compression, FileDecoder};
use pcapjoin::pcap::PcapReader;
use std::io::{BufReader, Read, Write};

/// Maximum bytes to read during decompression to prevent bombs.
const MAX_DECOMPRESS_SIZE: u64 = 1024 * 1024; // 1MB

fuzz_target!(|data: &[u8]| {
    // Detection should never panic
    let _ = Compression::detect(data);

    let Ok(mut temp) = tempfile::NamedTempFile::new() else {
        return;
    };
    if temp.write_all(data).is_err() {
        return;
    }

    // Opening and decoding should handle all malformed input gracefully
    if let Ok(decoder) = FileDecoder::open(temp.path()) {
        let limited = BufReader::new(decoder.take(MAX_DECOMPRESS_SIZE));
        if let Ok(reader) = PcapReader::new(limited) {
            for packet in reader {
                if packet.is_err() {
                    break;
                }
            }
        }
    }
});
