//! Raw packet representation.

/// Size of a classic PCAP record header.
pub const RECORD_HEADER_LEN: usize = 16;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// A raw packet record from a PCAP stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPacket {
    /// Record number within its source (1-indexed, before any filtering).
    pub frame_number: u64,

    /// Timestamp in nanoseconds since epoch, whatever the source resolution.
    pub timestamp_ns: u64,

    /// Original length on the wire.
    pub original_length: u32,

    /// Raw packet data; its length is the captured length.
    pub data: Vec<u8>,
}

impl RawPacket {
    /// Create a new raw packet.
    pub fn new(frame_number: u64, timestamp_ns: u64, original_length: u32, data: Vec<u8>) -> Self {
        Self {
            frame_number,
            timestamp_ns,
            original_length,
            data,
        }
    }

    /// Captured length.
    pub fn captured_length(&self) -> u32 {
        self.data.len() as u32
    }

    /// Whole seconds and nanosecond fraction of the timestamp.
    pub fn timestamp_parts(&self) -> (u32, u32) {
        let secs = self.timestamp_ns / NANOS_PER_SEC;
        let nanos = (self.timestamp_ns % NANOS_PER_SEC) as u32;
        // Only reachable from a microsecond field far past 10^6 on the last second of u32
        (u32::try_from(secs).unwrap_or(u32::MAX), nanos)
    }
}

/// Combine the two timestamp fields into nanoseconds.
#[inline]
pub(crate) fn timestamp_nanos(seconds: u32, fraction_ns: u64) -> u64 {
    u64::from(seconds) * NANOS_PER_SEC + fraction_ns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_parts() {
        let packet = RawPacket::new(1, 1_500_000_000_123_456_789, 60, vec![0; 60]);
        assert_eq!(packet.timestamp_parts(), (1_500_000_000, 123_456_789));
    }

    #[test]
    fn test_timestamp_parts_saturates() {
        let ns = timestamp_nanos(u32::MAX, 4_000_000_000);
        let packet = RawPacket::new(1, ns, 0, vec![]);
        assert_eq!(packet.timestamp_parts().0, u32::MAX);
    }
}
