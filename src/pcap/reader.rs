//! PCAP record decoder.
//!
//! Reads one global header and then records, one at a time, from any `Read`.
//! A short read anywhere after the global header is end of stream: a
//! truncated trailing record is dropped rather than reported.

use std::io::{ErrorKind, Read};

use pcap_parser::Linktype;

use super::header::{GlobalHeader, GLOBAL_HEADER_LEN, MAX_SNAPLEN};
use super::packet::{timestamp_nanos, RECORD_HEADER_LEN};
use super::RawPacket;
use crate::error::PcapError;

/// Reader for classic PCAP streams.
pub struct PcapReader<R> {
    inner: R,
    header: GlobalHeader,
    frame_number: u64,
}

impl<R: Read> PcapReader<R> {
    /// Parse the global header and position the reader at the first record.
    pub fn new(mut inner: R) -> Result<Self, PcapError> {
        let mut buf = [0u8; GLOBAL_HEADER_LEN];
        let len = read_full(&mut inner, &mut buf)?;
        let header = GlobalHeader::parse(&buf[..len])?;

        Ok(Self {
            inner,
            header,
            frame_number: 0,
        })
    }

    /// The parsed global header.
    pub fn header(&self) -> &GlobalHeader {
        &self.header
    }

    /// Link type declared by the global header.
    pub fn link_type(&self) -> Linktype {
        self.header.link_type
    }

    /// Number of records decoded so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_number
    }

    /// Read the next record.
    ///
    /// Returns `Ok(None)` at end of stream, including a partial record header
    /// or payload. Returns `Err(PcapError::CaptureTooLarge)` when the header
    /// declares an implausible captured length.
    pub fn next_packet(&mut self) -> Result<Option<RawPacket>, PcapError> {
        let mut hdr = [0u8; RECORD_HEADER_LEN];
        if read_full(&mut self.inner, &mut hdr)? < RECORD_HEADER_LEN {
            return Ok(None);
        }

        let format = self.header.format;
        let field = |at: usize| format.read_u32([hdr[at], hdr[at + 1], hdr[at + 2], hdr[at + 3]]);
        let ts_sec = field(0);
        let ts_frac = field(4);
        let captured_length = field(8);
        let original_length = field(12);

        if captured_length > MAX_SNAPLEN {
            return Err(PcapError::CaptureTooLarge {
                captured_length,
                limit: MAX_SNAPLEN,
            });
        }

        let mut data = vec![0u8; captured_length as usize];
        if read_full(&mut self.inner, &mut data)? < data.len() {
            return Ok(None);
        }

        self.frame_number += 1;
        Ok(Some(RawPacket::new(
            self.frame_number,
            timestamp_nanos(ts_sec, format.fraction_to_nanos(ts_frac)),
            original_length,
            data,
        )))
    }
}

/// Iterator adapter for PcapReader.
impl<R: Read> Iterator for PcapReader<R> {
    type Item = Result<RawPacket, PcapError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_packet().transpose()
    }
}

/// Fill `buf` as far as the stream allows, returning the number of bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, PcapError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(PcapError::Io(e)),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn global_header_le(snaplen: u32) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&[0xd4, 0xc3, 0xb2, 0xa1]); // Magic (little endian)
        data.extend_from_slice(&[0x02, 0x00]); // Version major (2)
        data.extend_from_slice(&[0x04, 0x00]); // Version minor (4)
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // Thiszone
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // Sigfigs
        data.extend_from_slice(&snaplen.to_le_bytes()); // Snaplen
        data.extend_from_slice(&[0x01, 0x00, 0x00, 0x00]); // Network (Ethernet)
        data
    }

    fn push_record_le(data: &mut Vec<u8>, ts_sec: u32, ts_usec: u32, payload: &[u8]) {
        data.extend_from_slice(&ts_sec.to_le_bytes());
        data.extend_from_slice(&ts_usec.to_le_bytes());
        data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        data.extend_from_slice(payload);
    }

    #[test]
    fn test_read_records() {
        let mut data = global_header_le(65535);
        push_record_le(&mut data, 1_000_000_000, 250, &[0xaa; 14]);
        push_record_le(&mut data, 1_000_000_001, 0, &[0xbb; 60]);

        let mut reader = PcapReader::new(Cursor::new(data)).unwrap();
        assert_eq!(reader.link_type(), Linktype::ETHERNET);

        let first = reader.next_packet().unwrap().unwrap();
        assert_eq!(first.frame_number, 1);
        assert_eq!(first.timestamp_ns, 1_000_000_000_000_250_000);
        assert_eq!(first.data, vec![0xaa; 14]);

        let second = reader.next_packet().unwrap().unwrap();
        assert_eq!(second.captured_length(), 60);
        assert_eq!(second.original_length, 60);

        assert!(reader.next_packet().unwrap().is_none());
        assert_eq!(reader.frame_count(), 2);
    }

    #[test]
    fn test_big_endian_nanosecond_stream() {
        let mut data = vec![0xa1, 0xb2, 0x3c, 0x4d];
        data.extend_from_slice(&2u16.to_be_bytes());
        data.extend_from_slice(&4u16.to_be_bytes());
        data.extend_from_slice(&[0; 8]);
        data.extend_from_slice(&65535u32.to_be_bytes());
        data.extend_from_slice(&1u32.to_be_bytes());
        data.extend_from_slice(&7u32.to_be_bytes());
        data.extend_from_slice(&999_999_999u32.to_be_bytes());
        data.extend_from_slice(&4u32.to_be_bytes());
        data.extend_from_slice(&1500u32.to_be_bytes());
        data.extend_from_slice(&[1, 2, 3, 4]);

        let mut reader = PcapReader::new(Cursor::new(data)).unwrap();
        let packet = reader.next_packet().unwrap().unwrap();
        assert_eq!(packet.timestamp_ns, 7_999_999_999);
        assert_eq!(packet.original_length, 1500);
        assert_eq!(packet.data, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_empty_capture_is_clean_eof() {
        let mut reader = PcapReader::new(Cursor::new(global_header_le(65535))).unwrap();
        assert!(reader.next_packet().unwrap().is_none());
    }

    #[test]
    fn test_truncated_global_header() {
        let data = global_header_le(65535);
        assert!(matches!(
            PcapReader::new(Cursor::new(data[..10].to_vec())),
            Err(PcapError::HeaderTooShort { len: 10 })
        ));
    }

    #[test]
    fn test_bad_magic() {
        let mut data = global_header_le(65535);
        data[0] = 0x00;
        assert!(matches!(
            PcapReader::new(Cursor::new(data)),
            Err(PcapError::UnknownMagic { .. })
        ));
    }

    #[test]
    fn test_partial_record_header_is_eof() {
        let mut data = global_header_le(65535);
        push_record_le(&mut data, 1, 0, &[0; 20]);
        data.extend_from_slice(&[0x01, 0x02, 0x03]);

        let reader = PcapReader::new(Cursor::new(data)).unwrap();
        let packets: Vec<_> = reader.collect::<Result<_, _>>().unwrap();
        assert_eq!(packets.len(), 1);
    }

    #[test]
    fn test_truncated_payload_is_eof() {
        let mut data = global_header_le(65535);
        push_record_le(&mut data, 1, 0, &[0; 20]);
        push_record_le(&mut data, 2, 0, &[0; 100]);
        data.truncate(data.len() - 50);

        let reader = PcapReader::new(Cursor::new(data)).unwrap();
        let packets: Vec<_> = reader.collect::<Result<_, _>>().unwrap();
        assert_eq!(packets.len(), 1);
    }

    #[test]
    fn test_oversized_capture_is_corrupt() {
        let mut data = global_header_le(65535);
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&(MAX_SNAPLEN + 1).to_le_bytes());
        data.extend_from_slice(&60u32.to_le_bytes());

        let mut reader = PcapReader::new(Cursor::new(data)).unwrap();
        assert!(matches!(
            reader.next_packet(),
            Err(PcapError::CaptureTooLarge { captured_length, limit: MAX_SNAPLEN })
                if captured_length == MAX_SNAPLEN + 1
        ));
    }

    #[test]
    fn test_declared_snaplen_is_ignored() {
        let mut data = global_header_le(16);
        push_record_le(&mut data, 1, 0, &[0x55; 1000]);

        let mut reader = PcapReader::new(Cursor::new(data)).unwrap();
        assert_eq!(reader.header().snaplen, 16);
        assert_eq!(reader.next_packet().unwrap().unwrap().captured_length(), 1000);
    }
}
