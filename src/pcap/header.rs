//! PCAP global header.

use pcap_parser::{parse_pcap_header, Linktype, PcapHeader};

use crate::error::PcapError;

/// Size of the classic PCAP global header.
pub const GLOBAL_HEADER_LEN: usize = 24;

/// Largest captured length accepted on read, and the snaplen written on output.
pub const MAX_SNAPLEN: u32 = 262_144;

/// Byte order and timestamp resolution selected by the magic number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PcapFormat {
    /// Little-endian, microsecond timestamps
    LeMicro,
    /// Big-endian, microsecond timestamps
    BeMicro,
    /// Little-endian, nanosecond timestamps
    LeNano,
    /// Big-endian, nanosecond timestamps
    BeNano,
}

impl PcapFormat {
    /// Detect the format from the first four bytes of a capture.
    pub fn detect(data: &[u8]) -> Result<Self, PcapError> {
        if data.len() < 4 {
            return Err(PcapError::HeaderTooShort { len: data.len() });
        }

        match [data[0], data[1], data[2], data[3]] {
            [0xd4, 0xc3, 0xb2, 0xa1] => Ok(PcapFormat::LeMicro),
            [0xa1, 0xb2, 0xc3, 0xd4] => Ok(PcapFormat::BeMicro),
            [0x4d, 0x3c, 0xb2, 0xa1] => Ok(PcapFormat::LeNano),
            [0xa1, 0xb2, 0x3c, 0x4d] => Ok(PcapFormat::BeNano),
            magic => Err(PcapError::UnknownMagic {
                magic: u32::from_be_bytes(magic),
            }),
        }
    }

    /// Whether multi-byte fields are stored big-endian.
    pub fn is_big_endian(&self) -> bool {
        matches!(self, PcapFormat::BeMicro | PcapFormat::BeNano)
    }

    /// Whether the timestamp fraction is in nanoseconds.
    pub fn is_nanosecond(&self) -> bool {
        matches!(self, PcapFormat::LeNano | PcapFormat::BeNano)
    }

    /// Read a `u32` field stored in this format's byte order.
    #[inline]
    pub fn read_u32(&self, bytes: [u8; 4]) -> u32 {
        if self.is_big_endian() {
            u32::from_be_bytes(bytes)
        } else {
            u32::from_le_bytes(bytes)
        }
    }

    /// Convert a timestamp fraction field to nanoseconds.
    #[inline]
    pub fn fraction_to_nanos(&self, fraction: u32) -> u64 {
        if self.is_nanosecond() {
            u64::from(fraction)
        } else {
            u64::from(fraction) * 1_000
        }
    }
}

/// Parsed global header of one input.
#[derive(Clone, Debug)]
pub struct GlobalHeader {
    pub format: PcapFormat,
    pub version_major: u16,
    pub version_minor: u16,
    /// Declared snaplen. Read and otherwise ignored.
    pub snaplen: u32,
    pub link_type: Linktype,
}

impl GlobalHeader {
    /// Decode a global header from at least [`GLOBAL_HEADER_LEN`] bytes.
    pub fn parse(data: &[u8]) -> Result<Self, PcapError> {
        if data.len() < GLOBAL_HEADER_LEN {
            return Err(PcapError::HeaderTooShort { len: data.len() });
        }
        let format = PcapFormat::detect(data)?;

        let (_, header): (_, PcapHeader) =
            parse_pcap_header(&data[..GLOBAL_HEADER_LEN]).map_err(|e| {
                PcapError::InvalidFormat {
                    reason: format!("failed to parse global header: {e:?}"),
                }
            })?;

        Ok(Self {
            format,
            version_major: header.version_major,
            version_minor: header.version_minor,
            snaplen: header.snaplen,
            link_type: header.network,
        })
    }

    /// Header written at the top of every merged output.
    pub fn output(link_type: Linktype) -> Self {
        Self {
            format: PcapFormat::LeNano,
            version_major: 2,
            version_minor: 4,
            snaplen: MAX_SNAPLEN,
            link_type,
        }
    }

    /// Encode as little-endian nanosecond PCAP, the only format we write.
    pub fn to_bytes(&self) -> [u8; GLOBAL_HEADER_LEN] {
        let mut out = [0u8; GLOBAL_HEADER_LEN];
        out[0..4].copy_from_slice(&0xa1b2_3c4du32.to_le_bytes());
        out[4..6].copy_from_slice(&self.version_major.to_le_bytes());
        out[6..8].copy_from_slice(&self.version_minor.to_le_bytes());
        // thiszone and sigfigs stay zero
        out[16..20].copy_from_slice(&self.snaplen.to_le_bytes());
        out[20..24].copy_from_slice(&self.link_type.0.to_le_bytes());
        out
    }
}
