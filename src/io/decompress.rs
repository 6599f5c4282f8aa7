//! Compression detection and decompression support.
//!
//! Inputs are sniffed by magic bytes, never by extension. The sniffed bytes
//! are replayed in front of the file so non-seekable inputs work too.

use std::fs::File;
use std::io::{self, Cursor, ErrorKind, Read};
use std::path::Path;

use flate2::read::GzDecoder;

/// Bytes read from the front of an input to detect its compression.
const SNIFF_LEN: usize = 6;

/// A file with its sniffed prefix put back in front of it.
pub type PeekedFile = io::Chain<Cursor<Vec<u8>>, File>;

/// Detected compression format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// No compression
    None,
    /// Gzip (.gz)
    Gzip,
    /// Zstandard (.zst)
    #[cfg(feature = "compress-zstd")]
    Zstd,
    /// LZ4 frame format (.lz4)
    #[cfg(feature = "compress-lz4")]
    Lz4,
    /// Bzip2 (.bz2)
    #[cfg(feature = "compress-bzip2")]
    Bzip2,
    /// XZ/LZMA (.xz)
    #[cfg(feature = "compress-xz")]
    Xz,
}

impl Compression {
    /// Detect compression format from magic bytes.
    pub fn detect(data: &[u8]) -> Self {
        if data.len() < SNIFF_LEN {
            return Compression::None;
        }

        match data {
            // Gzip: 1f 8b
            [0x1f, 0x8b, ..] => Compression::Gzip,

            // Zstd: 28 b5 2f fd
            #[cfg(feature = "compress-zstd")]
            [0x28, 0xb5, 0x2f, 0xfd, ..] => Compression::Zstd,

            // LZ4 frame: 04 22 4d 18
            #[cfg(feature = "compress-lz4")]
            [0x04, 0x22, 0x4d, 0x18, ..] => Compression::Lz4,

            // Bzip2: 42 5a 68 ("BZh")
            #[cfg(feature = "compress-bzip2")]
            [0x42, 0x5a, 0x68, ..] => Compression::Bzip2,

            // XZ: fd 37 7a 58 5a 00
            #[cfg(feature = "compress-xz")]
            [0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00, ..] => Compression::Xz,

            _ => Compression::None,
        }
    }

    /// Check if this represents compressed data.
    pub fn is_compressed(&self) -> bool {
        !matches!(self, Compression::None)
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Compression::None => write!(f, "none"),
            Compression::Gzip => write!(f, "gzip"),
            #[cfg(feature = "compress-zstd")]
            Compression::Zstd => write!(f, "zstd"),
            #[cfg(feature = "compress-lz4")]
            Compression::Lz4 => write!(f, "lz4"),
            #[cfg(feature = "compress-bzip2")]
            Compression::Bzip2 => write!(f, "bzip2"),
            #[cfg(feature = "compress-xz")]
            Compression::Xz => write!(f, "xz"),
        }
    }
}

/// File-based decoder that wraps various decompression formats.
///
/// Uses enum dispatch rather than `Box<dyn Read>`.
pub enum FileDecoder {
    /// No compression - direct file access
    None(PeekedFile),

    /// Gzip decompression
    Gzip(GzDecoder<PeekedFile>),

    /// Zstandard decompression
    #[cfg(feature = "compress-zstd")]
    Zstd(zstd::Decoder<'static, io::BufReader<PeekedFile>>),

    /// LZ4 frame decompression
    #[cfg(feature = "compress-lz4")]
    Lz4(lz4_flex::frame::FrameDecoder<PeekedFile>),

    /// Bzip2 decompression
    #[cfg(feature = "compress-bzip2")]
    Bzip2(bzip2::read::BzDecoder<PeekedFile>),

    /// XZ/LZMA decompression
    #[cfg(feature = "compress-xz")]
    Xz(xz2::read::XzDecoder<PeekedFile>),
}

impl FileDecoder {
    /// Open `path`, sniff its compression and wrap it accordingly.
    ///
    /// Fails if the path cannot be opened or read (missing, permission
    /// denied, a directory).
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let mut file = File::open(path)?;

        let mut prefix = vec![0u8; SNIFF_LEN];
        let mut filled = 0;
        while filled < SNIFF_LEN {
            match file.read(&mut prefix[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        prefix.truncate(filled);

        let compression = Compression::detect(&prefix);
        Self::new(Cursor::new(prefix).chain(file), compression)
    }

    /// Create a decoder for the given input with explicit compression format.
    pub fn new(input: PeekedFile, compression: Compression) -> io::Result<Self> {
        match compression {
            Compression::None => Ok(FileDecoder::None(input)),

            Compression::Gzip => Ok(FileDecoder::Gzip(GzDecoder::new(input))),

            #[cfg(feature = "compress-zstd")]
            Compression::Zstd => {
                let decoder = zstd::Decoder::new(input)?;
                Ok(FileDecoder::Zstd(decoder))
            }

            #[cfg(feature = "compress-lz4")]
            Compression::Lz4 => {
                let decoder = lz4_flex::frame::FrameDecoder::new(input);
                Ok(FileDecoder::Lz4(decoder))
            }

            #[cfg(feature = "compress-bzip2")]
            Compression::Bzip2 => {
                let decoder = bzip2::read::BzDecoder::new(input);
                Ok(FileDecoder::Bzip2(decoder))
            }

            #[cfg(feature = "compress-xz")]
            Compression::Xz => {
                let decoder = xz2::read::XzDecoder::new(input);
                Ok(FileDecoder::Xz(decoder))
            }
        }
    }

    /// Get the compression format this decoder handles.
    pub fn compression(&self) -> Compression {
        match self {
            FileDecoder::None(_) => Compression::None,
            FileDecoder::Gzip(_) => Compression::Gzip,
            #[cfg(feature = "compress-zstd")]
            FileDecoder::Zstd(_) => Compression::Zstd,
            #[cfg(feature = "compress-lz4")]
            FileDecoder::Lz4(_) => Compression::Lz4,
            #[cfg(feature = "compress-bzip2")]
            FileDecoder::Bzip2(_) => Compression::Bzip2,
            #[cfg(feature = "compress-xz")]
            FileDecoder::Xz(_) => Compression::Xz,
        }
    }
}

impl Read for FileDecoder {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            FileDecoder::None(r) => r.read(buf),
            FileDecoder::Gzip(r) => r.read(buf),
            #[cfg(feature = "compress-zstd")]
            FileDecoder::Zstd(r) => r.read(buf),
            #[cfg(feature = "compress-lz4")]
            FileDecoder::Lz4(r) => r.read(buf),
            #[cfg(feature = "compress-bzip2")]
            FileDecoder::Bzip2(r) => r.read(buf),
            #[cfg(feature = "compress-xz")]
            FileDecoder::Xz(r) => r.read(buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_detect_no_compression() {
        // PCAP magic
        let data = [0xd4, 0xc3, 0xb2, 0xa1, 0x00, 0x00];
        assert_eq!(Compression::detect(&data), Compression::None);
    }

    #[test]
    fn test_detect_gzip() {
        let data = [0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00];
        assert_eq!(Compression::detect(&data), Compression::Gzip);
    }

    #[cfg(feature = "compress-zstd")]
    #[test]
    fn test_detect_zstd() {
        let data = [0x28, 0xb5, 0x2f, 0xfd, 0x00, 0x00];
        assert_eq!(Compression::detect(&data), Compression::Zstd);
    }

    #[test]
    fn test_detect_short_data() {
        let data = [0x1f, 0x8b]; // Too short
        assert_eq!(Compression::detect(&data), Compression::None);
    }

    #[test]
    fn test_compression_display() {
        assert_eq!(format!("{}", Compression::None), "none");
        assert_eq!(format!("{}", Compression::Gzip), "gzip");
        assert!(Compression::Gzip.is_compressed());
    }

    #[test]
    fn test_open_plain_file_replays_prefix() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"plain capture bytes").unwrap();
        temp.flush().unwrap();

        let mut decoder = FileDecoder::open(temp.path()).unwrap();
        assert_eq!(decoder.compression(), Compression::None);

        let mut out = String::new();
        decoder.read_to_string(&mut out).unwrap();
        assert_eq!(out, "plain capture bytes");
    }

    #[test]
    fn test_open_tiny_file() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(&[0x1f, 0x8b]).unwrap();
        temp.flush().unwrap();

        let mut decoder = FileDecoder::open(temp.path()).unwrap();
        assert_eq!(decoder.compression(), Compression::None);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).unwrap();
        assert_eq!(out, vec![0x1f, 0x8b]);
    }

    #[test]
    fn test_open_gzip_file() {
        let temp = NamedTempFile::new().unwrap();
        {
            let file = File::create(temp.path()).unwrap();
            let mut encoder = GzEncoder::new(file, flate2::Compression::default());
            encoder.write_all(b"hello from inside gzip").unwrap();
            encoder.finish().unwrap();
        }

        let mut decoder = FileDecoder::open(temp.path()).unwrap();
        assert_eq!(decoder.compression(), Compression::Gzip);

        let mut out = String::new();
        decoder.read_to_string(&mut out).unwrap();
        assert_eq!(out, "hello from inside gzip");
    }

    #[test]
    fn test_open_missing_file() {
        assert!(FileDecoder::open("/nothing/here.pcap").is_err());
    }

    #[test]
    fn test_open_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FileDecoder::open(dir.path()).is_err());
    }
}
