//! Error types for pcapjoin.

use std::path::PathBuf;

use pcap_parser::Linktype;
use thiserror::Error;

/// Main error type for pcapjoin operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Error reading or parsing a PCAP stream
    #[error("PCAP error: {0}")]
    Pcap(#[from] PcapError),

    /// Error that aborts the whole merge
    #[error("{0}")]
    Merge(#[from] MergeError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to PCAP stream decoding.
///
/// `HeaderTooShort`, `UnknownMagic` and `InvalidFormat` make the whole stream
/// unusable. `CaptureTooLarge` means a single record header is corrupt and the
/// stream cannot be trusted past it.
#[derive(Error, Debug)]
pub enum PcapError {
    /// Fewer bytes than a global header
    #[error("global header too short: got {len} of 24 bytes")]
    HeaderTooShort { len: usize },

    /// Magic number is none of the four classic PCAP magics
    #[error("unknown magic number: {magic:#010x}")]
    UnknownMagic { magic: u32 },

    /// Invalid PCAP format
    #[error("invalid PCAP format: {reason}")]
    InvalidFormat { reason: String },

    /// Record declares a captured length above the safety ceiling
    #[error("record captured length {captured_length} exceeds limit of {limit} bytes")]
    CaptureTooLarge { captured_length: u32, limit: u32 },

    /// Underlying read failed (including decompression errors)
    #[error("read error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that abort the whole run.
#[derive(Error, Debug)]
pub enum MergeError {
    /// Two valid inputs declare different link types
    #[error("cannot merge different link types: {path} has {found:?}, expected {expected:?}")]
    LinkTypeMismatch {
        path: PathBuf,
        expected: Linktype,
        found: Linktype,
    },

    /// Output destination cannot be created
    #[error("cannot open {path} for writing: {source}")]
    CannotOpenOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The coordinator thread could not start or died mid-merge
    #[error("merge task failed: {reason}")]
    TaskFailed { reason: String },
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_type_mismatch_message() {
        let err = Error::from(MergeError::LinkTypeMismatch {
            path: PathBuf::from("b.pcap"),
            expected: Linktype::ETHERNET,
            found: Linktype::RAW,
        });
        let msg = err.to_string();
        assert!(msg.contains("different link types"), "{msg}");
        assert!(msg.contains("b.pcap"), "{msg}");
    }

    #[test]
    fn test_cannot_open_output_message() {
        let err = MergeError::CannotOpenOutput {
            path: PathBuf::from("/banana/papaya.pcap"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.to_string().starts_with("cannot open /banana/papaya.pcap"));
    }

    #[test]
    fn test_task_failed_message() {
        let err = Error::from(MergeError::TaskFailed {
            reason: "merge thread exited without a result".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "merge task failed: merge thread exited without a result"
        );
    }

    #[test]
    fn test_unknown_magic_is_hex() {
        let err = PcapError::UnknownMagic { magic: 0xdeadbeef };
        assert_eq!(err.to_string(), "unknown magic number: 0xdeadbeef");
    }
}
