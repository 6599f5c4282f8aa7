//! Input opening and transparent decompression.
//!
//! ## Compression Support
//!
//! Inputs are decompressed transparently when their first bytes carry a
//! known magic. Supported formats (via feature flags):
//! - Gzip (.gz) - always enabled
//! - Zstd (.zst) - `compress-zstd` feature
//! - LZ4 (.lz4) - `compress-lz4` feature
//! - Bzip2 (.bz2) - `compress-bzip2` feature
//! - XZ (.xz) - `compress-xz` feature

mod decompress;

pub use decompress::{Compression, FileDecoder, PeekedFile};
