//! pcapjoin - Merge PCAP files into one time-ordered capture.
//!
//! Each input is decoded by its own worker; corrupt headers, truncated
//! records, unreadable files and packets that go back in time are dropped
//! at the source, and the surviving streams are merged by timestamp.
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use pcapjoin::merge::{merge, MergeConfig, OutputTarget};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = MergeConfig::new(
//!         vec![PathBuf::from("probe1.pcap"), PathBuf::from("probe2.pcap.gz")],
//!         OutputTarget::File(PathBuf::from("merged.pcap")),
//!     );
//!     let summary = merge(config).await?;
//!     println!("{} packets", summary.packets_written);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod io;
pub mod merge;
pub mod pcap;

pub use error::{Error, Result};
