//! Command-line interface module.
//!
//! Argument parsing via clap; everything else lives in the library.

mod args;

pub use args::Args;
