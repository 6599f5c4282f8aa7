//! Merge configuration.

use std::fmt;
use std::path::PathBuf;

/// Records buffered per source between its worker and the coordinator.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Where the merged capture goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Standard output
    Stdout,
    /// A file, created or truncated
    File(PathBuf),
}

impl OutputTarget {
    /// `-` means stdout, anything else is a file path.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            OutputTarget::Stdout
        } else {
            OutputTarget::File(PathBuf::from(arg))
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::Stdout => write!(f, "<stdout>"),
            OutputTarget::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Everything a merge run needs. Passed explicitly; the core reads no
/// process-wide state.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Inputs in priority order: earlier inputs win timestamp ties.
    pub inputs: Vec<PathBuf>,
    pub output: OutputTarget,
    /// Report every discarded file or record as a warning.
    pub verbose: bool,
    pub channel_capacity: usize,
}

impl MergeConfig {
    pub fn new(inputs: Vec<PathBuf>, output: OutputTarget) -> Self {
        Self {
            inputs,
            output,
            verbose: false,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the per-source channel capacity (at least 1).
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }
}
