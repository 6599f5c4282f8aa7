//! Command-line argument definitions.

use clap::Parser;
use std::path::PathBuf;

use crate::merge::{MergeConfig, OutputTarget, DEFAULT_CHANNEL_CAPACITY};

/// Merge PCAP files by timestamp, skipping corrupt or unreadable inputs.
#[derive(Parser, Debug)]
#[command(name = "pcapjoin")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input capture files (plain or compressed)
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Output file, `-` for stdout
    #[arg(short = 'w', long = "write", value_name = "OUTPUT", default_value = "-")]
    pub output: String,

    /// Report skipped files and packets (-vv for debug, -vvv for trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Packets buffered per input while merging
    #[arg(long = "channel-capacity", default_value_t = DEFAULT_CHANNEL_CAPACITY, hide = true)]
    pub channel_capacity: usize,
}

impl Args {
    /// Log filter for the requested verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Build the merge configuration.
    pub fn merge_config(&self) -> MergeConfig {
        MergeConfig::new(self.inputs.clone(), OutputTarget::from_arg(&self.output))
            .with_verbose(self.verbose > 0)
            .with_channel_capacity(self.channel_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["pcapjoin", "a.pcap", "b.pcap.gz"]).unwrap();
        assert_eq!(args.inputs.len(), 2);
        assert_eq!(args.output, "-");
        assert_eq!(args.log_filter(), "warn");

        let config = args.merge_config();
        assert_eq!(config.output, OutputTarget::Stdout);
        assert!(!config.verbose);
    }

    #[test]
    fn test_write_and_verbose() {
        let args = Args::try_parse_from(["pcapjoin", "-vv", "-w", "out.pcap", "a.pcap"]).unwrap();
        assert_eq!(args.log_filter(), "debug");

        let config = args.merge_config();
        assert_eq!(config.output, OutputTarget::File(PathBuf::from("out.pcap")));
        assert!(config.verbose);
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        let err = Args::try_parse_from(["pcapjoin", "--banana"]).unwrap_err();
        assert!(err.to_string().contains("--banana"));
    }
}
