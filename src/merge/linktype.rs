//! Link-type reconciliation across inputs.

use std::path::{Path, PathBuf};

use crate::error::MergeError;
use crate::pcap::Linktype;

/// Link type written when no input produced a usable header.
pub const DEFAULT_LINK_TYPE: Linktype = Linktype::ETHERNET;

/// The first reported link type becomes the reference; any later report
/// that differs aborts the run.
#[derive(Debug, Default)]
pub struct LinkTypeReconciler {
    reference: Option<(Linktype, PathBuf)>,
}

impl LinkTypeReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the link type of `path`.
    pub fn observe(&mut self, path: &Path, link_type: Linktype) -> Result<(), MergeError> {
        match &self.reference {
            None => {
                tracing::debug!(path = %path.display(), ?link_type, "reference link type");
                self.reference = Some((link_type, path.to_path_buf()));
                Ok(())
            }
            Some((expected, _)) if *expected == link_type => Ok(()),
            Some((expected, reference_path)) => {
                tracing::error!(
                    path = %path.display(),
                    reference = %reference_path.display(),
                    "link type mismatch"
                );
                Err(MergeError::LinkTypeMismatch {
                    path: path.to_path_buf(),
                    expected: *expected,
                    found: link_type,
                })
            }
        }
    }

    /// The reference link type, if any input has reported one.
    pub fn link_type(&self) -> Option<Linktype> {
        self.reference.as_ref().map(|(link_type, _)| *link_type)
    }

    /// Link type for the output header.
    pub fn output_link_type(&self) -> Linktype {
        self.link_type().unwrap_or(DEFAULT_LINK_TYPE)
    }
}
