//! Results of a conversion run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How a conversion run ended, when it did not fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionOutcome {
    /// The PDF was written.
    Completed(ConversionStats),
    /// The user declined to overwrite `path`; nothing was written.
    Aborted { path: PathBuf },
}

impl ConversionOutcome {
    pub fn is_aborted(&self) -> bool {
        matches!(self, ConversionOutcome::Aborted { .. })
    }

    pub fn stats(&self) -> Option<&ConversionStats> {
        match self {
            ConversionOutcome::Completed(stats) => Some(stats),
            ConversionOutcome::Aborted { .. } => None,
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// `.png` / `.jpg` files found and staged.
    pub images_staged: usize,
    /// Directory entries ignored (other extensions, sub-directories).
    pub entries_skipped: usize,
    /// Pages in the written PDF.
    pub pages: usize,
    /// Path the PDF was written to (always ends in `.pdf`).
    pub output_path: PathBuf,
    /// Size of the written PDF.
    pub pdf_bytes: u64,
    /// Wall-clock time spent decoding, adjusting and re-encoding images.
    pub staging_duration_ms: u64,
    /// Wall-clock time spent building and writing the PDF.
    pub assembly_duration_ms: u64,
    pub total_duration_ms: u64,
}
