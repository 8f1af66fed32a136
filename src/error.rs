//! Error type for the images-to-pdf library.
//!
//! Every failure is fatal for the run: there is no per-image tolerance, the
//! first image that cannot be decoded or staged aborts the conversion. The
//! scratch directory is still removed on every error path (see
//! [`crate::pipeline::scratch::ScratchDir`]).
//!
//! A user declining an overwrite prompt is *not* an error. It is reported as
//! [`crate::output::ConversionOutcome::Aborted`] so the caller can exit
//! cleanly.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the images-to-pdf library.
#[derive(Debug, Error)]
pub enum ImagesToPdfError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The input images directory does not exist.
    #[error("Input path in argument does not exist: '{path}'")]
    InputNotFound { path: PathBuf },

    /// The input path exists but is not a directory.
    #[error("Invalid input images path: '{path}' is not a directory")]
    NotADirectory { path: PathBuf },

    /// Brightness or contrast outside the accepted range.
    #[error("Invalid tone adjustment: {0}")]
    InvalidTone(String),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Two input images would be staged under the same file name
    /// (e.g. `scan.png` and `scan.jpg`).
    #[error("Images '{first}' and '{second}' both map to staged file '{staged}'\nRename one of them.")]
    DuplicateImageName {
        staged: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// Listing a directory failed.
    #[error("Failed to read directory '{path}': {source}")]
    ReadDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Image errors ──────────────────────────────────────────────────────
    /// An input image could not be opened or decoded.
    #[error("Failed to decode image '{path}': {source}")]
    ImageDecodeFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A staged JPEG could not be encoded or written.
    #[error("Failed to write staged image '{path}': {source}")]
    ImageEncodeFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    // ── Scratch directory errors ──────────────────────────────────────────
    /// Creating, clearing or removing the scratch directory failed.
    #[error("Scratch directory '{path}': {source}")]
    ScratchDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Assembly errors ───────────────────────────────────────────────────
    /// The scratch directory held no images, so there is nothing to put in a PDF.
    #[error("No .png or .jpg images found to assemble in '{dir}'")]
    NoImages { dir: PathBuf },

    /// The PDF assembler rejected an image or failed to produce a document.
    #[error("PDF assembly failed for '{path}': {detail}")]
    AssemblyFailed { path: PathBuf, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output PDF.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading the answer to an overwrite prompt failed.
    #[error("Failed to read confirmation from the terminal: {source}")]
    PromptFailed {
        #[source]
        source: std::io::Error,
    },
}

impl ImagesToPdfError {
    /// True for errors caused by a bad input directory argument.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            ImagesToPdfError::InputNotFound { .. } | ImagesToPdfError::NotADirectory { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_a_directory_display() {
        let e = ImagesToPdfError::NotADirectory {
            path: PathBuf::from("/tmp/photo.png"),
        };
        let msg = e.to_string();
        assert!(msg.contains("/tmp/photo.png"), "got: {msg}");
        assert!(e.is_invalid_input());
    }

    #[test]
    fn duplicate_name_display() {
        let e = ImagesToPdfError::DuplicateImageName {
            staged: "scan__temp.jpg".into(),
            first: PathBuf::from("scan.png"),
            second: PathBuf::from("scan.jpg"),
        };
        let msg = e.to_string();
        assert!(msg.contains("scan__temp.jpg"));
        assert!(msg.contains("scan.png"));
        assert!(!e.is_invalid_input());
    }

    #[test]
    fn output_write_failed_keeps_source() {
        use std::error::Error as _;

        let e = ImagesToPdfError::OutputWriteFailed {
            path: PathBuf::from("out.pdf"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.to_string().contains("out.pdf"));
        assert!(e.source().is_some());
    }
}
