//! # images-to-pdf
//!
//! Combine a directory of `.png` / `.jpg` images into a single PDF, with an
//! optional brightness/contrast adjustment applied to every image first.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input dir
//!  │
//!  ├─ 1. Validate  input is a directory; confirm before overwriting the PDF
//!  ├─ 2. Discover  keep *.png / *.jpg, skip everything else
//!  ├─ 3. Stage     decode → brightness/contrast → JPEG in <input>/.images_to_pdf_temp
//!  ├─ 4. Assemble  one PDF page per staged JPEG
//!  └─ 5. Cleanup   scratch directory removed, on success and on failure
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use images_to_pdf::{convert_dir, ConsolePrompt, ConversionConfig, ConversionOutcome};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .brightness(20)
//!         .contrast(30)
//!         .output_path("scans.pdf")
//!         .build()?;
//!     match convert_dir("./scans", &config, &ConsolePrompt)? {
//!         ConversionOutcome::Completed(stats) => eprintln!("{} pages", stats.pages),
//!         ConversionOutcome::Aborted { .. } => eprintln!("Operation canceled."),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Page order
//!
//! Pages are sorted by staged file name by default. [`PageOrder::Directory`]
//! keeps raw filesystem iteration order instead, which is not guaranteed to
//! be alphabetical.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `images-to-pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod confirm;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod tone;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, PageOrder};
pub use confirm::{AutoConfirm, ConsolePrompt, Decision, OverwritePrompt};
pub use convert::{assemble, cleanup, convert_dir, convert_images, validate, Step};
pub use error::ImagesToPdfError;
pub use output::{ConversionOutcome, ConversionStats};
pub use pipeline::assemble::{JpegPdfAssembler, PdfAssembler};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use tone::Tone;
