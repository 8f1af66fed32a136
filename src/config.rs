//! Configuration types for image-directory-to-PDF conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. `build()` validates the tone values
//! and the scratch naming so a bad configuration fails before any filesystem
//! work starts.

use crate::error::ImagesToPdfError;
use crate::pipeline::assemble::PdfAssembler;
use crate::progress::ProgressCallback;
use crate::tone::Tone;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Name of the scratch directory created inside the input directory.
pub const DEFAULT_SCRATCH_DIR_NAME: &str = ".images_to_pdf_temp";

/// Suffix appended to each staged image's base name.
pub const DEFAULT_TEMP_SUFFIX: &str = "__temp";

/// File name of the PDF when no output path is given.
pub const DEFAULT_OUTPUT_NAME: &str = "combined_imgs.pdf";

/// Configuration for converting one image directory into a PDF.
///
/// # Example
/// ```rust
/// use images_to_pdf::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .brightness(20)
///     .contrast(-10)
///     .output_path("scans.pdf")
///     .build()
///     .unwrap();
/// assert_eq!(config.tone().brightness(), 20);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Brightness shift, -255..=255. Default: 0.
    pub brightness: i32,

    /// Contrast factor input, -255..=255 except 131. Default: 0.
    pub contrast: i32,

    /// Where to write the PDF. The extension is always forced to `.pdf`.
    /// If None, `<input_dir>/combined_imgs.pdf`.
    pub output_path: Option<PathBuf>,

    /// Appended to each staged file's stem. Default: `__temp`.
    pub temp_suffix: String,

    /// Scratch directory name, created inside the input directory.
    /// Default: `.images_to_pdf_temp`.
    pub scratch_dir_name: String,

    /// JPEG quality for staged images, 1–100. Default: 95.
    pub jpeg_quality: u8,

    /// Resolution used to size PDF pages from pixel dimensions. Default: 96.
    ///
    /// A 960 × 1440 px scan becomes a 720 × 1080 pt page (10 × 15 in).
    pub dpi: f32,

    /// Order of pages in the PDF. Default: [`PageOrder::Name`].
    pub page_order: PageOrder,

    /// Pre-constructed assembler. If None, uses
    /// [`crate::pipeline::assemble::JpegPdfAssembler`] with `dpi`.
    pub assembler: Option<Arc<dyn PdfAssembler>>,

    /// Optional per-image progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            brightness: 0,
            contrast: 0,
            output_path: None,
            temp_suffix: DEFAULT_TEMP_SUFFIX.to_string(),
            scratch_dir_name: DEFAULT_SCRATCH_DIR_NAME.to_string(),
            jpeg_quality: 95,
            dpi: 96.0,
            page_order: PageOrder::default(),
            assembler: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("brightness", &self.brightness)
            .field("contrast", &self.contrast)
            .field("output_path", &self.output_path)
            .field("temp_suffix", &self.temp_suffix)
            .field("scratch_dir_name", &self.scratch_dir_name)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("dpi", &self.dpi)
            .field("page_order", &self.page_order)
            .field(
                "assembler",
                &self.assembler.as_ref().map(|_| "<dyn PdfAssembler>"),
            )
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The tone adjustment described by `brightness` and `contrast`.
    ///
    /// Falls back to the identity when the fields were mutated into an
    /// invalid state after `build()`; [`crate::convert::convert_dir`] checks
    /// them again with [`Tone::new`] before use.
    pub fn tone(&self) -> Tone {
        Tone::new(self.brightness, self.contrast).unwrap_or_default()
    }

    /// The PDF path that will actually be written for `input_dir`:
    /// the configured path (or the default inside `input_dir`) with its
    /// extension replaced by `.pdf`.
    pub fn resolved_output_path(&self, input_dir: &Path) -> PathBuf {
        let raw = self
            .output_path
            .clone()
            .unwrap_or_else(|| input_dir.join(DEFAULT_OUTPUT_NAME));
        force_pdf_extension(&raw)
    }

    /// Location of the scratch directory for `input_dir`.
    pub fn scratch_path(&self, input_dir: &Path) -> PathBuf {
        input_dir.join(&self.scratch_dir_name)
    }

    fn validate(&self) -> Result<(), ImagesToPdfError> {
        Tone::new(self.brightness, self.contrast)?;

        if self.temp_suffix.is_empty() || self.temp_suffix.contains(['/', '\\']) {
            return Err(ImagesToPdfError::InvalidConfig(format!(
                "temp suffix must be a non-empty file-name fragment, got {:?}",
                self.temp_suffix
            )));
        }
        let mut components = Path::new(&self.scratch_dir_name).components();
        let single_normal = matches!(
            (components.next(), components.next()),
            (Some(std::path::Component::Normal(_)), None)
        );
        if !single_normal {
            return Err(ImagesToPdfError::InvalidConfig(format!(
                "scratch directory name must be a single path component, got {:?}",
                self.scratch_dir_name
            )));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ImagesToPdfError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                self.jpeg_quality
            )));
        }
        if !(self.dpi.is_finite() && self.dpi > 0.0) {
            return Err(ImagesToPdfError::InvalidConfig(format!(
                "DPI must be positive, got {}",
                self.dpi
            )));
        }
        Ok(())
    }
}

/// Replace the last extension of `path` with `pdf`, adding it when absent.
pub fn force_pdf_extension(path: &Path) -> PathBuf {
    path.with_extension("pdf")
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn brightness(mut self, b: i32) -> Self {
        self.config.brightness = b;
        self
    }

    pub fn contrast(mut self, c: i32) -> Self {
        self.config.contrast = c;
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = Some(path.into());
        self
    }

    pub fn temp_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.temp_suffix = suffix.into();
        self
    }

    pub fn scratch_dir_name(mut self, name: impl Into<String>) -> Self {
        self.config.scratch_dir_name = name.into();
        self
    }

    pub fn jpeg_quality(mut self, q: u8) -> Self {
        self.config.jpeg_quality = q;
        self
    }

    pub fn dpi(mut self, dpi: f32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn page_order(mut self, order: PageOrder) -> Self {
        self.config.page_order = order;
        self
    }

    pub fn assembler(mut self, assembler: Arc<dyn PdfAssembler>) -> Self {
        self.config.assembler = Some(assembler);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ImagesToPdfError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Order in which staged images become PDF pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageOrder {
    /// Sort staged files by file name (byte order). (default)
    #[default]
    Name,
    /// Keep whatever order the filesystem lists the scratch directory in.
    /// Not guaranteed alphabetical and may differ between machines.
    Directory,
}
