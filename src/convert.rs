//! Conversion entry points.
//!
//! A run moves through `validate → convert_images → assemble → cleanup`.
//! [`convert_dir`] chains them and guarantees the scratch directory is
//! removed whether assembly succeeds or fails. The individual steps are
//! public so callers (and tests) can drive or inspect each one.
//!
//! Declining an overwrite prompt is not an error: the step returns
//! [`Step::Aborted`] and [`convert_dir`] turns it into
//! [`ConversionOutcome::Aborted`] before anything has been written.

use crate::config::ConversionConfig;
use crate::confirm::{Decision, OverwritePrompt};
use crate::error::ImagesToPdfError;
use crate::output::{ConversionOutcome, ConversionStats};
use crate::pipeline::assemble::{list_pages, JpegPdfAssembler, PdfAssembler};
use crate::pipeline::discover::discover_images;
use crate::pipeline::scratch::{remove_existing, ScratchDir};
use crate::pipeline::stage::stage_image;
use crate::tone::Tone;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of a step that may be cancelled at an overwrite prompt.
#[derive(Debug)]
pub enum Step<T> {
    /// Carry on with the value.
    Proceed(T),
    /// The user declined to overwrite this path.
    Aborted(PathBuf),
}

/// Images staged in the scratch directory, ready for assembly.
#[derive(Debug)]
pub struct StagedImages {
    pub scratch: ScratchDir,
    pub images_staged: usize,
    pub entries_skipped: usize,
}

/// What [`assemble`] wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyReport {
    pub output_path: PathBuf,
    pub pages: usize,
    pub pdf_bytes: u64,
}

/// Convert every `.png` / `.jpg` in `input_dir` into one PDF.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// * `Ok(ConversionOutcome::Completed(stats))` once the PDF is written
/// * `Ok(ConversionOutcome::Aborted { path })` if the user declined an
///   overwrite; nothing was written and no scratch directory was left behind
///
/// # Errors
/// * [`ImagesToPdfError::InvalidTone`] / [`ImagesToPdfError::InvalidConfig`]
///   before anything is touched
/// * [`ImagesToPdfError::InputNotFound`] / [`ImagesToPdfError::NotADirectory`]
///   before any prompt or filesystem change
/// * decode, encode, assembly or write failures; the scratch directory is
///   removed before the error is returned
pub fn convert_dir(
    input_dir: impl AsRef<Path>,
    config: &ConversionConfig,
    prompt: &dyn OverwritePrompt,
) -> Result<ConversionOutcome, ImagesToPdfError> {
    let total_start = Instant::now();
    let input_dir = input_dir.as_ref();
    Tone::new(config.brightness, config.contrast)?;

    let output_path = config.resolved_output_path(input_dir);
    info!(
        "Converting images in {} → {}",
        input_dir.display(),
        output_path.display()
    );

    // ── Step 1: Validate paths ───────────────────────────────────────────
    if let Step::Aborted(path) = validate(input_dir, &output_path, prompt)? {
        return Ok(ConversionOutcome::Aborted { path });
    }

    // ── Step 2: Stage adjusted images ────────────────────────────────────
    let staging_start = Instant::now();
    let staged = match convert_images(input_dir, config, prompt)? {
        Step::Proceed(staged) => staged,
        Step::Aborted(path) => return Ok(ConversionOutcome::Aborted { path }),
    };
    let staging_duration_ms = staging_start.elapsed().as_millis() as u64;

    // ── Step 3: Assemble, then always clean up ───────────────────────────
    let assembly_start = Instant::now();
    let assembled = assemble(staged.scratch.path(), &output_path, config);
    let assembly_duration_ms = assembly_start.elapsed().as_millis() as u64;

    let cleaned = cleanup(staged.scratch);
    let report = match (assembled, cleaned) {
        (Ok(report), Ok(())) => report,
        (Ok(_), Err(e)) => return Err(e),
        (Err(e), Ok(())) => return Err(e),
        (Err(e), Err(cleanup_err)) => {
            warn!("Cleanup after failed assembly also failed: {cleanup_err}");
            return Err(e);
        }
    };

    let stats = ConversionStats {
        images_staged: staged.images_staged,
        entries_skipped: staged.entries_skipped,
        pages: report.pages,
        output_path: report.output_path,
        pdf_bytes: report.pdf_bytes,
        staging_duration_ms,
        assembly_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} pages, {} bytes, {}ms total",
        stats.pages, stats.pdf_bytes, stats.total_duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(stats.pages, stats.pdf_bytes);
    }

    Ok(ConversionOutcome::Completed(stats))
}

/// Check the input directory, then ask before overwriting `output_path`.
///
/// The input is checked first so a bad argument never triggers a prompt.
pub fn validate(
    input_dir: &Path,
    output_path: &Path,
    prompt: &dyn OverwritePrompt,
) -> Result<Step<()>, ImagesToPdfError> {
    if !input_dir.exists() {
        return Err(ImagesToPdfError::InputNotFound {
            path: input_dir.to_path_buf(),
        });
    }
    if !input_dir.is_dir() {
        return Err(ImagesToPdfError::NotADirectory {
            path: input_dir.to_path_buf(),
        });
    }

    if fs::symlink_metadata(output_path).is_ok() {
        debug!("Output {} already exists", output_path.display());
        if prompt.confirm_overwrite(output_path)? == Decision::Abort {
            return Ok(Step::Aborted(output_path.to_path_buf()));
        }
    }
    Ok(Step::Proceed(()))
}

/// Create the scratch directory and stage every input image into it.
///
/// A leftover file or directory at the scratch path is only removed after
/// the prompt agrees. Any failure while staging drops the [`ScratchDir`],
/// which removes it.
pub fn convert_images(
    input_dir: &Path,
    config: &ConversionConfig,
    prompt: &dyn OverwritePrompt,
) -> Result<Step<StagedImages>, ImagesToPdfError> {
    let tone = Tone::new(config.brightness, config.contrast)?;
    let discovery = discover_images(input_dir, &config.temp_suffix)?;

    let scratch_path = config.scratch_path(input_dir);
    if fs::symlink_metadata(&scratch_path).is_ok() {
        if prompt.confirm_overwrite(&scratch_path)? == Decision::Abort {
            return Ok(Step::Aborted(scratch_path));
        }
        info!("Removing existing {}", scratch_path.display());
        remove_existing(&scratch_path)?;
    }
    let scratch = ScratchDir::create(scratch_path)?;

    let total = discovery.images.len();
    info!(
        "Staging {} images (brightness {}, contrast {})",
        total,
        tone.brightness(),
        tone.contrast()
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(total);
    }

    for (i, entry) in discovery.images.iter().enumerate() {
        if let Some(ref cb) = config.progress_callback {
            cb.on_image_start(i + 1, total, &entry.file_name);
        }
        stage_image(
            entry,
            scratch.path(),
            &config.temp_suffix,
            &tone,
            config.jpeg_quality,
        )?;
        if let Some(ref cb) = config.progress_callback {
            cb.on_image_complete(i + 1, total, &entry.file_name);
        }
    }

    Ok(Step::Proceed(StagedImages {
        scratch,
        images_staged: total,
        entries_skipped: discovery.skipped,
    }))
}

/// Build the PDF from the files in `scratch_dir` and write it to
/// `output_path` with its extension forced to `.pdf`.
///
/// Page order follows [`ConversionConfig::page_order`]. The file is written
/// to a sibling temp path and renamed into place, so a failure never leaves
/// a partial PDF behind.
pub fn assemble(
    scratch_dir: &Path,
    output_path: &Path,
    config: &ConversionConfig,
) -> Result<AssemblyReport, ImagesToPdfError> {
    let output_path = crate::config::force_pdf_extension(output_path);

    let pages = list_pages(scratch_dir, config.page_order)?;
    if pages.is_empty() {
        return Err(ImagesToPdfError::NoImages {
            dir: scratch_dir.to_path_buf(),
        });
    }
    if let Some(ref cb) = config.progress_callback {
        cb.on_assembly_start(pages.len());
    }

    let assembler = resolve_assembler(config);
    let bytes = assembler.assemble(&pages)?;
    write_atomic(&output_path, &bytes)?;

    info!("Wrote {} ({} pages)", output_path.display(), pages.len());
    Ok(AssemblyReport {
        output_path,
        pages: pages.len(),
        pdf_bytes: bytes.len() as u64,
    })
}

/// Remove the scratch directory and everything in it.
pub fn cleanup(scratch: ScratchDir) -> Result<(), ImagesToPdfError> {
    scratch.close()
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn resolve_assembler(config: &ConversionConfig) -> Arc<dyn PdfAssembler> {
    match config.assembler {
        Some(ref assembler) => Arc::clone(assembler),
        None => Arc::new(JpegPdfAssembler {
            dpi: config.dpi,
            reencode_quality: config.jpeg_quality,
        }),
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ImagesToPdfError> {
    let write_err = |source| ImagesToPdfError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let tmp_path = path.with_extension("pdf.tmp");
    if let Err(e) = fs::write(&tmp_path, bytes) {
        let _ = fs::remove_file(&tmp_path);
        return Err(write_err(e));
    }
    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        write_err(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::AutoConfirm;

    #[test]
    fn validate_missing_input() {
        let root = tempfile::tempdir().unwrap();
        let err = validate(
            &root.path().join("nope"),
            &root.path().join("out.pdf"),
            &AutoConfirm(Decision::Proceed),
        )
        .unwrap_err();
        assert!(matches!(err, ImagesToPdfError::InputNotFound { .. }));
        assert!(err.is_invalid_input());
    }

    #[test]
    fn validate_file_as_input() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("a.png");
        fs::write(&file, b"x").unwrap();
        let err = validate(&file, &root.path().join("out.pdf"), &AutoConfirm(Decision::Proceed))
            .unwrap_err();
        assert!(matches!(err, ImagesToPdfError::NotADirectory { .. }));
    }

    #[test]
    fn validate_prompts_only_when_output_exists() {
        let root = tempfile::tempdir().unwrap();
        let out = root.path().join("out.pdf");

        let step = validate(root.path(), &out, &AutoConfirm(Decision::Abort)).unwrap();
        assert!(matches!(step, Step::Proceed(())));

        fs::write(&out, b"old").unwrap();
        let step = validate(root.path(), &out, &AutoConfirm(Decision::Abort)).unwrap();
        assert!(matches!(step, Step::Aborted(ref p) if p == &out));

        let step = validate(root.path(), &out, &AutoConfirm(Decision::Proceed)).unwrap();
        assert!(matches!(step, Step::Proceed(())));
    }

    #[test]
    fn write_atomic_creates_parents_and_leaves_no_temp() {
        let root = tempfile::tempdir().unwrap();
        let out = root.path().join("nested/dir/out.pdf");
        write_atomic(&out, b"%PDF-1.7").unwrap();
        assert_eq!(fs::read(&out).unwrap(), b"%PDF-1.7");
        assert!(!out.with_extension("pdf.tmp").exists());
    }

    #[test]
    fn assemble_empty_scratch_is_no_images() {
        let root = tempfile::tempdir().unwrap();
        let err = assemble(
            root.path(),
            &root.path().join("out.pdf"),
            &ConversionConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ImagesToPdfError::NoImages { .. }));
        assert!(!root.path().join("out.pdf").exists());
    }
}
