//! CLI binary for images-to-pdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig`, runs the conversion and sets the exit code.

use anyhow::{Context, Result};
use clap::Parser;
use images_to_pdf::{
    convert_dir, AutoConfirm, ConsolePrompt, ConversionConfig, ConversionOutcome,
    ConversionProgressCallback, Decision, ImagesToPdfError, OverwritePrompt, PageOrder,
    ProgressCallback,
};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress bar. Stays hidden until staging starts so it never
/// draws over an overwrite prompt.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::hidden());
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} images  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Staging");
        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_images: usize) {
        self.bar.set_length(total_images as u64);
        self.bar.set_draw_target(ProgressDrawTarget::stderr());
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    fn on_image_start(&self, _index: usize, _total: usize, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn on_image_complete(&self, _index: usize, _total: usize, name: &str) {
        self.bar.println(format!("  {} {}", green("✓"), dim(name)));
        self.bar.inc(1);
    }

    fn on_assembly_start(&self, pages: usize) {
        self.bar.set_prefix("Assembling");
        self.bar.set_message(format!("{pages} pages"));
    }

    fn on_conversion_complete(&self, _pages: usize, _pdf_bytes: u64) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Combine ./scans/*.png and ./scans/*.jpg into ./scans/combined_imgs.pdf
  images-to-pdf ./scans

  # Custom output (the extension is always replaced by .pdf)
  images-to-pdf ./scans -o ~/Documents/receipts.pdf

  # Brighten washed-out phone photos of a whiteboard
  images-to-pdf ./board -b 40 -c 60

  # Non-interactive: overwrite without asking, print JSON stats
  images-to-pdf ./scans --yes --json

TONE ADJUSTMENT:
  Brightness and contrast both take -255..=255 (contrast 131 is undefined).
  Brightness is applied first, then contrast, to every colour channel.

PAGE ORDER:
  By default pages are sorted by file name. --page-order directory keeps
  the order the filesystem lists files in, which is not guaranteed.

EXIT STATUS:
  0  PDF written, or the user answered "n" at an overwrite prompt
  1  conversion failed
  2  invalid input directory or tone values
"#;

/// Combine a directory of PNG/JPEG images into one PDF.
#[derive(Parser, Debug)]
#[command(
    name = "images-to-pdf",
    version,
    about = "Combine a directory of PNG/JPEG images into one PDF",
    long_about = "Combine every .png and .jpg file in a directory into a single PDF, one page \
per image, optionally adjusting brightness and contrast first. Adjusted copies are staged in \
<imgs_path>/.images_to_pdf_temp, which is removed afterwards.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory containing the images to be converted to a PDF.
    imgs_path: PathBuf,

    /// Path, including file name, of the output PDF [default: <imgs_path>/combined_imgs.pdf].
    #[arg(
        short = 'o',
        long = "output_path",
        visible_alias = "output-path",
        env = "IMAGES_TO_PDF_OUTPUT"
    )]
    output_path: Option<PathBuf>,

    /// Brightness adjustment (-255..=255).
    #[arg(short, long, env = "IMAGES_TO_PDF_BRIGHTNESS", default_value_t = 0,
          allow_hyphen_values = true)]
    brightness: i32,

    /// Contrast adjustment (-255..=255, not 131).
    #[arg(short, long, env = "IMAGES_TO_PDF_CONTRAST", default_value_t = 0,
          allow_hyphen_values = true)]
    contrast: i32,

    /// Page order: name (sorted) or directory (filesystem order).
    #[arg(long, env = "IMAGES_TO_PDF_PAGE_ORDER", value_enum, default_value = "name")]
    page_order: PageOrderArg,

    /// JPEG quality of the staged images (1–100).
    #[arg(long, env = "IMAGES_TO_PDF_JPEG_QUALITY", default_value_t = 95,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: u8,

    /// Pixels per inch used to size PDF pages.
    #[arg(long, env = "IMAGES_TO_PDF_DPI", default_value_t = 96.0)]
    dpi: f32,

    /// Overwrite existing files without asking.
    #[arg(short, long)]
    yes: bool,

    /// Print the result as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "IMAGES_TO_PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "IMAGES_TO_PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "IMAGES_TO_PDF_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum PageOrderArg {
    Name,
    Directory,
}

impl From<PageOrderArg> for PageOrder {
    fn from(v: PageOrderArg) -> Self {
        match v {
            PageOrderArg::Name => PageOrder::Name,
            PageOrderArg::Directory => PageOrder::Directory,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Keep library INFO logs out of the way while the progress bar is drawn.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if show_progress {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    ExitCode::from(status(run(&cli, show_progress)))
}

/// Print a failure and pick the process exit status.
fn status(result: Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{} {:#}", red("error:"), err);
            exit_status(&err)
        }
    }
}

fn run(cli: &Cli, show_progress: bool) -> Result<()> {
    let progress = show_progress.then(CliProgressCallback::new);

    let auto;
    let prompt: &dyn OverwritePrompt = if cli.yes {
        auto = AutoConfirm(Decision::Proceed);
        &auto
    } else {
        &ConsolePrompt
    };

    let outcome = run_conversion(cli, prompt, progress)?;
    report(cli, outcome)
}

/// Build the config and convert. The progress bar is cleared whatever the
/// result, so it never draws over the error line.
fn run_conversion(
    cli: &Cli,
    prompt: &dyn OverwritePrompt,
    progress: Option<Arc<CliProgressCallback>>,
) -> Result<ConversionOutcome> {
    let callback = progress.clone().map(|p| p as ProgressCallback);
    let config = build_config(cli, callback)?;

    let result = convert_dir(&cli.imgs_path, &config, prompt);
    if let Some(progress) = progress {
        progress.bar.finish_and_clear();
    }
    result.context("Conversion failed")
}

fn report(cli: &Cli, outcome: ConversionOutcome) -> Result<()> {
    if cli.json {
        let json = serde_json::to_string_pretty(&outcome).context("Failed to serialise output")?;
        println!("{json}");
        return Ok(());
    }

    match outcome {
        ConversionOutcome::Aborted { .. } => {
            println!("Operation canceled.");
        }
        ConversionOutcome::Completed(stats) => {
            if !cli.quiet {
                eprintln!(
                    "{}  {} pages  {}ms  →  {}",
                    green("✔"),
                    stats.pages,
                    stats.total_duration_ms,
                    bold(&stats.output_path.display().to_string()),
                );
                if stats.entries_skipped > 0 {
                    eprintln!(
                        "   {}",
                        dim(&format!("{} non-image entries skipped", stats.entries_skipped))
                    );
                }
            }
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .brightness(cli.brightness)
        .contrast(cli.contrast)
        .page_order(cli.page_order.into())
        .jpeg_quality(cli.jpeg_quality)
        .dpi(cli.dpi);

    if let Some(ref path) = cli.output_path {
        builder = builder.output_path(path);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Bad arguments exit with 2, everything else with 1.
fn exit_status(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<ImagesToPdfError>() {
        Some(e) if e.is_invalid_input() || matches!(e, ImagesToPdfError::InvalidTone(_)) => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::ffi::OsStr;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_reference_flags() {
        let cli = Cli::try_parse_from([
            "images-to-pdf",
            "scans",
            "--output_path",
            "out.txt",
            "-b",
            "-40",
            "-c",
            "25",
        ])
        .unwrap();
        assert_eq!(cli.imgs_path, PathBuf::from("scans"));
        assert_eq!(cli.output_path, Some(PathBuf::from("out.txt")));
        assert_eq!(cli.brightness, -40);
        assert_eq!(cli.contrast, 25);
        assert!(!cli.yes);
    }

    #[test]
    fn defaults_are_neutral() {
        let cli = Cli::try_parse_from(["images-to-pdf", "scans"]).unwrap();
        let config = build_config(&cli, None).unwrap();
        assert!(config.tone().is_identity());
        assert_eq!(config.page_order, PageOrder::Name);
        assert_eq!(config.output_path, None);
    }

    #[test]
    fn invalid_tone_maps_to_exit_2() {
        let cli = Cli::try_parse_from(["images-to-pdf", "scans", "-c", "131"]).unwrap();
        let err = build_config(&cli, None).unwrap_err();
        assert_eq!(exit_status(&err), 2);
    }

    #[test]
    fn bad_input_directory_maps_to_exit_2() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.png");
        std::fs::write(&file, b"x").unwrap();
        let prompt = AutoConfirm(Decision::Proceed);

        for input in [dir.path().join("missing"), file] {
            let cli = Cli::try_parse_from([OsStr::new("images-to-pdf"), input.as_os_str()])
                .unwrap();
            let err = run_conversion(&cli, &prompt, None).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<ImagesToPdfError>(),
                Some(ImagesToPdfError::InputNotFound { .. } | ImagesToPdfError::NotADirectory { .. })
            ));
            assert_eq!(exit_status(&err), 2);
        }
    }

    #[test]
    fn conversion_failure_maps_to_exit_1() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.png"), b"not an image").unwrap();
        let cli = Cli::try_parse_from([OsStr::new("images-to-pdf"), dir.path().as_os_str()])
            .unwrap();

        let err = run_conversion(&cli, &AutoConfirm(Decision::Proceed), None).unwrap_err();
        assert_eq!(exit_status(&err), 1);
    }

    #[test]
    fn declined_overwrite_exits_0() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("combined_imgs.pdf"), b"keep").unwrap();
        let cli = Cli::try_parse_from([
            OsStr::new("images-to-pdf"),
            dir.path().as_os_str(),
            OsStr::new("--json"),
        ])
        .unwrap();

        let outcome = run_conversion(&cli, &AutoConfirm(Decision::Abort), None).unwrap();
        assert!(outcome.is_aborted());
        assert_eq!(status(report(&cli, outcome)), 0);
        assert_eq!(std::fs::read(dir.path().join("combined_imgs.pdf")).unwrap(), b"keep");
    }

    #[test]
    fn progress_bar_is_cleared_when_staging_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.png"), b"not an image").unwrap();
        let cli = Cli::try_parse_from([OsStr::new("images-to-pdf"), dir.path().as_os_str()])
            .unwrap();
        let progress = CliProgressCallback::new();

        let result = run_conversion(
            &cli,
            &AutoConfirm(Decision::Proceed),
            Some(Arc::clone(&progress)),
        );
        assert!(result.is_err());
        assert!(progress.bar.is_finished());
    }
}
