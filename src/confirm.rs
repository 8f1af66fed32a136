//! Overwrite confirmation.
//!
//! The pipeline never reads the terminal itself. Whenever it is about to
//! replace something that already exists (the output PDF, or a leftover
//! scratch directory) it asks an injected [`OverwritePrompt`] and gets back
//! a [`Decision`]. The CLI uses [`ConsolePrompt`]; `--yes` and tests use
//! [`AutoConfirm`] or their own implementation.

use crate::error::ImagesToPdfError;
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::debug;

/// Answer to "overwrite this path?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Abort,
}

/// Asks whether an existing path may be overwritten.
pub trait OverwritePrompt {
    fn confirm_overwrite(&self, path: &Path) -> Result<Decision, ImagesToPdfError>;
}

/// Always returns the same decision without asking anyone.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub Decision);

impl OverwritePrompt for AutoConfirm {
    fn confirm_overwrite(&self, path: &Path) -> Result<Decision, ImagesToPdfError> {
        debug!("Auto-answering overwrite of {}: {:?}", path.display(), self.0);
        Ok(self.0)
    }
}

/// Interactive prompt on stdin, with the question written to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolePrompt;

impl OverwritePrompt for ConsolePrompt {
    fn confirm_overwrite(&self, path: &Path) -> Result<Decision, ImagesToPdfError> {
        let stdin = io::stdin();
        let stderr = io::stderr();
        ask_overwrite(path, &mut stdin.lock(), &mut stderr.lock())
            .map_err(|source| ImagesToPdfError::PromptFailed { source })
    }
}

/// Run the `Continue (Y/n)` loop against arbitrary reader/writer handles.
///
/// `y` / `n` are accepted case-insensitively with surrounding whitespace; a
/// bare Enter means yes. Anything else repeats the question. End of input
/// counts as `n`, so a closed stdin can never loop forever or overwrite.
pub fn ask_overwrite<R: BufRead, W: Write>(
    path: &Path,
    input: &mut R,
    output: &mut W,
) -> io::Result<Decision> {
    let mut line = String::new();
    loop {
        write!(
            output,
            "Proceeding will overwrite the following file: {}\nContinue (Y/n): ",
            path.display()
        )?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(Decision::Abort);
        }

        let raw = line.trim_end_matches(['\r', '\n']);
        if raw.is_empty() {
            return Ok(Decision::Proceed);
        }
        match raw.trim().to_lowercase().as_str() {
            "y" => return Ok(Decision::Proceed),
            "n" => return Ok(Decision::Abort),
            _ => continue,
        }
    }
}
