//! Staging: decode an input image, apply the tone map, write it back as JPEG.
//!
//! Images are decoded as 8-bit three-channel colour: alpha is dropped and
//! greyscale is expanded, so every staged file is a baseline RGB JPEG the
//! assembler can embed unchanged. The format is sniffed from the file
//! contents, so a PNG saved with a `.jpg` name still decodes. The EXIF
//! Orientation tag is applied while decoding; the staged JPEG carries no
//! EXIF, so its pixels must already be upright.

use crate::error::ImagesToPdfError;
use crate::pipeline::discover::ImageEntry;
use crate::tone::Tone;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageDecoder, ImageError, ImageReader, RgbImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Decode `path` into an upright 8-bit RGB buffer.
pub fn load_rgb(path: &Path) -> Result<RgbImage, ImagesToPdfError> {
    let decode_err = |source: ImageError| ImagesToPdfError::ImageDecodeFailed {
        path: path.to_path_buf(),
        source,
    };

    let mut decoder = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| decode_err(ImageError::IoError(e)))?
        .into_decoder()
        .map_err(decode_err)?;
    let orientation = decoder.orientation().map_err(decode_err)?;
    let mut img = DynamicImage::from_decoder(decoder).map_err(decode_err)?;
    img.apply_orientation(orientation);
    Ok(img.to_rgb8())
}

/// Encode `img` as a JPEG of the given quality at `dest`.
pub fn save_jpeg(img: &RgbImage, dest: &Path, quality: u8) -> Result<(), ImagesToPdfError> {
    let encode_err = |source| ImagesToPdfError::ImageEncodeFailed {
        path: dest.to_path_buf(),
        source,
    };

    let file = File::create(dest).map_err(|e| encode_err(ImageError::IoError(e)))?;
    let mut writer = BufWriter::new(file);
    img.write_with_encoder(JpegEncoder::new_with_quality(&mut writer, quality))
        .map_err(encode_err)?;
    writer
        .flush()
        .map_err(|e| encode_err(ImageError::IoError(e)))?;
    Ok(())
}

/// Stage one image into `scratch_dir` and return the staged file's path.
pub fn stage_image(
    entry: &ImageEntry,
    scratch_dir: &Path,
    temp_suffix: &str,
    tone: &Tone,
    quality: u8,
) -> Result<PathBuf, ImagesToPdfError> {
    let pixels = load_rgb(&entry.path)?;
    let adjusted = tone.adjust(&pixels);

    let dest = scratch_dir.join(entry.staged_name(temp_suffix));
    save_jpeg(&adjusted, &dest, quality)?;

    debug!(
        "Staged {} → {} ({}x{} px)",
        entry.file_name,
        dest.display(),
        adjusted.width(),
        adjusted.height()
    );
    Ok(dest)
}
