//! PDF assembly: one page per image, in the order given.
//!
//! [`PdfAssembler`] is the boundary the conversion pipeline talks to; tests
//! swap in their own implementation to simulate failures. The default
//! [`JpegPdfAssembler`] embeds baseline JPEG data as-is (`DCTDecode`), so the
//! staged files reach the PDF without a second lossy pass. Any other input is
//! decoded and re-encoded as JPEG first.

use crate::config::PageOrder;
use crate::error::ImagesToPdfError;
use image::codecs::jpeg::JpegEncoder;
use image::ImageFormat;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, TextStr};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Builds a PDF document from image files.
pub trait PdfAssembler: Send + Sync {
    /// Return the bytes of a PDF with one page per entry of `images`, in order.
    fn assemble(&self, images: &[PathBuf]) -> Result<Vec<u8>, ImagesToPdfError>;
}

/// Default assembler backed by `pdf-writer`.
#[derive(Debug, Clone, Copy)]
pub struct JpegPdfAssembler {
    /// Pixels per inch used to size each page.
    pub dpi: f32,
    /// Quality used when a non-JPEG input has to be re-encoded.
    pub reencode_quality: u8,
}

impl Default for JpegPdfAssembler {
    fn default() -> Self {
        Self {
            dpi: 96.0,
            reencode_quality: 95,
        }
    }
}

const IMAGE_NAME: Name<'static> = Name(b"Im0");

impl PdfAssembler for JpegPdfAssembler {
    fn assemble(&self, images: &[PathBuf]) -> Result<Vec<u8>, ImagesToPdfError> {
        if images.is_empty() {
            return Err(ImagesToPdfError::NoImages { dir: PathBuf::new() });
        }

        let mut alloc = Ref::new(1);
        let catalog_id = alloc.bump();
        let page_tree_id = alloc.bump();
        let info_id = alloc.bump();

        let mut pdf = Pdf::new();
        let mut page_ids = Vec::with_capacity(images.len());

        for path in images {
            let jpeg = load_jpeg(path, self.reencode_quality)?;
            let (w, h) = jpeg.page_size(self.dpi);

            let page_id = alloc.bump();
            let image_id = alloc.bump();
            let content_id = alloc.bump();
            page_ids.push(page_id);

            let mut page = pdf.page(page_id);
            page.media_box(Rect::new(0.0, 0.0, w, h));
            page.parent(page_tree_id);
            page.contents(content_id);
            page.resources().x_objects().pair(IMAGE_NAME, image_id);
            page.finish();

            let mut xobject = pdf.image_xobject(image_id, &jpeg.data);
            xobject.filter(Filter::DctDecode);
            xobject.width(jpeg.width as i32);
            xobject.height(jpeg.height as i32);
            match jpeg.components {
                1 => xobject.color_space().device_gray(),
                _ => xobject.color_space().device_rgb(),
            }
            xobject.bits_per_component(8);
            xobject.finish();

            let mut content = Content::new();
            content.save_state();
            content.transform([w, 0.0, 0.0, h, 0.0, 0.0]);
            content.x_object(IMAGE_NAME);
            content.restore_state();
            pdf.stream(content_id, &content.finish());

            debug!(
                "Page {}: {} ({}x{} px, {:.1}x{:.1} pt)",
                page_ids.len(),
                path.display(),
                jpeg.width,
                jpeg.height,
                w,
                h
            );
        }

        pdf.catalog(catalog_id).pages(page_tree_id);
        pdf.pages(page_tree_id)
            .kids(page_ids.iter().copied())
            .count(page_ids.len() as i32);
        pdf.document_info(info_id)
            .producer(TextStr(concat!("images-to-pdf ", env!("CARGO_PKG_VERSION"))));

        let bytes = pdf.finish();
        info!("Assembled {} pages into {} bytes", page_ids.len(), bytes.len());
        Ok(bytes)
    }
}

/// List the staged files in `dir` as PDF pages.
///
/// [`PageOrder::Directory`] keeps filesystem iteration order, which is not
/// guaranteed to be alphabetical; [`PageOrder::Name`] sorts by file name.
pub fn list_pages(dir: &Path, order: PageOrder) -> Result<Vec<PathBuf>, ImagesToPdfError> {
    let read_err = |source| ImagesToPdfError::ReadDirFailed {
        path: dir.to_path_buf(),
        source,
    };

    let mut pages = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if path.is_file() {
            pages.push(path);
        }
    }

    if order == PageOrder::Name {
        pages.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    }
    Ok(pages)
}

/// JPEG data ready to embed, with the header fields the PDF needs.
#[derive(Debug, Clone)]
pub struct EmbeddableJpeg {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// 1 (grey) or 3 (YCbCr / RGB).
    pub components: u8,
}

impl EmbeddableJpeg {
    /// Page size in points at `dpi`.
    pub fn page_size(&self, dpi: f32) -> (f32, f32) {
        let scale = 72.0 / dpi;
        (self.width as f32 * scale, self.height as f32 * scale)
    }
}

/// Read `path` and make sure it is an 8-bit grey or colour JPEG,
/// re-encoding anything else.
pub fn load_jpeg(path: &Path, quality: u8) -> Result<EmbeddableJpeg, ImagesToPdfError> {
    let data = fs::read(path).map_err(|e| ImagesToPdfError::AssemblyFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    if image::guess_format(&data).ok() == Some(ImageFormat::Jpeg) {
        if let Some(header) = read_sof(&data) {
            if header.precision == 8 && matches!(header.components, 1 | 3) {
                return Ok(EmbeddableJpeg {
                    data,
                    width: u32::from(header.width),
                    height: u32::from(header.height),
                    components: header.components,
                });
            }
        }
    }

    debug!("Re-encoding {} as JPEG before embedding", path.display());
    reencode(path, &data, quality)
}

fn reencode(path: &Path, data: &[u8], quality: u8) -> Result<EmbeddableJpeg, ImagesToPdfError> {
    let failed = |detail: String| ImagesToPdfError::AssemblyFailed {
        path: path.to_path_buf(),
        detail,
    };

    let rgb = image::load_from_memory(data)
        .map_err(|e| failed(e.to_string()))?
        .to_rgb8();
    let mut out = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, quality))
        .map_err(|e| failed(e.to_string()))?;

    Ok(EmbeddableJpeg {
        data: out,
        width: rgb.width(),
        height: rgb.height(),
        components: 3,
    })
}

/// Frame header fields from a JPEG start-of-frame segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub precision: u8,
    pub width: u16,
    pub height: u16,
    pub components: u8,
}

/// Walk the JPEG marker segments up to the first SOFn and parse it.
pub fn read_sof(data: &[u8]) -> Option<FrameHeader> {
    if data.get(..2)? != [0xFF, 0xD8] {
        return None;
    }
    let mut i = 2;
    loop {
        // markers may be preceded by any number of 0xFF fill bytes
        while *data.get(i)? != 0xFF {
            i += 1;
        }
        while *data.get(i)? == 0xFF {
            i += 1;
        }
        let marker = *data.get(i)?;
        i += 1;

        match marker {
            // standalone markers: TEM, RSTn
            0x01 | 0xD0..=0xD7 => continue,
            // EOI / SOS before any frame header
            0xD9 | 0xDA => return None,
            _ => {}
        }

        let len = usize::from(u16::from_be_bytes([*data.get(i)?, *data.get(i + 1)?]));
        let is_sof = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_sof {
            let seg = data.get(i + 2..i + len)?;
            return Some(FrameHeader {
                precision: *seg.first()?,
                height: u16::from_be_bytes([*seg.get(1)?, *seg.get(2)?]),
                width: u16::from_be_bytes([*seg.get(3)?, *seg.get(4)?]),
                components: *seg.get(5)?,
            });
        }
        i += len;
    }
}
