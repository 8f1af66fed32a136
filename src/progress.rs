//! Progress-callback trait for per-image conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline stages each image and assembles the PDF.
//!
//! # Example
//!
//! ```rust
//! use images_to_pdf::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     staged: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_image_complete(&self, index: usize, total: usize, name: &str) {
//!         self.staged.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{index}/{total} {name}");
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { staged: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the conversion pipeline as it processes each image.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. The pipeline is single-threaded, but the trait is
/// `Send + Sync` so a callback can be shared with a rendering thread.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once after discovery, before any image is staged.
    ///
    /// # Arguments
    /// * `total_images` — number of `.png` / `.jpg` files that will be staged
    fn on_conversion_start(&self, total_images: usize) {
        let _ = total_images;
    }

    /// Called before an image is decoded.
    ///
    /// # Arguments
    /// * `index` — 1-indexed position in discovery order
    /// * `total` — total images
    /// * `name`  — input file name
    fn on_image_start(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// Called once the adjusted image has been written to the scratch directory.
    fn on_image_complete(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// Called before the staged images are handed to the PDF assembler.
    fn on_assembly_start(&self, pages: usize) {
        let _ = pages;
    }

    /// Called once the PDF has been written.
    ///
    /// # Arguments
    /// * `pages`     — pages in the written PDF
    /// * `pdf_bytes` — size of the written file
    fn on_conversion_complete(&self, pages: usize, pdf_bytes: u64) {
        let _ = (pages, pdf_bytes);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        total: AtomicUsize,
        pages: AtomicUsize,
    }

    impl ConversionProgressCallback for TrackingCallback {
        fn on_conversion_start(&self, total_images: usize) {
            self.total.store(total_images, Ordering::SeqCst);
        }

        fn on_image_start(&self, _index: usize, _total: usize, _name: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_image_complete(&self, _index: usize, _total: usize, _name: &str) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_conversion_complete(&self, pages: usize, _pdf_bytes: u64) {
            self.pages.store(pages, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_conversion_start(2);
        cb.on_image_start(1, 2, "a.png");
        cb.on_image_complete(1, 2, "a.png");
        cb.on_assembly_start(2);
        cb.on_conversion_complete(2, 1024);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_conversion_start(2);
        tracker.on_image_start(1, 2, "a.png");
        tracker.on_image_complete(1, 2, "a.png");
        tracker.on_image_start(2, 2, "b.jpg");
        tracker.on_assembly_start(1);
        tracker.on_conversion_complete(1, 10);

        assert_eq!(tracker.total.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.pages.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_conversion_start(3);
        cb.on_image_complete(1, 3, "x.jpg");
    }
}
