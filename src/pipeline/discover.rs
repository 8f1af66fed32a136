//! Input discovery: pick the convertible images out of a directory listing.
//!
//! Only regular files whose name ends in `.png` or `.jpg` (case-sensitive)
//! qualify. Everything else, sub-directories included, is skipped silently
//! apart from a debug log line.

use crate::error::ImagesToPdfError;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Recognised input extensions, matched case-sensitively.
pub const IMAGE_EXTENSIONS: [&str; 2] = [".png", ".jpg"];

/// A convertible input image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    /// Full path of the input file.
    pub path: PathBuf,
    /// File name as listed, e.g. `page1.png`.
    pub file_name: String,
    /// File name with the image extension removed, e.g. `page1`.
    pub stem: String,
}

impl ImageEntry {
    /// Build an entry from a file name, or `None` if the name is not an image.
    pub fn from_file_name(dir: &Path, file_name: &str) -> Option<Self> {
        let stem = image_stem(file_name)?;
        Some(Self {
            path: dir.join(file_name),
            file_name: file_name.to_string(),
            stem: stem.to_string(),
        })
    }

    /// Name of the staged copy: `<stem><suffix>.jpg`.
    pub fn staged_name(&self, temp_suffix: &str) -> String {
        format!("{}{}.jpg", self.stem, temp_suffix)
    }
}

/// Strip a recognised image extension from `file_name`.
pub fn image_stem(file_name: &str) -> Option<&str> {
    IMAGE_EXTENSIONS
        .iter()
        .find_map(|ext| file_name.strip_suffix(ext))
}

/// Images found in a directory plus the number of entries ignored.
#[derive(Debug, Default)]
pub struct Discovery {
    /// In directory iteration order.
    pub images: Vec<ImageEntry>,
    pub skipped: usize,
}

/// List `dir` and collect its images.
///
/// # Errors
/// * [`ImagesToPdfError::ReadDirFailed`] if the directory cannot be listed
/// * [`ImagesToPdfError::DuplicateImageName`] if two images would be staged
///   under the same name, which would silently drop a page
pub fn discover_images(dir: &Path, temp_suffix: &str) -> Result<Discovery, ImagesToPdfError> {
    let read_err = |source| ImagesToPdfError::ReadDirFailed {
        path: dir.to_path_buf(),
        source,
    };

    let mut discovery = Discovery::default();
    let mut staged_names: HashMap<String, PathBuf> = HashMap::new();

    for dir_entry in fs::read_dir(dir).map_err(read_err)? {
        let dir_entry = dir_entry.map_err(read_err)?;
        let os_name = dir_entry.file_name();

        let Some(name) = os_name.to_str() else {
            warn!("Skipping non UTF-8 file name: {:?}", os_name);
            discovery.skipped += 1;
            continue;
        };

        let Some(entry) = ImageEntry::from_file_name(dir, name) else {
            debug!("Skipping {name}: not a .png or .jpg file");
            discovery.skipped += 1;
            continue;
        };

        if !entry.path.is_file() {
            debug!("Skipping {name}: not a regular file");
            discovery.skipped += 1;
            continue;
        }

        let staged = entry.staged_name(temp_suffix);
        if let Some(first) = staged_names.insert(staged.clone(), entry.path.clone()) {
            return Err(ImagesToPdfError::DuplicateImageName {
                staged,
                first,
                second: entry.path,
            });
        }

        discovery.images.push(entry);
    }

    debug!(
        "Discovered {} images ({} entries skipped) in {}",
        discovery.images.len(),
        discovery.skipped,
        dir.display()
    );
    Ok(discovery)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").unwrap();
    }

    #[test]
    fn stem_matching_is_case_sensitive() {
        assert_eq!(image_stem("scan.png"), Some("scan"));
        assert_eq!(image_stem("scan.jpg"), Some("scan"));
        assert_eq!(image_stem("my.photo.jpg"), Some("my.photo"));
        assert_eq!(image_stem("scan.PNG"), None);
        assert_eq!(image_stem("scan.jpeg"), None);
        assert_eq!(image_stem("notes.txt"), None);
        assert_eq!(image_stem("png"), None);
    }

    #[test]
    fn staged_name_uses_suffix_and_jpg() {
        let e = ImageEntry::from_file_name(Path::new("/in"), "a.png").unwrap();
        assert_eq!(e.path, PathBuf::from("/in/a.png"));
        assert_eq!(e.staged_name("__temp"), "a__temp.jpg");
        assert_eq!(e.staged_name("-x"), "a-x.jpg");
    }

    #[test]
    fn keeps_only_image_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.png");
        touch(dir.path(), "b.jpg");
        touch(dir.path(), "c.txt");
        touch(dir.path(), "d.JPG");
        fs::create_dir(dir.path().join("folder.png")).unwrap();

        let found = discover_images(dir.path(), "__temp").unwrap();
        let mut names: Vec<_> = found.images.iter().map(|e| e.file_name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["a.png", "b.jpg"]);
        assert_eq!(found.skipped, 3);
    }

    #[test]
    fn same_stem_png_and_jpg_collide() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "scan.png");
        touch(dir.path(), "scan.jpg");

        let err = discover_images(dir.path(), "__temp").unwrap_err();
        assert!(
            matches!(err, ImagesToPdfError::DuplicateImageName { ref staged, .. } if staged == "scan__temp.jpg"),
            "got: {err}"
        );
    }

    #[test]
    fn missing_directory_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_images(&dir.path().join("gone"), "__temp").unwrap_err();
        assert!(matches!(err, ImagesToPdfError::ReadDirFailed { .. }));
    }
}
