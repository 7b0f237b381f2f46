//! Directory browser - lists the images a culling session starts from

use crate::{FsError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions picked up when no explicit list is configured
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// Sort order for image listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortBy {
    /// Plain lexicographic order of the full path
    #[serde(rename = "name")]
    Name,
    /// "image2.jpg" before "image10.jpg"
    #[serde(rename = "natural")]
    Natural,
}

/// Options for listing directory contents
#[derive(Debug, Clone)]
pub struct ListOptions {
    pub show_hidden: bool,
    pub sort_by: SortBy,
    /// Lowercase extensions without the leading dot
    pub extensions: Vec<String>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            show_hidden: false,
            sort_by: SortBy::Name,
            extensions: DEFAULT_IMAGE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Case-insensitive extension check against a list of lowercase extensions
pub fn has_extension<P: AsRef<Path>>(path: P, extensions: &[String]) -> bool {
    path.as_ref()
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .map_or(false, |ext| extensions.iter().any(|allowed| *allowed == ext))
}

/// List the images directly inside `path` (non-recursive)
///
/// The result is sorted and free of duplicates. An empty result is not an
/// error here; the caller decides what an empty directory means.
pub fn list_images<P: AsRef<Path>>(path: P, options: &ListOptions) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(FsError::NotFound(path.display().to_string()));
    }

    if !path.is_dir() {
        return Err(FsError::InvalidPath(format!("Not a directory: {}", path.display())));
    }

    let mut seen = HashSet::new();
    let mut images = Vec::new();

    for entry in fs::read_dir(path)? {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in {}: {}", path.display(), e);
                continue;
            }
        };

        let entry_path = entry.path();
        if entry_path.is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        if !options.show_hidden && is_hidden_name(&name) {
            continue;
        }

        if !has_extension(&entry_path, &options.extensions) {
            continue;
        }

        if seen.insert(entry_path.clone()) {
            images.push(entry_path);
        }
    }

    sort_paths(&mut images, options.sort_by);

    tracing::debug!("Listed {} images in {}", images.len(), path.display());
    Ok(images)
}

fn sort_paths(paths: &mut [PathBuf], sort_by: SortBy) {
    match sort_by {
        SortBy::Name => paths.sort(),
        SortBy::Natural => paths.sort_by(|a, b| {
            let a_name = a.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            let b_name = b.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            natural_sort_key(&a_name)
                .cmp(&natural_sort_key(&b_name))
                .then_with(|| a.cmp(b))
        }),
    }
}

/// Generate a natural sort key (handles numbers correctly)
/// "image2.jpg" < "image10.jpg"
fn natural_sort_key(s: &str) -> Vec<NaturalSortPart> {
    let mut parts = Vec::new();
    let mut current_num = String::new();
    let mut current_str = String::new();

    for c in s.chars() {
        if c.is_ascii_digit() {
            if !current_str.is_empty() {
                parts.push(NaturalSortPart::Str(current_str.to_lowercase()));
                current_str.clear();
            }
            current_num.push(c);
        } else {
            if !current_num.is_empty() {
                if let Ok(n) = current_num.parse::<u64>() {
                    parts.push(NaturalSortPart::Num(n));
                }
                current_num.clear();
            }
            current_str.push(c);
        }
    }

    if !current_num.is_empty() {
        if let Ok(n) = current_num.parse::<u64>() {
            parts.push(NaturalSortPart::Num(n));
        }
    }
    if !current_str.is_empty() {
        parts.push(NaturalSortPart::Str(current_str.to_lowercase()));
    }

    parts
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum NaturalSortPart {
    Num(u64),
    Str(String),
}

fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_natural_sort() {
        let mut names = vec!["image10.jpg", "image2.jpg", "image1.jpg", "image20.jpg"];
        names.sort_by(|a, b| natural_sort_key(a).cmp(&natural_sort_key(b)));
        assert_eq!(names, vec!["image1.jpg", "image2.jpg", "image10.jpg", "image20.jpg"]);
    }

    #[test]
    fn test_list_images_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.JPG");
        touch(dir.path(), "a.png");
        touch(dir.path(), "c.webp");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), ".hidden.jpg");
        fs::create_dir(dir.path().join("sub.jpg")).unwrap();

        let images = list_images(dir.path(), &ListOptions::default()).unwrap();
        assert_eq!(names(&images), vec!["a.png", "b.JPG"]);
    }

    #[test]
    fn test_list_images_show_hidden() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), ".hidden.jpg");

        let options = ListOptions { show_hidden: true, ..Default::default() };
        let images = list_images(dir.path(), &options).unwrap();
        assert_eq!(names(&images), vec![".hidden.jpg"]);
    }

    #[test]
    fn test_list_images_natural_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "img10.jpg");
        touch(dir.path(), "img2.jpg");

        let lexical = list_images(dir.path(), &ListOptions::default()).unwrap();
        assert_eq!(names(&lexical), vec!["img10.jpg", "img2.jpg"]);

        let options = ListOptions { sort_by: SortBy::Natural, ..Default::default() };
        let natural = list_images(dir.path(), &options).unwrap();
        assert_eq!(names(&natural), vec!["img2.jpg", "img10.jpg"]);
    }

    #[test]
    fn test_empty_directory_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "readme.md");
        assert!(list_images(dir.path(), &ListOptions::default()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_and_file_paths_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        assert!(matches!(
            list_images(&missing, &ListOptions::default()),
            Err(FsError::NotFound(_))
        ));

        touch(dir.path(), "a.jpg");
        assert!(matches!(
            list_images(dir.path().join("a.jpg"), &ListOptions::default()),
            Err(FsError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_has_extension_is_case_insensitive() {
        let exts = vec!["jpeg".to_string()];
        assert!(has_extension("photo.JPEG", &exts));
        assert!(!has_extension("photo.jpg", &exts));
        assert!(!has_extension("photo", &exts));
    }
}
