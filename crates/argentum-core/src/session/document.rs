use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::decode::DecodedImage;
use crate::geometry::Size;

/// Fallback stem for exports of documents that were not opened from a file.
pub const DEFAULT_EXPORT_STEM: &str = "exported";

/// An opened image. The source buffer is never modified; every edit is
/// recomputed from it.
#[derive(Debug, Clone)]
pub struct Document {
    source: Arc<DecodedImage>,
    path: Option<PathBuf>,
}

impl Document {
    pub fn new(source: DecodedImage, path: Option<PathBuf>) -> Self {
        Self {
            source: Arc::new(source),
            path,
        }
    }

    pub fn source(&self) -> &Arc<DecodedImage> {
        &self.source
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Last path component, as shown in a title bar.
    pub fn file_name(&self) -> Option<String> {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned())
    }

    /// Suggested export file name: the source stem with a `.jpg` extension.
    pub fn export_file_name(&self) -> String {
        let stem = self
            .path
            .as_ref()
            .and_then(|p| p.file_stem())
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| DEFAULT_EXPORT_STEM.to_string());
        format!("{stem}.jpg")
    }

    /// Intrinsic size of the source.
    pub fn size(&self) -> Size {
        self.source.size()
    }
}
