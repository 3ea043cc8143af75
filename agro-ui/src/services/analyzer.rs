//! Leaf analyzer
//!
//! The analyzer sits behind [`LeafAnalyzer`] so a real classifier can replace
//! [`FixedDiagnosisAnalyzer`] without touching the scan flow.

use agro_common::DiagnosisResult;

/// File extensions accepted for uploaded leaf images
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Where a leaf image came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Upload,
    Camera,
}

/// A leaf photo submitted for analysis
#[derive(Debug, Clone)]
pub struct LeafImage {
    pub source: ImageSource,
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

impl LeafImage {
    pub fn new(source: ImageSource, file_name: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            source,
            file_name,
            bytes,
        }
    }

    /// MIME type sniffed from the image bytes, JPEG when unrecognised
    pub fn mime_type(&self) -> &'static str {
        infer::get(&self.bytes)
            .map(|kind| kind.mime_type())
            .filter(|mime| mime.starts_with("image/"))
            .unwrap_or("image/jpeg")
    }
}

/// True when `file_name` ends in one of [`SUPPORTED_EXTENSIONS`]
pub fn has_supported_extension(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| supported.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Turns a leaf image into a diagnosis
pub trait LeafAnalyzer: Send + Sync {
    /// Analyzer identifier for logs
    fn name(&self) -> &'static str;

    fn analyze(&self, image: &LeafImage) -> DiagnosisResult;
}

/// Returns the leaf blight diagnosis for every image
///
/// The image is never inspected.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedDiagnosisAnalyzer;

impl LeafAnalyzer for FixedDiagnosisAnalyzer {
    fn name(&self) -> &'static str {
        "fixed-diagnosis"
    }

    fn analyze(&self, _image: &LeafImage) -> DiagnosisResult {
        DiagnosisResult::leaf_blight()
    }
}
