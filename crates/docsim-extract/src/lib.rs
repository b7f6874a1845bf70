//! File-to-text extraction for docsim, keyed by extension: DOCX paragraphs,
//! PDF page text, OCR for images, lossy UTF-8 for everything else.

mod docx;

use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use docsim_core::{Error, Result, TextExtractor};
use tracing::debug;

pub use docx::read_docx;

/// Recognizes text in an image file.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, path: &Path) -> anyhow::Result<String>;
}

/// Whether image extraction can run, decided when the extractor is built.
#[derive(Clone, Default)]
pub enum OcrCapability {
    Available(Arc<dyn OcrEngine>),
    #[default]
    Unavailable,
}

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Clone, Default)]
pub struct FileExtractor {
    ocr: OcrCapability,
}

impl FileExtractor {
    pub fn new(ocr: OcrCapability) -> Self {
        Self { ocr }
    }

    fn read_pdf(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).map_err(|e| Error::extraction(path.display().to_string(), e))?;
        // pdf-extract panics on some malformed files
        match panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(&bytes))) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(Error::extraction(path.display().to_string(), e)),
            Err(_) => Err(Error::extraction(path.display().to_string(), "PDF parser panicked")),
        }
    }

    fn read_image(&self, path: &Path) -> Result<String> {
        match &self.ocr {
            OcrCapability::Available(engine) => {
                engine.recognize(path).map_err(|e| Error::extraction(path.display().to_string(), e))
            }
            OcrCapability::Unavailable => Err(Error::extraction(path.display().to_string(), "OCR model unavailable")),
        }
    }
}

impl TextExtractor for FileExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        if !path.is_file() {
            return Err(Error::NotFound(path.display().to_string()));
        }
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        debug!(path = %path.display(), ext = %ext, "extracting");
        match ext.as_str() {
            "docx" => read_docx(path).map_err(|e| Error::extraction(path.display().to_string(), format!("{e:#}"))),
            "pdf" => self.read_pdf(path),
            e if IMAGE_EXTENSIONS.contains(&e) => self.read_image(path),
            _ => fs::read(path)
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .map_err(|e| Error::extraction(path.display().to_string(), e)),
        }
    }
}
