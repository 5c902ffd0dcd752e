use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use struk_core::ParseResult;
use thiserror::Error;

use crate::extract::Extractor;
use crate::recognizer::{OcrBackend, OcrError};

pub const DEFAULT_OCR_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
    #[error("OCR recognition timed out after {0:?}")]
    Timeout(Duration),
    #[error("OCR task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// The result of a single receipt scan.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Raw OCR text output, kept so callers can fall back to it.
    pub raw_text: String,
    /// Structured fields extracted from the OCR text.
    pub parsed: ParseResult,
}

/// Orchestrates: read → OCR → extract.
pub struct ScanPipeline<R: OcrBackend + 'static> {
    recognizer: Arc<R>,
    extractor: Extractor,
    timeout: Duration,
}

impl<R: OcrBackend + 'static> ScanPipeline<R> {
    pub fn new(recognizer: R, extractor: Extractor) -> Self {
        Self {
            recognizer: Arc::new(recognizer),
            extractor,
            timeout: DEFAULT_OCR_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Process an image file on disk.
    pub async fn process_file(&self, path: &Path) -> Result<ScanOutcome, PipelineError> {
        let bytes = tokio::fs::read(path).await?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "scanning receipt image");
        self.process_bytes(bytes).await
    }

    /// Process raw image bytes.
    pub async fn process_bytes(&self, data: Vec<u8>) -> Result<ScanOutcome, PipelineError> {
        // 1. Run OCR on the blocking pool; engines are CPU-bound and synchronous.
        let recognizer = Arc::clone(&self.recognizer);
        let task = tokio::task::spawn_blocking(move || recognizer.recognize(&data));
        let raw_text = tokio::time::timeout(self.timeout, task)
            .await
            .map_err(|_| PipelineError::Timeout(self.timeout))???;

        // 2. Extract structured fields.
        Ok(self.process_text(raw_text))
    }

    /// Skip OCR and parse text that was recognized elsewhere.
    pub fn process_text(&self, raw_text: String) -> ScanOutcome {
        let parsed = self.extractor.extract(&raw_text);
        ScanOutcome { raw_text, parsed }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::{MockRecognizer, UnavailableRecognizer};
    use struk_core::{KeywordSet, LineItem};

    struct SlowRecognizer(Duration);

    impl OcrBackend for SlowRecognizer {
        fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
            std::thread::sleep(self.0);
            Ok(String::new())
        }
    }

    fn extractor() -> Extractor {
        Extractor::new(&KeywordSet::default()).unwrap()
    }

    #[tokio::test]
    async fn process_bytes_produces_outcome() {
        let pipeline = ScanPipeline::new(
            MockRecognizer::new("WARUNG KOPI\nKopi Susu 15.000\nRoti Bakar 20.000\nTOTAL 35.000"),
            extractor(),
        );

        let outcome = pipeline.process_bytes(b"png".to_vec()).await.unwrap();

        assert!(outcome.raw_text.starts_with("WARUNG KOPI"));
        assert_eq!(
            outcome.parsed.items,
            vec![LineItem::new("Kopi Susu", 15000), LineItem::new("Roti Bakar", 20000)]
        );
        assert_eq!(outcome.parsed.total, 35000);
    }

    #[tokio::test]
    async fn process_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("struk.png");
        std::fs::write(&path, b"not really a png").unwrap();

        let pipeline = ScanPipeline::new(MockRecognizer::new("Es Teh 5.000"), extractor());
        let outcome = pipeline.process_file(&path).await.unwrap();
        assert_eq!(outcome.parsed.total, 5000);
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let pipeline = ScanPipeline::new(MockRecognizer::new(""), extractor());
        let err = pipeline
            .process_file(Path::new("/definitely/not/here.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
    }

    #[tokio::test]
    async fn ocr_failure_is_propagated() {
        let pipeline = ScanPipeline::new(UnavailableRecognizer, extractor());
        let err = pipeline.process_bytes(vec![1, 2, 3]).await.unwrap_err();
        assert!(matches!(err, PipelineError::Ocr(OcrError::NotAvailable)));
    }

    #[tokio::test]
    async fn slow_ocr_times_out() {
        let pipeline = ScanPipeline::new(SlowRecognizer(Duration::from_millis(500)), extractor())
            .with_timeout(Duration::from_millis(20));
        let err = pipeline.process_bytes(vec![]).await.unwrap_err();
        assert!(matches!(err, PipelineError::Timeout(_)));
    }

    #[test]
    fn process_text_skips_ocr() {
        let pipeline = ScanPipeline::new(UnavailableRecognizer, extractor());
        let outcome = pipeline.process_text("Terima kasih\nSelamat datang".to_string());
        assert!(outcome.parsed.is_empty_extraction());
        assert_eq!(outcome.parsed.total, 0);
    }
}
