pub mod extract;
pub mod pipeline;
pub mod recognizer;

pub use extract::{normalize_amount, parse, Extractor, LineClass, ParserError};
pub use pipeline::{PipelineError, ScanOutcome, ScanPipeline, DEFAULT_OCR_TIMEOUT};
pub use recognizer::{default_backend, MockRecognizer, OcrBackend, OcrError, UnavailableRecognizer};
