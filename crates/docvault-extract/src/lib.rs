//! # docvault-extract
//!
//! Best-effort content extraction: content-type detection, plain-text and
//! PDF handling, keyword and language heuristics. Extraction is pure and
//! replaceable; the pipeline treats any failure here as a warning.

pub mod detect;
pub mod extractor;

pub use detect::detect_content_type;
pub use extractor::BasicExtractor;
