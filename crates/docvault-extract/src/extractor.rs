//! Basic content extractor implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::traits::extractor::{ContentExtractor, ExtractedContent};

/// English stop words excluded from keyword ranking.
const STOP_WORDS: &[&str] = &[
    "about", "after", "also", "been", "before", "being", "between", "both", "could", "every",
    "from", "have", "having", "here", "into", "more", "most", "other", "over", "same", "some",
    "such", "than", "that", "their", "them", "then", "there", "these", "they", "this", "through",
    "under", "very", "were", "what", "when", "where", "which", "while", "will", "with", "would",
    "your",
];

/// Minimum word length considered for keywords.
const MIN_KEYWORD_LENGTH: usize = 4;

/// Content types whose bytes are treated as plain text.
const TEXT_TYPES: &[&str] = &[
    "application/json",
    "application/xml",
    "application/javascript",
];

/// Heuristic extractor for text-bearing formats.
///
/// Handles plain-text types and PDF page counting without external
/// services. Anything else yields an empty (but successful) result —
/// there is simply nothing to extract.
#[derive(Debug, Clone)]
pub struct BasicExtractor {
    /// Maximum keywords retained per document.
    max_keywords: usize,
}

impl BasicExtractor {
    /// Create a new extractor.
    pub fn new(max_keywords: usize) -> Self {
        Self { max_keywords }
    }
}

#[async_trait]
impl ContentExtractor for BasicExtractor {
    async fn extract(&self, data: Bytes, content_type: &str) -> AppResult<ExtractedContent> {
        if data.is_empty() {
            return Err(AppError::validation("Cannot extract from empty document"));
        }

        if content_type == "application/pdf" {
            let page_count = count_pdf_pages(&data);
            debug!(page_count, "Extracted PDF structure");
            return Ok(ExtractedContent {
                text: None,
                page_count: Some(page_count),
                language: None,
                keywords: Vec::new(),
            });
        }

        if content_type.starts_with("text/") || TEXT_TYPES.contains(&content_type) {
            let text = String::from_utf8_lossy(&data).into_owned();
            let keywords = rank_keywords(&text, self.max_keywords);
            let language = guess_language(&text);
            debug!(
                chars = text.len(),
                keywords = keywords.len(),
                "Extracted text content"
            );
            return Ok(ExtractedContent {
                text: Some(text),
                page_count: None,
                language,
                keywords,
            });
        }

        // Binary formats with no extractable text (images, archives).
        Ok(ExtractedContent::default())
    }
}

/// Count pages in a PDF by scanning for page objects.
///
/// Looks for `/Type /Page` markers while excluding the `/Type /Pages`
/// tree nodes. Good enough for a best-effort page count without a full
/// PDF parser.
fn count_pdf_pages(data: &[u8]) -> i32 {
    let needle: &[u8] = b"/Type /Page";
    let mut count = 0i32;
    let mut i = 0usize;
    while i + needle.len() <= data.len() {
        if &data[i..i + needle.len()] == needle {
            let next = data.get(i + needle.len());
            if next != Some(&b's') {
                count += 1;
            }
            i += needle.len();
        } else {
            i += 1;
        }
    }
    count.max(1)
}

/// Rank words by frequency, excluding stop words and short tokens.
fn rank_keywords(text: &str, max_keywords: usize) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for token in text.split(|c: char| !c.is_alphanumeric()) {
        let word = token.to_lowercase();
        if word.len() < MIN_KEYWORD_LENGTH || STOP_WORDS.contains(&word.as_str()) {
            continue;
        }
        if word.chars().all(|c| c.is_numeric()) {
            continue;
        }
        *counts.entry(word).or_default() += 1;
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
        .into_iter()
        .take(max_keywords)
        .map(|(word, _)| word)
        .collect()
}

/// Very rough language guess: mostly-ASCII text with common English
/// function words reads as English.
fn guess_language(text: &str) -> Option<String> {
    let sample: String = text.chars().take(2000).collect();
    if sample.is_empty() {
        return None;
    }
    let ascii_ratio =
        sample.chars().filter(|c| c.is_ascii()).count() as f64 / sample.chars().count() as f64;
    if ascii_ratio < 0.9 {
        return None;
    }
    let lower = sample.to_lowercase();
    let hits = ["the ", " and ", " of ", " to ", " in "]
        .iter()
        .filter(|w| lower.contains(**w))
        .count();
    if hits >= 2 { Some("en".to_string()) } else { None }
}
