//! Text Extractor (C1) — converts a PDF path or a URL to plain text.
//! Two pure, side-effect-free-on-failure operations; no retries at this
//! layer, callers decide (§4.1).

pub mod html;
pub mod pdf;

pub use html::fetch_and_extract_html;
pub use pdf::extract_from_pdf;
