//! Level-2 header splitter for markdown documents.
//!
//! Splits a document into contiguous sections at every line that starts
//! with `"## "`. The text before the first such header (if any) forms its
//! own chunk, the preamble.
//!
//! # Guarantees
//!
//! - Chunks are borrowed slices of the input and keep their line
//!   terminators, so concatenating them in order yields the input exactly.
//! - At least one chunk is produced for every input, including the empty
//!   string.
//! - A header line only opens a new chunk when the current chunk is
//!   non-empty, so a document starting with `## ` has no empty preamble.
//!
//! # Example
//!
//! ```rust
//! use spec_factory_core::chunk::split_by_headers;
//!
//! let doc = "# Title\n\nIntro.\n\n## One\n\nA\n\n## Two\n\nB\n";
//! let chunks: Vec<&str> = split_by_headers(doc).collect();
//! assert_eq!(chunks.len(), 3);
//! assert!(chunks[1].starts_with("## One"));
//! assert_eq!(chunks.concat(), doc);
//! ```

/// Line prefix that opens a new section.
pub const HEADER_PREFIX: &str = "## ";

/// Lazily split `text` into sections at level-2 header lines.
pub fn split_by_headers(text: &str) -> HeaderChunks<'_> {
    HeaderChunks {
        text,
        pos: 0,
        emitted: false,
    }
}

/// Split a document into owned chunks.
///
/// With `by_headers = false` the whole document becomes a single chunk.
pub fn split_document(text: &str, by_headers: bool) -> Vec<String> {
    if by_headers {
        split_by_headers(text).map(str::to_string).collect()
    } else {
        vec![text.to_string()]
    }
}

/// Iterator returned by [`split_by_headers`].
#[derive(Debug, Clone)]
pub struct HeaderChunks<'a> {
    text: &'a str,
    pos: usize,
    emitted: bool,
}

impl<'a> Iterator for HeaderChunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.pos >= self.text.len() {
            // Empty input still yields exactly one (empty) chunk.
            if !self.emitted {
                self.emitted = true;
                return Some(self.text);
            }
            return None;
        }

        let start = self.pos;
        let mut line_start = start;
        loop {
            let rest = &self.text[line_start..];
            let line_len = rest.find('\n').map(|i| i + 1).unwrap_or(rest.len());

            if line_start > start && rest.starts_with(HEADER_PREFIX) {
                break;
            }

            line_start += line_len;
            if line_start >= self.text.len() {
                break;
            }
        }

        self.pos = line_start;
        self.emitted = true;
        Some(&self.text[start..line_start])
    }
}

impl std::iter::FusedIterator for HeaderChunks<'_> {}
