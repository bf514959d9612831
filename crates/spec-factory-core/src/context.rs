//! Prompt context assembly.
//!
//! Combines the global context document (`AGENTS.md`) with retrieved
//! specification chunks into the single string handed to a code
//! generation agent.
//!
//! # Layout
//!
//! ```text
//! # Global Context (AGENTS.md)
//! <global document, verbatim>
//!
//! # Relevant Specification Context
//!
//! ## From: <source>
//! <chunk, verbatim>
//! ```
//!
//! Each part is left out entirely when it has nothing to show.

use crate::models::RetrievedChunk;

pub const GLOBAL_CONTEXT_HEADING: &str = "# Global Context (AGENTS.md)";
pub const RETRIEVED_CONTEXT_HEADING: &str = "# Relevant Specification Context";

/// Build the context string from an optional global document and the
/// retrieved chunks, in retrieval order.
pub fn assemble_context(global: Option<&str>, chunks: &[RetrievedChunk]) -> String {
    let mut out = String::new();

    if let Some(text) = global {
        out.push_str(GLOBAL_CONTEXT_HEADING);
        out.push('\n');
        out.push_str(text);
        out.push_str("\n\n");
    }

    if !chunks.is_empty() {
        out.push_str(RETRIEVED_CONTEXT_HEADING);
        out.push('\n');
        for chunk in chunks {
            out.push_str("\n## From: ");
            out.push_str(&chunk.metadata.source);
            out.push('\n');
            out.push_str(&chunk.document);
            out.push('\n');
        }
    }

    out
}
