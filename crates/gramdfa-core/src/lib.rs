//! Text formats of a recognition grammar.
//!
//! A grammar is authored as two files: a `.grammar` file with production
//! rules over word categories, and a `.voca` file listing the words of each
//! category together with their pronunciations. This crate parses both and
//! produces the plain-text projections the automaton compiler needs.
//!
//! # Architecture
//!
//! - [`grammar`] -- Rule parsing and right-hand-side reversal
//! - [`vocabulary`] -- Category declarations, category listing and term table
//! - [`dictionary`] -- `(category id, word, pronunciation)` projection

pub mod dictionary;
pub mod grammar;
pub mod vocabulary;

/// Character that starts a comment running to the end of the line.
pub const COMMENT_MARKER: char = '#';

/// Cut `line` at the first comment marker.
#[inline]
pub fn strip_comment(line: &str) -> &str {
    match line.find(COMMENT_MARKER) {
        Some(pos) => &line[..pos],
        None => line,
    }
}
