//! Legacy `§` formatting codes.
//!
//! Text is scanned by the [`tokenize`] iterator into literal segments and
//! codes; a [`FormatState`] consumes those segments in order and pairs each
//! literal with the formatting active at that point, producing [`TextRun`]s.

mod code;
mod state;
mod tokenizer;

pub use code::{ColorCode, FormatCode, StyleCode, MARKER};
pub use state::{parse_runs, FormatState, TextRun};
pub use tokenizer::{tokenize, Segment, Tokens};
