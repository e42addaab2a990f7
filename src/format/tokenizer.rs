//! Splits legacy text into literal segments and the codes that end them.

use std::iter::FusedIterator;

use super::code::{FormatCode, MARKER};

/// A run of literal text, followed by the code that terminated it.
///
/// `code` is `None` only for the final segment of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub code: Option<FormatCode>,
}

/// Lazily scan `text` for formatting codes.
///
/// The scan never fails: a trailing marker and a marker followed by an
/// unknown character are both kept as literal text. The returned iterator is
/// `Clone`, so a partially consumed scan can be restarted from any point.
///
/// ```
/// use motd_embed::format::{tokenize, ColorCode, FormatCode};
///
/// let segments: Vec<_> = tokenize("§aHi").collect();
/// assert_eq!(segments[0].text, "");
/// assert_eq!(segments[0].code, Some(FormatCode::Color(ColorCode::Green)));
/// assert_eq!(segments[1].text, "Hi");
/// assert_eq!(segments[1].code, None);
/// ```
pub fn tokenize(text: &str) -> Tokens<'_> {
    Tokens { rest: text }
}

/// Iterator returned by [`tokenize`].
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        let mut search_from = 0;
        while let Some(offset) = self.rest[search_from..].find(MARKER) {
            let marker_at = search_from + offset;
            let code_at = marker_at + MARKER.len_utf8();
            let Some(c) = self.rest[code_at..].chars().next() else {
                break;
            };
            match FormatCode::from_char(c) {
                Some(code) => {
                    let text = &self.rest[..marker_at];
                    self.rest = &self.rest[code_at + c.len_utf8()..];
                    return Some(Segment {
                        text,
                        code: Some(code),
                    });
                }
                // Not a code: the marker stays literal, keep scanning after it
                None => search_from = code_at,
            }
        }

        let text = std::mem::take(&mut self.rest);
        Some(Segment { text, code: None })
    }
}

impl FusedIterator for Tokens<'_> {}
