//! The formatting state machine and the text runs it produces.

use std::collections::BTreeSet;

use super::code::{ColorCode, FormatCode, StyleCode};
use super::tokenizer::tokenize;

/// Formatting in effect at some point of the text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FormatState {
    pub color: Option<ColorCode>,
    /// Active decorations, iterated in code order.
    pub styles: BTreeSet<StyleCode>,
}

impl FormatState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no color and no style is active.
    pub fn is_plain(&self) -> bool {
        self.color.is_none() && self.styles.is_empty()
    }

    /// Apply one code.
    ///
    /// A color replaces the current color and clears every style; a style is
    /// added to the active set; a reset clears both.
    pub fn apply(&mut self, code: FormatCode) {
        match code {
            FormatCode::Color(color) => {
                self.color = Some(color);
                self.styles.clear();
            }
            FormatCode::Style(style) => {
                self.styles.insert(style);
            }
            FormatCode::Reset => {
                self.color = None;
                self.styles.clear();
            }
        }
    }

    /// Consume `text`, appending one run per non-empty literal segment and
    /// leaving `self` in the state reached at the end of the text.
    pub fn consume(&mut self, text: &str, runs: &mut Vec<TextRun>) {
        for segment in tokenize(text) {
            if !segment.text.is_empty() {
                runs.push(TextRun {
                    text: segment.text.to_string(),
                    state: self.clone(),
                });
            }
            if let Some(code) = segment.code {
                self.apply(code);
            }
        }
    }
}

/// A piece of text and the formatting it is shown with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub state: FormatState,
}

impl TextRun {
    /// A run with no formatting.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            state: FormatState::default(),
        }
    }
}

/// Parse legacy text from the default state.
///
/// ```
/// use motd_embed::format::{parse_runs, ColorCode};
///
/// let runs = parse_runs("§6Gold§r plain");
/// assert_eq!(runs.len(), 2);
/// assert_eq!(runs[0].state.color, Some(ColorCode::Gold));
/// assert!(runs[1].state.is_plain());
/// ```
pub fn parse_runs(text: &str) -> Vec<TextRun> {
    let mut runs = Vec::new();
    FormatState::new().consume(text, &mut runs);
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(color: Option<ColorCode>, styles: &[StyleCode]) -> FormatState {
        FormatState {
            color,
            styles: styles.iter().copied().collect(),
        }
    }

    #[test]
    fn text_without_markers_is_one_plain_run() {
        for input in ["Hello", "A Minecraft Server", "100% & <ok>", " "] {
            let runs = parse_runs(input);
            assert_eq!(runs, vec![TextRun::plain(input)]);
        }
    }

    #[test]
    fn reset_clears_color_and_styles() {
        let runs = parse_runs("§a§lHello§r World");
        assert_eq!(
            runs,
            vec![
                TextRun {
                    text: "Hello".into(),
                    state: state(Some(ColorCode::Green), &[StyleCode::Bold]),
                },
                TextRun::plain(" World"),
            ]
        );
    }

    #[test]
    fn later_color_clears_prior_style() {
        let runs = parse_runs("§lBold§2Recolor");
        assert_eq!(
            runs,
            vec![
                TextRun {
                    text: "Bold".into(),
                    state: state(None, &[StyleCode::Bold]),
                },
                TextRun {
                    text: "Recolor".into(),
                    state: state(Some(ColorCode::DarkGreen), &[]),
                },
            ]
        );
    }

    #[test]
    fn styles_accumulate_and_keep_color() {
        let runs = parse_runs("§c§oa§nb");
        assert_eq!(runs[0].state, state(Some(ColorCode::Red), &[StyleCode::Italic]));
        assert_eq!(
            runs[1].state,
            state(
                Some(ColorCode::Red),
                &[StyleCode::Underline, StyleCode::Italic]
            )
        );
    }

    #[test]
    fn repeated_style_is_idempotent() {
        let runs = parse_runs("§l§lX");
        assert_eq!(runs[0].state, state(None, &[StyleCode::Bold]));
    }

    #[test]
    fn adjacent_codes_emit_no_empty_runs() {
        let runs = parse_runs("§a§b§cX§r§r");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "X");
        assert_eq!(runs[0].state.color, Some(ColorCode::Red));
    }

    #[test]
    fn consume_reports_end_state() {
        let mut current = FormatState::new();
        let mut runs = Vec::new();
        current.consume("§eYellow§k", &mut runs);
        assert_eq!(
            current,
            state(Some(ColorCode::Yellow), &[StyleCode::Obfuscated])
        );
        assert_eq!(runs.len(), 1);
    }

    #[test]
    fn consume_continues_from_existing_state() {
        let mut current = state(Some(ColorCode::Aqua), &[StyleCode::Bold]);
        let mut runs = Vec::new();
        current.consume("inherited§mstruck", &mut runs);
        assert_eq!(runs[0].state, state(Some(ColorCode::Aqua), &[StyleCode::Bold]));
        assert_eq!(
            runs[1].state,
            state(
                Some(ColorCode::Aqua),
                &[StyleCode::Bold, StyleCode::Strikethrough]
            )
        );
    }
}
