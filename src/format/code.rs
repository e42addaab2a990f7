//! Legacy formatting codes.

/// Character that introduces a formatting code.
pub const MARKER: char = '§';

/// One of the sixteen legacy text colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColorCode {
    Black,
    DarkBlue,
    DarkGreen,
    DarkAqua,
    DarkRed,
    DarkPurple,
    Gold,
    Gray,
    DarkGray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
}

impl ColorCode {
    /// All colors, in code order `0`-`9`, `a`-`f`.
    pub const ALL: [ColorCode; 16] = [
        ColorCode::Black,
        ColorCode::DarkBlue,
        ColorCode::DarkGreen,
        ColorCode::DarkAqua,
        ColorCode::DarkRed,
        ColorCode::DarkPurple,
        ColorCode::Gold,
        ColorCode::Gray,
        ColorCode::DarkGray,
        ColorCode::Blue,
        ColorCode::Green,
        ColorCode::Aqua,
        ColorCode::Red,
        ColorCode::LightPurple,
        ColorCode::Yellow,
        ColorCode::White,
    ];

    /// Look up a color by its (lower-case) code character.
    pub fn from_char(c: char) -> Option<Self> {
        let index = c.to_digit(16)?;
        Self::ALL.get(index as usize).copied()
    }

    /// The code character, always lower-case.
    pub fn code(self) -> char {
        // Discriminants follow code order
        char::from_digit(self as u32, 16).unwrap_or('f')
    }

    /// CSS class applied to text in this color.
    pub fn css_class(self) -> &'static str {
        match self {
            ColorCode::Black => "mcformat-black",
            ColorCode::DarkBlue => "mcformat-dark-blue",
            ColorCode::DarkGreen => "mcformat-dark-green",
            ColorCode::DarkAqua => "mcformat-dark-aqua",
            ColorCode::DarkRed => "mcformat-dark-red",
            ColorCode::DarkPurple => "mcformat-dark-purple",
            ColorCode::Gold => "mcformat-gold",
            ColorCode::Gray => "mcformat-gray",
            ColorCode::DarkGray => "mcformat-dark-gray",
            ColorCode::Blue => "mcformat-blue",
            ColorCode::Green => "mcformat-green",
            ColorCode::Aqua => "mcformat-aqua",
            ColorCode::Red => "mcformat-red",
            ColorCode::LightPurple => "mcformat-light-purple",
            ColorCode::Yellow => "mcformat-yellow",
            ColorCode::White => "mcformat-white",
        }
    }
}

/// An additive text decoration.
///
/// The derived ordering is code order (`k` through `o`), which is also the
/// order style classes are emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleCode {
    Obfuscated,
    Bold,
    Strikethrough,
    Underline,
    Italic,
}

impl StyleCode {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'k' => Some(StyleCode::Obfuscated),
            'l' => Some(StyleCode::Bold),
            'm' => Some(StyleCode::Strikethrough),
            'n' => Some(StyleCode::Underline),
            'o' => Some(StyleCode::Italic),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            StyleCode::Obfuscated => 'k',
            StyleCode::Bold => 'l',
            StyleCode::Strikethrough => 'm',
            StyleCode::Underline => 'n',
            StyleCode::Italic => 'o',
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            StyleCode::Obfuscated => "mcformat-obfuscated",
            StyleCode::Bold => "mcformat-bold",
            StyleCode::Strikethrough => "mcformat-strikethrough",
            StyleCode::Underline => "mcformat-underline",
            StyleCode::Italic => "mcformat-italic",
        }
    }
}

/// A parsed formatting code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatCode {
    Color(ColorCode),
    Style(StyleCode),
    Reset,
}

impl FormatCode {
    const RESET: char = 'r';

    /// Parse the character following a [`MARKER`]. Matching is
    /// case-insensitive; unknown characters yield `None`.
    pub fn from_char(c: char) -> Option<Self> {
        let c = c.to_ascii_lowercase();
        if c == Self::RESET {
            return Some(FormatCode::Reset);
        }
        ColorCode::from_char(c)
            .map(FormatCode::Color)
            .or_else(|| StyleCode::from_char(c).map(FormatCode::Style))
    }

    /// The code character, always lower-case.
    pub fn code(self) -> char {
        match self {
            FormatCode::Color(color) => color.code(),
            FormatCode::Style(style) => style.code(),
            FormatCode::Reset => Self::RESET,
        }
    }
}
