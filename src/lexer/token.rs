//! Token definitions for Catapillar
//!
//! The lexer works a physical line at a time, so its token is a whole line:
//! an action word, its raw argument words, and the line's state glyph.

use crate::errors::SourceSpan;
use std::fmt;

/// One significant source line
#[derive(Debug, Clone, PartialEq)]
pub struct LineToken {
    /// First word after the state glyph and pictograph
    pub action: String,
    /// Remaining whitespace-separated words
    pub args: Vec<String>,
    pub state: LineState,
    /// Emoji or kaomoji prefix, kept as an annotation only
    pub pictograph: Option<String>,
    /// 1-based source line
    pub line: usize,
    /// Byte range of the line in the source
    pub span: SourceSpan,
}

/// Per-line modifier glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize)]
pub enum LineState {
    /// `~` continue the current segment
    #[default]
    Continue,
    /// `>` advance: close the current segment
    Advance,
    /// `<` echo back to the previous segment
    Echo,
    /// `!` strong / must-succeed
    Strong,
    /// `?` tentative / awaiting input
    Tentative,
}

impl LineState {
    pub fn from_glyph(s: &str) -> Option<LineState> {
        match s {
            "~" => Some(LineState::Continue),
            ">" => Some(LineState::Advance),
            "<" => Some(LineState::Echo),
            "!" => Some(LineState::Strong),
            "?" => Some(LineState::Tentative),
            _ => None,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            LineState::Continue => "~",
            LineState::Advance => ">",
            LineState::Echo => "<",
            LineState::Strong => "!",
            LineState::Tentative => "?",
        }
    }

    /// Whether this state closes the current segment
    pub fn is_segment_break(self) -> bool {
        self == LineState::Advance
    }
}

impl fmt::Display for LineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

const EMOJI_RANGES: &[(u32, u32)] = &[
    (0x1F600, 0x1F64F),
    (0x1F300, 0x1F5FF),
    (0x1F680, 0x1F6FF),
    (0x1F1E0, 0x1F1FF),
    (0x2600, 0x26FF),
    (0x2700, 0x27BF),
    (0x1F900, 0x1F9FF),
    (0x1FA00, 0x1FA6F),
    (0x1FA70, 0x1FAFF),
    (0x231A, 0x231B),
    (0x23E9, 0x23F3),
    (0x23F8, 0x23FA),
    (0x25AA, 0x25AB),
    (0x25B6, 0x25C0),
    (0x25FB, 0x25FE),
    (0x2934, 0x2935),
    (0x2B05, 0x2B07),
    (0x2B1B, 0x2B1C),
    (0x200D, 0x200D),
    (0xFE0F, 0xFE0F),
];

/// "Other symbol" characters outside the emoji blocks. Whole blocks are
/// listed where they are almost entirely symbols.
const SYMBOL_RANGES: &[(u32, u32)] = &[
    (0x00A6, 0x00A6), // ¦
    (0x00A9, 0x00A9), // ©
    (0x00AE, 0x00AE), // ®
    (0x00B0, 0x00B0), // °
    (0x0482, 0x0482),
    (0x2100, 0x214F), // letterlike symbols
    (0x2190, 0x21FF), // arrows
    (0x2300, 0x23FF), // miscellaneous technical
    (0x2400, 0x24FF), // control pictures, enclosed alphanumerics
    (0x2500, 0x25FF), // box drawing, block elements, geometric shapes
    (0x2800, 0x28FF), // braille
    (0x2B00, 0x2BFF), // miscellaneous symbols and arrows
    (0x2E80, 0x2FFF), // CJK and Kangxi radicals, ideographic description
    (0x3004, 0x3004),
    (0x3012, 0x3013),
    (0x3020, 0x3020),
    (0x3036, 0x3037),
    (0x303E, 0x303F),
    (0x3190, 0x3191),
    (0x3196, 0x319F),
    (0x31C0, 0x31E3), // CJK strokes
    (0x3200, 0x33FF), // enclosed CJK letters, CJK compatibility
    (0x4DC0, 0x4DFF), // hexagrams
    (0xA490, 0xA4C6), // Yi radicals
    (0xFFE4, 0xFFE4),
    (0xFFE8, 0xFFE8),
    (0xFFED, 0xFFEE),
    (0xFFFC, 0xFFFD),
    (0x1D000, 0x1D24F), // musical symbols
    (0x1F000, 0x1F2FF),
    (0x1FB00, 0x1FBFF), // legacy computing
];

/// Characters that mark a parenthesized run as a kaomoji face
const KAOMOJI_GLYPHS: &str = "▽△^*><_・ω゜";

fn in_ranges(c: char, ranges: &[(u32, u32)]) -> bool {
    let cp = c as u32;
    ranges.iter().any(|&(start, end)| start <= cp && cp <= end)
}

fn is_symbol_char(c: char) -> bool {
    matches!(c, '^' | '`' | '+' | '<' | '=' | '>' | '|' | '~' | '$' | '¬' | '°' | '×' | '÷')
        || in_ranges(c, EMOJI_RANGES)
        || in_ranges(c, SYMBOL_RANGES)
}

/// Whether a word is an emoji or kaomoji prefix
pub fn is_pictograph(word: &str) -> bool {
    let Some(first) = word.chars().next() else {
        return false;
    };

    if word.starts_with('(') && word.ends_with(')') && word.chars().count() >= 3 {
        let inner = &word[1..word.len() - 1];
        if inner
            .chars()
            .any(|c| is_symbol_char(c) || KAOMOJI_GLYPHS.contains(c))
        {
            return true;
        }
    }

    in_ranges(first, EMOJI_RANGES) || in_ranges(first, SYMBOL_RANGES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_state_glyphs() {
        for glyph in ["~", ">", "<", "!", "?"] {
            let state = LineState::from_glyph(glyph).unwrap();
            assert_eq!(state.glyph(), glyph);
        }
        assert_eq!(LineState::from_glyph("-"), None);
        assert!(LineState::Advance.is_segment_break());
        assert!(!LineState::Continue.is_segment_break());
    }

    #[test]
    fn test_pictographs() {
        assert!(is_pictograph("🌸"));
        assert!(is_pictograph("☀"));
        assert!(is_pictograph("⭐"));
        assert!(is_pictograph("(^_^)"));
        assert!(is_pictograph("(・ω・)"));
        for symbol in ["©", "®", "°", "¦", "〒", "㎏", "䷀", "⠿"] {
            assert!(is_pictograph(symbol), "{symbol}");
        }
        assert!(!is_pictograph("印"));
        assert!(!is_pictograph("print"));
        assert!(!is_pictograph("(a)"));
        assert!(!is_pictograph("()"));
        assert!(!is_pictograph(""));
    }
}
