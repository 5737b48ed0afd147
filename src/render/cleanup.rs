//! Text cleanup applied to every glyph run before layout.

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};

/// Presentation-form ligatures and their plain spellings.
const LIGATURES: [(char, &str); 7] = [
    ('\u{FB00}', "ff"),  // ﬀ
    ('\u{FB01}', "fi"),  // ﬁ
    ('\u{FB02}', "fl"),  // ﬂ
    ('\u{FB03}', "ffi"), // ﬃ
    ('\u{FB04}', "ffl"), // ﬄ
    ('\u{FB05}', "st"),  // ﬅ (long s + t)
    ('\u{FB06}', "st"),  // ﬆ
];

/// Run-level text normalizer.
///
/// Applies NFC, expands ligatures, drops replacement and private-use
/// characters, and collapses whitespace runs to one space. A single leading
/// or trailing space survives, since line joining relies on it.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    whitespace: Regex,
}

impl TextNormalizer {
    /// Create a normalizer.
    pub fn new() -> Result<Self> {
        let whitespace =
            Regex::new(r"\s+").map_err(|e| Error::Other(format!("whitespace pattern: {}", e)))?;
        Ok(Self { whitespace })
    }

    /// Normalize one run of text.
    pub fn normalize(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len());
        for c in text.nfc() {
            if let Some((_, plain)) = LIGATURES.iter().find(|(lig, _)| *lig == c) {
                result.push_str(plain);
            } else if c != '\u{FFFD}' && !is_private_use(c) && c != '\0' {
                result.push(c);
            }
        }
        self.whitespace.replace_all(&result, " ").into_owned()
    }
}

fn is_private_use(c: char) -> bool {
    let code = c as u32;
    (0xE000..=0xF8FF).contains(&code)
        || (0xF0000..=0xFFFFD).contains(&code)
        || (0x100000..=0x10FFFD).contains(&code)
}

/// Check if a character belongs to a script written without word spaces.
pub fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs (Chinese characters, used in Chinese/Japanese)
    (0x4E00..=0x9FFF).contains(&code)
    // CJK Unified Ideographs Extension A
    || (0x3400..=0x4DBF).contains(&code)
    // CJK Unified Ideographs Extension B-F
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana and Katakana (Japanese)
    || (0x3040..=0x30FF).contains(&code)
    // NOTE: Hangul is not included, Korean uses word spaces
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> TextNormalizer {
        TextNormalizer::new().unwrap()
    }

    #[test]
    fn test_unicode_normalization() {
        let text = "cafe\u{0301}";
        assert_eq!(normalizer().normalize(text), "café");
    }

    #[test]
    fn test_ligature_fix() {
        assert_eq!(normalizer().normalize("ﬁnding ﬂowers"), "finding flowers");
    }

    #[test]
    fn test_remove_replacement_and_pua() {
        assert_eq!(
            normalizer().normalize("Hello\u{FFFD}\u{E001}World"),
            "HelloWorld"
        );
    }

    #[test]
    fn test_whitespace_collapse_keeps_edges() {
        assert_eq!(normalizer().normalize("  two\t\n words "), " two words ");
        assert_eq!(normalizer().normalize(" "), " ");
    }

    #[test]
    fn test_spaceless_scripts() {
        assert!(is_spaceless_script_char('漢'));
        assert!(is_spaceless_script_char('か'));
        assert!(is_spaceless_script_char('カ'));
        assert!(!is_spaceless_script_char('한'));
        assert!(!is_spaceless_script_char('a'));
    }
}
