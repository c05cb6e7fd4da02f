//! Coarse script-based language guessing.
//!
//! Used for longer inputs where a remote round-trip is not worth it. The
//! check order is significant: mixed-script text resolves to the earliest
//! listed script that matches any character.

use crate::core::catalog;

/// Ordered script-range patterns. First match wins.
const SCRIPTS: &[(fn(char) -> bool, &str)] = &[
    (is_cyrillic, "ru"),
    (is_cjk_ideograph, "zh"),
    (is_kana, "ja"),
    (is_hangul, "ko"),
    (is_arabic, "ar"),
    (is_devanagari, "hi"),
];

/// Best-guess language code for `text`. Pure and total: always returns a
/// catalog code, defaulting to `en` when no script range matches.
pub fn detect(text: &str) -> &'static str {
    if text.trim().is_empty() {
        return catalog::DEFAULT;
    }

    for (matches, code) in SCRIPTS {
        if text.chars().any(matches) {
            return code;
        }
    }

    catalog::DEFAULT
}

fn is_cyrillic(ch: char) -> bool {
    matches!(ch, '\u{0400}'..='\u{04FF}')
}

fn is_cjk_ideograph(ch: char) -> bool {
    matches!(ch, '\u{4E00}'..='\u{9FFF}')
}

fn is_kana(ch: char) -> bool {
    // Hiragana + Katakana.
    matches!(ch, '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}')
}

fn is_hangul(ch: char) -> bool {
    matches!(ch, '\u{AC00}'..='\u{D7AF}' | '\u{1100}'..='\u{11FF}')
}

fn is_arabic(ch: char) -> bool {
    matches!(ch, '\u{0600}'..='\u{06FF}')
}

fn is_devanagari(ch: char) -> bool {
    matches!(ch, '\u{0900}'..='\u{097F}')
}
