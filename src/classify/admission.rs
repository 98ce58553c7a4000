//! Admission check for file content
//!
//! Content is examined as UTF-16 code units. Anything outside the whitelist of
//! space, tab, newline and carriage return that is a control character or counts as
//! whitespace is rejected, as are unpaired surrogates and characters beyond the
//! Basic Multilingual Plane.
//!
//! Whitespace here excludes the no-break spaces (U+00A0, U+2007, U+202F), so those
//! are admitted like any other printable character.

const WHITELIST: [char; 4] = [' ', '\t', '\n', '\r'];
const NO_BREAK_SPACES: [char; 3] = ['\u{00A0}', '\u{2007}', '\u{202F}'];

/// True if `content` is free of disallowed characters
pub fn admits(content: &str) -> bool {
    // A `&str` can't hold surrogates, but it can hold supplementary characters
    content.chars().all(admits_char)
}

/// True if `units` decode cleanly and every character is allowed
///
/// Entry point for callers that hold content as UTF-16 code units, such as text
/// read from UTF-16 files or received from UTF-16 APIs. Unlike [`admits`] it can
/// see unpaired surrogates and rejects them.
pub fn admits_utf16(units: &[u16]) -> bool {
    char::decode_utf16(units.iter().copied()).all(|decoded| match decoded {
        Ok(ch) => admits_char(ch),
        Err(_) => false,
    })
}

fn admits_char(ch: char) -> bool {
    if WHITELIST.contains(&ch) {
        return true;
    }
    if u32::from(ch) > 0xFFFF {
        return false;
    }
    !(ch.is_control() || is_breaking_whitespace(ch))
}

fn is_breaking_whitespace(ch: char) -> bool {
    ch.is_whitespace() && !NO_BREAK_SPACES.contains(&ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[test]
    fn test_printable_ascii_and_whitelist_admitted() {
        let printable: String = (0x20u8..0x7F).map(char::from).collect();
        assert!(admits(&printable));
        assert!(admits("class A {\n\tint x;\r\n}\n"));
        assert!(admits(""));
    }

    #[test]
    fn test_bmp_text_admitted() {
        assert!(admits("// Größe: ünïcödé, 日本語"));
        assert!(admits("\u{FFFD} replacement"));
    }

    #[test]
    fn test_control_characters_rejected() {
        assert!(!admits("abc\u{01}def"));
        assert!(!admits("\u{7F}"));
        assert!(!admits("nul\0"));
        assert!(!admits("\u{85}"));
    }

    #[test]
    fn test_unusual_whitespace_rejected() {
        assert!(!admits("a\u{0B}b"));
        assert!(!admits("a\u{0C}b"));
        assert!(!admits("a\u{1680}b"));
        assert!(!admits("a\u{2003}b"));
        assert!(!admits("a\u{2028}b"));
        assert!(!admits("a\u{2029}b"));
        assert!(!admits("a\u{3000}b"));
    }

    #[test]
    fn test_no_break_spaces_admitted() {
        assert!(admits("// Copyright\u{00A0}2020 Acme\npublic class FooBuilder {}\n"));
        assert!(admits("a\u{2007}b"));
        assert!(admits("a\u{202F}b"));
        assert!(admits_utf16(&utf16("nbsp\u{00A0}")));
    }

    #[test]
    fn test_supplementary_characters_rejected() {
        assert!(!admits("emoji \u{1F600}"));
        assert!(!admits_utf16(&utf16("\u{10000}")));
    }

    #[test]
    fn test_unpaired_surrogates_rejected() {
        let mut trailing_high = utf16("public class A {}");
        trailing_high.push(0xD800);
        assert!(!admits_utf16(&trailing_high));

        let mut high_then_ascii = utf16("a");
        high_then_ascii.extend([0xDBFF, u16::from(b'b')]);
        assert!(!admits_utf16(&high_then_ascii));

        assert!(!admits_utf16(&[0xDC00]));
    }

    #[test]
    fn test_utf16_agrees_with_str() {
        for sample in ["plain", "tab\tok", "bad\u{01}", "nbsp\u{00A0}", "em\u{2003}", "ß"] {
            assert_eq!(admits(sample), admits_utf16(&utf16(sample)), "{:?}", sample);
        }
    }
}
