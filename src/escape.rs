// ABOUTME: Content sanitizer for remote markdown bodies
// ABOUTME: Four escalating levels from identity to alphanumeric-only

use serde::{Deserialize, Serialize};

/// How aggressively remote text is sanitized before landing in a mirror file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EscapeMode {
    Disabled,
    Normal,
    Strict,
    VeryStrict,
}

impl Default for EscapeMode {
    fn default() -> Self {
        EscapeMode::Normal
    }
}

// Characters that survive strict mode, besides letters, digits and whitespace.
fn strict_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c.is_whitespace()
        || matches!(
            c,
            '.' | ','
                | '('
                | ')'
                | '/'
                | '['
                | ']'
                | '*'
                | '+'
                | '-'
                | ':'
                | '"'
                | '#'
                | '!'
                | '\''
                | '?'
                | '&'
                | '|'
                | '>'
                | '~'
                | '^'
        )
}

/// Sanitizes `text` according to `mode`. Total: any input yields a result.
/// Callers substitute a default before calling when the remote body is absent.
pub fn escape_body(text: &str, mode: EscapeMode) -> String {
    match mode {
        EscapeMode::Disabled => text.to_string(),
        EscapeMode::Normal => text
            .replace("<%", "'<<'")
            .replace("%>", "'>>'")
            .replace('`', "\"")
            .replace("---", "- - -")
            .replace("{{", "((")
            .replace("}}", "))"),
        EscapeMode::Strict => {
            // Strip first, then break up horizontal rules; the strip itself
            // can produce new "---" runs that still must not survive.
            let stripped: String = text.chars().filter(|&c| strict_allowed(c)).collect();
            stripped.replace("---", "- - -")
        }
        EscapeMode::VeryStrict => text
            .chars()
            .filter(|&c| c.is_ascii_alphanumeric() || c.is_whitespace() || c == '.' || c == ',')
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_is_identity() {
        let text = "# Heading\n<%weird%> `code` ---";
        assert_eq!(escape_body(text, EscapeMode::Disabled), text);
    }

    #[test]
    fn test_normal_substitutions() {
        assert_eq!(escape_body("<%", EscapeMode::Normal), "'<<'");
        assert_eq!(escape_body("%>", EscapeMode::Normal), "'>>'");
        assert_eq!(escape_body("`code`", EscapeMode::Normal), "\"code\"");
        assert_eq!(escape_body("---", EscapeMode::Normal), "- - -");
        assert_eq!(escape_body("{{tpl}}", EscapeMode::Normal), "((tpl))");
    }

    #[test]
    fn test_normal_leaves_plain_text() {
        let text = "Just a sentence with punctuation!";
        assert_eq!(escape_body(text, EscapeMode::Normal), text);
    }

    #[test]
    fn test_empty_input_is_fine_at_every_level() {
        for mode in [
            EscapeMode::Disabled,
            EscapeMode::Normal,
            EscapeMode::Strict,
            EscapeMode::VeryStrict,
        ] {
            assert_eq!(escape_body("", mode), "");
        }
    }
}


#[cfg(test)]
mod very_strict_tests {
    use super::*;

    #[test]
    fn test_very_strict_keeps_only_word_characters() {
        assert_eq!(
            escape_body("Fix bug, please. Now! (#42)", EscapeMode::VeryStrict),
            "Fix bug, please. Now 42"
        );
    }

    #[test]
    fn test_very_strict_preserves_whitespace() {
        assert_eq!(
            escape_body("a\tb\nc d", EscapeMode::VeryStrict),
            "a\tb\nc d"
        );
    }

    #[test]
    fn test_very_strict_drops_question_marks() {
        assert_eq!(escape_body("why?", EscapeMode::VeryStrict), "why");
    }
}
