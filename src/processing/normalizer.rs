//! Text normalization ahead of skill extraction

use regex::Regex;
use std::sync::LazyLock;

/// Anything outside lowercase ascii, digits, `+ # .` and whitespace
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9+#.\s]").expect("Invalid disallowed-character regex"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Lowercase, strip noise characters and collapse whitespace.
///
/// Stripped characters become separators, so "ML/JS" yields "ml js" rather
/// than "mljs". Tokens such as "c++", "c#" and "node.js" survive intact.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = DISALLOWED.replace_all(&lowered, " ");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

/// Split normalized text into the word set used by approximate matching
pub fn word_tokens(normalized: &str) -> impl Iterator<Item = &str> {
    normalized
        .split_whitespace()
        .map(|word| word.trim_matches('.'))
        .filter(|word| !word.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_collapses_whitespace() {
        assert_eq!(normalize("  Senior\tRust \n\n Engineer  "), "senior rust engineer");
    }

    #[test]
    fn test_keeps_technical_symbols() {
        assert_eq!(normalize("C++, C# and Node.js!"), "c++ c# and node.js");
    }

    #[test]
    fn test_punctuation_becomes_separator() {
        assert_eq!(normalize("ML/JS (CSS3)"), "ml js css3");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \t\n"), "");
        assert_eq!(normalize("!!!"), "");
    }

    #[test]
    fn test_non_ascii_letters_are_stripped() {
        assert_eq!(normalize("Café Python"), "caf python");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Looking for ML engineer with JS and CSS3 experience.",
            "Python, Docker, Pandas",
            "  weird -- spacing\u{00a0}and\u{2014}dashes ",
            "C++ / C# / .NET",
            "",
        ];

        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_word_tokens_trim_sentence_dots() {
        let normalized = normalize("Built APIs in node.js. Also pyhton.");
        let words: Vec<&str> = word_tokens(&normalized).collect();
        assert_eq!(words, vec!["built", "apis", "in", "node.js", "also", "pyhton"]);
    }
}
