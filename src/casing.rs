//! Case-conversion family backing the `change_case` transform.
//!
//! Conversions are word-based: the subject is split on separator characters
//! and on case boundaries (`helloWorld`, `XMLHttpRequest`), then the words
//! are reassembled in the requested convention. `capital`, `trim`,
//! `upper`/`lower`, and `alphanum` bypass word splitting and keep the
//! subject's own shape.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// CASE STYLES
// =============================================================================

/// The recognized `caseType` tokens, in catalog order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStyle {
    Camel,
    Capital,
    Const,
    Lower,
    Pascal,
    Path,
    Sentence,
    Snake,
    Spinal,
    Title,
    Trim,
    Upper,
    Alphanum,
}

impl CaseStyle {
    pub const ALL: &'static [CaseStyle] = &[
        CaseStyle::Camel,
        CaseStyle::Capital,
        CaseStyle::Const,
        CaseStyle::Lower,
        CaseStyle::Pascal,
        CaseStyle::Path,
        CaseStyle::Sentence,
        CaseStyle::Snake,
        CaseStyle::Spinal,
        CaseStyle::Title,
        CaseStyle::Trim,
        CaseStyle::Upper,
        CaseStyle::Alphanum,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CaseStyle::Camel => "camel",
            CaseStyle::Capital => "capital",
            CaseStyle::Const => "const",
            CaseStyle::Lower => "lower",
            CaseStyle::Pascal => "pascal",
            CaseStyle::Path => "path",
            CaseStyle::Sentence => "sentence",
            CaseStyle::Snake => "snake",
            CaseStyle::Spinal => "spinal",
            CaseStyle::Title => "title",
            CaseStyle::Trim => "trim",
            CaseStyle::Upper => "upper",
            CaseStyle::Alphanum => "alphanum",
        }
    }
}

impl fmt::Display for CaseStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for CaseStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CaseStyle::ALL
            .iter()
            .copied()
            .find(|style| style.name() == s)
            .ok_or_else(|| s.to_string())
    }
}

// =============================================================================
// CONVERSION
// =============================================================================

/// Convert `subject` into the named convention
pub fn convert(style: CaseStyle, subject: &str) -> String {
    match style {
        CaseStyle::Camel => {
            let words = split_words(subject);
            let mut out = String::with_capacity(subject.len());
            for (i, word) in words.iter().enumerate() {
                if i == 0 {
                    out.push_str(&lowercase(word));
                } else {
                    out.push_str(&capitalize(word));
                }
            }
            out
        }
        CaseStyle::Capital => {
            // First character uppercased, the rest untouched
            let mut chars = subject.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
        CaseStyle::Const => join_words(subject, "_", uppercase),
        CaseStyle::Lower => subject.to_lowercase(),
        CaseStyle::Pascal => join_words(subject, "", capitalize),
        CaseStyle::Path => join_words(subject, "/", lowercase),
        CaseStyle::Sentence => {
            let words = split_words(subject);
            let mut out = String::with_capacity(subject.len());
            for (i, word) in words.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                if i == 0 {
                    out.push_str(&capitalize(word));
                } else {
                    out.push_str(&lowercase(word));
                }
            }
            out
        }
        CaseStyle::Snake => join_words(subject, "_", lowercase),
        CaseStyle::Spinal => join_words(subject, "-", lowercase),
        CaseStyle::Title => join_words(subject, " ", capitalize),
        CaseStyle::Trim => {
            // Ends stripped, interior whitespace runs collapsed to single
            // underscores, case untouched
            let mut out = String::with_capacity(subject.len());
            let mut in_gap = false;
            for c in subject.trim().chars() {
                if c.is_whitespace() {
                    in_gap = true;
                } else {
                    if in_gap {
                        out.push('_');
                        in_gap = false;
                    }
                    out.push(c);
                }
            }
            out
        }
        CaseStyle::Upper => subject.to_uppercase(),
        CaseStyle::Alphanum => subject.chars().filter(|c| c.is_alphanumeric()).collect(),
    }
}

// =============================================================================
// WORD SPLITTING
// =============================================================================

/// Split a subject into words on separators and case boundaries.
///
/// A boundary falls before an uppercase letter that follows a lowercase or
/// digit character, and before the last uppercase letter of an uppercase run
/// followed by a lowercase one (`XMLHttp` -> `XML`, `Http`).
fn split_words(subject: &str) -> Vec<String> {
    let chars: Vec<char> = subject.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if !current.is_empty() && c.is_uppercase() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).map(|n| n.is_lowercase()).unwrap_or(false);
            if prev.is_lowercase() || prev.is_numeric() || (prev.is_uppercase() && next_is_lower) {
                words.push(std::mem::take(&mut current));
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }

    words
}

fn join_words(subject: &str, sep: &str, shape: fn(&str) -> String) -> String {
    split_words(subject)
        .iter()
        .map(|w| shape(w))
        .collect::<Vec<_>>()
        .join(sep)
}

fn lowercase(word: &str) -> String {
    word.to_lowercase()
}

fn uppercase(word: &str) -> String {
    word.to_uppercase()
}

/// First character uppercased, the rest lowercased
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_style_round_trip_names() {
        for style in CaseStyle::ALL {
            assert_eq!(CaseStyle::from_str(style.name()), Ok(*style));
        }
        assert_eq!(CaseStyle::from_str("bogus"), Err("bogus".to_string()));
    }

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("hello_world"), vec!["hello", "world"]);
        assert_eq!(split_words("helloWorld"), vec!["hello", "World"]);
        assert_eq!(split_words("XMLHttpRequest"), vec!["XML", "Http", "Request"]);
        assert_eq!(split_words("hello--world  now"), vec!["hello", "world", "now"]);
        assert_eq!(split_words("v2ray"), vec!["v2ray"]);
        assert!(split_words("").is_empty());
    }

    #[test]
    fn test_camel() {
        assert_eq!(convert(CaseStyle::Camel, "hello_world"), "helloWorld");
        assert_eq!(convert(CaseStyle::Camel, "Hello World"), "helloWorld");
    }

    #[test]
    fn test_capital_touches_first_char_only() {
        assert_eq!(convert(CaseStyle::Capital, "hello_world"), "Hello_world");
        assert_eq!(convert(CaseStyle::Capital, "hello World"), "Hello World");
        assert_eq!(convert(CaseStyle::Capital, ""), "");
    }

    #[test]
    fn test_const_and_snake() {
        assert_eq!(convert(CaseStyle::Const, "hello-world"), "HELLO_WORLD");
        assert_eq!(convert(CaseStyle::Snake, "helloWorld"), "hello_world");
        assert_eq!(convert(CaseStyle::Snake, "Hello World"), "hello_world");
    }

    #[test]
    fn test_pascal_path_spinal() {
        assert_eq!(convert(CaseStyle::Pascal, "hello_world"), "HelloWorld");
        assert_eq!(convert(CaseStyle::Path, "hello_world"), "hello/world");
        assert_eq!(convert(CaseStyle::Spinal, "hello_world"), "hello-world");
    }

    #[test]
    fn test_sentence_and_title() {
        assert_eq!(convert(CaseStyle::Sentence, "hello_world"), "Hello world");
        assert_eq!(convert(CaseStyle::Title, "hello_world"), "Hello World");
    }

    #[test]
    fn test_whole_string_styles() {
        assert_eq!(convert(CaseStyle::Lower, "Hello World"), "hello world");
        assert_eq!(convert(CaseStyle::Upper, "hello_world"), "HELLO_WORLD");
        assert_eq!(convert(CaseStyle::Alphanum, "He-llo, World!"), "HelloWorld");
    }

    #[test]
    fn test_trim_collapses_interior_whitespace() {
        assert_eq!(convert(CaseStyle::Trim, "  Hello   World  "), "Hello_World");
        assert_eq!(convert(CaseStyle::Trim, "already-shaped"), "already-shaped");
    }

    #[test]
    fn test_acronym_handling() {
        assert_eq!(convert(CaseStyle::Snake, "XMLHttpRequest"), "xml_http_request");
        assert_eq!(convert(CaseStyle::Camel, "XMLHttpRequest"), "xmlHttpRequest");
    }

    #[test]
    fn test_unicode_subjects() {
        assert_eq!(convert(CaseStyle::Upper, "héllo"), "HÉLLO");
        assert_eq!(convert(CaseStyle::Snake, "héllo wörld"), "héllo_wörld");
    }
}
