//! Coarse three-way language classification.
//!
//! Rules are evaluated in order and the first match wins; text matching no
//! rule is in the document's base language ([`Lang::German`]).

use super::types::Lang;

/// Latin function words counted as whole, space-delimited words.
pub const LATIN_KEYWORDS: &[&str] = &[
    "est", "et", "in", "ut", "aut", "nec", "quo", "non", "quae", "eius",
];

/// Distinct keyword hits needed to call a text Latin.
const LATIN_KEYWORD_THRESHOLD: usize = 2;

/// A classification rule: predicate over the text, and the class it yields.
pub struct LanguageRule {
    pub name: &'static str,
    pub matches: fn(&str) -> bool,
    pub lang: Lang,
}

/// Ordered rule table.
pub const RULES: &[LanguageRule] = &[
    LanguageRule {
        name: "greek-script",
        matches: has_greek_letter,
        lang: Lang::Greek,
    },
    LanguageRule {
        name: "latin-keywords",
        matches: has_latin_keywords,
        lang: Lang::Latin,
    },
    LanguageRule {
        name: "latin-qu-prefix",
        matches: starts_with_qu,
        lang: Lang::Latin,
    },
];

/// Classify `text` into one of the three language classes.
pub fn classify(text: &str) -> Lang {
    RULES
        .iter()
        .find(|rule| (rule.matches)(text))
        .map_or(Lang::German, |rule| rule.lang)
}

/// Greek and Coptic, or Greek Extended.
pub fn is_greek_char(c: char) -> bool {
    matches!(c, '\u{0370}'..='\u{03FF}' | '\u{1F00}'..='\u{1FFF}')
}

fn has_greek_letter(text: &str) -> bool {
    text.chars().any(is_greek_char)
}

fn has_latin_keywords(text: &str) -> bool {
    let padded = format!(" {} ", text.to_lowercase());
    let hits = LATIN_KEYWORDS
        .iter()
        .filter(|word| padded.contains(&format!(" {word} ")))
        .count();
    hits >= LATIN_KEYWORD_THRESHOLD
}

fn starts_with_qu(text: &str) -> bool {
    text.to_lowercase().trim().starts_with("qu")
}
