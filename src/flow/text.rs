//! Small text helpers shared by the extractors.

/// Collapse every whitespace run to a single space and trim the ends.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `true` for a bare page-number artifact such as `"17"`.
pub fn is_numeric_artifact(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

/// Render a 1-based ordinal in superscript digits (`12` → `¹²`).
pub fn to_superscript(ordinal: usize) -> String {
    ordinal
        .to_string()
        .chars()
        .map(|digit| match digit {
            '0' => '⁰',
            '1' => '¹',
            '2' => '²',
            '3' => '³',
            '4' => '⁴',
            '5' => '⁵',
            '6' => '⁶',
            '7' => '⁷',
            '8' => '⁸',
            _ => '⁹',
        })
        .collect()
}

/// First alphabetic character, if any.
pub fn first_alpha(text: &str) -> Option<char> {
    text.chars().find(|c| c.is_alphabetic())
}
