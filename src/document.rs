//! Output document assembly.
//!
//! Wraps merged paragraphs and document metadata into the JSON schema read by
//! the translation pipeline:
//!
//! ```json
//! { "document": { "id": "...", "title": "...", "metadata": { ... },
//!     "paragraphs": [ { "id": "p001", "original": { ... }, "translation": { ... } } ] } }
//! ```

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use crate::config::{Config, MetadataConfig};
use crate::error::{Error, Result};
use crate::flow::text::clean_text;
use crate::flow::{MergedParagraph, OriginalText};

static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));
static HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4").expect("valid selector"));
static PROSE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p, h1, h2, h3, h4").expect("valid selector"));
static META_AUTHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[name="author"]"#).expect("valid selector"));

static LEADING_VON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^von\s+").expect("valid regex"));

const UNTITLED: &str = "Untitled";
const UNKNOWN_AUTHOR: &str = "Unknown";
const PENDING_REVIEW: &str = "pending_review";
const SLUG_MAX_CHARS: usize = 40;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Top-level JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentEnvelope {
    pub document: Document,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub metadata: DocumentMetadata,
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub author: String,
    pub date: String,
    pub translator: String,
    pub vetted_by: String,
}

/// One logical paragraph with its (pending) translation slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// `p` followed by the 1-based position, zero-padded to three digits.
    pub id: String,
    pub original: OriginalText,
    pub translation: Translation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub lang: String,
    pub text: String,
    pub translator: String,
    pub vetted_by: String,
    pub confidence: String,
    pub show_by_default: bool,
    pub vetting_notes: String,
    pub vetting_date: String,
    pub timestamp: String,
}

/// Title, author and date gathered from the input and configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub title: String,
    pub author: String,
    pub date: String,
}

impl Metadata {
    /// Document id derived from the title.
    pub fn slug(&self) -> String {
        slugify(&self.title)
    }
}

/// Lower-case, hyphenate spaces and cap at 40 characters.
pub fn slugify(title: &str) -> String {
    let slug: String = title
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .take(SLUG_MAX_CHARS)
        .collect();
    if slug.is_empty() {
        "document".to_string()
    } else {
        slug
    }
}

/// Collect document metadata, preferring explicit configuration.
///
/// # Errors
///
/// Returns [`Error::InvalidPattern`] when a configured pattern is not a
/// valid regex.
pub fn gather_metadata(document: &Html, config: &MetadataConfig) -> Result<Metadata> {
    let title_pattern = compile(config.title_pattern.as_deref())?;
    let author_pattern = compile(config.author_pattern.as_deref())?;

    let title = config
        .title
        .clone()
        .or_else(|| {
            let pattern = title_pattern.as_ref()?;
            first_matching(document, &HEADING, pattern)
        })
        .or_else(|| {
            document
                .select(&TITLE)
                .map(element_text)
                .find(|text| !text.is_empty())
        })
        .unwrap_or_else(|| UNTITLED.to_string());

    let author = config
        .author
        .clone()
        .or_else(|| {
            let pattern = author_pattern.as_ref()?;
            first_matching(document, &PROSE, pattern)
        })
        .or_else(|| {
            document
                .select(&META_AUTHOR)
                .filter_map(|meta| meta.value().attr("content"))
                .map(clean_text)
                .find(|content| !content.is_empty())
        })
        .or_else(|| {
            document
                .select(&PROSE)
                .map(element_text)
                .find(|text| text.to_lowercase().starts_with("von "))
        })
        .map(|candidate| normalize_author(&candidate))
        .filter(|author| !author.is_empty())
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

    Ok(Metadata {
        title,
        author,
        date: config.date.clone().unwrap_or_default(),
    })
}

/// Strip a leading `von` and surrounding spaces or periods.
pub fn normalize_author(candidate: &str) -> String {
    LEADING_VON
        .replace(candidate.trim(), "")
        .trim_matches(|c: char| c == ' ' || c == '.')
        .to_string()
}

/// Build the output document from merged paragraphs.
pub fn assemble(
    paragraphs: Vec<MergedParagraph>,
    metadata: &Metadata,
    config: &Config,
    now: DateTime<Utc>,
) -> DocumentEnvelope {
    let timestamp = now.format(TIMESTAMP_FORMAT).to_string();

    let paragraphs = paragraphs
        .into_iter()
        .enumerate()
        .map(|(index, paragraph)| Paragraph {
            id: format!("p{:03}", index + 1),
            translation: Translation {
                lang: config.target_lang.clone(),
                text: String::new(),
                translator: config.translator.clone(),
                vetted_by: String::new(),
                confidence: PENDING_REVIEW.to_string(),
                show_by_default: paragraph.show_by_default,
                vetting_notes: String::new(),
                vetting_date: String::new(),
                timestamp: timestamp.clone(),
            },
            original: paragraph.original,
        })
        .collect();

    DocumentEnvelope {
        document: Document {
            id: metadata.slug(),
            title: metadata.title.clone(),
            metadata: DocumentMetadata {
                author: metadata.author.clone(),
                date: metadata.date.clone(),
                translator: config.translator.clone(),
                vetted_by: String::new(),
            },
            paragraphs,
        },
    }
}

/// Pretty-printed JSON with a trailing newline; non-ASCII text is kept as is.
///
/// # Errors
///
/// Returns [`Error::Json`] when `value` cannot be serialized.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}

fn compile(pattern: Option<&str>) -> Result<Option<Regex>> {
    pattern
        .map(|pattern| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| Error::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })
        })
        .transpose()
}

fn first_matching(document: &Html, selector: &Selector, pattern: &Regex) -> Option<String> {
    document
        .select(selector)
        .map(element_text)
        .find(|text| pattern.is_match(text))
}

fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<String>())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::flow::{merge_fragments, Fragment, Lang};

    fn doc(html: &str) -> Html {
        Html::parse_document(html)
    }

    #[test]
    fn slug_rules() {
        assert_eq!(slugify("Die pneumatische Schule"), "die-pneumatische-schule");
        assert_eq!(slugify(""), "document");
        let long = "a ".repeat(50);
        assert_eq!(slugify(&long).chars().count(), 40);
    }

    #[test]
    fn title_falls_back_to_title_element() {
        let html = doc("<html><head><title>  Die pneumatische\n Schule </title></head><body></body></html>");
        let metadata = gather_metadata(&html, &MetadataConfig::default()).unwrap();
        assert_eq!(metadata.title, "Die pneumatische Schule");
        assert_eq!(metadata.author, "Unknown");
        assert_eq!(metadata.date, "");
    }

    #[test]
    fn untitled_without_any_source() {
        let metadata = gather_metadata(&doc("<p>x</p>"), &MetadataConfig::default()).unwrap();
        assert_eq!(metadata.title, "Untitled");
    }

    #[test]
    fn title_pattern_selects_heading() {
        let html = doc(
            "<title>Scan 0001</title><h2>Vorwort</h2><h1>DIE PNEUMATISCHE SCHULE</h1>",
        );
        let config = MetadataConfig {
            title_pattern: Some("pneumatische".into()),
            ..MetadataConfig::default()
        };
        let metadata = gather_metadata(&html, &config).unwrap();
        assert_eq!(metadata.title, "DIE PNEUMATISCHE SCHULE");
    }

    #[test]
    fn configured_values_win() {
        let html = doc(r#"<title>Scan</title><meta name="author" content="Someone">"#);
        let config = MetadataConfig {
            title: Some("Titel".into()),
            author: Some("Max Wellmann".into()),
            date: Some("1895".into()),
            ..MetadataConfig::default()
        };
        let metadata = gather_metadata(&html, &config).unwrap();
        assert_eq!(
            metadata,
            Metadata {
                title: "Titel".into(),
                author: "Max Wellmann".into(),
                date: "1895".into(),
            }
        );
    }

    #[test]
    fn author_from_meta_then_von_line() {
        let html = doc(r#"<meta name="author" content="M. Wellmann."><p>von Niemand</p>"#);
        let metadata = gather_metadata(&html, &MetadataConfig::default()).unwrap();
        assert_eq!(metadata.author, "M. Wellmann");

        let html = doc("<p>Einleitung</p><p>Von Max Wellmann.</p>");
        let metadata = gather_metadata(&html, &MetadataConfig::default()).unwrap();
        assert_eq!(metadata.author, "Max Wellmann");
    }

    #[test]
    fn author_pattern_matches_paragraph() {
        let html = doc("<p>Berlin 1895</p><p>von  MAX WELLMANN</p>");
        let config = MetadataConfig {
            author_pattern: Some("max wellmann".into()),
            ..MetadataConfig::default()
        };
        let metadata = gather_metadata(&html, &config).unwrap();
        assert_eq!(metadata.author, "MAX WELLMANN");
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let config = MetadataConfig {
            title_pattern: Some("(unclosed".into()),
            ..MetadataConfig::default()
        };
        let err = gather_metadata(&doc(""), &config).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { ref pattern, .. } if pattern == "(unclosed"));
    }

    #[test]
    fn assemble_fills_translation_slots() {
        let paragraphs = merge_fragments(vec![
            Fragment::prose("Erster Satz.".into(), vec![], Lang::German, 1),
            Fragment::prose("ὁ βίος".into(), vec![], Lang::Greek, 2),
        ]);
        let metadata = Metadata {
            title: "Die Schule".into(),
            author: "Wellmann".into(),
            date: String::new(),
        };
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 5).unwrap();
        let envelope = assemble(paragraphs, &metadata, &Config::default(), now);
        let document = &envelope.document;

        assert_eq!(document.id, "die-schule");
        assert_eq!(document.metadata.translator, "translator-agent-v1");
        let ids: Vec<&str> = document.paragraphs.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p001", "p002"]);

        let first = &document.paragraphs[0].translation;
        assert_eq!(first.lang, "en");
        assert_eq!(first.confidence, "pending_review");
        assert_eq!(first.timestamp, "2024-05-01T12:30:05Z");
        assert!(first.show_by_default);
        assert!(!document.paragraphs[1].translation.show_by_default);
    }

    #[test]
    fn to_json_is_pretty_and_unescaped() {
        let metadata = Metadata {
            title: "Größe".into(),
            author: "A".into(),
            date: String::new(),
        };
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let json = to_json(&assemble(Vec::new(), &metadata, &Config::default(), now)).unwrap();
        assert!(json.starts_with("{\n  \"document\""));
        assert!(json.contains("\"title\": \"Größe\""));
        assert!(json.ends_with("}\n"));
    }

    #[test]
    fn to_json_reports_serialization_failures() {
        use std::collections::HashMap;

        let mut bad = HashMap::new();
        bad.insert((1, 2), "tuple keys are not valid JSON object keys");
        assert!(matches!(to_json(&bad), Err(Error::Json(_))));
    }

    #[test]
    fn json_shape() {
        let paragraphs = merge_fragments(vec![Fragment::prose(
            "Text.".into(),
            vec![],
            Lang::Latin,
            4,
        )]);
        let metadata = Metadata {
            title: "T".into(),
            author: "A".into(),
            date: "1895".into(),
        };
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let value = serde_json::to_value(assemble(paragraphs, &metadata, &Config::default(), now)).unwrap();
        let original = &value["document"]["paragraphs"][0]["original"];
        assert_eq!(original["lang"], "la");
        assert_eq!(original["page"], 4);
        assert_eq!(original["pages"], serde_json::json!([4]));
        assert!(original.get("page_breaks").is_none());
        assert_eq!(value["document"]["metadata"]["date"], "1895");
    }
}
