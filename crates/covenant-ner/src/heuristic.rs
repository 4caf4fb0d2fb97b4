//! Heuristic layer: organizations and people
//!
//! Organizations are capitalized word runs ending in a corporate suffix
//! ("Acme Corp", "Globex Holdings, Inc.") or capitalized words following
//! labels such as `Client:`. People are capitalized names after an honorific ("Ms. Jane
//! Doe") or after contact labels such as `Attn:`.

use crate::error::RecognizerError;
use covenant_domain::traits::EntityRecognizer;
use covenant_domain::{EntityType, RawEntity};
use regex::Regex;
use std::sync::LazyLock;

static ORG_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:Corporation|Incorporated|Limited|Company|Group|Holdings|Partners|GmbH|LLC|LLP|PLC|plc|Corp|Inc|Ltd|Co)\b\.?")
        .expect("valid corporate suffix regex")
});

static ORG_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:Client|Customer|Company|Buyer|Licensee|Vendor|Supplier|Provider|Contractor)[ \t]*:[ \t]*([A-Z][\w&'-]*(?:[ \t]+(?:(?:of|and|&)[ \t]+)?[A-Z][\w&'-]*){0,4})")
        .expect("valid organization label regex")
});

static PERSON_HONORIFIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:Mrs|Mr|Ms|Miss|Dr|Prof)\.?[ \t]+([A-Z][a-z'-]+(?:[ \t]+[A-Z]\.)?(?:[ \t]+[A-Z][a-z'-]+){0,2})")
        .expect("valid honorific regex")
});

static PERSON_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:Contact(?:[ \t]+Person)?|Attn|Attention|Representative|Signed[ \t]+by)[ \t]*[:.]?[ \t]*([A-Z][a-z'-]+(?:[ \t]+[A-Z]\.)?(?:[ \t]+[A-Z][a-z'-]+){1,2})")
        .expect("valid contact label regex")
});

/// Words that start a capitalized run without being part of a name
const LEADING_STOPWORDS: &[&str] = &[
    "the", "this", "that", "these", "between", "and", "by", "with", "for", "of", "&", "to", "from", "whereas",
    "client", "customer", "vendor", "supplier", "party", "parties", "agreement", "dear", "attn", "contact",
];

/// Words allowed inside a name but never at its start
const CONNECTORS: &[&str] = &["&", "of", "and"];

/// Most words collected before a corporate suffix
const MAX_NAME_WORDS: usize = 4;

const SUFFIX_ORG_CONFIDENCE: f64 = 0.75;
const LABEL_ORG_CONFIDENCE: f64 = 0.65;
const HONORIFIC_PERSON_CONFIDENCE: f64 = 0.8;
const LABEL_PERSON_CONFIDENCE: f64 = 0.75;

/// Capitalization and context heuristics for ORG and PERSON
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicRecognizer;

impl HeuristicRecognizer {
    /// Create a new heuristic recognizer
    pub fn new() -> Self {
        Self
    }

    /// Entity types this layer can produce
    pub fn labels(&self) -> &'static [EntityType] {
        &[EntityType::Org, EntityType::Person]
    }

    fn organizations(&self, block: &str, out: &mut Vec<RawEntity>) {
        let mut spans: Vec<(usize, usize)> = Vec::new();
        for m in ORG_SUFFIX_RE.find_iter(block) {
            if block[m.end()..].starts_with('-') {
                continue;
            }
            // "Globex Holdings, Inc." continues the previous name
            if let Some(last) = spans.last_mut() {
                if is_suffix_gap(&block[last.1..m.start()]) {
                    last.1 = m.end();
                    continue;
                }
            }
            if let Some(start) = name_start(block, m.start()) {
                spans.push((start, m.end()));
            }
        }
        for (start, end) in spans {
            out.push(RawEntity::new(EntityType::Org, start, end, &block[start..end], SUFFIX_ORG_CONFIDENCE));
        }

        for caps in ORG_LABEL_RE.captures_iter(block) {
            let Some(value) = caps.get(1) else { continue };
            let end = trim_end(block, value.start(), value.end());
            let covered = out
                .iter()
                .any(|e| e.entity_type == EntityType::Org && e.start < end && value.start() < e.end);
            if !covered && end > value.start() {
                out.push(RawEntity::new(
                    EntityType::Org,
                    value.start(),
                    end,
                    &block[value.start()..end],
                    LABEL_ORG_CONFIDENCE,
                ));
            }
        }
    }

    fn people(&self, block: &str, out: &mut Vec<RawEntity>) {
        let rules: [(&Regex, f64); 2] = [
            (&*PERSON_HONORIFIC_RE, HONORIFIC_PERSON_CONFIDENCE),
            (&*PERSON_LABEL_RE, LABEL_PERSON_CONFIDENCE),
        ];
        for (regex, confidence) in rules {
            for caps in regex.captures_iter(block) {
                let Some(name) = caps.get(1) else { continue };
                let overlaps = out.iter().any(|e| e.start < name.end() && name.start() < e.end);
                if !overlaps {
                    out.push(RawEntity::new(EntityType::Person, name.start(), name.end(), name.as_str(), confidence));
                }
            }
        }
    }
}

impl EntityRecognizer for HeuristicRecognizer {
    type Error = RecognizerError;

    fn name(&self) -> &str {
        "heuristic"
    }

    fn recognize(&self, block: &str) -> Result<Vec<RawEntity>, Self::Error> {
        let mut entities = Vec::new();
        self.organizations(block, &mut entities);
        self.people(block, &mut entities);
        entities.sort_by_key(|e| (e.start, e.end));
        Ok(entities)
    }
}

/// Walk back from a corporate suffix over the capitalized words naming it
///
/// Returns the byte offset where the name starts, or `None` if no name word
/// precedes the suffix.
fn name_start(block: &str, suffix_start: usize) -> Option<usize> {
    let before = &block[..suffix_start];
    let trimmed = before.trim_end_matches([' ', '\t']);
    if trimmed.len() == before.len() {
        return None;
    }
    let mut cursor = trimmed.strip_suffix(',').unwrap_or(trimmed).len();

    // (word start, is connector), nearest word first
    let mut words: Vec<(usize, bool)> = Vec::new();
    while words.len() < MAX_NAME_WORDS {
        let head = &block[..cursor];
        let word_start = head
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        let word = &head[word_start..];

        let connector = CONNECTORS.contains(&word);
        if (connector && words.is_empty()) || (!connector && !is_name_word(word)) {
            break;
        }
        words.push((word_start, connector));

        // names do not continue across line breaks
        let separator = &head[..word_start];
        let rest = separator.trim_end_matches([' ', '\t']);
        if rest.len() == separator.len() || rest.is_empty() {
            break;
        }
        cursor = rest.len();
    }

    while words.last().is_some_and(|&(_, connector)| connector) {
        words.pop();
    }
    words.last().map(|&(start, _)| start)
}

fn is_name_word(word: &str) -> bool {
    let mut chars = word.chars();
    let capitalized = chars.next().is_some_and(char::is_uppercase);
    capitalized
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '&' | '\'' | '-'))
        && !LEADING_STOPWORDS.contains(&word.to_lowercase().as_str())
        && !ORG_SUFFIX_RE.is_match(word)
}

/// Only an optional comma and spaces between two suffixes
fn is_suffix_gap(gap: &str) -> bool {
    let gap = gap.strip_prefix(',').unwrap_or(gap);
    !gap.is_empty() && gap.chars().all(|c| c == ' ' || c == '\t')
}

/// Trim trailing whitespace and sentence punctuation, keeping abbreviation dots
fn trim_end(block: &str, start: usize, end: usize) -> usize {
    let text = block[start..end].trim_end_matches([' ', '\t', ',', ';', ':']);
    start + text.len()
}
