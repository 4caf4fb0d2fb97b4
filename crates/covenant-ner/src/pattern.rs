//! Pattern layer: structured entities found by regular expressions
//!
//! High precision for DATE, MONEY, EMAIL, and PHONE. Patterns are compiled
//! once per process.

use crate::error::RecognizerError;
use covenant_domain::traits::EntityRecognizer;
use covenant_domain::{EntityType, RawEntity};
use regex::Regex;
use std::sync::LazyLock;

const MONTH: &str = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let month_first = format!(r"{MONTH}\.?[ \t]+\d{{1,2}}(?:st|nd|rd|th)?,?[ \t]+\d{{4}}");
    let day_first = format!(r"\d{{1,2}}(?:st|nd|rd|th)?[ \t]+(?:day[ \t]+)?(?:of[ \t]+)?{MONTH}\.?,?[ \t]+\d{{4}}");
    let numeric = r"\d{1,2}[/.-]\d{1,2}[/.-]\d{4}";
    let iso = r"\d{4}-\d{1,2}-\d{1,2}";
    Regex::new(&format!(r"(?i)\b(?:{month_first}|{day_first}|{numeric}|{iso})\b")).expect("valid date regex")
});

static MONEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    let number = r"(?:\d{1,3}(?:,\d{3})+(?:\.\d{1,2})?|\d+(?:\.\d{1,2})?)";
    let scale = r"(?:[ \t]?(?:thousand|million|billion|mm|bn|k|m)\b)?";
    let symbol = format!(r"(?:US)?[$€£¥][ \t]?{number}{scale}");
    let code_first = format!(r"\b(?:USD|EUR|GBP|JPY|CAD|AUD|CHF|INR|CNY)[ \t]?{number}{scale}");
    let code_after = format!(r"\b{number}{scale}[ \t]?(?:USD|EUR|GBP|JPY|CAD|AUD|CHF|INR|CNY|dollars|euros|pounds)\b");
    Regex::new(&format!(r"(?i)(?:{symbol}|{code_first}|{code_after})")).expect("valid money regex")
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}\b").expect("valid email regex")
});

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+\d{1,3}[ \t.-]?)?(?:\(\d{3}\)[ \t.-]?|\b\d{3}[ \t.-])\d{3}[ \t.-]\d{4}\b").expect("valid phone regex")
});

const WRITTEN_DATE_CONFIDENCE: f64 = 0.8;
const NUMERIC_DATE_CONFIDENCE: f64 = 0.75;
const MONEY_CONFIDENCE: f64 = 0.8;
const EMAIL_CONFIDENCE: f64 = 0.9;
const PHONE_CONFIDENCE: f64 = 0.75;

/// Regex-based recognizer for DATE, MONEY, EMAIL, and PHONE
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternRecognizer;

impl PatternRecognizer {
    /// Create a new pattern recognizer
    pub fn new() -> Self {
        Self
    }

    /// Entity types this layer can produce
    pub fn labels(&self) -> &'static [EntityType] {
        &[EntityType::Date, EntityType::Money, EntityType::Email, EntityType::Phone]
    }
}

impl EntityRecognizer for PatternRecognizer {
    type Error = RecognizerError;

    fn name(&self) -> &str {
        "pattern"
    }

    fn recognize(&self, block: &str) -> Result<Vec<RawEntity>, Self::Error> {
        let mut entities = Vec::new();

        for m in DATE_RE.find_iter(block) {
            let confidence = if m.as_str().chars().any(char::is_alphabetic) {
                WRITTEN_DATE_CONFIDENCE
            } else {
                NUMERIC_DATE_CONFIDENCE
            };
            entities.push(RawEntity::new(EntityType::Date, m.start(), m.end(), m.as_str(), confidence));
        }

        let rules: [(&Regex, EntityType, f64); 3] = [
            (&*MONEY_RE, EntityType::Money, MONEY_CONFIDENCE),
            (&*EMAIL_RE, EntityType::Email, EMAIL_CONFIDENCE),
            (&*PHONE_RE, EntityType::Phone, PHONE_CONFIDENCE),
        ];
        for (regex, entity_type, confidence) in rules {
            for m in regex.find_iter(block) {
                entities.push(RawEntity::new(entity_type, m.start(), m.end(), m.as_str(), confidence));
            }
        }

        entities.sort_by_key(|e| (e.start, e.end));
        Ok(entities)
    }
}
