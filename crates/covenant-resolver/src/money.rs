//! Monetary amount normalization and contract value resolution

use crate::config::ResolverConfig;
use crate::cues::{CueIndex, CueKind};
use crate::tally::{Mention, Tally};
use covenant_domain::{EntityType, FieldCandidate, FieldName, FieldValue, MonetaryAmount, RecognizedEntity};
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("valid amount regex"));

const CURRENCY_CODES: [&str; 9] = ["USD", "EUR", "GBP", "JPY", "CAD", "AUD", "CHF", "INR", "CNY"];

/// Normalize a monetary expression
///
/// Handles currency symbols (`$ € £ ¥`), ISO codes before or after the
/// number, currency words, thousands separators and scale suffixes
/// (`K`, `M`, `thousand`, `million`, `billion`).
pub fn parse_money(text: &str) -> Option<MonetaryAmount> {
    let number = NUMBER_RE.find(text)?;
    let digits: String = number.as_str().chars().filter(|c| *c != ',').collect();
    let mut amount = Decimal::from_str(&digits).ok()?;

    let rest = text[number.end()..].trim_start().to_lowercase();
    let scale_word = rest.split(|c: char| !c.is_alphanumeric()).next().unwrap_or("");
    let scale: i64 = match scale_word {
        "k" | "thousand" => 1_000,
        "m" | "mm" | "million" => 1_000_000,
        "b" | "bn" | "billion" => 1_000_000_000,
        _ => 1,
    };
    amount = amount.checked_mul(Decimal::from(scale))?.normalize();

    Some(MonetaryAmount::new(amount, currency(text)))
}

fn currency(text: &str) -> Option<&'static str> {
    if text.contains('$') {
        return Some("USD");
    }
    let symbols = [('€', "EUR"), ('£', "GBP"), ('¥', "JPY")];
    if let Some((_, code)) = symbols.iter().find(|(symbol, _)| text.contains(*symbol)) {
        return Some(*code);
    }

    let upper = text.to_uppercase();
    let words: Vec<&str> = upper.split(|c: char| !c.is_alphabetic()).filter(|w| !w.is_empty()).collect();
    if let Some(code) = CURRENCY_CODES.iter().find(|code| words.contains(*code)) {
        return Some(*code);
    }
    words.iter().find_map(|word| match *word {
        "DOLLAR" | "DOLLARS" => Some("USD"),
        "EURO" | "EUROS" => Some("EUR"),
        "POUND" | "POUNDS" => Some("GBP"),
        _ => None,
    })
}

/// Contract value candidates, one per distinct amount
pub(crate) fn resolve(entities: &[RecognizedEntity], cues: &CueIndex, config: &ResolverConfig) -> Vec<FieldCandidate> {
    let mut tally: Tally<MonetaryAmount> = Tally::default();

    let parsed: Vec<(&RecognizedEntity, MonetaryAmount)> = entities
        .iter()
        .filter(|e| e.entity_type() == EntityType::Money)
        .filter_map(|entity| match parse_money(entity.text()) {
            Some(amount) => Some((entity, amount)),
            None => {
                tracing::debug!(text = entity.text(), "Dropping unparseable amount");
                None
            }
        })
        .collect();

    let spans: Vec<_> = parsed.iter().map(|(entity, _)| entity.span()).collect();
    let assigned = cues.assign(&spans, &[CueKind::Value], config.cue_window_chars);
    for ((entity, amount), cue) in parsed.into_iter().zip(assigned) {
        let factor = if cue.is_some() { config.cue_match_boost } else { config.uncued_factor };
        tally.add(amount.clone(), FieldValue::Money(amount), Mention::new(entity, factor));
    }

    // equal confidence: the larger amount first
    tally.sort_groups_by(|a, b| b.key.amount.cmp(&a.key.amount));
    tally.into_candidates(FieldName::ContractValue, config, false)
}
