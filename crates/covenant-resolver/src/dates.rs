//! Date normalization and date field resolution

use crate::config::ResolverConfig;
use crate::cues::{CueIndex, CueKind};
use crate::tally::{Mention, Tally};
use chrono::{Datelike, NaiveDate};
use covenant_domain::{EntityType, FieldCandidate, FieldName, FieldValue, RecognizedEntity};
use std::collections::BTreeMap;

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Words that may appear inside a date expression without carrying a value
const FILLER: [&str; 3] = ["the", "day", "of"];

/// Normalize a date expression to a calendar date
///
/// Accepts month-name forms ("January 5, 2024", "5th January 2024", "the 1st
/// day of March, 2026"), numeric `MM/DD/YYYY` (falling back to `DD/MM/YYYY`
/// when the first number cannot be a month) and ISO `YYYY-MM-DD`. Years
/// outside `[min_year, max_year]` are rejected.
pub fn parse_date(text: &str, min_year: i32, max_year: i32) -> Option<NaiveDate> {
    let lower = text.to_lowercase();
    let tokens: Vec<&str> = lower
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | '/' | '-' | '.'))
        .filter(|t| !t.is_empty() && !FILLER.contains(t))
        .collect();
    if tokens.len() != 3 {
        return None;
    }

    let date = match tokens.iter().position(|t| month_number(t).is_some()) {
        Some(month_at) => {
            let month = month_number(tokens[month_at])?;
            let mut numbers = tokens
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != month_at)
                .map(|(_, t)| strip_ordinal(t));
            let (day, year) = (numbers.next()?, numbers.next()?);
            if year.len() != 4 {
                return None;
            }
            NaiveDate::from_ymd_opt(year.parse().ok()?, month, day.parse().ok()?)?
        }
        None => {
            let [a, b, c] = [tokens[0], tokens[1], tokens[2]];
            if !tokens.iter().all(|t| t.chars().all(|ch| ch.is_ascii_digit())) {
                return None;
            }
            if a.len() == 4 {
                NaiveDate::from_ymd_opt(a.parse().ok()?, b.parse().ok()?, c.parse().ok()?)?
            } else if c.len() == 4 {
                let year = c.parse().ok()?;
                let (first, second): (u32, u32) = (a.parse().ok()?, b.parse().ok()?);
                NaiveDate::from_ymd_opt(year, first, second).or_else(|| NaiveDate::from_ymd_opt(year, second, first))?
            } else {
                return None;
            }
        }
    };

    (min_year..=max_year).contains(&date.year()).then_some(date)
}

fn month_number(token: &str) -> Option<u32> {
    if token.len() < 3 || !token.chars().all(char::is_alphabetic) {
        return None;
    }
    MONTHS
        .iter()
        .position(|month| month.starts_with(token))
        .map(|i| i as u32 + 1)
}

fn strip_ordinal(token: &str) -> &str {
    ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| token.strip_suffix(suffix))
        .filter(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(token)
}

/// Date candidates for the requested date fields
#[derive(Debug, Default)]
pub(crate) struct DateResolution {
    pub fields: BTreeMap<FieldName, Vec<FieldCandidate>>,
    /// Date entities seen
    pub mentions: usize,
    /// Date entities that failed to normalize
    pub unparsed: usize,
}

pub(crate) fn resolve(
    entities: &[RecognizedEntity],
    cues: &CueIndex,
    config: &ResolverConfig,
) -> DateResolution {
    let mut start: Tally<NaiveDate> = Tally::default();
    let mut end: Tally<NaiveDate> = Tally::default();
    let mut renewal: Tally<NaiveDate> = Tally::default();
    let mut resolution = DateResolution::default();

    let mut parsed: Vec<(&RecognizedEntity, NaiveDate)> = Vec::new();
    for entity in entities.iter().filter(|e| e.entity_type() == EntityType::Date) {
        resolution.mentions += 1;
        match parse_date(entity.text(), config.min_year, config.max_year) {
            Some(date) => parsed.push((entity, date)),
            None => {
                tracing::debug!(text = entity.text(), "Dropping unparseable date");
                resolution.unparsed += 1;
            }
        }
    }

    let spans: Vec<_> = parsed.iter().map(|(entity, _)| entity.span()).collect();
    let assigned = cues.assign(&spans, &CueKind::DATES, config.cue_window_chars);
    for ((entity, date), cue) in parsed.into_iter().zip(assigned) {
        let value = FieldValue::Date(date);
        match cue.map(|c| c.kind) {
            Some(CueKind::Start) => start.add(date, value, Mention::new(entity, config.cue_match_boost)),
            Some(CueKind::End) => end.add(date, value, Mention::new(entity, config.cue_match_boost)),
            Some(CueKind::Renewal) => renewal.add(date, value, Mention::new(entity, config.cue_match_boost)),
            _ => {
                start.add(date, value.clone(), Mention::new(entity, config.uncued_factor));
                end.add(date, value, Mention::new(entity, config.uncued_factor));
            }
        }
    }

    // equal confidence: start prefers the earliest mention, end the latest
    end.reverse_by_last_mention();

    resolution.fields.insert(FieldName::StartDate, start.into_candidates(FieldName::StartDate, config, false));
    resolution.fields.insert(FieldName::EndDate, end.into_candidates(FieldName::EndDate, config, true));
    resolution
        .fields
        .insert(FieldName::RenewalDate, renewal.into_candidates(FieldName::RenewalDate, config, false));
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_domain::field::rank_candidates;
    use covenant_domain::{BlockRole, ExtractedText, Span};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn parse(text: &str) -> Option<NaiveDate> {
        parse_date(text, 2000, 2100)
    }

    #[test]
    fn test_month_name_forms() {
        assert_eq!(parse("January 15, 2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse("Jan. 5, 2024"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse("Sept 30 2025"), Some(ymd(2025, 9, 30)));
        assert_eq!(parse("15th of January 2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse("31st December 2025"), Some(ymd(2025, 12, 31)));
        assert_eq!(parse("the 1st day of March, 2026"), Some(ymd(2026, 3, 1)));
    }

    #[test]
    fn test_numeric_forms() {
        assert_eq!(parse("03/15/2024"), Some(ymd(2024, 3, 15)));
        assert_eq!(parse("15/03/2024"), Some(ymd(2024, 3, 15)));
        assert_eq!(parse("2024-03-20"), Some(ymd(2024, 3, 20)));
        assert_eq!(parse("12-31-2024"), Some(ymd(2024, 12, 31)));
    }

    #[test]
    fn test_rejected_forms() {
        assert_eq!(parse("February 30, 2024"), None);
        assert_eq!(parse("MA 02115"), None);
        assert_eq!(parse("next month"), None);
        assert_eq!(parse("January 1, 1999"), None);
        assert_eq!(parse("13/13/2024"), None);
        assert_eq!(parse("Mayday 1, 2024"), None);
    }

    fn entities(text: &ExtractedText, dates: &[&str]) -> Vec<RecognizedEntity> {
        let full = text.full_text();
        let mut found: Vec<_> = dates
            .iter()
            .flat_map(|d| full.match_indices(d).map(move |(byte, s)| (full[..byte].chars().count(), s)))
            .collect();
        found.sort();
        found
            .into_iter()
            .enumerate()
            .map(|(i, (start, s))| {
                RecognizedEntity::new(i, EntityType::Date, s, Span::new(start, start + s.chars().count()), 0, 0.9)
            })
            .collect()
    }

    fn run(body: &str, dates: &[&str]) -> DateResolution {
        let text = ExtractedText::from_blocks([(BlockRole::Paragraph, body)]);
        let config = ResolverConfig::default();
        let cues = CueIndex::scan(&text, &config);
        let mut resolution = resolve(&entities(&text, dates), &cues, &config);
        for candidates in resolution.fields.values_mut() {
            rank_candidates(candidates);
        }
        resolution
    }

    fn top(resolution: &DateResolution, field: FieldName) -> Option<NaiveDate> {
        resolution.fields[&field].first().and_then(|c| c.value().as_date())
    }

    #[test]
    fn test_cued_dates_feed_their_field() {
        let resolution = run(
            "This Agreement is effective January 1, 2024 and expires December 31, 2024. \
             It renews automatically on January 1, 2025.",
            &["January 1, 2024", "December 31, 2024", "January 1, 2025"],
        );
        assert_eq!(top(&resolution, FieldName::StartDate), Some(ymd(2024, 1, 1)));
        assert_eq!(top(&resolution, FieldName::EndDate), Some(ymd(2024, 12, 31)));
        assert_eq!(top(&resolution, FieldName::RenewalDate), Some(ymd(2025, 1, 1)));
        assert_eq!(resolution.fields[&FieldName::StartDate].len(), 1);
        assert!((resolution.fields[&FieldName::StartDate][0].confidence() - 0.99).abs() < 1e-9);
    }

    #[test]
    fn test_one_cue_marks_one_date() {
        let resolution = run(
            "The services shall commence on January 1, 2024 and shall continue until December 31, 2025.",
            &["January 1, 2024", "December 31, 2025"],
        );
        assert_eq!(top(&resolution, FieldName::StartDate), Some(ymd(2024, 1, 1)));
        assert_eq!(top(&resolution, FieldName::EndDate), Some(ymd(2025, 12, 31)));

        let start = &resolution.fields[&FieldName::StartDate];
        assert_eq!(start.len(), 2);
        assert!(start[0].confidence() > start[1].confidence());
    }

    #[test]
    fn test_repeated_cued_date_outranks_single() {
        let resolution = run(
            "The pilot starts February 1, 2024. Full service starts March 1, 2024 and billing begins March 1, 2024.",
            &["February 1, 2024", "March 1, 2024"],
        );
        let start = &resolution.fields[&FieldName::StartDate];
        assert_eq!(start[0].value().as_date(), Some(ymd(2024, 3, 1)));
        assert_eq!(start[0].occurrences(), 2);
        assert!(start[1].confidence() < 1.0);
        assert!(start[0].confidence() > start[1].confidence());
    }

    #[test]
    fn test_uncued_dates_feed_start_and_end() {
        let resolution = run("Term: 01/01/2024 through 12/31/2024.", &["01/01/2024", "12/31/2024"]);

        // both dates compete for both fields; ties break by position
        assert_eq!(top(&resolution, FieldName::StartDate), Some(ymd(2024, 1, 1)));
        assert_eq!(top(&resolution, FieldName::EndDate), Some(ymd(2024, 12, 31)));
        assert_eq!(resolution.fields[&FieldName::EndDate].len(), 2);
        assert!(resolution.fields[&FieldName::RenewalDate].is_empty());

        let start = &resolution.fields[&FieldName::StartDate][0];
        assert!((start.confidence() - 0.72).abs() < 1e-9);
    }

    #[test]
    fn test_repeated_dates_merge() {
        let resolution = run(
            "Effective 2024-01-01. Services begin on 2024-01-01.",
            &["2024-01-01"],
        );
        let start = &resolution.fields[&FieldName::StartDate];
        assert_eq!(start.len(), 1);
        assert_eq!(start[0].occurrences(), 2);
        assert_eq!(start[0].provenance().span().start, 10);
    }

    #[test]
    fn test_unparsed_dates_are_counted() {
        let resolution = run("Signed in Spring 2024 and revisited in Q3 2024.", &["Spring 2024", "Q3 2024"]);
        assert_eq!(resolution.mentions, 2);
        assert_eq!(resolution.unparsed, 2);
        assert!(resolution.fields.values().all(Vec::is_empty));
    }
}
