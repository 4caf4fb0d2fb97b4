//! Document-level fields: contract title, contract type and description
//!
//! These come from the text itself rather than from recognized entities.

use crate::config::ResolverConfig;
use crate::cues::FoldedText;
use covenant_domain::confidence::{frequency_boost, ConfidenceFactors, NEUTRAL_BOOST};
use covenant_domain::{BlockRole, ExtractedText, FieldCandidate, FieldName, FieldValue, Provenance, Span};

const TITLE_KEYWORDS: [&str; 2] = ["AGREEMENT", "CONTRACT"];
const MIN_TITLE_CHARS: usize = 10;
const MAX_TITLE_CHARS: usize = 100;

/// Title candidates from the leading blocks
///
/// A title is a line of 10 to 100 characters naming an agreement or
/// contract. Headings and all-caps lines get the cue boost; every title
/// after the first gets the uncued factor.
pub(crate) fn titles(text: &ExtractedText, config: &ResolverConfig) -> Vec<FieldCandidate> {
    let mut candidates: Vec<FieldCandidate> = Vec::new();
    let mut seen: Vec<String> = Vec::new();

    for (index, block) in text.blocks().iter().enumerate().take(config.title_scan_blocks) {
        let mut line_origin = block.origin();
        for line in block.text().split('\n') {
            let origin = line_origin;
            line_origin += line.chars().count() + 1;

            let title = line.trim();
            let length = title.chars().count();
            let upper = title.to_uppercase();
            if length <= MIN_TITLE_CHARS
                || length >= MAX_TITLE_CHARS
                || !TITLE_KEYWORDS.iter().any(|kw| upper.contains(kw))
            {
                continue;
            }
            let key = title.to_lowercase();
            if seen.contains(&key) {
                continue;
            }
            seen.push(key);

            let prominent = block.role() == BlockRole::Heading || title == upper;
            let cue = if prominent { config.cue_match_boost } else { NEUTRAL_BOOST };
            let position = if candidates.is_empty() { NEUTRAL_BOOST } else { config.uncued_factor };
            let confidence = ConfidenceFactors::new(config.title_confidence)
                .with_cue_boost(cue * position)
                .resolve();

            let start = origin + line.chars().take_while(|c| c.is_whitespace()).count();
            let provenance = Provenance::Text {
                block_index: index,
                span: Span::new(start, start + length),
            };
            candidates.push(FieldCandidate::new(
                FieldName::ContractTitle,
                FieldValue::Text(title.to_string()),
                confidence,
                provenance,
            ));
        }
    }
    candidates
}

/// Description candidate: the first paragraph after the title
///
/// Without a title the first paragraph after the opening block is used, at
/// the uncued factor. Text beyond `description_max_chars` is cut off and
/// marked with "...".
pub(crate) fn description(text: &ExtractedText, titles: &[FieldCandidate], config: &ResolverConfig) -> Vec<FieldCandidate> {
    let title_block = titles.iter().find_map(|title| match title.provenance() {
        Provenance::Text { block_index, .. } => Some(*block_index),
        Provenance::Entity(_) => None,
    });
    let after = title_block.unwrap_or(0);

    let Some((index, block)) = text
        .blocks()
        .iter()
        .enumerate()
        .skip(after + 1)
        .find(|(_, block)| block.role() == BlockRole::Paragraph)
    else {
        return Vec::new();
    };

    let collapsed = block.text().split_whitespace().collect::<Vec<_>>().join(" ");
    let length = collapsed.chars().count().min(config.description_max_chars);
    let mut summary: String = collapsed.chars().take(length).collect();
    if collapsed.chars().count() > length {
        summary.push_str("...");
    }

    let position = if title_block.is_some() { NEUTRAL_BOOST } else { config.uncued_factor };
    let confidence = ConfidenceFactors::new(config.description_confidence)
        .with_cue_boost(position)
        .resolve();
    let provenance = Provenance::Text {
        block_index: index,
        span: Span::new(block.origin(), block.origin() + block.text().chars().count()),
    };
    vec![FieldCandidate::new(FieldName::Description, FieldValue::Text(summary), confidence, provenance)]
}

/// Contract type candidates from keyword scoring
///
/// Each type scores one point per distinct keyword present in the text; the
/// score feeds the frequency boost. Types with no keyword get no candidate.
pub(crate) fn contract_types(text: &ExtractedText, config: &ResolverConfig) -> Vec<FieldCandidate> {
    let folded = FoldedText::new(text.full_text());

    config
        .type_keywords
        .iter()
        .filter_map(|(contract_type, keywords)| {
            let hits: Vec<(usize, usize)> = keywords
                .iter()
                .filter_map(|kw| {
                    let first = folded.find_all(kw, true).into_iter().next()?;
                    Some((first, kw.trim().chars().count()))
                })
                .collect();
            let &(start, length) = hits.iter().min()?;

            let confidence = ConfidenceFactors::new(config.type_confidence)
                .with_frequency_boost(frequency_boost(hits.len(), config.frequency_step, config.max_frequency_boost))
                .resolve();
            let block_index = text.block_at(start).map_or(0, |(index, _)| index);
            let provenance = Provenance::Text {
                block_index,
                span: Span::new(start, start + length),
            };
            Some(
                FieldCandidate::new(FieldName::ContractType, FieldValue::Text(contract_type.clone()), confidence, provenance)
                    .with_occurrences(hits.len()),
            )
        })
        .collect()
}
