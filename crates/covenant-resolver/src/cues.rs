//! Cue detection
//!
//! A cue is a word in the document that says what a nearby entity means:
//! "effective" before a date makes it a start date, "fee" before an amount
//! makes it the contract value. Cues are found by scanning a case-folded copy
//! of the full text for configured words. A word ending in `*` is a stem and
//! matches any word it starts ("terminat*" matches "terminates").

use crate::config::ResolverConfig;
use covenant_domain::{ExtractedText, Span};

/// What a cue says about nearby entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CueKind {
    /// Start of the contract term
    Start,
    /// End of the contract term
    End,
    /// Renewal of the contract
    Renewal,
    /// Contract value
    Value,
    /// Client organization
    Client,
}

impl CueKind {
    /// Cue kinds that qualify dates
    pub const DATES: [CueKind; 3] = [CueKind::Start, CueKind::End, CueKind::Renewal];
}

/// A cue word located in the full text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cue {
    /// What the cue indicates
    pub kind: CueKind,
    /// Character span of the whole cue word
    pub span: Span,
}

/// Case-folded characters of a text, indexed like the original
///
/// Each character folds to exactly one character so that offsets line up
/// with the original text.
#[derive(Debug, Clone)]
pub(crate) struct FoldedText {
    chars: Vec<char>,
}

impl FoldedText {
    pub(crate) fn new(text: &str) -> Self {
        Self {
            chars: text.chars().map(|c| c.to_lowercase().next().unwrap_or(c)).collect(),
        }
    }

    /// Character offsets where `needle` starts at a word start
    ///
    /// With `whole_word`, the match must also end at a word end.
    pub(crate) fn find_all(&self, needle: &str, whole_word: bool) -> Vec<usize> {
        let needle: Vec<char> = needle.trim().chars().flat_map(char::to_lowercase).collect();
        if needle.is_empty() || needle.len() > self.chars.len() {
            return Vec::new();
        }

        (0..=self.chars.len() - needle.len())
            .filter(|&i| self.chars[i..i + needle.len()] == needle[..])
            .filter(|&i| i == 0 || !self.chars[i - 1].is_alphanumeric())
            .filter(|&i| {
                !whole_word
                    || self
                        .chars
                        .get(i + needle.len())
                        .is_none_or(|c| !c.is_alphanumeric())
            })
            .collect()
    }

    /// Offset one past the end of the word containing `offset`
    pub(crate) fn word_end(&self, offset: usize) -> usize {
        let mut end = offset;
        while end < self.chars.len() && self.chars[end].is_alphanumeric() {
            end += 1;
        }
        end
    }
}

/// All cues found in a document, ordered by position
#[derive(Debug, Clone, Default)]
pub struct CueIndex {
    cues: Vec<Cue>,
}

impl CueIndex {
    /// Scan a document for every configured cue
    pub fn scan(text: &ExtractedText, config: &ResolverConfig) -> Self {
        let folded = FoldedText::new(text.full_text());
        let lists = [
            (CueKind::Start, &config.start_cues),
            (CueKind::End, &config.end_cues),
            (CueKind::Renewal, &config.renewal_cues),
            (CueKind::Value, &config.value_cues),
            (CueKind::Client, &config.client_cues),
        ];

        let mut cues = Vec::new();
        for (kind, words) in lists {
            for word in words {
                let (needle, whole_word) = match word.trim().strip_suffix('*') {
                    Some(stem) => (stem, false),
                    None => (word.as_str(), true),
                };
                for start in folded.find_all(needle, whole_word) {
                    let end = folded.word_end(start).max(start + needle.trim().chars().count());
                    cues.push(Cue {
                        kind,
                        span: Span::new(start, end),
                    });
                }
            }
        }
        cues.sort_by_key(|cue| (cue.span.start, cue.span.end));
        // a word matched by two stems of the same kind counts once
        cues.dedup_by(|a, b| a.kind == b.kind && a.span.start == b.span.start);
        Self { cues }
    }

    /// Every cue, in document order
    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    /// Pair cues of one of `kinds` with the entities at `spans`
    ///
    /// A cue reaches only its nearest entity on either side within `window`
    /// characters. Each cue qualifies at most one entity and each entity
    /// takes at most one cue. Pairs are made greedily, cues before their
    /// entity first and then by distance, so a cue pairs with the entity
    /// before it ("January 1, 2024 (the Effective Date)") only when the
    /// entity after it is claimed or out of reach. The returned vector is
    /// parallel to `spans`.
    pub fn assign(&self, spans: &[Span], kinds: &[CueKind], window: usize) -> Vec<Option<Cue>> {
        // (cue after entity, distance, cue index, entity index)
        let mut pairs: Vec<(bool, usize, usize, usize)> = Vec::new();
        for (c, cue) in self.cues.iter().enumerate().filter(|(_, cue)| kinds.contains(&cue.kind)) {
            let following = spans
                .iter()
                .enumerate()
                .filter(|(_, span)| span.start >= cue.span.end)
                .min_by_key(|(e, span)| (span.start, *e));
            let preceding = spans
                .iter()
                .enumerate()
                .filter(|(_, span)| span.end <= cue.span.start)
                .max_by_key(|(e, span)| (span.end, std::cmp::Reverse(*e)));

            for (backward, neighbor) in [(false, following), (true, preceding)] {
                if let Some((e, span)) = neighbor {
                    let distance = cue.span.distance(span);
                    if distance <= window {
                        pairs.push((backward, distance, c, e));
                    }
                }
            }
        }
        pairs.sort_unstable();

        let mut cue_taken = vec![false; self.cues.len()];
        let mut assigned: Vec<Option<Cue>> = vec![None; spans.len()];
        for (_, _, c, e) in pairs {
            if !cue_taken[c] && assigned[e].is_none() {
                cue_taken[c] = true;
                assigned[e] = Some(self.cues[c]);
            }
        }
        assigned
    }
}
