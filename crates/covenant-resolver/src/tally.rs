//! Merging repeated mentions of the same value
//!
//! Mentions are grouped by a normalized key. Each group becomes one
//! candidate whose confidence combines the strongest base confidence, the
//! strongest cue factor and a frequency boost for the number of mentions.

use crate::config::ResolverConfig;
use covenant_domain::confidence::{frequency_boost, ConfidenceFactors};
use covenant_domain::{EntityRef, FieldCandidate, FieldName, FieldValue, RecognizedEntity};

/// One entity supporting a value
#[derive(Debug, Clone, Copy)]
pub(crate) struct Mention<'a> {
    pub entity: &'a RecognizedEntity,
    pub cue_boost: f64,
    pub partner: Option<EntityRef>,
}

impl<'a> Mention<'a> {
    pub(crate) fn new(entity: &'a RecognizedEntity, cue_boost: f64) -> Self {
        Self {
            entity,
            cue_boost,
            partner: None,
        }
    }

    pub(crate) fn with_partner(mut self, partner: Option<EntityRef>) -> Self {
        self.partner = partner;
        self
    }
}

#[derive(Debug)]
pub(crate) struct Group<'a, K> {
    pub key: K,
    pub value: FieldValue,
    pub mentions: Vec<Mention<'a>>,
}

impl<K> Group<'_, K> {
    fn last_position(&self) -> usize {
        self.mentions.last().map_or(0, |m| m.entity.span().start)
    }
}

/// Mentions grouped by key, in order of first appearance
#[derive(Debug)]
pub(crate) struct Tally<'a, K> {
    groups: Vec<Group<'a, K>>,
}

impl<K> Default for Tally<'_, K> {
    fn default() -> Self {
        Self { groups: Vec::new() }
    }
}

impl<'a, K: PartialEq> Tally<'a, K> {
    /// Record a mention; the value of the first mention of a key is kept
    pub(crate) fn add(&mut self, key: K, value: FieldValue, mention: Mention<'a>) {
        match self.groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.mentions.push(mention),
            None => self.groups.push(Group {
                key,
                value,
                mentions: vec![mention],
            }),
        }
    }

    /// Order groups so the most recently mentioned comes first
    pub(crate) fn reverse_by_last_mention(&mut self) {
        self.groups.sort_by_key(|g| std::cmp::Reverse(g.last_position()));
    }

    /// Reorder groups; candidates with equal confidence keep this order
    pub(crate) fn sort_groups_by<F>(&mut self, compare: F)
    where
        F: FnMut(&Group<'a, K>, &Group<'a, K>) -> std::cmp::Ordering,
    {
        self.groups.sort_by(compare);
    }

    /// Turn each group into a candidate, dropping zero-confidence ones
    ///
    /// Provenance points at the first mention, or the last with
    /// `latest_provenance`.
    pub(crate) fn into_candidates(
        self,
        field: FieldName,
        config: &ResolverConfig,
        latest_provenance: bool,
    ) -> Vec<FieldCandidate> {
        self.groups
            .into_iter()
            .filter_map(|group| {
                let evidence = if latest_provenance {
                    group.mentions.last()?
                } else {
                    group.mentions.first()?
                };
                let base = group
                    .mentions
                    .iter()
                    .map(|m| m.entity.base_confidence())
                    .fold(0.0, f64::max);
                let strongest = group
                    .mentions
                    .iter()
                    .max_by(|a, b| a.cue_boost.total_cmp(&b.cue_boost))?;
                let occurrences = group.mentions.len();

                let confidence = ConfidenceFactors::new(base)
                    .with_cue_boost(strongest.cue_boost)
                    .with_frequency_boost(frequency_boost(
                        occurrences,
                        config.frequency_step,
                        config.max_frequency_boost,
                    ))
                    .resolve();
                if confidence <= 0.0 {
                    return None;
                }

                let candidate = FieldCandidate::new(field, group.value, confidence, evidence.entity.reference())
                    .with_occurrences(occurrences);
                let partner = strongest.partner.or_else(|| group.mentions.iter().find_map(|m| m.partner));
                Some(match partner {
                    Some(partner) => candidate.with_pairing(partner),
                    None => candidate,
                })
            })
            .collect()
    }
}
