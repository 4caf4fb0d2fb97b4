//! Field resolution

use crate::config::ResolverConfig;
use crate::cues::CueIndex;
use crate::{dates, document, money, parties};
use covenant_domain::field::rank_candidates;
use covenant_domain::{ExtractedText, ExtractionWarning, FieldCandidate, FieldName, RecognizedEntity};
use std::collections::{BTreeMap, BTreeSet};

/// Candidates for the requested fields plus resolution warnings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// One entry per requested field, candidates ranked by confidence
    pub fields: BTreeMap<FieldName, Vec<FieldCandidate>>,

    /// Observations made while resolving
    pub warnings: Vec<ExtractionWarning>,
}

/// Maps recognized entities to contract fields
///
/// Resolution is pure: the same text, entities and scope always produce the
/// same candidates in the same order.
#[derive(Debug, Clone, Default)]
pub struct FieldResolver {
    config: ResolverConfig,
}

impl FieldResolver {
    /// Create a resolver with the given configuration
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// The resolver's configuration
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve candidates for every field in `scope`
    ///
    /// Every field in `scope` is a key of the returned map; fields without
    /// candidates map to an empty vector. Candidates never have zero
    /// confidence.
    pub fn resolve(
        &self,
        text: &ExtractedText,
        entities: &[RecognizedEntity],
        scope: &BTreeSet<FieldName>,
    ) -> Resolution {
        let config = &self.config;
        let cues = CueIndex::scan(text, config);
        let mut fields: BTreeMap<FieldName, Vec<FieldCandidate>> = BTreeMap::new();
        let mut warnings = Vec::new();

        if scope.iter().any(FieldName::is_date) {
            let resolution = dates::resolve(entities, &cues, config);
            if resolution.fields.values().all(Vec::is_empty) {
                tracing::warn!(
                    mentions = resolution.mentions,
                    unparsed = resolution.unparsed,
                    "No valid dates detected"
                );
                warnings.push(ExtractionWarning::NoValidDates {
                    unparsed: resolution.unparsed,
                });
            }
            fields.extend(resolution.fields);
        }
        if scope.contains(&FieldName::Client) {
            fields.insert(FieldName::Client, parties::resolve_client(entities, &cues, config));
        }
        if scope.contains(&FieldName::ContractValue) {
            fields.insert(FieldName::ContractValue, money::resolve(entities, &cues, config));
        }
        if FieldName::CONTACTS.iter().any(|f| scope.contains(f)) {
            fields.extend(parties::resolve_contacts(entities, config));
        }
        if scope.contains(&FieldName::ContractTitle) || scope.contains(&FieldName::Description) {
            let titles = document::titles(text, config);
            fields.insert(FieldName::Description, document::description(text, &titles, config));
            fields.insert(FieldName::ContractTitle, titles);
        }
        if scope.contains(&FieldName::ContractType) {
            fields.insert(FieldName::ContractType, document::contract_types(text, config));
        }

        fields.retain(|field, _| scope.contains(field));
        for field in scope {
            let candidates = fields.entry(*field).or_default();
            candidates.retain(|c| c.confidence() > 0.0);
            rank_candidates(candidates);
        }

        tracing::debug!(
            fields = fields.len(),
            candidates = fields.values().map(Vec::len).sum::<usize>(),
            cues = cues.cues().len(),
            "Resolved fields"
        );
        Resolution { fields, warnings }
    }
}
