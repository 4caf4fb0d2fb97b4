//! Client organization and contact resolution

use crate::config::ResolverConfig;
use crate::cues::{CueIndex, CueKind};
use crate::tally::{Mention, Tally};
use covenant_domain::confidence::NEUTRAL_BOOST;
use covenant_domain::{EntityType, FieldCandidate, FieldName, FieldValue, RecognizedEntity};
use std::collections::BTreeMap;

/// Key under which organization mentions are merged
///
/// Case-folded, whitespace-collapsed, trailing punctuation stripped:
/// "ACME  Corp." and "Acme Corp" share a key.
pub fn organization_key(name: &str) -> String {
    let collapsed = name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    collapsed.trim_end_matches(['.', ',', ';', ':']).to_string()
}

/// Phone number reduced to digits, with a leading `+` kept
///
/// Returns `None` unless the number has 7 to 15 digits.
pub fn normalize_phone(text: &str) -> Option<String> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if !(7..=15).contains(&digits.len()) {
        return None;
    }
    if text.trim_start().starts_with('+') {
        Some(format!("+{}", digits))
    } else {
        Some(digits)
    }
}

fn display_name(surface: &str) -> String {
    let collapsed = surface.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.trim_end_matches([',', ';', ':']).to_string()
}

pub(crate) fn resolve_client(entities: &[RecognizedEntity], cues: &CueIndex, config: &ResolverConfig) -> Vec<FieldCandidate> {
    let stoplist: Vec<String> = config.org_stoplist.iter().map(|s| organization_key(s)).collect();
    let mut tally: Tally<String> = Tally::default();

    let mut organizations: Vec<(&RecognizedEntity, String)> = Vec::new();
    for entity in entities.iter().filter(|e| e.entity_type() == EntityType::Org) {
        let key = organization_key(entity.text());
        if key.is_empty() || stoplist.contains(&key) {
            tracing::debug!(text = entity.text(), "Dropping stoplisted organization");
            continue;
        }
        organizations.push((entity, key));
    }

    let spans: Vec<_> = organizations.iter().map(|(entity, _)| entity.span()).collect();
    let assigned = cues.assign(&spans, &[CueKind::Client], config.cue_window_chars);
    for ((entity, key), cue) in organizations.into_iter().zip(assigned) {
        let factor = if cue.is_some() { config.cue_match_boost } else { NEUTRAL_BOOST };
        let value = FieldValue::Text(display_name(entity.text()));
        tally.add(key, value, Mention::new(entity, factor));
    }

    tally.into_candidates(FieldName::Client, config, false)
}

/// Contact name, email and phone candidates
pub(crate) fn resolve_contacts(
    entities: &[RecognizedEntity],
    config: &ResolverConfig,
) -> BTreeMap<FieldName, Vec<FieldCandidate>> {
    let mut names: Tally<String> = Tally::default();
    let mut emails: Tally<String> = Tally::default();
    let mut phones: Tally<String> = Tally::default();

    for entity in entities {
        match entity.entity_type() {
            EntityType::Email => {
                let address = entity.text().trim().to_lowercase();
                emails.add(address.clone(), FieldValue::Text(address), Mention::new(entity, NEUTRAL_BOOST));
            }
            EntityType::Phone => match normalize_phone(entity.text()) {
                Some(number) => phones.add(number.clone(), FieldValue::Text(number), Mention::new(entity, NEUTRAL_BOOST)),
                None => tracing::debug!(text = entity.text(), "Dropping malformed phone number"),
            },
            EntityType::Person => {
                let partner = nearest_contact_detail(entity, entities, config.contact_window_chars);
                let factor = if partner.is_some() { config.pairing_boost } else { config.uncued_factor };
                let mention = Mention::new(entity, factor).with_partner(partner.map(RecognizedEntity::reference));
                names.add(organization_key(entity.text()), FieldValue::Text(display_name(entity.text())), mention);
            }
            _ => {}
        }
    }

    BTreeMap::from([
        (FieldName::ContactName, names.into_candidates(FieldName::ContactName, config, false)),
        (FieldName::ContactEmail, emails.into_candidates(FieldName::ContactEmail, config, false)),
        (FieldName::ContactPhone, phones.into_candidates(FieldName::ContactPhone, config, false)),
    ])
}

/// The closest email or phone entity within `window` characters of a person
fn nearest_contact_detail<'a>(
    person: &RecognizedEntity,
    entities: &'a [RecognizedEntity],
    window: usize,
) -> Option<&'a RecognizedEntity> {
    entities
        .iter()
        .filter(|e| matches!(e.entity_type(), EntityType::Email | EntityType::Phone))
        .map(|e| (e.span().distance(&person.span()), e))
        .filter(|(distance, _)| *distance <= window)
        .min_by_key(|(distance, e)| (*distance, e.ordinal()))
        .map(|(_, e)| e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_domain::field::rank_candidates;
    use covenant_domain::{BlockRole, ExtractedText, Span};

    fn located(body: &str, found: &[(&str, EntityType, f64)]) -> Vec<RecognizedEntity> {
        let mut entities: Vec<(usize, &str, EntityType, f64)> = Vec::new();
        for (surface, entity_type, confidence) in found {
            for (byte, s) in body.match_indices(surface) {
                entities.push((body[..byte].chars().count(), s, *entity_type, *confidence));
            }
        }
        entities.sort_by_key(|e| e.0);
        entities
            .into_iter()
            .enumerate()
            .map(|(i, (start, s, ty, conf))| {
                RecognizedEntity::new(i, ty, s, Span::new(start, start + s.chars().count()), 0, conf)
            })
            .collect()
    }

    fn clients(body: &str, found: &[(&str, EntityType, f64)]) -> Vec<FieldCandidate> {
        let text = ExtractedText::from_blocks([(BlockRole::Paragraph, body)]);
        let config = ResolverConfig::default();
        let mut candidates = resolve_client(&located(body, found), &CueIndex::scan(&text, &config), &config);
        rank_candidates(&mut candidates);
        candidates
    }

    #[test]
    fn test_organization_key() {
        assert_eq!(organization_key("ACME  Corp."), "acme corp");
        assert_eq!(organization_key(" Acme Corp, "), "acme corp");
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("(555) 123-4567").as_deref(), Some("5551234567"));
        assert_eq!(normalize_phone("+1 555.987.6543").as_deref(), Some("+15559876543"));
        assert_eq!(normalize_phone("12-34"), None);
    }

    #[test]
    fn test_frequent_organization_ranks_first() {
        let body = "Acme Corp will pay Initech LLC. Acme Corp owns the work. Acme Corp may terminate.";
        let candidates = clients(body, &[("Acme Corp", EntityType::Org, 0.75), ("Initech LLC", EntityType::Org, 0.75)]);

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].value().as_text(), Some("Acme Corp"));
        assert_eq!(candidates[0].occurrences(), 3);
        assert!(candidates[0].confidence() > candidates[1].confidence());
        assert_eq!(candidates[1].confidence(), 0.75);
    }

    #[test]
    fn test_client_cue_boosts() {
        let body = "Client: Globex Inc. The vendor shall deliver all work product described in the statement \
                    of work. Vendor: Initech LLC.";
        let candidates = clients(body, &[("Initech LLC", EntityType::Org, 0.7), ("Globex Inc", EntityType::Org, 0.7)]);
        assert_eq!(candidates[0].value().as_text(), Some("Globex Inc"));
    }

    #[test]
    fn test_stoplisted_organizations_are_dropped() {
        let body = "This Agreement is made with LLC and Acme Corp.";
        let candidates = clients(
            body,
            &[("Agreement", EntityType::Org, 0.6), ("LLC", EntityType::Org, 0.6), ("Acme Corp", EntityType::Org, 0.7)],
        );
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_contacts() {
        let body = "Approved by John Smith, Vice President of Operations for the Northern Region, on behalf \
                    of the board of directors and its committees. Please contact Jane Doe at jane.doe@acme.com \
                    or (555) 123-4567.";
        let entities = located(
            body,
            &[
                ("Jane Doe", EntityType::Person, 0.8),
                ("John Smith", EntityType::Person, 0.8),
                ("jane.doe@acme.com", EntityType::Email, 0.95),
                ("(555) 123-4567", EntityType::Phone, 0.8),
            ],
        );
        let mut fields = resolve_contacts(&entities, &ResolverConfig::default());
        for candidates in fields.values_mut() {
            rank_candidates(candidates);
        }

        let names = &fields[&FieldName::ContactName];
        assert_eq!(names[0].value().as_text(), Some("Jane Doe"));
        let partner = names[0].paired_with().unwrap();
        assert_eq!(partner.entity_type, EntityType::Email);
        assert!(names[1].paired_with().is_none());
        assert!((names[1].confidence() - 0.64).abs() < 1e-9);

        assert_eq!(fields[&FieldName::ContactEmail][0].value().as_text(), Some("jane.doe@acme.com"));
        assert_eq!(fields[&FieldName::ContactPhone][0].value().as_text(), Some("5551234567"));
    }
}
