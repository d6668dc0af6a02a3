/*!
# Contact grouping & filtering

Groups parsed contacts by electrode and applies the good-leads allow-list.
Group order is first appearance in the jacksheet and contact order within a
group is ascending jackbox index; both orderings are load-bearing for the
downstream hardware configuration, which is why the grouping container is an
insertion-ordered [`IndexMap`].
*/

use crate::contact::Contact;
use crate::errors::{JacksheetError, JacksheetResult};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Ordered mapping from electrode name to its contacts.
pub type ElectrodeGroups = IndexMap<String, Vec<Contact>>;

/// Parse a good-leads file: one contact label per line.
pub fn parse_good_leads(raw: &str) -> HashSet<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Group contacts by electrode, preserving first-seen electrode order.
///
/// Contacts absent from `good_leads` (when supplied) are marked not-good and
/// excluded from all subsequent channel derivation, but stay in their group
/// for surface-area bookkeeping and diagnostics.
///
/// Two contacts with the same label on one electrode mean a co-located
/// micro/macro pair is missing its distinguishing marker; that fails with
/// [`JacksheetError::AmbiguousMicroMacro`] rather than silently merging.
pub fn group_contacts(
    contacts: Vec<Contact>,
    good_leads: Option<&HashSet<String>>,
) -> JacksheetResult<ElectrodeGroups> {
    let mut groups = ElectrodeGroups::new();
    let mut labels_seen: HashMap<String, String> = HashMap::new();

    for mut contact in contacts {
        if let Some(previous_electrode) = labels_seen.get(contact.label()) {
            if previous_electrode == contact.electrode() {
                return Err(JacksheetError::AmbiguousMicroMacro {
                    electrode: contact.electrode().to_string(),
                    label: contact.label().to_string(),
                });
            }
        }
        labels_seen.insert(contact.label().to_string(), contact.electrode().to_string());

        if let Some(good) = good_leads {
            contact.is_good = good.contains(contact.label());
            if !contact.is_good {
                debug!(label = contact.label(), "contact excluded by good leads");
            }
        }

        groups
            .entry(contact.electrode().to_string())
            .or_default()
            .push(contact);
    }

    for group in groups.values_mut() {
        group.sort_by_key(Contact::index);
    }

    if let Some(good) = good_leads {
        let known: HashSet<&str> = groups
            .values()
            .flatten()
            .map(Contact::label)
            .collect();
        for label in good {
            if !known.contains(label.as_str()) {
                warn!(label, "good-leads entry does not match any contact");
            }
        }
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{parse_jacksheet, JacksheetOptions};

    fn contacts(raw: &str) -> Vec<Contact> {
        parse_jacksheet(raw, &JacksheetOptions::default()).unwrap()
    }

    #[test]
    fn groups_preserve_first_seen_order() {
        // LB appears first even though LA sorts before it.
        let groups = group_contacts(contacts("1 LB1\n2 LB2\n3 LA1\n4 LA2\n"), None).unwrap();
        let order: Vec<_> = groups.keys().cloned().collect();
        assert_eq!(order, ["LB", "LA"]);
    }

    #[test]
    fn contacts_sort_by_index_within_a_group() {
        // Interleaved electrodes: LA contacts land on slots 1 and 4.
        let groups = group_contacts(contacts("4 LA2\n2 LB1\n1 LA1\n"), None).unwrap();
        let la: Vec<_> = groups["LA"].iter().map(Contact::index).collect();
        assert_eq!(la, [1, 4]);
    }

    #[test]
    fn micro_and_macro_contacts_form_separate_groups() {
        let groups = group_contacts(contacts("1 LA1\n2 LA2\n3 uLA1\n4 uLA2\n"), None).unwrap();
        assert_eq!(groups.len(), 2);
        assert!(groups["uLA"].iter().all(Contact::is_micro));
        assert!(groups["LA"].iter().all(|c| !c.is_micro()));
    }

    #[test]
    fn duplicate_label_on_one_electrode_is_ambiguous() {
        let err = group_contacts(contacts("1 LA1\n2 LA1\n"), None).unwrap_err();
        assert!(matches!(err, JacksheetError::AmbiguousMicroMacro { .. }));
    }

    #[test]
    fn good_leads_marks_but_keeps_excluded_contacts() {
        let good = parse_good_leads("LA1\nLA3\n");
        let groups = group_contacts(contacts("1 LA1\n2 LA2\n3 LA3\n"), Some(&good)).unwrap();
        let la = &groups["LA"];
        assert_eq!(la.len(), 3);
        assert!(la[0].is_good);
        assert!(!la[1].is_good);
        assert!(la[2].is_good);
    }

    #[test]
    fn good_leads_parsing_trims_blank_lines() {
        let good = parse_good_leads("LA1\n\n  LA2  \n");
        assert_eq!(good.len(), 2);
        assert!(good.contains("LA2"));
    }
}
