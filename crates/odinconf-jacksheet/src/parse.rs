/*!
# Jacksheet parsing

A jacksheet is a newline-delimited listing of `index <whitespace> label`
records. Parsing is strict: every non-blank row must yield exactly one
in-range integer index and one non-empty label, and indexes may not repeat.
Failures carry the offending line so they are actionable at the call site.
*/

use crate::contact::{Contact, MAX_JACKBOX};
use crate::errors::{JacksheetError, JacksheetResult};
use std::collections::HashMap;
use tracing::debug;

/// Label prefixes for non-neural channels that are never materialized as
/// contacts. Matching is case-sensitive.
pub const NON_NEURAL_PREFIXES: [&str; 2] = ["ECG", "EKG"];

/// Recognized options for the parse pass.
#[derive(Debug, Clone)]
pub struct JacksheetOptions {
    /// Apply [`standardize_label`] to every label before anything else runs.
    /// Off by default; jacksheets from sites with consistent naming should
    /// be taken verbatim.
    pub standardize_labels: bool,
    /// Surface area in mm^2 assigned to every contact until overridden.
    pub default_surface_area: f64,
    /// Keep ECG/EKG channels instead of dropping them. Only useful for
    /// diagnostic listings; channel derivation assumes this is off.
    pub keep_non_neural: bool,
}

impl Default for JacksheetOptions {
    fn default() -> Self {
        Self {
            standardize_labels: false,
            default_surface_area: 0.001,
            keep_non_neural: false,
        }
    }
}

/// Parse raw jacksheet text into contacts, in file order.
pub fn parse_jacksheet(raw: &str, opts: &JacksheetOptions) -> JacksheetResult<Vec<Contact>> {
    let mut contacts = Vec::new();
    let mut seen: HashMap<u16, usize> = HashMap::new();

    for (lineno, line) in raw.lines().enumerate() {
        let lineno = lineno + 1;
        if line.trim().is_empty() {
            continue;
        }

        let mut fields = line.split_whitespace();
        let (index_field, label_field) = match (fields.next(), fields.next(), fields.next()) {
            (Some(index), Some(label), None) => (index, label),
            _ => {
                return Err(JacksheetError::MalformedRow {
                    line: lineno,
                    text: line.to_string(),
                })
            }
        };

        let index: u64 = index_field
            .parse()
            .map_err(|_| JacksheetError::MalformedRow {
                line: lineno,
                text: line.to_string(),
            })?;
        if index == 0 || index > u64::from(MAX_JACKBOX) {
            return Err(JacksheetError::IndexOutOfRange {
                index,
                line: lineno,
                max: MAX_JACKBOX,
            });
        }
        let index = index as u16;

        if seen.insert(index, lineno).is_some() {
            return Err(JacksheetError::DuplicateIndex {
                index,
                line: lineno,
            });
        }

        let label = if opts.standardize_labels {
            standardize_label(label_field)
        } else {
            label_field.to_string()
        };

        if !opts.keep_non_neural && is_non_neural(&label) {
            debug!(label, index, "dropping non-neural channel");
            continue;
        }

        contacts.push(Contact::new(index, label, opts.default_surface_area)?);
    }

    debug!(count = contacts.len(), "parsed jacksheet");
    Ok(contacts)
}

fn is_non_neural(label: &str) -> bool {
    NON_NEURAL_PREFIXES
        .iter()
        .any(|prefix| label.starts_with(prefix))
}

/// Normalize a label with known naming inconsistencies corrected: separators
/// and whitespace dropped, the electrode name uppercased, and leading zeros
/// stripped from the contact number (`la01` -> `LA1`).
///
/// The micro marker is the one lowercase letter that survives: `uLA01`
/// stays `uLA1`, not `ULA1`, so that micro contacts remain distinguishable
/// from their macro counterparts.
pub fn standardize_label(label: &str) -> String {
    let cleaned: String = label
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .collect();

    let digit_count = cleaned
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .count();
    let (head, digits) = cleaned.split_at(cleaned.len() - digit_count);

    let mut out = String::with_capacity(cleaned.len());
    let mut head_chars = head.chars();
    if head.starts_with('u') {
        out.push('u');
        head_chars.next();
    }
    out.extend(head_chars.flat_map(char::to_uppercase));

    if !digits.is_empty() {
        let trimmed = digits.trim_start_matches('0');
        out.push_str(if trimmed.is_empty() { "0" } else { trimmed });
    }

    out
}
