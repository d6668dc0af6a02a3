use crate::errors::{JacksheetError, JacksheetResult};
use regex::Regex;
use std::sync::OnceLock;

/// Highest jackbox slot the ENS exposes (four banks of 64 channels).
pub const MAX_JACKBOX: u16 = 256;

/// Micro contacts are distinguished from their co-located macro counterparts
/// by a leading `u` on the electrode name (`uLA1` vs `LA1`).
const MICRO_MARKER: char = 'u';

fn electrode_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Leading alphabetic run with an optional numeric prefix: LA3 -> LA,
    // 2LD5 -> 2LD. Mirrors the convention used by jacksheet authors.
    PATTERN.get_or_init(|| Regex::new(r"^\d*[A-Za-z]+").expect("electrode pattern is valid"))
}

/// Extract the electrode name from a contact label by stripping the trailing
/// contact number.
///
/// ```
/// use odinconf_jacksheet::electrode_prefix;
///
/// assert_eq!(electrode_prefix("LA3").unwrap(), "LA");
/// assert_eq!(electrode_prefix("2LD5").unwrap(), "2LD");
/// assert!(electrode_prefix("123").is_err());
/// ```
pub fn electrode_prefix(label: &str) -> JacksheetResult<&str> {
    match electrode_pattern().find(label) {
        Some(m) => Ok(m.as_str()),
        None => Err(JacksheetError::UnparsableLabel {
            label: label.to_string(),
        }),
    }
}

/// One physical recording site on an electrode.
///
/// The jackbox `index` is the source of truth for ordering and pairing
/// arithmetic. The `electrode` name is derived from the label and recomputed
/// whenever the label changes; it is never stored independently of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    index: u16,
    label: String,
    electrode: String,
    is_micro: bool,
    /// Contact surface area in mm^2.
    pub surface_area: f64,
    /// Excluded contacts stay visible in listings but never reach channel
    /// derivation.
    pub is_good: bool,
}

impl Contact {
    pub fn new(index: u16, label: impl Into<String>, surface_area: f64) -> JacksheetResult<Self> {
        let label = label.into();
        let electrode = electrode_prefix(&label)?.to_string();
        let is_micro = electrode.starts_with(MICRO_MARKER);
        Ok(Self {
            index,
            label,
            electrode,
            is_micro,
            surface_area,
            is_good: true,
        })
    }

    /// Jackbox slot number, 1-based.
    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Electrode name: the label with its trailing contact number stripped.
    pub fn electrode(&self) -> &str {
        &self.electrode
    }

    /// Whether this contact follows the micro-contact naming convention.
    pub fn is_micro(&self) -> bool {
        self.is_micro
    }

    /// Replace the label, rederiving the electrode name and micro flag.
    pub fn set_label(&mut self, label: impl Into<String>) -> JacksheetResult<()> {
        let label = label.into();
        let electrode = electrode_prefix(&label)?.to_string();
        self.is_micro = electrode.starts_with(MICRO_MARKER);
        self.electrode = electrode;
        self.label = label;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_electrode_from_label() {
        let c = Contact::new(1, "LA3", 0.5).unwrap();
        assert_eq!(c.electrode(), "LA");
        assert!(!c.is_micro());
    }

    #[test]
    fn numeric_label_prefix_is_part_of_the_electrode() {
        let c = Contact::new(7, "2LD5", 0.5).unwrap();
        assert_eq!(c.electrode(), "2LD");
    }

    #[test]
    fn micro_marker_is_detected() {
        let c = Contact::new(2, "uLA1", 0.01).unwrap();
        assert!(c.is_micro());
        assert_eq!(c.electrode(), "uLA");
    }

    #[test]
    fn all_digit_label_is_rejected() {
        assert!(matches!(
            Contact::new(1, "1234", 0.5),
            Err(JacksheetError::UnparsableLabel { .. })
        ));
    }

    #[test]
    fn set_label_rederives_electrode() {
        let mut c = Contact::new(1, "LA1", 0.5).unwrap();
        c.set_label("uROF3").unwrap();
        assert_eq!(c.electrode(), "uROF");
        assert!(c.is_micro());

        // A bad label leaves the contact untouched
        assert!(c.set_label("99").is_err());
        assert_eq!(c.label(), "uROF3");
    }
}
