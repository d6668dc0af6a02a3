use crate::errors::ConfigError;
use odinconf_jacksheet::Contact;
use std::fmt;
use std::str::FromStr;

/// Referencing scheme for sense-channel derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// Each contact referenced against a geometric neighbor on the same
    /// electrode.
    Bipolar,
    /// Each contact referenced against one common reference contact.
    Monopolar,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Bipolar => "bipolar",
            Scheme::Monopolar => "monopolar",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bipolar" => Ok(Scheme::Bipolar),
            "monopolar" => Ok(Scheme::Monopolar),
            other => Err(ConfigError::InvalidScheme {
                value: other.to_string(),
            }),
        }
    }
}

/// One recording channel: a primary (signal) contact referenced against a
/// second contact. Contacts are held by jackbox index; the owning
/// [`crate::ElectrodeConfig`] resolves them back to full records.
#[derive(Debug, Clone, PartialEq)]
pub struct SenseChannel {
    /// Dense 1-based id assigned in emission order at aggregate-build time.
    pub id: u32,
    /// Jackbox index of the signal contact.
    pub primary: u16,
    /// Jackbox index of the subtracted contact (or the common reference in
    /// monopolar mode).
    pub reference: u16,
    /// Display label: `primary-reference` for bipolar, the primary label for
    /// monopolar.
    pub label: String,
    /// Per-channel surface-area override; `None` falls back to the primary
    /// contact's area at serialization time.
    pub surface_area: Option<f64>,
    pub stim_enabled: bool,
}

impl SenseChannel {
    pub(crate) fn bipolar(primary: &Contact, reference: &Contact) -> Self {
        Self {
            id: 0, // assigned densely once the full list is known
            primary: primary.index(),
            reference: reference.index(),
            label: format!("{}-{}", primary.label(), reference.label()),
            surface_area: None,
            stim_enabled: false,
        }
    }

    pub(crate) fn monopolar(primary: &Contact, reference: &Contact) -> Self {
        Self {
            id: 0,
            primary: primary.index(),
            reference: reference.index(),
            label: primary.label().to_string(),
            surface_area: None,
            stim_enabled: false,
        }
    }
}

/// Stimulation waveform parameters for an operator-declared stim channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StimParams {
    pub amplitude_ma: f64,
    pub pulse_width_us: u32,
    pub frequency_hz: u32,
}

impl Default for StimParams {
    fn default() -> Self {
        // Placeholder values; the stim-authoring workflow fills these in
        // before the configuration is approved for stimulation.
        Self {
            amplitude_ma: 0.0,
            pulse_width_us: 0,
            frequency_hz: 0,
        }
    }
}

/// An operator-declared stimulation channel between two existing contacts.
/// Never derived automatically; attached to the aggregate after sense-channel
/// derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct StimChannel {
    pub name: String,
    /// Jackbox index of the anode contact.
    pub anode: u16,
    /// Jackbox index of the cathode contact.
    pub cathode: u16,
    pub params: StimParams,
}
