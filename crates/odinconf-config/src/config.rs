/*!
# Electrode configuration aggregate

[`ElectrodeConfig`] is the aggregate root the serializers consume: the
insertion-ordered contact registry, the ordered sense-channel list, any
operator-declared stim channels, and the configuration metadata.

The aggregate is built once from a jacksheet snapshot plus a scheme
selection. Sense channels are immutable afterwards; stim channels are
append-only; surface areas may be edited in place and re-serialize lazily.
*/

use crate::channels::{Scheme, SenseChannel, StimChannel, StimParams};
use crate::errors::{ConfigError, ConfigResult};
use crate::pairs::{build_bipolar, build_monopolar, PairingOptions};
use indexmap::IndexMap;
use odinconf_jacksheet::{group_contacts, Contact};
use std::collections::HashSet;
use tracing::info;

/// Configuration format version, carried through both serialized forms.
pub const CONFIG_VERSION: &str = "1.2";

/// Recognized options for building an aggregate from a jacksheet snapshot.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub subject: String,
    pub localization: u32,
    pub montage: u32,
    pub config_name: String,
    /// Allow-list of contact labels considered electrically valid.
    pub good_leads: Option<HashSet<String>>,
    pub pairing: PairingOptions,
    /// Label of the common reference contact; required for monopolar.
    pub monopolar_reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElectrodeConfig {
    pub version: String,
    pub subject_id: String,
    pub localization: u32,
    pub montage: u32,
    pub config_name: String,
    pub scheme: Scheme,
    /// Label -> contact, in jacksheet first-appearance order. Never
    /// re-sorted: downstream hardware ordering is significant.
    contacts: IndexMap<String, Contact>,
    sense_channels: Vec<SenseChannel>,
    stim_channels: Vec<StimChannel>,
}

impl ElectrodeConfig {
    /// Build an aggregate from parsed contacts: group, derive sense
    /// channels under `scheme`, capture metadata.
    pub fn from_jacksheet(
        contacts: Vec<Contact>,
        scheme: Scheme,
        opts: &BuildOptions,
    ) -> ConfigResult<Self> {
        let mut contacts = contacts;
        if let Some(good) = &opts.good_leads {
            for contact in &mut contacts {
                contact.is_good = good.contains(contact.label());
            }
        }

        let groups = group_contacts(contacts.clone(), None)?;

        let sense_channels = match scheme {
            Scheme::Bipolar => build_bipolar(&groups, &opts.pairing)?,
            Scheme::Monopolar => {
                let label = opts
                    .monopolar_reference
                    .as_deref()
                    .ok_or(ConfigError::MissingReference)?;
                let reference = contacts
                    .iter()
                    .find(|c| c.label() == label)
                    .cloned()
                    .ok_or_else(|| ConfigError::UndefinedReference {
                        label: label.to_string(),
                    })?;
                build_monopolar(&groups, &reference)
            }
        };

        info!(
            subject = opts.subject,
            scheme = %scheme,
            contacts = contacts.len(),
            channels = sense_channels.len(),
            "built electrode configuration"
        );

        let contacts = contacts
            .into_iter()
            .map(|c| (c.label().to_string(), c))
            .collect();

        Ok(Self {
            version: CONFIG_VERSION.to_string(),
            subject_id: opts.subject.clone(),
            localization: opts.localization,
            montage: opts.montage,
            config_name: opts.config_name.clone(),
            scheme,
            contacts,
            sense_channels,
            stim_channels: Vec::new(),
        })
    }

    /// Reassemble an aggregate from already-validated parts. Used by the
    /// codecs when loading a serialized configuration.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        version: String,
        subject_id: String,
        localization: u32,
        montage: u32,
        config_name: String,
        scheme: Scheme,
        contacts: Vec<Contact>,
        sense_channels: Vec<SenseChannel>,
        stim_channels: Vec<StimChannel>,
    ) -> Self {
        Self {
            version,
            subject_id,
            localization,
            montage,
            config_name,
            scheme,
            contacts: contacts
                .into_iter()
                .map(|c| (c.label().to_string(), c))
                .collect(),
            sense_channels,
            stim_channels,
        }
    }

    pub fn num_contacts(&self) -> usize {
        self.contacts.len()
    }

    pub fn num_sense_channels(&self) -> usize {
        self.sense_channels.len()
    }

    pub fn num_stim_channels(&self) -> usize {
        self.stim_channels.len()
    }

    /// Contacts in registry (jacksheet first-appearance) order.
    pub fn contacts(&self) -> impl Iterator<Item = &Contact> {
        self.contacts.values()
    }

    pub fn contact(&self, label: &str) -> Option<&Contact> {
        self.contacts.get(label)
    }

    pub fn contact_by_index(&self, index: u16) -> Option<&Contact> {
        self.contacts.values().find(|c| c.index() == index)
    }

    pub fn sense_channels(&self) -> &[SenseChannel] {
        &self.sense_channels
    }

    pub fn stim_channels(&self) -> &[StimChannel] {
        &self.stim_channels
    }

    /// Effective surface area for a sense channel: the channel override if
    /// set, otherwise the primary contact's current area. `None` when the
    /// primary index does not resolve (an invariant violation the codecs
    /// report).
    pub fn channel_surface_area(&self, channel: &SenseChannel) -> Option<f64> {
        match channel.surface_area {
            Some(area) => Some(area),
            None => self.contact_by_index(channel.primary).map(|c| c.surface_area),
        }
    }

    /// Declare a stimulation channel between two existing contacts. Appends
    /// only; sense channels are never touched. The contacts need not appear
    /// in any sense channel.
    pub fn add_stim_channel(
        &mut self,
        anode_label: &str,
        cathode_label: &str,
        params: StimParams,
    ) -> ConfigResult<()> {
        let anode = self
            .contact(anode_label)
            .ok_or_else(|| ConfigError::UnknownContact {
                label: anode_label.to_string(),
            })?
            .index();
        let cathode = self
            .contact(cathode_label)
            .ok_or_else(|| ConfigError::UnknownContact {
                label: cathode_label.to_string(),
            })?
            .index();

        self.stim_channels.push(StimChannel {
            name: format!("{anode_label}-{cathode_label}"),
            anode,
            cathode,
            params,
        });
        Ok(())
    }

    /// Set the surface area of one contact (exact label match) or of every
    /// contact on an electrode (electrode-name match). Sense channels
    /// without an explicit override pick the new value up at serialization
    /// time.
    pub fn set_surface_area(&mut self, label_or_electrode: &str, area: f64) -> ConfigResult<()> {
        if let Some(contact) = self.contacts.get_mut(label_or_electrode) {
            contact.surface_area = area;
            return Ok(());
        }

        let mut matched = false;
        for contact in self.contacts.values_mut() {
            if contact.electrode() == label_or_electrode {
                contact.surface_area = area;
                matched = true;
            }
        }
        if matched {
            Ok(())
        } else {
            Err(ConfigError::UnknownContact {
                label: label_or_electrode.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odinconf_jacksheet::{parse_jacksheet, JacksheetOptions};

    fn contacts(raw: &str) -> Vec<Contact> {
        parse_jacksheet(raw, &JacksheetOptions::default()).unwrap()
    }

    fn bipolar(raw: &str) -> ElectrodeConfig {
        let opts = BuildOptions {
            subject: "R1308T".into(),
            config_name: "TESTL0M0NOSTIM".into(),
            ..Default::default()
        };
        ElectrodeConfig::from_jacksheet(contacts(raw), Scheme::Bipolar, &opts).unwrap()
    }

    #[test]
    fn builds_bipolar_from_jacksheet() {
        let config = bipolar("1 LA1\n2 LA2\n3 LA9\n4 ECG1\n");
        assert_eq!(config.num_contacts(), 3);
        assert_eq!(config.num_sense_channels(), 2);
        assert_eq!(config.num_stim_channels(), 0);
        assert_eq!(config.sense_channels()[0].label, "LA1-LA2");
        assert_eq!(config.sense_channels()[1].label, "LA2-LA9");
    }

    #[test]
    fn monopolar_requires_a_known_reference() {
        let opts = BuildOptions {
            monopolar_reference: Some("LAref".into()),
            ..Default::default()
        };
        let err = ElectrodeConfig::from_jacksheet(contacts("1 LA1\n2 LA2\n"), Scheme::Monopolar, &opts)
            .unwrap_err();
        assert!(matches!(err, ConfigError::UndefinedReference { .. }));

        let config = ElectrodeConfig::from_jacksheet(
            contacts("1 LA1\n2 LA2\n3 LAref\n"),
            Scheme::Monopolar,
            &opts,
        )
        .unwrap();
        assert_eq!(config.num_sense_channels(), 2);
        let reference = config.contact("LAref").unwrap().index();
        assert!(config
            .sense_channels()
            .iter()
            .all(|c| c.reference == reference));
    }

    #[test]
    fn missing_monopolar_reference_is_an_error() {
        let err = ElectrodeConfig::from_jacksheet(
            contacts("1 LA1\n2 LA2\n"),
            Scheme::Monopolar,
            &BuildOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingReference));
    }

    #[test]
    fn contact_registry_keeps_jacksheet_order() {
        let config = bipolar("1 LB1\n2 LA1\n3 LB2\n4 LA2\n");
        let order: Vec<_> = config.contacts().map(|c| c.label()).collect();
        assert_eq!(order, ["LB1", "LA1", "LB2", "LA2"]);
    }

    #[test]
    fn good_leads_exclusions_remain_addressable() {
        let opts = BuildOptions {
            good_leads: Some(["LA1", "LA2"].iter().map(|s| s.to_string()).collect()),
            ..Default::default()
        };
        let config =
            ElectrodeConfig::from_jacksheet(contacts("1 LA1\n2 LA2\n3 LA3\n"), Scheme::Bipolar, &opts)
                .unwrap();
        assert_eq!(config.num_sense_channels(), 1);
        // LA3 is excluded from derivation but still listed.
        let la3 = config.contact("LA3").unwrap();
        assert!(!la3.is_good);
    }

    #[test]
    fn add_stim_channel_validates_labels() {
        let mut config = bipolar("1 LA1\n2 LA2\n3 LA3\n");
        config
            .add_stim_channel("LA1", "LA2", StimParams::default())
            .unwrap();
        assert_eq!(config.num_stim_channels(), 1);
        assert_eq!(config.stim_channels()[0].name, "LA1-LA2");
        assert_eq!(config.stim_channels()[0].anode, 1);
        assert_eq!(config.stim_channels()[0].cathode, 2);

        let err = config
            .add_stim_channel("LA1", "LZ9", StimParams::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownContact { .. }));
        // Sense channels untouched by stim declarations.
        assert_eq!(config.num_sense_channels(), 2);
    }

    #[test]
    fn surface_area_edits_by_contact_and_electrode() {
        let mut config = bipolar("1 LA1\n2 LA2\n3 LB1\n4 LB2\n");

        config.set_surface_area("LA1", 2.5).unwrap();
        assert_eq!(config.contact("LA1").unwrap().surface_area, 2.5);
        assert_eq!(config.contact("LA2").unwrap().surface_area, 0.001);

        config.set_surface_area("LB", 1.25).unwrap();
        assert_eq!(config.contact("LB1").unwrap().surface_area, 1.25);
        assert_eq!(config.contact("LB2").unwrap().surface_area, 1.25);

        assert!(config.set_surface_area("LZ", 1.0).is_err());
    }

    #[test]
    fn channel_area_falls_back_to_primary_contact() {
        let mut config = bipolar("1 LA1\n2 LA2\n");
        let channel = config.sense_channels()[0].clone();
        assert_eq!(config.channel_surface_area(&channel), Some(0.001));

        // Contact edit is picked up lazily.
        config.set_surface_area("LA1", 9.0).unwrap();
        assert_eq!(config.channel_surface_area(&channel), Some(9.0));

        // A channel-level override wins.
        let mut overridden = channel;
        overridden.surface_area = Some(0.5);
        assert_eq!(config.channel_surface_area(&overridden), Some(0.5));
    }
}
