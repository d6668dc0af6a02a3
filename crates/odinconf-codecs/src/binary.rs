/*!
# Binary configuration codec

The device-consumable form. The byte layout is an external, versioned
contract: no canonical specification exists, so the shipped
[`OdinBinaryLayout`] was reverse-engineered from reference configuration
files and is validated byte for byte in the tests. Alternative device
revisions plug in through the [`BinaryLayout`] trait.

Layout v1.2: fields joined by `~`, records joined by `|`, contact and
channel indexes as little-endian `i16`, surface areas as little-endian
`f32`, and a literal `EOF` marker followed by exactly one newline. The
newline is part of the contract; the device rejects files without it.
*/

use crate::errors::{CodecError, CodecResult};
use crate::layout::contact_description;
use crate::tabular::common_reference;
use crate::validate::validate_config;
use byteorder::{LittleEndian, WriteBytesExt};
use odinconf_config::ElectrodeConfig;
use tracing::debug;

const FIELD_SEPARATOR: u8 = b'~';
const RECORD_SEPARATOR: u8 = b'|';

/// A device-specific byte encoding of an [`ElectrodeConfig`].
pub trait BinaryLayout {
    /// Configuration format revision this layout targets.
    fn version(&self) -> &str;

    /// Encode the full configuration, including the terminator sequence.
    fn encode(&self, config: &ElectrodeConfig) -> CodecResult<Vec<u8>>;
}

/// Encode with the default (Odin ENS v1.2) layout.
pub fn to_binary(config: &ElectrodeConfig) -> CodecResult<Vec<u8>> {
    OdinBinaryLayout.encode(config)
}

/// The Odin ENS v1.2 byte layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct OdinBinaryLayout;

impl BinaryLayout for OdinBinaryLayout {
    fn version(&self) -> &str {
        "1.2"
    }

    fn encode(&self, config: &ElectrodeConfig) -> CodecResult<Vec<u8>> {
        validate_config(config)?;

        let mut records: Vec<Vec<u8>> = Vec::new();

        records.push(text_record(&["ODINConfigurationVersion:", &format!("#{}#", config.version)]));
        records.push(text_record(&["ConfigurationName:", &config.config_name]));
        records.push(text_record(&["SubjectID:", &config.subject_id]));

        records.push(b"Contacts:".to_vec());
        for contact in config.contacts() {
            let mut record = Record::new();
            record.text(contact.label());
            record.index(contact.index())?;
            record.index(contact.index())?;
            record.area(contact.surface_area)?;
            record.text(&contact_description(contact.index()));
            records.push(record.finish());
        }

        records.push(b"SenseChannelSubclasses:".to_vec());
        records.push(b"SenseChannels:".to_vec());
        for channel in config.sense_channels() {
            let primary = config.contact_by_index(channel.primary).ok_or(
                CodecError::UnknownReference {
                    channel: channel.id,
                    index: channel.primary,
                },
            )?;

            let mut record = Record::new();
            record.text(primary.label());
            record.text(&channel.label.replace('-', ""));
            record.index(channel.primary)?;
            record.index(channel.reference)?;
            record.text(if channel.stim_enabled { "s" } else { "x" });
            record.text(&format!("#{}#", channel.label));
            records.push(record.finish());
        }

        records.push(b"StimulationChannelSubclasses:".to_vec());
        records.push(b"StimulationChannels:".to_vec());
        for stim in config.stim_channels() {
            records.push(text_record(&["StimChannel:", &stim.name, "x", "# #"]));

            let mut anodes = Record::new();
            anodes.text("Anodes:");
            anodes.index(stim.anode)?;
            anodes.text("#");
            records.push(anodes.finish());

            let mut cathodes = Record::new();
            cathodes.text("Cathodes:");
            cathodes.index(stim.cathode)?;
            cathodes.text("#");
            records.push(cathodes.finish());
        }

        let mut reference = Record::new();
        reference.text("REF:");
        reference.index(common_reference(config))?;
        reference.text("Common");
        records.push(reference.finish());

        records.push(b"EOF".to_vec());

        let mut out = records.join(&RECORD_SEPARATOR);
        out.push(b'\n');
        debug!(
            records = records.len(),
            bytes = out.len(),
            "encoded binary configuration"
        );
        Ok(out)
    }
}

/// One `~`-delimited record under construction.
struct Record {
    bytes: Vec<u8>,
    fields: usize,
}

impl Record {
    fn new() -> Self {
        Self {
            bytes: Vec::new(),
            fields: 0,
        }
    }

    fn separate(&mut self) {
        if self.fields > 0 {
            self.bytes.push(FIELD_SEPARATOR);
        }
        self.fields += 1;
    }

    fn text(&mut self, field: &str) {
        self.separate();
        self.bytes.extend_from_slice(field.as_bytes());
    }

    fn index(&mut self, index: u16) -> CodecResult<()> {
        self.separate();
        self.bytes.write_i16::<LittleEndian>(index as i16)?;
        Ok(())
    }

    fn area(&mut self, area: f64) -> CodecResult<()> {
        self.separate();
        self.bytes.write_f32::<LittleEndian>(area as f32)?;
        Ok(())
    }

    fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

fn text_record(fields: &[&str]) -> Vec<u8> {
    let mut record = Record::new();
    for field in fields {
        record.text(field);
    }
    record.finish()
}
