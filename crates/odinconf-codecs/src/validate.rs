/*!
# Pre-encode validation

Both encoders reject configurations that violate the aggregate invariants
before emitting a single byte. Failures here indicate a pair-builder defect
(or a hand-edited tabular file), never bad jacksheet input, so each variant
is distinct and names the offending channel.
*/

use crate::errors::{CodecError, CodecResult};
use odinconf_config::ElectrodeConfig;
use odinconf_jacksheet::NON_NEURAL_PREFIXES;
use std::collections::HashSet;

/// Check every serialization-facing invariant: dense 1-based channel ids,
/// unique primary contacts, resolvable channel and stim contact indexes,
/// and no non-neural contact in any channel.
pub fn validate_config(config: &ElectrodeConfig) -> CodecResult<()> {
    let mut primaries: HashSet<u16> = HashSet::new();

    for (n, channel) in config.sense_channels().iter().enumerate() {
        let expected = n as u32 + 1;
        if channel.id != expected {
            return Err(CodecError::NonDenseChannelIds {
                expected,
                found: channel.id,
            });
        }

        if !primaries.insert(channel.primary) {
            return Err(CodecError::DuplicatePrimary {
                channel: channel.id,
                index: channel.primary,
            });
        }

        for index in [channel.primary, channel.reference] {
            let contact =
                config
                    .contact_by_index(index)
                    .ok_or(CodecError::UnknownReference {
                        channel: channel.id,
                        index,
                    })?;
            if NON_NEURAL_PREFIXES
                .iter()
                .any(|p| contact.label().starts_with(p))
            {
                return Err(CodecError::NonNeuralContact {
                    label: contact.label().to_string(),
                });
            }
        }
    }

    for stim in config.stim_channels() {
        for index in [stim.anode, stim.cathode] {
            if config.contact_by_index(index).is_none() {
                return Err(CodecError::UnknownStimContact {
                    name: stim.name.clone(),
                    index,
                });
            }
        }
    }

    Ok(())
}
