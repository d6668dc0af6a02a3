/*!
# Pair builder

Turns electrode groups into an ordered sense-channel list under a bipolar or
monopolar referencing scheme.

Bipolar derivation works over **physically adjacent** contacts: candidates
are formed from neighbors in jackbox order on the same electrode, and a
candidate is discarded when either member failed the good-leads screen. A
contact with no surviving neighbor is dropped; no single-ended channel is
ever emitted.

The ENS validator silently accepts configurations in which the same contact
is the primary of two sense channels, which corrupts recordings downstream.
The builder therefore threads one accumulator of used primary indexes
through the whole build, in emission order, and flips any colliding
candidate so its primary and reference swap. Collisions only arise from
distal candidates (MUX-bank workarounds, below); plain adjacent chains are
collision-free by construction.

With [`PairingOptions::mux_channels`] set, pairing additionally respects the
ENS multiplexer constraint that a pair may not straddle a MUX bank: a
mid-electrode bank boundary closes the running segment with a distal pair
back to the electrode's first contact, and the electrode's last contact is
paired back to the anchor contact of its segment.
*/

use crate::channels::SenseChannel;
use crate::errors::{ConfigError, ConfigResult};
use odinconf_jacksheet::{Contact, ElectrodeGroups};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Recognized options for bipolar pair derivation.
#[derive(Debug, Clone, Default)]
pub struct PairingOptions {
    /// Channels per MUX bank (32 on the Odin ENS). `None` disables the
    /// bank-boundary and wrap-around candidates entirely.
    pub mux_channels: Option<u16>,
    /// Fail with [`ConfigError::InsufficientContacts`] when an electrode
    /// yields no channel at all. Off by default: such electrodes simply
    /// contribute nothing.
    pub require_channels_per_electrode: bool,
}

/// Derive bipolar sense channels from electrode groups.
///
/// Channel ids are assigned densely from 1 in emission order: electrode
/// group order first, pair order within a group second.
pub fn build_bipolar(
    groups: &ElectrodeGroups,
    opts: &PairingOptions,
) -> ConfigResult<Vec<SenseChannel>> {
    let mut channels: Vec<SenseChannel> = Vec::new();
    let mut used_primaries: HashSet<u16> = HashSet::new();
    let mut emitted: HashSet<(u16, u16)> = HashSet::new();
    // Global contact position, for MUX bank accounting across electrodes.
    let mut slot: usize = 0;

    for (electrode, group) in groups {
        let emitted_before = channels.len();
        // Anchor of the current MUX segment within this electrode.
        let mut anchor = 0usize;

        for i in 0..group.len() {
            slot += 1;
            let is_last = i == group.len() - 1;

            let crosses_bank = opts
                .mux_channels
                .is_some_and(|m| m > 0 && slot % usize::from(m) == 0 && i != 0);
            if crosses_bank {
                // An adjacent pair from here would straddle a MUX bank.
                // Close the segment back to the electrode's first contact.
                try_emit(
                    &mut channels,
                    &mut used_primaries,
                    &mut emitted,
                    &group[0],
                    &group[i],
                );
                anchor = i + 1;
                continue;
            }

            if is_last {
                if opts.mux_channels.is_some() && anchor < i {
                    // Wrap the electrode's last contact back to its segment
                    // anchor so it is not left single-ended.
                    try_emit(
                        &mut channels,
                        &mut used_primaries,
                        &mut emitted,
                        &group[anchor],
                        &group[i],
                    );
                }
            } else {
                try_emit(
                    &mut channels,
                    &mut used_primaries,
                    &mut emitted,
                    &group[i],
                    &group[i + 1],
                );
            }
        }

        if channels.len() == emitted_before {
            let good = group.iter().filter(|c| c.is_good).count();
            if opts.require_channels_per_electrode {
                return Err(ConfigError::InsufficientContacts {
                    electrode: electrode.clone(),
                    found: good,
                });
            }
            debug!(electrode, good, "electrode yields no sense channels");
        }
    }

    assign_ids(&mut channels);
    Ok(channels)
}

/// Derive monopolar sense channels: every good contact against the common
/// reference contact. Primary uniqueness holds trivially.
pub fn build_monopolar(groups: &ElectrodeGroups, reference: &Contact) -> Vec<SenseChannel> {
    let mut channels: Vec<SenseChannel> = Vec::new();

    for group in groups.values() {
        for contact in group {
            if !contact.is_good || contact.index() == reference.index() {
                continue;
            }
            channels.push(SenseChannel::monopolar(contact, reference));
        }
    }

    assign_ids(&mut channels);
    channels
}

fn assign_ids(channels: &mut [SenseChannel]) {
    for (n, channel) in channels.iter_mut().enumerate() {
        channel.id = n as u32 + 1;
    }
}

/// Emit one candidate pair, applying the good-leads screen, candidate
/// dedup, and the distal-pair flip rule.
fn try_emit(
    channels: &mut Vec<SenseChannel>,
    used_primaries: &mut HashSet<u16>,
    emitted: &mut HashSet<(u16, u16)>,
    a: &Contact,
    b: &Contact,
) {
    if !a.is_good || !b.is_good || a.index() == b.index() {
        return;
    }

    let key = (a.index().min(b.index()), a.index().max(b.index()));
    if !emitted.insert(key) {
        return;
    }

    let (primary, reference) = if used_primaries.contains(&a.index()) {
        if used_primaries.contains(&b.index()) {
            // Neither orientation keeps primaries unique; this candidate
            // cannot be represented on the hardware.
            warn!(
                pair = format!("{}-{}", a.label(), b.label()),
                "skipping candidate pair: both contacts already used as primaries"
            );
            return;
        }
        (b, a)
    } else {
        (a, b)
    };

    used_primaries.insert(primary.index());
    channels.push(SenseChannel::bipolar(primary, reference));
}
