/*!
# Pair-table export

Analysis pipelines consume the derived pairing as a flat table, separate
from the device configuration artifacts. Two formats are supported: CSV
(one row per channel) and JSON keyed by subject.
*/

use crate::channels::SenseChannel;
use crate::config::ElectrodeConfig;
use crate::errors::ConfigResult;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Write;

/// One derived sense-channel pairing, in export form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairRecord {
    /// 1-based channel number.
    pub channel: u32,
    /// Display label, e.g. `LA1-LA2`.
    pub pair: String,
    pub label1: String,
    pub label2: String,
    pub contact1: u16,
    pub contact2: u16,
}

/// Flatten a configuration's sense channels into pair records.
pub fn pair_records(config: &ElectrodeConfig) -> Vec<PairRecord> {
    config
        .sense_channels()
        .iter()
        .map(|channel| record(config, channel))
        .collect()
}

fn record(config: &ElectrodeConfig, channel: &SenseChannel) -> PairRecord {
    let label_of = |index: u16| {
        config
            .contact_by_index(index)
            .map(|c| c.label().to_string())
            .unwrap_or_default()
    };
    PairRecord {
        channel: channel.id,
        pair: channel.label.clone(),
        label1: label_of(channel.primary),
        label2: label_of(channel.reference),
        contact1: channel.primary,
        contact2: channel.reference,
    }
}

/// Write pair records as CSV with a header row.
pub fn write_pairs_csv<W: Write>(writer: W, records: &[PairRecord]) -> ConfigResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render pair records as the subject-keyed JSON document used by the
/// analysis side: `{subject: {"pairs": {"LA1-LA2": [1, 2], ...}}}`.
pub fn pairs_to_json(subject: &str, records: &[PairRecord]) -> serde_json::Value {
    let pairs: serde_json::Map<String, serde_json::Value> = records
        .iter()
        .map(|r| (r.pair.clone(), json!([r.contact1, r.contact2])))
        .collect();
    json!({ subject: { "pairs": pairs } })
}
