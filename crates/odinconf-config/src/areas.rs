/*!
# Surface-area tables

A surface-area file maps electrode labels to contact surface areas in mm^2:

```text
LA 1
uLA 0.01
```

Labels name electrodes, not individual contacts, so `LA` covers `LA1`,
`LA2`, … while `uLA` covers only the co-located micros (which is why
micro contacts must carry their own labeling prefix in the jacksheet).
Exact contact labels are also accepted and take precedence.
*/

use crate::config::ElectrodeConfig;
use crate::errors::{ConfigError, ConfigResult};
use indexmap::IndexMap;
use tracing::warn;

/// Parse a surface-area table: `label <whitespace> area` rows.
pub fn parse_area_table(raw: &str) -> ConfigResult<IndexMap<String, f64>> {
    let mut table = IndexMap::new();

    for (lineno, line) in raw.lines().enumerate() {
        let lineno = lineno + 1;
        if line.trim().is_empty() {
            continue;
        }

        let mut fields = line.split_whitespace();
        let entry = match (fields.next(), fields.next(), fields.next()) {
            (Some(label), Some(area), None) => area.parse::<f64>().ok().map(|a| (label, a)),
            _ => None,
        };
        let (label, area) = entry.ok_or_else(|| ConfigError::InvalidAreaTable {
            line: lineno,
            text: line.to_string(),
        })?;
        table.insert(label.to_string(), area);
    }

    Ok(table)
}

/// Apply a parsed area table to a configuration, entry by entry. Entries
/// that match nothing are logged and skipped rather than failing the whole
/// table; area files are routinely shared across montages.
pub fn apply_area_table(config: &mut ElectrodeConfig, table: &IndexMap<String, f64>) {
    for (label, area) in table {
        if config.set_surface_area(label, *area).is_err() {
            warn!(label, "surface-area entry matches no contact or electrode");
        }
    }
}
