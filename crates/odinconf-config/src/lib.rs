/*!
# Electrode configuration core

This crate derives sense channels from grouped jacksheet contacts and owns
[`ElectrodeConfig`], the aggregate the serializers in `odinconf-codecs`
consume.

## Workflow

```text
parse_jacksheet -> ElectrodeConfig::from_jacksheet(contacts, scheme, opts)
                   (grouping + pair derivation happen inside)
                -> add_stim_channel / set_surface_area as needed
                -> hand to the codecs
```

Sense-channel derivation is the two-phase workflow's automatic half; stim
channels are authored afterwards, externally, through
[`ElectrodeConfig::add_stim_channel`].
*/

pub mod areas;
pub mod channels;
pub mod config;
pub mod errors;
pub mod export;
pub mod name;
pub mod pairs;

pub use areas::{apply_area_table, parse_area_table};
pub use channels::{Scheme, SenseChannel, StimChannel, StimParams};
pub use config::{BuildOptions, ElectrodeConfig, CONFIG_VERSION};
pub use errors::{ConfigError, ConfigResult};
pub use export::{pair_records, pairs_to_json, write_pairs_csv, PairRecord};
pub use name::{make_config_name, make_config_name_today};
pub use pairs::{build_bipolar, build_monopolar, PairingOptions};
