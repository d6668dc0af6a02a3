/*!
# Jacksheet Model

This crate owns the ambiguous-raw-input end of the electrode configuration
pipeline: parsing a jacksheet (the flat `index label` listing of jackbox
slots) into structured [`Contact`] records, and grouping those contacts into
insertion-ordered electrodes.

## Pipeline position

```text
jacksheet text -> parse_jacksheet -> group_contacts -> (pair builder, downstream)
```

Everything downstream of [`group_contacts`] works with clean, validated
contacts; all the messy-input concerns (inconsistent labels, non-neural
channels, duplicate slots) terminate here.

## Ordering

Electrode order is **first appearance in the jacksheet**, never lexical, and
contact order within an electrode is ascending jackbox index. Downstream
hardware configuration ordering is significant, so the grouping container is
an [`indexmap::IndexMap`] rather than a hash map.
*/

pub mod contact;
pub mod errors;
pub mod grouping;
pub mod parse;

pub use contact::{electrode_prefix, Contact, MAX_JACKBOX};
pub use errors::{JacksheetError, JacksheetResult};
pub use grouping::{group_contacts, parse_good_leads, ElectrodeGroups};
pub use parse::{parse_jacksheet, standardize_label, JacksheetOptions, NON_NEURAL_PREFIXES};
