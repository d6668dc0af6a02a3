/*!
# odinconf-codecs

Serialized forms of an electrode configuration:

- **Tabular** ([`to_tabular`] / [`from_tabular`]) — the human-editable text
  form. Loading then re-saving a file reproduces it byte for byte.
- **Binary** ([`to_binary`]) — the device-consumable form, behind the
  pluggable [`BinaryLayout`] strategy.

Both encoders validate the aggregate invariants first ([`validate_config`])
and refuse to emit output for a configuration that violates them.
*/

pub mod binary;
pub mod errors;
pub mod layout;
pub mod tabular;
pub mod validate;

pub use binary::{to_binary, BinaryLayout, OdinBinaryLayout};
pub use errors::{CodecError, CodecResult};
pub use layout::bank_label;
pub use tabular::{from_tabular, to_tabular};
pub use validate::validate_config;
