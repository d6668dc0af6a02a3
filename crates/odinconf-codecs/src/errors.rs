use odinconf_config::ConfigError;
use odinconf_jacksheet::JacksheetError;
use thiserror::Error;

pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("tabular format error at line {line}: {reason}")]
    TabularFormat { line: usize, reason: String },

    #[error("channel {channel} reuses contact index {index} as a primary (pair-builder defect)")]
    DuplicatePrimary { channel: u32, index: u16 },

    #[error("channel ids are not dense: expected {expected}, found {found}")]
    NonDenseChannelIds { expected: u32, found: u32 },

    #[error("channel {channel} references contact index {index}, which is not in the registry")]
    UnknownReference { channel: u32, index: u16 },

    #[error("stim channel {name:?} references contact index {index}, which is not in the registry")]
    UnknownStimContact { name: String, index: u16 },

    #[error("non-neural contact {label:?} appears in a channel definition")]
    NonNeuralContact { label: String },

    #[error(transparent)]
    Jacksheet(#[from] JacksheetError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
