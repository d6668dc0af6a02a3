use odinconf_jacksheet::JacksheetError;
use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Jacksheet(#[from] JacksheetError),

    #[error("electrode {electrode} has {found} good contact(s); bipolar pairing needs at least 2")]
    InsufficientContacts { electrode: String, found: usize },

    #[error("monopolar reference contact {label:?} is not in the jacksheet")]
    UndefinedReference { label: String },

    #[error("no contact or electrode named {label:?} in this configuration")]
    UnknownContact { label: String },

    #[error("unrecognized referencing scheme {value:?} (expected `bipolar` or `monopolar`)")]
    InvalidScheme { value: String },

    #[error("monopolar derivation requires a reference contact")]
    MissingReference,

    #[error("malformed surface-area row at line {line}: {text:?} (expected `label area`)")]
    InvalidAreaTable { line: usize, text: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
