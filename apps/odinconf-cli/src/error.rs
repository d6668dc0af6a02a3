use thiserror::Error;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Jacksheet(#[from] odinconf_jacksheet::JacksheetError),

    #[error(transparent)]
    Config(#[from] odinconf_config::ConfigError),

    #[error(transparent)]
    Codec(#[from] odinconf_codecs::CodecError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
