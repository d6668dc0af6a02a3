use thiserror::Error;

pub type JacksheetResult<T> = Result<T, JacksheetError>;

#[derive(Error, Debug)]
pub enum JacksheetError {
    #[error("malformed jacksheet row at line {line}: {text:?} (expected `index label`)")]
    MalformedRow { line: usize, text: String },

    #[error("duplicate jackbox index {index} at line {line}")]
    DuplicateIndex { index: u16, line: usize },

    #[error("jackbox index {index} at line {line} is outside the hardware range 1..={max}")]
    IndexOutOfRange { index: u64, line: usize, max: u16 },

    #[error("cannot derive an electrode name from contact label {label:?}")]
    UnparsableLabel { label: String },

    #[error(
        "label {label:?} appears more than once on electrode {electrode}; \
         co-located micro/macro contacts must carry distinct labels"
    )]
    AmbiguousMicroMacro { electrode: String, label: String },
}
