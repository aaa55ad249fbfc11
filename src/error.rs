use thiserror::Error;

#[derive(Error, Debug)]
/// Batch error
pub enum BatchError {
    /// The field layout or mapping is inconsistent (negative size, duplicated name, ...).
    #[error("Configuration: {0}")]
    Configuration(String),

    /// A line does not have the structure the field table expects.
    #[error("Structure: {0}")]
    Structure(String),

    /// A field value could not be converted to or from text.
    #[error("Conversion of field '{field}': {message}")]
    Conversion { field: String, message: String },

    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("ItemWriter from: {0}")]
    ItemWriter(String),

    #[error("ItemReader from: {0}")]
    ItemReader(String),

    #[error("ItemProcessor from: {0}")]
    ItemProcessor(String),

    #[error("Step {0} failed")]
    Step(String),
}

impl BatchError {
    /// Attaches a field name to a conversion failure.
    pub fn conversion(field: impl Into<String>, message: impl Into<String>) -> Self {
        BatchError::Conversion {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Failure of a single value conversion, before it is attached to a field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ConversionError(pub String);

impl ConversionError {
    pub fn new(message: impl Into<String>) -> Self {
        ConversionError(message.into())
    }
}
