use thiserror::Error;

/// Errors raised while building schema descriptions.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Decimal and group separator are the same character.
    #[error("decimal separator '{separator}' must differ from the group separator")]
    SeparatorConflict { separator: char },

    /// Data type name is not recognized.
    #[error("unknown data type '{name}'")]
    UnknownDataType { name: String },

    /// Date pattern has no usable component.
    #[error("date format '{format}' contains no date or time component")]
    EmptyDateFormat { format: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
