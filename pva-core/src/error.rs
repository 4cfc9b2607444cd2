use thiserror::Error;

/// Main error type for pvAccess client data operations
#[derive(Error, Debug)]
pub enum PvaError {
    #[error("not initialized: {0}")]
    NotInitialized(String),

    #[error("no value field: {0}")]
    NoValueField(String),

    #[error("wrong field kind: {0}")]
    WrongFieldKind(String),

    #[error("ambiguous field: {0}")]
    AmbiguousField(String),

    #[error("no scalar field: {0}")]
    NoScalarField(String),

    #[error("not numeric: {0}")]
    NotNumeric(String),

    #[error("not a numeric array: {0}")]
    NotNumericArray(String),

    #[error("no alarm field: {0}")]
    NoAlarmField(String),

    #[error("no timeStamp field: {0}")]
    NoTimeStampField(String),

    #[error("missing field separator: {0}")]
    MissingFieldSeparator(String),

    #[error("variant union not supported: {0}")]
    VariantUnionUnsupported(String),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("text parsing support not built: {0}")]
    UnsupportedWithoutTextParsing(String),

    #[error("unknown field name: {0}")]
    UnknownFieldName(String),
}

impl PvaError {
    /// Rewrite the carried message, keeping the error kind.
    ///
    /// Used by the client layer to prepend its per-record message prefix
    /// to errors raised below it.
    pub fn map_message<F>(self, f: F) -> Self
    where
        F: FnOnce(String) -> String,
    {
        match self {
            PvaError::NotInitialized(m) => PvaError::NotInitialized(f(m)),
            PvaError::NoValueField(m) => PvaError::NoValueField(f(m)),
            PvaError::WrongFieldKind(m) => PvaError::WrongFieldKind(f(m)),
            PvaError::AmbiguousField(m) => PvaError::AmbiguousField(f(m)),
            PvaError::NoScalarField(m) => PvaError::NoScalarField(f(m)),
            PvaError::NotNumeric(m) => PvaError::NotNumeric(f(m)),
            PvaError::NotNumericArray(m) => PvaError::NotNumericArray(f(m)),
            PvaError::NoAlarmField(m) => PvaError::NoAlarmField(f(m)),
            PvaError::NoTimeStampField(m) => PvaError::NoTimeStampField(f(m)),
            PvaError::MissingFieldSeparator(m) => PvaError::MissingFieldSeparator(f(m)),
            PvaError::VariantUnionUnsupported(m) => PvaError::VariantUnionUnsupported(f(m)),
            PvaError::ParseError(m) => PvaError::ParseError(f(m)),
            PvaError::UnsupportedWithoutTextParsing(m) => {
                PvaError::UnsupportedWithoutTextParsing(f(m))
            }
            PvaError::UnknownFieldName(m) => PvaError::UnknownFieldName(f(m)),
        }
    }
}

/// Result type alias for pvAccess client data operations
pub type PvaResult<T> = Result<T, PvaError>;
