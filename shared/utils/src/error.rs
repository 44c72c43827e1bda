use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum BomError {
    #[error("Host environment unavailable: {message}")]
    HostUnavailable { message: String },

    #[error("Selection error: {message}")]
    Selection { message: String },

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Export error: {message}")]
    Export { message: String },
}

impl BomError {
    pub fn host_unavailable(message: impl Into<String>) -> Self {
        Self::HostUnavailable {
            message: message.into(),
        }
    }

    pub fn selection(message: impl Into<String>) -> Self {
        Self::Selection {
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn export(message: impl Into<String>) -> Self {
        Self::Export {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::HostUnavailable { .. } => "HOST_UNAVAILABLE",
            Self::Selection { .. } => "SELECTION_ERROR",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Export { .. } => "EXPORT_ERROR",
        }
    }

    /// Process exit status for the command entry point.
    /// A missing host is reported but is not a failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::HostUnavailable { .. } => 0,
            Self::Selection { .. } => 65,
            Self::Validation { .. } => 64,
            Self::Configuration { .. } => 78,
            Self::Export { .. } => 74,
        }
    }
}

pub type BomResult<T> = Result<T, BomError>;

// Conversion from common error types
impl From<std::io::Error> for BomError {
    fn from(error: std::io::Error) -> Self {
        Self::export(error.to_string())
    }
}

impl From<serde_json::Error> for BomError {
    fn from(error: serde_json::Error) -> Self {
        Self::selection(error.to_string())
    }
}

impl From<csv::Error> for BomError {
    fn from(error: csv::Error) -> Self {
        Self::export(error.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for BomError {
    fn from(error: rust_xlsxwriter::XlsxError) -> Self {
        Self::export(error.to_string())
    }
}

impl From<config::ConfigError> for BomError {
    fn from(error: config::ConfigError) -> Self {
        Self::configuration(error.to_string())
    }
}
