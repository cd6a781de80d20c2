use thiserror::Error;

/// Exit status for a run that completed normally.
pub const EXIT_OK: i32 = 0;
/// Exit status for a radius that failed validation.
pub const EXIT_VALIDATION: i32 = 1;
/// Exit status for input that is not a number, or no input at all.
pub const EXIT_PARSE: i32 = 2;
/// Exit status for a console read/write failure.
pub const EXIT_IO: i32 = 3;

#[derive(Error, Debug)]
pub enum CircleError {
    #[error("Negative radius values are not allowed.")]
    NegativeRadius { radius: f64 },

    #[error("Invalid radius value: '{input}' is not a number.")]
    InvalidRadius { input: String },

    #[error("No radius value provided.")]
    MissingRadius,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid expect pattern: {0}")]
    PatternError(#[from] regex::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Command '{command}' failed: {message}")]
    CommandError { command: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Parse,
    Io,
    Config,
    Process,
}

impl CircleError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NegativeRadius { .. } => ErrorCategory::Validation,
            Self::InvalidRadius { .. } | Self::MissingRadius => ErrorCategory::Parse,
            Self::IoError(_) => ErrorCategory::Io,
            Self::TomlError(_)
            | Self::PatternError(_)
            | Self::SerializationError(_)
            | Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Config,
            Self::CommandError { .. } => ErrorCategory::Process,
        }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Validation => EXIT_VALIDATION,
            ErrorCategory::Parse => EXIT_PARSE,
            ErrorCategory::Io => EXIT_IO,
            ErrorCategory::Config | ErrorCategory::Process => EXIT_VALIDATION,
        }
    }
}

pub type Result<T> = std::result::Result<T, CircleError>;
