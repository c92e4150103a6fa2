use std::fmt::{Display, Formatter};

pub type ThreejResult<T> = Result<T, ThreejError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Success,
    InputValidationError,
    IoSystemError,
    InternalError,
}

impl ErrorCategory {
    pub const fn exit_placeholder(self) -> ExitPlaceholder {
        match self {
            Self::Success => ExitPlaceholder {
                exit_code: 0,
                rust_category: "Success",
                legacy_class: "SUCCESS",
            },
            Self::InputValidationError => ExitPlaceholder {
                exit_code: 2,
                rust_category: "InputValidationError",
                legacy_class: "INPUT_FATAL",
            },
            Self::IoSystemError => ExitPlaceholder {
                exit_code: 3,
                rust_category: "IoSystemError",
                legacy_class: "IO_FATAL",
            },
            Self::InternalError => ExitPlaceholder {
                exit_code: 5,
                rust_category: "InternalError",
                legacy_class: "SYS_FATAL",
            },
        }
    }

    pub const fn exit_code(self) -> i32 {
        self.exit_placeholder().exit_code
    }

    pub const fn rust_category(self) -> &'static str {
        self.exit_placeholder().rust_category
    }

    pub const fn legacy_class(self) -> &'static str {
        self.exit_placeholder().legacy_class
    }

    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::Success)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitPlaceholder {
    pub exit_code: i32,
    pub rust_category: &'static str,
    pub legacy_class: &'static str,
}

/// Categorized, user-facing form of any failure in the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    category: ErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl Diagnostic {
    pub fn new(
        category: ErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::InputValidationError, placeholder, message)
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::IoSystemError, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::InternalError, placeholder, message)
    }

    pub const fn category(&self) -> ErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        let severity = if self.category.is_fatal() {
            "ERROR"
        } else {
            "INFO"
        };
        format!("{}: [{}] {}", severity, self.placeholder, self.message)
    }

    pub fn fatal_exit_line(&self) -> Option<String> {
        self.category
            .is_fatal()
            .then(|| format!("FATAL EXIT CODE: {}", self.exit_code()))
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.rust_category(),
            self.placeholder,
            self.message
        )
    }
}

impl std::error::Error for Diagnostic {}

/// Input failures of the 3j recurrence. All of them are raised before any
/// recursion touches the output buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ThreejError {
    #[error("either l2 < abs(m2) or l3 < abs(m3)")]
    InvalidMagneticQuantumNumber,
    #[error("either l2 + abs(m2) or l3 + abs(m3) non-integer")]
    NonIntegerSum,
    #[error("l1max - l1min not an integer")]
    NonIntegerRange,
    #[error("l1max less than l1min")]
    InvertedRange,
    #[error(
        "result array for 3j coefficients too small: {required} slots required, {available} available"
    )]
    BufferTooSmall { required: usize, available: usize },
}

impl ThreejError {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidMagneticQuantumNumber => "InvalidMagneticQuantumNumber",
            Self::NonIntegerSum => "NonIntegerSum",
            Self::NonIntegerRange => "NonIntegerRange",
            Self::InvertedRange => "InvertedRange",
            Self::BufferTooSmall { .. } => "BufferTooSmall",
        }
    }

    pub const fn placeholder(&self) -> &'static str {
        match self {
            Self::InvalidMagneticQuantumNumber => "INPUT.THREEJ_MAGNETIC",
            Self::NonIntegerSum => "INPUT.THREEJ_SUM",
            Self::NonIntegerRange => "INPUT.THREEJ_RANGE",
            Self::InvertedRange => "INPUT.THREEJ_INVERTED",
            Self::BufferTooSmall { .. } => "INPUT.THREEJ_BUFFER",
        }
    }

    pub const fn category(&self) -> ErrorCategory {
        ErrorCategory::InputValidationError
    }

    pub fn diagnostic(&self) -> Diagnostic {
        Diagnostic::new(self.category(), self.placeholder(), self.to_string())
    }
}

impl From<ThreejError> for Diagnostic {
    fn from(error: ThreejError) -> Self {
        error.diagnostic()
    }
}
