use thiserror::Error;

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Dimension mismatch in {what}: expected {expected}, found {actual}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid cost {value} at row {row}, column {col}")]
    InvalidCost { row: usize, col: usize, value: f64 },

    #[error("Supply ({supply}) must equal Demand ({demand})")]
    UnbalancedProblem { supply: u64, demand: u64 },

    #[error("Must have at least one {kind}")]
    LastEntity { kind: String },

    #[error("{kind} index {index} out of range (len {len})")]
    IndexOutOfRange {
        kind: String,
        index: usize,
        len: usize,
    },

    #[error("Empty problem: {what}")]
    EmptyProblem { what: String },

    #[error("Transportation simplex did not converge within {limit} iterations")]
    IterationLimit { limit: usize },

    #[error("Degenerate basis: {message}")]
    DegenerateBasis { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Configuration,
    Input,
    Solver,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SolverError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SolverError::IoError(_) => ErrorCategory::Io,
            SolverError::ZipError(_) | SolverError::CsvError(_) => ErrorCategory::Output,
            SolverError::SerializationError(_) => ErrorCategory::Input,
            SolverError::ConfigError { .. }
            | SolverError::ConfigValidationError { .. }
            | SolverError::InvalidConfigValueError { .. }
            | SolverError::MissingConfigError { .. } => ErrorCategory::Configuration,
            SolverError::ValidationError { .. }
            | SolverError::DimensionMismatch { .. }
            | SolverError::InvalidCost { .. }
            | SolverError::UnbalancedProblem { .. }
            | SolverError::LastEntity { .. }
            | SolverError::IndexOutOfRange { .. }
            | SolverError::EmptyProblem { .. } => ErrorCategory::Input,
            SolverError::IterationLimit { .. } | SolverError::DegenerateBasis { .. } => {
                ErrorCategory::Solver
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SolverError::LastEntity { .. } => ErrorSeverity::Low,
            SolverError::IterationLimit { .. } => ErrorSeverity::Medium,
            SolverError::DegenerateBasis { .. } => ErrorSeverity::Critical,
            SolverError::IoError(_) | SolverError::ZipError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            SolverError::IoError(_) => {
                "Check that the scenario file exists and the output directory is writable".to_string()
            }
            SolverError::ZipError(_) | SolverError::CsvError(_) => {
                "Retry with --no-archive or a different output path".to_string()
            }
            SolverError::SerializationError(_) => {
                "Check the scenario file for JSON syntax errors".to_string()
            }
            SolverError::ConfigError { .. }
            | SolverError::ConfigValidationError { .. }
            | SolverError::InvalidConfigValueError { .. }
            | SolverError::MissingConfigError { .. } => {
                "Review the configuration file and command line flags".to_string()
            }
            SolverError::DimensionMismatch { what, .. } => {
                format!("Make the {} lengths agree with their label lists", what)
            }
            SolverError::InvalidCost { .. } => "Use finite numbers for every cost cell".to_string(),
            SolverError::UnbalancedProblem { .. } => {
                "Adjust supply or demand, or rerun with --allow-unbalanced".to_string()
            }
            SolverError::LastEntity { .. } => "Add another entry before removing this one".to_string(),
            SolverError::IndexOutOfRange { .. } => "Use an index within the current list".to_string(),
            SolverError::EmptyProblem { .. } => "Provide at least one row and one column".to_string(),
            SolverError::IterationLimit { .. } => {
                "Raise --max-iterations or switch to --pivot-rule bland".to_string()
            }
            SolverError::DegenerateBasis { .. } => {
                "This is a solver bug; please report the scenario that triggered it".to_string()
            }
            SolverError::ValidationError { .. } => "Fix the reported input and retry".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Io => format!("File access failed: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Input => format!("Invalid scenario: {}", self),
            ErrorCategory::Solver => format!("Solver failed: {}", self),
            ErrorCategory::Output => format!("Could not write results: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, SolverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbalanced_message_matches_form_validation() {
        let err = SolverError::UnbalancedProblem {
            supply: 370,
            demand: 360,
        };
        assert_eq!(err.to_string(), "Supply (370) must equal Demand (360)");
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_io_errors_are_critical() {
        let err: SolverError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().starts_with("File access failed"));
    }
}
