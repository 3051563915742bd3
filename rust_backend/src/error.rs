//! Error types for plan generation, rule evaluation and catalog access.

/// Result type for pipeline operations
pub type PlanResult<T> = Result<T, PlanError>;

/// Error type for the plan generation pipeline.
///
/// Only structural validation failures are fatal; every other failure mode is
/// recovered inside the pipeline and recorded in the analysis notes.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("Chart validation failed: {}", errors.join("; "))]
    Validation {
        errors: Vec<String>,
        warnings: Vec<String>,
    },

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error raised by a single rule's evaluator. The engine skips the rule and keeps going.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleError {
    #[error("Missing data: {0}")]
    MissingData(String),

    #[error("Inconsistent analysis: {0}")]
    Inconsistent(String),
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Error type for loading and validating the exercise catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to parse catalog at {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Duplicate exercise id: {0}")]
    DuplicateId(String),

    #[error("Exercise {id} has intensity {intensity} outside 1..=5")]
    InvalidIntensity { id: String, intensity: u8 },

    #[error("Exercise {id} has duration {duration} outside 1..={max} minutes")]
    InvalidDuration { id: String, duration: u32, max: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),
}
