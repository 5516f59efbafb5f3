use restartcheck_core_types::RunId;
use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Operational failures only. Differences between two containers are never
/// errors in this sense; they are recorded as findings in a comparison outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Configuration / input
    InvalidInput,
    InvalidTolerance,
    InvalidPattern,
    NotFound,

    // Container data
    InvalidContainer,
    InvalidLvArray,
    InvalidRootFile,

    // Integration/IO
    Io,
    Serialization,
    Concurrency,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidTolerance => "ERR_INVALID_TOLERANCE",
            ExErrorKind::InvalidPattern => "ERR_INVALID_PATTERN",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::InvalidContainer => "ERR_INVALID_CONTAINER",
            ExErrorKind::InvalidLvArray => "ERR_INVALID_LVARRAY",
            ExErrorKind::InvalidRootFile => "ERR_INVALID_ROOT_FILE",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus the operation,
/// the file or container path involved, and a human-readable message.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    path: Option<String>,
    run_id: Option<RunId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            path: None,
            run_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add file or container path context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add run ID context
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the path context, if any
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Get the run ID context, if any
    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(source) = &self.source {
            write!(f, " caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Reasons an LvArray triple cannot be decoded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LvArrayError {
    #[error("The dimensions must be a 1D array, not {rank}D")]
    DimensionsNotVector { rank: usize },

    #[error("The permutation must be a 1D array, not {rank}D")]
    PermutationNotVector { rank: usize },

    #[error("The shape and permutation arrays must have the same length. {dimensions} != {permutation}")]
    LengthMismatch {
        dimensions: usize,
        permutation: usize,
    },

    #[error("The shape is {dimensions:?} which yields a total size of {expected} but the real size is {actual}.")]
    SizeMismatch {
        dimensions: Vec<usize>,
        expected: usize,
        actual: usize,
    },

    #[error("The shape is {dimensions:?} whose total size overflows.")]
    SizeOverflow { dimensions: Vec<usize> },

    #[error("The permutation is not valid: {permutation:?}")]
    InvalidPermutation { permutation: Vec<i64> },

    #[error("The {field} of an LvArray must hold non-negative integers: {reason}")]
    InvalidMetadata { field: String, reason: String },
}

impl From<LvArrayError> for ExError {
    fn from(err: LvArrayError) -> Self {
        ExError::new(ExErrorKind::InvalidLvArray)
            .with_op("lvarray_decode")
            .with_message(err.to_string())
    }
}
