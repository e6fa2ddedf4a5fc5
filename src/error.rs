//! Error types for the zkalc benchmark collector

use std::path::PathBuf;

/// Exit status used when a program cannot be found, matching POSIX shells.
pub const EXIT_PROGRAM_NOT_FOUND: i32 = 127;

/// Error types for the zkalc benchmark collector
#[derive(Debug, thiserror::Error)]
pub enum ZkalcError {
    /// Requested target is not part of the catalog
    #[error("Unknown target: {name} (run `list` to see available targets)")]
    UnknownTarget { name: String },

    /// Catalog failed validation or could not be parsed
    #[error("Invalid catalog: {reason}")]
    InvalidCatalog { reason: String },

    /// The program of a step is not installed or not on PATH
    #[error("Program not found: {program}")]
    ProgramNotFound { program: String },

    /// The operating system refused to start a command
    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A subprocess ran but exited unsuccessfully
    #[error("Command `{command}` failed: {}", describe_exit(.code))]
    CommandFailed { command: String, code: Option<i32> },

    /// Filesystem operation failed
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The results directory overlaps the repository root or a backend
    #[error("Refusing to use {} as the results directory: {reason}", .path.display())]
    UnsafeOutdir { path: PathBuf, reason: String },

    /// A benchmark output line could not be understood
    #[error("Malformed benchmark record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    /// Benchmark reported a time unit we do not know how to convert
    #[error("Unknown time unit: {0}")]
    UnknownUnit(String),

    /// Not enough distinct points to build an interpolation
    #[error("Interpolation error: {0}")]
    Interpolation(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ZkalcError {
    /// Wraps an [`std::io::Error`] with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ZkalcError::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit status for this error.
    ///
    /// A failed child hands its own status through so the overall run surfaces
    /// the raw subprocess exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            ZkalcError::CommandFailed {
                code: Some(code), ..
            } if *code != 0 => *code,
            ZkalcError::ProgramNotFound { .. } => EXIT_PROGRAM_NOT_FOUND,
            _ => 1,
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    }
}

impl From<serde_json::Error> for ZkalcError {
    fn from(err: serde_json::Error) -> Self {
        ZkalcError::Serialization(err.to_string())
    }
}

/// Convenience Result type for collector operations
pub type Result<T> = std::result::Result<T, ZkalcError>;
