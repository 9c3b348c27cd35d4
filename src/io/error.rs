//! Error types for grid construction, rule loading and generation runs

use crate::algorithm::bitset::TerrainSet;
use crate::algorithm::propagation::Contradiction;
use crate::terrain::Terrain;
use std::fmt;
use std::path::PathBuf;

/// Main error type for all generation operations
#[derive(Debug)]
pub enum GenerationError {
    /// Configuration value failed validation
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Adjacency table is malformed
    InvalidRules {
        /// Description of what's wrong with the table
        reason: String,
    },

    /// Adjacency rule file could not be parsed
    RuleFile {
        /// Path of the rule file
        path: PathBuf,
        /// One-based line number of the offending line
        line: usize,
        /// Description of the parse failure
        reason: String,
    },

    /// Cell index does not belong to the grid the store was built for
    UnknownCell {
        /// The offending cell index
        index: usize,
        /// Number of cells in the grid
        cell_count: usize,
    },

    /// Attempted to collapse a cell to a terrain it can no longer take
    ///
    /// This is a programming error: the selector only ever proposes
    /// terrains drawn from the cell's current possibilities.
    InvalidCollapse {
        /// Index of the cell being collapsed
        index: usize,
        /// Requested terrain
        terrain: Terrain,
        /// Possibilities remaining at the time of the request
        remaining: TerrainSet,
    },

    /// A restriction would leave a cell without any possible terrain
    ///
    /// Raised by the possibility store; the propagator turns it into a
    /// [`Contradiction`] carrying coordinates.
    EmptyPossibilities {
        /// Index of the exhausted cell
        index: usize,
    },

    /// Propagation emptied a cell's possibility set
    Contradiction(Contradiction),

    /// Every fresh run contradicted
    AttemptsExhausted {
        /// Number of runs tried
        attempts: usize,
        /// Contradiction that ended the last run, if any run was made
        last: Option<Contradiction>,
    },

    /// Failed to save a generated image to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::InvalidRules { reason } => {
                write!(f, "Invalid adjacency rules: {reason}")
            }
            Self::RuleFile { path, line, reason } => {
                write!(f, "Rule file '{}' line {line}: {reason}", path.display())
            }
            Self::UnknownCell { index, cell_count } => {
                write!(
                    f,
                    "Cell index {index} is out of bounds (grid has {cell_count} cells)"
                )
            }
            Self::InvalidCollapse {
                index,
                terrain,
                remaining,
            } => {
                write!(
                    f,
                    "Cannot collapse cell {index} to {terrain}: remaining possibilities are {remaining}"
                )
            }
            Self::EmptyPossibilities { index } => {
                write!(f, "Cell {index} has no remaining possibilities")
            }
            Self::Contradiction(contradiction) => {
                write!(f, "Contradiction: {contradiction}")
            }
            Self::AttemptsExhausted { attempts, last } => match last {
                Some(contradiction) => write!(
                    f,
                    "All {attempts} attempts ended in contradiction, last: {contradiction}"
                ),
                None => write!(f, "No generation attempts were made"),
            },
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for GenerationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            Self::Contradiction(contradiction) => Some(contradiction),
            _ => None,
        }
    }
}

/// Convenience type alias for generation results
pub type Result<T> = std::result::Result<T, GenerationError>;

impl From<Contradiction> for GenerationError {
    fn from(contradiction: Contradiction) -> Self {
        Self::Contradiction(contradiction)
    }
}

impl From<image::ImageError> for GenerationError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageExport {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<std::io::Error> for GenerationError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

impl GenerationError {
    /// The contradiction carried by this error, if it is one
    pub const fn as_contradiction(&self) -> Option<&Contradiction> {
        match self {
            Self::Contradiction(contradiction) => Some(contradiction),
            _ => None,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> GenerationError {
    GenerationError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create an invalid rules error
pub fn invalid_rules(reason: &impl ToString) -> GenerationError {
    GenerationError::InvalidRules {
        reason: reason.to_string(),
    }
}
