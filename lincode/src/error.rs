//! Error types for every layer of the crate.
//!
//! Out-of-range indices are not represented here: they are programming errors and
//! panic at the point of access.

use crate::shape::Dims;
use thiserror::Error;

/// Incompatible geometry between two arrays, or between an array and a view request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: Dims, found: Dims },

    #[error("rank mismatch: expected rank {expected}, found rank {found}")]
    RankMismatch { expected: usize, found: usize },

    #[error("window [{offset}, {end}) exceeds extent {extent} on axis {axis}")]
    WindowOutOfBounds {
        axis: usize,
        offset: usize,
        end: usize,
        extent: usize,
    },

    #[error("{len} elements cannot fill shape {shape}")]
    LengthMismatch { shape: Dims, len: usize },
}

impl ShapeError {
    pub(crate) fn mismatch(expected: &crate::Shape, found: &crate::Shape) -> Self {
        ShapeError::DimensionMismatch {
            expected: expected.to_dims(),
            found: found.to_dims(),
        }
    }
}

/// Malformed text input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("invalid token {0:?}")]
    InvalidToken(String),

    #[error("missing `%%%` delimiter after the shape")]
    MissingDelimiter,

    #[error("shape {0} holds more elements than can be addressed")]
    ShapeTooLarge(Dims),

    #[error("invalid type of input for code: {0:?} (expected `generator` or `check`)")]
    UnknownKind(String),
}

/// Failures of the GF(2) elimination routines
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinAlgError {
    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error("no pivot found in column {column}")]
    NoPivot { column: usize },

    #[error("matrix is rank deficient: rank {rank} with {rows} rows")]
    RankDeficient { rank: usize, rows: usize },

    #[error("right-hand side is not in the row space of the matrix")]
    NotInRowSpace,
}

/// Errors raised while building, searching or decoding a code
#[derive(Error, Debug)]
pub enum ECCError {
    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    LinAlg(#[from] LinAlgError),

    #[error("a code needs at least one generator row")]
    EmptyCode,

    #[error("the generator matrix spans no non-zero codeword")]
    NoNonzeroCodeword,

    #[error("exhaustive search over 2^{dimension} vectors is not addressable")]
    SearchTooLarge { dimension: usize },

    #[error("maximum weight {max_weight} exceeds vector length {length}")]
    WeightExceedsLength { max_weight: usize, length: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
