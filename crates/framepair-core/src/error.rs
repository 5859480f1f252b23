use std::path::PathBuf;

use crate::shape::Shape;

/// All errors that can occur while reading, pairing and batching frames.
///
/// One enum covers file access, malformed frame data, pairing checks and
/// tensor-shape failures so every layer can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A frame or list file could not be opened or read.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The byte length is not a whole number of `f32` values.
    #[error("malformed frame file {}: {bytes} bytes is not a multiple of 4", path.display())]
    TruncatedValue { path: PathBuf, bytes: usize },

    /// The value count does not divide into frames of the declared dimension.
    #[error(
        "malformed frame file {}: {values} values do not divide into frames of dimension {dim}",
        path.display()
    )]
    FrameAlignment {
        path: PathBuf,
        values: usize,
        dim: usize,
    },

    /// Input and target files of one sample decode to different frame counts.
    #[error(
        "frame count mismatch for sample {index}: input has {input_frames} frames, target has {target_frames}"
    )]
    FrameMismatch {
        index: usize,
        input_frames: usize,
        target_frames: usize,
    },

    /// Two tensors that must agree in shape do not (e.g. when stacking a batch).
    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: Shape, got: Shape },

    /// Invalid construction parameters.
    #[error("configuration error: {0}")]
    Config(String),

    /// Sample (or element) index past the end.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Operation requires a specific rank (number of dimensions).
    #[error("rank mismatch: expected rank {expected}, got {got}")]
    RankMismatch { expected: usize, got: usize },

    /// Dimension index out of range for the tensor's rank.
    #[error("dimension out of range: dim {dim} for tensor with {rank} dimensions")]
    DimOutOfRange { dim: usize, rank: usize },

    /// Element count mismatch when creating from a vec.
    #[error("element count mismatch: shape {shape} requires {expected} elements, got {got}")]
    ElementCountMismatch {
        shape: Shape,
        expected: usize,
        got: usize,
    },

    /// Cannot reshape because element counts differ.
    #[error(
        "cannot reshape: source has {src} elements, target shape {dst_shape} has {dst} elements"
    )]
    ReshapeElementMismatch {
        src: usize,
        dst: usize,
        dst_shape: Shape,
    },

    /// A prefetch worker died or the worker pool shut down early.
    #[error("prefetch worker failure: {0}")]
    Worker(String),

    /// Generic message for cases not covered above.
    #[error("{0}")]
    Msg(String),
}

impl Error {
    /// Create an error from any string message.
    pub fn msg(s: impl Into<String>) -> Self {
        Error::Msg(s.into())
    }

    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error reports malformed frame data.
    pub fn is_format(&self) -> bool {
        matches!(
            self,
            Error::TruncatedValue { .. } | Error::FrameAlignment { .. }
        )
    }
}

/// Convenience Result type used throughout framepair.
pub type Result<T> = std::result::Result<T, Error>;

