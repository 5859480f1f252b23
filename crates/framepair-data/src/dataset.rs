// Dataset trait: indexed, countable access to sample pairs

use framepair_core::{Result, Tensor};

/// One utterance's input and target features in unit-batch layout.
///
/// `input` is `[1, input_dim, frames]` and `target` is
/// `[1, output_dim, frames]`; both share the same frame count.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePair {
    /// Position of the pair in the dataset.
    pub index: usize,
    pub input: Tensor,
    pub target: Tensor,
}

impl SamplePair {
    /// Number of frames (last dimension of the input).
    pub fn frames(&self) -> usize {
        self.input.dims().last().copied().unwrap_or(0)
    }
}

/// A dataset is an indexed collection of sample pairs.
///
/// Implementations must be `Send + Sync` so the loader can fetch samples
/// from worker threads. Samples are produced fresh on every `get`.
pub trait Dataset: Send + Sync {
    /// Total number of samples in the dataset.
    fn len(&self) -> usize;

    /// Whether the dataset is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Retrieve the sample at position `index`.
    ///
    /// Fails with `Error::IndexOutOfRange` if `index >= self.len()`.
    fn get(&self, index: usize) -> Result<SamplePair>;

    /// Optional human-readable name.
    fn name(&self) -> &str {
        "dataset"
    }
}
