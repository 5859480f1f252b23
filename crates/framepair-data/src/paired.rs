// PairedFrameDataset: input/target frame files matched by position
//
// Two equal-length path lists name the input and target file of every
// utterance. Nothing is read at construction; each `get` decodes both files
// from disk and checks that they agree on the frame count.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use framepair_core::{Error, Result};

use crate::dataset::{Dataset, SamplePair};
use crate::file_list::read_file_list;
use crate::reader::FrameReader;

/// Paired input/target frame files with fixed, corpus-wide dimensions.
#[derive(Debug, Clone)]
pub struct PairedFrameDataset {
    input_paths: Vec<PathBuf>,
    target_paths: Vec<PathBuf>,
    input_dim: usize,
    output_dim: usize,
    reader: FrameReader,
}

impl PairedFrameDataset {
    /// Create a dataset over parallel path lists.
    ///
    /// Fails with `Error::Config` if the lists differ in length or either
    /// dimension is zero. No file is touched.
    pub fn new(
        input_paths: Vec<PathBuf>,
        target_paths: Vec<PathBuf>,
        input_dim: usize,
        output_dim: usize,
    ) -> Result<Self> {
        if input_paths.len() != target_paths.len() {
            return Err(Error::Config(format!(
                "input list has {} paths but target list has {}",
                input_paths.len(),
                target_paths.len()
            )));
        }
        if input_dim == 0 || output_dim == 0 {
            return Err(Error::Config(format!(
                "dimensions must be positive (input {input_dim}, output {output_dim})"
            )));
        }
        Ok(Self {
            input_paths,
            target_paths,
            input_dim,
            output_dim,
            reader: FrameReader::default(),
        })
    }

    /// Build from two path-list files.
    ///
    /// With `align`, the input list is cut down to the length of the target
    /// list first (targets are often generated for a prefix of the inputs).
    pub fn from_list_files(
        input_list: impl AsRef<Path>,
        target_list: impl AsRef<Path>,
        input_dim: usize,
        output_dim: usize,
        align: bool,
    ) -> Result<Self> {
        let mut inputs = read_file_list(input_list)?;
        let targets = read_file_list(target_list)?;
        if align && inputs.len() > targets.len() {
            log::warn!(
                "truncating input list from {} to {} paths to match targets",
                inputs.len(),
                targets.len()
            );
            inputs.truncate(targets.len());
        }
        Self::new(inputs, targets, input_dim, output_dim)
    }

    /// Use a reader with a different byte order.
    pub fn with_reader(mut self, reader: FrameReader) -> Self {
        self.reader = reader;
        self
    }

    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    pub fn output_dim(&self) -> usize {
        self.output_dim
    }

    pub fn input_path(&self, index: usize) -> Option<&Path> {
        self.input_paths.get(index).map(PathBuf::as_path)
    }

    pub fn target_path(&self, index: usize) -> Option<&Path> {
        self.target_paths.get(index).map(PathBuf::as_path)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        Ok(())
    }

    /// Frame count of pair `index`, from file lengths only.
    pub fn probe(&self, index: usize) -> Result<usize> {
        self.check_index(index)?;
        let input_frames = self.reader.probe(&self.input_paths[index], self.input_dim)?;
        let target_frames = self
            .reader
            .probe(&self.target_paths[index], self.output_dim)?;
        if input_frames != target_frames {
            return Err(Error::FrameMismatch {
                index,
                input_frames,
                target_frames,
            });
        }
        Ok(input_frames)
    }

    /// Probe every pair in parallel and return the per-pair frame counts.
    pub fn scan(&self) -> Result<Vec<usize>> {
        (0..self.len())
            .into_par_iter()
            .map(|i| self.probe(i))
            .collect()
    }
}

impl Dataset for PairedFrameDataset {
    fn len(&self) -> usize {
        self.input_paths.len()
    }

    fn get(&self, index: usize) -> Result<SamplePair> {
        self.check_index(index)?;

        let (input, input_frames) = self.reader.read(&self.input_paths[index], self.input_dim)?;
        let (target, target_frames) = self
            .reader
            .read(&self.target_paths[index], self.output_dim)?;

        if input_frames != target_frames {
            return Err(Error::FrameMismatch {
                index,
                input_frames,
                target_frames,
            });
        }

        Ok(SamplePair {
            index,
            input: input.unsqueeze(0)?,
            target: target.unsqueeze(0)?,
        })
    }

    fn name(&self) -> &str {
        "paired-frames"
    }
}

/// Summary of a scanned corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorpusStats {
    pub pairs: usize,
    pub total_frames: usize,
    pub min_frames: usize,
    pub max_frames: usize,
}

impl CorpusStats {
    pub fn from_frame_counts(counts: &[usize]) -> Self {
        Self {
            pairs: counts.len(),
            total_frames: counts.iter().sum(),
            min_frames: counts.iter().copied().min().unwrap_or(0),
            max_frames: counts.iter().copied().max().unwrap_or(0),
        }
    }

    /// Whether every utterance has the same length, i.e. batches larger
    /// than one can be stacked.
    pub fn uniform_length(&self) -> bool {
        self.min_frames == self.max_frames
    }
}
