// DataLoader: batching, shuffling, iteration

use std::path::PathBuf;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{thread_rng, SeedableRng};

use framepair_core::{Error, Result, Tensor};

use crate::dataset::{Dataset, SamplePair};
use crate::paired::PairedFrameDataset;
use crate::prefetch::PrefetchQueue;

/// Configuration for the DataLoader.
#[derive(Debug, Clone)]
pub struct DataLoaderConfig {
    /// Number of samples per batch.
    pub batch_size: usize,
    /// Whether to draw a fresh random order for every pass.
    pub shuffle: bool,
    /// Whether to drop the last incomplete batch.
    pub drop_last: bool,
    /// Number of background workers decoding samples (0 = inline, on the
    /// consumer's thread).
    pub num_workers: usize,
    /// Samples kept in flight per worker.
    pub prefetch_factor: usize,
    /// Optional random seed for reproducible shuffling.
    pub seed: Option<u64>,
}

impl Default for DataLoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: 1,
            shuffle: false,
            drop_last: false,
            num_workers: 0,
            prefetch_factor: 2,
            seed: None,
        }
    }
}

impl DataLoaderConfig {
    pub fn batch_size(mut self, bs: usize) -> Self {
        self.batch_size = bs;
        self
    }

    pub fn shuffle(mut self, s: bool) -> Self {
        self.shuffle = s;
        self
    }

    pub fn drop_last(mut self, d: bool) -> Self {
        self.drop_last = d;
        self
    }

    pub fn num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    pub fn prefetch_factor(mut self, pf: usize) -> Self {
        self.prefetch_factor = pf;
        self
    }

    pub fn seed(mut self, s: u64) -> Self {
        self.seed = Some(s);
        self
    }

    /// Reject settings the loader cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be positive".into()));
        }
        if self.prefetch_factor == 0 {
            return Err(Error::Config("prefetch_factor must be positive".into()));
        }
        Ok(())
    }
}

/// Stacked samples: `input` is `[batch, input_dim, frames]`, `target` is
/// `[batch, output_dim, frames]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Dataset indices of the stacked samples, in batch order.
    pub indices: Vec<usize>,
    pub input: Tensor,
    pub target: Tensor,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Concatenate unit-batch samples along the batch dimension.
    ///
    /// Fails with `Error::ShapeMismatch` when the samples differ in frame
    /// count (or dimension).
    pub fn collate(samples: Vec<SamplePair>) -> Result<Self> {
        let mut indices = Vec::with_capacity(samples.len());
        let mut inputs = Vec::with_capacity(samples.len());
        let mut targets = Vec::with_capacity(samples.len());
        for s in samples {
            indices.push(s.index);
            inputs.push(s.input);
            targets.push(s.target);
        }
        Ok(Self {
            indices,
            input: Tensor::cat(&inputs)?,
            target: Tensor::cat(&targets)?,
        })
    }
}

/// A DataLoader wraps a Dataset and produces batches of tensors.
///
/// Each call to [`iter_epoch`](DataLoader::iter_epoch) starts a new pass.
/// Samples are read lazily, batch by batch; with `num_workers > 0` they are
/// decoded ahead of time by a [`PrefetchQueue`].
pub struct DataLoader {
    dataset: Arc<dyn Dataset>,
    config: DataLoaderConfig,
    epoch: u64,
}

impl DataLoader {
    /// Create a new DataLoader over a dataset.
    pub fn new(dataset: Arc<dyn Dataset>, config: DataLoaderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            dataset,
            config,
            epoch: 0,
        })
    }

    pub fn config(&self) -> &DataLoaderConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Arc<dyn Dataset> {
        &self.dataset
    }

    /// The number of batches per epoch.
    pub fn num_batches(&self) -> usize {
        if self.config.drop_last {
            self.dataset.len() / self.config.batch_size
        } else {
            self.dataset.len().div_ceil(self.config.batch_size)
        }
    }

    /// Total number of samples.
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    /// Passes started so far.
    pub fn epochs_started(&self) -> u64 {
        self.epoch
    }

    /// Sample order for the next pass.
    ///
    /// Seeded loaders derive the pass seed from the base seed and the pass
    /// number, so every pass differs but a rerun repeats the same sequence.
    fn pass_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.dataset.len()).collect();
        if self.config.shuffle {
            match self.config.seed {
                Some(seed) => {
                    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(self.epoch));
                    order.shuffle(&mut rng);
                }
                None => {
                    let mut rng = thread_rng();
                    order.shuffle(&mut rng);
                }
            }
        }
        order
    }

    /// Start a pass and iterate over its batches.
    pub fn iter_epoch(&mut self) -> Batches {
        let mut order = self.pass_order();
        self.epoch += 1;
        let remaining = self.num_batches();
        if self.config.drop_last {
            // samples of the dropped tail batch are never read
            order.truncate(remaining * self.config.batch_size);
        }
        log::debug!(
            "{}: pass {} over {} samples in {} batches",
            self.dataset.name(),
            self.epoch,
            order.len(),
            remaining
        );

        let prefetch = (self.config.num_workers > 0 && !order.is_empty()).then(|| {
            PrefetchQueue::spawn(
                Arc::clone(&self.dataset),
                order.clone(),
                self.config.num_workers,
                self.config
                    .prefetch_factor
                    .saturating_mul(self.config.num_workers),
            )
        });

        Batches {
            dataset: Arc::clone(&self.dataset),
            order,
            batch_size: self.config.batch_size,
            cursor: 0,
            remaining,
            prefetch,
        }
    }
}

/// Iterator that yields one batch at a time.
///
/// The first error ends the pass: it is yielded once and the iterator is
/// exhausted afterwards.
pub struct Batches {
    dataset: Arc<dyn Dataset>,
    order: Vec<usize>,
    batch_size: usize,
    cursor: usize,
    remaining: usize,
    prefetch: Option<PrefetchQueue>,
}

impl Batches {
    fn fetch(&mut self, position: usize) -> Result<SamplePair> {
        match self.prefetch.as_mut() {
            Some(q) => q.take(position),
            None => self.dataset.get(self.order[position]),
        }
    }

    fn next_batch(&mut self) -> Result<Batch> {
        let start = self.cursor;
        let end = (start + self.batch_size).min(self.order.len());
        self.cursor = end;
        let samples = (start..end)
            .map(|pos| self.fetch(pos))
            .collect::<Result<Vec<_>>>()?;
        Batch::collate(samples)
    }
}

impl Iterator for Batches {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let batch = self.next_batch();
        if batch.is_err() {
            self.remaining = 0;
            self.prefetch = None;
        }
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

/// Build a loader over paired frame files in one call.
///
/// `num_workers == 0` decodes samples on the consuming thread.
pub fn get_loader(
    input_paths: Vec<PathBuf>,
    target_paths: Vec<PathBuf>,
    input_dim: usize,
    output_dim: usize,
    batch_size: usize,
    shuffle: bool,
    num_workers: usize,
) -> Result<DataLoader> {
    let dataset = PairedFrameDataset::new(input_paths, target_paths, input_dim, output_dim)?;
    DataLoader::new(
        Arc::new(dataset),
        DataLoaderConfig::default()
            .batch_size(batch_size)
            .shuffle(shuffle)
            .num_workers(num_workers),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedFrames {
        frames: Vec<usize>,
    }

    impl Dataset for FixedFrames {
        fn len(&self) -> usize {
            self.frames.len()
        }

        fn get(&self, index: usize) -> Result<SamplePair> {
            let t = self.frames[index];
            Ok(SamplePair {
                index,
                input: Tensor::zeros((1, 3, t)),
                target: Tensor::zeros((1, 2, t)),
            })
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(DataLoaderConfig::default().validate().is_ok());
        assert!(DataLoaderConfig::default().batch_size(0).validate().is_err());
        assert!(DataLoaderConfig::default()
            .prefetch_factor(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_num_batches() {
        let ds: Arc<dyn Dataset> = Arc::new(FixedFrames { frames: vec![4; 10] });
        let cfg = DataLoaderConfig::default().batch_size(3);
        let loader = DataLoader::new(Arc::clone(&ds), cfg.clone()).unwrap();
        assert_eq!(loader.num_batches(), 4);
        let loader = DataLoader::new(ds, cfg.drop_last(true)).unwrap();
        assert_eq!(loader.num_batches(), 3);
    }

    #[test]
    fn test_collate_shapes() {
        let ds = FixedFrames { frames: vec![5, 5] };
        let batch = Batch::collate(vec![ds.get(0).unwrap(), ds.get(1).unwrap()]).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.input.dims(), &[2, 3, 5]);
        assert_eq!(batch.target.dims(), &[2, 2, 5]);
    }

    #[test]
    fn test_collate_mismatched_frames() {
        let ds = FixedFrames { frames: vec![5, 6] };
        let err = Batch::collate(vec![ds.get(0).unwrap(), ds.get(1).unwrap()]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_error_ends_pass() {
        let ds: Arc<dyn Dataset> = Arc::new(FixedFrames {
            frames: vec![5, 6, 5, 5],
        });
        let mut loader = DataLoader::new(ds, DataLoaderConfig::default().batch_size(2)).unwrap();
        let results: Vec<_> = loader.iter_epoch().collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }

    #[test]
    fn test_seeded_passes_are_reproducible_and_distinct() {
        let ds: Arc<dyn Dataset> = Arc::new(FixedFrames { frames: vec![1; 30] });
        let cfg = DataLoaderConfig::default().shuffle(true).seed(7);
        let order = |loader: &mut DataLoader| -> Vec<usize> {
            loader
                .iter_epoch()
                .flat_map(|b| b.unwrap().indices)
                .collect()
        };

        let mut a = DataLoader::new(Arc::clone(&ds), cfg.clone()).unwrap();
        let mut b = DataLoader::new(ds, cfg).unwrap();
        let (a1, a2) = (order(&mut a), order(&mut a));
        let (b1, b2) = (order(&mut b), order(&mut b));
        assert_eq!(a1, b1);
        assert_eq!(a2, b2);
        assert_ne!(a1, a2);
        assert_eq!(a.epochs_started(), 2);
    }

    #[test]
    fn test_huge_prefetch_factor_on_tiny_dataset() {
        let ds: Arc<dyn Dataset> = Arc::new(FixedFrames { frames: vec![3] });
        let cfg = DataLoaderConfig::default()
            .num_workers(4)
            .prefetch_factor(usize::MAX / 2);
        let mut loader = DataLoader::new(ds, cfg).unwrap();
        let batches: Vec<_> = loader.iter_epoch().map(|b| b.unwrap()).collect();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].input.dims(), &[1, 3, 3]);
    }

    /// Counts every `get` so tests can see which samples were decoded.
    struct Counting {
        n: usize,
        reads: AtomicUsize,
    }

    impl Dataset for Counting {
        fn len(&self) -> usize {
            self.n
        }

        fn get(&self, index: usize) -> Result<SamplePair> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(SamplePair {
                index,
                input: Tensor::zeros((1, 1, 2)),
                target: Tensor::zeros((1, 1, 2)),
            })
        }
    }

    #[test]
    fn test_drop_last_skips_tail_samples() {
        let ds = Arc::new(Counting {
            n: 7,
            reads: AtomicUsize::new(0),
        });
        let cfg = DataLoaderConfig::default()
            .batch_size(3)
            .drop_last(true)
            .num_workers(2)
            .prefetch_factor(8);
        let mut loader = DataLoader::new(Arc::clone(&ds) as Arc<dyn Dataset>, cfg).unwrap();

        let batches: Vec<_> = loader.iter_epoch().map(|b| b.unwrap()).collect();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[1].indices, vec![3, 4, 5]);
        assert_eq!(ds.reads.load(Ordering::SeqCst), 6);
    }
}
