use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use framepair_core::{Error, Result};
use framepair_data::{
    ByteOrder, DataLoader, DataLoaderConfig, Dataset, FrameReader, PairedFrameDataset,
};

/// Everything needed to open a paired feature corpus and iterate over it.
///
/// Usually read from a JSON file:
///
/// ```json
/// {
///   "input_list": "lists/ref_files.list",
///   "target_list": "lists/gen_files.list",
///   "input_dim": 60,
///   "output_dim": 60,
///   "num_workers": 3
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorpusConfig {
    /// Path-list file naming the input frame files.
    pub input_list: PathBuf,

    /// Path-list file naming the target frame files.
    pub target_list: PathBuf,

    /// Channels per input frame.
    pub input_dim: usize,

    /// Channels per target frame.
    pub output_dim: usize,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default)]
    pub shuffle: bool,

    /// Background decoding threads (0 = decode on the consuming thread).
    #[serde(default)]
    pub num_workers: usize,

    #[serde(default = "default_prefetch_factor")]
    pub prefetch_factor: usize,

    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub drop_last: bool,

    #[serde(default)]
    pub byte_order: ByteOrder,

    /// Truncate the input list to the target list's length.
    #[serde(default)]
    pub align_lists: bool,
}

fn default_batch_size() -> usize {
    1
}

fn default_prefetch_factor() -> usize {
    2
}

impl CorpusConfig {
    /// A config with defaults for everything but the lists and dimensions.
    pub fn new(
        input_list: impl Into<PathBuf>,
        target_list: impl Into<PathBuf>,
        input_dim: usize,
        output_dim: usize,
    ) -> Self {
        Self {
            input_list: input_list.into(),
            target_list: target_list.into(),
            input_dim,
            output_dim,
            batch_size: default_batch_size(),
            shuffle: false,
            num_workers: 0,
            prefetch_factor: default_prefetch_factor(),
            seed: None,
            drop_last: false,
            byte_order: ByteOrder::default(),
            align_lists: false,
        }
    }

    /// Load from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let config: Self = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        log::debug!("loaded corpus config from {}", path.display());
        Ok(config)
    }

    /// Check the numeric settings.
    pub fn validate(&self) -> Result<()> {
        if self.input_dim == 0 || self.output_dim == 0 {
            return Err(Error::Config(format!(
                "dimensions must be positive (input {}, output {})",
                self.input_dim, self.output_dim
            )));
        }
        self.loader_config().validate()?;
        if self.batch_size > 1 {
            log::warn!(
                "batch_size {} stacks utterances; every batch fails unless its samples share a frame count",
                self.batch_size
            );
        }
        Ok(())
    }

    /// The batching part of the config.
    pub fn loader_config(&self) -> DataLoaderConfig {
        let cfg = DataLoaderConfig::default()
            .batch_size(self.batch_size)
            .shuffle(self.shuffle)
            .drop_last(self.drop_last)
            .num_workers(self.num_workers)
            .prefetch_factor(self.prefetch_factor);
        match self.seed {
            Some(seed) => cfg.seed(seed),
            None => cfg,
        }
    }

    /// Read both path lists and open the dataset.
    pub fn open_dataset(&self) -> Result<PairedFrameDataset> {
        self.validate()?;
        let ds = PairedFrameDataset::from_list_files(
            &self.input_list,
            &self.target_list,
            self.input_dim,
            self.output_dim,
            self.align_lists,
        )?;
        Ok(ds.with_reader(FrameReader::new(self.byte_order)))
    }

    /// Open the dataset and wrap it in a loader.
    pub fn build_loader(&self) -> Result<DataLoader> {
        let ds = self.open_dataset()?;
        log::info!(
            "opened corpus with {} pairs (input dim {}, output dim {})",
            ds.len(),
            self.input_dim,
            self.output_dim
        );
        DataLoader::new(Arc::new(ds), self.loader_config())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_json() {
        let cfg: CorpusConfig = serde_json::from_str(
            r#"{"input_list": "x.list", "target_list": "y.list", "input_dim": 60, "output_dim": 60}"#,
        )
        .unwrap();
        assert_eq!(cfg, CorpusConfig::new("x.list", "y.list", 60, 60));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_full_json() {
        let cfg: CorpusConfig = serde_json::from_str(
            r#"{
                "input_list": "x.list", "target_list": "y.list",
                "input_dim": 60, "output_dim": 40,
                "batch_size": 4, "shuffle": true, "num_workers": 3,
                "prefetch_factor": 5, "seed": 11, "drop_last": true,
                "byte_order": "little", "align_lists": true
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.byte_order, ByteOrder::Little);
        assert!(cfg.align_lists);

        let lc = cfg.loader_config();
        assert_eq!(lc.batch_size, 4);
        assert!(lc.shuffle);
        assert!(lc.drop_last);
        assert_eq!(lc.num_workers, 3);
        assert_eq!(lc.prefetch_factor, 5);
        assert_eq!(lc.seed, Some(11));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let res: std::result::Result<CorpusConfig, _> = serde_json::from_str(
            r#"{"input_list": "x", "target_list": "y", "input_dim": 1, "output_dim": 1, "shufle": true}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut cfg = CorpusConfig::new("x", "y", 0, 60);
        assert!(matches!(cfg.validate().unwrap_err(), Error::Config(_)));
        cfg.input_dim = 60;
        cfg.batch_size = 0;
        assert!(matches!(cfg.validate().unwrap_err(), Error::Config(_)));
    }

    #[test]
    fn test_missing_config_file() {
        let err = CorpusConfig::from_file("/nonexistent/framepair.json").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
