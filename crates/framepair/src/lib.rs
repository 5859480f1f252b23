//! # framepair
//!
//! Load paired acoustic feature files (input features and target features)
//! and serve them to a training loop as `[batch, dim, frames]` tensors.
//!
//! This is the top-level facade crate that re-exports everything you need.
//!
//! ## Usage
//!
//! ```no_run
//! use framepair::prelude::*;
//!
//! # fn main() -> framepair::Result<()> {
//! let config = CorpusConfig::from_file("corpus.json")?;
//! let mut loader = config.build_loader()?;
//! for batch in loader.iter_epoch() {
//!     let batch = batch?;
//!     println!("{} {}", batch.input.shape(), batch.target.shape());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! | Crate | Purpose |
//! |-------|----------|
//! | `framepair-core` | Shape, dense f32 Tensor, Error |
//! | `framepair-data` | Frame file codec, PairedFrameDataset, DataLoader, PrefetchQueue |
//! | `framepair` | Re-exports, JSON corpus config, `framepair` CLI |

/// Re-export core types.
pub use framepair_core::{Error, Result, Shape, Tensor};

/// Re-export the data pipeline.
pub mod data {
    pub use framepair_data::*;
}

/// Corpus configuration files.
pub mod config;

/// Prelude: import this for the most common types.
pub mod prelude {
    pub use crate::config::CorpusConfig;
    pub use crate::data::{
        get_loader, read_frames, Batch, ByteOrder, CorpusStats, DataLoader, DataLoaderConfig,
        Dataset, FrameReader, PairedFrameDataset, SamplePair,
    };
    pub use crate::{Error, Result, Shape, Tensor};
}
