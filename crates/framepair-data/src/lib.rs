//! # framepair-data
//!
//! Reading, pairing and batching binary feature frames.
//!
//! This crate provides:
//! - [`FrameReader`]: decodes a headerless `f32` frame file into a
//!   `[dim, frames]` matrix
//! - [`Dataset`] trait: indexed, countable access to [`SamplePair`]s
//! - [`PairedFrameDataset`]: input/target frame files matched by position
//! - [`DataLoader`]: batching and per-pass shuffling, with optional
//!   background prefetching through [`PrefetchQueue`]
//! - [`read_file_list`]: path-list files, one path per line
//! - [`PairedFrameDataset::scan`]: parallel corpus scan, summarised by
//!   [`CorpusStats`]

pub mod dataset;
pub mod file_list;
pub mod loader;
pub mod paired;
pub mod prefetch;
pub mod reader;

pub use dataset::{Dataset, SamplePair};
pub use file_list::{parse_file_list, read_file_list};
pub use loader::{get_loader, Batch, Batches, DataLoader, DataLoaderConfig};
pub use paired::{CorpusStats, PairedFrameDataset};
pub use prefetch::PrefetchQueue;
pub use reader::{
    decode_frames, encode_frames, read_frames, write_frames, ByteOrder, FrameReader,
};
