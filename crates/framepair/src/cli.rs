// Command-line front-end
//
//   framepair iterate --config corpus.json --epochs 2
//   framepair scan --inputs ref.list --targets gen.list --input-dim 60 --output-dim 60
//
// Corpus settings come from a JSON config file, from flags, or both (flags
// win). The subcommands only route to the library.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use framepair::config::CorpusConfig;
use framepair::data::{CorpusStats, Dataset};

#[derive(Parser, Debug)]
#[command(
    name = "framepair",
    version,
    about = "Inspect and iterate paired acoustic feature corpora."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run full passes over the corpus and print every batch's shapes.
    Iterate {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Number of passes.
        #[arg(long, default_value_t = 1)]
        epochs: usize,
    },

    /// Check every pair's frame counts (from file sizes) and print totals.
    Scan {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
}

#[derive(Args, Debug)]
pub struct CorpusArgs {
    /// JSON corpus config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path-list file of input frame files.
    #[arg(long)]
    inputs: Option<PathBuf>,

    /// Path-list file of target frame files.
    #[arg(long)]
    targets: Option<PathBuf>,

    #[arg(long)]
    input_dim: Option<usize>,

    #[arg(long)]
    output_dim: Option<usize>,

    #[arg(long)]
    batch_size: Option<usize>,

    /// Draw a new random order for every pass (`--shuffle false` turns
    /// off a config file's shuffling).
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    shuffle: Option<bool>,

    /// Background decoding threads.
    #[arg(long)]
    workers: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// Truncate the input list to the target list's length.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    align: Option<bool>,
}

impl CorpusArgs {
    /// Merge the config file (if any) with the flags.
    fn resolve(self) -> Result<CorpusConfig> {
        let mut cfg = match &self.config {
            Some(path) => CorpusConfig::from_file(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => {
                let (Some(inputs), Some(targets), Some(input_dim), Some(output_dim)) = (
                    self.inputs.clone(),
                    self.targets.clone(),
                    self.input_dim,
                    self.output_dim,
                ) else {
                    bail!(
                        "without --config, --inputs, --targets, --input-dim and --output-dim are required"
                    );
                };
                CorpusConfig::new(inputs, targets, input_dim, output_dim)
            }
        };

        if let Some(p) = self.inputs {
            cfg.input_list = p;
        }
        if let Some(p) = self.targets {
            cfg.target_list = p;
        }
        if let Some(d) = self.input_dim {
            cfg.input_dim = d;
        }
        if let Some(d) = self.output_dim {
            cfg.output_dim = d;
        }
        if let Some(bs) = self.batch_size {
            cfg.batch_size = bs;
        }
        if let Some(w) = self.workers {
            cfg.num_workers = w;
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        if let Some(s) = self.shuffle {
            cfg.shuffle = s;
        }
        if let Some(a) = self.align {
            cfg.align_lists = a;
        }
        Ok(cfg)
    }
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Command::Iterate { corpus, epochs } => run_iterate(corpus.resolve()?, epochs),
            Command::Scan { corpus } => run_scan(corpus.resolve()?),
        }
    }
}

fn run_iterate(cfg: CorpusConfig, epochs: usize) -> Result<()> {
    let mut loader = cfg.build_loader().context("opening corpus")?;
    for epoch in 0..epochs {
        let start = Instant::now();
        let mut batches = 0;
        for (i, batch) in loader.iter_epoch().enumerate() {
            let batch = batch.with_context(|| format!("epoch {epoch}, batch {i}"))?;
            println!("{i} {} {}", batch.input.shape(), batch.target.shape());
            batches += 1;
        }
        log::info!(
            "epoch {epoch}: {batches} batches in {:.2}s",
            start.elapsed().as_secs_f64()
        );
    }
    Ok(())
}

fn run_scan(cfg: CorpusConfig) -> Result<()> {
    let ds = cfg.open_dataset().context("opening corpus")?;
    let counts = ds.scan().context("scanning corpus")?;
    let stats = CorpusStats::from_frame_counts(&counts);
    println!("dataset:      {}", ds.name());
    println!("pairs:        {}", stats.pairs);
    println!("total frames: {}", stats.total_frames);
    println!("min frames:   {}", stats.min_frames);
    println!("max frames:   {}", stats.max_frames);
    if !stats.uniform_length() && cfg.batch_size > 1 {
        log::warn!(
            "utterance lengths vary; batch_size {} will fail to stack",
            cfg.batch_size
        );
    }
    Ok(())
}
