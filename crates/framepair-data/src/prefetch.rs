// PrefetchQueue: background workers decoding samples ahead of the consumer
//
// A fixed pool of threads pulls (position, index) jobs from a shared queue,
// decodes the sample with `Dataset::get`, and pushes (position, result) onto
// a bounded completion channel. Results may arrive out of order; the consumer
// parks early arrivals in a reorder buffer and hands samples out strictly by
// position, so a pass yields the same order with or without workers.
//
//   consumer ──jobs──▶ [worker 0..n] ──results──▶ reorder buffer ──▶ take(pos)
//
// At most `window` positions are dispatched ahead of the one being taken,
// which bounds both the channel and the reorder buffer.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use framepair_core::{Error, Result};

use crate::dataset::{Dataset, SamplePair};

type Job = (usize, usize);
type Completion = (usize, Result<SamplePair>);

/// Worker pool that prefetches the samples of one pass in order.
///
/// Workers are joined when the queue is dropped.
pub struct PrefetchQueue {
    order: Vec<usize>,
    window: usize,
    dispatched: usize,
    jobs: Option<mpsc::Sender<Job>>,
    results: mpsc::Receiver<Completion>,
    pending: BTreeMap<usize, Result<SamplePair>>,
    handles: Vec<thread::JoinHandle<()>>,
}

impl PrefetchQueue {
    /// Spawn `workers` threads serving the samples listed in `order`.
    ///
    /// `window` is the number of samples allowed in flight, clamped to
    /// `1..=order.len()`.
    pub fn spawn(
        dataset: Arc<dyn Dataset>,
        order: Vec<usize>,
        workers: usize,
        window: usize,
    ) -> Self {
        let workers = workers.max(1);
        let window = window.min(order.len()).max(1);

        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (result_tx, result_rx) = mpsc::sync_channel::<Completion>(window);
        let job_rx = Arc::new(Mutex::new(job_rx));

        log::debug!(
            "spawning {workers} prefetch workers for {} samples (window {window})",
            order.len()
        );

        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let jobs = Arc::clone(&job_rx);
            let tx = result_tx.clone();
            let ds = Arc::clone(&dataset);
            handles.push(thread::spawn(move || worker_loop(&*ds, &jobs, &tx)));
        }

        // Only the workers hold senders, so the channel closes when they exit.
        drop(result_tx);

        Self {
            order,
            window,
            dispatched: 0,
            jobs: Some(job_tx),
            results: result_rx,
            pending: BTreeMap::new(),
            handles,
        }
    }

    /// Queue jobs up to `position + window`.
    fn dispatch(&mut self, position: usize) {
        let Some(jobs) = self.jobs.as_ref() else {
            return;
        };
        let limit = self.order.len().min(position + self.window);
        while self.dispatched < limit {
            let pos = self.dispatched;
            if jobs.send((pos, self.order[pos])).is_err() {
                break;
            }
            self.dispatched += 1;
        }
    }

    /// Block until the sample at `position` of the pass is decoded.
    ///
    /// Positions must be taken in increasing order, each exactly once.
    pub fn take(&mut self, position: usize) -> Result<SamplePair> {
        if position >= self.order.len() {
            return Err(Error::IndexOutOfRange {
                index: position,
                len: self.order.len(),
            });
        }
        self.dispatch(position);
        loop {
            if let Some(result) = self.pending.remove(&position) {
                return result;
            }
            match self.results.recv() {
                Ok((pos, result)) => {
                    self.pending.insert(pos, result);
                }
                Err(_) => {
                    return Err(Error::Worker(format!(
                        "workers exited before delivering sample at position {position}"
                    )))
                }
            }
        }
    }
}

impl Drop for PrefetchQueue {
    fn drop(&mut self) {
        // Closing the job queue lets idle workers fall out of `recv`.
        self.jobs.take();
        // In-flight work never exceeds the channel capacity, so no worker
        // can be stuck on `send` here.
        for h in self.handles.drain(..) {
            let _ = h.join();
        }
    }
}

fn worker_loop(
    dataset: &dyn Dataset,
    jobs: &Mutex<mpsc::Receiver<Job>>,
    results: &mpsc::SyncSender<Completion>,
) {
    loop {
        let job = match jobs.lock() {
            Ok(rx) => rx.recv(),
            Err(_) => break,
        };
        let Ok((position, index)) = job else {
            break; // queue closed
        };

        let result = panic::catch_unwind(AssertUnwindSafe(|| dataset.get(index)))
            .unwrap_or_else(|_| {
                Err(Error::Worker(format!(
                    "worker panicked while loading sample {index}"
                )))
            });

        if results.send((position, result)).is_err() {
            break; // consumer gone
        }
    }
}
