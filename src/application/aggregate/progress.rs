use super::partition::partition_by_size;
use super::worker::sum_chunk;
use crate::domain::account::Money;
use crate::domain::payment::Payment;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Partial result reported by one streaming worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Number of payments in the worker's chunk.
    pub part: usize,
    /// Sum of the chunk's amounts.
    pub result: Money,
}

/// Receiving end of a streaming summation.
///
/// Yields one `Progress` per worker in completion order, then `None` once every worker has
/// reported. Not restartable.
pub struct ProgressStream {
    rx: mpsc::Receiver<Progress>,
    workers: Vec<JoinHandle<()>>,
    dispatched: usize,
}

impl ProgressStream {
    /// Receives the next message, or `None` when all workers are done.
    ///
    /// If any worker panicked, the panic is resumed here once the channel has closed.
    pub async fn recv(&mut self) -> Option<Progress> {
        if let Some(progress) = self.rx.recv().await {
            return Some(progress);
        }
        for worker in self.workers.drain(..) {
            if let Err(e) = worker.await
                && e.is_panic()
            {
                std::panic::resume_unwind(e.into_panic());
            }
        }
        None
    }

    /// Drains the stream and adds up every partial sum.
    pub async fn total(mut self) -> Money {
        let mut total = Money::ZERO;
        while let Some(progress) = self.recv().await {
            total += progress.result;
        }
        total
    }

    /// Number of workers dispatched for this stream.
    pub fn worker_count(&self) -> usize {
        self.dispatched
    }
}

/// Sums `payments` in chunks of `chunk_size`, reporting each chunk as it completes.
///
/// Must be called from within a tokio runtime. The channel holds one slot per worker, so no
/// worker ever waits on a slow or absent consumer; dropping the stream does not stop them.
pub fn sum_with_progress(payments: Arc<[Payment]>, chunk_size: NonZeroUsize) -> ProgressStream {
    let chunks = partition_by_size(payments.len(), chunk_size);
    debug!(
        records = payments.len(),
        workers = chunks.len(),
        "summing payments with progress"
    );

    let (tx, rx) = mpsc::channel(chunks.len());
    let dispatched = chunks.len();
    let workers = chunks
        .into_iter()
        .map(|chunk| {
            let tx = tx.clone();
            let payments = Arc::clone(&payments);
            tokio::task::spawn_blocking(move || {
                let part = &payments[chunk.range()];
                let progress = Progress {
                    part: part.len(),
                    result: sum_chunk(part),
                };
                // The consumer may already be gone.
                let _ = tx.try_send(progress);
            })
        })
        .collect();

    ProgressStream {
        rx,
        workers,
        dispatched,
    }
}
