//! Concurrent payment aggregation.
//!
//! A payment snapshot is split into contiguous chunks (`partition`), each chunk is handed to
//! its own thread (`worker`), and the partial results are combined either synchronously
//! (`reduce`) or streamed over a channel as workers finish (`progress`).

pub mod partition;
pub mod progress;
pub mod reduce;
pub mod worker;

pub use partition::{Chunk, MAX_WORKERS, WorkerCount, partition, partition_by_size};
pub use progress::{Progress, ProgressStream, sum_with_progress};
pub use reduce::{filter_by, filter_by_account, sum};
pub use worker::{ByAccount, PaymentFilter};
