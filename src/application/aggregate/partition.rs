use crate::error::WalletError;
use std::num::NonZeroUsize;
use std::ops::Range;

/// Upper bound on the workers of one aggregation; each worker is an OS thread.
pub const MAX_WORKERS: usize = 1024;

/// Number of workers requested for an aggregation, at most `MAX_WORKERS`.
///
/// Zero means a single sequential pass over the whole input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct WorkerCount(usize);

impl WorkerCount {
    pub const SEQUENTIAL: Self = Self(0);

    /// Saturates at `MAX_WORKERS`. Use `try_from` to reject out-of-range input instead.
    pub fn new(workers: usize) -> Self {
        Self(workers.min(MAX_WORKERS))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl TryFrom<i64> for WorkerCount {
    type Error = WalletError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match usize::try_from(value) {
            Ok(workers) if workers <= MAX_WORKERS => Ok(Self(workers)),
            _ => Err(WalletError::InvalidWorkerCount(value)),
        }
    }
}

/// A contiguous sub-range of the input assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

impl Chunk {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Splits `len` items across `workers` chunks.
///
/// Every worker but the last gets `len / workers` items; the last one takes the remainder.
/// Workers beyond `len` receive empty chunks and are still returned.
pub fn partition(len: usize, workers: WorkerCount) -> Vec<Chunk> {
    let workers = workers.get();
    if workers == 0 {
        return vec![Chunk {
            index: 0,
            start: 0,
            end: len,
        }];
    }

    let size = len / workers;
    (0..workers)
        .map(|index| Chunk {
            index,
            start: index * size,
            end: if index + 1 == workers {
                len
            } else {
                (index + 1) * size
            },
        })
        .collect()
}

/// Splits `len` items into chunks of at most `size` items.
///
/// Always yields at least one chunk, so an empty input still gets one (empty) worker.
pub fn partition_by_size(len: usize, size: NonZeroUsize) -> Vec<Chunk> {
    let size = size.get();
    let count = len.div_ceil(size).max(1);
    (0..count)
        .map(|index| Chunk {
            index,
            start: (index * size).min(len),
            end: ((index + 1) * size).min(len),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_covers(chunks: &[Chunk], len: usize) {
        let mut next = 0;
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert_eq!(chunk.start, next, "gap or overlap before chunk {i}");
            assert!(chunk.start <= chunk.end);
            next = chunk.end;
        }
        assert_eq!(next, len);
    }

    #[test]
    fn test_partition_coverage() {
        for len in 0..40 {
            for workers in 1..50 {
                let chunks = partition(len, WorkerCount::new(workers));
                assert_eq!(chunks.len(), workers);
                assert_covers(&chunks, len);
            }
        }
    }

    #[test]
    fn test_partition_remainder_goes_last() {
        let chunks = partition(10, WorkerCount::new(3));
        let ranges: Vec<_> = chunks.iter().map(Chunk::range).collect();
        assert_eq!(ranges, vec![0..3, 3..6, 6..10]);
    }

    #[test]
    fn test_partition_more_workers_than_items() {
        let chunks = partition(2, WorkerCount::new(5));
        assert_eq!(chunks.len(), 5);
        assert!(chunks[..4].iter().all(Chunk::is_empty));
        assert_eq!(chunks[4].range(), 0..2);
    }

    #[test]
    fn test_partition_sequential() {
        let chunks = partition(7, WorkerCount::SEQUENTIAL);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].range(), 0..7);
    }

    #[test]
    fn test_partition_by_size() {
        let size = NonZeroUsize::new(4).unwrap();
        assert_covers(&partition_by_size(10, size), 10);
        assert_eq!(partition_by_size(10, size).len(), 3);
        assert_eq!(partition_by_size(8, size).len(), 2);

        let empty = partition_by_size(0, size);
        assert_eq!(empty.len(), 1);
        assert!(empty[0].is_empty());
    }

    #[test]
    fn test_negative_worker_count_rejected() {
        assert!(matches!(
            WorkerCount::try_from(-1),
            Err(WalletError::InvalidWorkerCount(-1))
        ));
        assert_eq!(WorkerCount::try_from(0).unwrap(), WorkerCount::SEQUENTIAL);
    }

    #[test]
    fn test_worker_count_upper_bound() {
        let max = MAX_WORKERS as i64;
        assert_eq!(WorkerCount::try_from(max).unwrap().get(), MAX_WORKERS);
        assert!(matches!(
            WorkerCount::try_from(max + 1),
            Err(WalletError::InvalidWorkerCount(n)) if n == max + 1
        ));
        assert!(matches!(
            WorkerCount::try_from(i64::MAX),
            Err(WalletError::InvalidWorkerCount(i64::MAX))
        ));
        assert_eq!(WorkerCount::new(usize::MAX).get(), MAX_WORKERS);
    }
}
