use std::num::NonZeroUsize;

/// Default number of payments each streaming worker sums.
pub const DEFAULT_PROGRESS_CHUNK_SIZE: NonZeroUsize = match NonZeroUsize::new(1_000_000) {
    Some(size) => size,
    None => unreachable!(),
};

/// Tunables for a `WalletService`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletConfig {
    /// Chunk size used by `sum_payments_with_progress`.
    pub progress_chunk_size: NonZeroUsize,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            progress_chunk_size: DEFAULT_PROGRESS_CHUNK_SIZE,
        }
    }
}
