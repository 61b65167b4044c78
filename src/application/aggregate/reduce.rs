use super::partition::{WorkerCount, partition};
use super::worker::{ByAccount, PaymentFilter, filter_chunk, sum_chunk};
use crate::domain::account::{AccountId, Money};
use crate::domain::payment::Payment;
use std::sync::{Mutex, PoisonError};
use std::thread;
use tracing::debug;

/// Sums every payment amount, one scoped thread per chunk.
///
/// Each worker adds its partial sum into a shared accumulator exactly once. Returns after
/// every worker has joined; a panicking worker, including one whose total overflows,
/// panics the caller.
pub fn sum(payments: &[Payment], workers: WorkerCount) -> Money {
    let chunks = partition(payments.len(), workers);
    debug!(records = payments.len(), workers = chunks.len(), "summing payments");

    let total = Mutex::new(Money::ZERO);
    thread::scope(|s| {
        for chunk in &chunks {
            let total = &total;
            let part = &payments[chunk.range()];
            s.spawn(move || {
                let partial = sum_chunk(part);
                *total.lock().unwrap_or_else(PoisonError::into_inner) += partial;
            });
        }
    });

    total.into_inner().unwrap_or_else(PoisonError::into_inner)
}

/// Collects the payments of `account_id`, in input order.
pub fn filter_by_account(
    payments: &[Payment],
    account_id: AccountId,
    workers: WorkerCount,
) -> Vec<Payment> {
    filter_by(payments, &ByAccount(account_id), workers)
}

/// Collects the payments matched by `filter`, in input order.
///
/// Each worker owns the slot of its chunk, so partial results are concatenated in chunk
/// order no matter which worker finishes first.
pub fn filter_by<F: PaymentFilter + ?Sized>(
    payments: &[Payment],
    filter: &F,
    workers: WorkerCount,
) -> Vec<Payment> {
    let chunks = partition(payments.len(), workers);
    debug!(records = payments.len(), workers = chunks.len(), "filtering payments");

    let mut slots: Vec<Vec<Payment>> = vec![Vec::new(); chunks.len()];
    thread::scope(|s| {
        for (slot, chunk) in slots.iter_mut().zip(&chunks) {
            let part = &payments[chunk.range()];
            s.spawn(move || {
                *slot = filter_chunk(part, filter);
            });
        }
    });

    slots.concat()
}
