use crate::domain::account::{AccountId, Money};
use crate::domain::payment::Payment;

/// Caller-supplied matching capability for `filter_by`.
///
/// Implementations are invoked concurrently from several worker threads, once per payment,
/// with no ordering between chunks. They must not rely on side effects; if they do, the
/// resulting races are the caller's problem.
pub trait PaymentFilter: Send + Sync {
    fn matches(&self, payment: &Payment) -> bool;
}

impl<F> PaymentFilter for F
where
    F: Fn(&Payment) -> bool + Send + Sync,
{
    fn matches(&self, payment: &Payment) -> bool {
        self(payment)
    }
}

/// Matches payments owned by one account.
#[derive(Debug, Clone, Copy)]
pub struct ByAccount(pub AccountId);

impl PaymentFilter for ByAccount {
    fn matches(&self, payment: &Payment) -> bool {
        payment.account_id == self.0
    }
}

pub fn sum_chunk(chunk: &[Payment]) -> Money {
    chunk.iter().map(|payment| payment.amount).sum()
}

/// Copies the matching payments of `chunk`, preserving their order.
pub fn filter_chunk<F: PaymentFilter + ?Sized>(chunk: &[Payment], filter: &F) -> Vec<Payment> {
    chunk
        .iter()
        .filter(|payment| filter.matches(payment))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(account_id: AccountId, amount: i64) -> Payment {
        Payment::new(account_id, Money::new(amount), "auto")
    }

    #[test]
    fn test_sum_chunk() {
        let chunk = vec![payment(1, 100), payment(2, -30), payment(1, 5)];
        assert_eq!(sum_chunk(&chunk), Money::new(75));
        assert_eq!(sum_chunk(&[]), Money::ZERO);
    }

    #[test]
    fn test_filter_chunk_keeps_order() {
        let chunk = vec![payment(1, 1), payment(2, 2), payment(1, 3)];
        let matched = filter_chunk(&chunk, &ByAccount(1));
        assert_eq!(matched, vec![chunk[0].clone(), chunk[2].clone()]);
    }

    #[test]
    fn test_closure_filter() {
        let chunk = vec![payment(1, 1), payment(2, 200)];
        let large = |p: &Payment| p.amount > Money::new(100);
        assert_eq!(filter_chunk(&chunk, &large), vec![chunk[1].clone()]);
    }
}
