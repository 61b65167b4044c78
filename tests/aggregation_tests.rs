use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::num::NonZeroUsize;
use std::sync::Arc;
use wallet::application::aggregate::{self, WorkerCount, partition};
use wallet::domain::account::Money;
use wallet::domain::payment::{Payment, PaymentStatus};

fn random_payments(rng: &mut StdRng, len: usize) -> Vec<Payment> {
    (0..len)
        .map(|i| Payment {
            id: format!("p{i}"),
            account_id: rng.gen_range(1..=5),
            amount: Money::new(rng.gen_range(-1_000..=1_000_000)),
            category: if rng.gen_bool(0.5) { "auto" } else { "food" }.to_string(),
            status: PaymentStatus::InProgress,
        })
        .collect()
}

#[test]
fn test_partition_covers_input_exactly_once() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let len = rng.gen_range(0..500);
        let workers = rng.gen_range(1..64);
        let mut seen = vec![0u8; len];
        for chunk in partition(len, WorkerCount::new(workers)) {
            for i in chunk.range() {
                seen[i] += 1;
            }
        }
        assert!(seen.iter().all(|&n| n == 1), "len={len} workers={workers}");
    }
}

#[test]
fn test_sum_matches_sequential() {
    let mut rng = StdRng::seed_from_u64(42);
    for len in [0, 1, 7, 100, 1_003] {
        let payments = random_payments(&mut rng, len);
        let expected: Money = payments.iter().map(|p| p.amount).sum();
        for workers in [0, 1, 2, len, len + 5] {
            assert_eq!(
                aggregate::sum(&payments, WorkerCount::new(workers)),
                expected,
                "len={len} workers={workers}"
            );
        }
    }
}

#[test]
fn test_filter_matches_sequential() {
    let mut rng = StdRng::seed_from_u64(1);
    let payments = random_payments(&mut rng, 777);
    for account_id in 1..=5 {
        let expected: Vec<Payment> = payments
            .iter()
            .filter(|p| p.account_id == account_id)
            .cloned()
            .collect();
        for workers in [0, 1, 2, 13, 777, 800] {
            let found =
                aggregate::filter_by_account(&payments, account_id, WorkerCount::new(workers));
            assert_eq!(found, expected, "account={account_id} workers={workers}");
        }
    }
}

#[test]
fn test_predicate_filter_matches_sequential() {
    let mut rng = StdRng::seed_from_u64(3);
    let payments = random_payments(&mut rng, 300);
    let is_food = |p: &Payment| p.category == "food";
    let expected: Vec<Payment> = payments.iter().filter(|p| is_food(*p)).cloned().collect();

    for workers in [0, 4, 301] {
        assert_eq!(
            aggregate::filter_by(&payments, &is_food, WorkerCount::new(workers)),
            expected
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_streaming_total_matches_sequential() {
    let mut rng = StdRng::seed_from_u64(9);
    let payments: Arc<[Payment]> = random_payments(&mut rng, 1_234).into();
    let expected: Money = payments.iter().map(|p| p.amount).sum();

    for size in [1, 100, 1_234, 5_000] {
        let stream =
            aggregate::sum_with_progress(Arc::clone(&payments), NonZeroUsize::new(size).unwrap());
        assert_eq!(stream.worker_count(), 1_234usize.div_ceil(size));
        assert_eq!(stream.total().await, expected, "size={size}");
    }
}
