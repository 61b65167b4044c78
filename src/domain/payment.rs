use super::account::{AccountId, Money};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
pub enum PaymentStatus {
    #[default]
    #[serde(rename = "INPROGRESS")]
    InProgress,
    #[serde(rename = "FAIL")]
    Fail,
}

/// A single payment made from an account.
///
/// Field order matches the dump layout `id;account_id;amount;category;status`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Payment {
    pub id: String,
    pub account_id: AccountId,
    pub amount: Money,
    pub category: String,
    pub status: PaymentStatus,
}

impl Payment {
    pub fn new(account_id: AccountId, amount: Money, category: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            account_id,
            amount,
            category: category.into(),
            status: PaymentStatus::InProgress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_dump_row() {
        let row = "p1;3;250;mobile;FAIL\n";
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .from_reader(row.as_bytes());

        let payment: Payment = reader
            .deserialize()
            .next()
            .unwrap()
            .expect("Failed to deserialize payment");

        assert_eq!(payment.id, "p1");
        assert_eq!(payment.account_id, 3);
        assert_eq!(payment.amount, Money::new(250));
        assert_eq!(payment.status, PaymentStatus::Fail);
    }

    #[test]
    fn test_new_payment_is_in_progress() {
        let a = Payment::new(1, Money::new(10), "auto");
        let b = Payment::new(1, Money::new(10), "auto");
        assert_eq!(a.status, PaymentStatus::InProgress);
        assert_ne!(a.id, b.id);
    }
}
