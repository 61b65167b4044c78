use super::account::{Account, AccountId};
use super::favorite::Favorite;
use super::payment::Payment;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn store(&self, account: Account) -> Result<()>;
    async fn get(&self, account_id: AccountId) -> Result<Option<Account>>;
    async fn exists(&self, account_id: AccountId) -> Result<bool>;
    async fn find_by_phone(&self, phone: &str) -> Result<Option<Account>>;
    async fn last_id(&self) -> Result<Option<AccountId>>;
    async fn all_accounts(&self) -> Result<Vec<Account>>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn store(&self, payment: Payment) -> Result<()>;
    async fn get(&self, payment_id: &str) -> Result<Option<Payment>>;
    /// A consistent read-only view of every payment, in insertion order.
    async fn snapshot(&self) -> Result<Arc<[Payment]>>;
}

#[async_trait]
pub trait FavoriteStore: Send + Sync {
    async fn store(&self, favorite: Favorite) -> Result<()>;
    async fn get(&self, favorite_id: &str) -> Result<Option<Favorite>>;
    async fn all_favorites(&self) -> Result<Vec<Favorite>>;
}

pub type AccountStoreBox = Box<dyn AccountStore>;
pub type PaymentStoreBox = Box<dyn PaymentStore>;
pub type FavoriteStoreBox = Box<dyn FavoriteStore>;
