use crate::domain::account::{Account, AccountId};
use crate::domain::favorite::Favorite;
use crate::domain::payment::Payment;
use crate::domain::ports::{AccountStore, FavoriteStore, PaymentStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for accounts.
///
/// Accounts are kept ordered by id, so `all_accounts` and `last_id` are deterministic.
#[derive(Default, Clone)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<BTreeMap<AccountId, Account>>>,
}

impl InMemoryAccountStore {
    /// Creates a new, empty in-memory account store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn store(&self, account: Account) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        accounts.insert(account.id, account);
        Ok(())
    }

    async fn get(&self, account_id: AccountId) -> Result<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(&account_id).cloned())
    }

    async fn exists(&self, account_id: AccountId) -> Result<bool> {
        let accounts = self.accounts.read().await;
        Ok(accounts.contains_key(&account_id))
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.phone == phone).cloned())
    }

    async fn last_id(&self) -> Result<Option<AccountId>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.keys().next_back().copied())
    }

    async fn all_accounts(&self) -> Result<Vec<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().cloned().collect())
    }
}

#[derive(Default)]
struct PaymentLog {
    payments: Vec<Payment>,
    index: HashMap<String, usize>,
}

/// A thread-safe in-memory store for payments.
///
/// Keeps insertion order; storing a payment with a known id replaces it in place.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    log: Arc<RwLock<PaymentLog>>,
}

impl InMemoryPaymentStore {
    /// Creates a new, empty in-memory payment store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn store(&self, payment: Payment) -> Result<()> {
        let mut log = self.log.write().await;
        if let Some(&pos) = log.index.get(&payment.id) {
            log.payments[pos] = payment;
        } else {
            let pos = log.payments.len();
            log.index.insert(payment.id.clone(), pos);
            log.payments.push(payment);
        }
        Ok(())
    }

    async fn get(&self, payment_id: &str) -> Result<Option<Payment>> {
        let log = self.log.read().await;
        Ok(log.index.get(payment_id).map(|&pos| log.payments[pos].clone()))
    }

    async fn snapshot(&self) -> Result<Arc<[Payment]>> {
        let log = self.log.read().await;
        Ok(Arc::from(log.payments.as_slice()))
    }
}

/// A thread-safe in-memory store for favorites, in insertion order.
#[derive(Default, Clone)]
pub struct InMemoryFavoriteStore {
    favorites: Arc<RwLock<Vec<Favorite>>>,
}

impl InMemoryFavoriteStore {
    /// Creates a new, empty in-memory favorite store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FavoriteStore for InMemoryFavoriteStore {
    async fn store(&self, favorite: Favorite) -> Result<()> {
        let mut favorites = self.favorites.write().await;
        match favorites.iter_mut().find(|f| f.id == favorite.id) {
            Some(existing) => *existing = favorite,
            None => favorites.push(favorite),
        }
        Ok(())
    }

    async fn get(&self, favorite_id: &str) -> Result<Option<Favorite>> {
        let favorites = self.favorites.read().await;
        Ok(favorites.iter().find(|f| f.id == favorite_id).cloned())
    }

    async fn all_favorites(&self) -> Result<Vec<Favorite>> {
        let favorites = self.favorites.read().await;
        Ok(favorites.clone())
    }
}
