use super::aggregate::{self, PaymentFilter, ProgressStream, WorkerCount};
use crate::config::WalletConfig;
use crate::domain::account::{Account, AccountId, Money};
use crate::domain::favorite::Favorite;
use crate::domain::payment::{Payment, PaymentStatus};
use crate::domain::ports::{AccountStoreBox, FavoriteStoreBox, PaymentStoreBox};
use crate::error::{Result, WalletError};
use crate::interfaces::csv::dump_reader::DumpReader;
use crate::interfaces::csv::dump_writer::DumpWriter;
use crate::interfaces::csv::{
    ACCOUNTS_DUMP, FAVORITES_DUMP, PAYMENTS_DUMP, Terminator, payments_page,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// The wallet ledger.
///
/// `WalletService` owns the account, payment and favorite stores. Mutating operations are
/// serialized by an internal lock so that read-check-write sequences (such as a payment
/// debiting a balance) see a consistent state. Aggregations work on a snapshot of the
/// payment store and never hold that lock.
pub struct WalletService {
    accounts: AccountStoreBox,
    payments: PaymentStoreBox,
    favorites: FavoriteStoreBox,
    config: WalletConfig,
    write_lock: Mutex<()>,
}

impl WalletService {
    /// Creates a new `WalletService` with the default configuration.
    ///
    /// # Arguments
    ///
    /// * `accounts` - The store for registered accounts.
    /// * `payments` - The store for payment history.
    /// * `favorites` - The store for favorite payments.
    pub fn new(
        accounts: AccountStoreBox,
        payments: PaymentStoreBox,
        favorites: FavoriteStoreBox,
    ) -> Self {
        Self::with_config(accounts, payments, favorites, WalletConfig::default())
    }

    pub fn with_config(
        accounts: AccountStoreBox,
        payments: PaymentStoreBox,
        favorites: FavoriteStoreBox,
        config: WalletConfig,
    ) -> Self {
        Self {
            accounts,
            payments,
            favorites,
            config,
            write_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    /// Registers a new account for `phone`, failing if the phone is already taken.
    pub async fn register_account(&self, phone: &str) -> Result<Account> {
        let _guard = self.write_lock.lock().await;
        if self.accounts.find_by_phone(phone).await?.is_some() {
            return Err(WalletError::PhoneRegistered);
        }

        let id = self.accounts.last_id().await?.unwrap_or(0) + 1;
        let account = Account::new(id, phone);
        self.accounts.store(account.clone()).await?;
        info!(account_id = id, "registered account");
        Ok(account)
    }

    pub async fn find_account_by_id(&self, account_id: AccountId) -> Result<Account> {
        self.accounts
            .get(account_id)
            .await?
            .ok_or(WalletError::AccountNotFound)
    }

    pub async fn find_payment_by_id(&self, payment_id: &str) -> Result<Payment> {
        self.payments
            .get(payment_id)
            .await?
            .ok_or(WalletError::PaymentNotFound)
    }

    pub async fn find_favorite_by_id(&self, favorite_id: &str) -> Result<Favorite> {
        self.favorites
            .get(favorite_id)
            .await?
            .ok_or(WalletError::FavoriteNotFound)
    }

    /// Adds `amount` to the account balance. A zero deposit is accepted.
    pub async fn deposit(&self, account_id: AccountId, amount: Money) -> Result<()> {
        if amount.is_negative() {
            return Err(WalletError::AmountMustBePositive);
        }

        let _guard = self.write_lock.lock().await;
        let mut account = self.find_account_by_id(account_id).await?;
        account.deposit(amount);
        self.accounts.store(account).await
    }

    /// Debits the account and records an in-progress payment.
    pub async fn pay(
        &self,
        account_id: AccountId,
        amount: Money,
        category: &str,
    ) -> Result<Payment> {
        let _guard = self.write_lock.lock().await;
        self.pay_locked(account_id, amount, category).await
    }

    async fn pay_locked(
        &self,
        account_id: AccountId,
        amount: Money,
        category: &str,
    ) -> Result<Payment> {
        if !amount.is_positive() {
            return Err(WalletError::AmountMustBePositive);
        }

        let previous = self.find_account_by_id(account_id).await?;
        let mut account = previous.clone();
        if !account.withdraw(amount) {
            return Err(WalletError::NotEnoughBalance);
        }

        let payment = Payment::new(account_id, amount, category);
        self.accounts.store(account).await?;
        if let Err(e) = self.payments.store(payment.clone()).await {
            // No debit without a recorded payment.
            warn!(account_id, error = %e, "payment not recorded, restoring balance");
            self.accounts.store(previous).await?;
            return Err(e);
        }
        info!(account_id, payment_id = %payment.id, %amount, "payment accepted");
        Ok(payment)
    }

    /// Marks a payment as failed and refunds it. Rejecting a failed payment does nothing.
    pub async fn reject(&self, payment_id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut payment = self.find_payment_by_id(payment_id).await?;
        if payment.status == PaymentStatus::Fail {
            return Ok(());
        }

        let mut account = self.find_account_by_id(payment.account_id).await?;
        payment.status = PaymentStatus::Fail;
        account.deposit(payment.amount);
        self.payments.store(payment).await?;
        self.accounts.store(account).await?;
        info!(payment_id, "payment rejected");
        Ok(())
    }

    /// Pays again with the account, amount and category of an earlier payment.
    pub async fn repeat(&self, payment_id: &str) -> Result<Payment> {
        let _guard = self.write_lock.lock().await;
        let original = self.find_payment_by_id(payment_id).await?;
        self.pay_locked(original.account_id, original.amount, &original.category)
            .await
    }

    pub async fn favorite_payment(&self, payment_id: &str, name: &str) -> Result<Favorite> {
        let payment = self.find_payment_by_id(payment_id).await?;
        let favorite = Favorite::from_payment(&payment, name);
        self.favorites.store(favorite.clone()).await?;
        Ok(favorite)
    }

    pub async fn pay_from_favorite(&self, favorite_id: &str) -> Result<Payment> {
        let _guard = self.write_lock.lock().await;
        let favorite = self.find_favorite_by_id(favorite_id).await?;
        self.pay_locked(favorite.account_id, favorite.amount, &favorite.category)
            .await
    }

    /// Returns copies of the account's payments in the order they were made.
    pub async fn export_account_history(&self, account_id: AccountId) -> Result<Vec<Payment>> {
        let account = self.find_account_by_id(account_id).await?;
        let snapshot = self.payments.snapshot().await?;
        Ok(snapshot
            .iter()
            .filter(|p| p.account_id == account.id)
            .cloned()
            .collect())
    }

    /// Sums every payment amount using `workers` threads (`0` for a sequential pass).
    pub async fn sum_payments(&self, workers: i64) -> Result<Money> {
        let workers = WorkerCount::try_from(workers)?;
        let snapshot = self.payments.snapshot().await?;
        run_blocking(move || aggregate::sum(&snapshot, workers)).await
    }

    /// Returns the payments of `account_id` in their original order.
    pub async fn filter_payments(
        &self,
        account_id: AccountId,
        workers: i64,
    ) -> Result<Vec<Payment>> {
        let workers = WorkerCount::try_from(workers)?;
        if !self.accounts.exists(account_id).await? {
            return Err(WalletError::AccountNotFound);
        }

        let snapshot = self.payments.snapshot().await?;
        run_blocking(move || aggregate::filter_by_account(&snapshot, account_id, workers)).await
    }

    /// Returns the payments accepted by `filter` in their original order.
    pub async fn filter_payments_by_fn<F>(&self, filter: F, workers: i64) -> Result<Vec<Payment>>
    where
        F: PaymentFilter + 'static,
    {
        let workers = WorkerCount::try_from(workers)?;
        let snapshot = self.payments.snapshot().await?;
        run_blocking(move || aggregate::filter_by(&snapshot, &filter, workers)).await
    }

    /// Sums every payment in chunks of `progress_chunk_size`, streaming one message per chunk.
    pub async fn sum_payments_with_progress(&self) -> Result<ProgressStream> {
        let snapshot = self.payments.snapshot().await?;
        Ok(aggregate::sum_with_progress(
            snapshot,
            self.config.progress_chunk_size,
        ))
    }

    /// Writes all accounts to a single file as `|`-terminated records.
    pub async fn export_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref().to_path_buf();
        let accounts = self.accounts.all_accounts().await?;
        let count = accounts.len();
        spawn_write_dump(path.clone(), Terminator::Pipe, accounts).await?;
        info!(path = %path.display(), count, "exported accounts");
        Ok(())
    }

    /// Reads accounts written by `export_to_file`, skipping ids that already exist.
    pub async fn import_from_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let accounts: Vec<Account> =
            spawn_read_dump(path.as_ref().to_path_buf(), Terminator::Pipe).await?;
        self.import_accounts(accounts).await
    }

    /// Writes `accounts.dump`, `payments.dump` and `favorites.dump` into `dir`.
    ///
    /// A file is only written when its collection is non-empty.
    pub async fn export(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        let accounts = self.accounts.all_accounts().await?;
        let payments = self.payments.snapshot().await?;
        let favorites = self.favorites.all_favorites().await?;

        let counts = (accounts.len(), payments.len(), favorites.len());

        if !accounts.is_empty() {
            spawn_write_dump(dir.join(ACCOUNTS_DUMP), Terminator::Newline, accounts).await?;
        }
        if !payments.is_empty() {
            spawn_write_dump(dir.join(PAYMENTS_DUMP), Terminator::Newline, payments).await?;
        }
        if !favorites.is_empty() {
            spawn_write_dump(dir.join(FAVORITES_DUMP), Terminator::Newline, favorites).await?;
        }

        info!(
            dir = %dir.display(),
            accounts = counts.0,
            payments = counts.1,
            favorites = counts.2,
            "exported ledger"
        );
        Ok(())
    }

    /// Loads whichever dump files exist in `dir`. Records with a known id are skipped.
    pub async fn import(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();

        let path = dir.join(ACCOUNTS_DUMP);
        if tokio::fs::try_exists(&path).await? {
            let accounts: Vec<Account> = spawn_read_dump(path, Terminator::Newline).await?;
            self.import_accounts(accounts).await?;
        }

        let path = dir.join(PAYMENTS_DUMP);
        if tokio::fs::try_exists(&path).await? {
            let payments: Vec<Payment> = spawn_read_dump(path, Terminator::Newline).await?;
            let _guard = self.write_lock.lock().await;
            let known: HashSet<String> = self
                .payments
                .snapshot()
                .await?
                .iter()
                .map(|p| p.id.clone())
                .collect();
            for payment in payments {
                if known.contains(&payment.id) {
                    warn!(payment_id = %payment.id, "skipping already known payment");
                    continue;
                }
                self.payments.store(payment).await?;
            }
        }

        let path = dir.join(FAVORITES_DUMP);
        if tokio::fs::try_exists(&path).await? {
            let favorites: Vec<Favorite> = spawn_read_dump(path, Terminator::Newline).await?;
            let _guard = self.write_lock.lock().await;
            for favorite in favorites {
                if self.favorites.get(&favorite.id).await?.is_some() {
                    warn!(favorite_id = %favorite.id, "skipping already known favorite");
                    continue;
                }
                self.favorites.store(favorite).await?;
            }
        }

        info!(dir = %dir.display(), "imported ledger");
        Ok(())
    }

    /// Writes `payments` into `dir`, at most `records` per file.
    ///
    /// A history that fits in one file goes to `payments.dump`; a longer one is split into
    /// `payments1.dump`, `payments2.dump`, and so on. An empty history writes nothing.
    pub fn history_to_files(
        &self,
        payments: &[Payment],
        dir: impl AsRef<Path>,
        records: usize,
    ) -> Result<()> {
        if records == 0 {
            return Err(WalletError::ValidationError(
                "records per file must be greater than zero".to_string(),
            ));
        }

        let dir = dir.as_ref();
        if payments.is_empty() {
            return Ok(());
        }
        if payments.len() <= records {
            return write_dump(&dir.join(PAYMENTS_DUMP), Terminator::Newline, payments);
        }

        for (i, page) in payments.chunks(records).enumerate() {
            write_dump(&dir.join(payments_page(i + 1)), Terminator::Newline, page)?;
        }
        Ok(())
    }

    async fn import_accounts(&self, accounts: Vec<Account>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        for account in accounts {
            if self.accounts.exists(account.id).await? {
                warn!(account_id = account.id, "skipping already known account");
                continue;
            }
            self.accounts.store(account).await?;
        }
        Ok(())
    }
}

/// Runs `f` on the blocking pool, re-raising any panic in the calling task.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(value) => Ok(value),
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => Err(WalletError::IoError(std::io::Error::other(e))),
    }
}

fn write_dump<T: Serialize>(path: &Path, terminator: Terminator, records: &[T]) -> Result<()> {
    let file = File::create(path)?;
    DumpWriter::new(file, terminator).write_records(records)
}

fn read_dump<T: DeserializeOwned>(path: &Path, terminator: Terminator) -> Result<Vec<T>> {
    let file = File::open(path)?;
    DumpReader::new(file, terminator).records::<T>().collect()
}

/// `write_dump` on the blocking pool.
async fn spawn_write_dump<T, R>(path: PathBuf, terminator: Terminator, records: R) -> Result<()>
where
    T: Serialize + 'static,
    R: AsRef<[T]> + Send + 'static,
{
    run_blocking(move || write_dump(&path, terminator, records.as_ref())).await?
}

/// `read_dump` on the blocking pool.
async fn spawn_read_dump<T>(path: PathBuf, terminator: Terminator) -> Result<Vec<T>>
where
    T: DeserializeOwned + Send + 'static,
{
    run_blocking(move || read_dump(&path, terminator)).await?
}
