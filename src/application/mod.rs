//! Application layer containing the ledger operations and the aggregation engine.
//!
//! `WalletService` is the primary entry point. It owns the storage backends, serializes
//! ledger mutations, and hands payment snapshots to the `aggregate` engine, which fans the
//! work out across threads.

pub mod aggregate;
pub mod wallet;
