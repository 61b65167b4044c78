//! Domain types of the wallet ledger and the storage ports the application layer depends on.

pub mod account;
pub mod favorite;
pub mod payment;
pub mod ports;
