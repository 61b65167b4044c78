//! Semicolon-separated dump files for accounts, payments and favorites.

pub mod dump_reader;
pub mod dump_writer;

pub const ACCOUNTS_DUMP: &str = "accounts.dump";
pub const PAYMENTS_DUMP: &str = "payments.dump";
pub const FAVORITES_DUMP: &str = "favorites.dump";

/// Record terminator of a dump file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    /// One record per line.
    Newline,
    /// Records terminated by `|`, as in single-file account exports.
    Pipe,
}

impl From<Terminator> for csv::Terminator {
    fn from(terminator: Terminator) -> Self {
        match terminator {
            Terminator::Newline => csv::Terminator::Any(b'\n'),
            Terminator::Pipe => csv::Terminator::Any(b'|'),
        }
    }
}

/// File name of the `page`-th (1-based) paginated payment history dump.
pub fn payments_page(page: usize) -> String {
    format!("payments{page}.dump")
}
