use super::Terminator;
use crate::error::{Result, WalletError};
use serde::de::DeserializeOwned;
use std::io::Read;

/// Reads semicolon-separated dump records from any `Read` source.
///
/// Dumps carry no header row; fields are matched to struct fields by position.
pub struct DumpReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> DumpReader<R> {
    pub fn new(source: R, terminator: Terminator) -> Self {
        let reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .terminator(terminator.into())
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily deserializes records.
    pub fn records<T: DeserializeOwned>(self) -> impl Iterator<Item = Result<T>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(WalletError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::{Account, Money};

    #[test]
    fn test_reader_piped_accounts() {
        let data = "1;+992000000001;500|2;+992000000002;0|";
        let reader = DumpReader::new(data.as_bytes(), Terminator::Pipe);
        let accounts = reader.records::<Account>().collect::<Result<Vec<_>>>().unwrap();

        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].phone, "+992000000001");
        assert_eq!(accounts[0].balance, Money::new(500));
        assert_eq!(accounts[1].id, 2);
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "1;+992000000001;not_a_number\n";
        let reader = DumpReader::new(data.as_bytes(), Terminator::Newline);
        let results: Vec<Result<Account>> = reader.records::<Account>().collect();

        assert!(results[0].is_err());
    }
}
