#![allow(dead_code)]

use std::fs::File;
use std::io::Error;
use std::path::Path;

fn dump_writer(path: &Path) -> Result<csv::Writer<File>, Error> {
    let file = File::create(path)?;
    Ok(csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(file))
}

pub fn write_accounts(dir: &Path, accounts: &[(i64, &str, i64)]) -> Result<(), Error> {
    let mut wtr = dump_writer(&dir.join("accounts.dump"))?;
    for (id, phone, balance) in accounts {
        wtr.write_record([id.to_string(), phone.to_string(), balance.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes `(account_id, amount, category)` payments with ids `p1`, `p2`, ...
pub fn write_payments(dir: &Path, payments: &[(i64, i64, &str)]) -> Result<(), Error> {
    let mut wtr = dump_writer(&dir.join("payments.dump"))?;
    for (i, (account_id, amount, category)) in payments.iter().enumerate() {
        wtr.write_record([
            format!("p{}", i + 1),
            account_id.to_string(),
            amount.to_string(),
            category.to_string(),
            "INPROGRESS".to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes `rows` one-unit payments spread over accounts 1..=4.
pub fn generate_payments(dir: &Path, rows: usize) -> Result<(), Error> {
    write_accounts(dir, &[(1, "1", 0), (2, "2", 0), (3, "3", 0), (4, "4", 0)])?;
    let payments: Vec<(i64, i64, &str)> = (0..rows)
        .map(|i| ((i % 4) as i64 + 1, 1, "auto"))
        .collect();
    write_payments(dir, &payments)
}
