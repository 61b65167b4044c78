use super::Terminator;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

/// Writes semicolon-separated dump records, without a header row.
pub struct DumpWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> DumpWriter<W> {
    pub fn new(sink: W, terminator: Terminator) -> Self {
        let writer = csv::WriterBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .terminator(terminator.into())
            .from_writer(sink);
        Self { writer }
    }

    pub fn write_records<T: Serialize>(
        &mut self,
        records: impl IntoIterator<Item = T>,
    ) -> Result<()> {
        for record in records {
            self.writer.serialize(record)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
