use crate::domain::account::Account;
use crate::error::Result;
use std::io::Write;

/// Writes final account states as CSV: `account,balance,active`.
pub struct BalanceWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BalanceWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_accounts(&mut self, accounts: &[Account]) -> Result<()> {
        self.writer.write_record(["account", "balance", "active"])?;
        for account in accounts {
            self.writer.write_record([
                account.id.to_string(),
                account.balance.to_string(),
                account.active.to_string(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
