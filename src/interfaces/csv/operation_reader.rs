use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// The movement kinds the CSV interface can request. `Open` seeds a new
/// account with `amount` as its opening balance.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Open,
    Deposit,
    Withdrawal,
    Transfer,
}

/// One row of the operations file. `account` and `counterparty` are the
/// caller's own numbering, mapped to ledger account ids by the driver.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Operation {
    pub op: OperationKind,
    pub account: u64,
    pub counterparty: Option<u64>,
    pub amount: Decimal,
    pub description: Option<String>,
}

/// Reads operations from a CSV source.
///
/// Wraps `csv::Reader` and yields `Result<Operation>` lazily, so large files
/// stream without loading the whole dataset into memory. Whitespace is
/// trimmed and short records tolerated.
pub struct OperationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OperationReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn operations(self) -> impl Iterator<Item = Result<Operation>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(LedgerError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reader_valid_stream() {
        let data = "op, account, counterparty, amount, description\n\
                    open, 1, , 100.0, opening\n\
                    transfer, 1, 2, 25.5, rent";
        let reader = OperationReader::new(data.as_bytes());
        let results: Vec<Result<Operation>> = reader.operations().collect();

        assert_eq!(results.len(), 2);
        let open = results[0].as_ref().unwrap();
        assert_eq!(open.op, OperationKind::Open);
        assert_eq!(open.amount, dec!(100.0));

        let transfer = results[1].as_ref().unwrap();
        assert_eq!(transfer.op, OperationKind::Transfer);
        assert_eq!(transfer.counterparty, Some(2));
        assert_eq!(transfer.description.as_deref(), Some("rent"));
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "op, account, counterparty, amount, description\n\
                    invalid, 1, , 1.0,";
        let reader = OperationReader::new(data.as_bytes());
        let results: Vec<Result<Operation>> = reader.operations().collect();

        assert!(results[0].is_err());
    }
}
