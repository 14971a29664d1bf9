use std::io::Read;
use std::pin::Pin;

use futures::stream::{self, Stream};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::traits::CommandStream;
use crate::domain::{AccountId, Command, Error};

pub struct CsvReader<R: Read> {
    reader: Option<csv::Reader<R>>,
}

impl<R: Read> CsvReader<R> {
    pub fn new(reader: R) -> Result<Self, Error> {
        let rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        Ok(Self { reader: Some(rdr) })
    }
}

/// Internal shape used only for CSV deserialization.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "type")]
    kind: String,
    from: AccountId,
    to: Option<AccountId>,
    #[serde(with = "rust_decimal::serde::str")]
    amount: Decimal,
}

impl TryFrom<CsvRow> for Command {
    type Error = Error;

    fn try_from(row: CsvRow) -> Result<Self, Self::Error> {
        match (row.kind.trim().to_ascii_lowercase().as_str(), row.to) {
            ("withdraw", _) => Ok(Command::Withdraw {
                account_id: row.from,
                amount: row.amount,
            }),
            ("transfer", Some(to)) => Ok(Command::Transfer {
                from: row.from,
                to,
                amount: row.amount,
            }),
            ("transfer", None) => Err(Error::Ingestion(format!(
                "Transfer from {} is missing a receiving account",
                row.from
            ))),
            (other, _) => Err(Error::Ingestion(format!(
                "Invalid command type: {}",
                other
            ))),
        }
    }
}

impl<R: Read + Send + 'static> CommandStream for CsvReader<R> {
    type CmdStream = Pin<Box<dyn Stream<Item = Result<Command, Error>> + Send>>;

    fn stream(&mut self) -> Self::CmdStream {
        // The stream must own the reader to be 'static.
        let reader = match self.reader.take() {
            Some(r) => r,
            None => return Box::pin(stream::empty::<Result<Command, Error>>()),
        };

        let iter = reader
            .into_deserialize::<CsvRow>()
            .map(|row_res| match row_res {
                Ok(row) => Command::try_from(row),
                Err(e) => Err(Error::Ingestion(format!(
                    "CSV deserialization error: {}",
                    e
                ))),
            });

        Box::pin(stream::iter(iter))
    }
}
