use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use tokio::sync::mpsc::Sender;
use tracing::{error, info};

use super::error::Error;
use super::types::{Quote, UpdateStreamer};

/// Column layout of a Polygon.io forex quotes export.
const NUM_COLUMNS: usize = 5;
const TICKER_COLUMN: usize = 1;
const ASK_COLUMN: usize = 2;
const BID_COLUMN: usize = 3;
const TIMESTAMP_COLUMN: usize = 4;

/// Tickers look like `C:EUR-USD`.
const TICKER_LEN: usize = 9;

/// Streams quotes from a Polygon.io style CSV file, in file order.
///
/// Reading stops at the first malformed row; quotes read before it are still delivered.
pub struct CsvStreamer {
    path: String,
    batch_size: usize,
}

impl CsvStreamer {
    pub fn new(path: String, batch_size: usize) -> Self {
        CsvStreamer { path, batch_size }
    }

    fn open(&self) -> Result<csv::Reader<File>, Error> {
        let file = File::open(&self.path).map_err(|e| {
            error!("Failed to read file {}: {:?}", self.path, e);
            Error::IoError(e)
        })?;

        Ok(ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file))
    }

    /// Reads every quote in the file.
    pub fn read_quotes(&self) -> Result<Vec<Quote>, Error> {
        let mut rdr = self.open()?;
        rdr.records()
            .map(|result| parse_record(&result?))
            .collect()
    }
}

/// Converts one CSV row into a quote, rejecting anything the detectors should never see.
pub fn parse_record(record: &StringRecord) -> Result<Quote, Error> {
    let line = record.position().map_or(0, |p| p.line());
    let malformed = |reason: String| Error::MalformedRecord { line, reason };

    if record.len() != NUM_COLUMNS {
        return Err(malformed(format!(
            "expected {} columns, found {}",
            NUM_COLUMNS,
            record.len()
        )));
    }

    let number = |column: usize| -> Result<f64, Error> {
        let field = record[column].trim();
        field
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && *value > 0.0)
            .ok_or_else(|| malformed(format!("invalid price {:?}", field)))
    };
    let ask = number(ASK_COLUMN)?;
    let bid = number(BID_COLUMN)?;

    let timestamp_field = record[TIMESTAMP_COLUMN].trim();
    let timestamp = timestamp_field
        .parse::<u64>()
        .map_err(|_| malformed(format!("invalid timestamp {:?}", timestamp_field)))?;

    let ticker = record[TICKER_COLUMN].trim();
    let (base, quote) = match (ticker.len(), ticker.get(2..5), ticker.get(6..9)) {
        (TICKER_LEN, Some(base), Some(quote)) => (base, quote),
        _ => return Err(malformed(format!("malformed ticker {:?}", ticker))),
    };

    Ok(Quote {
        base: base.to_string(),
        quote: quote.to_string(),
        ask,
        bid,
        timestamp,
    })
}

#[async_trait::async_trait]
impl UpdateStreamer for CsvStreamer {
    async fn run_stream(self, sender: Sender<Vec<Quote>>) -> Result<(), Error> {
        let mut rdr = self.open()?;
        let mut batch: Vec<Quote> = Vec::with_capacity(self.batch_size);
        let mut quotes_sent = 0;
        let mut outcome = Ok(());

        info!("CsvStreamer: Streaming quotes from {}...", self.path);

        for result in rdr.records() {
            match result.map_err(Error::from).and_then(|record| parse_record(&record)) {
                Ok(quote) => batch.push(quote),
                Err(e) => {
                    error!("CsvStreamer: stopping at bad row: {}", e);
                    outcome = Err(e);
                    break;
                }
            }

            if batch.len() >= self.batch_size {
                quotes_sent += batch.len();
                let full = std::mem::replace(&mut batch, Vec::with_capacity(self.batch_size));
                if sender.send(full).await.is_err() {
                    info!("CsvStreamer shutting down: searcher receiver dropped.");
                    return Err(Error::ChannelSendFailed);
                }
            }
        }

        if !batch.is_empty() {
            quotes_sent += batch.len();
            if sender.send(batch).await.is_err() {
                info!("CsvStreamer shutting down: searcher receiver dropped.");
                return Err(Error::ChannelSendFailed);
            }
        }

        info!("CsvStreamer: Successfully transferred {} quotes.", quotes_sent);
        outcome
    }
}
