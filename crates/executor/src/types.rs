use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;

use super::error::Error;

/// A contract for any source that generates and streams quotes into the pipeline.
///
/// Decouples the producer task from the concrete source (CSV file vs. simulated data).
/// The bounds are required so implementations can run on the multi-threaded Tokio runtime.
#[async_trait::async_trait]
pub trait UpdateStreamer: Send + Sync + 'static {
    async fn run_stream(self, sender: Sender<Vec<Quote>>) -> Result<(), Error>;
}

/// One bid/ask quote for a currency pair at a point in time.
///
/// `bid` is what one unit of `base` sells for in `quote`; `ask` is what one unit of `base`
/// costs in `quote`.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub base: String,
    pub quote: String,
    pub ask: f64,
    pub bid: f64,
    pub timestamp: u64,
}

impl Quote {
    /// Label of the `base -> quote` conversion, traded at the bid.
    pub fn pair_label(&self) -> String {
        format!("{}/{}", self.base, self.quote)
    }

    /// Label of the `quote -> base` conversion, traded at the ask.
    pub fn inverse_label(&self) -> String {
        format!("{}/{}", self.quote, self.base)
    }

    /// Units of `quote` received per unit of `base`.
    pub fn sell_rate(&self) -> f64 {
        self.bid
    }

    /// Units of `base` received per unit of `quote`.
    pub fn buy_rate(&self) -> f64 {
        1.0 / self.ask
    }
}

/// Where quotes come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Sim,
    Csv(String),
}

pub type JoinHandleResult<T = ()> = JoinHandle<Result<T, Error>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_directions() {
        let quote = Quote {
            base: "EUR".to_string(),
            quote: "USD".to_string(),
            ask: 1.25,
            bid: 1.2,
            timestamp: 1,
        };

        assert_eq!(quote.pair_label(), "EUR/USD");
        assert_eq!(quote.inverse_label(), "USD/EUR");
        assert_eq!(quote.sell_rate(), 1.2);
        assert_eq!(quote.buy_rate(), 0.8);
        // A round trip through the spread always loses.
        assert!(quote.sell_rate() * quote.buy_rate() < 1.0);
    }
}
