use tokio::sync::mpsc::Sender;
use tracing::info;

use super::types::{JoinHandleResult, Quote, UpdateStreamer};

pub struct Producer<S: UpdateStreamer> {
    streamer: S,
}

impl<S> Producer<S>
where
    S: UpdateStreamer,
{
    pub fn new(streamer: S) -> Self {
        Producer { streamer }
    }

    /// Runs the streamer on its own task, feeding `sender`.
    pub fn spawn(self, sender: Sender<Vec<Quote>>) -> JoinHandleResult {
        info!("Producer ready.");
        tokio::spawn(async move { self.streamer.run_stream(sender).await })
    }
}
