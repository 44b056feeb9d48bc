use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use super::{EventSink, PayoutEvent};

const DEFAULT_BUFFER_SIZE: usize = 100;

/// Fans events out to every live subscriber. Nothing is buffered for
/// subscribers that join later.
#[derive(Clone)]
pub struct BroadcastEventSink {
    event_sender: broadcast::Sender<PayoutEvent>,
}

impl BroadcastEventSink {
    pub fn new() -> Self {
        Self::with_buffer_size(DEFAULT_BUFFER_SIZE)
    }

    pub fn with_buffer_size(buffer_size: usize) -> Self {
        let (event_sender, _) = broadcast::channel(buffer_size);
        Self { event_sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PayoutEvent> {
        self.event_sender.subscribe()
    }

    pub fn events(&self) -> BroadcastStream<PayoutEvent> {
        BroadcastStream::new(self.subscribe())
    }
}

impl Default for BroadcastEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for BroadcastEventSink {
    fn emit(&self, event: PayoutEvent) {
        // No subscribers is not an error.
        let _ = self.event_sender.send(event);
    }
}
