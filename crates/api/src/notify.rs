//! Hands booking events to a background task, off the request path.

use tirebook_core::{models::booking::BookingEvent, store::NotificationSink};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{info, warn};

const CHANNEL_CAPACITY: usize = 256;

/// Sink that queues events for the drain task without waiting.
#[derive(Clone)]
pub struct ChannelNotifier {
    tx: mpsc::Sender<BookingEvent>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::Receiver<BookingEvent>) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelNotifier {
    fn emit(&self, event: BookingEvent) {
        if let Err(err) = self.tx.try_send(event) {
            warn!(error = %err, "booking notification dropped");
        }
    }
}

/// Starts the task that delivers queued events. It ends once every
/// notifier is dropped.
pub fn spawn_drain(mut rx: mpsc::Receiver<BookingEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            info!(booking_id = %event.booking_id, event = ?event.event_type, "booking notification");
        }
    })
}
