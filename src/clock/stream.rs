use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::Stream;

use super::{ListenerId, TickingClock, TICK};
use crate::object::Timestamp;

/// A stream of clock ticks
///
/// The stream is registered as a tick listener for as long as it exists,
/// dropping it removes the listener.
pub struct TickStream {
    clock: TickingClock,
    id: ListenerId,
    ticks: UnboundedReceiverStream<Timestamp>,
}

impl TickStream {
    pub(super) fn new(clock: TickingClock) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = clock.on(TICK, move |now| {
            let _ = tx.send(now);
        });

        Self {
            clock,
            id,
            ticks: UnboundedReceiverStream::new(rx),
        }
    }
}

impl Stream for TickStream {
    type Item = Timestamp;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.ticks).poll_next(cx)
    }
}

impl Drop for TickStream {
    fn drop(&mut self) {
        self.clock.off(TICK, self.id);
    }
}
