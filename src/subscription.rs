//! Explicit subscription handles over watched values
//!
//! A subscription is a stream plus a [`Cancel`] handle. The stream ends as soon
//! as the handle is cancelled or dropped, so the owner of a view can detach it
//! deterministically during teardown.

use futures::stream::{BoxStream, StreamExt};
use tokio::sync::{oneshot, watch};

/// Handle that ends its paired stream when cancelled or dropped
#[derive(Debug)]
pub struct Cancel {
    sender: oneshot::Sender<()>,
}

impl Cancel {
    /// Ends the paired stream
    pub fn cancel(self) {
        let _ = self.sender.send(());
    }
}

/// Turns a watch receiver into a stream of its values
///
/// The first item is the value current at subscription time, then one item
/// per change. The stream ends when the sender side is dropped.
pub fn watch_stream<T>(receiver: watch::Receiver<T>) -> BoxStream<'static, T>
where
    T: Clone + Send + Sync + 'static,
{
    futures::stream::unfold((receiver, true), |(mut receiver, first)| async move {
        if !first {
            receiver.changed().await.ok()?;
        }
        let value = receiver.borrow_and_update().clone();
        Some((value, (receiver, false)))
    })
    .boxed()
}

/// Subscribes to a watch receiver with an explicit cancel handle
pub fn subscribe<T>(receiver: watch::Receiver<T>) -> (BoxStream<'static, T>, Cancel)
where
    T: Clone + Send + Sync + 'static,
{
    let (sender, cancelled) = oneshot::channel();
    let stream = watch_stream(receiver).take_until(cancelled).boxed();
    (stream, Cancel { sender })
}
