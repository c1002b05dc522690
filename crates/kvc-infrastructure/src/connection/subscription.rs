//! Channel subscription handle

use futures::Stream;
use kvc_domain::ports::ChannelStream;
use kvc_domain::value_objects::ChannelMessage;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};
use tracing::debug;

/// Stream of messages on one channel
///
/// Never ends on its own. [`cancel`](Subscription::cancel), cancelling the
/// token from [`cancellation_token`](Subscription::cancellation_token) or
/// dropping the subscription unsubscribes.
pub struct Subscription {
    channel: String,
    stream: Option<ChannelStream>,
    token: CancellationToken,
    cancelled: Pin<Box<WaitForCancellationFutureOwned>>,
}

impl Subscription {
    pub(crate) fn new(channel: &str, stream: ChannelStream) -> Self {
        let token = CancellationToken::new();
        Self {
            channel: channel.to_string(),
            stream: Some(stream),
            cancelled: Box::pin(token.clone().cancelled_owned()),
            token,
        }
    }

    /// Channel name
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Token that cancels this subscription from another task
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Stop receiving; the stream yields `None` afterwards
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the subscription was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    fn tear_down(&mut self) {
        if self.stream.take().is_some() {
            debug!(channel = %self.channel, "Unsubscribed from channel");
        }
    }
}

impl Stream for Subscription {
    type Item = ChannelMessage;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        if this.token.is_cancelled() || this.cancelled.as_mut().poll(cx).is_ready() {
            this.tear_down();
            return Poll::Ready(None);
        }
        match this.stream.as_mut() {
            Some(stream) => stream.as_mut().poll_next(cx),
            None => Poll::Ready(None),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.tear_down();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("channel", &self.channel)
            .field("cancelled", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}
