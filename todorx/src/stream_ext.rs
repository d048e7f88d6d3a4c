use futures_core::stream::Stream;
use pin_project::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Extra combinators for observing state and token streams.
pub trait TodoRxStreamExt: Stream {
    /// Yields items until `predicate` matches one, then ends. The matching
    /// item is still yielded.
    ///
    /// ```
    /// use todorx::TodoRxStreamExt;
    ///
    /// async fn wait_for_login(store: &todorx::TokenStore) {
    ///     let _stream = store.observe().stop_if(|token| token.is_some());
    /// }
    /// ```
    fn stop_if<F>(self, predicate: F) -> StopIf<Self, F>
    where
        F: FnMut(&Self::Item) -> bool,
        Self: Sized,
    {
        StopIf {
            stream: self,
            done: false,
            predicate,
        }
    }
}

impl<T: ?Sized> TodoRxStreamExt for T where T: Stream {}

#[pin_project(project = StopIfProj)]
#[derive(Debug)]
#[must_use = "Streams do nothing unless polled"]
pub struct StopIf<St, F> {
    #[pin]
    stream: St,
    done: bool,
    predicate: F,
}

impl<St, F> Stream for StopIf<St, F>
where
    St: Stream,
    F: FnMut(&St::Item) -> bool,
{
    type Item = St::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let StopIfProj {
            stream,
            done,
            predicate,
        } = self.project();

        if *done {
            return Poll::Ready(None);
        }

        let next = match stream.poll_next(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(next) => next,
        };
        *done = match &next {
            Some(item) => predicate(item),
            None => true,
        };
        Poll::Ready(next)
    }
}
