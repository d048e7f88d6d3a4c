use crate::{ErrorDetail, ExecutionResult, Resource, execution_result_to_resource};
use futures_core::stream::Stream;
use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, warn};

/// Drives remote operations and reports their progress as [`Resource`] values.
///
/// Every call to [`Pipeline::run`] is independent: the pipeline keeps no state
/// between runs apart from its configuration, and it does not deduplicate
/// concurrent runs of the same operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pipeline {
    timeout: Option<Duration>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds every run. A run that exceeds the deadline ends with a
    /// transport timeout error.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Starts one run of `computation`.
    ///
    /// The returned stream yields `Loading` followed by exactly one terminal
    /// state, then ends. Cancelling `cancellation_token` or dropping the
    /// stream abandons the call; the stream then ends without a terminal
    /// state and nothing is delivered after the cancellation. A call that
    /// panics, or resolves to `Loading`, ends with an internal error.
    ///
    /// `computation` may still finish after a late cancellation, so state
    /// that must not change for a cancelled run is committed through
    /// [`ResourceStream::on_success`] instead.
    ///
    /// Must be called within a tokio runtime.
    pub fn run<T, R, F>(
        &self,
        operation: &'static str,
        cancellation_token: CancellationToken,
        computation: F,
    ) -> ResourceStream<T>
    where
        T: Send + 'static,
        R: ExecutionResult<T> + Send + 'static,
        F: Future<Output = R> + Send + 'static,
    {
        let run_token = cancellation_token.child_token();
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let timeout = self.timeout;

        tokio::spawn(Self::drive(
            operation,
            run_token.clone(),
            tx,
            computation,
            timeout,
        ));

        ResourceStream {
            receiver: rx,
            token: run_token.clone(),
            _guard: run_token.drop_guard(),
            finished: false,
            on_success: None,
        }
    }

    async fn drive<T, R, F>(
        operation: &'static str,
        token: CancellationToken,
        tx: UnboundedSender<Resource<T>>,
        computation: F,
        timeout: Option<Duration>,
    ) where
        T: Send + 'static,
        R: ExecutionResult<T> + Send + 'static,
        F: Future<Output = R> + Send + 'static,
    {
        debug!(operation, "run started");
        if tx.send(Resource::Loading).is_err() {
            return;
        }
        // Let observers see Loading before the call is polled.
        tokio::task::yield_now().await;
        if token.is_cancelled() {
            debug!(operation, "run cancelled before the call started");
            return;
        }

        let mut call = tokio::spawn(Self::call(computation, timeout));
        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            joined = &mut call => Some(match joined {
                Ok(resource) if resource.is_complete() => resource,
                Ok(_) => Resource::error(ErrorDetail::internal("call resolved without a result")),
                Err(e) => Resource::error(ErrorDetail::internal(e.to_string())),
            }),
        };

        match outcome {
            Some(resource) => {
                match &resource {
                    Resource::Error { detail } => warn!(operation, %detail, "run failed"),
                    _ => debug!(operation, "run succeeded"),
                }
                let _ = tx.send(resource);
            }
            None => {
                call.abort();
                debug!(operation, "run cancelled");
            }
        }
    }

    async fn call<T, R, F>(computation: F, timeout: Option<Duration>) -> Resource<T>
    where
        R: ExecutionResult<T>,
        F: Future<Output = R>,
    {
        match timeout {
            Some(timeout) => match tokio::time::timeout(timeout, computation).await {
                Ok(result) => execution_result_to_resource(result),
                Err(_) => Resource::error(ErrorDetail::timeout()),
            },
            None => execution_result_to_resource(computation.await),
        }
    }
}

type Commit<T> = Box<dyn FnOnce(&T) + Send>;

/// The emissions of one pipeline run.
///
/// Dropping the stream cancels the run.
#[must_use = "Streams do nothing unless polled"]
pub struct ResourceStream<T> {
    receiver: UnboundedReceiver<Resource<T>>,
    token: CancellationToken,
    _guard: DropGuard,
    finished: bool,
    on_success: Option<Commit<T>>,
}

impl<T> Debug for ResourceStream<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceStream")
            .field("cancelled", &self.token.is_cancelled())
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl<T> ResourceStream<T> {
    /// Registers `commit` to run with the success value when it is delivered.
    ///
    /// Runs on the receiving side, right before the `Success` is handed out,
    /// so it never runs for a run whose success was suppressed by
    /// cancellation.
    pub fn on_success<F>(self, commit: F) -> Self
    where
        F: FnOnce(&T) + Send + 'static,
    {
        Self {
            on_success: Some(Box::new(commit)),
            ..self
        }
    }

    /// Stops observing the run. Equivalent to dropping the stream, but keeps
    /// it around so callers can still poll it to completion.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Receives the next emission, or `None` once the run has ended or was
    /// cancelled.
    pub async fn next_resource(&mut self) -> Option<Resource<T>> {
        if self.finished {
            return None;
        }
        let next = tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            next = self.receiver.recv() => next,
        };
        self.accept(next)
    }

    /// Waits for the terminal emission. `None` means the run was cancelled.
    pub async fn terminal(mut self) -> Option<Resource<T>> {
        while let Some(resource) = self.next_resource().await {
            if resource.is_complete() {
                return Some(resource);
            }
        }
        None
    }

    fn accept(&mut self, next: Option<Resource<T>>) -> Option<Resource<T>> {
        if self.token.is_cancelled() {
            self.finished = true;
            return None;
        }
        match next {
            Some(resource) => {
                if resource.is_complete() {
                    self.finished = true;
                }
                if let Resource::Success { value } = &resource {
                    if let Some(commit) = self.on_success.take() {
                        commit(value);
                    }
                }
                Some(resource)
            }
            None => {
                self.finished = true;
                None
            }
        }
    }
}

impl<T> Stream for ResourceStream<T> {
    type Item = Resource<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished || this.token.is_cancelled() {
            this.finished = true;
            return Poll::Ready(None);
        }
        match this.receiver.poll_recv(cx) {
            Poll::Ready(next) => Poll::Ready(this.accept(next)),
            Poll::Pending => Poll::Pending,
        }
    }
}
