use crate::{Resource, ResourceStream, State};
use futures_signals::signal::{Mutable, MutableSignalCloned, SignalExt, SignalStream};
use thiserror::Error;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot::error::RecvError;
use tokio::task::JoinHandle;
use tracing::debug;

type Reducer<S> = Box<dyn FnOnce(S) -> S + Send>;
type Action<S> = Box<dyn FnOnce(S) + Send>;

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum StoreError {
    #[error("state store is closed")]
    Closed,

    #[error("state store dropped the request: {0}")]
    Dropped(#[from] RecvError),
}

/// View state that changes only through queued reducers.
///
/// Reducers run one at a time on a background task, in the order they were
/// submitted. Observers follow the state through [`StateStore::to_signal`]
/// or [`StateStore::to_stream`].
pub struct StateStore<S: State> {
    state: Mutable<S>,
    set_state_tx: UnboundedSender<Reducer<S>>,
    with_state_tx: UnboundedSender<Action<S>>,
}

impl<S: State> StateStore<S> {
    /// Spawns the reducer queue. Must be called within a tokio runtime.
    pub fn new(initial_state: S) -> Self {
        let state = Mutable::new(initial_state);
        let (set_state_tx, reducers) = tokio::sync::mpsc::unbounded_channel::<Reducer<S>>();
        let (with_state_tx, reads) = tokio::sync::mpsc::unbounded_channel::<Action<S>>();

        tokio::spawn(Self::run_queue(state.clone(), reducers, reads));

        StateStore {
            state,
            set_state_tx,
            with_state_tx,
        }
    }

    /// Applies reducers ahead of reads, so a read always sees every reducer
    /// queued before it. Ends once the store and all bindings are gone.
    async fn run_queue(
        state: Mutable<S>,
        mut reducers: UnboundedReceiver<Reducer<S>>,
        mut reads: UnboundedReceiver<Action<S>>,
    ) {
        debug!(state = std::any::type_name::<S>(), "view state queue started");
        loop {
            tokio::select! {
                biased;
                // Not under the state lock: reducers may read the store.
                Some(reducer) = reducers.recv() => state.set(reducer(state.get_cloned())),
                Some(read) = reads.recv() => read(state.get_cloned()),
                else => break,
            }
        }
        debug!(state = std::any::type_name::<S>(), "view state queue stopped");
    }

    /// Latest-value stream of the view state, starting with the current one.
    pub fn to_stream(&self) -> SignalStream<MutableSignalCloned<S>> {
        self.to_signal().to_stream()
    }

    pub fn to_signal(&self) -> MutableSignalCloned<S> {
        self.state.signal_cloned()
    }

    /// Snapshot of the state; reducers still queued are not reflected.
    pub fn get_state(&self) -> S {
        self.state.get_cloned()
    }

    pub fn set_state<F>(&self, reducer: F) -> Result<(), StoreError>
    where
        F: FnOnce(S) -> S + Send + 'static,
    {
        self.set_state_tx
            .send(Box::new(reducer))
            .map_err(|_| StoreError::Closed)
    }

    /// Runs `action` against the state once every reducer queued before it
    /// has been applied.
    pub fn with_state<F>(&self, action: F) -> Result<(), StoreError>
    where
        F: FnOnce(S) + Send + 'static,
    {
        self.with_state_tx
            .send(Box::new(action))
            .map_err(|_| StoreError::Closed)
    }

    pub async fn await_state(&self) -> Result<S, StoreError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.with_state(|state| {
            let _ = tx.send(state);
        })?;
        Ok(rx.await?)
    }

    /// Folds every emission of a pipeline run into the state.
    ///
    /// The returned task ends with the run. It fails only if the store
    /// itself went away.
    pub fn bind<T, U>(&self, stream: ResourceStream<T>, state_updater: U) -> JoinHandle<Result<(), StoreError>>
    where
        T: Send + 'static,
        U: FnOnce(S, Resource<T>) -> S + Clone + Send + 'static,
    {
        Self::spawn_binding(self.set_state_tx.clone(), stream, state_updater, None)
    }

    /// Starts a run only if the slot read by `slot_getter` is not loading.
    ///
    /// The check and the switch to `Loading` happen inside one reducer, so two
    /// submissions queued back to back start a single run. `launch` is called
    /// on the store's queue task. If the run is cancelled before its terminal
    /// state, the slot goes back to what it held before the submission.
    pub fn bind_exclusive<T, G, L, U>(
        &self,
        slot_getter: G,
        launch: L,
        slot_setter: U,
    ) -> Result<(), StoreError>
    where
        T: Clone + Send + 'static,
        G: FnOnce(&S) -> Option<&Resource<T>> + Send + 'static,
        L: FnOnce() -> ResourceStream<T> + Send + 'static,
        U: FnOnce(S, Option<Resource<T>>) -> S + Clone + Send + 'static,
    {
        let set_state_tx = self.set_state_tx.clone();
        self.set_state(move |state| {
            let previous = slot_getter(&state).cloned();
            if previous.as_ref().is_some_and(Resource::is_loading) {
                debug!("run already in flight, submission ignored");
                return state;
            }
            let state = slot_setter.clone()(state, Some(Resource::Loading));
            let restore = slot_setter.clone();
            let on_abandon: Reducer<S> = Box::new(move |state: S| restore(state, previous));
            Self::spawn_binding(
                set_state_tx,
                launch(),
                move |state, resource| slot_setter(state, Some(resource)),
                Some(on_abandon),
            );
            state
        })
    }

    fn spawn_binding<T, U>(
        set_state_tx: UnboundedSender<Reducer<S>>,
        mut stream: ResourceStream<T>,
        state_updater: U,
        on_abandon: Option<Reducer<S>>,
    ) -> JoinHandle<Result<(), StoreError>>
    where
        T: Send + 'static,
        U: FnOnce(S, Resource<T>) -> S + Clone + Send + 'static,
    {
        tokio::spawn(async move {
            let mut completed = false;
            while let Some(resource) = stream.next_resource().await {
                completed |= resource.is_complete();
                let state_updater = state_updater.clone();
                set_state_tx
                    .send(Box::new(move |old_state| state_updater(old_state, resource)))
                    .map_err(|_| StoreError::Closed)?;
            }
            if !completed {
                if let Some(on_abandon) = on_abandon {
                    debug!("run abandoned, restoring its slot");
                    set_state_tx.send(on_abandon).map_err(|_| StoreError::Closed)?;
                }
            }
            Ok(())
        })
    }
}
