//! Collaborator-facing session: a store plus the asynchronous add flow.
//!
//! Adding an iteration is split in two. [`Session::begin_add`] appends the
//! pending iteration synchronously and hands back a [`PendingAdd`] future that
//! stands in for the external creation call. Once it resolves, the caller
//! passes the [`Completion`] to [`Session::apply`]. A [`CancelHandle`] can end
//! the wait early; the pending iteration is then dropped instead of completed.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::debug;

use crate::core::store::ModuleStore;
use crate::core::types::{Ignored, Outcome};

/// Future returned by a [`CreationService`]; resolves to the finalized title.
pub type CreationFuture = Pin<Box<dyn Future<Output = Option<String>> + Send>>;

/// What the creation service is asked to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationRequest {
    pub module_id: String,
    pub iteration_id: String,
    /// Title entered in the add dialog, if any.
    pub title: Option<String>,
}

/// External step that finishes creating an iteration.
pub trait CreationService {
    fn create(&self, request: &CreationRequest) -> CreationFuture;
}

/// Creation service that waits a fixed delay and echoes the requested title.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedCreation {
    delay: Duration,
}

impl SimulatedCreation {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl CreationService for SimulatedCreation {
    fn create(&self, request: &CreationRequest) -> CreationFuture {
        let delay = self.delay;
        let title = request.title.clone();
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            title
        })
    }
}

/// How an in-flight add ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Ready {
        module_id: String,
        iteration_id: String,
        title: Option<String>,
    },
    Cancelled {
        module_id: String,
        iteration_id: String,
    },
}

/// An add that has begun but not yet been applied.
pub struct PendingAdd {
    request: CreationRequest,
    creation: CreationFuture,
    cancel_rx: oneshot::Receiver<()>,
}

impl PendingAdd {
    pub fn module_id(&self) -> &str {
        &self.request.module_id
    }

    pub fn iteration_id(&self) -> &str {
        &self.request.iteration_id
    }

    /// Wait for the creation service or a cancellation, whichever comes first.
    ///
    /// Dropping the [`CancelHandle`] without calling `cancel` does not cancel.
    pub async fn resolve(self) -> Completion {
        let PendingAdd {
            request,
            creation,
            mut cancel_rx,
        } = self;
        tokio::select! {
            biased;
            Ok(()) = &mut cancel_rx => Completion::Cancelled {
                module_id: request.module_id,
                iteration_id: request.iteration_id,
            },
            title = creation => Completion::Ready {
                module_id: request.module_id,
                iteration_id: request.iteration_id,
                title,
            },
        }
    }
}

/// Cancels the matching [`PendingAdd`].
#[derive(Debug)]
pub struct CancelHandle(oneshot::Sender<()>);

impl CancelHandle {
    pub fn cancel(self) {
        // The pending add may already have resolved; nothing to do then.
        let _ = self.0.send(());
    }
}

/// Owns the store and the advisory "add in progress" flag.
pub struct Session<C> {
    store: ModuleStore,
    creation: C,
    outstanding: usize,
}

impl<C: CreationService> Session<C> {
    pub fn new(store: ModuleStore, creation: C) -> Self {
        Self {
            store,
            creation,
            outstanding: 0,
        }
    }

    pub fn store(&self) -> &ModuleStore {
        &self.store
    }

    /// Direct access for the synchronous operations.
    pub fn store_mut(&mut self) -> &mut ModuleStore {
        &mut self.store
    }

    /// True while an add has begun and its completion has not been applied.
    pub fn is_processing(&self) -> bool {
        self.outstanding > 0
    }

    /// Append a pending iteration and start the creation call.
    ///
    /// Rejected with [`Ignored::Busy`] while another add is outstanding.
    pub fn begin_add(
        &mut self,
        module_id: &str,
        title: Option<String>,
    ) -> Outcome<(PendingAdd, CancelHandle)> {
        if self.is_processing() {
            return Err(Ignored::Busy);
        }
        let iteration_id = self.store.begin_add_iteration(module_id)?;
        let request = CreationRequest {
            module_id: module_id.to_string(),
            iteration_id,
            title,
        };
        let creation = self.creation.create(&request);
        let (cancel_tx, cancel_rx) = oneshot::channel();
        self.outstanding += 1;
        debug!(
            module_id = %request.module_id,
            iteration_id = %request.iteration_id,
            "add iteration begun"
        );
        Ok((
            PendingAdd {
                request,
                creation,
                cancel_rx,
            },
            CancelHandle(cancel_tx),
        ))
    }

    /// Apply a resolved add to the store and clear the processing flag.
    pub fn apply(&mut self, completion: Completion) -> Outcome {
        self.outstanding = self.outstanding.saturating_sub(1);
        let result = match &completion {
            Completion::Ready {
                module_id,
                iteration_id,
                title,
            } => self
                .store
                .complete_add_iteration(module_id, iteration_id, title.as_deref()),
            Completion::Cancelled {
                module_id,
                iteration_id,
            } => self.store.abandon_add_iteration(module_id, iteration_id),
        };
        debug!(?completion, ?result, "add iteration applied");
        result
    }

    /// Begin an add, wait for it, and apply the completion. Returns the new id.
    pub async fn add_iteration(
        &mut self,
        module_id: &str,
        title: Option<String>,
    ) -> Outcome<String> {
        let (pending, _cancel) = self.begin_add(module_id, title)?;
        let iteration_id = pending.iteration_id().to_string();
        let completion = pending.resolve().await;
        self.apply(completion)?;
        Ok(iteration_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::StoreSettings;
    use crate::core::types::IterationStatus;
    use crate::test_support::{ImmediateCreation, locked_module_with};

    fn session() -> (Session<ImmediateCreation>, String) {
        let mut store = ModuleStore::default();
        let module_id = store.create_module().expect("create module");
        (Session::new(store, ImmediateCreation), module_id)
    }

    #[tokio::test]
    async fn add_iteration_completes_with_title() {
        let (mut session, m) = session();

        let id = session
            .add_iteration(&m, Some("My Title".to_string()))
            .await
            .expect("add");

        assert_eq!(id, "1");
        let iteration = &session.store().module(&m).expect("module").iterations[0];
        assert_eq!(iteration.status, IterationStatus::Completed);
        assert_eq!(iteration.title, "My Title");
        assert!(!session.is_processing());
    }

    #[tokio::test]
    async fn begin_add_sets_processing_until_applied() {
        let (mut session, m) = session();

        let (pending, _cancel) = session.begin_add(&m, None).expect("begin");
        assert!(session.is_processing());
        assert!(matches!(session.begin_add(&m, None), Err(Ignored::Busy)));

        let completion = pending.resolve().await;
        session.apply(completion).expect("apply");
        assert!(!session.is_processing());
        assert_eq!(
            session.store().module(&m).expect("module").iterations[0].title,
            "New Iteration"
        );
    }

    #[tokio::test]
    async fn cancel_drops_pending_iteration() {
        let mut store = ModuleStore::default();
        let m = store.create_module().expect("create module");
        let mut session = Session::new(store, SimulatedCreation::new(Duration::from_secs(60)));

        let (pending, cancel) = session.begin_add(&m, None).expect("begin");
        cancel.cancel();
        let completion = pending.resolve().await;

        assert_eq!(
            completion,
            Completion::Cancelled {
                module_id: m.clone(),
                iteration_id: "1".to_string(),
            }
        );
        session.apply(completion).expect("apply");
        assert!(session.store().module(&m).expect("module").iterations.is_empty());
        assert!(!session.is_processing());
    }

    #[tokio::test]
    async fn dropped_cancel_handle_does_not_cancel() {
        let mut store = ModuleStore::default();
        let m = store.create_module().expect("create module");
        let mut session = Session::new(store, SimulatedCreation::new(Duration::from_millis(5)));

        let (pending, cancel) = session
            .begin_add(&m, Some("kept".to_string()))
            .expect("begin");
        drop(cancel);

        assert!(matches!(pending.resolve().await, Completion::Ready { .. }));
    }

    #[tokio::test]
    async fn completion_after_remove_is_ignored() {
        let (mut session, m) = session();
        let (pending, _cancel) = session.begin_add(&m, None).expect("begin");
        let iteration_id = pending.iteration_id().to_string();

        session
            .store_mut()
            .remove_iteration(&m, &iteration_id)
            .expect("remove");
        let completion = pending.resolve().await;

        assert_eq!(session.apply(completion), Err(Ignored::UnknownIteration));
        assert!(session.store().module(&m).expect("module").iterations.is_empty());
        assert!(!session.is_processing());
    }

    #[tokio::test]
    async fn add_on_locked_module_is_rejected() {
        let store = ModuleStore::from_modules(
            vec![locked_module_with("1", Vec::new())],
            StoreSettings::default(),
        );
        let mut session = Session::new(store, ImmediateCreation);

        assert_eq!(
            session.add_iteration("1", None).await,
            Err(Ignored::ModuleLocked)
        );
        assert!(!session.is_processing());
    }
}
