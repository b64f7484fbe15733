use std::{
    cell::{Ref, RefCell},
    rc::Rc,
    time::{Duration, Instant},
};

use tokio::task::JoinHandle;

use super::controller::{ControllerSettings, ConversionController};
use crate::{
    config::Config,
    domain::outcome::ActionOutcome,
    input::KeyEvent,
    notifier::UserNotice,
    service::{ConverterService, ServiceError, call_with_timeout},
    surface::{Document, Node},
};

fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

/// What happened to one key event handed to [`Session::on_key`].
#[derive(Debug, Default)]
pub struct KeyHandling {
    pub outcome: Option<ActionOutcome>,
    /// Resolves once the dispatched request has been applied or discarded.
    pub completion: Option<JoinHandle<ActionOutcome>>,
}

/// Binds a [`ConversionController`] to a converter service on the current thread.
///
/// Requests run as local tasks, so every method that can dispatch must be
/// called from inside a [`tokio::task::LocalSet`]. The controller is never
/// borrowed across an await point.
pub struct Session<S> {
    controller: Rc<RefCell<ConversionController>>,
    service: Rc<S>,
    request_timeout: Duration,
}

impl<S> Session<S>
where
    S: ConverterService + 'static,
{
    pub fn new(config: &Config, service: S) -> Self {
        Self {
            controller: Rc::new(RefCell::new(ConversionController::new(
                ControllerSettings::from_config(config),
            ))),
            service: Rc::new(service),
            request_timeout: config.request_timeout(),
        }
    }

    /// Binds every editable surface already present in `doc`.
    pub fn attach(&self, doc: &mut Document) -> usize {
        doc.take_mutations();
        let bound = self.controller.borrow_mut().on_surface_discovered(doc.body());
        tracing::trace!(bound, "session attached");
        bound
    }

    pub fn on_focus(&self, node: &Node) {
        self.controller.borrow_mut().on_focus(node);
    }

    /// Feeds pending document mutations to the binding registry.
    pub fn process_mutations(&self, doc: &mut Document) {
        let records = doc.take_mutations();
        if !records.is_empty() {
            self.controller.borrow_mut().on_mutations(records);
        }
    }

    /// Routes a key event; suppresses it only when the session acted on it.
    ///
    /// Called without a Tokio runtime, a dispatched request fails at once as a
    /// transport failure instead of being spawned.
    ///
    /// # Panics
    ///
    /// Inside a runtime but outside a [`tokio::task::LocalSet`], spawning the
    /// request panics.
    pub fn on_key(&self, doc: &Document, event: &KeyEvent) -> KeyHandling {
        let response = self.controller.borrow_mut().handle_key(doc, event, now());

        if response.handled() {
            event.suppress();
        }

        let mut outcome = response.outcome;
        let Some(dispatch) = response.dispatch else {
            return KeyHandling {
                outcome,
                completion: None,
            };
        };

        if tokio::runtime::Handle::try_current().is_err() {
            tracing::warn!(id = dispatch.id.0, "no async runtime to run the request on");
            let error = ServiceError::TransportFailure("no async runtime".to_string());
            outcome = Some(
                self.controller
                    .borrow_mut()
                    .complete(dispatch.id, Err(error), now()),
            );
            return KeyHandling {
                outcome,
                completion: None,
            };
        }

        let controller = Rc::clone(&self.controller);
        let service = Rc::clone(&self.service);
        let ceiling = self.request_timeout;

        let completion = tokio::task::spawn_local(async move {
            let result =
                call_with_timeout(service.as_ref(), dispatch.kind, &dispatch.text, ceiling).await;
            controller.borrow_mut().complete(dispatch.id, result, now())
        });

        KeyHandling {
            outcome,
            completion: Some(completion),
        }
    }

    pub fn drain_notice(&self) -> Option<UserNotice> {
        self.controller.borrow_mut().drain_notice()
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn controller(&self) -> Ref<'_, ConversionController> {
        self.controller.borrow()
    }

    /// Drops all state. Requests still in flight finish as unknown.
    pub fn teardown(&self) {
        self.controller.borrow_mut().teardown();
    }
}
