//! # Message Module
//!
//! Sample consumer of the dispatch core: a small send/list message service.
//!
//! [`MessageController`] declares two bindings — `POST /api/messages` to
//! `send` and `GET /spy/messages` to `list` — and delegates persistence to
//! an injected [`Transport`]. [`AppFactory`] supplies the per-request
//! controller construction the dispatcher's adapters rely on, and
//! [`setup`] wires registrations into a ready-to-serve mux.
//!
//! The wire format is the original one: message bodies are
//! `{"From": ..., "To": ..., "Message": ...}`, business failures answer
//! `500` with `{"error": "<message>"}`.

mod controller;
mod factory;
mod transport;

pub use controller::MessageController;
pub use factory::AppFactory;
pub use transport::{MemoryTransport, Message, Transport, DEFAULT_PAGE_SIZE};

use crate::dispatcher::{ApplicationFactory, Controller, Dispatcher};
use crate::mux::Mux;
use std::sync::Arc;

/// Path accepting new messages.
pub const API_PATH: &str = "/api/messages";
/// Path exposing the messages sent so far.
pub const SPY_PATH: &str = "/spy/messages";
/// Label the message controller is registered and constructed under.
pub const MESSAGE_LABEL: &str = "message";

/// Arguments to [`setup`]: one controller and the label to register it under.
pub struct Registration {
    pub controller: Box<dyn Controller>,
    pub label: String,
}

impl Registration {
    #[must_use]
    pub fn new(controller: Box<dyn Controller>, label: impl Into<String>) -> Self {
        Self {
            controller,
            label: label.into(),
        }
    }
}

/// Build the message service routing table: construct the mux and the
/// `messageService` dispatcher, then register every controller.
///
/// # Panics
///
/// Panics on any registration failure. `setup` runs at process start; a bad
/// binding there is a wiring bug, not a condition to recover from.
#[must_use]
pub fn setup(factory: Arc<dyn ApplicationFactory>, registrations: Vec<Registration>) -> Arc<Mux> {
    let mux = Arc::new(Mux::new());
    let dispatcher = Dispatcher::new("messageService", Arc::clone(&mux), factory);
    for registration in registrations {
        if let Err(err) = dispatcher.register(registration.controller.as_ref(), &registration.label)
        {
            panic!("{err}");
        }
    }
    mux
}
