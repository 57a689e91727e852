use std::sync::Arc;
use tracing::debug;

use super::controller::MessageController;
use super::transport::Transport;
use crate::dispatcher::{ApplicationFactory, Controller, RequestFactory};
use crate::mux::HandlerRequest;

/// Process-wide factory for the message service.
///
/// Owns the singletons — here, the shared transport — and hands out a
/// request-scoped factory per inbound request.
pub struct AppFactory {
    env: String,
    transport: Arc<dyn Transport>,
}

impl AppFactory {
    #[must_use]
    pub fn new(env: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            env: env.into(),
            transport,
        }
    }

    /// The environment label this factory was built for (`dev`, `int`, ...).
    #[must_use]
    pub fn env(&self) -> &str {
        &self.env
    }
}

impl ApplicationFactory for AppFactory {
    fn with_request(&self, req: &HandlerRequest) -> Box<dyn RequestFactory> {
        debug!(request_id = %req.id, env = %self.env, "Request scope created");
        Box::new(MessageScope {
            transport: Arc::clone(&self.transport),
        })
    }
}

/// Request-scoped factory: constructs controllers with their dependencies
/// wired in, one controller instance per request.
struct MessageScope {
    transport: Arc<dyn Transport>,
}

impl RequestFactory for MessageScope {
    /// # Panics
    ///
    /// Panics on an unknown label: a label present in the routing table but
    /// absent here means the factory and the registrations have drifted.
    fn new_controller(&self, label: &str) -> Box<dyn Controller> {
        match label {
            super::MESSAGE_LABEL => Box::new(MessageController {
                transport: Arc::clone(&self.transport),
            }),
            other => panic!("AppFactory: no controller registered under label '{other}'"),
        }
    }
}
