use http::Method;
use std::any::Any;
use std::sync::Arc;
use tracing::info;

use super::transport::{Message, Transport};
use super::{API_PATH, SPY_PATH};
use crate::dispatcher::{Binding, BoundMethod, Controller};
use crate::mux::{HandlerRequest, ResponseWriter};

/// Handles requests to send and list messages.
///
/// Holds only its injected transport; an instance is constructed fresh for
/// every request by the request-scoped factory and dropped when the request
/// ends.
pub struct MessageController {
    pub transport: Arc<dyn Transport>,
}

impl MessageController {
    /// Decode the message from the request body and delegate sending to the
    /// transport. Responds 200 with an empty body on success.
    pub fn send(&self, rw: &mut ResponseWriter, req: &HandlerRequest) {
        let msg: Message = match req.json_body() {
            Ok(msg) => msg,
            Err(err) => {
                rw.error(500, &format!("error reading request: {err}"));
                return;
            }
        };

        if let Err(err) = self.transport.send(msg) {
            rw.error(500, &format!("error sending message: {err}"));
            return;
        }

        info!(request_id = %req.id, "Message accepted");
        rw.set_status(200);
    }

    /// List the messages sent so far as a JSON array.
    pub fn list(&self, rw: &mut ResponseWriter, req: &HandlerRequest) {
        let msgs = match self.transport.list() {
            Ok(msgs) => msgs,
            Err(err) => {
                rw.error(500, &format!("error getting messages: {err}"));
                return;
            }
        };

        let data = match serde_json::to_vec(&msgs) {
            Ok(data) => data,
            Err(err) => {
                rw.error(500, &format!("error marshalling results: {err}"));
                return;
            }
        };

        info!(request_id = %req.id, count = msgs.len(), "Messages listed");
        rw.set_status(200);
        rw.set_header("Content-Type", "application/json");
        rw.write(&data);
    }
}

impl Controller for MessageController {
    /// POST on the API path goes to `send`, GET on the spy path to `list`.
    fn bindings(&self) -> Vec<Binding> {
        vec![
            Binding::new(Method::POST, API_PATH, "send"),
            Binding::new(Method::GET, SPY_PATH, "list"),
        ]
    }

    fn method(&self, name: &str) -> Option<BoundMethod> {
        match name {
            "send" => Some(BoundMethod::of::<Self>(Self::send)),
            "list" => Some(BoundMethod::of::<Self>(Self::list)),
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
