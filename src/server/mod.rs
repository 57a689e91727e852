//! # Server Module
//!
//! HTTP transport layer on the `may` coroutine runtime: parses raw
//! `may_minihttp` requests into [`HandlerRequest`](crate::mux::HandlerRequest)s,
//! hands them to the mux, and writes the resulting response back onto the
//! wire. The dispatch core itself never touches a socket.

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::parse_request;
pub use response::write_response;
pub use service::AppService;
