//! # routewire
//!
//! **routewire** is a declarative request-dispatch engine for the `may`
//! coroutine runtime: handler objects ("controllers") declare, as plain
//! data, which (HTTP verb, path pattern) pairs route to which of their
//! methods; the engine validates those declarations at registration time and
//! serves requests through a two-level multiplexer with a fresh controller
//! instance constructed per request.
//!
//! ## Architecture
//!
//! The library is organized into a few key modules:
//!
//! - **[`mux`]** - the two-level (pattern, then verb) request multiplexer,
//!   plus the leaf request/response types
//! - **[`dispatcher`]** - binding validation and registration: resolves each
//!   declared method name against a controller's dispatch table and wires a
//!   per-binding adapter into the mux
//! - **[`server`]** - HTTP transport built on `may_minihttp`
//! - **[`message`]** - sample consumer: a send/list message service with an
//!   in-memory transport
//! - **[`runtime_config`]** - environment-variable runtime configuration
//! - **[`ids`]** - ULID request identifiers for log correlation
//!
//! ## Request Handling Flow
//!
//! ```text
//! request ──► Mux::serve
//!               ├─ no pattern matched ──► 404
//!               ├─ pattern matched, verb missing ──► 405
//!               └─ adapter
//!                    ├─ ApplicationFactory::with_request
//!                    ├─ RequestFactory::new_controller(label)
//!                    ├─ dynamic-type check (mismatch is fatal)
//!                    └─ bound method(&controller, &mut rw, &req)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use routewire::message::{
//!     AppFactory, MemoryTransport, MessageController, Registration, setup, MESSAGE_LABEL,
//! };
//! use routewire::mux::HandlerRequest;
//! use std::sync::Arc;
//!
//! let transport = Arc::new(MemoryTransport::new());
//! let factory = Arc::new(AppFactory::new("dev", transport));
//! let mux = setup(
//!     factory,
//!     vec![Registration::new(
//!         Box::new(MessageController {
//!             transport: Arc::new(MemoryTransport::new()),
//!         }),
//!         MESSAGE_LABEL,
//!     )],
//! );
//!
//! let req = HandlerRequest::new(http::Method::POST, "/api/messages")
//!     .with_body(r#"{"From":"kkrs","To":"world","Message":"hello"}"#);
//! assert_eq!(mux.serve(&req).status(), 200);
//! ```
//!
//! The controller instance passed to `setup` only supplies the binding list
//! and dispatch table; the instances that actually serve requests come from
//! the factory, one per request.

pub mod dispatcher;
pub mod ids;
pub mod message;
pub mod mux;
pub mod runtime_config;
pub mod server;

pub use dispatcher::{
    ApplicationFactory, Binding, BoundMethod, Controller, Dispatcher, RegisterError,
    RequestFactory,
};
pub use mux::{HandlerRequest, Mux, ResponseWriter, RouteHandler};
