//! # Dispatcher Module
//!
//! The dispatcher turns declared [`Binding`]s into live routes in the
//! [`Mux`](crate::mux::Mux), with registration-time structural checks
//! standing in for what a statically typed handler interface would
//! guarantee.
//!
//! ## Overview
//!
//! A [`Controller`] declares its routes as data — (verb, path, method name)
//! triples — and exposes a dispatch table resolving those names to typed
//! function pointers. [`Dispatcher::register`] walks the declared bindings,
//! resolves and validates each method, and wires a per-binding adapter into
//! the mux.
//!
//! ## Request Flow
//!
//! 1. The mux routes `(verb, path)` to a registered adapter
//! 2. The adapter asks the [`ApplicationFactory`] for a request-scoped
//!    factory, passing the inbound request
//! 3. The request-scoped factory constructs a fresh controller for the
//!    adapter's label
//! 4. The adapter checks the instance's dynamic type against the type
//!    recorded at registration — drift between factory and routing table is
//!    a fatal defect, never coerced
//! 5. The previously resolved method runs with the response writer and the
//!    request
//!
//! ## Error Handling
//!
//! Wiring bugs (empty dispatcher name) panic at construction. Binding
//! problems (empty label, empty binding list, unresolvable method) surface
//! as [`RegisterError`] and abort only the remainder of the failing
//! `register` call. Business errors belong to the invoked method: the
//! dispatcher's job ends at correct invocation.
//!
//! ## Registration Example
//!
//! ```rust,ignore
//! let mux = Arc::new(Mux::new());
//! let dispatcher = Dispatcher::new("messageService", Arc::clone(&mux), factory);
//! dispatcher.register(&MessageController::default(), "message")?;
//! ```

mod core;

pub use core::{
    ApplicationFactory, Binding, BoundMethod, Controller, ControllerMethod, Dispatcher,
    RegisterError, RequestFactory,
};
