//! # Mux Module
//!
//! The mux module is the leaf of the dispatch engine: a two-level request
//! multiplexer that resolves an inbound `(verb, path)` pair to a registered
//! handler, or to a well-defined negative outcome.
//!
//! ## Overview
//!
//! The mux is responsible for:
//! - Maintaining the routing table (pattern → verb → handler)
//! - Matching incoming request paths against registered patterns
//! - Distinguishing "no pattern matched" (404) from "pattern matched but the
//!   verb did not" (405) — an observable contract, not an implementation
//!   detail
//! - Invoking the matched handler and returning its response unmodified
//!
//! ## Matching policy
//!
//! Patterns are matched exactly. A pattern ending in `/` additionally matches
//! every path it prefixes, and when several such patterns match the longest
//! registered one wins. There is no path templating: no parameter capture,
//! no wildcards.
//!
//! ## Concurrency
//!
//! Registration and serving may interleave. The table lives behind a
//! read/write lock: many requests resolve concurrently under read guards
//! while `handle` takes the write guard, so no request ever observes a
//! partially-updated table.
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use routewire::mux::{HandlerRequest, Mux};
//!
//! let mux = Mux::new();
//! mux.handle_fn(Method::GET, "/ping", |_req, rw| {
//!     rw.write(b"pong");
//! });
//!
//! let resp = mux.serve(&HandlerRequest::new(Method::GET, "/ping"));
//! assert_eq!(resp.status(), 200);
//! assert_eq!(resp.body(), b"pong");
//! ```

mod core;
#[cfg(test)]
mod tests;

pub use core::{HandlerRequest, Mux, ResponseWriter, RouteHandler};
