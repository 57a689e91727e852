//! Dispatcher core module - binding registration and the dispatch hot path.

use http::Method;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::mux::{HandlerRequest, Mux, ResponseWriter, RouteHandler};

/// A declarative route: dispatch requests matching `(verb, path)` to the
/// controller method named `method`.
///
/// A binding declares intent only and carries no behavior. It is produced by
/// [`Controller::bindings`] and consumed once, at registration, where the
/// method name is resolved against the controller's dispatch table and
/// validated. The named method must have the shape
///
/// ```rust,ignore
/// fn(&Self, &mut ResponseWriter, &HandlerRequest)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// The HTTP verb to use
    pub verb: Method,
    /// The URL path to attach the method to
    pub path: String,
    /// Name of the method the request should be dispatched to
    pub method: String,
}

impl Binding {
    #[must_use]
    pub fn new(verb: Method, path: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
            method: method.into(),
        }
    }
}

/// The dispatch-compatible method shape: receiver, response sink, request.
pub type ControllerMethod<C> = fn(&C, &mut ResponseWriter, &HandlerRequest);

/// A type whose methods can serve HTTP requests.
///
/// A controller declares its routes through [`bindings`](Self::bindings) and
/// exposes the named methods through [`method`](Self::method), its dispatch
/// table. The table is the static substitute for reflective method lookup: an
/// entry can only be built from a correctly-typed function pointer via
/// [`BoundMethod::of`], so any name it resolves is dispatchable by
/// construction, and a method with the wrong shape cannot appear in it at
/// all.
///
/// The instance a controller is registered with is only used to read its
/// binding list and dispatch table; request-time instances are constructed
/// fresh by the [`RequestFactory`], one per request.
pub trait Controller: Send + Sync {
    /// The routes this controller wants. Must be non-empty.
    fn bindings(&self) -> Vec<Binding>;

    /// Resolve a binding's method name to a dispatchable handle, or `None`
    /// if no method of that name and shape exists on this controller.
    fn method(&self, name: &str) -> Option<BoundMethod>;

    /// The controller's concrete type name, for diagnostics. Implementations
    /// return `std::any::type_name::<Self>()`.
    fn type_name(&self) -> &'static str;

    /// Dynamic-type handle used to enforce that request-time instances match
    /// the type registered under a label.
    fn as_any(&self) -> &dyn Any;
}

/// A resolved-but-unbound method handle: the outcome of looking a binding's
/// method name up in a controller's dispatch table.
///
/// Created once at registration and reused for every invocation, so no
/// by-name resolution happens on the request path. Carries the dynamic type
/// of the controller it was resolved on; [`call`](Self::call) refuses any
/// other receiver type.
#[derive(Clone)]
pub struct BoundMethod {
    controller_type: &'static str,
    type_id: TypeId,
    invoke: Arc<dyn Fn(&dyn Any, &mut ResponseWriter, &HandlerRequest) + Send + Sync>,
}

impl BoundMethod {
    /// Build a handle from a correctly-shaped method on `C`.
    #[must_use]
    pub fn of<C: Controller + 'static>(f: ControllerMethod<C>) -> Self {
        Self {
            controller_type: std::any::type_name::<C>(),
            type_id: TypeId::of::<C>(),
            invoke: Arc::new(move |receiver, rw, req| {
                let Some(receiver) = receiver.downcast_ref::<C>() else {
                    // The adapter checks the dynamic type before calling;
                    // getting here means that check was bypassed.
                    panic!(
                        "bound method of {} invoked with a receiver of a different type",
                        std::any::type_name::<C>()
                    );
                };
                f(receiver, rw, req);
            }),
        }
    }

    /// Type name of the controller this method was resolved on.
    #[must_use]
    pub fn controller_type(&self) -> &'static str {
        self.controller_type
    }

    /// Dynamic type of the controller this method was resolved on.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Invoke the method. `receiver` must be the controller type this handle
    /// was resolved on; anything else is a defect and panics.
    pub fn call(&self, receiver: &dyn Any, rw: &mut ResponseWriter, req: &HandlerRequest) {
        (self.invoke)(receiver, rw, req);
    }
}

impl fmt::Debug for BoundMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundMethod")
            .field("controller_type", &self.controller_type)
            .finish()
    }
}

/// Process-wide factory: has access to all singletons and knows how to
/// produce a [`RequestFactory`] scoped to one inbound request.
///
/// Supplied once at dispatcher construction; invoked once per request by the
/// adapter, so request-scoped dependencies are constructed lazily and exactly
/// once per request.
pub trait ApplicationFactory: Send + Sync {
    fn with_request(&self, req: &HandlerRequest) -> Box<dyn RequestFactory>;
}

/// Request-scoped factory: constructs controllers along with their
/// dependencies for a single request.
///
/// `new_controller` must return an instance whose dynamic type equals the
/// type that was registered under `label`, and is expected to panic if it
/// encounters errors during construction.
pub trait RequestFactory {
    fn new_controller(&self, label: &str) -> Box<dyn Controller>;
}

/// Registration failure. Configuration and binding-shape problems are
/// surfaced here rather than deferred to the first request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterError {
    /// `register` was called with an empty label
    EmptyLabel {
        /// Name of the dispatcher rejecting the call
        dispatcher: String,
    },
    /// The controller declared no bindings
    ///
    /// An empty binding list on a registered controller is almost certainly
    /// a bug, so it is rejected instead of silently ignored.
    NoBindings {
        dispatcher: String,
        /// The label the controller was being registered under
        label: String,
    },
    /// A binding named a method the controller's dispatch table does not
    /// resolve: the method does not exist, has the wrong shape, or is not
    /// exposed for dispatch.
    MethodNotFound {
        dispatcher: String,
        /// Concrete controller type name
        controller: &'static str,
        /// The method name the binding declared
        method: String,
    },
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterError::EmptyLabel { dispatcher } => {
                write!(f, "{dispatcher}: argument 'label' cannot be empty")
            }
            RegisterError::NoBindings { dispatcher, label } => {
                write!(f, "{dispatcher}: controller '{label}' returns 0 bindings")
            }
            RegisterError::MethodNotFound {
                dispatcher,
                controller,
                method,
            } => {
                write!(
                    f,
                    "{dispatcher}: no dispatchable method '{method}' in type '{controller}' \
                     with signature fn(&Self, &mut ResponseWriter, &HandlerRequest)"
                )
            }
        }
    }
}

impl std::error::Error for RegisterError {}

/// Orchestrates request handling: validates controller [`Binding`]s at
/// registration and wires per-binding adapters into the [`Mux`].
///
/// The dispatcher holds no mutable state of its own — all routing state lives
/// in the mux — so it needs no locking and each `register` call is
/// independent. There is no unregister operation.
#[derive(Clone)]
pub struct Dispatcher {
    name: Arc<str>,
    mux: Arc<Mux>,
    factory: Arc<dyn ApplicationFactory>,
}

impl fmt::Display for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dispatcher<{}>", self.name)
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher").field("name", &self.name).finish()
    }
}

impl Dispatcher {
    /// Create a dispatcher that registers routes into `mux` and obtains
    /// request-time controllers from `factory`.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty. An unnamed dispatcher is a wiring bug, not
    /// a runtime condition. (The missing-mux and missing-factory wiring bugs
    /// cannot be expressed here; ownership makes both arguments mandatory.)
    #[must_use]
    pub fn new(name: &str, mux: Arc<Mux>, factory: Arc<dyn ApplicationFactory>) -> Self {
        assert!(!name.is_empty(), "dispatcher: argument 'name' cannot be empty");
        Self {
            name: Arc::from(name),
            mux,
            factory,
        }
    }

    /// Register the bindings declared by `controller` under `label`.
    ///
    /// Each binding's method name is resolved against the controller's
    /// dispatch table and wired into the mux as an adapter. Registration is
    /// incremental: a bad binding aborts the remainder of this call, but
    /// bindings already wired — in this call or earlier ones — stay
    /// registered.
    pub fn register(&self, controller: &dyn Controller, label: &str) -> Result<(), RegisterError> {
        if label.is_empty() {
            return Err(RegisterError::EmptyLabel {
                dispatcher: self.to_string(),
            });
        }

        let bindings = controller.bindings();
        if bindings.is_empty() {
            return Err(RegisterError::NoBindings {
                dispatcher: self.to_string(),
                label: label.to_string(),
            });
        }

        for binding in bindings {
            self.bind(controller, label, binding)?;
        }
        Ok(())
    }

    fn bind(
        &self,
        controller: &dyn Controller,
        label: &str,
        binding: Binding,
    ) -> Result<(), RegisterError> {
        let method =
            controller
                .method(&binding.method)
                .ok_or_else(|| RegisterError::MethodNotFound {
                    dispatcher: self.to_string(),
                    controller: controller.type_name(),
                    method: binding.method.clone(),
                })?;

        info!(
            dispatcher = %self.name,
            verb = %binding.verb,
            path = %binding.path,
            controller = controller.type_name(),
            method = %binding.method,
            label = %label,
            "Binding registered"
        );

        let adapter = RouteAdapter {
            dispatcher: Arc::clone(&self.name),
            label: Arc::from(label),
            verb: binding.verb.clone(),
            path: binding.path.clone(),
            method,
            factory: Arc::clone(&self.factory),
        };
        self.mux.handle(binding.verb, &binding.path, Arc::new(adapter));
        Ok(())
    }
}

/// Per-binding closure over everything dispatch needs at request time: the
/// resolved method, the label to construct by, and the application factory.
struct RouteAdapter {
    dispatcher: Arc<str>,
    label: Arc<str>,
    verb: Method,
    path: String,
    method: BoundMethod,
    factory: Arc<dyn ApplicationFactory>,
}

impl RouteHandler for RouteAdapter {
    /// The request-time hot path: construct, type-check, invoke.
    ///
    /// # Panics
    ///
    /// Panics if the factory returns a controller whose dynamic type differs
    /// from the type registered under this adapter's label. That means the
    /// factory and the routing table have drifted out of sync, and carrying
    /// on would silently invoke the wrong logic.
    fn handle(&self, req: &HandlerRequest, rw: &mut ResponseWriter) {
        debug!(
            request_id = %req.id,
            dispatcher = %self.dispatcher,
            label = %self.label,
            controller = self.method.controller_type(),
            "Constructing request-scoped controller"
        );

        let scoped = self.factory.with_request(req);
        let controller = scoped.new_controller(&self.label);

        if controller.as_any().type_id() != self.method.type_id() {
            error!(
                request_id = %req.id,
                dispatcher = %self.dispatcher,
                verb = %self.verb,
                path = %self.path,
                label = %self.label,
                expected = self.method.controller_type(),
                actual = controller.type_name(),
                "Factory returned a controller of the wrong type - CRITICAL"
            );
            panic!(
                "Dispatcher<{}>: for {} {}, new_controller({}) returned {} but expected {}",
                self.dispatcher,
                self.verb,
                self.path,
                self.label,
                controller.type_name(),
                self.method.controller_type(),
            );
        }

        self.method.call(controller.as_any(), rw, req);
    }
}
