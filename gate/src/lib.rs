//! Validation and token gate for serverless handlers.
//!
//! A [`Gate`] holds a validation [`Schema`] and JWT settings. Wrapping a
//! [`Handler`] yields a [`Wrapped`] handler that validates each event, verifies
//! its token when the schema declares the token field, and only then calls the
//! inner handler. Rejections are reported through the invocation's
//! [`Context`] exactly like a handler-reported failure.

pub mod context;
pub mod error;
pub mod event;
pub mod gate;
pub mod handler;

pub use context::{Completion, Context, Outcome, Pending};
pub use error::{ErrorBody, EventError, InvocationError};
pub use event::Event;
pub use gate::{Gate, Wrapped};
pub use handler::{handler_fn, Handler, HandlerFn, HandlerResult};

pub use gate_auth::{
    Claims, JwtConfig, JwtConfigStore, JwtOptions, StageVariables, TokenError, TokenErrorKind,
};
pub use gate_observability::GateMetrics;
pub use gate_schema::{Rule, Schema, ValidationError, Violation};

/// Rule constructors for building a [`Schema`].
pub mod types {
    pub use gate_schema::types::{any, boolean, number, string};
}
