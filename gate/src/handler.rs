use std::future::Future;

use async_trait::async_trait;

use crate::context::Context;
use crate::event::Event;

/// Returned by a handler that fails before (or instead of) completing.
pub type HandlerResult = anyhow::Result<()>;

/// User code run by a [`Wrapped`](crate::Wrapped) handler.
///
/// A handler reports its outcome through `context.succeed` / `context.fail`,
/// either before returning or later from a task holding a clone of the
/// context. Returning `Err` fails the invocation unless it already completed.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn call(&self, event: Event, context: Context) -> HandlerResult;
}

/// Adapts an async closure into a [`Handler`].
pub struct HandlerFn<F> {
    f: F,
}

pub fn handler_fn<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(Event, Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    HandlerFn { f }
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Event, Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    async fn call(&self, event: Event, context: Context) -> HandlerResult {
        (self.f)(event, context).await
    }
}
