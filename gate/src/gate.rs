use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use anyhow::anyhow;
use futures::FutureExt;
use gate_auth::{JwtConfig, JwtConfigStore, JwtOptions, StageVariables, TokenVerifier};
use gate_observability::{GateMetrics, STAGE_TOKEN, STAGE_VALIDATION};
use gate_schema::Schema;
use tracing::{debug, info_span, warn, Instrument};

use crate::context::{Context, Outcome};
use crate::error::InvocationError;
use crate::event::Event;
use crate::handler::Handler;

/// Validation schema and JWT settings shared by every handler it wraps.
///
/// Clones share state, so a schema set or a configuration change made after
/// [`wrap`](Self::wrap) applies to handlers wrapped earlier.
#[derive(Clone, Default)]
pub struct Gate {
    jwt: JwtConfigStore,
    schema: Arc<RwLock<Option<Arc<Schema>>>>,
    metrics: Option<GateMetrics>,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_jwt_store(store: JwtConfigStore) -> Self {
        Self {
            jwt: store,
            ..Self::default()
        }
    }

    pub fn with_metrics(mut self, metrics: GateMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn jwt(&self) -> &JwtConfigStore {
        &self.jwt
    }

    pub fn jwt_config(&self) -> JwtConfig {
        self.jwt.configuration()
    }

    pub fn configure_jwt(&self, options: JwtOptions) -> JwtConfig {
        self.jwt.configure(options)
    }

    /// Replace the active schema; `None` clears it.
    pub fn set_validation_schema(&self, schema: Option<Schema>) {
        let mut guard = self.schema.write().unwrap_or_else(PoisonError::into_inner);
        debug!(
            fields = schema.as_ref().map_or(0, Schema::len),
            "validation schema replaced"
        );
        *guard = schema.map(Arc::new);
    }

    pub fn validation_schema(&self) -> Option<Arc<Schema>> {
        self.schema
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn wrap<H: Handler>(&self, handler: H) -> Wrapped<H> {
        Wrapped {
            gate: self.clone(),
            handler: Arc::new(handler),
        }
    }

    /// Run validation and, when the schema declares the token field, token
    /// verification. Verified claims replace the raw token in `event`.
    pub fn admit(&self, event: &mut Event, context: &Context) -> Result<(), InvocationError> {
        let started = Instant::now();
        let result = self.check(event, context.stage_variables());

        if let Some(metrics) = &self.metrics {
            metrics
                .admission_duration_seconds
                .observe(started.elapsed().as_secs_f64());
            match &result {
                Ok(()) => metrics.record_admitted(),
                Err(err) => {
                    let stage = match err {
                        InvocationError::Token(_) => STAGE_TOKEN,
                        _ => STAGE_VALIDATION,
                    };
                    metrics.record_rejected(stage, err.code());
                }
            }
        }

        result
    }

    fn check(
        &self,
        event: &mut Event,
        stage: Option<&StageVariables>,
    ) -> Result<(), InvocationError> {
        let Some(schema) = self.validation_schema() else {
            debug!("no validation schema registered");
            return Ok(());
        };

        schema.validate(event.as_map())?;

        let verifier = TokenVerifier::resolve(&self.jwt.configuration(), stage);
        if !schema.declares(verifier.token_name()) {
            debug!(
                field = verifier.token_name(),
                "schema does not declare token field, skipping verification"
            );
            return Ok(());
        }

        let claims = verifier.verify(event.as_map(), stage)?;
        event.insert(verifier.token_name(), claims.into_value());
        Ok(())
    }
}

impl fmt::Debug for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gate")
            .field("jwt", &self.jwt)
            .field("schema", &self.validation_schema())
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

/// A handler guarded by a [`Gate`].
pub struct Wrapped<H> {
    gate: Gate,
    handler: Arc<H>,
}

impl<H> Clone for Wrapped<H> {
    fn clone(&self) -> Self {
        Self {
            gate: self.gate.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<H: Handler> Wrapped<H> {
    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    /// Process one invocation. The outcome is delivered through `context`;
    /// the handler may still complete after this returns.
    pub async fn invoke(&self, event: Event, context: Context) {
        let span = info_span!("invocation", invocation_id = %context.invocation_id());
        self.run(event, context).instrument(span).await
    }

    /// Invoke with a fresh context and wait for the outcome.
    pub async fn call(&self, event: Event) -> Outcome {
        let (context, pending) = Context::channel();
        self.invoke(event, context).await;
        pending.await
    }

    pub async fn call_with_stage_variables(
        &self,
        event: Event,
        stage_variables: StageVariables,
    ) -> Outcome {
        let (context, pending) = Context::channel();
        self.invoke(event, context.with_stage_variables(stage_variables))
            .await;
        pending.await
    }

    async fn run(&self, mut event: Event, context: Context) {
        if let Err(err) = self.gate.admit(&mut event, &context) {
            warn!(code = err.code(), error = %err, "event rejected before handler");
            context.fail(err);
            return;
        }

        debug!("invoking handler");
        let call = AssertUnwindSafe(self.handler.call(event, context.clone())).catch_unwind();
        let err = match call.await {
            Ok(Ok(())) => return,
            Ok(Err(err)) => err,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(panic = %message, "handler panicked");
                anyhow!("handler panicked: {message}")
            }
        };

        if context.fail(err) {
            debug!("handler returned an error, invocation failed");
        } else {
            debug!("handler returned an error after completing, ignored");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
