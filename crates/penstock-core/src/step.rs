//! The pipeline-step contract.
//!
//! This module defines the [`PipelineStep`] trait every adapter implements,
//! the [`Next`] continuation, and the [`Pipeline`] that sequences steps
//! strictly in configured order.
//!
//! # Execution model
//!
//! A step performs exactly one external call, publishes its outcome into the
//! [`StepContext`], and advances the chain by calling [`Next::run`].
//! Returning an error without calling `run` short-circuits the chain; the
//! host receives the error unchanged and maps it to a response.
//!
//! # Example
//!
//! ```ignore
//! use penstock_core::{BoxFuture, Next, PipelineStep, Request, StepContext, StepResult};
//!
//! struct Touch;
//!
//! impl PipelineStep for Touch {
//!     fn name(&self) -> &'static str {
//!         "touch"
//!     }
//!
//!     fn invoke<'a>(
//!         &'a self,
//!         ctx: &'a mut StepContext,
//!         request: Request,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, StepResult<()>> {
//!         Box::pin(async move {
//!             ctx.publish("touched", serde_json::json!(true));
//!             next.run(ctx, request).await
//!         })
//!     }
//! }
//! ```

use crate::context::StepContext;
use crate::error::StepResult;
use crate::types::Request;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed future returned by pipeline steps.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The core step trait.
///
/// Constructing a step is pure and synchronous; all I/O happens inside
/// [`invoke`](Self::invoke), once per request.
///
/// # Invariants
///
/// - A step makes at most one external call per invocation
/// - A step calls `next.run()` exactly once unless it short-circuits
/// - A step never writes to the outgoing response; it only publishes into
///   the context
pub trait PipelineStep: Send + Sync + 'static {
    /// Returns the unique name of this step.
    ///
    /// The name prefixes every error message the step forwards and is used
    /// for logging.
    fn name(&self) -> &'static str;

    /// Processes the request through this step.
    fn invoke<'a>(
        &'a self,
        ctx: &'a mut StepContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, StepResult<()>>;
}

/// Continuation invoking the rest of the chain.
///
/// Passed to each step; consumed by [`run`](Self::run) so it can only be
/// called once. Not calling it short-circuits the pipeline.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    /// More steps to process.
    Chain {
        step: &'a dyn PipelineStep,
        next: Box<Next<'a>>,
    },
    /// End of chain.
    Terminal(Box<dyn FnOnce(&mut StepContext, Request) -> BoxFuture<'static, StepResult<()>> + Send + 'a>),
}

impl<'a> Next<'a> {
    /// Creates a `Next` that will invoke the given step, then `next`.
    #[must_use]
    pub fn chain(step: &'a dyn PipelineStep, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                step,
                next: Box::new(next),
            },
        }
    }

    /// Creates a terminal `Next` invoking the given continuation.
    #[must_use]
    pub fn terminal<F>(f: F) -> Self
    where
        F: FnOnce(&mut StepContext, Request) -> BoxFuture<'static, StepResult<()>> + Send + 'a,
    {
        Self {
            inner: NextInner::Terminal(Box::new(f)),
        }
    }

    /// Creates a terminal `Next` that succeeds without doing anything.
    ///
    /// Useful for driving a single step in isolation, e.g. in tests.
    #[must_use]
    pub fn noop() -> Self {
        Self::terminal(|_ctx, _request| Box::pin(async { Ok(()) }))
    }

    /// Invokes the rest of the chain.
    ///
    /// Consumes `self` so the chain can only be advanced once.
    pub async fn run(self, ctx: &mut StepContext, request: Request) -> StepResult<()> {
        match self.inner {
            NextInner::Chain { step, next } => {
                tracing::trace!(step = step.name(), "advancing pipeline");
                step.invoke(ctx, request, *next).await
            }
            NextInner::Terminal(f) => f(ctx, request).await,
        }
    }
}

/// A step created from an async function.
///
/// Allows defining simple steps without implementing the trait directly.
pub struct FnStep<F> {
    name: &'static str,
    func: F,
}

impl<F> FnStep<F> {
    /// Creates a new function-based step.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F, Fut> PipelineStep for FnStep<F>
where
    F: Fn(&mut StepContext, Request, Next<'_>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = StepResult<()>> + Send + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn invoke<'a>(
        &'a self,
        ctx: &'a mut StepContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, StepResult<()>> {
        Box::pin(async move { (self.func)(ctx, request, next).await })
    }
}

/// An ordered chain of pipeline steps.
///
/// Steps execute strictly in configured order; a step only begins after the
/// previous one has advanced the chain. The first error short-circuits the
/// run and is returned unchanged.
///
/// # Example
///
/// ```ignore
/// let pipeline = Pipeline::builder()
///     .step(insert)
///     .step(find_back)
///     .build();
///
/// let mut ctx = StepContext::new();
/// pipeline.run(&mut ctx, request).await?;
/// ```
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Runs the request through every step in order.
    pub async fn run(&self, ctx: &mut StepContext, request: Request) -> StepResult<()> {
        // Build the chain from back to front, ending in a no-op terminal.
        let mut next = Next::noop();
        for step in self.steps.iter().rev() {
            next = Next::chain(step.as_ref(), next);
        }
        next.run(ctx, request).await
    }

    /// Returns the names of all steps in order.
    #[must_use]
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if the pipeline has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Builder for constructing a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    steps: Vec<Arc<dyn PipelineStep>>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Appends a step to the chain.
    #[must_use]
    pub fn step<S: PipelineStep>(mut self, step: S) -> Self {
        self.steps.push(Arc::new(step));
        self
    }

    /// Appends an already-shared step to the chain.
    #[must_use]
    pub fn shared_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline { steps: self.steps }
    }
}
