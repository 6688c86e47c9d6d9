//! Type-erased callback wrappers.
//!
//! Each wrapper closes over its concrete payload type and downcasts the
//! dispatched payload before calling the user closure. The returned future
//! owns a clone of the payload, so it never borrows from the dispatcher.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{self, BoxFuture};

use super::definitions::{HookContext, HookError, HookKind};

/// Payload as seen by the registry's internal storage.
pub(crate) type ErasedPayload = dyn Any + Send + Sync;

/// Filter output before it is downcast back to the caller's type.
pub(crate) type ErasedOutput = Box<dyn Any + Send>;

type ActionFn = dyn Fn(&ErasedPayload, HookContext) -> BoxFuture<'static, Result<(), HookError>>
    + Send
    + Sync;

type FilterFn = dyn Fn(&ErasedPayload, HookContext) -> BoxFuture<'static, Result<ErasedOutput, HookError>>
    + Send
    + Sync;

/// A stored callback.
#[derive(Clone)]
pub(crate) enum Callback {
    Action(Arc<ActionFn>),
    Filter(Arc<FilterFn>),
}

impl std::fmt::Debug for Callback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Action(_) => f.write_str("Callback::Action(<closure>)"),
            Self::Filter(_) => f.write_str("Callback::Filter(<closure>)"),
        }
    }
}

impl Callback {
    /// Wraps an action closure taking its payload by value.
    pub(crate) fn action<P, F, Fut>(callback: F) -> Self
    where
        P: Clone + Send + Sync + 'static,
        F: Fn(P, HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        Self::Action(Arc::new(move |payload: &ErasedPayload, ctx: HookContext| {
            match payload.downcast_ref::<P>() {
                Some(payload) => callback(payload.clone(), ctx).boxed(),
                None => future::ready(Err(HookError::payload_mismatch::<P>(&ctx.hook_name))).boxed(),
            }
        }))
    }

    /// Wraps a filter closure returning the replacement payload.
    pub(crate) fn filter<P, F, Fut>(callback: F) -> Self
    where
        P: Clone + Send + Sync + 'static,
        F: Fn(P, HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<P, HookError>> + Send + 'static,
    {
        Self::Filter(Arc::new(move |payload: &ErasedPayload, ctx: HookContext| {
            match payload.downcast_ref::<P>() {
                Some(payload) => callback(payload.clone(), ctx)
                    .map(|result| result.map(|next| Box::new(next) as ErasedOutput))
                    .boxed(),
                None => future::ready(Err(HookError::payload_mismatch::<P>(&ctx.hook_name))).boxed(),
            }
        }))
    }

    pub(crate) fn kind(&self) -> HookKind {
        match self {
            Self::Action(_) => HookKind::Action,
            Self::Filter(_) => HookKind::Filter,
        }
    }

    /// Invokes the callback, returning the filter output if it is a filter.
    ///
    /// Panics raised while building or polling the future become
    /// [`HookError::Panicked`].
    pub(crate) async fn invoke(
        &self,
        payload: &ErasedPayload,
        ctx: HookContext,
    ) -> Result<Option<ErasedOutput>, HookError> {
        match self {
            Self::Action(callback) => guarded(|| callback(payload, ctx)).await.map(|()| None),
            Self::Filter(callback) => guarded(|| callback(payload, ctx)).await.map(Some),
        }
    }
}

/// Runs a future factory, converting panics into errors.
pub(crate) async fn guarded<'a, T, F>(make: F) -> Result<T, HookError>
where
    F: FnOnce() -> BoxFuture<'a, Result<T, HookError>>,
{
    let fut = match std::panic::catch_unwind(AssertUnwindSafe(make)) {
        Ok(fut) => fut,
        Err(panic) => return Err(HookError::from_panic(panic)),
    };

    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(HookError::from_panic(panic)),
    }
}
