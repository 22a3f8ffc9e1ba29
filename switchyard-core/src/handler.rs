//! # Handlers
//!
//! The terminal point of the dispatch pipeline. A handler is any async
//! function whose parameters implement [`FromArg`] and whose output
//! implements [`IntoReply`]:
//!
//! ```rust,ignore
//! async fn show_user(id: i32, session: Session) -> String { ... }
//! ```
//!
//! The parameter list is read once at registration through
//! [`Handler::params`]; the route compiler uses it to resolve `{}`
//! placeholders and to build the binding plan. At request time the bound
//! [`Arguments`] are converted before any hook runs, so a coercion failure
//! never reaches user code, while the handler itself is only called once
//! the pipeline reaches its invoking step.

use crate::{
    context::{Arguments, FromArg},
    error::RequestMappingError,
    param::ParamKind,
    response::{IntoReply, Reply, ResponseKind},
    signal::Interrupt,
};
use std::{future::Future, marker::PhantomData, pin::Pin, sync::Arc};

/// An async route endpoint taking the parameter tuple `Args`.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a route handler",
    label = "missing `Handler<{Args}>` implementation",
    note = "Handlers are async functions of at most 8 `FromArg` parameters returning an `IntoReply` value."
)]
pub trait Handler<Args>: Send + Sync + 'static {
    /// The handler's output.
    type Output: IntoReply;

    /// The future of one call.
    type Future: Future<Output = Self::Output> + Send + 'static;

    /// Declared parameter kinds in order.
    fn params() -> Vec<ParamKind>;

    /// Convert the bound `args` into the parameter tuple.
    fn extract(args: &Arguments) -> Result<Args, RequestMappingError>;

    /// Call the handler with already converted parameters.
    fn call(&self, args: Args) -> Self::Future;
}

macro_rules! impl_handler {
    ($($T:ident),*) => {
        impl<F, Fut, Out, $($T,)*> Handler<($($T,)*)> for F
        where
            F: Fn($($T,)*) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = Out> + Send + 'static,
            Out: IntoReply,
            $($T: FromArg,)*
        {
            type Output = Out;
            type Future = Fut;

            fn params() -> Vec<ParamKind> {
                vec![$($T::KIND,)*]
            }

            #[allow(non_snake_case, unused_variables, unused_mut, unused_assignments)]
            fn extract(args: &Arguments) -> Result<($($T,)*), RequestMappingError> {
                let mut index = 0;
                $(
                    let $T = $T::from_arg(args, index)?;
                    index += 1;
                )*
                Ok(($($T,)*))
            }

            #[allow(non_snake_case)]
            fn call(&self, args: ($($T,)*)) -> Self::Future {
                let ($($T,)*) = args;
                (self)($($T,)*)
            }
        }
    };
}

impl_handler!();
impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);
impl_handler!(T1, T2, T3, T4);
impl_handler!(T1, T2, T3, T4, T5);
impl_handler!(T1, T2, T3, T4, T5, T6);
impl_handler!(T1, T2, T3, T4, T5, T6, T7);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8);

/// A running handler call.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Reply, Interrupt>> + Send>>;

/// A handler call whose arguments are converted but which has not started.
///
/// Calling it runs the handler body and yields its future.
pub type PendingCall = Box<dyn FnOnce() -> HandlerFuture + Send>;

/// Dynamic object-safe version of [`Handler`].
///
/// Route entries store handlers as `Arc<dyn DynHandler>`.
pub trait DynHandler: Send + Sync + 'static {
    /// Declared parameter kinds in order.
    fn params(&self) -> &[ParamKind];

    /// What the handler's output writes.
    fn response_kind(&self) -> ResponseKind;

    /// Convert `args` and prepare the call (dynamic dispatch version).
    ///
    /// The handler does not run until the returned [`PendingCall`] is called.
    fn call_dyn(&self, args: Arguments) -> Result<PendingCall, RequestMappingError>;
}

struct ErasedHandler<H, Args> {
    handler: Arc<H>,
    params: Vec<ParamKind>,
    _marker: PhantomData<fn(Args)>,
}

impl<H, Args> DynHandler for ErasedHandler<H, Args>
where
    H: Handler<Args>,
    Args: Send + 'static,
{
    fn params(&self) -> &[ParamKind] {
        &self.params
    }

    fn response_kind(&self) -> ResponseKind {
        <H::Output as IntoReply>::KIND
    }

    fn call_dyn(&self, args: Arguments) -> Result<PendingCall, RequestMappingError> {
        let args = H::extract(&args)?;
        let handler = Arc::clone(&self.handler);
        Ok(Box::new(move || {
            let call = handler.call(args);
            Box::pin(async move { call.await.into_reply() })
        }))
    }
}

/// Erase a handler's parameter tuple so it can be stored in a route table.
pub fn erase<H, Args>(handler: H) -> Arc<dyn DynHandler>
where
    H: Handler<Args>,
    Args: Send + 'static,
{
    Arc::new(ErasedHandler {
        handler: Arc::new(handler),
        params: H::params(),
        _marker: PhantomData,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        context::Value,
        param::{ContextKind, ScalarKind, Shape},
        request::{Request, Session},
        response::Response,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn args(values: Vec<Value>) -> Arguments {
        Arguments::new(Request::get("/"), Response::new(), values)
    }

    #[test]
    fn test_params_follow_declaration_order() {
        let handler = erase(|_id: i32, _s: Session, _tags: Vec<String>| async {});
        assert_eq!(
            handler.params(),
            [
                ParamKind::required(ScalarKind::Int),
                ParamKind::Context(ContextKind::Session),
                ParamKind::Value {
                    scalar: ScalarKind::String,
                    shape: Shape::List
                },
            ]
        );
        assert_eq!(handler.response_kind(), ResponseKind::Empty);
    }

    #[tokio::test]
    async fn test_call_converts_arguments() {
        let handler = erase(|a: i32, b: i32| async move { (a + b).to_string() });
        let reply = handler
            .call_dyn(args(vec![Value::Single("2".into()), Value::Single("3".into())]))
            .unwrap()()
            .await
            .unwrap();
        assert_eq!(reply, Reply::Text("5".into()));
    }

    #[test]
    fn test_handler_body_waits_for_pending_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handler = erase(move |_a: i32| {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        });
        let pending = handler.call_dyn(args(vec![Value::Single("1".into())])).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        drop(pending());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_bad_argument_fails_before_call() {
        let handler = erase(|_a: i32| async {});
        let err = handler
            .call_dyn(args(vec![Value::Single("x".into())]))
            .err()
            .unwrap();
        assert_eq!(err.parameter, 0);
    }
}
