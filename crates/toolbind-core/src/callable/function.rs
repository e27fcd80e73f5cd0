//! [`Callable`] for ordinary functions and closures.
//!
//! Three families are accepted, each with up to six input parameters:
//!
//! - `Fn(A1, .., An) -> R`
//! - `Fn(&ToolContext, A1, .., An) -> R`
//! - `Fn(C, A1, .., An) -> R` where `C: ContextParam`
//!
//! Every `Ai` implements [`FromValue`] and `R` implements
//! [`IntoToolOutput`]. Anything else does not compile, so a non-invocable
//! registration is caught before the program runs.

use super::{Callable, CallableDescriptor, InvokeError, IntoToolOutput};
use crate::cache::Caches;
use crate::context::{ContextParam, ToolContext};
use crate::convert::FromValue;
use crate::pool::ArgumentBuffer;
use crate::shape::Shape;
use crate::value::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Conversion of a function into a shared [`Callable`].
///
/// `M` is inferred from the function's signature and only keeps the
/// blanket impls apart.
pub trait IntoCallable<M>: Sized {
    fn into_callable(self) -> Arc<dyn Callable>;
}

#[doc(hidden)]
pub enum ByRefContext {}

#[doc(hidden)]
pub enum OwnedContext {}

/// A native function paired with its descriptor.
pub struct FnCallable<F, M> {
    f: F,
    descriptor: CallableDescriptor,
    _marker: PhantomData<fn() -> M>,
}

impl<F, M> FnCallable<F, M> {
    fn new(f: F, descriptor: CallableDescriptor) -> Self {
        Self {
            f,
            descriptor,
            _marker: PhantomData,
        }
    }
}

impl<F, M> fmt::Debug for FnCallable<F, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCallable")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

fn bind_slot<T: FromValue>(
    args: &mut ArgumentBuffer,
    slot: usize,
    caches: &Caches,
) -> Result<T, InvokeError> {
    T::from_value(args.take_value(slot), caches).map_err(|source| InvokeError::Bind { slot, source })
}

macro_rules! impl_plain {
    ($($A:ident $slot:tt),*) => {
        impl<F, R, $($A,)*> IntoCallable<fn($($A,)*) -> R> for F
        where
            F: Fn($($A),*) -> R + Send + Sync + 'static,
            R: IntoToolOutput + 'static,
            $($A: FromValue + 'static,)*
        {
            fn into_callable(self) -> Arc<dyn Callable> {
                let descriptor = CallableDescriptor::new(
                    vec![$(<$A as FromValue>::shape()),*],
                    R::RETURNS_FAILURE,
                );
                Arc::new(FnCallable::<F, fn($($A,)*) -> R>::new(self, descriptor))
            }
        }

        impl<F, R, $($A,)*> Callable for FnCallable<F, fn($($A,)*) -> R>
        where
            F: Fn($($A),*) -> R + Send + Sync + 'static,
            R: IntoToolOutput + 'static,
            $($A: FromValue + 'static,)*
        {
            fn descriptor(&self) -> &CallableDescriptor {
                &self.descriptor
            }

            #[allow(non_snake_case, unused_variables)]
            fn invoke(&self, args: &mut ArgumentBuffer, caches: &Caches) -> Result<Value, InvokeError> {
                $(let $A = bind_slot::<$A>(args, $slot, caches)?;)*
                (self.f)($($A),*).into_output().map_err(InvokeError::Failed)
            }
        }
    };
}

macro_rules! impl_with_context {
    ($($A:ident $slot:tt),*) => {
        impl<F, R, $($A,)*> IntoCallable<(ByRefContext, fn($($A,)*) -> R)> for F
        where
            F: Fn(&ToolContext, $($A),*) -> R + Send + Sync + 'static,
            R: IntoToolOutput + 'static,
            $($A: FromValue + 'static,)*
        {
            fn into_callable(self) -> Arc<dyn Callable> {
                let descriptor = CallableDescriptor::new(
                    vec![Shape::Context, $(<$A as FromValue>::shape()),*],
                    R::RETURNS_FAILURE,
                );
                Arc::new(FnCallable::<F, (ByRefContext, fn($($A,)*) -> R)>::new(self, descriptor))
            }
        }

        impl<F, R, $($A,)*> Callable for FnCallable<F, (ByRefContext, fn($($A,)*) -> R)>
        where
            F: Fn(&ToolContext, $($A),*) -> R + Send + Sync + 'static,
            R: IntoToolOutput + 'static,
            $($A: FromValue + 'static,)*
        {
            fn descriptor(&self) -> &CallableDescriptor {
                &self.descriptor
            }

            #[allow(non_snake_case, unused_variables)]
            fn invoke(&self, args: &mut ArgumentBuffer, caches: &Caches) -> Result<Value, InvokeError> {
                let context = args.take_context(0);
                $(let $A = bind_slot::<$A>(args, $slot, caches)?;)*
                (self.f)(&context, $($A),*).into_output().map_err(InvokeError::Failed)
            }
        }

        impl<F, R, C, $($A,)*> IntoCallable<(OwnedContext, fn(C, $($A,)*) -> R)> for F
        where
            F: Fn(C, $($A),*) -> R + Send + Sync + 'static,
            R: IntoToolOutput + 'static,
            C: ContextParam,
            $($A: FromValue + 'static,)*
        {
            fn into_callable(self) -> Arc<dyn Callable> {
                let descriptor = CallableDescriptor::new(
                    vec![Shape::Context, $(<$A as FromValue>::shape()),*],
                    R::RETURNS_FAILURE,
                );
                Arc::new(FnCallable::<F, (OwnedContext, fn(C, $($A,)*) -> R)>::new(self, descriptor))
            }
        }

        impl<F, R, C, $($A,)*> Callable for FnCallable<F, (OwnedContext, fn(C, $($A,)*) -> R)>
        where
            F: Fn(C, $($A),*) -> R + Send + Sync + 'static,
            R: IntoToolOutput + 'static,
            C: ContextParam,
            $($A: FromValue + 'static,)*
        {
            fn descriptor(&self) -> &CallableDescriptor {
                &self.descriptor
            }

            #[allow(non_snake_case, unused_variables)]
            fn invoke(&self, args: &mut ArgumentBuffer, caches: &Caches) -> Result<Value, InvokeError> {
                let context = C::from_context(&args.take_context(0));
                $(let $A = bind_slot::<$A>(args, $slot, caches)?;)*
                (self.f)(context, $($A),*).into_output().map_err(InvokeError::Failed)
            }
        }
    };
}

impl_plain!();
impl_plain!(A1 0);
impl_plain!(A1 0, A2 1);
impl_plain!(A1 0, A2 1, A3 2);
impl_plain!(A1 0, A2 1, A3 2, A4 3);
impl_plain!(A1 0, A2 1, A3 2, A4 3, A5 4);
impl_plain!(A1 0, A2 1, A3 2, A4 3, A5 4, A6 5);

impl_with_context!();
impl_with_context!(A1 1);
impl_with_context!(A1 1, A2 2);
impl_with_context!(A1 1, A2 2, A3 3);
impl_with_context!(A1 1, A2 2, A3 3, A4 4);
impl_with_context!(A1 1, A2 2, A3 3, A4 4, A5 5);
impl_with_context!(A1 1, A2 2, A3 3, A4 4, A5 5, A6 6);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use tokio_util::sync::CancellationToken;

    fn callable<M>(f: impl IntoCallable<M>) -> Arc<dyn Callable> {
        f.into_callable()
    }

    fn add(a: i64, b: i64) -> i64 {
        a + b
    }

    fn cancelled(context: &ToolContext) -> bool {
        context.is_cancelled()
    }

    fn checked_div(a: f64, b: f64) -> Result<f64, BoxError> {
        if b == 0.0 {
            return Err("division by zero".into());
        }
        Ok(a / b)
    }

    #[test]
    fn test_plain_descriptor() {
        let c = callable(add);
        let d = c.descriptor();
        assert_eq!(d.parameter_shapes(), &[Shape::Int, Shape::Int]);
        assert!(!d.has_leading_context());
        assert!(!d.returns_failure());
    }

    #[test]
    fn test_context_descriptors() {
        let by_ref = callable(cancelled);
        assert_eq!(by_ref.descriptor().parameter_shapes(), &[Shape::Context]);
        assert_eq!(by_ref.descriptor().bindable_count(), 0);

        let owned = callable(|token: CancellationToken, name: String| -> String {
            format!("{name}:{}", token.is_cancelled())
        });
        assert!(owned.descriptor().has_leading_context());
        assert_eq!(owned.descriptor().bindable_shapes(), &[Shape::Text]);
    }

    #[test]
    fn test_failure_slot_detected() {
        let c = callable(checked_div);
        assert!(c.descriptor().returns_failure());
    }

    #[test]
    fn test_invoke_binds_slots() {
        let caches = Caches::new();
        let c = callable(add);
        let mut args = ArgumentBuffer::new(2);
        args.bind(0, Value::from("40"));
        args.bind(1, Value::Float(2.9));
        assert_eq!(c.invoke(&mut args, &caches).unwrap(), Value::Int(42));
        assert!(args.is_clear());
    }

    #[test]
    fn test_invoke_passes_context() {
        let caches = Caches::new();
        let c = callable(cancelled);
        let context = ToolContext::new();
        context.cancel();

        let mut args = ArgumentBuffer::new(1);
        args.bind_context(0, context);
        assert_eq!(c.invoke(&mut args, &caches).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_invoke_reports_slot_of_bad_argument() {
        let caches = Caches::new();
        let c = callable(|_: &ToolContext, a: i64, b: bool| a > 0 && b);
        let mut args = ArgumentBuffer::new(3);
        args.bind(1, Value::Int(1));
        args.bind(2, Value::from("maybe"));
        match c.invoke(&mut args, &caches) {
            Err(InvokeError::Bind { slot, .. }) => assert_eq!(slot, 2),
            other => panic!("expected bind error, got {other:?}"),
        }
    }

    #[test]
    fn test_invoke_failure_is_verbatim() {
        let caches = Caches::new();
        let c = callable(checked_div);
        let mut args = ArgumentBuffer::new(2);
        args.bind(0, Value::Int(1));
        args.bind(1, Value::Int(0));
        match c.invoke(&mut args, &caches) {
            Err(InvokeError::Failed(err)) => assert_eq!(err.to_string(), "division by zero"),
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
