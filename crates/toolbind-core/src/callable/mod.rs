//! Callable Descriptor and the invocation seam.
//!
//! A registered function is turned into an `Arc<dyn Callable>` exactly once.
//! Its [`CallableDescriptor`] records the parameter shapes and result
//! convention, so each call only has to bind and invoke.

mod function;
mod output;

pub use function::{FnCallable, IntoCallable};
pub use output::IntoToolOutput;

use crate::cache::Caches;
use crate::error::{BindError, BoxError, ConstructionError};
use crate::pool::ArgumentBuffer;
use crate::shape::Shape;
use crate::value::Value;
use std::fmt;
use thiserror::Error;

/// Immutable per-function metadata, computed at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallableDescriptor {
    parameter_shapes: Vec<Shape>,
    has_leading_context: bool,
    first_bindable_index: usize,
    returns_failure: bool,
}

impl CallableDescriptor {
    /// Describe a function from its parameter shapes, in declaration order.
    ///
    /// A [`Shape::Context`] in position 0 marks the leading context slot.
    pub fn new(parameter_shapes: Vec<Shape>, returns_failure: bool) -> Self {
        let has_leading_context = parameter_shapes.first().is_some_and(Shape::is_context);
        Self {
            first_bindable_index: usize::from(has_leading_context),
            has_leading_context,
            parameter_shapes,
            returns_failure,
        }
    }

    /// Reject descriptors the engine cannot drive: a context slot anywhere
    /// other than position 0.
    pub fn validate(&self, tool: &str) -> Result<(), ConstructionError> {
        match self
            .parameter_shapes
            .iter()
            .skip(1)
            .position(Shape::is_context)
        {
            Some(offset) => Err(ConstructionError::MisplacedContext {
                tool: tool.to_string(),
                position: offset + 1,
            }),
            None => Ok(()),
        }
    }

    /// Total parameters, context slot included.
    pub fn parameter_count(&self) -> usize {
        self.parameter_shapes.len()
    }

    pub fn parameter_shapes(&self) -> &[Shape] {
        &self.parameter_shapes
    }

    pub fn has_leading_context(&self) -> bool {
        self.has_leading_context
    }

    pub fn first_bindable_index(&self) -> usize {
        self.first_bindable_index
    }

    /// Shapes of the parameters bound from caller input.
    pub fn bindable_shapes(&self) -> &[Shape] {
        &self.parameter_shapes[self.first_bindable_index..]
    }

    pub fn bindable_count(&self) -> usize {
        self.parameter_shapes.len() - self.first_bindable_index
    }

    /// Whether the function reports failure alongside its result.
    pub fn returns_failure(&self) -> bool {
        self.returns_failure
    }
}

impl fmt::Display for CallableDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("fn(")?;
        for (i, shape) in self.parameter_shapes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{shape}")?;
        }
        f.write_str(")")?;
        if self.returns_failure {
            f.write_str(" -> result")?;
        }
        Ok(())
    }
}

/// Why an invocation did not produce a result.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The value in slot `slot` did not convert to the parameter type.
    #[error("argument {slot}: {source}")]
    Bind { slot: usize, source: BindError },

    /// The function ran and reported failure.
    #[error(transparent)]
    Failed(BoxError),
}

/// A function the engine can drive.
///
/// Implemented for ordinary functions and closures through
/// [`IntoCallable`]. Implement it by hand for functions whose parameter
/// list is only known at runtime.
pub trait Callable: Send + Sync {
    fn descriptor(&self) -> &CallableDescriptor;

    /// Run the function on a buffer whose slots have been filled per the
    /// descriptor: the context in slot 0 when declared, input values after.
    fn invoke(&self, args: &mut ArgumentBuffer, caches: &Caches) -> Result<Value, InvokeError>;
}
