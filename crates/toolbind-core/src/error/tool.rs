//! Tool execution and construction errors.

use super::bind::BindError;
use crate::identifiers::NameError;
use crate::value::ValueKind;
use thiserror::Error;

/// Error type a registered function may fail with.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by [`Tool::execute`](crate::tool::Tool::execute).
#[derive(Debug, Error)]
pub enum ToolError {
    /// The function needs bindable parameters but the input was `Null`.
    #[error("tool '{tool}' requires {expected} parameter(s) but no input was provided")]
    MissingParameters { tool: String, expected: usize },

    /// The function takes no bindable parameters but input was supplied.
    #[error("tool '{tool}' takes no parameters but received {received} input")]
    UnexpectedParameters { tool: String, received: ValueKind },

    /// Input could not be bound to a parameter. Nothing was invoked.
    #[error("tool '{tool}' could not bind parameter {parameter}: {source}")]
    Binding {
        tool: String,
        parameter: usize,
        source: BindError,
    },

    /// The function itself reported failure. Carried through unmodified.
    #[error(transparent)]
    Failed(BoxError),
}

impl ToolError {
    /// The bind failure, when binding is what went wrong.
    pub fn bind_error(&self) -> Option<&BindError> {
        match self {
            ToolError::Binding { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Borrow the function's own error as its concrete type.
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            ToolError::Failed(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Take back the function's own error, if this is one.
    pub fn into_failure(self) -> Option<BoxError> {
        match self {
            ToolError::Failed(inner) => Some(inner),
            _ => None,
        }
    }
}

/// Result type alias for tool execution.
pub type ToolResult<T> = Result<T, ToolError>;

/// A tool could not be built. Registering such a tool is a programming
/// defect, so the plain constructors panic with this error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error("invalid tool name '{name}': {reason}")]
    InvalidName { name: String, reason: NameError },

    #[error("tool '{tool}' has nothing to invoke")]
    NotInvocable { tool: String },

    #[error(
        "tool '{tool}' declares a context parameter at position {position}; only position 0 may take the context"
    )]
    MisplacedContext { tool: String, position: usize },
}
