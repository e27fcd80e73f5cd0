//! The Tool façade.
//!
//! A [`FunctionTool`] wraps a native function so an agent can call it with
//! loosely typed input. Registration describes the function once; every
//! `execute` reuses that description, a pooled argument buffer and the
//! shared caches.
//!
//! ```rust
//! use toolbind_core::{FunctionTool, Tool, ToolContext, Value};
//!
//! fn add(a: i64, b: i64) -> i64 {
//!     a + b
//! }
//!
//! let tool = FunctionTool::new("add", "Add two integers", add, serde_json::json!({}));
//! let input = Value::sequence(["2", "40"]);
//! let sum = tool.execute(&ToolContext::new(), input).unwrap();
//! assert_eq!(sum, Value::Int(42));
//! ```

use crate::cache::Caches;
use crate::callable::{Callable, CallableDescriptor, IntoCallable, InvokeError};
use crate::config::EngineConfig;
use crate::context::ToolContext;
use crate::error::{BindError, ConstructionError, ToolError, ToolResult};
use crate::identifiers::ToolName;
use crate::pool::{ArgumentBuffer, ArgumentPool};
use crate::shape::Shape;
use crate::stats::PoolStats;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// A named, described, invocable capability.
pub trait Tool: Send + Sync {
    /// Unique name the agent uses to pick this tool.
    fn name(&self) -> &str;

    /// Human-readable description shown to the model.
    fn description(&self) -> &str;

    /// The schema artifact supplied at registration, returned verbatim.
    fn parameter_schema(&self) -> &serde_json::Value;

    /// Bind `input` to the function's parameters and call it.
    ///
    /// `context` is handed to the function when it declares one; the engine
    /// does not inspect it.
    fn execute(&self, context: &ToolContext, input: Value) -> ToolResult<Value>;

    /// Name, description and schema in the form LLM APIs take.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameter_schema().clone(),
        }
    }
}

/// Serializable tool listing entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A [`Tool`] backed by a native function.
pub struct FunctionTool {
    name: ToolName,
    description: String,
    schema: serde_json::Value,
    callable: Arc<dyn Callable>,
    pool: ArgumentPool,
    caches: Arc<Caches>,
}

/// Register a function as a tool. Shorthand for [`FunctionTool::new`].
pub fn new_tool<M>(
    name: &str,
    description: impl Into<String>,
    function: impl IntoCallable<M>,
    schema: serde_json::Value,
) -> FunctionTool {
    FunctionTool::new(name, description, function, schema)
}

impl FunctionTool {
    /// Register a function as a tool.
    ///
    /// # Panics
    ///
    /// If `name` is not a valid tool name. Use [`try_new`](Self::try_new)
    /// for names that come from outside the program.
    pub fn new<M>(
        name: &str,
        description: impl Into<String>,
        function: impl IntoCallable<M>,
        schema: serde_json::Value,
    ) -> Self {
        Self::try_new(name, description, function, schema).unwrap_or_else(|error| panic!("{error}"))
    }

    pub fn try_new<M>(
        name: &str,
        description: impl Into<String>,
        function: impl IntoCallable<M>,
        schema: serde_json::Value,
    ) -> Result<Self, ConstructionError> {
        Self::builder(name)
            .description(description)
            .schema(schema)
            .function(function)
            .build()
    }

    /// Register a hand-written [`Callable`].
    ///
    /// # Panics
    ///
    /// If the name is invalid or the descriptor puts a context parameter
    /// anywhere but first.
    pub fn from_callable(
        name: &str,
        description: impl Into<String>,
        callable: Arc<dyn Callable>,
        schema: serde_json::Value,
    ) -> Self {
        Self::try_from_callable(name, description, callable, schema)
            .unwrap_or_else(|error| panic!("{error}"))
    }

    pub fn try_from_callable(
        name: &str,
        description: impl Into<String>,
        callable: Arc<dyn Callable>,
        schema: serde_json::Value,
    ) -> Result<Self, ConstructionError> {
        Self::builder(name)
            .description(description)
            .schema(schema)
            .callable(callable)
            .build()
    }

    pub fn builder(name: &str) -> ToolBuilder {
        ToolBuilder::new(name)
    }

    pub fn descriptor(&self) -> &CallableDescriptor {
        self.callable.descriptor()
    }

    pub fn tool_name(&self) -> &ToolName {
        &self.name
    }

    pub fn caches(&self) -> &Arc<Caches> {
        &self.caches
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    fn binding_error(&self, parameter: usize, source: BindError) -> ToolError {
        ToolError::Binding {
            tool: self.name.to_string(),
            parameter,
            source,
        }
    }

    /// Fast-reject the value against its slot's shape, then store it.
    fn stage(
        &self,
        args: &mut ArgumentBuffer,
        parameter: usize,
        shape: &Shape,
        value: Value,
    ) -> ToolResult<()> {
        self.caches
            .conversions()
            .check(value.kind(), shape)
            .map_err(|source| self.binding_error(parameter, source))?;
        args.bind(self.descriptor().first_bindable_index() + parameter, value);
        Ok(())
    }

    fn bind_input(&self, args: &mut ArgumentBuffer, input: Value) -> ToolResult<()> {
        let descriptor = self.callable.descriptor();
        let shapes = descriptor.bindable_shapes();

        match (shapes, input) {
            ([], Value::Null) => Ok(()),
            ([], other) => Err(ToolError::UnexpectedParameters {
                tool: self.name.to_string(),
                received: other.kind(),
            }),
            (_, Value::Null) => Err(ToolError::MissingParameters {
                tool: self.name.to_string(),
                expected: shapes.len(),
            }),
            ([shape], Value::Sequence(mut items)) if items.len() == 1 && !shape.accepts_sequence() => {
                let item = items.pop().unwrap_or_default();
                self.stage(args, 0, shape, item)
            }
            ([shape], input) => self.stage(args, 0, shape, input),
            (shapes, Value::Sequence(items)) if items.len() == shapes.len() => {
                for (parameter, (shape, item)) in shapes.iter().zip(items).enumerate() {
                    self.stage(args, parameter, shape, item)?;
                }
                Ok(())
            }
            (shapes, Value::Sequence(items)) => Err(self.binding_error(
                0,
                BindError::LengthMismatch {
                    expected: shapes.len(),
                    actual: items.len(),
                },
            )),
            (_, other) => Err(self.binding_error(
                0,
                BindError::unsupported(other.kind(), Shape::sequence(Shape::Any)),
            )),
        }
    }
}

impl Tool for FunctionTool {
    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameter_schema(&self) -> &serde_json::Value {
        &self.schema
    }

    fn execute(&self, context: &ToolContext, input: Value) -> ToolResult<Value> {
        trace!(tool = %self.name, input = %input.kind(), "executing tool");

        let descriptor = self.callable.descriptor();
        let mut args = self.pool.acquire();
        if descriptor.has_leading_context() {
            args.bind_context(0, context.clone());
        }

        self.bind_input(&mut args, input)?;

        self.callable
            .invoke(&mut args, &self.caches)
            .map_err(|error| match error {
                InvokeError::Bind { slot, source } => {
                    debug!(tool = %self.name, slot, error = %source, "argument conversion failed");
                    self.binding_error(slot - descriptor.first_bindable_index(), source)
                }
                InvokeError::Failed(inner) => ToolError::Failed(inner),
            })
    }
}

impl fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("descriptor", self.callable.descriptor())
            .finish_non_exhaustive()
    }
}

/// Step-by-step [`FunctionTool`] construction.
pub struct ToolBuilder {
    name: String,
    description: String,
    schema: serde_json::Value,
    callable: Option<Arc<dyn Callable>>,
    config: Option<EngineConfig>,
    caches: Option<Arc<Caches>>,
}

impl ToolBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            schema: serde_json::Value::Null,
            callable: None,
            config: None,
            caches: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn schema(mut self, schema: serde_json::Value) -> Self {
        self.schema = schema;
        self
    }

    #[must_use]
    pub fn function<M>(mut self, function: impl IntoCallable<M>) -> Self {
        self.callable = Some(function.into_callable());
        self
    }

    #[must_use]
    pub fn callable(mut self, callable: Arc<dyn Callable>) -> Self {
        self.callable = Some(callable);
        self
    }

    /// Pool sizing for this tool. Defaults to [`EngineConfig::process`].
    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Caches for this tool. Defaults to [`Caches::global`].
    #[must_use]
    pub fn caches(mut self, caches: Arc<Caches>) -> Self {
        self.caches = Some(caches);
        self
    }

    pub fn build(self) -> Result<FunctionTool, ConstructionError> {
        let name = ToolName::parse(&self.name).map_err(|reason| ConstructionError::InvalidName {
            name: self.name.clone(),
            reason,
        })?;

        let callable = self
            .callable
            .ok_or_else(|| ConstructionError::NotInvocable {
                tool: self.name.clone(),
            })?;
        callable.descriptor().validate(name.as_str())?;

        let config = self.config.unwrap_or_else(|| EngineConfig::process().clone());
        let pool = ArgumentPool::new(
            callable.descriptor().parameter_count(),
            config.pool_max_idle,
            config.pool_prewarm,
        );

        debug!(
            tool = %name,
            signature = %callable.descriptor(),
            "registered tool"
        );

        Ok(FunctionTool {
            name,
            description: self.description,
            schema: self.schema,
            callable,
            pool,
            caches: self.caches.unwrap_or_else(Caches::global),
        })
    }
}

impl fmt::Debug for ToolBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolBuilder")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("has_callable", &self.callable.is_some())
            .finish_non_exhaustive()
    }
}
