//! # Toolbind Core
//!
//! The invocation engine behind toolbind: turns native Rust functions into
//! tools an agent can call with loosely typed, model-produced input.
//!
//! ## Core Concepts
//!
//! - **[`Value`]**: the structured input and output type (null, scalars,
//!   sequences, string-keyed mappings)
//! - **[`FunctionTool`]**: a registered function behind the [`Tool`] trait
//! - **[`CallableDescriptor`]**: per-function metadata computed once at
//!   registration
//! - **Coercion**: the rules mapping a [`Value`] onto a parameter's
//!   [`Shape`], see [`coercion`]
//! - **[`Caches`]**: process-wide record field and coercion feasibility
//!   caches
//! - **[`record!`]**: declares structs bound from mappings by field name
//!
//! ## Example
//!
//! ```rust
//! use toolbind_core::{FunctionTool, Tool, ToolContext, Value, record};
//!
//! record! {
//!     #[derive(Debug)]
//!     pub struct Query {
//!         pub city: String,
//!         pub days: u8 => "forecast_days",
//!     }
//! }
//!
//! fn forecast(_ctx: &ToolContext, query: Query) -> String {
//!     format!("{} for {} days", query.city, query.days)
//! }
//!
//! let tool = FunctionTool::new(
//!     "forecast",
//!     "Weather forecast for a city",
//!     forecast,
//!     serde_json::json!({"type": "object"}),
//! );
//!
//! let input = Value::from_json_str(r#"{"city": "Oslo", "forecast_days": "3"}"#).unwrap();
//! let output = tool.execute(&ToolContext::new(), input).unwrap();
//! assert_eq!(output, Value::from("Oslo for 3 days"));
//! ```

pub mod cache;
pub mod callable;
pub mod coercion;
pub mod config;
pub mod context;
pub mod convert;
pub mod error;
pub mod identifiers;
pub mod pool;
pub mod record;
pub mod shape;
pub mod stats;
pub mod tool;
pub mod value;

pub use cache::{Caches, ConversionCache, FieldCache, FieldDescriptor};
pub use callable::{Callable, CallableDescriptor, IntoCallable, IntoToolOutput, InvokeError};
pub use config::{ConfigError, EngineConfig, EngineConfigBuilder};
pub use context::{ContextParam, ToolContext};
pub use convert::{FromValue, IntoValue};
pub use error::{BindError, BindResult, BoxError, ConstructionError, ToolError, ToolResult};
pub use identifiers::{NameError, ToolName};
pub use pool::{Arg, ArgumentBuffer, ArgumentPool};
pub use record::{FieldSpec, Record};
pub use shape::{RecordShape, Shape};
pub use stats::{CacheStats, EngineStats, PoolStats};
pub use tool::{FunctionTool, Tool, ToolBuilder, ToolDefinition, new_tool};
pub use value::{Mapping, Value, ValueKind};

pub use tokio_util::sync::CancellationToken;
