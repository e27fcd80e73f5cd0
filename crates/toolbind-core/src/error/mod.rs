//! Error Types
//!
//! Errors are split by the stage that produces them:
//! - `bind`: a value could not be coerced to the shape a parameter requires
//! - `tool`: the `execute` taxonomy and tool construction failures
//!
//! Configuration errors live next to the configuration builder.

mod bind;
mod tool;

pub use bind::{BindError, BindResult};
pub use tool::{BoxError, ConstructionError, ToolError, ToolResult};
