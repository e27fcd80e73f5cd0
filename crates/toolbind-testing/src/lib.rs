//! # Toolbind Testing Utilities
//!
//! Shared fixtures for toolbind's integration tests and benchmarks.
//!
//! ## Components
//!
//! - **Fixtures**: record types and tool functions covering every binding path
//! - **Recording Tool**: a [`Tool`](toolbind_core::Tool) wrapper that logs its calls
//! - **Tracing**: one-call subscriber setup for test output
//!
//! ## Usage
//!
//! ```rust
//! use toolbind_testing::{fixtures, init_test_tracing};
//! use toolbind_core::{Tool, ToolContext, Value};
//!
//! init_test_tracing();
//! let tool = fixtures::add_tool();
//! let sum = tool.execute(&ToolContext::new(), Value::sequence([1, 2])).unwrap();
//! assert_eq!(sum, Value::Int(3));
//! ```

/// Fixture records and tool functions
pub mod fixtures;
/// Call-recording tool wrapper
pub mod recording;
/// Tracing subscriber setup for tests
pub mod tracing_setup;

pub use recording::{RecordedCall, RecordingTool};
pub use tracing_setup::init_test_tracing;
