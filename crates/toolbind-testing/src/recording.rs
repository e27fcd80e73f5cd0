//! # Recording Tool
//!
//! Wraps a tool and keeps a log of every `execute` call, so tests can assert
//! on what an agent actually sent.

use std::sync::{Arc, Mutex};
use toolbind_core::{Tool, ToolContext, ToolResult, Value};

/// One logged call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub input: Value,
    /// The result, or the error's display form.
    pub outcome: Result<Value, String>,
}

/// A [`Tool`] that delegates to another and records each call.
#[derive(Clone)]
pub struct RecordingTool {
    inner: Arc<dyn Tool>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl RecordingTool {
    pub fn new(inner: impl Tool + 'static) -> Self {
        Self::from_arc(Arc::new(inner))
    }

    pub fn from_arc(inner: Arc<dyn Tool>) -> Self {
        Self {
            inner,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get the number of times this tool has been called
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Get the history of calls, oldest first
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Check if the tool was called with a specific input
    pub fn was_called_with(&self, input: &Value) -> bool {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .any(|call| &call.input == input)
    }

    /// Number of calls that returned an error
    pub fn failure_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.outcome.is_err())
            .count()
    }

    /// Reset call history
    pub fn reset(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl Tool for RecordingTool {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn parameter_schema(&self) -> &serde_json::Value {
        self.inner.parameter_schema()
    }

    fn execute(&self, context: &ToolContext, input: Value) -> ToolResult<Value> {
        let result = self.inner.execute(context, input.clone());
        let outcome = match &result {
            Ok(value) => Ok(value.clone()),
            Err(error) => Err(error.to_string()),
        };
        self.calls
            .lock()
            .unwrap()
            .push(RecordedCall { input, outcome });
        result
    }
}

impl std::fmt::Debug for RecordingTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingTool")
            .field("name", &self.inner.name())
            .field("calls", &self.call_count())
            .finish()
    }
}
