//! # Fixture Records and Tools
//!
//! Small, predictable functions exercising every binding path: positional
//! scalars, records with aliases and private fields, nested records,
//! containers, context parameters and failure results.

use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;
use toolbind_core::{FunctionTool, ToolContext, record};

record! {
    /// A user as a model would describe one.
    #[derive(Debug, Clone, PartialEq)]
    pub struct User {
        pub name: String => "user_name",
        pub age: i64,
        pub email: Option<String>,
        pub tags: Vec<String>,
        internal_id: u64,
    }
}

impl User {
    /// Never settable from input.
    pub fn internal_id(&self) -> u64 {
        self.internal_id
    }
}

record! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct Address {
        pub street: String,
        pub city: String,
        pub zip: String => "postal_code",
    }
}

record! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct LineItem {
        pub sku: String,
        pub quantity: u32,
        pub unit_price: f64,
    }
}

record! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct Order {
        pub id: u64,
        pub customer: User,
        pub shipping: Address,
        pub items: Vec<LineItem>,
        pub metadata: HashMap<String, String>,
    }
}

/// Failures reported by fixture functions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixtureError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("operation cancelled")]
    Cancelled,
}

pub fn add(a: i64, b: i64) -> i64 {
    a + b
}

pub fn greet(name: String) -> String {
    format!("Hello, {name}!")
}

pub fn ping() -> &'static str {
    "pong"
}

pub fn divide(a: f64, b: f64) -> Result<f64, FixtureError> {
    if b == 0.0 {
        return Err(FixtureError::DivisionByZero);
    }
    Ok(a / b)
}

pub fn describe_user(user: User) -> String {
    format!("{} ({})", user.name, user.age)
}

pub fn echo_user(user: User) -> User {
    user
}

pub fn order_total(order: Order) -> f64 {
    order
        .items
        .iter()
        .map(|item| f64::from(item.quantity) * item.unit_price)
        .sum()
}

pub fn tally(values: Vec<i64>) -> i64 {
    values.iter().sum()
}

pub fn word_lengths(words: Vec<String>) -> HashMap<String, usize> {
    words
        .into_iter()
        .map(|word| {
            let len = word.chars().count();
            (word, len)
        })
        .collect()
}

pub fn is_cancelled(context: &ToolContext) -> bool {
    context.is_cancelled()
}

/// Honors cancellation the way a long-running tool would.
pub fn count_words(context: &ToolContext, text: String) -> Result<usize, FixtureError> {
    if context.is_done() {
        return Err(FixtureError::Cancelled);
    }
    Ok(text.split_whitespace().count())
}

pub fn always_panics(message: String) -> String {
    panic!("{message}")
}

pub fn add_tool() -> FunctionTool {
    FunctionTool::new(
        "add",
        "Add two integers",
        add,
        json!({
            "type": "array",
            "items": {"type": "integer"},
            "minItems": 2,
            "maxItems": 2
        }),
    )
}

pub fn greet_tool() -> FunctionTool {
    FunctionTool::new(
        "greet",
        "Greet someone by name",
        greet,
        json!({"type": "string"}),
    )
}

pub fn ping_tool() -> FunctionTool {
    FunctionTool::new("ping", "Liveness check", ping, json!(null))
}

pub fn divide_tool() -> FunctionTool {
    FunctionTool::new(
        "divide",
        "Divide a by b",
        divide,
        json!({"type": "array", "items": {"type": "number"}}),
    )
}

pub fn describe_user_tool() -> FunctionTool {
    FunctionTool::new(
        "describe_user",
        "One-line summary of a user",
        describe_user,
        json!({
            "type": "object",
            "properties": {
                "user_name": {"type": "string"},
                "age": {"type": "integer"},
                "email": {"type": "string"},
                "tags": {"type": "array", "items": {"type": "string"}}
            }
        }),
    )
}

pub fn echo_user_tool() -> FunctionTool {
    FunctionTool::new("echo_user", "Return the bound user", echo_user, json!({}))
}

pub fn order_total_tool() -> FunctionTool {
    FunctionTool::new(
        "order_total",
        "Sum of line item prices",
        order_total,
        json!({"type": "object"}),
    )
}

pub fn tally_tool() -> FunctionTool {
    FunctionTool::new(
        "tally",
        "Sum a list of integers",
        tally,
        json!({"type": "array", "items": {"type": "integer"}}),
    )
}

pub fn word_lengths_tool() -> FunctionTool {
    FunctionTool::new(
        "word_lengths",
        "Length of each word",
        word_lengths,
        json!({"type": "array", "items": {"type": "string"}}),
    )
}

pub fn is_cancelled_tool() -> FunctionTool {
    FunctionTool::new(
        "is_cancelled",
        "Report the context's cancellation state",
        is_cancelled,
        json!(null),
    )
}

pub fn count_words_tool() -> FunctionTool {
    FunctionTool::new(
        "count_words",
        "Count whitespace-separated words",
        count_words,
        json!({"type": "string"}),
    )
}

pub fn always_panics_tool() -> FunctionTool {
    FunctionTool::new(
        "always_panics",
        "Panics with the given message",
        always_panics,
        json!({"type": "string"}),
    )
}

/// One of every fixture tool.
pub fn all_tools() -> Vec<FunctionTool> {
    vec![
        add_tool(),
        greet_tool(),
        ping_tool(),
        divide_tool(),
        describe_user_tool(),
        echo_user_tool(),
        order_total_tool(),
        tally_tool(),
        word_lengths_tool(),
        is_cancelled_tool(),
        count_words_tool(),
        always_panics_tool(),
    ]
}
