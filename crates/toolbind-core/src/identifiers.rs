//! Tool name validation.
//!
//! Tool names end up in model prompts, logs and lookup tables, so they are
//! held to the same rules everywhere:
//!
//! - Non-empty, at most 128 characters
//! - No leading or trailing whitespace
//! - Only alphanumeric characters, hyphens (`-`), underscores (`_`) and dots (`.`)
//! - No path traversal sequences (`../`, `./`)

use std::fmt;
use thiserror::Error;

/// Maximum length of a tool name.
pub const MAX_NAME_LENGTH: usize = 128;

/// Why a tool name was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("name cannot be empty")]
    Empty,
    #[error("name cannot be whitespace-only")]
    WhitespaceOnly,
    #[error("name cannot have leading or trailing whitespace")]
    LeadingTrailingWhitespace,
    #[error("name can only contain alphanumeric characters, hyphens, underscores, and dots")]
    InvalidCharacters,
    #[error("name too long ({length} chars, max {max})")]
    TooLong { length: usize, max: usize },
    #[error("name cannot contain path traversal sequences (../)")]
    PathTraversal,
}

/// A validated tool name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToolName(String);

impl ToolName {
    /// Validate and wrap a tool name.
    ///
    /// ```rust
    /// use toolbind_core::ToolName;
    ///
    /// assert!(ToolName::parse("get_weather").is_ok());
    /// assert!(ToolName::parse("web.search-v2").is_ok());
    /// assert!(ToolName::parse("").is_err());
    /// assert!(ToolName::parse("../etc").is_err());
    /// assert!(ToolName::parse("get weather").is_err());
    /// ```
    pub fn parse(name: &str) -> Result<Self, NameError> {
        validate(name)?;
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ToolName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn validate(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }

    if name.trim().is_empty() {
        return Err(NameError::WhitespaceOnly);
    }

    if name != name.trim() {
        return Err(NameError::LeadingTrailingWhitespace);
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(NameError::TooLong {
            length: name.len(),
            max: MAX_NAME_LENGTH,
        });
    }

    if name.contains("../") || name.contains("./") {
        return Err(NameError::PathTraversal);
    }

    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(NameError::InvalidCharacters);
    }

    Ok(())
}
