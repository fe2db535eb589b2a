//! Error types for toggle operations.

use miette::Diagnostic;
use thiserror::Error;

use crate::host::HostError;

/// Errors that can occur while building or running an inline tool.
#[derive(Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum ToggleError {
    /// The configured tag is not a usable element name.
    #[error("invalid markup tag {tag:?}: {reason}")]
    #[diagnostic(code(weaver::inline_tool::invalid_tag))]
    InvalidTag { tag: String, reason: &'static str },

    /// Wrap was asked to enclose an empty range.
    #[error("cannot wrap a collapsed range")]
    #[diagnostic(
        code(weaver::inline_tool::collapsed_range),
        help("only wrap ranges that cover some content")
    )]
    CollapsedRange,

    /// The shortcut string could not be parsed into a key combination.
    #[error("invalid shortcut {shortcut:?}: {reason}")]
    #[diagnostic(
        code(weaver::inline_tool::invalid_shortcut),
        help("use the `CMD+SHIFT+M` notation")
    )]
    InvalidShortcut {
        shortcut: String,
        reason: &'static str,
    },

    /// The tool configuration could not be deserialized.
    #[error("invalid tool configuration: {0}")]
    #[diagnostic(code(weaver::inline_tool::config))]
    Config(#[from] serde_json::Error),

    /// The host document rejected an operation.
    ///
    /// This indicates a host/editor contract violation (for example a range
    /// boundary the host's primitives refuse) and is never retried.
    #[error("host rejected operation: {0}")]
    #[diagnostic(code(weaver::inline_tool::host))]
    Host(#[from] HostError),
}
