//! Error types for the template evaluator.

use strsim::levenshtein;
use thiserror::Error;

use crate::parser::ParseError;

/// An error that occurred while registering, compiling or rendering.
///
/// Every variant is fatal for the render that raised it; partially built
/// output is discarded and frames are unwound.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The AST contains a node type the evaluator cannot run.
    #[error("Unknown node type: {kind}")]
    UnknownNodeKind { kind: String },

    /// A helper call resolved to something other than a function.
    #[error("{name} is not a function")]
    NotCallable { name: String },

    /// A call with arguments resolved to nothing.
    #[error("Missing helper: \"{name}\"")]
    MissingHelper { name: String },

    /// No inline or registered partial has this name.
    #[error("The partial {name} could not be found{}", did_you_mean(suggestions))]
    MissingPartial {
        name: String,
        suggestions: Vec<String>,
    },

    /// A partial was invoked with more than one positional argument.
    #[error("Unsupported number of partial arguments: {count}")]
    UnsupportedPartialArity { count: usize },

    /// A name map was registered together with a single value.
    #[error("Arg not supported with multiple {kind}")]
    InvalidMultiRegistration { kind: &'static str },

    #[error("Attempting to register a partial called \"{name}\" as undefined")]
    AttemptToRegisterUndefinedPartial { name: String },

    /// A partial was registered as something other than source or a function.
    #[error("partial \"{name}\" must be a template string or a function, got {type_name}")]
    InvalidPartial {
        name: String,
        type_name: &'static str,
    },

    /// A decorator block names an unregistered decorator.
    #[error("missing decorator {name}")]
    MissingDecorator { name: String },

    /// A built-in helper was called with the wrong arguments.
    #[error("{message}")]
    HelperArity {
        helper: &'static str,
        message: String,
    },

    /// Nested contexts exceeded the configured limit, usually a partial
    /// that includes itself.
    #[error("maximum render depth of {limit} exceeded")]
    MaxDepthExceeded { limit: usize },

    #[error("invalid precompiled template: {source}")]
    InvalidPrecompiled {
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// An error raised by a user helper.
    #[error("{0}")]
    Custom(String),
}

impl RenderError {
    /// Convenience constructor for helper-raised errors.
    pub fn custom(message: impl Into<String>) -> RenderError {
        RenderError::Custom(message.into())
    }
}

fn did_you_mean(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", suggestions.join(", "))
    }
}

/// Compute typo suggestions for a missing name.
///
/// - distance <= 1 for names <= 3 chars
/// - distance <= 2 for longer names
/// - Limit to 3 suggestions, sorted by distance
pub fn compute_suggestions<'a>(
    name: &str,
    available: impl Iterator<Item = &'a String>,
) -> Vec<String> {
    let max_distance = if name.len() <= 3 { 1 } else { 2 };
    let mut suggestions: Vec<(usize, String)> = available
        .filter_map(|candidate| {
            let dist = levenshtein(name, candidate);
            if dist <= max_distance && dist > 0 {
                Some((dist, candidate.clone()))
            } else {
                None
            }
        })
        .collect();

    suggestions.sort_by_key(|(dist, _)| *dist);
    suggestions.into_iter().take(3).map(|(_, s)| s).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestions_are_close_names_only() {
        let names = ["header".to_string(), "footer".to_string(), "nav".to_string()];
        assert_eq!(compute_suggestions("heder", names.iter()), vec!["header"]);
        assert_eq!(compute_suggestions("nab", names.iter()), vec!["nav"]);
        assert!(compute_suggestions("sidebar", names.iter()).is_empty());
    }

    #[test]
    fn missing_partial_message_lists_suggestions() {
        let error = RenderError::MissingPartial {
            name: "heder".to_string(),
            suggestions: vec!["header".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "The partial heder could not be found (did you mean: header?)"
        );
    }
}
