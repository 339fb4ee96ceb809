//! Miette diagnostic wrapper for template parse errors.

use std::path::Path;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;
use walkbars::ParseError;

/// A miette-compatible diagnostic for template syntax errors.
///
/// Note: Fields are read by miette derive macros, not directly by code.
#[derive(Debug, Error, Diagnostic)]
#[error("syntax error: {message}")]
#[diagnostic(code(walkbars::syntax))]
pub struct TemplateDiagnostic {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    message: String,

    #[help]
    help: Option<String>,
}

impl TemplateDiagnostic {
    /// Create a diagnostic from a ParseError with source context.
    pub fn from_parse_error(path: &Path, content: &str, err: &ParseError) -> Self {
        // Clamp to the content to avoid a miette panic on out-of-bounds spans.
        let offset = err.offset().min(content.len());
        let length = usize::from(offset < content.len());

        TemplateDiagnostic {
            src: NamedSource::new(path.display().to_string(), content.to_string()),
            span: (offset, length).into(),
            message: err.message().to_string(),
            help: help_for(err.message()),
        }
    }
}

fn help_for(message: &str) -> Option<String> {
    if message.contains("doesn't match") {
        Some("every {{#block}} needs a {{/block}} with the same name".to_string())
    } else if message.starts_with("unclosed") {
        Some("add the missing closing tag".to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_points_at_error_offset() {
        let content = "{{#a}}x{{/b}}";
        let err = walkbars::parse(content).unwrap_err();
        let diagnostic = TemplateDiagnostic::from_parse_error(Path::new("t.hbs"), content, &err);
        assert!(diagnostic.span.offset() <= content.len());
        assert_eq!(diagnostic.message, "a doesn't match b");
        assert!(diagnostic.help.is_some());
    }
}
