//! Compile and runtime options.

use bon::Builder;
use indexmap::IndexMap;

use crate::interpreter::registry::Decorator;
use crate::interpreter::{Call, Evaluator, RenderError};
use crate::types::{Function, Map, Value};

/// Helpers a template may always treat as helpers, even when a bare name
/// would otherwise be ambiguous.
const BUILTIN_KNOWN_HELPERS: [&str; 8] = [
    "helperMissing",
    "blockHelperMissing",
    "each",
    "if",
    "unless",
    "with",
    "log",
    "lookup",
];

/// Options fixed when a template is compiled.
///
/// # Example
///
/// ```
/// use walkbars::CompileOptions;
///
/// let options = CompileOptions::builder().no_escape(true).build();
/// assert!(options.is_known_helper("each"));
/// assert!(!options.is_known_helper("shout"));
/// ```
#[derive(Debug, Clone, Builder)]
pub struct CompileOptions {
    /// Write mustache output without HTML escaping.
    #[builder(default)]
    pub no_escape: bool,

    /// Names to add to (`true`) or remove from (`false`) the built-in known
    /// helpers.
    #[builder(default)]
    pub known_helpers: IndexMap<String, bool>,

    /// Only known helpers are resolved as helpers.
    #[builder(default)]
    pub known_helpers_only: bool,

    /// Bare names search every enclosing context, ignoring partial
    /// boundaries.
    #[builder(default)]
    pub compat: bool,

    /// Partials without an argument render against `{}` instead of the
    /// caller's context.
    #[builder(default)]
    pub explicit_partial_context: bool,

    /// Keep the whitespace around standalone tags.
    #[builder(default)]
    pub ignore_standalone: bool,

    /// Do not indent the lines of a standalone partial.
    #[builder(default)]
    pub prevent_indent: bool,

    /// Maximum number of nested context frames.
    #[builder(default = 128)]
    pub max_depth: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions::builder().build()
    }
}

impl CompileOptions {
    /// Whether `name` is in the known-helper set.
    pub fn is_known_helper(&self, name: &str) -> bool {
        self.known_helpers
            .get(name)
            .copied()
            .unwrap_or_else(|| BUILTIN_KNOWN_HELPERS.contains(&name))
    }
}

/// Options for a single render.
///
/// Helpers, partials and decorators given here shadow the instance's
/// registries for this render only.
#[derive(Debug, Clone, Default, Builder)]
pub struct RuntimeOptions {
    /// Ambient `@data`. `@root` is always the render context.
    #[builder(default)]
    pub data: Map,

    #[builder(default)]
    pub helpers: IndexMap<String, Value>,

    /// Partial sources or functions.
    #[builder(default)]
    pub partials: IndexMap<String, Value>,

    #[builder(default)]
    pub decorators: IndexMap<String, Decorator>,
}

impl RuntimeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn with_helper<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Evaluator<'_>, Call) -> Result<Value, RenderError> + 'static,
    {
        self.helpers.insert(name.into(), Value::Function(Function::new(f)));
        self
    }

    pub fn with_partial(mut self, name: impl Into<String>, partial: impl Into<Value>) -> Self {
        self.partials.insert(name.into(), partial.into());
        self
    }

    pub fn with_decorator(mut self, name: impl Into<String>, decorator: Decorator) -> Self {
        self.decorators.insert(name.into(), decorator);
        self
    }
}

/// Options for [`precompile`](crate::precompile).
#[derive(Debug, Clone, Default, Builder)]
#[builder(on(String, into))]
pub struct PrecompileOptions {
    /// Name recorded in the precompiled output, usually the source path.
    pub src_name: Option<String>,

    #[builder(default)]
    pub compile: CompileOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_known_helpers_merge_over_builtins() {
        let mut known = IndexMap::new();
        known.insert("shout".to_string(), true);
        known.insert("each".to_string(), false);
        let options = CompileOptions::builder().known_helpers(known).build();
        assert!(options.is_known_helper("shout"));
        assert!(!options.is_known_helper("each"));
        assert!(options.is_known_helper("with"));
    }

    #[test]
    fn defaults_are_off() {
        let options = CompileOptions::default();
        assert!(!options.no_escape);
        assert!(!options.compat);
        assert_eq!(options.max_depth, 128);
    }
}
