//! Path resolution.
//!
//! A path resolves by the first rule that applies:
//! 1. scoped paths (`./x`, `this.x`, `../x`) read the context chain only
//! 2. block parameters, innermost frame first
//! 3. registered helpers, unless the caller asked for values only
//! 4. the context (or `@data`) frame selected by the path's depth

use tracing::trace;

use crate::interpreter::Evaluator;
use crate::interpreter::context::{Field, find_in_stack, find_or_undefined, has_boundary};
use crate::parser::ast::PathExpression;
use crate::types::Value;

impl Evaluator<'_> {
    /// Resolves a path to a value, or undefined.
    pub fn lookup(&self, path: &PathExpression, never_helper: bool) -> Value {
        if path.is_scoped() {
            trace!(path = %path.original, "scoped");
            if path.parts.is_empty() {
                return self.frame_value(path);
            }
            return find_or_undefined(self.current(path), &path.parts);
        }

        if let Some(head) = path.head()
            && !path.data
            && let Some(bindings) = find_in_stack(&self.frames.block_params, 0, head, Field::Context)
        {
            trace!(path = %path.original, "block parameter");
            return find_or_undefined(bindings, &path.parts);
        }

        if !never_helper && let Some(helper) = self.helper(&path.original) {
            trace!(path = %path.original, "helper");
            if self.options.known_helpers_only && !self.options.is_known_helper(&path.original) {
                return Value::Undefined;
            }
            return helper.clone();
        }

        let value = find_or_undefined(self.current(path), &path.parts);
        trace!(path = %path.original, found = !value.is_undefined(), "context");
        value
    }

    /// The value a path's parts are read from. In compat mode a bare name
    /// searches outward for the nearest frame defining its first part.
    fn current(&self, path: &PathExpression) -> Value {
        if self.options.compat && let Some(head) = path.head() {
            let field = Field::for_data(path.data);
            return find_in_stack(&self.frames.contexts, path.depth, head, field)
                .unwrap_or_default();
        }
        self.frame_value(path)
    }

    /// The context (or `@data`) of the frame `path.depth` hops out.
    /// Crossing a boundary or running off the stack yields `{}`.
    pub(crate) fn frame_value(&self, path: &PathExpression) -> Value {
        if has_boundary(&self.frames.contexts, path.depth) {
            return Value::empty_object();
        }
        match self.frames.frame(path.depth) {
            Some(frame) if path.data => frame.data.clone(),
            Some(frame) => frame.context.clone(),
            None => Value::empty_object(),
        }
    }
}
