//! Partials, partial blocks and decorator blocks.

use std::rc::Rc;

use tracing::{instrument, trace};

use crate::interpreter::classifier::CallSite;
use crate::interpreter::context::{Frame, PartialBlockFrame};
use crate::interpreter::error::compute_suggestions;
use crate::interpreter::invocation::{Call, DecoratorCall};
use crate::interpreter::registry::Partial;
use crate::interpreter::scope::FrameScope;
use crate::interpreter::{Evaluator, RenderError};
use crate::parser::ast::{
    BlockStatement, Expression, Hash, PartialBlockStatement, PartialStatement,
};
use crate::types::Value;

/// The name that renders the body of the enclosing partial block.
const PARTIAL_BLOCK: &str = "@partial-block";

impl Evaluator<'_> {
    /// `{{> name context key=value}}`.
    #[instrument(level = "debug", skip_all, fields(name = ?node.name.original()))]
    pub(crate) fn partial(&mut self, node: &PartialStatement) -> Result<String, RenderError> {
        if node.name.original().as_deref() == Some(PARTIAL_BLOCK) {
            let output = self.partial_block_reference()?;
            return Ok(self.indent(&node.indent, output));
        }

        let name = self.partial_name(&node.name)?;
        let partial = self.lookup_partial(&name)?;
        let output = self.with_scope(|scope| {
            scope.stack_partial_context(&node.params, node.hash.as_ref())?;
            if !scope.options.compat {
                scope.mark_boundary();
            }
            scope.render_partial(&partial)
        })?;
        Ok(self.indent(&node.indent, output))
    }

    /// `{{#> name}}fallback{{/name}}`.
    ///
    /// The body renders first, against the caller's context, and stands in
    /// for the partial when none is registered. While the partial renders
    /// the body is reachable as `{{> @partial-block}}`.
    #[instrument(level = "debug", skip_all, fields(name = ?node.name.original()))]
    pub(crate) fn partial_block(
        &mut self,
        node: &PartialBlockStatement,
    ) -> Result<String, RenderError> {
        self.with_scope(|scope| {
            scope.stack_partial_context(&node.params, node.hash.as_ref())?;
            scope.push_block_params(Frame::new(Value::Undefined, Value::Undefined));

            let fallback = scope.accept_program(&node.program)?;
            let captured_depth = scope.frames.depth();
            scope.push_partial_block(PartialBlockFrame {
                fallback: fallback.clone(),
                program: Rc::clone(&node.program),
                captured_depth,
            });
            if !scope.options.compat {
                scope.mark_boundary();
            }

            let name = scope.partial_name(&node.name)?;
            match scope.find_partial(&name) {
                Some(partial) => scope.render_partial(&partial),
                None => Ok(fallback),
            }
        })
    }

    /// `{{> @partial-block}}`: reuses the eagerly rendered body while the
    /// scope it was rendered in is still innermost, and renders it again
    /// against the live scope otherwise.
    fn partial_block_reference(&mut self) -> Result<String, RenderError> {
        let Some(block) = self.frames.partial_blocks.last().cloned() else {
            return Err(RenderError::MissingPartial {
                name: PARTIAL_BLOCK.to_string(),
                suggestions: Vec::new(),
            });
        };

        let captured = block
            .captured_depth
            .checked_sub(1)
            .and_then(|index| self.frames.contexts.get(index));
        let unchanged = match (self.frames.innermost(), captured) {
            (Some(now), Some(captured)) => now.context.same(&captured.context),
            _ => false,
        };
        if unchanged {
            trace!("partial block fallback reused");
            return Ok(block.fallback);
        }

        trace!("partial block rendered again");
        self.with_scope(|scope| {
            scope.hide_partial_block();
            scope.accept_program(&block.program)
        })
    }

    /// `{{#*name args}}body{{/name}}`. Decorators run as the walk reaches
    /// them and produce no output.
    pub(crate) fn decorator_block(&mut self, block: &BlockStatement) -> Result<(), RenderError> {
        let name = block.path.original().unwrap_or_default();
        let decorator = self
            .decorator(&name)
            .ok_or_else(|| RenderError::MissingDecorator { name: name.clone() })?;
        let (args, options) = self.helper_options(&CallSite::block(block)?, true)?;
        decorator.call(self, DecoratorCall { args, options })
    }

    /// A partial's name: the source text of a path, or the string form of
    /// any other expression's value.
    fn partial_name(&mut self, name: &Expression) -> Result<String, RenderError> {
        match name {
            Expression::Path(path) => Ok(path.original.clone()),
            other => Ok(self.accept_expression(other)?.to_string()),
        }
    }

    /// Inline partials on the context chain first, then registered ones.
    pub(crate) fn find_partial(&self, name: &str) -> Option<Partial> {
        self.frames
            .inline_partial(name)
            .or_else(|| self.registered_partial(name))
            .cloned()
    }

    fn lookup_partial(&self, name: &str) -> Result<Partial, RenderError> {
        if let Some(partial) = self.find_partial(name) {
            return Ok(partial);
        }
        let mut known: Vec<String> = self.frames.inline_partial_names().cloned().collect();
        known.extend(self.registered_partial_names().cloned());
        Err(RenderError::MissingPartial {
            name: name.to_string(),
            suggestions: compute_suggestions(name, known.iter()),
        })
    }

    fn render_partial(&mut self, partial: &Partial) -> Result<String, RenderError> {
        let context = self.this();
        match partial {
            Partial::Template(program) => self.accept_program(program),
            Partial::Function(function) => {
                let call = Call {
                    this: Value::Undefined,
                    args: vec![context],
                    options: None,
                };
                Ok(function.call(self, call)?.to_output())
            }
            Partial::Block(body) => body.call(self, context),
        }
    }

    /// Applies a standalone partial's indentation to its output.
    fn indent(&self, indent: &str, output: String) -> String {
        if indent.is_empty() {
            output
        } else if self.options.prevent_indent {
            format!("{indent}{output}")
        } else {
            indent_lines(indent, &output)
        }
    }
}

impl FrameScope<'_, '_> {
    /// Pushes the context a partial renders against: its argument, or the
    /// caller's context, merged with its hash.
    fn stack_partial_context(
        &mut self,
        params: &[Expression],
        hash: Option<&Hash>,
    ) -> Result<(), RenderError> {
        if params.len() > 1 {
            return Err(RenderError::UnsupportedPartialArity {
                count: params.len(),
            });
        }
        let context = match params.first() {
            Some(param) => self.accept_expression(param)?,
            None if self.options.explicit_partial_context => Value::empty_object(),
            None => self.this(),
        };
        let context = match hash {
            Some(hash) => {
                let mut merged = context.spread();
                merged.extend(self.hash(hash)?);
                Value::object(merged)
            }
            None => context,
        };
        let data = self.data();
        self.push_context(context, data)
    }
}

/// Prefixes every line with `indent`, except a final empty line.
fn indent_lines(indent: &str, output: &str) -> String {
    let lines: Vec<&str> = output.split('\n').collect();
    let last = lines.len() - 1;
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if line.is_empty() && i == last {
                String::new()
            } else {
                format!("{indent}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indent_skips_trailing_empty_line() {
        assert_eq!(indent_lines("  ", "a\nb\n"), "  a\n  b\n");
        assert_eq!(indent_lines("  ", "a"), "  a");
        assert_eq!(indent_lines("  ", "a\n\nb"), "  a\n  \n  b");
    }
}
