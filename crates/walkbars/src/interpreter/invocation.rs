//! The calling convention shared by helpers, decorators and callable
//! partials.

use std::rc::Rc;

use crate::interpreter::context::{Frame, zip_block_params};
use crate::interpreter::{Evaluator, RenderError};
use crate::parser::ast::Program;
use crate::types::{Map, Value};

/// Arguments to a host [`Function`](crate::Function).
///
/// `this` is the innermost context at the call site. Helper invocations
/// carry [`HelperOptions`]; plain calls of a context function and callable
/// partials do not.
#[derive(Debug, Clone, Default)]
pub struct Call {
    pub this: Value,
    pub args: Vec<Value>,
    pub options: Option<HelperOptions>,
}

impl Call {
    /// A call with a receiver and no arguments.
    pub fn bare(this: Value) -> Call {
        Call {
            this,
            args: Vec::new(),
            options: None,
        }
    }

    /// The positional argument at `index`, or undefined.
    pub fn arg(&self, index: usize) -> Value {
        self.args.get(index).cloned().unwrap_or_default()
    }

    pub fn options(&self) -> Option<&HelperOptions> {
        self.options.as_ref()
    }

    /// A hash argument by name, or undefined.
    pub fn hash(&self, key: &str) -> Value {
        self.options
            .as_ref()
            .and_then(|options| options.hash.get(key).cloned())
            .unwrap_or_default()
    }
}

/// The trailing options object of a helper call.
#[derive(Debug, Clone)]
pub struct HelperOptions {
    /// The call's path as written, e.g. `each` or `foo.bar`.
    pub name: String,
    pub hash: Map,
    /// `{ root, ...@data }` at the call site.
    pub data: Value,
    /// The block body; `None` for non-block calls.
    pub program: Option<ProgramFn>,
    /// The `{{else}}` body; `None` for non-block calls.
    pub inverse: Option<ProgramFn>,
}

impl HelperOptions {
    /// Reads an own property of `value`, the same guarded access templates use.
    pub fn lookup_property(&self, value: &Value, key: &str) -> Value {
        value.get_own_property(key).unwrap_or_default()
    }

    /// Renders the block body against `context`.
    pub fn render(&self, evaluator: &mut Evaluator<'_>, context: Value) -> Result<String, RenderError> {
        self.render_with(evaluator, context, BlockOverlay::default())
    }

    /// Renders the block body with explicit `@data` and block parameters.
    pub fn render_with(
        &self,
        evaluator: &mut Evaluator<'_>,
        context: Value,
        overlay: BlockOverlay,
    ) -> Result<String, RenderError> {
        match &self.program {
            Some(program) => program.invoke(evaluator, context, overlay),
            None => Ok(String::new()),
        }
    }

    /// Renders the `{{else}}` body against `context`.
    pub fn render_inverse(
        &self,
        evaluator: &mut Evaluator<'_>,
        context: Value,
    ) -> Result<String, RenderError> {
        match &self.inverse {
            Some(inverse) => inverse.invoke(evaluator, context, BlockOverlay::default()),
            None => Ok(String::new()),
        }
    }

    /// The same options with the body and inverse exchanged.
    pub fn swapped(&self) -> HelperOptions {
        HelperOptions {
            program: self.inverse.clone(),
            inverse: self.program.clone(),
            ..self.clone()
        }
    }
}

/// Extra state for one invocation of a block body.
#[derive(Debug, Clone, Default)]
pub struct BlockOverlay {
    /// `@data` for the pushed frame. Without it the frame inherits the
    /// current `@data`.
    pub data: Option<Value>,
    /// Values for the body's `as |a b|` names.
    pub block_params: Option<Vec<Value>>,
}

/// A renderable block body handed to helpers as `fn` or `inverse`.
///
/// A missing body renders as the empty string.
#[derive(Debug, Clone, Default)]
pub struct ProgramFn {
    program: Option<Rc<Program>>,
}

impl ProgramFn {
    pub(crate) fn new(program: Option<Rc<Program>>) -> ProgramFn {
        ProgramFn { program }
    }

    /// Number of block parameters the body declares.
    pub fn block_params(&self) -> usize {
        self.program
            .as_ref()
            .map_or(0, |program| program.block_params.len())
    }

    /// Renders the body with `context` as the new innermost scope.
    pub fn call(&self, evaluator: &mut Evaluator<'_>, context: Value) -> Result<String, RenderError> {
        self.invoke(evaluator, context, BlockOverlay::default())
    }

    /// Renders the body.
    ///
    /// An undefined `context` renders in the current scope without pushing a
    /// frame. Block parameters are bound only when the body declares names
    /// and the overlay supplies values.
    ///
    /// # Example
    ///
    /// ```
    /// use walkbars::{object, BlockOverlay, RuntimeOptions, Value, Walkbars};
    ///
    /// let options = RuntimeOptions::new().with_helper("twice", |evaluator, call| {
    ///     let Some(options) = call.options() else {
    ///         return Ok(Value::Undefined);
    ///     };
    ///     let mut out = String::new();
    ///     for i in 0..2 {
    ///         let overlay = BlockOverlay {
    ///             data: None,
    ///             block_params: Some(vec![Value::from(i)]),
    ///         };
    ///         out += &options.render_with(evaluator, call.this.clone(), overlay)?;
    ///     }
    ///     Ok(Value::from(out))
    /// });
    /// let walkbars = Walkbars::new();
    /// let output = walkbars
    ///     .render_with("{{#twice as |i|}}{{name}}{{i}} {{/twice}}", object! { "name" => "x" }, options)
    ///     .unwrap();
    /// assert_eq!(output, "x0 x1 ");
    /// ```
    pub fn invoke(
        &self,
        evaluator: &mut Evaluator<'_>,
        context: Value,
        overlay: BlockOverlay,
    ) -> Result<String, RenderError> {
        let Some(program) = &self.program else {
            return Ok(String::new());
        };
        let mut scope = evaluator.scope();
        if !context.is_undefined() {
            let data = overlay.data.unwrap_or_else(|| scope.data());
            scope.push_context(context, data)?;
        }
        if !program.block_params.is_empty()
            && let Some(values) = &overlay.block_params
        {
            let bindings = zip_block_params(&program.block_params, values);
            scope.push_block_params(Frame::new(bindings, Value::Undefined));
        }
        scope.accept_program(program)
    }
}

/// Arguments to a decorator.
#[derive(Debug, Clone)]
pub struct DecoratorCall {
    pub args: Vec<Value>,
    pub options: HelperOptions,
}

impl DecoratorCall {
    /// The positional argument at `index`, or undefined.
    pub fn arg(&self, index: usize) -> Value {
        self.args.get(index).cloned().unwrap_or_default()
    }
}
