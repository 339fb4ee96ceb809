//! Tree-walking evaluation of parsed templates.
//!
//! The evaluator visits each statement of a [`Program`], resolving paths
//! against the frame stack and calling helpers through the
//! simple / helper / ambiguous protocol. Output is concatenated with
//! JavaScript string coercion.

use tracing::{instrument, trace};

use crate::interpreter::classifier::{CallSite, CallType};
use crate::interpreter::context::FrameStack;
use crate::interpreter::helpers::builtin_helper;
use crate::interpreter::invocation::{Call, HelperOptions, ProgramFn};
use crate::interpreter::registry::{Decorator, Partial, Registry};
use crate::interpreter::{CompileOptions, RenderError};
use crate::parser::ast::{ContentStatement, Expression, Hash, MustacheStatement, Program, Statement};
use crate::types::{Map, Value, escape_expression};

/// Renders templates against a context.
///
/// One evaluator exists per render. Helpers receive it so they can render
/// block bodies, inspect the current scope and register inline partials.
pub struct Evaluator<'r> {
    pub(crate) frames: FrameStack,
    registry: &'r Registry,
    /// Per-render registrations, consulted before `registry`.
    overlay: &'r Registry,
    pub(crate) options: &'r CompileOptions,
}

impl<'r> Evaluator<'r> {
    pub(crate) fn new(
        registry: &'r Registry,
        overlay: &'r Registry,
        options: &'r CompileOptions,
    ) -> Evaluator<'r> {
        Evaluator {
            frames: FrameStack::new(),
            registry,
            overlay,
            options,
        }
    }

    /// Renders `program` with `context` as the root scope. `@root` is the
    /// context; the other `@data` entries come from `data`.
    #[instrument(level = "debug", skip_all)]
    pub(crate) fn render(
        &mut self,
        program: &Program,
        context: Value,
        data: Map,
    ) -> Result<String, RenderError> {
        let mut data = data;
        data.insert("root".to_string(), context.clone());
        self.with_scope(|scope| {
            scope.push_context(context, Value::object(data))?;
            scope.accept_program(program)
        })
    }

    /// The innermost context.
    pub fn this(&self) -> Value {
        self.frames
            .innermost()
            .map(|frame| frame.context.clone())
            .unwrap_or_default()
    }

    /// The innermost `@data`.
    pub fn data(&self) -> Value {
        self.frames
            .innermost()
            .map(|frame| frame.data.clone())
            .unwrap_or_default()
    }

    pub fn compile_options(&self) -> &CompileOptions {
        self.options
    }

    /// Registers a partial on the innermost context frame. It is visible
    /// to that frame's siblings and to every scope nested inside it.
    pub fn register_inline_partial(&mut self, name: impl Into<String>, partial: Partial) {
        if let Some(frame) = self.frames.innermost_mut() {
            frame.partials.insert(name.into(), partial);
        }
    }

    /// A registered helper, per-render registrations first.
    pub fn helper(&self, name: &str) -> Option<&'r Value> {
        self.overlay
            .helper(name)
            .or_else(|| self.registry.helper(name))
    }

    pub(crate) fn registered_partial(&self, name: &str) -> Option<&'r Partial> {
        self.overlay
            .partial(name)
            .or_else(|| self.registry.partial(name))
    }

    pub(crate) fn registered_partial_names(&self) -> impl Iterator<Item = &'r String> {
        self.overlay
            .partial_names()
            .chain(self.registry.partial_names())
    }

    pub(crate) fn decorator(&self, name: &str) -> Option<&'r Decorator> {
        self.overlay
            .decorator(name)
            .or_else(|| self.registry.decorator(name))
    }

    /// Calls a helper by name. Built-in helpers answer when nothing is
    /// registered under the name.
    pub fn call_helper(&mut self, name: &str, call: Call) -> Result<Value, RenderError> {
        match self.helper(name) {
            Some(Value::Function(function)) => function.call(self, call),
            Some(_) => Err(RenderError::NotCallable {
                name: name.to_string(),
            }),
            None => match builtin_helper(name) {
                Some(helper) => helper(self, call),
                None => Err(RenderError::MissingHelper {
                    name: name.to_string(),
                }),
            },
        }
    }

    #[instrument(level = "trace", skip_all, fields(statements = program.body.len()))]
    pub(crate) fn accept_program(&mut self, program: &Program) -> Result<String, RenderError> {
        let mut output = String::new();
        for statement in &program.body {
            output.push_str(&self.accept_statement(statement)?.to_output());
        }
        Ok(output)
    }

    fn accept_statement(&mut self, statement: &Statement) -> Result<Value, RenderError> {
        match statement {
            Statement::Content(content) => Ok(Value::String(self.content(content))),
            Statement::Mustache(mustache) => self.mustache(mustache),
            Statement::Block(block) => self.call(&CallSite::block(block)?),
            Statement::Partial(partial) => self.partial(partial).map(Value::String),
            Statement::PartialBlock(block) => self.partial_block(block).map(Value::String),
            Statement::DecoratorBlock(block) => {
                self.decorator_block(block)?;
                Ok(Value::Undefined)
            }
            Statement::Comment(_) => Ok(Value::Undefined),
            Statement::Decorator(_) | Statement::Unknown => Err(RenderError::UnknownNodeKind {
                kind: statement.kind().to_string(),
            }),
        }
    }

    fn content(&self, content: &ContentStatement) -> String {
        if self.options.ignore_standalone && content.original == "\n" {
            content.original.clone()
        } else {
            content.value.clone()
        }
    }

    fn mustache(&mut self, mustache: &MustacheStatement) -> Result<Value, RenderError> {
        let value = self.call(&CallSite::mustache(mustache)?)?;
        if mustache.escaped && !self.options.no_escape {
            Ok(Value::String(escape_expression(&value)))
        } else {
            Ok(value)
        }
    }

    pub(crate) fn accept_expression(&mut self, expression: &Expression) -> Result<Value, RenderError> {
        match expression {
            Expression::Path(path) => Ok(self.lookup(path, true)),
            Expression::SubExpression(sexpr) => self.call(&CallSite::sub_expression(sexpr)?),
            Expression::String(literal) => Ok(Value::String(literal.value.clone())),
            Expression::Number(literal) => Ok(Value::Number(literal.value)),
            Expression::Boolean(literal) => Ok(Value::Bool(literal.value)),
            Expression::Undefined(_) => Ok(Value::Undefined),
            Expression::Null(_) => Ok(Value::Null),
            Expression::Unknown => Err(RenderError::UnknownNodeKind {
                kind: expression.kind().to_string(),
            }),
        }
    }

    pub(crate) fn hash(&mut self, hash: &Hash) -> Result<Map, RenderError> {
        let mut map = Map::new();
        for pair in &hash.pairs {
            let value = self.accept_expression(&pair.value)?;
            map.insert(pair.key.clone(), value);
        }
        Ok(map)
    }

    #[instrument(level = "trace", skip_all, fields(path = %site.path.original))]
    fn call(&mut self, site: &CallSite<'_>) -> Result<Value, RenderError> {
        let call_type = self.classify(site);
        trace!(?call_type, block = site.is_block());
        match call_type {
            CallType::Simple => self.simple_call(site),
            CallType::Helper => self.helper_call(site),
            CallType::Ambiguous => self.ambiguous_call(site),
        }
    }

    /// A value reference. A function value is called with no arguments;
    /// block forms always go through `blockHelperMissing`.
    fn simple_call(&mut self, site: &CallSite<'_>) -> Result<Value, RenderError> {
        let value = match self.lookup(&site.path, true) {
            Value::Function(function) => {
                let this = self.this();
                function.call(self, Call::bare(this))?
            }
            value => value,
        };
        if site.is_block() {
            self.helper_missing(site, value)
        } else {
            Ok(value)
        }
    }

    /// A bare name resolved against helpers first, then the context.
    fn ambiguous_call(&mut self, site: &CallSite<'_>) -> Result<Value, RenderError> {
        match self.lookup(&site.path, false) {
            Value::Function(function) => {
                let call = self.helper_call_args(site, site.is_block())?;
                let result = function.call(self, call)?;
                let registered = site.path.head().and_then(|head| self.helper(head)).is_some();
                if site.is_block() && !registered {
                    self.helper_missing(site, result)
                } else {
                    Ok(result)
                }
            }
            Value::Undefined => self.helper_missing(site, Value::Undefined),
            value if site.is_block() => self.helper_missing(site, value),
            value => Ok(value),
        }
    }

    fn helper_call(&mut self, site: &CallSite<'_>) -> Result<Value, RenderError> {
        match self.lookup(&site.path, false) {
            Value::Undefined => self.helper_missing(site, Value::Undefined),
            Value::Function(function) => {
                let call = self.helper_call_args(site, site.is_block())?;
                function.call(self, call)
            }
            _ => Err(RenderError::NotCallable {
                name: site.path.head().unwrap_or_default().to_string(),
            }),
        }
    }

    /// The fallback chain for unresolved calls and context-valued blocks.
    ///
    /// An unresolved call that is not a plain value reference goes to
    /// `helperMissing`; its answer stands if defined, or if the call site
    /// has a hash. Block forms then go to `blockHelperMissing` with
    /// `context` as the first argument.
    fn helper_missing(&mut self, site: &CallSite<'_>, context: Value) -> Result<Value, RenderError> {
        if self.lookup(&site.path, false).is_undefined() && self.classify(site) != CallType::Simple {
            trace!(path = %site.path.original, "helperMissing");
            let call = self.helper_call_args(site, false)?;
            let result = self.call_helper("helperMissing", call)?;
            if !result.is_undefined() || site.hash.is_some() {
                return Ok(result);
            }
        }

        if site.is_block() {
            trace!(path = %site.path.original, "blockHelperMissing");
            let mut call = self.helper_call_args(site, true)?;
            call.args.insert(0, context);
            return self.call_helper("blockHelperMissing", call);
        }
        Ok(Value::Undefined)
    }

    /// Evaluates the arguments of a helper call and builds its call.
    fn helper_call_args(&mut self, site: &CallSite<'_>, block: bool) -> Result<Call, RenderError> {
        let (args, options) = self.helper_options(site, block)?;
        Ok(Call {
            this: self.this(),
            args,
            options: Some(options),
        })
    }

    /// Evaluates a call site's positional arguments and options object.
    pub(crate) fn helper_options(
        &mut self,
        site: &CallSite<'_>,
        block: bool,
    ) -> Result<(Vec<Value>, HelperOptions), RenderError> {
        let args = site
            .params
            .iter()
            .map(|param| self.accept_expression(param))
            .collect::<Result<Vec<_>, _>>()?;
        let hash = match site.hash {
            Some(hash) => self.hash(hash)?,
            None => Map::new(),
        };
        let options = HelperOptions {
            name: site.path.original.clone(),
            hash,
            data: self.options_data(),
            program: block.then(|| ProgramFn::new(site.program.cloned())),
            inverse: block.then(|| ProgramFn::new(site.inverse.cloned())),
        };
        Ok((args, options))
    }

    /// `{ root, ...innermost @data }` for an options object.
    fn options_data(&self) -> Value {
        let root = self
            .frames
            .root()
            .map(|frame| frame.context.clone())
            .filter(Value::is_truthy)
            .unwrap_or_else(Value::empty_object);
        let mut data = Map::new();
        data.insert("root".to_string(), root);
        if let Some(frame) = self.frames.innermost() {
            data.extend(frame.data.spread());
        }
        Value::object(data)
    }
}
