//! The user-facing template engine.
//!
//! A [`Walkbars`] instance owns the helper, partial and decorator
//! registries and renders templates against them. Parsed templates are
//! cached by source so repeated renders of the same string parse once.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use bon::Builder;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::interpreter::helpers::register_builtins;
use crate::interpreter::invocation::DecoratorCall;
use crate::interpreter::registry::{Decorator, Partial, Registry};
use crate::interpreter::{
    Call, CompileOptions, Evaluator, PrecompileOptions, RenderError, RuntimeOptions,
};
use crate::parser::ast::Program;
use crate::parser::parse_template;
use crate::types::{Function, Value};

/// A template engine with its own registries.
///
/// # Example
///
/// ```
/// use walkbars::{object, Value, Walkbars};
///
/// let mut walkbars = Walkbars::new();
/// walkbars.register_helper("shout", |_, call| {
///     Ok(Value::from(call.arg(0).to_string().to_uppercase()))
/// });
/// walkbars.register_partial("greeting", "Hello, {{shout name}}!").unwrap();
///
/// let output = walkbars.render("{{> greeting}}", object! { "name" => "Ada" }).unwrap();
/// assert_eq!(output, "Hello, ADA!");
/// ```
#[derive(Builder)]
pub struct Walkbars {
    /// Options applied to every template this instance compiles.
    #[builder(default)]
    options: CompileOptions,

    /// Helpers, partials and decorators. Starts with the built-ins.
    #[builder(skip = Registry::with_builtins())]
    registry: Registry,

    /// Parsed templates keyed by source. `RefCell` keeps `render` at `&self`.
    #[builder(skip)]
    template_cache: RefCell<HashMap<String, Rc<Program>>>,
}

impl Default for Walkbars {
    fn default() -> Self {
        Walkbars::builder().build()
    }
}

impl Walkbars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CompileOptions) -> Self {
        Walkbars::builder().options(options).build()
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Registers a helper function, replacing any helper of the same name.
    pub fn register_helper<F>(&mut self, name: impl Into<String>, helper: F)
    where
        F: Fn(&mut Evaluator<'_>, Call) -> Result<Value, RenderError> + 'static,
    {
        self.registry
            .insert_helper(name, Value::Function(Function::new(helper)));
    }

    /// Registers any value as a helper. Non-function helpers resolve as
    /// values and fail with `NotCallable` when called with arguments.
    pub fn register_helper_value(&mut self, name: impl Into<String>, helper: impl Into<Value>) {
        self.registry.insert_helper(name, helper.into());
    }

    /// Registers every entry of an object as a helper.
    pub fn register_helpers(&mut self, helpers: impl Into<Value>) -> Result<(), RenderError> {
        let helpers = helpers.into();
        let Some(map) = helpers.as_object() else {
            return Err(RenderError::InvalidMultiRegistration { kind: "helpers" });
        };
        for (name, helper) in map {
            self.registry.insert_helper(name.clone(), helper.clone());
        }
        Ok(())
    }

    pub fn unregister_helper(&mut self, name: &str) {
        self.registry.remove_helper(name);
    }

    /// Registers a partial from template source or a function.
    pub fn register_partial(
        &mut self,
        name: impl Into<String>,
        partial: impl Into<Value>,
    ) -> Result<(), RenderError> {
        let name = name.into();
        let partial = Partial::from_value(&name, partial.into())?;
        debug!(%name, "registered partial");
        self.registry.insert_partial(name, partial);
        Ok(())
    }

    /// Registers every entry of an object as a partial. Nothing is
    /// registered if any entry is invalid.
    pub fn register_partials(&mut self, partials: impl Into<Value>) -> Result<(), RenderError> {
        let partials = partials.into();
        let Some(map) = partials.as_object() else {
            return Err(RenderError::InvalidMultiRegistration { kind: "partials" });
        };
        let parsed = map
            .iter()
            .map(|(name, value)| Ok((name.clone(), Partial::from_value(name, value.clone())?)))
            .collect::<Result<Vec<_>, RenderError>>()?;
        for (name, partial) in parsed {
            self.registry.insert_partial(name, partial);
        }
        Ok(())
    }

    pub fn unregister_partial(&mut self, name: &str) {
        self.registry.remove_partial(name);
    }

    pub fn register_decorator<F>(&mut self, name: impl Into<String>, decorator: F)
    where
        F: Fn(&mut Evaluator<'_>, DecoratorCall) -> Result<(), RenderError> + 'static,
    {
        self.registry.insert_decorator(name, Decorator::new(decorator));
    }

    pub fn register_decorators(
        &mut self,
        decorators: impl IntoIterator<Item = (String, Decorator)>,
    ) {
        for (name, decorator) in decorators {
            self.registry.insert_decorator(name, decorator);
        }
    }

    pub fn unregister_decorator(&mut self, name: &str) {
        self.registry.remove_decorator(name);
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Renders `template` against `context`.
    pub fn render(&self, template: &str, context: impl Into<Value>) -> Result<String, RenderError> {
        self.render_with(template, context, RuntimeOptions::default())
    }

    /// Renders `template` with per-render data, helpers and partials.
    pub fn render_with(
        &self,
        template: &str,
        context: impl Into<Value>,
        runtime: RuntimeOptions,
    ) -> Result<String, RenderError> {
        let program = self.cached_program(template)?;
        render_program(&program, &self.registry, &self.options, context.into(), runtime)
    }

    /// Parses `template` into a reusable [`Template`] that keeps a snapshot
    /// of the current registrations.
    pub fn compile(&self, template: &str) -> Result<Template, RenderError> {
        Ok(Template {
            program: self.cached_program(template)?,
            options: self.options.clone(),
            registry: self.registry.clone(),
        })
    }

    /// Compiles `template` and serializes its AST.
    pub fn precompile(
        &self,
        template: &str,
        src_name: Option<String>,
    ) -> Result<Precompiled, RenderError> {
        let template = self.compile(template)?;
        let spec = serde_json::to_string(template.program.as_ref())
            .map_err(|source| RenderError::InvalidPrecompiled { source })?;
        Ok(Precompiled {
            src_name,
            spec,
            template: Some(template),
        })
    }

    fn cached_program(&self, source: &str) -> Result<Rc<Program>, RenderError> {
        if let Some(program) = self.template_cache.borrow().get(source) {
            return Ok(Rc::clone(program));
        }
        let program = Rc::new(parse_template(source, self.options.ignore_standalone)?);
        self.template_cache
            .borrow_mut()
            .insert(source.to_string(), Rc::clone(&program));
        Ok(program)
    }
}

/// A parsed template bound to its compile options and registrations.
#[derive(Debug, Clone)]
pub struct Template {
    program: Rc<Program>,
    options: CompileOptions,
    registry: Registry,
}

impl Template {
    pub fn render(
        &self,
        context: impl Into<Value>,
        runtime: RuntimeOptions,
    ) -> Result<String, RenderError> {
        render_program(&self.program, &self.registry, &self.options, context.into(), runtime)
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Restores a template from the `spec` of a [`Precompiled`]. Only the
    /// built-in helpers are registered; pass others at render time.
    pub fn from_precompiled(spec: &str, options: CompileOptions) -> Result<Template, RenderError> {
        let program: Program = serde_json::from_str(spec)
            .map_err(|source| RenderError::InvalidPrecompiled { source })?;
        Ok(Template {
            program: Rc::new(program),
            options,
            registry: Registry::with_builtins(),
        })
    }
}

/// The serialized form of a compiled template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Precompiled {
    pub src_name: Option<String>,
    /// The template AST as JSON.
    pub spec: String,
    #[serde(skip)]
    template: Option<Template>,
}

impl Precompiled {
    /// The template this was compiled from, or one restored from `spec`.
    pub fn template(&self, options: CompileOptions) -> Result<Template, RenderError> {
        match &self.template {
            Some(template) => Ok(template.clone()),
            None => Template::from_precompiled(&self.spec, options),
        }
    }
}

impl Registry {
    /// A registry holding the built-in helpers and decorators.
    pub fn with_builtins() -> Registry {
        let mut registry = Registry::new();
        register_builtins(&mut registry);
        registry
    }
}

fn render_program(
    program: &Program,
    registry: &Registry,
    options: &CompileOptions,
    context: Value,
    runtime: RuntimeOptions,
) -> Result<String, RenderError> {
    let overlay = runtime_registry(&runtime)?;
    let mut evaluator = Evaluator::new(registry, &overlay, options);
    evaluator.render(program, context, runtime.data)
}

/// Per-render registrations from [`RuntimeOptions`].
fn runtime_registry(runtime: &RuntimeOptions) -> Result<Registry, RenderError> {
    let mut overlay = Registry::new();
    for (name, helper) in &runtime.helpers {
        overlay.insert_helper(name.clone(), helper.clone());
    }
    for (name, partial) in &runtime.partials {
        overlay.insert_partial(name.clone(), Partial::from_value(name, partial.clone())?);
    }
    for (name, decorator) in &runtime.decorators {
        overlay.insert_decorator(name.clone(), decorator.clone());
    }
    Ok(overlay)
}

/// Renders `template` once with a fresh engine.
///
/// # Example
///
/// ```
/// use walkbars::{object, render, CompileOptions, RuntimeOptions};
///
/// let output = render(
///     "{{#each items}}{{@index}}:{{this}} {{/each}}",
///     object! { "items" => vec!["a", "b"] },
///     RuntimeOptions::default(),
///     CompileOptions::default(),
/// )
/// .unwrap();
/// assert_eq!(output, "0:a 1:b ");
/// ```
pub fn render(
    template: &str,
    context: impl Into<Value>,
    runtime: RuntimeOptions,
    options: CompileOptions,
) -> Result<String, RenderError> {
    Walkbars::with_options(options).render_with(template, context, runtime)
}

/// Compiles `template` against the built-in helpers.
pub fn compile(template: &str, options: CompileOptions) -> Result<Template, RenderError> {
    Walkbars::with_options(options).compile(template)
}

/// Compiles `template` and serializes its AST.
pub fn precompile(template: &str, options: PrecompileOptions) -> Result<Precompiled, RenderError> {
    Walkbars::with_options(options.compile).precompile(template, options.src_name)
}
