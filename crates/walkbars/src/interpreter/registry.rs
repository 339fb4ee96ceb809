//! Registries of named helpers, partials and decorators.

use std::fmt::{self, Debug, Formatter};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::interpreter::invocation::{DecoratorCall, ProgramFn};
use crate::interpreter::{Evaluator, RenderError};
use crate::parser::ast::Program;
use crate::parser::parse;
use crate::types::{Function, Value};

/// A resolved partial.
#[derive(Debug, Clone)]
pub enum Partial {
    /// Parsed template source.
    Template(Rc<Program>),
    /// A host function called with the partial's context.
    Function(Function),
    /// A block body, as registered by `{{#*inline}}`.
    Block(ProgramFn),
}

impl Partial {
    /// Converts a registered value: strings are parsed, functions are kept.
    pub fn from_value(name: &str, value: Value) -> Result<Partial, RenderError> {
        match value {
            Value::String(source) | Value::SafeString(source) => {
                Ok(Partial::Template(Rc::new(parse(&source)?)))
            }
            Value::Function(function) => Ok(Partial::Function(function)),
            Value::Undefined => Err(RenderError::AttemptToRegisterUndefinedPartial {
                name: name.to_string(),
            }),
            other => Err(RenderError::InvalidPartial {
                name: name.to_string(),
                type_name: other.type_name(),
            }),
        }
    }
}

type DecoratorFn = dyn Fn(&mut Evaluator<'_>, DecoratorCall) -> Result<(), RenderError>;

/// A host function run when a `{{#*name}}` decorator block is reached.
#[derive(Clone)]
pub struct Decorator(Rc<DecoratorFn>);

impl Decorator {
    pub fn new<F>(f: F) -> Decorator
    where
        F: Fn(&mut Evaluator<'_>, DecoratorCall) -> Result<(), RenderError> + 'static,
    {
        Decorator(Rc::new(f))
    }

    pub fn call(&self, evaluator: &mut Evaluator<'_>, call: DecoratorCall) -> Result<(), RenderError> {
        (self.0)(evaluator, call)
    }
}

impl Debug for Decorator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Decorator(..)")
    }
}

/// Named helpers, partials and decorators.
///
/// Registration replaces any existing entry of the same name.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    helpers: IndexMap<String, Value>,
    partials: IndexMap<String, Partial>,
    decorators: IndexMap<String, Decorator>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a helper by name. Helpers are usually functions, but any value
    /// may be registered.
    pub fn helper(&self, name: &str) -> Option<&Value> {
        self.helpers.get(name)
    }

    pub fn insert_helper(&mut self, name: impl Into<String>, helper: Value) {
        self.helpers.insert(name.into(), helper);
    }

    pub fn remove_helper(&mut self, name: &str) -> Option<Value> {
        self.helpers.shift_remove(name)
    }

    pub fn helper_names(&self) -> impl Iterator<Item = &String> {
        self.helpers.keys()
    }

    pub fn partial(&self, name: &str) -> Option<&Partial> {
        self.partials.get(name)
    }

    pub fn insert_partial(&mut self, name: impl Into<String>, partial: Partial) {
        self.partials.insert(name.into(), partial);
    }

    pub fn remove_partial(&mut self, name: &str) -> Option<Partial> {
        self.partials.shift_remove(name)
    }

    pub fn partial_names(&self) -> impl Iterator<Item = &String> {
        self.partials.keys()
    }

    pub fn decorator(&self, name: &str) -> Option<&Decorator> {
        self.decorators.get(name)
    }

    pub fn insert_decorator(&mut self, name: impl Into<String>, decorator: Decorator) {
        self.decorators.insert(name.into(), decorator);
    }

    pub fn remove_decorator(&mut self, name: &str) -> Option<Decorator> {
        self.decorators.shift_remove(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_sources_are_parsed() {
        let partial = Partial::from_value("p", Value::from("hi {{name}}")).unwrap();
        assert!(matches!(partial, Partial::Template(program) if program.body.len() == 2));
    }

    #[test]
    fn undefined_partial_is_rejected() {
        let error = Partial::from_value("p", Value::Undefined).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Attempting to register a partial called \"p\" as undefined"
        );
    }

    #[test]
    fn non_source_partial_is_rejected() {
        let error = Partial::from_value("p", Value::from(3)).unwrap_err();
        assert!(matches!(error, RenderError::InvalidPartial { type_name: "number", .. }));
    }

    #[test]
    fn replacing_keeps_one_entry() {
        let mut registry = Registry::new();
        registry.insert_helper("a", Value::from(1));
        registry.insert_helper("a", Value::from(2));
        assert_eq!(registry.helper("a"), Some(&Value::from(2)));
        assert_eq!(registry.helper_names().count(), 1);
        assert_eq!(registry.remove_helper("a"), Some(Value::from(2)));
        assert!(registry.helper("a").is_none());
    }
}
