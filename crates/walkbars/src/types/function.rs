use std::fmt::{self, Debug, Formatter};
use std::rc::Rc;

use super::Value;
use crate::interpreter::{Call, Evaluator, RenderError};

type Callable = dyn Fn(&mut Evaluator<'_>, Call) -> Result<Value, RenderError>;

/// A host function callable from templates.
///
/// Functions receive the running [`Evaluator`] so block helpers can render
/// their `fn`/`inverse` programs, and a [`Call`] carrying the receiver
/// (`this`), positional arguments and, for helper invocations, the
/// [`HelperOptions`](crate::HelperOptions).
#[derive(Clone)]
pub struct Function(Rc<Callable>);

impl Function {
    pub fn new<F>(f: F) -> Function
    where
        F: Fn(&mut Evaluator<'_>, Call) -> Result<Value, RenderError> + 'static,
    {
        Function(Rc::new(f))
    }

    /// Invokes the function.
    pub fn call(&self, evaluator: &mut Evaluator<'_>, call: Call) -> Result<Value, RenderError> {
        (self.0)(evaluator, call)
    }

    /// Returns true if both handles point at the same function.
    pub fn ptr_eq(&self, other: &Function) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Debug for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Function(..)")
    }
}
