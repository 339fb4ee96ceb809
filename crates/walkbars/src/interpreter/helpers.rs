//! Built-in helpers and decorators.
//!
//! These are registered on every [`Walkbars`](crate::Walkbars) instance and
//! may be replaced or removed like any user helper. `blockHelperMissing`
//! and `helperMissing` also answer when nothing is registered under their
//! names, since the call protocol depends on them.

use tracing::{debug, error, info, warn};

use crate::interpreter::invocation::{BlockOverlay, Call, DecoratorCall, HelperOptions};
use crate::interpreter::registry::{Decorator, Partial, Registry};
use crate::interpreter::{Evaluator, RenderError};
use crate::types::{Function, Value};

pub(crate) type BuiltinHelper = fn(&mut Evaluator<'_>, Call) -> Result<Value, RenderError>;

const BUILTIN_HELPERS: [&str; 8] = [
    "blockHelperMissing",
    "helperMissing",
    "each",
    "if",
    "unless",
    "with",
    "lookup",
    "log",
];

pub(crate) fn builtin_helper(name: &str) -> Option<BuiltinHelper> {
    let helper: BuiltinHelper = match name {
        "blockHelperMissing" => block_helper_missing,
        "helperMissing" => helper_missing,
        "each" => each,
        "if" => if_helper,
        "unless" => unless,
        "with" => with,
        "lookup" => lookup,
        "log" => log,
        _ => return None,
    };
    Some(helper)
}

/// Adds the built-in helpers and the `inline` decorator to `registry`.
pub(crate) fn register_builtins(registry: &mut Registry) {
    for name in BUILTIN_HELPERS {
        if let Some(helper) = builtin_helper(name) {
            registry.insert_helper(name, Value::Function(Function::new(helper)));
        }
    }
    registry.insert_decorator("inline", Decorator::new(inline));
}

fn require_options<'c>(
    helper: &'static str,
    call: &'c Call,
) -> Result<&'c HelperOptions, RenderError> {
    call.options().ok_or_else(|| RenderError::HelperArity {
        helper,
        message: format!("{helper} must be called with an options object"),
    })
}

fn exactly_one_argument(helper: &'static str, call: &Call) -> Result<(), RenderError> {
    if call.args.len() == 1 && call.options.is_some() {
        Ok(())
    } else {
        Err(RenderError::HelperArity {
            helper,
            message: format!("#{helper} requires exactly one argument"),
        })
    }
}

/// Calls a function-valued argument with the current receiver.
fn resolve_argument(evaluator: &mut Evaluator<'_>, call: &Call) -> Result<Value, RenderError> {
    match call.arg(0) {
        Value::Function(function) => function.call(evaluator, Call::bare(call.this.clone())),
        value => Ok(value),
    }
}

/// Renders a block according to the runtime type of its context value.
fn block_helper_missing(evaluator: &mut Evaluator<'_>, call: Call) -> Result<Value, RenderError> {
    let options = require_options("blockHelperMissing", &call)?;
    let context = call.arg(0);
    let output = match &context {
        Value::Bool(true) => options.render(evaluator, call.this.clone())?,
        Value::Bool(false) | Value::Null | Value::Undefined => {
            options.render_inverse(evaluator, call.this.clone())?
        }
        Value::Array(items) if items.is_empty() => {
            options.render_inverse(evaluator, call.this.clone())?
        }
        Value::Array(_) => {
            let each_call = Call {
                this: call.this.clone(),
                args: vec![context.clone()],
                options: Some(options.clone()),
            };
            return evaluator.call_helper("each", each_call);
        }
        _ => {
            let overlay = BlockOverlay {
                data: Some(options.data.clone()),
                block_params: None,
            };
            options.render_with(evaluator, context.clone(), overlay)?
        }
    };
    Ok(Value::from(output))
}

/// A bare unresolved name renders nothing; a call with arguments fails.
fn helper_missing(_evaluator: &mut Evaluator<'_>, call: Call) -> Result<Value, RenderError> {
    if call.args.is_empty() {
        return Ok(Value::Undefined);
    }
    let name = call.options().map(|options| options.name.clone()).unwrap_or_default();
    Err(RenderError::MissingHelper { name })
}

/// Iterates arrays and objects, exposing `@index`, `@key`, `@first`,
/// `@last` and the block parameters `[item, key]`.
fn each(evaluator: &mut Evaluator<'_>, call: Call) -> Result<Value, RenderError> {
    let (Some(options), false) = (call.options(), call.args.is_empty()) else {
        return Err(RenderError::HelperArity {
            helper: "each",
            message: "Must pass iterator to #each".to_string(),
        });
    };
    let context = resolve_argument(evaluator, &call)?;

    let entries: Vec<(Value, Value)> = match &context {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| (Value::from(i), item.clone()))
            .collect(),
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| (Value::from(key.as_str()), value.clone()))
            .collect(),
        _ => Vec::new(),
    };

    if entries.is_empty() {
        return options
            .render_inverse(evaluator, call.this.clone())
            .map(Value::from);
    }

    let parent = options.data.clone();
    let last = entries.len() - 1;
    let mut output = String::new();
    for (index, (key, item)) in entries.into_iter().enumerate() {
        let mut data = parent.spread();
        data.insert("_parent".to_string(), parent.clone());
        data.insert("key".to_string(), key.clone());
        data.insert("index".to_string(), Value::from(index));
        data.insert("first".to_string(), Value::Bool(index == 0));
        data.insert("last".to_string(), Value::Bool(index == last));
        let overlay = BlockOverlay {
            data: Some(Value::object(data)),
            block_params: Some(vec![item.clone(), key]),
        };
        output.push_str(&options.render_with(evaluator, item, overlay)?);
    }
    Ok(Value::from(output))
}

/// Renders the body in the current scope when the argument is truthy and
/// not empty. `includeZero=true` treats `0` as true.
fn if_helper(evaluator: &mut Evaluator<'_>, call: Call) -> Result<Value, RenderError> {
    exactly_one_argument("if", &call)?;
    let options = require_options("if", &call)?;
    let conditional = resolve_argument(evaluator, &call)?;
    let include_zero = options
        .hash
        .get("includeZero")
        .is_some_and(Value::is_truthy);
    let output = if (!include_zero && !conditional.is_truthy()) || conditional.is_empty() {
        options.render_inverse(evaluator, Value::Undefined)?
    } else {
        options.render(evaluator, Value::Undefined)?
    };
    Ok(Value::from(output))
}

/// `if` with the body and inverse exchanged.
fn unless(evaluator: &mut Evaluator<'_>, call: Call) -> Result<Value, RenderError> {
    exactly_one_argument("unless", &call)?;
    let options = require_options("unless", &call)?.swapped();
    let call = Call {
        options: Some(options),
        ..call
    };
    evaluator.call_helper("if", call)
}

/// Renders the body with the argument as the new context and first block
/// parameter.
fn with(evaluator: &mut Evaluator<'_>, call: Call) -> Result<Value, RenderError> {
    exactly_one_argument("with", &call)?;
    let options = require_options("with", &call)?;
    let context = resolve_argument(evaluator, &call)?;
    let output = if context.is_empty() {
        options.render_inverse(evaluator, call.this.clone())?
    } else {
        let overlay = BlockOverlay {
            data: Some(options.data.clone()),
            block_params: Some(vec![context.clone()]),
        };
        options.render_with(evaluator, context, overlay)?
    };
    Ok(Value::from(output))
}

/// `lookup obj field`: a guarded property read with a computed name.
fn lookup(_evaluator: &mut Evaluator<'_>, call: Call) -> Result<Value, RenderError> {
    let object = call.arg(0);
    if !object.is_truthy() {
        return Ok(object);
    }
    let field = call.arg(1).to_string();
    Ok(object.get_own_property(&field).unwrap_or_default())
}

/// Writes its arguments to the `tracing` log. The level comes from
/// `level=` or `@level` and defaults to `info`.
fn log(_evaluator: &mut Evaluator<'_>, call: Call) -> Result<Value, RenderError> {
    let level = match call.hash("level") {
        Value::Undefined | Value::Null => call
            .options()
            .and_then(|options| options.data.get_own_property("level"))
            .unwrap_or_default(),
        level => level,
    };
    let message = call
        .args
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    match log_level(&level) {
        0 => debug!(target: "walkbars::log", "{message}"),
        1 => info!(target: "walkbars::log", "{message}"),
        2 => warn!(target: "walkbars::log", "{message}"),
        _ => error!(target: "walkbars::log", "{message}"),
    }
    Ok(Value::Undefined)
}

/// Maps a `level` value to 0 (debug) through 3 (error).
fn log_level(level: &Value) -> usize {
    const LEVELS: [&str; 4] = ["debug", "info", "warn", "error"];
    match level {
        Value::Number(n) if *n >= 0.0 => (*n as usize).min(3),
        Value::String(name) => {
            let name = name.to_lowercase();
            LEVELS.iter().position(|level| *level == name).unwrap_or_else(|| {
                let digits: String = name
                    .trim_start()
                    .chars()
                    .take_while(char::is_ascii_digit)
                    .collect();
                digits.parse::<usize>().map_or(1, |n| n.min(3))
            })
        }
        _ => 1,
    }
}

/// `{{#*inline "name"}}body{{/inline}}` registers `body` as a partial on
/// the current scope.
fn inline(evaluator: &mut Evaluator<'_>, call: DecoratorCall) -> Result<(), RenderError> {
    let name = call.arg(0).to_string();
    let body = call.options.program.clone().unwrap_or_default();
    evaluator.register_inline_partial(name, Partial::Block(body));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_levels_accept_names_and_numbers() {
        assert_eq!(log_level(&Value::from("WARN")), 2);
        assert_eq!(log_level(&Value::from(0)), 0);
        assert_eq!(log_level(&Value::from(9)), 3);
        assert_eq!(log_level(&Value::from("verbose")), 1);
        assert_eq!(log_level(&Value::from("2")), 2);
        assert_eq!(log_level(&Value::from("7 levels")), 3);
        assert_eq!(log_level(&Value::Undefined), 1);
    }

    #[test]
    fn every_builtin_has_an_implementation() {
        for name in BUILTIN_HELPERS {
            assert!(builtin_helper(name).is_some(), "{name}");
        }
        assert!(builtin_helper("missing").is_none());
    }
}
