//! Scoping frames tracked while a template renders.
//!
//! Three independent LIFO stacks make up the scope chain:
//! - context frames (`this` plus `@data`), the primary chain walked by `../`
//! - block-parameter frames introduced by `as |x y|`
//! - partial-block frames, one per active `{{#> partial}}`
//!
//! Each stack is stored innermost-last; "depth" always counts from the
//! innermost frame outward.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::interpreter::registry::Partial;
use crate::parser::ast::Program;
use crate::types::{Map, Value};

/// One scope on the context or block-parameter stack.
#[derive(Debug, Clone, Default)]
pub(crate) struct Frame {
    pub(crate) context: Value,
    pub(crate) data: Value,
    /// Stops upward scope search; set on entry to a partial.
    pub(crate) boundary: bool,
    /// Inline partials registered while this frame was innermost.
    pub(crate) partials: IndexMap<String, Partial>,
}

impl Frame {
    /// Creates a frame, replacing undefined context or data with `{}`.
    pub(crate) fn new(context: Value, data: Value) -> Frame {
        Frame {
            context: or_empty(context),
            data: or_empty(data),
            boundary: false,
            partials: IndexMap::new(),
        }
    }

    fn field(&self, field: Field) -> &Value {
        match field {
            Field::Context => &self.context,
            Field::Data => &self.data,
        }
    }
}

fn or_empty(value: Value) -> Value {
    if value.is_undefined() {
        Value::empty_object()
    } else {
        value
    }
}

/// Which half of a frame a lookup reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    Context,
    Data,
}

impl Field {
    pub(crate) fn for_data(data: bool) -> Field {
        if data { Field::Data } else { Field::Context }
    }
}

/// An active `{{#> partial}}...{{/partial}}` body.
#[derive(Debug, Clone)]
pub(crate) struct PartialBlockFrame {
    /// The body rendered eagerly against the caller's context.
    pub(crate) fallback: String,
    pub(crate) program: Rc<Program>,
    /// Number of context frames when the block was entered.
    pub(crate) captured_depth: usize,
}

/// The three scope stacks of one render.
#[derive(Debug, Default)]
pub(crate) struct FrameStack {
    pub(crate) contexts: Vec<Frame>,
    pub(crate) block_params: Vec<Frame>,
    pub(crate) partial_blocks: Vec<PartialBlockFrame>,
}

impl FrameStack {
    pub(crate) fn new() -> FrameStack {
        FrameStack::default()
    }

    /// Number of context frames.
    pub(crate) fn depth(&self) -> usize {
        self.contexts.len()
    }

    pub(crate) fn innermost(&self) -> Option<&Frame> {
        self.contexts.last()
    }

    pub(crate) fn innermost_mut(&mut self) -> Option<&mut Frame> {
        self.contexts.last_mut()
    }

    /// The context frame `depth` hops out from the innermost one.
    pub(crate) fn frame(&self, depth: usize) -> Option<&Frame> {
        frame_at(&self.contexts, depth)
    }

    /// The outermost context frame, holding the render's root context.
    pub(crate) fn root(&self) -> Option<&Frame> {
        self.contexts.first()
    }

    /// Looks up an inline partial on the context chain, innermost first.
    ///
    /// Boundaries do not apply: nested partials see inline partials
    /// registered by any enclosing scope.
    pub(crate) fn inline_partial(&self, name: &str) -> Option<&Partial> {
        self.contexts
            .iter()
            .rev()
            .find_map(|frame| frame.partials.get(name))
    }

    /// Names of every visible inline partial.
    pub(crate) fn inline_partial_names(&self) -> impl Iterator<Item = &String> {
        self.contexts
            .iter()
            .rev()
            .flat_map(|frame| frame.partials.keys())
    }

    /// The innermost block-parameter frame's bindings.
    pub(crate) fn innermost_block_params(&self) -> Option<&Value> {
        self.block_params.last().map(|frame| &frame.context)
    }
}

/// Builds the bindings of a block-parameter frame by pairing declared names
/// with the values a helper supplied. Missing values are undefined.
pub(crate) fn zip_block_params(names: &[String], values: &[Value]) -> Value {
    let map: Map = names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), values.get(i).cloned().unwrap_or_default()))
        .collect();
    Value::object(map)
}

fn frame_at(stack: &[Frame], depth: usize) -> Option<&Frame> {
    stack.len().checked_sub(depth + 1).and_then(|i| stack.get(i))
}

/// True if any of the `depth` innermost frames is a boundary.
pub(crate) fn has_boundary(stack: &[Frame], depth: usize) -> bool {
    depth != 0 && stack.iter().rev().take(depth).any(|frame| frame.boundary)
}

/// Finds the nearest frame, starting `depth` hops out, whose context (or
/// data) has `name` as an own property.
///
/// The search never crosses a boundary: it fails if a skipped frame is a
/// boundary, and it stops after inspecting the first boundary frame.
pub(crate) fn find_in_stack(stack: &[Frame], depth: usize, name: &str, field: Field) -> Option<Value> {
    if has_boundary(stack, depth) {
        return None;
    }
    for frame in stack.iter().rev().skip(depth) {
        let value = frame.field(field);
        if value.has_own_property(name) {
            return Some(value.clone());
        }
        if frame.boundary {
            return None;
        }
    }
    None
}

/// Reads `parts` one own property at a time, failing at the first gap.
pub(crate) fn find_or_undefined(current: Value, parts: &[String]) -> Value {
    let mut current = current;
    for part in parts {
        match current.get_own_property(part) {
            Some(next) => current = next,
            None => return Value::Undefined,
        }
    }
    current
}
