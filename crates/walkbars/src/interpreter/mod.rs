//! Walkbars interpreter for rendering templates.
//!
//! This module provides the evaluation engine that takes parsed templates
//! and produces output strings. It maintains the context, block-parameter
//! and partial-block stacks, resolves paths, classifies call sites and runs
//! helpers, partials and decorators.

mod classifier;
mod config;
mod context;
mod engine;
mod error;
mod evaluator;
mod helpers;
mod invocation;
mod partials;
mod registry;
mod resolver;
mod scope;

pub use classifier::{CallKind, CallSite, CallType, classify_static};
pub use config::{CompileOptions, PrecompileOptions, RuntimeOptions};
pub use engine::{Precompiled, Template, Walkbars, compile, precompile, render};
pub use error::{RenderError, compute_suggestions};
pub use evaluator::Evaluator;
pub use invocation::{BlockOverlay, Call, DecoratorCall, HelperOptions, ProgramFn};
pub use registry::{Decorator, Partial, Registry};
pub use scope::FrameScope;
