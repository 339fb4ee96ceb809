//! Handlebars template parser.
//!
//! This module parses template strings into a [`Program`] AST. The AST is
//! public so tooling can inspect call sites, and serializable so parsed
//! templates can be shipped as precompiled JSON.

pub mod ast;
pub mod error;
mod template;
mod whitespace;

pub use ast::*;
pub use error::ParseError;
pub use template::{parse, parse_template};
