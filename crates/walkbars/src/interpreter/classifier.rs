//! Deciding how a mustache, block or sub-expression is called.

use std::borrow::Cow;
use std::rc::Rc;

use crate::interpreter::context::find_or_undefined;
use crate::interpreter::{CompileOptions, Evaluator, RenderError};
use crate::parser::ast::{
    BlockStatement, Expression, Hash, MustacheStatement, PathExpression, Program, SubExpression,
};
use crate::types::format_number;

/// The syntactic form of a call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Mustache,
    Block,
    SubExpression,
}

/// How a call site resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallType {
    /// A value reference that never consults helpers.
    Simple,
    /// A definite helper call.
    Helper,
    /// A bare name that may be a helper or a context value.
    Ambiguous,
}

/// The parts of a mustache, block or sub-expression that drive a call.
#[derive(Debug, Clone)]
pub struct CallSite<'a> {
    pub kind: CallKind,
    /// The callee. Literal callees (`{{"foo"}}`, `{{12}}`) become
    /// single-segment paths named by their source text.
    pub path: Cow<'a, PathExpression>,
    pub params: &'a [Expression],
    pub hash: Option<&'a Hash>,
    pub program: Option<&'a Rc<Program>>,
    pub inverse: Option<&'a Rc<Program>>,
}

impl<'a> CallSite<'a> {
    pub fn mustache(mustache: &'a MustacheStatement) -> Result<CallSite<'a>, RenderError> {
        Ok(CallSite {
            kind: CallKind::Mustache,
            path: callee(&mustache.path)?,
            params: &mustache.params,
            hash: mustache.hash.as_ref(),
            program: None,
            inverse: None,
        })
    }

    pub fn block(block: &'a BlockStatement) -> Result<CallSite<'a>, RenderError> {
        Ok(CallSite {
            kind: CallKind::Block,
            path: callee(&block.path)?,
            params: &block.params,
            hash: block.hash.as_ref(),
            program: block.program.as_ref(),
            inverse: block.inverse.as_ref(),
        })
    }

    pub fn sub_expression(sexpr: &'a SubExpression) -> Result<CallSite<'a>, RenderError> {
        Ok(CallSite {
            kind: CallKind::SubExpression,
            path: callee(&sexpr.path)?,
            params: &sexpr.params,
            hash: sexpr.hash.as_ref(),
            program: None,
            inverse: None,
        })
    }

    pub fn is_block(&self) -> bool {
        self.kind == CallKind::Block
    }

    /// Sub-expressions, and mustaches or blocks with arguments, can only
    /// be helper calls.
    fn is_helper_expression(&self) -> bool {
        match self.kind {
            CallKind::SubExpression => true,
            CallKind::Mustache | CallKind::Block => !self.params.is_empty() || self.hash.is_some(),
        }
    }
}

fn callee(expression: &Expression) -> Result<Cow<'_, PathExpression>, RenderError> {
    let named = |name: String| Ok(Cow::Owned(PathExpression::named(name, expression.loc())));
    match expression {
        Expression::Path(path) => Ok(Cow::Borrowed(path)),
        Expression::String(literal) => named(literal.original.clone()),
        Expression::Number(literal) => named(format_number(literal.value)),
        Expression::Boolean(literal) => named(literal.original.clone()),
        Expression::Undefined(_) => named("undefined".to_string()),
        Expression::Null(_) => named("null".to_string()),
        Expression::SubExpression(_) | Expression::Unknown => Err(RenderError::UnknownNodeKind {
            kind: expression.kind().to_string(),
        }),
    }
}

impl Evaluator<'_> {
    /// Classifies a call site against the innermost block parameters and
    /// the known-helper options.
    pub fn classify(&self, site: &CallSite<'_>) -> CallType {
        let simple = site.path.is_simple();
        let block_param = simple
            && !site.path.data
            && self.frames.innermost_block_params().is_some_and(|bindings| {
                !find_or_undefined(bindings.clone(), &site.path.parts).is_undefined()
            });

        let mut helper = !block_param && site.is_helper_expression();
        let mut eligible = !block_param && (helper || simple);

        if eligible && !helper {
            let name = site.path.head().unwrap_or_default();
            if self.options.is_known_helper(name) {
                helper = true;
            } else if self.options.known_helpers_only {
                eligible = false;
            }
        }

        classify_flags(helper, eligible)
    }
}

fn classify_flags(helper: bool, eligible: bool) -> CallType {
    if helper {
        CallType::Helper
    } else if eligible {
        CallType::Ambiguous
    } else {
        CallType::Simple
    }
}

/// Classifies a call site without any render state: block parameters are
/// treated as unbound. Used by static tooling.
pub fn classify_static(site: &CallSite<'_>, options: &CompileOptions) -> CallType {
    let simple = site.path.is_simple();
    let mut helper = site.is_helper_expression();
    let mut eligible = helper || simple;
    if eligible && !helper {
        if options.is_known_helper(site.path.head().unwrap_or_default()) {
            helper = true;
        } else if options.known_helpers_only {
            eligible = false;
        }
    }
    classify_flags(helper, eligible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::Statement;
    use crate::parser::parse;

    fn classify_source(source: &str, options: &CompileOptions) -> CallType {
        let program = parse(source).unwrap();
        let site = match &program.body[0] {
            Statement::Mustache(mustache) => CallSite::mustache(mustache).unwrap(),
            Statement::Block(block) => CallSite::block(block).unwrap(),
            other => panic!("unexpected statement {}", other.kind()),
        };
        classify_static(&site, options)
    }

    #[test]
    fn bare_names_are_ambiguous() {
        let options = CompileOptions::default();
        assert_eq!(classify_source("{{foo}}", &options), CallType::Ambiguous);
        assert_eq!(classify_source("{{foo bar}}", &options), CallType::Helper);
        assert_eq!(classify_source("{{foo a=1}}", &options), CallType::Helper);
        assert_eq!(classify_source("{{foo.bar}}", &options), CallType::Simple);
        assert_eq!(classify_source("{{./foo}}", &options), CallType::Simple);
        assert_eq!(classify_source("{{#each}}{{/each}}", &options), CallType::Helper);
    }

    #[test]
    fn known_helpers_only_demotes_unknown_names() {
        let options = CompileOptions::builder().known_helpers_only(true).build();
        assert_eq!(classify_source("{{foo}}", &options), CallType::Simple);
        assert_eq!(classify_source("{{with}}", &options), CallType::Helper);
    }

    #[test]
    fn literal_callee_becomes_path() {
        let program = parse("{{\"foo bar\"}}{{12}}").unwrap();
        let names: Vec<String> = program
            .body
            .iter()
            .filter_map(|statement| match statement {
                Statement::Mustache(mustache) => {
                    Some(CallSite::mustache(mustache).unwrap().path.original.clone())
                }
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["foo bar", "12"]);
    }
}
