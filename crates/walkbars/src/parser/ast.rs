//! Public AST types for Handlebars templates.
//!
//! Node and field names follow the Handlebars AST so a serialized program
//! (see [`precompile`](crate::precompile)) is recognizable to tooling built
//! around it. Child programs are reference counted; the evaluator hands them
//! to helpers as `fn`/`inverse` without copying.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Byte offsets of a node within its source template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Span {
        Span { start, end }
    }
}

/// Whitespace-control markers (`~`) on either side of a tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripFlags {
    #[serde(default)]
    pub open: bool,
    #[serde(default)]
    pub close: bool,
}

/// A sequence of statements: the template root, or the body of a block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub body: Vec<Statement>,

    /// Names declared with `as |a b|` on the owning block.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub block_params: Vec<String>,

    /// True when this program holds a single `{{else if ..}}` block.
    #[serde(default)]
    pub chained: bool,

    #[serde(default)]
    pub loc: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Statement {
    #[serde(rename = "ContentStatement")]
    Content(ContentStatement),
    #[serde(rename = "MustacheStatement")]
    Mustache(MustacheStatement),
    #[serde(rename = "BlockStatement")]
    Block(BlockStatement),
    #[serde(rename = "PartialStatement")]
    Partial(PartialStatement),
    #[serde(rename = "PartialBlockStatement")]
    PartialBlock(PartialBlockStatement),
    #[serde(rename = "DecoratorBlock")]
    DecoratorBlock(BlockStatement),
    /// `{{* decorator}}`; parsed but not evaluated.
    #[serde(rename = "Decorator")]
    Decorator(MustacheStatement),
    #[serde(rename = "CommentStatement")]
    Comment(CommentStatement),
    /// Any node type this crate does not know.
    #[serde(other)]
    Unknown,
}

impl Statement {
    /// The Handlebars node type name.
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::Content(_) => "ContentStatement",
            Statement::Mustache(_) => "MustacheStatement",
            Statement::Block(_) => "BlockStatement",
            Statement::Partial(_) => "PartialStatement",
            Statement::PartialBlock(_) => "PartialBlockStatement",
            Statement::DecoratorBlock(_) => "DecoratorBlock",
            Statement::Decorator(_) => "Decorator",
            Statement::Comment(_) => "CommentStatement",
            Statement::Unknown => "Unknown",
        }
    }
}

/// Literal template text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentStatement {
    /// Text after whitespace control.
    pub value: String,
    /// Text as written.
    pub original: String,
    #[serde(skip)]
    pub left_stripped: bool,
    #[serde(skip)]
    pub right_stripped: bool,
    #[serde(default)]
    pub loc: Span,
}

/// `{{expr}}`, `{{{expr}}}` or `{{&expr}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MustacheStatement {
    pub path: Expression,
    #[serde(default)]
    pub params: Vec<Expression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<Hash>,
    /// False for triple-stash and `{{&expr}}`.
    pub escaped: bool,
    #[serde(default)]
    pub strip: StripFlags,
    #[serde(default)]
    pub loc: Span,
}

/// `{{#name ..}}..{{else}}..{{/name}}`, also used for decorator blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStatement {
    pub path: Expression,
    #[serde(default)]
    pub params: Vec<Expression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<Hash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<Rc<Program>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inverse: Option<Rc<Program>>,
    #[serde(default)]
    pub open_strip: StripFlags,
    #[serde(default)]
    pub inverse_strip: StripFlags,
    #[serde(default)]
    pub close_strip: StripFlags,
    #[serde(default)]
    pub loc: Span,
}

/// `{{> name ctx key=value}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialStatement {
    pub name: Expression,
    #[serde(default)]
    pub params: Vec<Expression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<Hash>,
    /// Leading whitespace of a standalone partial line.
    #[serde(default)]
    pub indent: String,
    #[serde(default)]
    pub strip: StripFlags,
    #[serde(default)]
    pub loc: Span,
}

/// `{{#> name}}fallback{{/name}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialBlockStatement {
    pub name: Expression,
    #[serde(default)]
    pub params: Vec<Expression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<Hash>,
    pub program: Rc<Program>,
    #[serde(default)]
    pub open_strip: StripFlags,
    #[serde(default)]
    pub close_strip: StripFlags,
    #[serde(default)]
    pub loc: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentStatement {
    pub value: String,
    #[serde(default)]
    pub strip: StripFlags,
    #[serde(default)]
    pub loc: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expression {
    #[serde(rename = "PathExpression")]
    Path(PathExpression),
    #[serde(rename = "SubExpression")]
    SubExpression(SubExpression),
    #[serde(rename = "StringLiteral")]
    String(StringLiteral),
    #[serde(rename = "NumberLiteral")]
    Number(NumberLiteral),
    #[serde(rename = "BooleanLiteral")]
    Boolean(BooleanLiteral),
    #[serde(rename = "UndefinedLiteral")]
    Undefined(NullishLiteral),
    #[serde(rename = "NullLiteral")]
    Null(NullishLiteral),
    #[serde(other)]
    Unknown,
}

impl Expression {
    pub fn kind(&self) -> &'static str {
        match self {
            Expression::Path(_) => "PathExpression",
            Expression::SubExpression(_) => "SubExpression",
            Expression::String(_) => "StringLiteral",
            Expression::Number(_) => "NumberLiteral",
            Expression::Boolean(_) => "BooleanLiteral",
            Expression::Undefined(_) => "UndefinedLiteral",
            Expression::Null(_) => "NullLiteral",
            Expression::Unknown => "Unknown",
        }
    }

    /// Source text of a path or literal, as used for names and close-tag
    /// matching. Sub-expressions have none.
    pub fn original(&self) -> Option<String> {
        match self {
            Expression::Path(path) => Some(path.original.clone()),
            Expression::String(literal) => Some(literal.original.clone()),
            Expression::Number(literal) => Some(literal.original.clone()),
            Expression::Boolean(literal) => Some(literal.original.clone()),
            Expression::Undefined(_) => Some("undefined".to_string()),
            Expression::Null(_) => Some("null".to_string()),
            Expression::SubExpression(_) | Expression::Unknown => None,
        }
    }

    pub fn loc(&self) -> Span {
        match self {
            Expression::Path(path) => path.loc,
            Expression::SubExpression(sexpr) => sexpr.loc,
            Expression::String(literal) => literal.loc,
            Expression::Number(literal) => literal.loc,
            Expression::Boolean(literal) => literal.loc,
            Expression::Undefined(literal) | Expression::Null(literal) => literal.loc,
            Expression::Unknown => Span::default(),
        }
    }
}

/// A dotted or slashed lookup such as `foo.bar`, `../x`, `this` or `@index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathExpression {
    /// True for `@`-prefixed data paths.
    #[serde(default)]
    pub data: bool,
    /// Number of leading `../` segments.
    #[serde(default)]
    pub depth: usize,
    /// Segments after removing `this`, `.` and `..`.
    pub parts: Vec<String>,
    pub original: String,
    #[serde(default)]
    pub loc: Span,
}

impl PathExpression {
    /// A single-segment path such as a literal converted to a call name.
    pub fn named(name: impl Into<String>, loc: Span) -> PathExpression {
        let name = name.into();
        PathExpression {
            data: false,
            depth: 0,
            parts: vec![name.clone()],
            original: name,
            loc,
        }
    }

    /// True if the path is explicitly relative to a context (`this`, `./`,
    /// `../`), which rules out helper and block-param resolution.
    pub fn is_scoped(&self) -> bool {
        self.depth > 0 || self.original.starts_with('.') || mentions_this(&self.original)
    }

    /// A bare single-segment name such as `foo`.
    pub fn is_simple(&self) -> bool {
        self.parts.len() == 1 && !self.is_scoped() && self.depth == 0
    }

    pub fn head(&self) -> Option<&str> {
        self.parts.first().map(String::as_str)
    }
}

/// Matches `this` followed by a word boundary anywhere in the text.
fn mentions_this(original: &str) -> bool {
    original.match_indices("this").any(|(at, _)| {
        original[at + 4..]
            .chars()
            .next()
            .is_none_or(|c| !(c.is_ascii_alphanumeric() || c == '_'))
    })
}

/// `(helper arg key=value)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubExpression {
    pub path: Box<Expression>,
    #[serde(default)]
    pub params: Vec<Expression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<Hash>,
    #[serde(default)]
    pub loc: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hash {
    pub pairs: Vec<HashPair>,
    #[serde(default)]
    pub loc: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashPair {
    pub key: String,
    pub value: Expression,
    #[serde(default)]
    pub loc: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringLiteral {
    pub value: String,
    pub original: String,
    #[serde(default)]
    pub loc: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberLiteral {
    pub value: f64,
    pub original: String,
    #[serde(default)]
    pub loc: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BooleanLiteral {
    pub value: bool,
    pub original: String,
    #[serde(default)]
    pub loc: Span,
}

/// Payload of `null` and `undefined` literals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NullishLiteral {
    #[serde(default)]
    pub loc: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(original: &str, depth: usize, parts: &[&str]) -> PathExpression {
        PathExpression {
            data: false,
            depth,
            parts: parts.iter().map(ToString::to_string).collect(),
            original: original.to_string(),
            loc: Span::default(),
        }
    }

    #[test]
    fn scoped_paths() {
        assert!(path("this.foo", 0, &["foo"]).is_scoped());
        assert!(path("./foo", 0, &["foo"]).is_scoped());
        assert!(path("../foo", 1, &["foo"]).is_scoped());
        assert!(!path("thistle", 0, &["thistle"]).is_scoped());
        assert!(!path("foo.bar", 0, &["foo", "bar"]).is_scoped());
    }

    #[test]
    fn simple_paths() {
        assert!(path("foo", 0, &["foo"]).is_simple());
        assert!(!path("foo.bar", 0, &["foo", "bar"]).is_simple());
        assert!(!path("this", 0, &[]).is_simple());
    }
}
