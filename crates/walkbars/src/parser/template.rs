//! Template parser using winnow.
//!
//! Parses Handlebars template strings into a [`Program`]. Handles:
//! - Content with `\{{` escapes
//! - Mustaches `{{x}}`, `{{{x}}}`, `{{&x}}`, comments and decorators
//! - Blocks with `{{else}}`, `{{^}}` and `{{else if ..}}` chains
//! - Raw blocks `{{{{raw}}}}..{{{{/raw}}}}`
//! - Partials, partial blocks and `as |a b|` block params
//!
//! Whitespace control runs as a separate pass once the tree is built.

use std::mem;
use std::rc::Rc;

use winnow::ascii::{digit1, multispace0, multispace1};
use winnow::combinator::{alt, cut_err, delimited, empty, not, opt, peek, preceded, repeat, terminated};
use winnow::error::{ContextError, ErrMode, FromExternalError, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::stream::{LocatingSlice, Location, Stream};
use winnow::token::{none_of, one_of, take_while};

use super::ast::*;
use super::error::{ParseError, SyntaxMessage};
use super::whitespace::WhitespaceControl;

type Input<'i> = LocatingSlice<&'i str>;

/// Parse a template with standard standalone-line handling.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    parse_template(source, false)
}

/// Parse a template into an AST.
///
/// With `ignore_standalone`, lines holding only a block tag, comment or
/// partial keep their surrounding whitespace.
pub fn parse_template(source: &str, ignore_standalone: bool) -> Result<Program, ParseError> {
    let mut program = root.parse(LocatingSlice::new(source)).map_err(|e| {
        let offset = e.offset();
        let (line, column) = calculate_position(source, offset);
        ParseError::Syntax {
            line,
            column,
            offset,
            message: describe(e.inner()),
        }
    })?;
    WhitespaceControl::new(ignore_standalone).accept(&mut program);
    Ok(program)
}

/// Calculate line and column from a byte offset into the source.
fn calculate_position(source: &str, offset: usize) -> (usize, usize) {
    let consumed = source.get(..offset).unwrap_or(source);
    let line = consumed.chars().filter(|&c| c == '\n').count() + 1;
    let column = match consumed.rfind('\n') {
        Some(pos) => consumed.len() - pos,
        None => consumed.len() + 1,
    };
    (line, column)
}

fn describe(error: &ContextError) -> String {
    if let Some(cause) = error.cause() {
        return cause.to_string();
    }
    let text = error.to_string();
    if text.is_empty() {
        "unexpected input".to_string()
    } else {
        text.replace('\n', "; ")
    }
}

fn syntax_error(input: &Input<'_>, message: String) -> ErrMode<ContextError> {
    ErrMode::Cut(ContextError::from_external_error(input, SyntaxMessage(message)))
}

fn backtrack() -> ErrMode<ContextError> {
    ErrMode::Backtrack(ContextError::new())
}

fn root(input: &mut Input<'_>) -> ModalResult<Program> {
    let program = program(input)?;
    if input.eof_offset() > 0 {
        let rest: &str = input.peek_finish();
        let tag = rest.find("}}").map_or(rest, |end| &rest[..end + 2]);
        return Err(syntax_error(input, format!("unexpected '{tag}'")));
    }
    Ok(program)
}

/// Statements up to end of input, a close tag or an inverse separator.
fn program(input: &mut Input<'_>) -> ModalResult<Program> {
    let start = input.current_token_start();
    let mut body = Vec::new();
    while input.eof_offset() > 0 && !at_program_end(input)? {
        body.push(statement(input)?);
    }
    Ok(Program {
        body,
        block_params: Vec::new(),
        chained: false,
        loc: Span::new(start, input.current_token_start()),
    })
}

fn at_program_end(input: &mut Input<'_>) -> ModalResult<bool> {
    let end = opt(peek(alt((
        (open, ws, '/').void(),
        inverse_tag.void(),
        (open, ws, "else", multispace1).void(),
    ))))
    .parse_next(input)?;
    Ok(end.is_some())
}

fn statement(input: &mut Input<'_>) -> ModalResult<Statement> {
    alt((
        content.map(Statement::Content),
        raw_block.map(Statement::Block),
        comment.map(Statement::Comment),
        partial_block.map(Statement::PartialBlock),
        block,
        partial.map(Statement::Partial),
        decorator.map(Statement::Decorator),
        mustache.map(Statement::Mustache),
    ))
    .parse_next(input)
}

/// Text up to the next unescaped `{{`.
fn content(input: &mut Input<'_>) -> ModalResult<ContentStatement> {
    let start = input.current_token_start();
    let text: &str = input.peek_finish();
    let (value, consumed) = scan_content(text);
    if consumed == 0 {
        return Err(backtrack());
    }
    input.next_slice(consumed);
    Ok(ContentStatement {
        original: value.clone(),
        value,
        left_stripped: false,
        right_stripped: false,
        loc: Span::new(start, input.current_token_start()),
    })
}

/// Returns the content value and the number of bytes it spans. `\{{`
/// emits a literal `{{`; `\\{{` emits a backslash and ends the content.
fn scan_content(text: &str) -> (String, usize) {
    let mut value = String::new();
    let mut i = 0;
    loop {
        let Some(found) = text[i..].find("{{") else {
            value.push_str(&text[i..]);
            return (value, text.len());
        };
        let at = i + found;
        let before = &text[i..at];
        if before.ends_with("\\\\") {
            value.push_str(&before[..before.len() - 1]);
            return (value, at);
        }
        if let Some(escaped) = before.strip_suffix('\\') {
            value.push_str(escaped);
            value.push_str("{{");
            i = at + 2;
            continue;
        }
        value.push_str(before);
        return (value, at);
    }
}

fn comment(input: &mut Input<'_>) -> ModalResult<CommentStatement> {
    let start = input.current_token_start();
    let open_strip = terminated(open, '!').parse_next(input)?;
    let long = opt("--").parse_next(input)?.is_some();
    let rest: &str = input.peek_finish();
    let end = if long {
        match (rest.find("--}}"), rest.find("--~}}")) {
            (Some(plain), Some(stripped)) if stripped < plain => Some((stripped, 5, true)),
            (Some(plain), _) => Some((plain, 4, false)),
            (None, Some(stripped)) => Some((stripped, 5, true)),
            (None, None) => None,
        }
    } else {
        rest.find("}}").map(|at| {
            if rest[..at].ends_with('~') {
                (at - 1, 3, true)
            } else {
                (at, 2, false)
            }
        })
    };
    let Some((len, close_len, close_strip)) = end else {
        return Err(syntax_error(input, "unclosed comment".to_string()));
    };
    let value = input.next_slice(len).to_string();
    input.next_slice(close_len);
    Ok(CommentStatement {
        value,
        strip: StripFlags {
            open: open_strip,
            close: close_strip,
        },
        loc: Span::new(start, input.current_token_start()),
    })
}

fn raw_block(input: &mut Input<'_>) -> ModalResult<BlockStatement> {
    let start = input.current_token_start();
    ("{{{{", ws).void().parse_next(input)?;
    let parts = cut_err(call_parts).parse_next(input)?;
    cut_err((ws, "}}}}")).void().parse_next(input)?;
    let name = parts.path.original().unwrap_or_default();
    let close = ["{{{{/", name.as_str(), "}}}}"].concat();
    let content_start = input.current_token_start();
    let rest: &str = input.peek_finish();
    let Some(len) = rest.find(&close) else {
        return Err(syntax_error(input, format!("unclosed raw block '{name}'")));
    };
    let raw = input.next_slice(len).to_string();
    let content_end = input.current_token_start();
    input.next_slice(close.len());
    let content_loc = Span::new(content_start, content_end);
    let body = if raw.is_empty() {
        Vec::new()
    } else {
        vec![Statement::Content(ContentStatement {
            original: raw.clone(),
            value: raw,
            left_stripped: false,
            right_stripped: false,
            loc: content_loc,
        })]
    };
    Ok(BlockStatement {
        path: parts.path,
        params: parts.params,
        hash: parts.hash,
        program: Some(Rc::new(Program {
            body,
            block_params: Vec::new(),
            chained: false,
            loc: content_loc,
        })),
        inverse: None,
        open_strip: StripFlags::default(),
        inverse_strip: StripFlags::default(),
        close_strip: StripFlags::default(),
        loc: Span::new(start, input.current_token_start()),
    })
}

/// The name, params and hash shared by mustaches, blocks and sub-expressions.
struct CallParts {
    path: Expression,
    params: Vec<Expression>,
    hash: Option<Hash>,
}

/// An opening block tag.
struct OpenBlock {
    parts: CallParts,
    block_params: Vec<String>,
    strip: StripFlags,
    decorator: bool,
}

/// An `{{else}}` section, or a chained `{{else if ..}}` wrapped in a program.
struct InverseChain {
    strip: StripFlags,
    program: Program,
    chain: bool,
}

fn block(input: &mut Input<'_>) -> ModalResult<Statement> {
    let start = input.current_token_start();
    let open_strip = open(input)?;
    let inverted = alt(('#'.value(false), '^'.value(true))).parse_next(input)?;
    // `{{#>` opens a partial block and `{{^}}` is an inverse separator.
    if opt(peek(alt(('>'.void(), (ws, opt('~'), "}}").void()))))
        .parse_next(input)?
        .is_some()
    {
        return Err(backtrack());
    }
    let decorator = !inverted && opt('*').parse_next(input)?.is_some();
    ws(input)?;
    let (parts, block_params, close_strip) = cut_err(open_block_tail).parse_next(input)?;
    let name = parts.path.original().unwrap_or_default();
    let program = program(input)?;
    let inverse = opt(inverse_chain).parse_next(input)?;
    let Some((close_name, block_close)) = opt(close_block).parse_next(input)? else {
        return Err(syntax_error(input, format!("unclosed block '{name}'")));
    };
    if close_name != name {
        return Err(syntax_error(input, format!("{name} doesn't match {close_name}")));
    }
    if decorator && inverse.is_some() {
        return Err(syntax_error(
            input,
            "Unexpected inverse block on decorator".to_string(),
        ));
    }
    let open = OpenBlock {
        parts,
        block_params,
        strip: StripFlags {
            open: open_strip,
            close: close_strip,
        },
        decorator,
    };
    let loc = Span::new(start, input.current_token_start());
    Ok(prepare_block(open, program, inverse, Some(block_close), inverted, loc))
}

fn prepare_block(
    open: OpenBlock,
    mut program: Program,
    inverse: Option<InverseChain>,
    close_strip: Option<StripFlags>,
    inverted: bool,
    loc: Span,
) -> Statement {
    program.block_params = open.block_params;
    let mut inverse_strip = StripFlags::default();
    let mut inverse_program = None;
    if let Some(mut chain) = inverse {
        if chain.chain
            && let Some(Statement::Block(first)) = chain.program.body.first_mut()
        {
            first.close_strip = close_strip.unwrap_or_default();
        }
        inverse_strip = chain.strip;
        inverse_program = Some(Rc::new(chain.program));
    }
    let mut program = Some(Rc::new(program));
    if inverted {
        mem::swap(&mut program, &mut inverse_program);
    }
    let block = BlockStatement {
        path: open.parts.path,
        params: open.parts.params,
        hash: open.parts.hash,
        program,
        inverse: inverse_program,
        open_strip: open.strip,
        inverse_strip,
        close_strip: close_strip.unwrap_or_default(),
        loc,
    };
    if open.decorator {
        Statement::DecoratorBlock(block)
    } else {
        Statement::Block(block)
    }
}

fn open_block_tail(input: &mut Input<'_>) -> ModalResult<(CallParts, Vec<String>, bool)> {
    let parts = call_parts(input)?;
    let block_params = opt(block_params).parse_next(input)?.unwrap_or_default();
    let strip = close(input)?;
    Ok((parts, block_params, strip))
}

fn inverse_chain(input: &mut Input<'_>) -> ModalResult<InverseChain> {
    alt((inverse_and_program, open_inverse_chain)).parse_next(input)
}

fn inverse_tag(input: &mut Input<'_>) -> ModalResult<StripFlags> {
    (open, ws, alt(('^'.void(), "else".void())), close)
        .map(|(open, _, _, close)| StripFlags { open, close })
        .parse_next(input)
}

fn inverse_and_program(input: &mut Input<'_>) -> ModalResult<InverseChain> {
    let strip = inverse_tag(input)?;
    let program = program(input)?;
    Ok(InverseChain {
        strip,
        program,
        chain: false,
    })
}

/// `{{else if x}}..` becomes an inverse program holding a nested block.
fn open_inverse_chain(input: &mut Input<'_>) -> ModalResult<InverseChain> {
    let start = input.current_token_start();
    let open_strip = open(input)?;
    (ws, "else", multispace1).void().parse_next(input)?;
    let (parts, block_params, close_strip) = cut_err(open_block_tail).parse_next(input)?;
    let strip = StripFlags {
        open: open_strip,
        close: close_strip,
    };
    let program = program(input)?;
    let next = opt(inverse_chain).parse_next(input)?;
    let next_strip = next.as_ref().map(|chain| chain.strip);
    let loc = Span::new(start, input.current_token_start());
    let open = OpenBlock {
        parts,
        block_params,
        strip,
        decorator: false,
    };
    let nested = prepare_block(open, program, next, next_strip, false, loc);
    Ok(InverseChain {
        strip,
        program: Program {
            body: vec![nested],
            block_params: Vec::new(),
            chained: true,
            loc,
        },
        chain: true,
    })
}

fn close_block(input: &mut Input<'_>) -> ModalResult<(String, StripFlags)> {
    let open_strip = open(input)?;
    (ws, '/', ws).void().parse_next(input)?;
    let name = cut_err(helper_name).parse_next(input)?;
    let close_strip = cut_err(close).parse_next(input)?;
    Ok((
        name.original().unwrap_or_default(),
        StripFlags {
            open: open_strip,
            close: close_strip,
        },
    ))
}

fn partial(input: &mut Input<'_>) -> ModalResult<PartialStatement> {
    let start = input.current_token_start();
    let open_strip = terminated(open, '>').parse_next(input)?;
    ws(input)?;
    let (parts, close_strip) = cut_err(partial_tail).parse_next(input)?;
    Ok(PartialStatement {
        name: parts.path,
        params: parts.params,
        hash: parts.hash,
        indent: String::new(),
        strip: StripFlags {
            open: open_strip,
            close: close_strip,
        },
        loc: Span::new(start, input.current_token_start()),
    })
}

fn partial_tail(input: &mut Input<'_>) -> ModalResult<(CallParts, bool)> {
    let parts = call_parts(input)?;
    let strip = close(input)?;
    Ok((parts, strip))
}

fn partial_block(input: &mut Input<'_>) -> ModalResult<PartialBlockStatement> {
    let start = input.current_token_start();
    let open_strip = terminated(open, ('#', '>')).parse_next(input)?;
    ws(input)?;
    let (parts, open_close) = cut_err(partial_tail).parse_next(input)?;
    let name = parts.path.original().unwrap_or_default();
    let program = program(input)?;
    let Some((close_name, close_strip)) = opt(close_block).parse_next(input)? else {
        return Err(syntax_error(input, format!("unclosed partial block '{name}'")));
    };
    if close_name != name {
        return Err(syntax_error(input, format!("{name} doesn't match {close_name}")));
    }
    Ok(PartialBlockStatement {
        name: parts.path,
        params: parts.params,
        hash: parts.hash,
        program: Rc::new(program),
        open_strip: StripFlags {
            open: open_strip,
            close: open_close,
        },
        close_strip,
        loc: Span::new(start, input.current_token_start()),
    })
}

fn decorator(input: &mut Input<'_>) -> ModalResult<MustacheStatement> {
    let start = input.current_token_start();
    let open_strip = terminated(open, '*').parse_next(input)?;
    ws(input)?;
    let (parts, close_strip) = cut_err(partial_tail).parse_next(input)?;
    Ok(MustacheStatement {
        path: parts.path,
        params: parts.params,
        hash: parts.hash,
        escaped: true,
        strip: StripFlags {
            open: open_strip,
            close: close_strip,
        },
        loc: Span::new(start, input.current_token_start()),
    })
}

fn mustache(input: &mut Input<'_>) -> ModalResult<MustacheStatement> {
    let start = input.current_token_start();
    let open_strip = open(input)?;
    let (escaped, triple) = alt((
        '{'.value((false, true)),
        '&'.value((false, false)),
        empty.value((true, false)),
    ))
    .parse_next(input)?;
    ws(input)?;
    let parts = cut_err(call_parts).parse_next(input)?;
    let close_strip = if triple {
        cut_err(close_triple).parse_next(input)?
    } else {
        cut_err(close).parse_next(input)?
    };
    Ok(MustacheStatement {
        path: parts.path,
        params: parts.params,
        hash: parts.hash,
        escaped,
        strip: StripFlags {
            open: open_strip,
            close: close_strip,
        },
        loc: Span::new(start, input.current_token_start()),
    })
}

fn call_parts(input: &mut Input<'_>) -> ModalResult<CallParts> {
    let path = param
        .context(StrContext::Label("expression"))
        .parse_next(input)?;
    let params = params(input)?;
    let hash = opt(hash).parse_next(input)?;
    Ok(CallParts { path, params, hash })
}

fn params(input: &mut Input<'_>) -> ModalResult<Vec<Expression>> {
    repeat(
        0..,
        preceded((ws, not(hash_pair_start), not(block_params_open)), param),
    )
    .parse_next(input)
}

fn param(input: &mut Input<'_>) -> ModalResult<Expression> {
    alt((sub_expression.map(Expression::SubExpression), helper_name)).parse_next(input)
}

fn sub_expression(input: &mut Input<'_>) -> ModalResult<SubExpression> {
    let start = input.current_token_start();
    ('(', ws).void().parse_next(input)?;
    let parts = cut_err(call_parts).parse_next(input)?;
    cut_err((ws, ')'))
        .context(StrContext::Expected(StrContextValue::CharLiteral(')')))
        .void()
        .parse_next(input)?;
    Ok(SubExpression {
        path: Box::new(parts.path),
        params: parts.params,
        hash: parts.hash,
        loc: Span::new(start, input.current_token_start()),
    })
}

fn hash(input: &mut Input<'_>) -> ModalResult<Hash> {
    let start = input.current_token_start();
    let pairs: Vec<HashPair> = repeat(1.., preceded(ws, hash_pair)).parse_next(input)?;
    let start = pairs.first().map_or(start, |pair| pair.loc.start);
    Ok(Hash {
        pairs,
        loc: Span::new(start, input.current_token_start()),
    })
}

fn hash_pair_start(input: &mut Input<'_>) -> ModalResult<()> {
    (hash_key, ws, '=').void().parse_next(input)
}

fn hash_pair(input: &mut Input<'_>) -> ModalResult<HashPair> {
    let start = input.current_token_start();
    let key = hash_key(input)?;
    (ws, '=', ws).void().parse_next(input)?;
    let value = cut_err(param).parse_next(input)?;
    Ok(HashPair {
        key,
        value,
        loc: Span::new(start, input.current_token_start()),
    })
}

fn hash_key(input: &mut Input<'_>) -> ModalResult<String> {
    alt((bracket_segment, take_while(1.., is_id_char).map(str::to_string))).parse_next(input)
}

fn block_params_open(input: &mut Input<'_>) -> ModalResult<()> {
    ("as", multispace1, '|').void().parse_next(input)
}

fn block_params(input: &mut Input<'_>) -> ModalResult<Vec<String>> {
    preceded(
        (ws, block_params_open, ws),
        cut_err(terminated(
            repeat(1.., terminated(take_while(1.., is_id_char).map(str::to_string), ws)),
            '|',
        )),
    )
    .parse_next(input)
}

fn helper_name(input: &mut Input<'_>) -> ModalResult<Expression> {
    alt((
        string_literal.map(Expression::String),
        number_literal.map(Expression::Number),
        boolean_literal.map(Expression::Boolean),
        nullish_literal,
        path_expression.map(Expression::Path),
    ))
    .parse_next(input)
}

fn string_literal(input: &mut Input<'_>) -> ModalResult<StringLiteral> {
    let start = input.current_token_start();
    let value = alt((double_quoted, single_quoted)).parse_next(input)?;
    Ok(StringLiteral {
        original: value.clone(),
        value,
        loc: Span::new(start, input.current_token_start()),
    })
}

fn double_quoted(input: &mut Input<'_>) -> ModalResult<String> {
    delimited(
        '"',
        repeat(0.., alt(("\\\"".value('"'), none_of('"')))),
        cut_err('"'),
    )
    .parse_next(input)
}

fn single_quoted(input: &mut Input<'_>) -> ModalResult<String> {
    delimited(
        '\'',
        repeat(0.., alt(("\\'".value('\''), none_of('\'')))),
        cut_err('\''),
    )
    .parse_next(input)
}

fn number_literal(input: &mut Input<'_>) -> ModalResult<NumberLiteral> {
    let start = input.current_token_start();
    let text: &str = terminated((opt('-'), digit1, opt(('.', digit1))).take(), peek(literal_end))
        .parse_next(input)?;
    let value = text.parse().map_err(|_| backtrack())?;
    Ok(NumberLiteral {
        value,
        original: text.to_string(),
        loc: Span::new(start, input.current_token_start()),
    })
}

fn boolean_literal(input: &mut Input<'_>) -> ModalResult<BooleanLiteral> {
    let start = input.current_token_start();
    let text: &str = terminated(alt(("true", "false")), peek(literal_end)).parse_next(input)?;
    Ok(BooleanLiteral {
        value: text == "true",
        original: text.to_string(),
        loc: Span::new(start, input.current_token_start()),
    })
}

fn nullish_literal(input: &mut Input<'_>) -> ModalResult<Expression> {
    let start = input.current_token_start();
    let text: &str =
        terminated(alt(("undefined", "null")), peek(literal_end)).parse_next(input)?;
    let literal = NullishLiteral {
        loc: Span::new(start, input.current_token_start()),
    };
    Ok(if text == "null" {
        Expression::Null(literal)
    } else {
        Expression::Undefined(literal)
    })
}

/// A path segment as written.
struct Segment {
    text: String,
    literal: bool,
}

fn path_expression(input: &mut Input<'_>) -> ModalResult<PathExpression> {
    let start = input.current_token_start();
    let data = opt('@').parse_next(input)?.is_some();
    let first = path_segment(input)?;
    let rest: Vec<(char, Segment)> =
        repeat(0.., (one_of(['.', '/']), path_segment)).parse_next(input)?;

    let mut original = if data { "@".to_string() } else { String::new() };
    let mut parts = Vec::new();
    let mut depth = 0;
    let segments = [(None, first)]
        .into_iter()
        .chain(rest.into_iter().map(|(separator, segment)| (Some(separator), segment)));
    for (separator, segment) in segments {
        if let Some(separator) = separator {
            original.push(separator);
        }
        original.push_str(&segment.text);
        if !segment.literal && matches!(segment.text.as_str(), ".." | "." | "this") {
            if !parts.is_empty() {
                return Err(syntax_error(input, format!("Invalid path: {original}")));
            }
            if segment.text == ".." {
                depth += 1;
            }
        } else {
            parts.push(segment.text);
        }
    }
    Ok(PathExpression {
        data,
        depth,
        parts,
        original,
        loc: Span::new(start, input.current_token_start()),
    })
}

fn path_segment(input: &mut Input<'_>) -> ModalResult<Segment> {
    alt((
        terminated(alt(("..", ".")), peek(path_end)).map(|text: &str| Segment {
            text: text.to_string(),
            literal: false,
        }),
        bracket_segment.map(|text| Segment {
            text,
            literal: true,
        }),
        take_while(1.., is_id_char).map(|text: &str| Segment {
            text: text.to_string(),
            literal: false,
        }),
    ))
    .parse_next(input)
}

fn bracket_segment(input: &mut Input<'_>) -> ModalResult<String> {
    delimited('[', take_while(0.., |c: char| c != ']'), cut_err(']'))
        .map(str::to_string)
        .parse_next(input)
}

fn open(input: &mut Input<'_>) -> ModalResult<bool> {
    preceded("{{", opt('~'))
        .map(|strip| strip.is_some())
        .parse_next(input)
}

fn close(input: &mut Input<'_>) -> ModalResult<bool> {
    preceded(ws, terminated(opt('~'), "}}"))
        .map(|strip| strip.is_some())
        .context(StrContext::Expected(StrContextValue::StringLiteral("}}")))
        .parse_next(input)
}

fn close_triple(input: &mut Input<'_>) -> ModalResult<bool> {
    preceded(ws, terminated(opt('~'), "}}}"))
        .map(|strip| strip.is_some())
        .context(StrContext::Expected(StrContextValue::StringLiteral("}}}")))
        .parse_next(input)
}

fn ws(input: &mut Input<'_>) -> ModalResult<()> {
    multispace0.void().parse_next(input)
}

fn literal_end(input: &mut Input<'_>) -> ModalResult<char> {
    one_of(|c: char| c.is_whitespace() || matches!(c, '~' | '}' | ')')).parse_next(input)
}

fn path_end(input: &mut Input<'_>) -> ModalResult<char> {
    one_of(|c: char| c.is_whitespace() || matches!(c, '=' | '~' | '}' | '/' | '.' | ')' | '|'))
        .parse_next(input)
}

/// Characters allowed in an unbracketed identifier.
fn is_id_char(c: char) -> bool {
    !c.is_whitespace() && !"!\"#%&'()*+,./;<=>@[\\]^`{|}~".contains(c)
}
