//! Whitespace control: `~` stripping, standalone lines and partial indent.
//!
//! A tag is standalone when it is the only non-whitespace on its line.
//! Standalone block tags, comments and partials remove that line's leading
//! whitespace and trailing newline. Standalone partials remember the removed
//! indentation so it can be applied to every line they render.

use std::rc::Rc;

use super::ast::{BlockStatement, Program, Statement, StripFlags};

/// What a statement asks of its neighbours.
#[derive(Debug, Default, Clone, Copy)]
struct Strip {
    open: bool,
    close: bool,
    open_standalone: bool,
    close_standalone: bool,
    inline_standalone: bool,
}

pub(crate) struct WhitespaceControl {
    ignore_standalone: bool,
    root_seen: bool,
}

impl WhitespaceControl {
    pub(crate) fn new(ignore_standalone: bool) -> WhitespaceControl {
        WhitespaceControl {
            ignore_standalone,
            root_seen: false,
        }
    }

    pub(crate) fn accept(&mut self, program: &mut Program) {
        let do_standalone = !self.ignore_standalone;
        let is_root = !self.root_seen;
        self.root_seen = true;

        let body = &mut program.body;
        for i in 0..body.len() {
            let Some(strip) = self.visit(&mut body[i]) else {
                continue;
            };

            let prev_whitespace = is_prev_whitespace(body, i, is_root);
            let next_whitespace = is_next_whitespace(body, Some(i), is_root);
            let open_standalone = strip.open_standalone && prev_whitespace;
            let close_standalone = strip.close_standalone && next_whitespace;
            let inline_standalone = strip.inline_standalone && prev_whitespace && next_whitespace;

            if strip.close {
                omit_right(body, Some(i), true);
            }
            if strip.open {
                omit_left(body, Some(i), true);
            }

            if do_standalone && inline_standalone {
                omit_right(body, Some(i), false);
                if omit_left(body, Some(i), false) {
                    let indent = match &body[i - 1] {
                        Statement::Content(content) => trailing_blanks(&content.original),
                        _ => String::new(),
                    };
                    if let Statement::Partial(partial) = &mut body[i] {
                        partial.indent = indent;
                    }
                }
            }
            if do_standalone && open_standalone {
                if let Some(program) = opening_program(&mut body[i]) {
                    omit_right(&mut Rc::make_mut(program).body, None, false);
                }
                omit_left(body, Some(i), false);
            }
            if do_standalone && close_standalone {
                omit_right(body, Some(i), false);
                if let Some(program) = closing_program(&mut body[i]) {
                    omit_left(&mut Rc::make_mut(program).body, None, false);
                }
            }
        }
    }

    fn visit(&mut self, statement: &mut Statement) -> Option<Strip> {
        match statement {
            Statement::Block(block) | Statement::DecoratorBlock(block) => Some(self.visit_block(
                block.program.as_mut(),
                block.inverse.as_mut(),
                block.open_strip,
                block.inverse_strip,
                block.close_strip,
            )),
            Statement::PartialBlock(block) => Some(self.visit_block(
                Some(&mut block.program),
                None,
                block.open_strip,
                StripFlags::default(),
                block.close_strip,
            )),
            Statement::Mustache(mustache) | Statement::Decorator(mustache) => Some(Strip {
                open: mustache.strip.open,
                close: mustache.strip.close,
                ..Strip::default()
            }),
            Statement::Partial(partial) => Some(inline_strip(partial.strip)),
            Statement::Comment(comment) => Some(inline_strip(comment.strip)),
            Statement::Content(_) | Statement::Unknown => None,
        }
    }

    fn visit_block(
        &mut self,
        program: Option<&mut Rc<Program>>,
        inverse: Option<&mut Rc<Program>>,
        open_strip: StripFlags,
        inverse_strip: StripFlags,
        close_strip: StripFlags,
    ) -> Strip {
        let mut program = program.map(Rc::make_mut);
        let mut inverse = inverse.map(Rc::make_mut);
        if let Some(program) = program.as_deref_mut() {
            self.accept(program);
        }
        if let Some(inverse) = inverse.as_deref_mut() {
            self.accept(inverse);
        }

        // An inverted block has only an inverse; treat it as the main program.
        let (main, inverse) = match (program, inverse) {
            (Some(program), inverse) => (program, inverse),
            (None, Some(inverse)) => (inverse, None),
            (None, None) => {
                return Strip {
                    open: open_strip.open,
                    close: close_strip.close,
                    ..Strip::default()
                };
            }
        };

        let strip = Strip {
            open: open_strip.open,
            close: close_strip.close,
            open_standalone: is_next_whitespace(&main.body, None, false),
            close_standalone: match inverse.as_deref() {
                Some(inverse) => {
                    let first = first_inverse(inverse);
                    is_prev_whitespace(&first.body, first.body.len(), false)
                }
                None => is_prev_whitespace(&main.body, main.body.len(), false),
            },
            ..Strip::default()
        };

        if open_strip.close {
            omit_right(&mut main.body, None, true);
        }

        if let Some(inverse) = inverse {
            if inverse_strip.open {
                omit_left(&mut main.body, None, true);
            }
            if inverse_strip.close {
                with_first_inverse(inverse, |first| omit_right(&mut first.body, None, true));
            }
            if close_strip.open {
                with_last_inverse(inverse, |last| {
                    omit_left(&mut last.body, None, true);
                });
            }
            if !self.ignore_standalone
                && is_prev_whitespace(&main.body, main.body.len(), false)
                && is_next_whitespace(&first_inverse(inverse).body, None, false)
            {
                omit_left(&mut main.body, None, false);
                with_first_inverse(inverse, |first| omit_right(&mut first.body, None, false));
            }
        } else if close_strip.open {
            omit_left(&mut main.body, None, true);
        }

        strip
    }
}

fn inline_strip(strip: StripFlags) -> Strip {
    Strip {
        open: strip.open,
        close: strip.close,
        inline_standalone: true,
        ..Strip::default()
    }
}

/// The program a block's open tag faces.
fn opening_program(statement: &mut Statement) -> Option<&mut Rc<Program>> {
    match statement {
        Statement::Block(block) | Statement::DecoratorBlock(block) => {
            block.program.as_mut().or(block.inverse.as_mut())
        }
        Statement::PartialBlock(block) => Some(&mut block.program),
        _ => None,
    }
}

/// The program a block's close tag faces.
fn closing_program(statement: &mut Statement) -> Option<&mut Rc<Program>> {
    match statement {
        Statement::Block(block) | Statement::DecoratorBlock(block) => {
            block.inverse.as_mut().or(block.program.as_mut())
        }
        Statement::PartialBlock(block) => Some(&mut block.program),
        _ => None,
    }
}

/// For a chained `{{else if}}` inverse, the body of the nested block.
fn first_inverse(inverse: &Program) -> &Program {
    if !inverse.chained {
        return inverse;
    }
    match inverse.body.first() {
        Some(Statement::Block(block)) => block.program.as_deref().unwrap_or(inverse),
        _ => inverse,
    }
}

fn with_first_inverse(inverse: &mut Program, f: impl FnOnce(&mut Program)) {
    if inverse.chained
        && let Some(Statement::Block(BlockStatement {
            program: Some(program),
            ..
        })) = inverse.body.first_mut()
    {
        f(Rc::make_mut(program));
        return;
    }
    f(inverse);
}

/// Runs `f` on the innermost program of an `{{else if}}` chain, which is
/// the one the close tag ends.
fn with_last_inverse(inverse: &mut Program, f: impl FnOnce(&mut Program)) {
    if inverse.chained
        && let Some(Statement::Block(BlockStatement {
            program: Some(program),
            ..
        })) = inverse.body.last_mut()
    {
        with_last_inverse(Rc::make_mut(program), f);
        return;
    }
    f(inverse);
}

/// Whether the content before position `i` ends in a newline plus blanks.
fn is_prev_whitespace(body: &[Statement], i: usize, is_root: bool) -> bool {
    let Some(prev) = i.checked_sub(1).and_then(|p| body.get(p)) else {
        return is_root;
    };
    let has_sibling = i.checked_sub(2).and_then(|s| body.get(s)).is_some();
    match prev {
        Statement::Content(content) if has_sibling || !is_root => {
            ends_with_blank_line(&content.original)
        }
        Statement::Content(content) => {
            is_blank(&content.original) || ends_with_blank_line(&content.original)
        }
        _ => false,
    }
}

/// Whether the content after position `i` (or the first statement when
/// `i` is `None`) starts with blanks and a newline.
fn is_next_whitespace(body: &[Statement], i: Option<usize>, is_root: bool) -> bool {
    let next_index = i.map_or(0, |i| i + 1);
    let Some(next) = body.get(next_index) else {
        return is_root;
    };
    let has_sibling = body.get(next_index + 1).is_some();
    match next {
        Statement::Content(content) if has_sibling || !is_root => {
            starts_with_blank_line(&content.original)
        }
        Statement::Content(content) => {
            is_blank(&content.original) || starts_with_blank_line(&content.original)
        }
        _ => false,
    }
}

/// Strips whitespace at the start of the content after position `i`.
/// Single-line stripping removes blanks up to and including one newline.
fn omit_right(body: &mut [Statement], i: Option<usize>, multiple: bool) {
    let index = i.map_or(0, |i| i + 1);
    let Some(Statement::Content(current)) = body.get_mut(index) else {
        return;
    };
    if !multiple && current.right_stripped {
        return;
    }
    let original = current.value.len();
    current.value = if multiple {
        current.value.trim_start().to_string()
    } else {
        strip_leading_line(&current.value).to_string()
    };
    current.right_stripped = current.value.len() != original;
}

/// Strips whitespace at the end of the content before position `i` (or
/// the last statement when `i` is `None`). Returns whether anything was
/// removed.
fn omit_left(body: &mut [Statement], i: Option<usize>, multiple: bool) -> bool {
    let index = match i {
        Some(i) => i.checked_sub(1),
        None => body.len().checked_sub(1),
    };
    let Some(Statement::Content(current)) = index.and_then(|index| body.get_mut(index)) else {
        return false;
    };
    if !multiple && current.left_stripped {
        return false;
    }
    let original = current.value.len();
    current.value = if multiple {
        current.value.trim_end().to_string()
    } else {
        current.value.trim_end_matches([' ', '\t']).to_string()
    };
    current.left_stripped = current.value.len() != original;
    current.left_stripped
}

fn is_blank(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

fn ends_with_blank_line(text: &str) -> bool {
    text.rfind('\n').is_some_and(|at| is_blank(&text[at + 1..]))
}

fn starts_with_blank_line(text: &str) -> bool {
    text.find('\n').is_some_and(|at| is_blank(&text[..at]))
}

/// Removes `[ \t]*\r?\n?` from the start of `text`.
fn strip_leading_line(text: &str) -> &str {
    let rest = text.trim_start_matches([' ', '\t']);
    let rest = rest.strip_prefix('\r').filter(|r| r.starts_with('\n')).unwrap_or(rest);
    rest.strip_prefix('\n').unwrap_or(rest)
}

fn trailing_blanks(text: &str) -> String {
    let trimmed = text.trim_end_matches([' ', '\t']);
    text[trimmed.len()..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_detection() {
        assert!(ends_with_blank_line("text\n  "));
        assert!(!ends_with_blank_line("text\n  x"));
        assert!(starts_with_blank_line("  \nmore"));
        assert!(!starts_with_blank_line("x\n"));
    }

    #[test]
    fn leading_line_strip_stops_after_one_newline() {
        assert_eq!(strip_leading_line("  \n\nx"), "\nx");
        assert_eq!(strip_leading_line("\t\r\nx"), "x");
        assert_eq!(strip_leading_line("  x"), "x");
    }

    #[test]
    fn trailing_blanks_of_content() {
        assert_eq!(trailing_blanks("a\n  \t"), "  \t");
        assert_eq!(trailing_blanks("a"), "");
    }
}
