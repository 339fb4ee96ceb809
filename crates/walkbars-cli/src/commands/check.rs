//! Implementation of the `walkbars check` command.

use std::fs::read_to_string;
use std::path::PathBuf;

use miette::{miette, IntoDiagnostic, Report};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::debug;
use walkbars::parser::{Expression, Hash, Program, Span, Statement};
use walkbars::{classify_static, parse_template, CallKind, CallSite, CallType, CompileOptions};

use crate::output::table::{format_call_site_table, CallSiteRow};
use crate::output::TemplateDiagnostic;

/// Arguments for the check command.
#[derive(Debug, clap::Args)]
pub struct CheckArgs {
    /// Template files to check
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Names to treat as known helpers (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub known_helpers: Vec<String>,

    /// Only known helpers are resolved as helpers
    #[arg(long)]
    pub known_helpers_only: bool,

    /// List the call sites of each template
    #[arg(long)]
    pub call_sites: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON output for one checked file.
#[derive(Debug, Serialize)]
struct CheckJson {
    file: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    call_sites: Vec<CallSiteRow>,
}

/// Run the check command.
pub fn run_check(args: CheckArgs) -> miette::Result<i32> {
    let options = CompileOptions::builder()
        .known_helpers(
            args.known_helpers
                .iter()
                .map(|name| (name.clone(), true))
                .collect(),
        )
        .known_helpers_only(args.known_helpers_only)
        .build();

    let mut results = Vec::new();
    let mut failed = false;
    for path in &args.files {
        let content = read_to_string(path)
            .into_diagnostic()
            .map_err(|e| miette!("Cannot read template {}: {}", path.display(), e))?;
        debug!(file = %path.display(), bytes = content.len(), "checking template");

        match parse_template(&content, options.ignore_standalone) {
            Ok(program) => {
                let rows = collect_call_sites(&program, &content, &options);
                results.push(CheckJson {
                    file: path.display().to_string(),
                    ok: true,
                    error: None,
                    call_sites: rows,
                });
            }
            Err(e) => {
                failed = true;
                let diagnostic = TemplateDiagnostic::from_parse_error(path, &content, &e);
                if !args.json {
                    eprintln!("{:?}", Report::new(diagnostic));
                }
                results.push(CheckJson {
                    file: path.display().to_string(),
                    ok: false,
                    error: Some(e.to_string()),
                    call_sites: Vec::new(),
                });
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results).into_diagnostic()?);
    } else {
        for result in results.iter().filter(|result| result.ok) {
            println!("{} {}", "ok".green(), result.file);
            if args.call_sites && !result.call_sites.is_empty() {
                println!("{}", format_call_site_table(&result.call_sites));
            }
        }
    }

    Ok(if failed { exitcode::DATAERR } else { exitcode::OK })
}

/// Collects every mustache, block and sub-expression call in `program`, in
/// source order.
pub fn collect_call_sites(
    program: &Program,
    content: &str,
    options: &CompileOptions,
) -> Vec<CallSiteRow> {
    let mut collector = Collector {
        content,
        options,
        rows: Vec::new(),
    };
    collector.program(program);
    collector.rows
}

struct Collector<'a> {
    content: &'a str,
    options: &'a CompileOptions,
    rows: Vec<CallSiteRow>,
}

impl Collector<'_> {
    fn program(&mut self, program: &Program) {
        for statement in &program.body {
            self.statement(statement);
        }
    }

    fn statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Mustache(mustache) => {
                if let Ok(site) = CallSite::mustache(mustache) {
                    self.record(&site, mustache.loc);
                }
                self.arguments(&mustache.params, mustache.hash.as_ref());
            }
            Statement::Block(block) => {
                if let Ok(site) = CallSite::block(block) {
                    self.record(&site, block.loc);
                }
                self.arguments(&block.params, block.hash.as_ref());
                for child in [&block.program, &block.inverse].into_iter().flatten() {
                    self.program(child);
                }
            }
            Statement::DecoratorBlock(block) => {
                if let Some(program) = &block.program {
                    self.program(program);
                }
            }
            Statement::Partial(partial) => {
                self.arguments(&partial.params, partial.hash.as_ref());
            }
            Statement::PartialBlock(partial) => {
                self.arguments(&partial.params, partial.hash.as_ref());
                self.program(&partial.program);
            }
            Statement::Content(_)
            | Statement::Comment(_)
            | Statement::Decorator(_)
            | Statement::Unknown => {}
        }
    }

    fn arguments(&mut self, params: &[Expression], hash: Option<&Hash>) {
        let hash_values = hash.into_iter().flat_map(|hash| hash.pairs.iter().map(|pair| &pair.value));
        for expression in params.iter().chain(hash_values) {
            if let Expression::SubExpression(sexpr) = expression {
                if let Ok(site) = CallSite::sub_expression(sexpr) {
                    self.record(&site, sexpr.loc);
                }
                self.arguments(&sexpr.params, sexpr.hash.as_ref());
            }
        }
    }

    fn record(&mut self, site: &CallSite<'_>, loc: Span) {
        self.rows.push(CallSiteRow {
            line: line_of(self.content, loc.start),
            kind: match site.kind {
                CallKind::Mustache => "mustache",
                CallKind::Block => "block",
                CallKind::SubExpression => "subexpression",
            },
            callee: site.path.original.clone(),
            resolution: match classify_static(site, self.options) {
                CallType::Simple => "simple",
                CallType::Helper => "helper",
                CallType::Ambiguous => "ambiguous",
            },
        });
    }
}

fn line_of(content: &str, offset: usize) -> usize {
    let prefix = content.get(..offset).unwrap_or(content);
    prefix.matches('\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(source: &str) -> Vec<(usize, &'static str, String, &'static str)> {
        let program = walkbars::parse(source).unwrap();
        collect_call_sites(&program, source, &CompileOptions::default())
            .into_iter()
            .map(|row| (row.line, row.kind, row.callee, row.resolution))
            .collect()
    }

    #[test]
    fn call_sites_are_listed_in_order() {
        assert_eq!(
            rows("{{name}}\n{{#each items}}{{format (upper this) size=(px 2)}}{{/each}}"),
            vec![
                (1, "mustache", "name".to_string(), "ambiguous"),
                (2, "block", "each".to_string(), "helper"),
                (2, "mustache", "format".to_string(), "helper"),
                (2, "subexpression", "upper".to_string(), "helper"),
                (2, "subexpression", "px".to_string(), "helper"),
            ]
        );
    }

    #[test]
    fn scoped_paths_are_simple() {
        assert_eq!(
            rows("{{this.name}} {{../up}}"),
            vec![
                (1, "mustache", "this.name".to_string(), "simple"),
                (1, "mustache", "../up".to_string(), "simple"),
            ]
        );
    }

    #[test]
    fn partial_arguments_and_bodies_are_walked() {
        let found = rows("{{> card (lookup . \"x\")}}{{#> frame}}{{title}}{{/frame}}");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].2, "lookup");
        assert_eq!(found[1].2, "title");
    }

    #[test]
    fn line_numbers_count_newlines() {
        assert_eq!(line_of("a\nb\nc", 0), 1);
        assert_eq!(line_of("a\nb\nc", 4), 3);
    }
}
