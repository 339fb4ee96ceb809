//! Implementation of the `walkbars render` command.

use std::ffi::OsStr;
use std::fs::{read_dir, read_to_string};
use std::path::{Path, PathBuf};

use miette::{miette, IntoDiagnostic};
use serde::Serialize;
use tracing::{debug, info};
use walkbars::{CompileOptions, RenderError, Value, Walkbars};

use crate::output::TemplateDiagnostic;

/// Arguments for the render command.
#[derive(Debug, clap::Args)]
pub struct RenderArgs {
    /// Template file to render
    pub template: PathBuf,

    /// JSON file holding the render context
    #[arg(short, long, env = "WALKBARS_DATA")]
    pub data: Option<PathBuf>,

    /// Partials in name=path format (repeatable)
    #[arg(short = 'p', long = "partial", value_parser = parse_key_val)]
    pub partials: Vec<(String, String)>,

    /// Directory of partials; each `.hbs` file is registered under its stem
    #[arg(long, env = "WALKBARS_PARTIALS")]
    pub partials_dir: Option<PathBuf>,

    /// Write output without HTML escaping
    #[arg(long)]
    pub no_escape: bool,

    /// Resolve bare names through every enclosing context
    #[arg(long)]
    pub compat: bool,

    /// Only known helpers are resolved as helpers
    #[arg(long)]
    pub known_helpers_only: bool,

    /// Do not indent standalone partials
    #[arg(long)]
    pub prevent_indent: bool,

    /// Keep whitespace around standalone tags
    #[arg(long)]
    pub ignore_standalone: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON output for render results.
#[derive(Serialize)]
pub struct RenderResult {
    pub result: String,
}

/// Parse a name=value argument.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid partial '{s}': expected name=path"))?;
    Ok((name.to_string(), value.to_string()))
}

/// Run the render command.
pub fn run_render(args: RenderArgs) -> miette::Result<i32> {
    let source = read_text(&args.template, "template")?;
    let context = match &args.data {
        Some(path) => load_context(path)?,
        None => Value::empty_object(),
    };

    let options = CompileOptions::builder()
        .no_escape(args.no_escape)
        .compat(args.compat)
        .known_helpers_only(args.known_helpers_only)
        .prevent_indent(args.prevent_indent)
        .ignore_standalone(args.ignore_standalone)
        .build();
    let mut walkbars = Walkbars::with_options(options);

    if let Some(dir) = &args.partials_dir {
        for (name, path) in partials_in(dir)? {
            register_partial(&mut walkbars, &name, &path)?;
        }
    }
    for (name, path) in &args.partials {
        register_partial(&mut walkbars, name, Path::new(path))?;
    }

    info!(template = %args.template.display(), "rendering");
    match walkbars.render(&source, context) {
        Ok(result) => {
            if args.json {
                let output = RenderResult { result };
                println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
            } else {
                print!("{result}");
            }
            Ok(exitcode::OK)
        }
        Err(RenderError::Parse(e)) => {
            Err(TemplateDiagnostic::from_parse_error(&args.template, &source, &e).into())
        }
        Err(e) => {
            if args.json {
                let output = serde_json::json!({
                    "error": e.to_string()
                });
                eprintln!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
            } else {
                eprintln!("Render error: {e}");
            }
            Ok(exitcode::DATAERR)
        }
    }
}

fn read_text(path: &Path, what: &str) -> miette::Result<String> {
    read_to_string(path).map_err(|e| miette!("Cannot read {} {}: {}", what, path.display(), e))
}

fn load_context(path: &Path) -> miette::Result<Value> {
    let text = read_text(path, "data file")?;
    let json: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| miette!("Invalid JSON in {}: {}", path.display(), e))?;
    Ok(Value::from(json))
}

/// `.hbs` files directly inside `dir`, sorted by name.
fn partials_in(dir: &Path) -> miette::Result<Vec<(String, PathBuf)>> {
    let entries = read_dir(dir)
        .map_err(|e| miette!("Cannot read partials directory {}: {}", dir.display(), e))?;
    let mut partials = Vec::new();
    for entry in entries {
        let path = entry.into_diagnostic()?.path();
        if path.extension() != Some(OsStr::new("hbs")) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(OsStr::to_str) {
            partials.push((stem.to_string(), path.clone()));
        }
    }
    partials.sort();
    Ok(partials)
}

fn register_partial(walkbars: &mut Walkbars, name: &str, path: &Path) -> miette::Result<()> {
    let source = read_text(path, "partial")?;
    debug!(name, path = %path.display(), "registering partial");
    walkbars
        .register_partial(name, source)
        .map_err(|e| miette!("Cannot register partial {}: {}", name, e))
}
