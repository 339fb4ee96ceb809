//! Implementation of the `walkbars precompile` command.

use std::fs::{read_to_string, write};
use std::path::PathBuf;

use miette::{miette, IntoDiagnostic};
use walkbars::{precompile, CompileOptions, PrecompileOptions, RenderError};

use crate::output::TemplateDiagnostic;

/// Arguments for the precompile command.
#[derive(Debug, clap::Args)]
pub struct PrecompileArgs {
    /// Template file to precompile
    pub template: PathBuf,

    /// Write the JSON here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Name recorded in the output; defaults to the template path
    #[arg(long)]
    pub src_name: Option<String>,

    /// Keep whitespace around standalone tags
    #[arg(long)]
    pub ignore_standalone: bool,
}

/// Run the precompile command.
pub fn run_precompile(args: PrecompileArgs) -> miette::Result<i32> {
    let source = read_to_string(&args.template)
        .map_err(|e| miette!("Cannot read template {}: {}", args.template.display(), e))?;
    let options = PrecompileOptions::builder()
        .src_name(
            args.src_name
                .clone()
                .unwrap_or_else(|| args.template.display().to_string()),
        )
        .compile(
            CompileOptions::builder()
                .ignore_standalone(args.ignore_standalone)
                .build(),
        )
        .build();

    let precompiled = match precompile(&source, options) {
        Ok(precompiled) => precompiled,
        Err(RenderError::Parse(e)) => {
            return Err(TemplateDiagnostic::from_parse_error(&args.template, &source, &e).into());
        }
        Err(e) => return Err(miette!("Cannot precompile {}: {}", args.template.display(), e)),
    };
    let json = serde_json::to_string_pretty(&precompiled).into_diagnostic()?;

    match &args.output {
        Some(path) => write(path, json)
            .map_err(|e| miette!("Cannot write {}: {}", path.display(), e))?,
        None => println!("{json}"),
    }
    Ok(exitcode::OK)
}
