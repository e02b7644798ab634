use crate::args::Args;
use clap::Parser;
use owo_colors::{OwoColorize, Stream::Stderr, Style};
use std::process::ExitCode;
use tracing::{debug, trace};
use viper_diagnostics::{Diagnostic, ErrorLevel, SourceLookup};
use viper_files::{source_tree, FileTree};
use viperc::{CompileOutput, ViperC};

mod args;
mod logging;

#[tokio::main]
async fn main() -> eyre::Result<ExitCode> {
    color_eyre::install()?;
    let args = Args::parse();
    logging::init_logging(args.logging().log_level_filter())?;
    trace!("starting viperc with args: {args:?}");
    debug!("viperc version: {}", env!("CARGO_PKG_VERSION"));

    let mut builder = ViperC::builder()
        .search_paths(args.included())
        .warnings_as_errors(args.warnings_as_errors);
    if let Some(jobs) = args.jobs {
        builder = builder.jobs(jobs);
    }
    let viper_c = builder.build()?;

    let to_compile = args
        .files
        .iter()
        .flat_map(|file| {
            if file.is_dir() {
                source_tree(file).flatten().into_iter().collect()
            } else {
                vec![file.clone()]
            }
        })
        .collect::<Vec<_>>();
    debug!("paths to compile: {to_compile:#?}");

    let outputs = viper_c.compile_all(to_compile).await?;
    let mut failed = false;
    for output in &outputs {
        report(output, &args);
        failed |= !output.is_ok();
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Prints whatever was asked for, then every problem found in a file
fn report(output: &CompileOutput, args: &Args) {
    if args.print_tokens {
        println!("{}", output.tokens);
    }
    if args.print_ast {
        print!("{}", output.ast.print_tree());
    }
    for diagnostic in output.diagnostics.iter() {
        eprintln!("{}", render(diagnostic, output.lookup()));
    }
    let error_style = Style::new().red().bold();
    for error in &output.syntax_errors {
        eprintln!(
            "{}: {error}",
            "error".if_supports_color(Stderr, |t| t.style(error_style))
        );
    }
}

fn render(diagnostic: &Diagnostic, lookup: &dyn SourceLookup) -> String {
    let (label, style) = match diagnostic.level() {
        ErrorLevel::Warning => ("warning", Style::new().yellow().bold()),
        ErrorLevel::Fatal => ("fatal", Style::new().red().bold()),
    };
    let mut rendered = format!(
        "{}: {}",
        label.if_supports_color(Stderr, |t| t.style(style)),
        diagnostic.kind()
    );
    if let Some(location) = diagnostic.location().and_then(|span| lookup.locate(span)) {
        rendered.push_str(&format!(
            "\n  {} {location}",
            "->".if_supports_color(Stderr, |t| t.blue())
        ));
    }
    rendered
}
