use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Parser;
use lambdatalk::{Config, Context, Limits};

mod repl;

/// Evaluate lambdatalk pages, or start an interactive session.
#[derive(Parser, Debug)]
#[command(name = "lambdatalk", version, about)]
struct Cli {
    /// Page to evaluate
    file: Option<PathBuf>,

    /// Evaluate an expression instead of a file
    #[arg(short, long, conflicts_with = "file")]
    expr: Option<String>,

    /// Directory that `{include name}` reads `name.txt` from
    #[arg(long, value_name = "DIR")]
    pages: Option<PathBuf>,

    #[arg(long, default_value_t = Limits::DEFAULT_MAX_STEPS)]
    max_steps: usize,

    #[arg(long, default_value_t = Limits::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn setup_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if quiet {
            "error"
        } else {
            match verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let pages = cli
        .pages
        .or_else(|| cli.file.as_ref().and_then(|file| file.parent()).map(PathBuf::from));
    let context = Context::with_config(Config {
        limits: Limits {
            max_steps: cli.max_steps,
            max_depth: cli.max_depth,
        },
        pages,
    });

    let source = match (cli.expr, cli.file) {
        (Some(expr), _) => expr,
        (None, Some(file)) => std::fs::read_to_string(&file)
            .with_context(|| format!("could not read {}", file.display()))?,
        (None, None) => return repl::run(context),
    };

    let output = context.render(&source)?;
    println!("{output}");
    Ok(())
}
