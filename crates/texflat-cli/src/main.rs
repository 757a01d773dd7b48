use anyhow::Context;
use clap::Parser;
use log::{error, Level};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use texflat_core::fs::NativeFs;
use texflat_core::{InlineError, Inliner, InlinerConfig};

#[derive(Parser)]
#[command(name = "texflat")]
#[command(version, about = "Flatten a multi-file LaTeX project into a single file", long_about = None)]
struct Cli {
    /// Main .tex document
    #[arg(value_name = "MAIN")]
    main: PathBuf,

    /// Output file (defaults to MAIN with an .inline.tex suffix)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum nesting depth of inclusions
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,

    /// Extension appended to directive arguments that lack one
    #[arg(long, value_name = "EXT")]
    extension: Option<String>,

    /// Write a JSON report of inlined files and recovered problems
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Only print warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // `--help` and `--version` also arrive here.
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<InlineError>() {
                Some(InlineError::MissingMainDocument { .. }) => error!("{}", err),
                _ => error!("{:?}", err),
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let default_level = if cli.quiet {
        "warn"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stdout)
        .format(|buf, record| match record.level() {
            Level::Info => writeln!(buf, "{}", record.args()),
            Level::Warn => writeln!(buf, "Warning: {}", record.args()),
            Level::Error => writeln!(buf, "Error: {}", record.args()),
            level => writeln!(buf, "[{}] {}", level, record.args()),
        })
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => InlinerConfig::load(&NativeFs, path)?,
        None => InlinerConfig::default(),
    };
    if let Some(max_depth) = cli.max_depth {
        config.max_depth = max_depth;
    }
    if let Some(extension) = &cli.extension {
        config.extension = extension.trim_start_matches('.').to_string();
    }

    let summary = Inliner::new(config).inline(&cli.main, cli.output.as_deref())?;

    if let Some(path) = &cli.report {
        let json = serde_json::to_string_pretty(&summary.report)?;
        fs::write(path, json)
            .with_context(|| format!("failed to write report {}", path.display()))?;
    }
    Ok(())
}
